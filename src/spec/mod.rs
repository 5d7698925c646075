//! Declarative wrapper specifications.
//!
//! A [`WrapperSpec`] describes one alteration of the page's object graph.
//! Specifications are plain data, usually deserialized from the JSON the
//! extension's configuration layer produces; field names follow that format
//! (`parent_object`, `post_wrapping_code`, `code_type`, ...).

use serde::{Deserialize, Serialize};

use crate::error::{Result, WrapError};

pub mod registry;
pub mod token;

pub use registry::{WrapperCall, WrapperRegistry};

/// A local alias bound to a page global before the wrapper body runs.
///
/// Binding once up front means the generated code never re-resolves a lookup
/// the page may have hooked in the meantime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedObject {
    pub wrapped_name: String,
    pub original_name: String,
}

impl WrappedObject {
    pub fn new(wrapped_name: impl Into<String>, original_name: impl Into<String>) -> Self {
        Self {
            wrapped_name: wrapped_name.into(),
            original_name: original_name.into(),
        }
    }
}

/// One alteration request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperSpec {
    /// Container of the altered property, e.g. `navigator` or `Navigator.prototype`.
    pub parent_object: String,
    /// Name being altered. May be absent when the wrapper only assigns.
    pub parent_object_property: Option<String>,
    /// Explicit path of the function being replaced.
    pub original_function: Option<String>,
    /// Take parent and property from `original_function` instead.
    pub replace_original_function: bool,
    pub wrapped_objects: Vec<WrappedObject>,
    pub helping_code: Option<String>,
    pub wrapping_function_args: String,
    pub wrapping_function_body: Option<String>,
    pub post_replacement_code: Option<String>,
    pub wrapping_code_function_name: Option<String>,
    pub wrapping_code_function_params: String,
    pub wrapping_code_function_call_window: bool,
    pub post_wrapping_code: Vec<PostWrappingCode>,
    /// Object that should become the prototype of the altered property.
    pub wrapper_prototype: Option<String>,
    pub nofreeze: bool,
}

impl WrapperSpec {
    pub fn new(parent_object: impl Into<String>, parent_object_property: impl Into<String>) -> Self {
        Self {
            parent_object: parent_object.into(),
            parent_object_property: Some(parent_object_property.into()),
            ..Default::default()
        }
    }

    /// The function replacement requested at the top level, if any.
    pub fn function_definition(&self) -> Option<FunctionDefinition> {
        self.wrapping_function_body.as_ref()?;
        Some(FunctionDefinition {
            parent_object: self.parent_object.clone(),
            parent_object_property: self.parent_object_property.clone(),
            original_function: self.original_function.clone(),
            replace_original_function: self.replace_original_function,
            wrapping_function_args: self.wrapping_function_args.clone(),
            wrapping_function_body: self.wrapping_function_body.clone(),
            post_replacement_code: self.post_replacement_code.clone(),
            wrapping_code_function_name: self.wrapping_code_function_name.clone(),
            wrapping_code_function_params: self.wrapping_code_function_params.clone(),
            wrapping_code_function_call_window: self.wrapping_code_function_call_window,
        })
    }

    /// Human-readable name used in diagnostics.
    pub fn target(&self) -> String {
        match &self.parent_object_property {
            Some(property) => format!("{}.{}", self.parent_object, property),
            None => self.parent_object.clone(),
        }
    }
}

/// Replacement of a function reachable from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionDefinition {
    pub parent_object: String,
    pub parent_object_property: Option<String>,
    pub original_function: Option<String>,
    pub replace_original_function: bool,
    pub wrapping_function_args: String,
    pub wrapping_function_body: Option<String>,
    pub post_replacement_code: Option<String>,
    pub wrapping_code_function_name: Option<String>,
    pub wrapping_code_function_params: String,
    pub wrapping_code_function_call_window: bool,
}

impl FunctionDefinition {
    /// Container and property name the replacement is installed under.
    pub fn resolve_target(&self) -> Result<(&str, &str)> {
        if self.replace_original_function {
            let path = self.original_function.as_deref().ok_or_else(|| WrapError::MissingField {
                wrapper: self.parent_object.clone(),
                field: "original_function",
            })?;
            return token::split_path("original_function", path);
        }
        let property = self
            .parent_object_property
            .as_deref()
            .ok_or_else(|| WrapError::MissingField {
                wrapper: self.parent_object.clone(),
                field: "parent_object_property",
            })?;
        Ok((self.parent_object.as_str(), property))
    }
}

/// Export of a function defined earlier in the same wrapper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionExport {
    pub export_function_name: String,
    pub parent_object: String,
    pub parent_object_property: String,
}

/// Descriptor fields a wrapper may override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorField {
    Get,
    Set,
    Value,
    Writable,
    Enumerable,
    Configurable,
}

impl DescriptorField {
    pub fn as_str(self) -> &'static str {
        match self {
            DescriptorField::Get => "get",
            DescriptorField::Set => "set",
            DescriptorField::Value => "value",
            DescriptorField::Writable => "writable",
            DescriptorField::Enumerable => "enumerable",
            DescriptorField::Configurable => "configurable",
        }
    }
}

/// `descriptor[property_name] = property_value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOverride {
    pub property_name: DescriptorField,
    pub property_value: String,
}

impl PropertyOverride {
    pub fn new(property_name: DescriptorField, property_value: impl Into<String>) -> Self {
        Self {
            property_name,
            property_value: property_value.into(),
        }
    }
}

/// Partial override of a property descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectProperties {
    pub parent_object: String,
    pub parent_object_property: String,
    pub wrapped_objects: Vec<WrappedObject>,
    pub wrapped_properties: Vec<PropertyOverride>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteProperties {
    pub parent_object: String,
    pub delete_properties: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assignment {
    pub parent_object: String,
    pub parent_object_property: String,
    pub value: String,
}

/// The five wrapper kinds, tagged by `code_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code_type", rename_all = "snake_case")]
pub enum CodeSpec {
    FunctionDefine(FunctionDefinition),
    FunctionExport(FunctionExport),
    ObjectProperties(ObjectProperties),
    DeleteProperties(DeleteProperties),
    Assign(Assignment),
}

impl CodeSpec {
    pub fn code_type(&self) -> &'static str {
        match self {
            CodeSpec::FunctionDefine(_) => "function_define",
            CodeSpec::FunctionExport(_) => "function_export",
            CodeSpec::ObjectProperties(_) => "object_properties",
            CodeSpec::DeleteProperties(_) => "delete_properties",
            CodeSpec::Assign(_) => "assign",
        }
    }
}

/// One entry of `post_wrapping_code`, optionally guarded by `apply_if`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWrappingCode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_if: Option<String>,
    #[serde(flatten)]
    pub code: CodeSpec,
}

impl From<CodeSpec> for PostWrappingCode {
    fn from(code: CodeSpec) -> Self {
        Self { apply_if: None, code }
    }
}

impl PostWrappingCode {
    pub fn guarded(apply_if: impl Into<String>, code: CodeSpec) -> Self {
        Self {
            apply_if: Some(apply_if.into()),
            code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_wrapper() {
        let spec: WrapperSpec = serde_json::from_value(json!({
            "parent_object": "HTMLCanvasElement.prototype",
            "parent_object_property": "toDataURL",
            "wrapped_objects": [
                {"wrapped_name": "origToDataURL", "original_name": "HTMLCanvasElement.prototype.toDataURL"}
            ],
            "helping_code": "let level = args[0];",
            "wrapping_function_args": "...args",
            "wrapping_function_body": "return origToDataURL.call(this, ...args);",
            "post_wrapping_code": [
                {
                    "code_type": "object_properties",
                    "apply_if": "level > 1",
                    "parent_object": "HTMLCanvasElement.prototype",
                    "parent_object_property": "width",
                    "wrapped_objects": [],
                    "wrapped_properties": [
                        {"property_name": "get", "property_value": "function() { return 300; }"}
                    ]
                },
                {
                    "code_type": "delete_properties",
                    "parent_object": "navigator",
                    "delete_properties": ["deviceMemory"]
                }
            ],
            "nofreeze": true
        }))
        .unwrap();

        assert_eq!(spec.target(), "HTMLCanvasElement.prototype.toDataURL");
        assert_eq!(spec.wrapped_objects[0].wrapped_name, "origToDataURL");
        assert!(spec.nofreeze);
        assert_eq!(spec.post_wrapping_code.len(), 2);

        let first = &spec.post_wrapping_code[0];
        assert_eq!(first.apply_if.as_deref(), Some("level > 1"));
        match &first.code {
            CodeSpec::ObjectProperties(props) => {
                assert_eq!(props.parent_object_property, "width");
                assert_eq!(props.wrapped_properties[0].property_name, DescriptorField::Get);
            }
            other => panic!("Expected object_properties, got {}", other.code_type()),
        }
        assert_eq!(spec.post_wrapping_code[1].code.code_type(), "delete_properties");
        assert!(spec.function_definition().is_some());
    }

    #[test]
    fn test_unknown_code_type_rejected() {
        let result: std::result::Result<PostWrappingCode, _> = serde_json::from_value(json!({
            "code_type": "rewrite_everything",
            "parent_object": "window"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_descriptor_field_rejected() {
        let result: std::result::Result<PropertyOverride, _> = serde_json::from_value(json!({
            "property_name": "__proto__",
            "property_value": "null"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_pure_assignment_has_no_function() {
        let spec = WrapperSpec {
            parent_object: "navigator".into(),
            ..Default::default()
        };
        assert!(spec.function_definition().is_none());
        assert_eq!(spec.target(), "navigator");
    }

    #[test]
    fn test_resolve_target() {
        let def = FunctionDefinition {
            parent_object: "navigator".into(),
            parent_object_property: Some("getGamepads".into()),
            ..Default::default()
        };
        assert_eq!(def.resolve_target().unwrap(), ("navigator", "getGamepads"));

        let def = FunctionDefinition {
            original_function: Some("Date.prototype.getTimezoneOffset".into()),
            replace_original_function: true,
            ..Default::default()
        };
        assert_eq!(
            def.resolve_target().unwrap(),
            ("Date.prototype", "getTimezoneOffset")
        );

        let def = FunctionDefinition {
            parent_object: "navigator".into(),
            ..Default::default()
        };
        assert!(matches!(
            def.resolve_target(),
            Err(WrapError::MissingField { field: "parent_object_property", .. })
        ));
    }

    #[test]
    fn test_serialize_keeps_tag() {
        let entry = PostWrappingCode::guarded(
            "window.Gamepad",
            CodeSpec::Assign(Assignment {
                parent_object: "navigator".into(),
                parent_object_property: "webdriver".into(),
                value: "false".into(),
            }),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["code_type"], "assign");
        assert_eq!(value["apply_if"], "window.Gamepad");
        assert_eq!(value["value"], "false");
    }
}
