//! Template assemblers, one per wrapper kind.
//!
//! Each function turns one piece of a wrapper specification into source text.
//! Nothing here is executed; names are validated or quoted before they are
//! spliced, and free-form fragments are copied verbatim.

use crate::builders::enclose::{enclose_wrapping_named, ErrorReport};
use crate::error::{Result, WrapError};
use crate::realm::Slot;
use crate::spec::token::{
    check_expression, check_identifier, check_object_path, check_params, quote,
};
use crate::spec::{
    Assignment, DeleteProperties, FunctionDefinition, FunctionExport, ObjectProperties,
    WrappedObject,
};

/// Replace a page function.
///
/// The original is available to the replacement body as `originalF`, the
/// replacement itself as `replacementF`.
pub fn define_page_context_function(def: &FunctionDefinition, report: ErrorReport) -> Result<String> {
    let (parent, property) = def.resolve_target()?;
    let parent = check_object_path("parent_object", parent)?;
    let property = quote(property);
    let original = match def.original_function.as_deref() {
        Some(path) => check_object_path("original_function", path)?.to_string(),
        None => format!("{}[{}]", parent, property),
    };
    let body = def
        .wrapping_function_body
        .as_deref()
        .ok_or_else(|| WrapError::MissingField {
            wrapper: parent.to_string(),
            field: "wrapping_function_body",
        })?;
    let args = check_params("wrapping_function_args", &def.wrapping_function_args)?;

    let code = format!(
        "let originalF = {original};\n\
         let replacementF = function({args}) {{\n{body}\n}};\n\
         {export}(replacementF, {parent}, {{defineAs: {property}}});\n\
         {post}\n",
        original = original,
        args = args,
        body = body,
        export = Slot::ExportFunction.call_name(),
        parent = parent,
        property = property,
        post = def.post_replacement_code.as_deref().unwrap_or("")
    );
    enclose_wrapping_named(
        &code,
        def.wrapping_code_function_name.as_deref(),
        &def.wrapping_code_function_params,
        def.wrapping_code_function_call_window,
        report,
    )
}

/// Export a function already defined earlier in the same fragment.
pub fn export_function(spec: &FunctionExport) -> Result<String> {
    let name = check_identifier("export_function_name", &spec.export_function_name)?;
    let parent = check_object_path("parent_object", &spec.parent_object)?;
    Ok(format!(
        "{export}({name}, {parent}, {{defineAs: {property}}});\n",
        export = Slot::ExportFunction.call_name(),
        name = name,
        parent = parent,
        property = quote(&spec.parent_object_property)
    ))
}

/// `var alias = window.original;` for each wrapped object.
pub(crate) fn bind_wrapped_objects(objects: &[WrappedObject], guard: bool) -> Result<String> {
    let mut code = String::new();
    for object in objects {
        let alias = check_identifier("wrapped_name", &object.wrapped_name)?;
        let original = check_object_path("original_name", &object.original_name)?;
        code.push_str(&format!("var {} = window.{};\n", alias, original));
        if guard {
            // Missing experimental features are left alone: absence of an
            // override must look like absence of the feature.
            code.push_str(&format!("if ({} === undefined) {{return;}}\n", alias));
        }
    }
    Ok(code)
}

/// Override selected fields of a property descriptor.
///
/// The descriptor is looked up along the prototype chain and installed on
/// `parent_object` itself, so objects sharing the prototype keep the
/// original. Each override expression can refer to the field's previous
/// value as `originalPDF`.
pub fn wrap_object_properties(spec: &ObjectProperties) -> Result<String> {
    let parent = check_object_path("parent_object", &spec.parent_object)?;
    let property = quote(&spec.parent_object_property);

    let mut code = format!(
        "if (!({property} in {parent})) {{return;}}\n",
        property = property,
        parent = parent
    );
    code.push_str(&bind_wrapped_objects(&spec.wrapped_objects, false)?);
    code.push_str(&format!(
        "{{\n\
         let {{descriptor}} = {lookup}({parent}, {property});\n\
         if (!descriptor) {{\n\
         let current = {parent}[{property}];\n\
         descriptor = {{get: function() {{return current;}}, enumerable: true, configurable: true}};\n\
         }}\n",
        lookup = Slot::LookupDescriptor.call_name(),
        parent = parent,
        property = property
    ));
    for wrapped in &spec.wrapped_properties {
        let value = check_expression(parent, "property_value", &wrapped.property_value)?;
        let field = quote(wrapped.property_name.as_str());
        code.push_str(&format!(
            "{{\nlet originalPDF = descriptor[{field}];\ndescriptor[{field}] = {value};\n}}\n",
            field = field,
            value = value
        ));
    }
    code.push_str(&format!(
        "{define}({parent}, {property}, descriptor);\n}}\n",
        define = Slot::DefineProperty.call_name(),
        parent = parent,
        property = property
    ));
    Ok(code)
}

/// Remove properties so that they read as never having existed.
pub fn delete_properties(spec: &DeleteProperties) -> Result<String> {
    let parent = check_object_path("parent_object", &spec.parent_object)?;
    let mut code = String::new();
    for property in &spec.delete_properties {
        let property = quote(property);
        code.push_str(&format!(
            "if ({property} in {parent}) {{\n{delete}({parent}, {property});\n}}\n",
            property = property,
            parent = parent,
            delete = Slot::DeleteProperty.call_name()
        ));
    }
    Ok(code)
}

/// Plain assignment, for targets where descriptor fidelity does not matter.
pub fn assign(spec: &Assignment) -> Result<String> {
    let parent = check_object_path("parent_object", &spec.parent_object)?;
    let value = check_expression(parent, "value", &spec.value)?;
    Ok(format!(
        "{}[{}] = {};\n",
        parent,
        quote(&spec.parent_object_property),
        value
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{DescriptorField, PropertyOverride};

    fn timezone_definition() -> FunctionDefinition {
        FunctionDefinition {
            parent_object: "Date.prototype".into(),
            parent_object_property: Some("getTimezoneOffset".into()),
            wrapping_function_args: "".into(),
            wrapping_function_body: Some("return 0;".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_define_function() {
        let code = define_page_context_function(&timezone_definition(), ErrorReport::Console).unwrap();
        assert!(code.starts_with("try {(function(...args) {"));
        assert!(code.contains("let originalF = Date.prototype[\"getTimezoneOffset\"];"));
        assert!(code.contains("let replacementF = function() {\nreturn 0;\n};"));
        assert!(code.contains(
            "exportFunction(replacementF, Date.prototype, {defineAs: \"getTimezoneOffset\"});"
        ));
    }

    #[test]
    fn test_define_function_from_original_path() {
        let def = FunctionDefinition {
            original_function: Some("window.Date.prototype.getTime".into()),
            replace_original_function: true,
            wrapping_function_args: "...params".into(),
            wrapping_function_body: Some("return Math.floor(originalF.call(this) / 100) * 100;".into()),
            post_replacement_code: Some("window.timeWrapped = true;".into()),
            ..Default::default()
        };
        let code = define_page_context_function(&def, ErrorReport::Console).unwrap();
        assert!(code.contains("let originalF = window.Date.prototype.getTime;"));
        assert!(code.contains("exportFunction(replacementF, window.Date.prototype, {defineAs: \"getTime\"});"));
        assert!(code.contains("window.timeWrapped = true;"));
    }

    #[test]
    fn test_define_function_named() {
        let def = FunctionDefinition {
            wrapping_code_function_name: Some("wrapTimezone".into()),
            wrapping_code_function_params: "w".into(),
            wrapping_code_function_call_window: true,
            ..timezone_definition()
        };
        let code = define_page_context_function(&def, ErrorReport::Console).unwrap();
        assert!(code.starts_with("function wrapTimezone(w) {"));
        assert!(code.contains("try {wrapTimezone(window);}"));
    }

    #[test]
    fn test_define_function_requires_body() {
        let def = FunctionDefinition {
            wrapping_function_body: None,
            ..timezone_definition()
        };
        assert!(matches!(
            define_page_context_function(&def, ErrorReport::Console),
            Err(WrapError::MissingField { field: "wrapping_function_body", .. })
        ));
    }

    #[test]
    fn test_export_function() {
        let code = export_function(&FunctionExport {
            export_function_name: "getVoices".into(),
            parent_object: "speechSynthesis".into(),
            parent_object_property: "getVoices".into(),
        })
        .unwrap();
        assert_eq!(
            code,
            "exportFunction(getVoices, speechSynthesis, {defineAs: \"getVoices\"});\n"
        );

        assert!(export_function(&FunctionExport {
            export_function_name: "get Voices".into(),
            parent_object: "speechSynthesis".into(),
            parent_object_property: "getVoices".into(),
        })
        .is_err());
    }

    #[test]
    fn test_object_properties() {
        let code = wrap_object_properties(&ObjectProperties {
            parent_object: "navigator".into(),
            parent_object_property: "hardwareConcurrency".into(),
            wrapped_objects: vec![WrappedObject::new("origMath", "Math")],
            wrapped_properties: vec![PropertyOverride::new(
                DescriptorField::Get,
                "function() { return 8; }",
            )],
        })
        .unwrap();

        assert!(code.starts_with("if (!(\"hardwareConcurrency\" in navigator)) {return;}"));
        assert!(code.contains("var origMath = window.Math;"));
        assert!(code.contains(
            "let {descriptor} = ObjForPage.lookupDescriptor(navigator, \"hardwareConcurrency\");"
        ));
        assert!(code.contains("let current = navigator[\"hardwareConcurrency\"];"));
        assert!(code.contains("get: function() {return current;}, enumerable: true, configurable: true"));
        assert!(code.contains("let originalPDF = descriptor[\"get\"];"));
        assert!(code.contains("descriptor[\"get\"] = function() { return 8; };"));
        assert!(code.contains("ObjForPage.defineProperty(navigator, \"hardwareConcurrency\", descriptor);"));

        // Overrides are applied after the lookup and before the definition.
        let lookup = code.find("lookupDescriptor").unwrap();
        let apply = code.find("descriptor[\"get\"] =").unwrap();
        let define = code.find("ObjForPage.defineProperty").unwrap();
        assert!(lookup < apply && apply < define);
    }

    #[test]
    fn test_object_properties_does_not_touch_flags() {
        let code = wrap_object_properties(&ObjectProperties {
            parent_object: "screen".into(),
            parent_object_property: "width".into(),
            wrapped_objects: vec![],
            wrapped_properties: vec![PropertyOverride::new(DescriptorField::Get, "() => 1920")],
        })
        .unwrap();
        assert!(!code.contains("descriptor[\"enumerable\"]"));
        assert!(!code.contains("descriptor[\"configurable\"]"));
    }

    #[test]
    fn test_object_properties_rejects_blank_override() {
        let result = wrap_object_properties(&ObjectProperties {
            parent_object: "screen".into(),
            parent_object_property: "width".into(),
            wrapped_objects: vec![],
            wrapped_properties: vec![PropertyOverride::new(DescriptorField::Get, "")],
        });
        assert!(matches!(
            result,
            Err(WrapError::MissingField { field: "property_value", .. })
        ));
    }

    #[test]
    fn test_delete_properties() {
        let code = delete_properties(&DeleteProperties {
            parent_object: "navigator".into(),
            delete_properties: vec!["deviceMemory".into(), "connection".into()],
        })
        .unwrap();
        assert!(code.contains(
            "if (\"deviceMemory\" in navigator) {\nObjForPage.deleteProperty(navigator, \"deviceMemory\");\n}"
        ));
        assert!(code.contains("ObjForPage.deleteProperty(navigator, \"connection\");"));
    }

    #[test]
    fn test_delete_quotes_hostile_names() {
        let code = delete_properties(&DeleteProperties {
            parent_object: "window".into(),
            delete_properties: vec!["x\"); alert(1); (\"".into()],
        })
        .unwrap();
        assert!(code.contains("\"x\\\"); alert(1); (\\\"\""));
    }

    #[test]
    fn test_assign() {
        let code = assign(&Assignment {
            parent_object: "navigator".into(),
            parent_object_property: "webdriver".into(),
            value: "false".into(),
        })
        .unwrap();
        assert_eq!(code, "navigator[\"webdriver\"] = false;\n");

        let missing: Assignment = serde_json::from_value(serde_json::json!({
            "parent_object": "navigator",
            "parent_object_property": "webdriver"
        }))
        .unwrap();
        assert!(matches!(
            assign(&missing),
            Err(WrapError::MissingField { field: "value", .. })
        ));
    }

    #[test]
    fn test_define_function_rejects_bad_args() {
        let def = FunctionDefinition {
            wrapping_function_args: "...rest, last".into(),
            ..timezone_definition()
        };
        assert!(matches!(
            define_page_context_function(&def, ErrorReport::Console),
            Err(WrapError::InvalidIdentifier { field: "wrapping_function_args", .. })
        ));
    }

    #[test]
    fn test_bind_wrapped_objects() {
        let objects = vec![WrappedObject::new("origFetch", "fetch")];
        let guarded = bind_wrapped_objects(&objects, true).unwrap();
        assert_eq!(
            guarded,
            "var origFetch = window.fetch;\nif (origFetch === undefined) {return;}\n"
        );
        let plain = bind_wrapped_objects(&objects, false).unwrap();
        assert_eq!(plain, "var origFetch = window.fetch;\n");

        let bad = vec![WrappedObject::new("orig", "fetch()")];
        assert!(bind_wrapped_objects(&bad, true).is_err());
    }
}
