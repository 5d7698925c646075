//! Wrapper compiler: one [`WrapperSpec`] in, one isolated fragment out.

use crate::builders::enclose::{enclose_wrapping, ErrorReport};
use crate::builders::templates;
use crate::error::{Result, WrapError};
use crate::spec::token::{check_expression, check_object_path, quote};
use crate::spec::{CodeSpec, PostWrappingCode, WrapperSpec};

/// Compile `spec` into a fragment that receives `args` (a JavaScript
/// argument list) through its enclosure.
///
/// Fragment layout, in order:
/// 1. guard on the parent object
/// 2. alias bindings, each guarded against `undefined`
/// 3. `helping_code`
/// 4. function replacement, when a body is declared
/// 5. `post_wrapping_code` entries under their `apply_if` guards
/// 6. prototype relink
/// 7. freeze
pub fn compile(spec: &WrapperSpec, args: &str, report: ErrorReport) -> Result<String> {
    let parent = check_object_path("parent_object", &spec.parent_object)?;

    let mut code = format!(
        "try {{if ({} === undefined) {{return;}}}} catch (e) {{return;}}\n",
        parent
    );
    code.push_str(&templates::bind_wrapped_objects(&spec.wrapped_objects, true)?);
    if let Some(helping_code) = &spec.helping_code {
        code.push_str(helping_code);
        code.push('\n');
    }
    if let Some(definition) = spec.function_definition() {
        code.push_str(&templates::define_page_context_function(&definition, report)?);
        code.push('\n');
    }
    for entry in &spec.post_wrapping_code {
        code.push_str(&compile_post_wrapping(entry, report)?);
    }
    if let Some(prototype) = &spec.wrapper_prototype {
        code.push_str(&relink_prototype(spec, prototype)?);
    }
    if !spec.nofreeze {
        if let Some(property) = &spec.parent_object_property {
            code.push_str(&format!("Object.freeze({}[{}]);\n", parent, quote(property)));
        }
    }

    Ok(enclose_wrapping(&code, args, report))
}

fn compile_post_wrapping(entry: &PostWrappingCode, report: ErrorReport) -> Result<String> {
    let code = match &entry.code {
        CodeSpec::FunctionDefine(def) => templates::define_page_context_function(def, report)?,
        CodeSpec::FunctionExport(export) => templates::export_function(export)?,
        CodeSpec::ObjectProperties(props) => templates::wrap_object_properties(props)?,
        CodeSpec::DeleteProperties(delete) => templates::delete_properties(delete)?,
        CodeSpec::Assign(assignment) => templates::assign(assignment)?,
    };
    log::trace!("post_wrapping_code {} emitted", entry.code.code_type());
    Ok(match &entry.apply_if {
        Some(condition) => {
            let condition = check_expression(entry.code.code_type(), "apply_if", condition)?;
            format!("if ({}) {{\n{}\n}}\n", condition, code)
        }
        None => format!("{}\n", code),
    })
}

/// `Object.setPrototypeOf(target, prototype)` unless already linked. Setting
/// an equal link on a proxy can raise a cyclic `__proto__` error.
fn relink_prototype(spec: &WrapperSpec, prototype: &str) -> Result<String> {
    let prototype = check_object_path("wrapper_prototype", prototype)?;
    let property = spec
        .parent_object_property
        .as_deref()
        .ok_or_else(|| WrapError::MissingField {
            wrapper: spec.target(),
            field: "parent_object_property",
        })?;
    let target = format!("{}[{}]", spec.parent_object, quote(property));
    Ok(format!(
        "if (Object.getPrototypeOf({target}) !== {prototype}) {{\n\
         Object.setPrototypeOf({target}, {prototype});\n\
         }}\n",
        target = target,
        prototype = prototype
    ))
}
