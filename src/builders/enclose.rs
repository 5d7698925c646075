//! Fault-isolating enclosures around generated fragments.
//!
//! Every fragment runs inside its own `try`, so an exception thrown while one
//! alteration is applied never stops the fragments after it.

use crate::error::Result;
use crate::spec::token;

/// What an enclosure does with a caught exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorReport {
    /// `console.error(e)`
    #[default]
    Console,
    /// Swallow silently.
    Silent,
}

impl ErrorReport {
    fn handler(self) -> &'static str {
        match self {
            ErrorReport::Console => "console.error(e);",
            ErrorReport::Silent => "",
        }
    }
}

/// Wrap `code` in a self-executing closure called with `args`.
///
/// Inside the closure the arguments are available as `args`.
pub fn enclose_wrapping(code: &str, args: &str, report: ErrorReport) -> String {
    format!(
        "try {{(function(...args) {{{code}}})({args});}} catch (e) {{{handler}}}",
        code = code,
        args = args,
        handler = report.handler()
    )
}

/// Wrap `code` either like [`enclose_wrapping`] or, when `name` is given, as a
/// named function that is called once immediately and stays reachable for
/// later calls from the surrounding fragment.
pub fn enclose_wrapping_named(
    code: &str,
    name: Option<&str>,
    params: &str,
    call_with_window: bool,
    report: ErrorReport,
) -> Result<String> {
    let name = match name {
        Some(name) => token::check_identifier("wrapping_code_function_name", name)?,
        None => return Ok(enclose_wrapping(code, "", report)),
    };
    let params = token::check_params("wrapping_code_function_params", params)?;
    let call_args = if call_with_window { "window" } else { "" };
    Ok(format!(
        "function {name}({params}) {{{code}}}\ntry {{{name}({call_args});}} catch (e) {{{handler}}}",
        name = name,
        params = params,
        code = code,
        call_args = call_args,
        handler = report.handler()
    ))
}
