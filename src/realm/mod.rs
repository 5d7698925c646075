//! Realm marshalling runtime
//!
//! The runtime is JavaScript, generated once per script and placed ahead of
//! the compiled fragments. It gives fragments a safe way to hand values to the
//! page realm:
//!
//! - `forPage` with an identity-preserving weak membership cache
//! - `ObjForPage.*` shims for property definition and object creation
//! - descriptor lookup and property deletion along the prototype chain
//!
//! ```text
//! try { (function(...args) {
//!     let xrayWindow = window;
//!     <host prelude>
//!     let ObjForPage, forPage;
//!     { <runtime slots> }
//!     <page scope> { <fragments> }
//! })(); } catch (e) { ... }
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::builders::enclose::{enclose_wrapping, ErrorReport};
use crate::error::{Result, WrapError};

pub mod host;
pub mod slot;

pub use host::RealmHost;
pub use slot::Slot;

/// Default bound on prototype-chain walks.
pub const DEFAULT_MAX_PROTOTYPE_DEPTH: u32 = 64;

/// Renders the runtime and the outer template around compiled fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealmRuntime {
    host: RealmHost,
    max_depth: u32,
}

impl Default for RealmRuntime {
    fn default() -> Self {
        Self::new(RealmHost::default(), DEFAULT_MAX_PROTOTYPE_DEPTH)
    }
}

impl RealmRuntime {
    pub fn new(host: RealmHost, max_depth: u32) -> Self {
        Self { host, max_depth }
    }

    pub fn host(&self) -> RealmHost {
        self.host
    }

    /// Runtime block defining `forPage` and `ObjForPage`.
    pub fn render(&self) -> String {
        let fix_prop = if self.host.crosses_realms() {
            slot::FIX_PROP_XRAY
        } else {
            slot::FIX_PROP_SAME_REALM
        };
        let members = Slot::MEMBERS
            .iter()
            .filter_map(|slot| slot.member_source(self.max_depth))
            .collect::<Vec<_>>()
            .join("\n");

        let mut code = String::new();
        code.push_str("let xrayWindow = window;\n");
        code.push_str(self.host.prelude());
        code.push_str("let ObjForPage, forPage;\n{\n");
        code.push_str(slot::FOR_PAGE);
        code.push_str(fix_prop);
        code.push_str("ObjForPage = {\n");
        code.push_str(&members);
        code.push_str("\n};\n}\n");
        code
    }

    /// Splice `fragments` into the outer template and enclose the result.
    pub fn wrap(&self, fragments: &str, report: ErrorReport) -> String {
        let mut body = self.render();
        body.push_str(self.host.scope_open());
        body.push_str(fragments);
        body.push_str("\n}\n");
        enclose_wrapping(&body, "", report)
    }
}

/// Route `Object.create` / `Object.defineProperty` / `Object.defineProperties`
/// calls in hand-written fragments through the runtime shims.
///
/// Only references not preceded by `.` or an identifier character are
/// rewritten, so `window.Object.create` and `MyObject.create` stay untouched.
pub fn rewrite_legacy_definitions(fragments: &str) -> Result<String> {
    Ok(legacy_pattern()?
        .replace_all(fragments, "${1}ObjForPage.$2")
        .into_owned())
}

fn legacy_pattern() -> Result<&'static Regex> {
    static LEGACY: OnceLock<std::result::Result<Regex, String>> = OnceLock::new();
    LEGACY
        .get_or_init(|| {
            Regex::new(r"(^|[^.\w$])Object\.(create|definePropert)").map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| WrapError::Config(e.clone()))
}
