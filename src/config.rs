//! Assembler configuration
//!
//! Options arrive from the extension as a plain JS object; every field is
//! optional and falls back to [`AssemblerConfig::default`].
//!
//! ```javascript
//! wrap_code(registry, [["Navigator.prototype.deviceMemory"]], { host: "same_realm" });
//! ```

use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::builders::ErrorReport;
use crate::error::{Result, WrapError};
use crate::realm::{RealmHost, RealmRuntime, DEFAULT_MAX_PROTOTYPE_DEPTH};

/// Upper bound accepted for `max_prototype_depth`.
pub const MAX_PROTOTYPE_DEPTH_LIMIT: u32 = 1024;

/// Options controlling how scripts are assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblerConfig {
    /// Injection host the script is generated for (default: xray)
    pub host: RealmHost,

    /// Report caught exceptions with `console.error` (default: true)
    pub report_errors: bool,

    /// Route literal `Object.create` / `Object.defineProperty(ies)` calls in
    /// fragments through the marshalling runtime (default: false)
    pub rewrite_legacy_definitions: bool,

    /// Bound on prototype-chain walks in generated code (default: 64)
    pub max_prototype_depth: u32,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            host: RealmHost::Xray,
            report_errors: true,
            rewrite_legacy_definitions: false,
            max_prototype_depth: DEFAULT_MAX_PROTOTYPE_DEPTH,
        }
    }
}

impl AssemblerConfig {
    /// Configuration for scripts evaluated directly in the page's realm
    pub fn same_realm() -> Self {
        Self {
            host: RealmHost::SameRealm,
            ..Default::default()
        }
    }

    /// Parse options passed from JavaScript. `undefined` and `null` give the
    /// defaults.
    pub fn from_js(options: JsValue) -> Result<Self> {
        if options.is_undefined() || options.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_wasm_bindgen::from_value(options)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_prototype_depth == 0 || self.max_prototype_depth > MAX_PROTOTYPE_DEPTH_LIMIT {
            return Err(WrapError::Config(format!(
                "max_prototype_depth must be between 1 and {}, got {}",
                MAX_PROTOTYPE_DEPTH_LIMIT, self.max_prototype_depth
            )));
        }
        Ok(())
    }

    pub fn error_report(&self) -> ErrorReport {
        if self.report_errors {
            ErrorReport::Console
        } else {
            ErrorReport::Silent
        }
    }

    pub fn runtime(&self) -> RealmRuntime {
        RealmRuntime::new(self.host, self.max_prototype_depth)
    }
}
