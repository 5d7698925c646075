//! # Wrapping WASM
//!
//! Generates the page-context script that applies browser API wrappers.
//!
//! A wrapper is a declarative description of one alteration of the page's
//! object graph: replace a function, override part of a property descriptor,
//! delete a property, or assign a value. Given a registry of wrappers and an
//! ordered list of invocations, the crate produces one self-contained script
//! to inject into the page.
//!
//! ## Architecture
//!
//! ```text
//! WrappingCodeBuilder / wrap_code (WASM)
//!   ↓
//! ScriptAssembler  (one script per invocation list)
//!   ↓
//! Wrapper compiler (one fragment per invocation)
//!   ↓
//! Template assemblers + enclosures
//!   ↓
//! Realm marshalling runtime (embedded once per script)
//! ```
//!
//! ## Properties
//!
//! - **Fault isolation**: every fragment runs in its own `try`; a failing
//!   specification contributes nothing instead of breaking the script
//! - **No name injection**: names spliced into code are validated, property
//!   names are emitted as string literals
//! - **Absence looks real**: deleted properties fail `in` checks and missing
//!   objects leave their wrappers inert

use js_sys::Array;
use wasm_bindgen::prelude::*;

// Modules
pub mod assembler;
pub mod builders;
pub mod config;
mod error;
pub mod realm;
pub mod spec;

pub use assembler::{AssemblyStats, ScriptAssembler};
pub use builders::{enclose_wrapping, enclose_wrapping_named, ErrorReport};
pub use config::AssemblerConfig;
pub use error::{ErrorCode, ErrorInfo, Result, WrapError};
pub use realm::{RealmHost, RealmRuntime, Slot};
pub use spec::{
    CodeSpec, PostWrappingCode, WrappedObject, WrapperCall, WrapperRegistry, WrapperSpec,
};

/// Initialize logging for the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // A second init (e.g. several modules on one page) keeps the first logger.
    if console_log::init_with_level(log::Level::Info).is_ok() {
        log::info!("Wrapping WASM initialized");
    }
}

/// Builds wrapping scripts for the extension.
///
/// ```javascript
/// const builder = new WrappingCodeBuilder(wrappers, { host: "xray" });
/// const script = builder.wrap_code([
///     ["Navigator.prototype.deviceMemory"],
///     ["CanvasRenderingContext2D.prototype.getImageData", 2],
/// ]);
/// if (script !== undefined) { inject(script); }
/// ```
#[wasm_bindgen]
pub struct WrappingCodeBuilder {
    assembler: ScriptAssembler,
    last_stats: AssemblyStats,
}

#[wasm_bindgen]
impl WrappingCodeBuilder {
    /// Create a builder from a `name -> wrapper` object and assembler options
    #[wasm_bindgen(constructor)]
    pub fn new(registry: JsValue, options: JsValue) -> std::result::Result<WrappingCodeBuilder, JsValue> {
        let registry = registry_from_js(registry)?;
        let config = AssemblerConfig::from_js(options)?;
        log::info!(
            "Wrapping code builder created: {} wrappers, host {:?}",
            registry.len(),
            config.host
        );
        Ok(WrappingCodeBuilder {
            assembler: ScriptAssembler::new(registry, config),
            last_stats: AssemblyStats::default(),
        })
    }

    /// Register (or replace) one wrapper
    pub fn add_wrapper(&mut self, name: String, wrapper: JsValue) -> std::result::Result<(), JsValue> {
        let spec: WrapperSpec = serde_wasm_bindgen::from_value(wrapper).map_err(WrapError::from)?;
        self.assembler.registry_mut().insert(name, spec);
        Ok(())
    }

    /// Names of the registered wrappers
    pub fn kinds(&self) -> Array {
        self.assembler
            .registry()
            .kinds()
            .map(JsValue::from_str)
            .collect()
    }

    /// Whether a wrapper is registered under `name`
    pub fn has_wrapper(&self, name: &str) -> bool {
        self.assembler.registry().contains(name)
    }

    /// Assemble a script from `[name, ...args]` entries.
    ///
    /// Returns `undefined` for an empty list. Entries that fail to compile are
    /// left out of the script.
    pub fn wrap_code(&mut self, wrappers: JsValue) -> std::result::Result<Option<String>, JsValue> {
        let entries = entries_from_js(wrappers)?;
        Ok(match self.assembler.assemble_json_with_stats(&entries) {
            Some((script, stats)) => {
                self.last_stats = stats;
                Some(script)
            }
            None => {
                self.last_stats = AssemblyStats::default();
                None
            }
        })
    }

    /// Counts from the last `wrap_code` call: `{ compiled, skipped }`
    pub fn last_stats(&self) -> std::result::Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.last_stats)
            .map_err(|e| JsValue::from_str(&format!("Serialization failed: {}", e)))
    }
}

/// One-shot assembly: `wrap_code(wrappers, [[name, ...args], ...], options)`.
///
/// Returns the script, or `undefined` when the invocation list is empty.
#[wasm_bindgen]
pub fn wrap_code(
    registry: JsValue,
    wrappers: JsValue,
    options: JsValue,
) -> std::result::Result<Option<String>, JsValue> {
    let assembler = ScriptAssembler::new(registry_from_js(registry)?, AssemblerConfig::from_js(options)?);
    let entries = entries_from_js(wrappers)?;
    Ok(assembler.assemble_json(&entries))
}

fn registry_from_js(registry: JsValue) -> std::result::Result<WrapperRegistry, JsValue> {
    if registry.is_undefined() || registry.is_null() {
        return Ok(WrapperRegistry::new());
    }
    let value: serde_json::Value =
        serde_wasm_bindgen::from_value(registry).map_err(WrapError::from)?;
    Ok(WrapperRegistry::from_value(value)?)
}

fn entries_from_js(wrappers: JsValue) -> std::result::Result<Vec<serde_json::Value>, JsValue> {
    if wrappers.is_undefined() || wrappers.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_wasm_bindgen::from_value(wrappers).map_err(WrapError::from)?)
}
