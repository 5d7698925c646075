//! Injection hosts and the realm handles they provide.

use serde::{Deserialize, Serialize};

/// Where the generated script is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RealmHost {
    /// Firefox content script. The page is reached through
    /// `window.wrappedJSObject`, and the host supplies `cloneInto` and
    /// `exportFunction`.
    #[default]
    Xray,
    /// Script evaluated directly in the page's realm. The script defines
    /// pass-through versions of the host primitives itself.
    SameRealm,
}

/// Xray host: only the page handle needs binding.
const XRAY_PRELUDE: &str = r#"let unwrappedWindow = window.wrappedJSObject;
"#;

/// Same-realm host: nothing crosses a realm boundary, so cloning is identity
/// and exporting keeps the attributes of the property it replaces.
const SAME_REALM_PRELUDE: &str = r#"let unwrappedWindow = window;
let cloneInto = (obj, scope, options) => obj;
let exportFunction = (fn, scope, options) => {
	if (options && options.defineAs !== undefined) {
		let current = Object.getOwnPropertyDescriptor(scope, options.defineAs);
		let keep = current !== undefined && "value" in current;
		Object.defineProperty(scope, options.defineAs, {
			value: fn,
			writable: keep ? current.writable : true,
			enumerable: keep ? current.enumerable : true,
			configurable: keep ? current.configurable : true,
		});
	}
	return fn;
};
"#;

impl RealmHost {
    /// Bindings emitted before the marshalling runtime.
    pub fn prelude(self) -> &'static str {
        match self {
            RealmHost::Xray => XRAY_PRELUDE,
            RealmHost::SameRealm => SAME_REALM_PRELUDE,
        }
    }

    /// Whether accessors must be re-exported into the page realm.
    pub fn crosses_realms(self) -> bool {
        matches!(self, RealmHost::Xray)
    }

    /// Opening of the block the fragments run in. Under Xray, bare names such
    /// as `navigator` must resolve to page objects rather than Xray views.
    pub fn scope_open(self) -> &'static str {
        match self {
            RealmHost::Xray => "with (unwrappedWindow) {\nlet window = unwrappedWindow;\n",
            RealmHost::SameRealm => "{\n",
        }
    }
}
