//! Named entry points of the marshalling runtime.
//!
//! Template assemblers emit calls to [`Slot::call_name`] directly, so
//! fragments get cross-realm semantics without any rewriting afterwards.

/// A runtime entry point callable from generated fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `forPage(value)`: page-realm counterpart of a value.
    ForPage,
    /// `ObjForPage.make(value)`
    Make,
    /// `ObjForPage.promise(value)`: resolved page-realm promise.
    Promise,
    DefineProperty,
    DefineProperties,
    Create,
    /// Bounded prototype-chain search for a property descriptor.
    LookupDescriptor,
    /// Removal of a property along the prototype chain.
    DeleteProperty,
    /// Host primitive installing a function into the page.
    ExportFunction,
}

impl Slot {
    /// Members of the `ObjForPage` object, in emission order.
    pub const MEMBERS: [Slot; 7] = [
        Slot::Make,
        Slot::Promise,
        Slot::DefineProperty,
        Slot::DefineProperties,
        Slot::Create,
        Slot::LookupDescriptor,
        Slot::DeleteProperty,
    ];

    /// Name fragments use to call this slot.
    pub fn call_name(self) -> &'static str {
        match self {
            Slot::ForPage => "forPage",
            Slot::Make => "ObjForPage.make",
            Slot::Promise => "ObjForPage.promise",
            Slot::DefineProperty => "ObjForPage.defineProperty",
            Slot::DefineProperties => "ObjForPage.defineProperties",
            Slot::Create => "ObjForPage.create",
            Slot::LookupDescriptor => "ObjForPage.lookupDescriptor",
            Slot::DeleteProperty => "ObjForPage.deleteProperty",
            Slot::ExportFunction => "exportFunction",
        }
    }

    /// Source of this slot as an `ObjForPage` member, `None` for slots that
    /// are plain bindings.
    pub fn member_source(self, max_depth: u32) -> Option<String> {
        let source = match self {
            Slot::ForPage | Slot::ExportFunction => return None,
            Slot::Make => "make: obj => forPage(obj),".to_string(),
            Slot::Promise => "promise: obj => xrayWindow.Promise.resolve(forPage(obj)),".to_string(),
            Slot::DefineProperty => DEFINE_PROPERTY.to_string(),
            Slot::DefineProperties => DEFINE_PROPERTIES.to_string(),
            Slot::Create => CREATE.to_string(),
            Slot::LookupDescriptor => lookup_descriptor(max_depth),
            Slot::DeleteProperty => delete_property(max_depth),
        };
        Some(source)
    }
}

/// Membership cache and `forPage`. Outputs are remembered in a `WeakSet` and
/// inputs map to their output in a `WeakMap`, so marshalling the same value
/// twice returns the same object and nothing is kept alive by the cache.
pub(crate) const FOR_PAGE: &str = r#"const pageStuff = new WeakSet();
const marshalled = new WeakMap();
forPage = obj => {
	if (obj === null || (typeof obj !== "object" && typeof obj !== "function")) return obj;
	if (pageStuff.has(obj)) return obj;
	let cached = marshalled.get(obj);
	if (cached !== undefined) return cached;
	let ret = cloneInto(obj, unwrappedWindow, {cloneFunctions: true, wrapReflectors: true});
	try {
		marshalled.set(obj, ret);
		pageStuff.add(ret);
	} catch (e) {
		// primitive result
	}
	return ret;
};
"#;

/// Descriptor fix-up when accessors have to be owned by the page realm.
pub(crate) const FIX_PROP_XRAY: &str = r#"let fixProp = (d, prop, obj) => {
	for (let accessor of ["set", "get"]) {
		if (typeof d[accessor] === "function") {
			d[accessor] = exportFunction(d[accessor], obj, {defineAs: `${accessor} ${prop}`});
		}
	}
	if (typeof d.value === "object") d.value = forPage(d.value);
	return d;
};
"#;

pub(crate) const FIX_PROP_SAME_REALM: &str = r#"let fixProp = (d, prop, obj) => {
	if (typeof d.value === "object") d.value = forPage(d.value);
	return d;
};
"#;

const DEFINE_PROPERTY: &str = r#"defineProperty(obj, prop, descriptor, ...args) {
	if (obj.wrappedJSObject) obj = obj.wrappedJSObject;
	return Object.defineProperty(obj, prop, fixProp(descriptor, prop, obj), ...args);
},"#;

const DEFINE_PROPERTIES: &str = r#"defineProperties(obj, descriptors, ...args) {
	if (obj.wrappedJSObject) obj = obj.wrappedJSObject;
	for (let [prop, d] of Object.entries(descriptors)) {
		fixProp(d, prop, obj);
	}
	return Object.defineProperties(obj, descriptors, ...args);
},"#;

const CREATE: &str = r#"create(proto, descriptors) {
	let obj = forPage(Object.create(proto && proto.wrappedJSObject || proto));
	return descriptors ? ObjForPage.defineProperties(obj, descriptors) && obj : obj;
},"#;

/// Searching -> found | exhausted. The owner of a descriptor found on an
/// ancestor is that ancestor's page-realm counterpart.
fn lookup_descriptor(max_depth: u32) -> String {
    format!(
        r#"lookupDescriptor(obj, prop) {{
	let owner = obj;
	let descriptor = Object.getOwnPropertyDescriptor(obj, prop);
	let depth = 0;
	for (let proto = Object.getPrototypeOf(obj); !descriptor && proto && depth < {max_depth}; proto = Object.getPrototypeOf(proto), depth++) {{
		descriptor = Object.getOwnPropertyDescriptor(proto, prop);
		if (descriptor) owner = proto.wrappedJSObject || proto;
	}}
	return {{owner, descriptor}};
}},"#,
        max_depth = max_depth
    )
}

/// Deletes every configurable definition along the chain, stopping at the
/// built-in prototypes every object shares. A definition that cannot be
/// removed is shadowed by an inaccessible, non-enumerable one.
fn delete_property(max_depth: u32) -> String {
    format!(
        r#"deleteProperty(obj, prop) {{
	if (obj.wrappedJSObject) obj = obj.wrappedJSObject;
	let shared = [];
	for (let w of [xrayWindow, xrayWindow.wrappedJSObject]) {{
		if (!w) continue;
		for (let name of ["Object", "Function", "Array", "EventTarget"]) {{
			try {{
				let proto = w[name] && w[name].prototype;
				if (proto) shared.push(proto);
			}} catch (e) {{}}
		}}
	}}
	for (let target = obj, depth = 0; target && !shared.includes(target) && depth <= {max_depth}; target = Object.getPrototypeOf(target), depth++) {{
		let d = Object.getOwnPropertyDescriptor(target, prop);
		if (d && d.configurable) delete target[prop];
	}}
	if (prop in obj) {{
		Object.defineProperty(obj, prop, {{get: undefined, set: undefined, configurable: false, enumerable: false}});
	}}
	return !(prop in obj);
}},"#,
        max_depth = max_depth
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_names() {
        assert_eq!(Slot::DefineProperty.call_name(), "ObjForPage.defineProperty");
        assert_eq!(Slot::ForPage.call_name(), "forPage");
        assert_eq!(Slot::ExportFunction.call_name(), "exportFunction");
        for slot in Slot::MEMBERS {
            assert!(slot.call_name().starts_with("ObjForPage."));
        }
    }

    #[test]
    fn test_member_sources_match_names() {
        for slot in Slot::MEMBERS {
            let source = slot.member_source(64).unwrap();
            let member = slot.call_name().trim_start_matches("ObjForPage.");
            assert!(
                source.starts_with(member),
                "member {} should define {}",
                source,
                member
            );
            assert!(source.ends_with(','));
        }
        assert!(Slot::ForPage.member_source(64).is_none());
        assert!(Slot::ExportFunction.member_source(64).is_none());
    }

    #[test]
    fn test_depth_bound_is_interpolated() {
        let lookup = Slot::LookupDescriptor.member_source(12).unwrap();
        assert!(lookup.contains("depth < 12"));
        let delete = Slot::DeleteProperty.member_source(12).unwrap();
        assert!(delete.contains("depth <= 12"));
    }

    #[test]
    fn test_delete_stops_at_shared_prototypes() {
        let delete = Slot::DeleteProperty.member_source(8).unwrap();
        assert!(delete.contains("[xrayWindow, xrayWindow.wrappedJSObject]"));
        assert!(delete.contains(r#"["Object", "Function", "Array", "EventTarget"]"#));
        assert!(delete.contains("target && !shared.includes(target) && depth <= 8"));
    }

    #[test]
    fn test_fix_prop_debug_name() {
        assert!(FIX_PROP_XRAY.contains("`${accessor} ${prop}`"));
        assert!(!FIX_PROP_SAME_REALM.contains("exportFunction"));
    }
}
