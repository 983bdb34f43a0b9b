/// Text templates for the generated binding declarations and statements
///
/// Every function takes the binding class name (`ActivityMainBinding`) and
/// whether the file uses more than one binding. With a single binding the
/// generated identifier is `binding`; with several it is the decapitalized
/// class name (`activityMainBinding`) so that properties never collide.

/// Identifier generated for the binding property
pub fn binding_identifier(name: &str, multi: bool) -> String {
    if multi {
        decapitalize(name)
    } else {
        "binding".to_string()
    }
}

/// Nullable backing field used by fragments
pub fn backing_identifier(name: &str, multi: bool) -> String {
    format!("_{}", binding_identifier(name, multi))
}

pub fn to_container_property_format(name: &str, multi: bool) -> String {
    format!(
        "private val {} by lazy {{ {}.inflate(layoutInflater) }}",
        binding_identifier(name, multi),
        name
    )
}

pub fn to_mutable_property_format(name: &str, multi: bool) -> String {
    format!("private var {}: {}? = null", backing_identifier(name, multi), name)
}

/// Non-null accessor over the backing field
///
/// Throws if read outside `onCreateView`..`onDestroyView`; that matches what
/// synthetic accessors did.
pub fn to_immutable_property_format(name: &str, multi: bool) -> String {
    format!(
        "private val {}: {} get() = {}!!",
        binding_identifier(name, multi),
        name,
        backing_identifier(name, multi)
    )
}

pub fn to_view_property_format(name: &str, multi: bool) -> String {
    format!(
        "private val {} = {}.inflate(LayoutInflater.from(context), this)",
        binding_identifier(name, multi),
        name
    )
}

pub fn to_fragment_initialization_format(name: &str, multi: bool) -> String {
    format!(
        "{} = {}.inflate(inflater, container, false)",
        backing_identifier(name, multi),
        name
    )
}

pub fn to_fragment_disposing_format(name: &str, multi: bool) -> String {
    format!("{} = null", backing_identifier(name, multi))
}

pub fn to_activity_content_view_format(name: &str, multi: bool) -> String {
    format!("setContentView({}.root)", binding_identifier(name, multi))
}

pub fn to_fragment_on_create_view_format(name: &str, multi: bool) -> String {
    format!("return {}.root", binding_identifier(name, multi))
}

/// `activity_main` -> `ActivityMainBinding`
pub fn layout_to_binding_name(layout: &str, suffix: &str) -> String {
    let mut out = String::with_capacity(layout.len() + suffix.len());
    for part in layout.split('_').filter(|p| !p.is_empty()) {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out.push_str(suffix);
    out
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_binding_uses_generic_identifier() {
        assert_eq!(
            to_container_property_format("ActivityMainBinding", false),
            "private val binding by lazy { ActivityMainBinding.inflate(layoutInflater) }"
        );
        assert_eq!(
            to_mutable_property_format("FragmentMainBinding", false),
            "private var _binding: FragmentMainBinding? = null"
        );
        assert_eq!(
            to_immutable_property_format("FragmentMainBinding", false),
            "private val binding: FragmentMainBinding get() = _binding!!"
        );
        assert_eq!(
            to_view_property_format("ViewProfileBinding", false),
            "private val binding = ViewProfileBinding.inflate(LayoutInflater.from(context), this)"
        );
    }

    #[test]
    fn test_multiple_bindings_are_namespaced() {
        assert_eq!(
            to_container_property_format("ActivityMainBinding", true),
            "private val activityMainBinding by lazy { ActivityMainBinding.inflate(layoutInflater) }"
        );
        assert_eq!(
            to_fragment_initialization_format("FragmentMainBinding", true),
            "_fragmentMainBinding = FragmentMainBinding.inflate(inflater, container, false)"
        );
        assert_eq!(to_fragment_disposing_format("FragmentMainBinding", true), "_fragmentMainBinding = null");
        assert_eq!(to_activity_content_view_format("ActivityMainBinding", true), "setContentView(activityMainBinding.root)");
        assert_eq!(to_fragment_on_create_view_format("FragmentMainBinding", true), "return fragmentMainBinding.root");
    }

    #[test]
    fn test_multi_identifiers_never_collide() {
        let names = ["ActivityMainBinding", "ItemHeaderBinding", "ViewToolbarBinding"];
        let mut identifiers: Vec<String> = names
            .iter()
            .flat_map(|n| [binding_identifier(n, true), backing_identifier(n, true)])
            .collect();
        let total = identifiers.len();
        identifiers.sort();
        identifiers.dedup();
        assert_eq!(identifiers.len(), total);
    }

    #[test]
    fn test_layout_to_binding_name() {
        assert_eq!(layout_to_binding_name("activity_main", "Binding"), "ActivityMainBinding");
        assert_eq!(layout_to_binding_name("item__row_2", "Binding"), "ItemRow2Binding");
    }
}
