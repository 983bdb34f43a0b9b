/// Default markers, templates and role families used by the migrator
///
/// Every value here can be overridden from viewbinding.toml. The loaded
/// configuration is never mutated after startup.

/// Call-site marker for `setContentView(R.layout.*)` in activities
pub const SET_CONTENT_VIEW_PREFIX: &str = "setContentView(R.layout.";

/// Callee name matched structurally before falling back to the marker
pub const SET_CONTENT_VIEW_CALLEE: &str = "setContentView";

/// Marker for inflater usage inside custom view `init` blocks
pub const LAYOUT_INFLATER_PREFIX: &str = "LayoutInflater";

/// Marker for `View.inflate(...)` inside custom view `init` blocks
pub const VIEW_INFLATER_PREFIX: &str = "View.inflate";

/// Prefix that introduces a layout resource reference
pub const LAYOUT_RESOURCE_PREFIX: &str = "R.layout.";

/// Import prefix of the legacy synthetic accessors
///
/// `kotlinx.android.synthetic.main.activity_main.*` refers to layout
/// `activity_main`.
pub const SYNTHETIC_IMPORT_PREFIX: &str = "kotlinx.android.synthetic.main.";

/// Suffix appended to the PascalCase layout name by the binding generator
pub const BINDING_SUFFIX: &str = "Binding";

/// Lifecycle methods the dispatcher patches
pub const ON_CREATE: &str = "onCreate";
pub const ON_CREATE_VIEW: &str = "onCreateView";
pub const ON_DESTROY_VIEW: &str = "onDestroyView";

/// Template inserted when a fragment has no `onDestroyView`
pub const ON_DESTROY_VIEW_TEMPLATE: &str = "override fun onDestroyView() {\n    super.onDestroyView()\n}";

/// Template inserted when a fragment has no `onCreateView`
pub const ON_CREATE_VIEW_TEMPLATE: &str = "override fun onCreateView(inflater: LayoutInflater, container: ViewGroup?, savedInstanceState: Bundle?): View? {\n    return super.onCreateView(inflater, container, savedInstanceState)\n}";

/// How many supertypes the classifier follows before giving up
pub const MAX_ANCESTOR_DEPTH: usize = 16;

/// Framework base classes of the screen-container role
pub const ACTIVITY_FAMILY: &[&str] = &[
    "Activity",
    "AppCompatActivity",
    "ComponentActivity",
    "FragmentActivity",
];

/// Framework base classes of the sub-screen role
pub const FRAGMENT_FAMILY: &[&str] = &[
    "Fragment",
    "DialogFragment",
    "BottomSheetDialogFragment",
    "AppCompatDialogFragment",
];

/// Framework base classes of the custom view role
pub const VIEW_FAMILY: &[&str] = &[
    "View",
    "ViewGroup",
    "FrameLayout",
    "LinearLayout",
    "RelativeLayout",
    "ConstraintLayout",
    "CoordinatorLayout",
    "CardView",
    "MaterialCardView",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_families_do_not_overlap() {
        for name in ACTIVITY_FAMILY {
            assert!(!FRAGMENT_FAMILY.contains(name));
            assert!(!VIEW_FAMILY.contains(name));
        }
        for name in FRAGMENT_FAMILY {
            assert!(!VIEW_FAMILY.contains(name));
        }
    }

    #[test]
    fn test_templates_are_named_after_lifecycle_methods() {
        assert!(ON_DESTROY_VIEW_TEMPLATE.contains(&format!("fun {}(", ON_DESTROY_VIEW)));
        assert!(ON_CREATE_VIEW_TEMPLATE.contains(&format!("fun {}(", ON_CREATE_VIEW)));
    }
}
