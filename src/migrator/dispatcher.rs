use tracing::{debug, error, warn};

use crate::config::Config;
use crate::migrator::bindings::LayoutResolver;
use crate::migrator::call_site::{replace_content_view, replace_fragment_return};
use crate::migrator::classifier::{Classification, Role};
use crate::migrator::defaults::{ON_CREATE_VIEW, ON_DESTROY_VIEW};
use crate::migrator::error::{MigrationError, Result};
use crate::migrator::inflater::purge_view_inflaters;
use crate::migrator::inserter::Inserter;
use crate::migrator::lifecycle::{ensure_method, inject_after_open_brace};
use crate::migrator::naming;
use crate::migrator::parser::parse_property;
use crate::migrator::tree::{NodeId, SyntaxTree};

/// Handles classes whose ancestry is listed under `special_cases`
pub trait CustomCaseHandler {
    /// Returns whether the class was changed
    fn process_custom_case(
        &self,
        tree: &mut SyntaxTree,
        class: NodeId,
        classification: Classification,
        names: &[String],
    ) -> Result<bool>;
}

/// Leaves special cases for manual migration
#[derive(Debug, Default, Clone, Copy)]
pub struct SkipCustomCases;

impl CustomCaseHandler for SkipCustomCases {
    fn process_custom_case(
        &self,
        tree: &mut SyntaxTree,
        class: NodeId,
        classification: Classification,
        _names: &[String],
    ) -> Result<bool> {
        warn!(
            class = tree.name(class).unwrap_or_default(),
            role = classification.role.as_str(),
            "special case, left for manual migration"
        );
        Ok(false)
    }
}

/// Read-only collaborators shared by every class of a run
pub struct MigrationContext<'a> {
    pub config: &'a Config,
    pub resolver: &'a dyn LayoutResolver,
    pub custom_cases: &'a dyn CustomCaseHandler,
}

/// Migrate one classified class to view binding
///
/// `names` are the binding classes of the file in discovery order. Returns
/// whether the class was handled. A failure leaves `tree` partially edited;
/// the caller must discard it.
pub fn process(
    ctx: &MigrationContext,
    tree: &mut SyntaxTree,
    class: NodeId,
    classification: Classification,
    names: &[String],
) -> Result<bool> {
    let class_name = tree.name(class).unwrap_or_default().to_string();

    if classification.special_case {
        return ctx
            .custom_cases
            .process_custom_case(tree, class, classification, names)
            .map_err(|e| e.in_class(&class_name));
    }

    let multi = names.len() > 1;
    let result = match classification.role {
        Role::ScreenContainer => process_activity(ctx, tree, class, names, multi),
        Role::SubScreen => process_fragment(ctx, tree, class, names, multi),
        Role::CustomView => process_view(ctx, tree, class, names, multi),
        Role::Unhandled => {
            debug!(class = %class_name, "not a UI class");
            return Ok(false);
        }
    };

    result.map(|()| true).map_err(|e| {
        let e = e.in_class(&class_name);
        if let MigrationError::SyntheticParse { text, .. } = &e {
            error!(class = %class_name, text = %text, "generated code did not parse");
        }
        e
    })
}

fn process_activity(
    ctx: &MigrationContext,
    tree: &mut SyntaxTree,
    class: NodeId,
    names: &[String],
    multi: bool,
) -> Result<()> {
    let body = tree.ensure_class_body(class);
    let mut inserter = Inserter::new(body);

    for name in names {
        let property = parse_property(tree, &naming::to_container_property_format(name, multi))?;
        inserter.insert_after_companion(tree, &[property]);
    }

    replace_content_view(tree, body, &ctx.config.markers, ctx.resolver, multi)?;
    Ok(())
}

fn process_fragment(
    ctx: &MigrationContext,
    tree: &mut SyntaxTree,
    class: NodeId,
    names: &[String],
    multi: bool,
) -> Result<()> {
    let body = tree.ensure_class_body(class);
    let templates = &ctx.config.templates;
    let mut inserter = Inserter::new(body);
    let mut created_on_create_view = false;

    for name in names {
        let mutable = parse_property(tree, &naming::to_mutable_property_format(name, multi))?;
        let immutable = parse_property(tree, &naming::to_immutable_property_format(name, multi))?;
        inserter.insert_after_companion(tree, &[mutable, immutable]);

        let on_create_view = ensure_method(tree, body, ON_CREATE_VIEW, &templates.on_create_view)?;
        created_on_create_view |= on_create_view.created;
        inject_after_open_brace(tree, on_create_view.id, &naming::to_fragment_initialization_format(name, multi))?;

        let on_destroy_view = ensure_method(tree, body, ON_DESTROY_VIEW, &templates.on_destroy_view)?;
        inject_after_open_brace(tree, on_destroy_view.id, &naming::to_fragment_disposing_format(name, multi))?;
    }

    // a synthesized onCreateView returns super's view, which names no layout
    let fallback = names.first().filter(|_| created_on_create_view).map(String::as_str);
    replace_fragment_return(tree, body, &ctx.config.markers, ctx.resolver, multi, fallback)?;
    Ok(())
}

fn process_view(
    ctx: &MigrationContext,
    tree: &mut SyntaxTree,
    class: NodeId,
    names: &[String],
    multi: bool,
) -> Result<()> {
    let body = tree.ensure_class_body(class);
    let mut inserter = Inserter::new(body);

    for name in names {
        let property = parse_property(tree, &naming::to_view_property_format(name, multi))?;
        inserter.insert_after_companion(tree, &[property]);
    }

    purge_view_inflaters(tree, body, &ctx.config.markers);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::bindings::ConventionResolver;
    use crate::migrator::parser::parse_file;

    fn run(source: &str, role: Role, names: &[&str]) -> String {
        run_with(source, Classification { role, special_case: false }, names, &Config::default())
    }

    fn run_with(source: &str, classification: Classification, names: &[&str], config: &Config) -> String {
        let resolver = ConventionResolver::from_config(&config.bindings);
        let ctx = MigrationContext {
            config,
            resolver: &resolver,
            custom_cases: &SkipCustomCases,
        };
        let names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        let mut tree = parse_file(source).unwrap();
        let class = tree.classes()[0];
        process(&ctx, &mut tree, class, classification, &names).unwrap();
        tree.render()
    }

    #[test]
    fn test_activity() {
        let source = r#"class MainActivity : AppCompatActivity() {

    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
        setContentView(R.layout.activity_main)
        title = "Main"
    }
}
"#;
        let expected = r#"class MainActivity : AppCompatActivity() {
    private val binding by lazy { ActivityMainBinding.inflate(layoutInflater) }

    override fun onCreate(savedInstanceState: Bundle?) {
        super.onCreate(savedInstanceState)
        setContentView(binding.root)
        title = "Main"
    }
}
"#;
        assert_eq!(run(source, Role::ScreenContainer, &["ActivityMainBinding"]), expected);
    }

    #[test]
    fn test_fragment_without_on_destroy_view() {
        let source = r#"class HomeFragment : Fragment() {
    companion object {
        fun newInstance() = HomeFragment()
    }

    override fun onCreateView(inflater: LayoutInflater, container: ViewGroup?, savedInstanceState: Bundle?): View? {
        return inflater.inflate(R.layout.fragment_home, container, false)
    }
}
"#;
        let expected = r#"class HomeFragment : Fragment() {
    companion object {
        fun newInstance() = HomeFragment()
    }

    private var _binding: FragmentHomeBinding? = null
    private val binding: FragmentHomeBinding get() = _binding!!

    override fun onCreateView(inflater: LayoutInflater, container: ViewGroup?, savedInstanceState: Bundle?): View? {
        _binding = FragmentHomeBinding.inflate(inflater, container, false)
        return binding.root
    }

    override fun onDestroyView() {
        _binding = null
        super.onDestroyView()
    }
}
"#;
        let rendered = run(source, Role::SubScreen, &["FragmentHomeBinding"]);
        assert_eq!(rendered, expected);
        assert_eq!(rendered.matches("fun onDestroyView").count(), 1);
    }

    #[test]
    fn test_fragment_with_on_destroy_view_gets_one_disposal_per_binding() {
        let source = r#"class HomeFragment : Fragment() {
    override fun onCreateView(inflater: LayoutInflater, container: ViewGroup?, savedInstanceState: Bundle?): View? {
        return inflater.inflate(R.layout.fragment_home, container, false)
    }

    override fun onDestroyView() {
        super.onDestroyView()
        adapter = null
    }
}
"#;
        let rendered = run(source, Role::SubScreen, &["FragmentHomeBinding", "ItemHeaderBinding"]);

        assert!(rendered.contains(
            "    private var _fragmentHomeBinding: FragmentHomeBinding? = null\n    private val fragmentHomeBinding: FragmentHomeBinding get() = _fragmentHomeBinding!!\n    private var _itemHeaderBinding: ItemHeaderBinding? = null\n    private val itemHeaderBinding: ItemHeaderBinding get() = _itemHeaderBinding!!\n"
        ));
        assert!(rendered.contains(
            "    override fun onDestroyView() {\n        _itemHeaderBinding = null\n        _fragmentHomeBinding = null\n        super.onDestroyView()\n        adapter = null\n    }\n"
        ));
        assert!(rendered.contains("        return fragmentHomeBinding.root\n"));
        assert_eq!(rendered.matches("fun onDestroyView").count(), 1);
    }

    #[test]
    fn test_fragment_without_on_create_view_returns_first_binding() {
        let source = "class EmptyFragment : Fragment() {\n}\n";
        let rendered = run(source, Role::SubScreen, &["FragmentEmptyBinding"]);

        assert!(rendered.contains(
            "    override fun onCreateView(inflater: LayoutInflater, container: ViewGroup?, savedInstanceState: Bundle?): View? {\n        _binding = FragmentEmptyBinding.inflate(inflater, container, false)\n        return binding.root\n    }\n"
        ));
        assert!(rendered.contains("    override fun onDestroyView() {\n        _binding = null\n        super.onDestroyView()\n    }\n}\n"));
    }

    #[test]
    fn test_custom_view() {
        let source = r#"class ProfileView @JvmOverloads constructor(
    context: Context,
    attrs: AttributeSet? = null
) : FrameLayout(context, attrs) {

    init {
        LayoutInflater.from(context).inflate(R.layout.view_profile, this, true)
    }

    fun bind(name: String) {
        title.text = name
    }
}
"#;
        let expected = r#"class ProfileView @JvmOverloads constructor(
    context: Context,
    attrs: AttributeSet? = null
) : FrameLayout(context, attrs) {
    private val binding = ViewProfileBinding.inflate(LayoutInflater.from(context), this)

    fun bind(name: String) {
        title.text = name
    }
}
"#;
        assert_eq!(run(source, Role::CustomView, &["ViewProfileBinding"]), expected);
    }

    #[test]
    fn test_class_without_body() {
        let source = "class EmptyView(context: Context) : View(context)\n";
        assert_eq!(
            run(source, Role::CustomView, &["ViewEmptyBinding"]),
            "class EmptyView(context: Context) : View(context) {\n    private val binding = ViewEmptyBinding.inflate(LayoutInflater.from(context), this)\n}\n"
        );
    }

    #[test]
    fn test_unhandled_and_special_cases_are_left_alone() {
        let source = "class Repo : Base() {\n    fun load() = Unit\n}\n";
        assert_eq!(run(source, Role::Unhandled, &["ActivityMainBinding"]), source);

        let special = Classification {
            role: Role::SubScreen,
            special_case: true,
        };
        assert_eq!(run_with(source, special, &["ActivityMainBinding"], &Config::default()), source);
    }

    #[test]
    fn test_broken_template_reports_class() {
        let mut config = Config::default();
        config.templates.on_destroy_view = "override fun onDestroyView() = Unit".to_string();
        let resolver = ConventionResolver::from_config(&config.bindings);
        let ctx = MigrationContext {
            config: &config,
            resolver: &resolver,
            custom_cases: &SkipCustomCases,
        };
        let mut tree = parse_file("class HomeFragment : Fragment() {\n}\n").unwrap();
        let class = tree.classes()[0];
        let classification = Classification {
            role: Role::SubScreen,
            special_case: false,
        };

        let err = process(&ctx, &mut tree, class, classification, &["FragmentHomeBinding".to_string()]).unwrap_err();
        assert!(matches!(err, MigrationError::SyntheticParse { ref class, .. } if class == "HomeFragment"));
    }
}
