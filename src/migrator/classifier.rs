use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::RolesConfig;
use crate::migrator::defaults::MAX_ANCESTOR_DEPTH;
use crate::migrator::tree::{NodeId, NodeKind, SyntaxTree};

/// Migration strategy for a class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Activity-like: owns the window content
    ScreenContainer,
    /// Fragment-like: inflates a view in `onCreateView`, drops it in `onDestroyView`
    SubScreen,
    /// View-like: inflates its own layout into itself
    CustomView,
    Unhandled,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::ScreenContainer => "activity",
            Role::SubScreen => "fragment",
            Role::CustomView => "view",
            Role::Unhandled => "unhandled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub role: Role,
    /// An ancestor is listed under `special_cases`
    pub special_case: bool,
}

/// Class name -> direct supertypes, for every class seen in the run
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    supertypes: HashMap<String, Vec<String>>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every class of a parsed file, nested ones included
    pub fn add_tree(&mut self, tree: &SyntaxTree) {
        let mut pending = vec![tree.root()];
        while let Some(id) = pending.pop() {
            if tree.kind(id) == NodeKind::Class {
                if let Some(name) = tree.name(id) {
                    self.insert(name, tree.node(id).supertypes.clone());
                }
            }
            pending.extend(tree.children(id).iter().copied());
        }
    }

    pub fn insert(&mut self, name: &str, supertypes: Vec<String>) {
        self.supertypes.insert(name.to_string(), supertypes);
    }

    pub fn supertypes_of(&self, name: &str) -> &[String] {
        self.supertypes.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.supertypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.supertypes.is_empty()
    }
}

pub struct Classifier<'a> {
    roles: &'a RolesConfig,
    hierarchy: &'a ClassHierarchy,
}

impl<'a> Classifier<'a> {
    pub fn new(roles: &'a RolesConfig, hierarchy: &'a ClassHierarchy) -> Self {
        Classifier { roles, hierarchy }
    }

    /// Walk the ancestors of `class` breadth first
    ///
    /// The nearest ancestor that belongs to a role family decides the role.
    /// The walk stops at `MAX_ANCESTOR_DEPTH` and never visits a name twice,
    /// so cyclic or very deep hierarchies terminate.
    pub fn classify(&self, tree: &SyntaxTree, class: NodeId) -> Classification {
        let mut role = Role::Unhandled;
        let mut special_case = false;

        let mut seen: HashSet<&str> = HashSet::new();
        if let Some(name) = tree.name(class) {
            seen.insert(name);
        }
        let mut queue: VecDeque<(&str, usize)> = tree
            .node(class)
            .supertypes
            .iter()
            .map(|s| (s.as_str(), 1))
            .collect();

        while let Some((ancestor, depth)) = queue.pop_front() {
            if depth > MAX_ANCESTOR_DEPTH || !seen.insert(ancestor) {
                continue;
            }

            if self.matches_special_case(ancestor) {
                special_case = true;
            }
            if role == Role::Unhandled {
                role = self.family_of(ancestor);
            }

            queue.extend(
                self.hierarchy
                    .supertypes_of(ancestor)
                    .iter()
                    .map(|s| (s.as_str(), depth + 1)),
            );
        }

        Classification { role, special_case }
    }

    pub fn matches_special_case(&self, name: &str) -> bool {
        self.roles.special_cases.iter().any(|s| s == name)
    }

    fn family_of(&self, name: &str) -> Role {
        let listed = |family: &[String]| family.iter().any(|f| f == name);
        if listed(&self.roles.activities) {
            Role::ScreenContainer
        } else if listed(&self.roles.fragments) {
            Role::SubScreen
        } else if listed(&self.roles.views) {
            Role::CustomView
        } else {
            Role::Unhandled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrator::parser::parse_file;

    fn classify_all(source: &str, roles: &RolesConfig) -> Vec<(String, Classification)> {
        let tree = parse_file(source).unwrap();
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.add_tree(&tree);
        let classifier = Classifier::new(roles, &hierarchy);
        tree.classes()
            .into_iter()
            .map(|c| (tree.name(c).unwrap_or_default().to_string(), classifier.classify(&tree, c)))
            .collect()
    }

    #[test]
    fn test_direct_framework_supertypes() {
        let source = "class A : AppCompatActivity()\nclass B : Fragment(), Listener\nclass C(context: Context) : FrameLayout(context)\nclass D : Serializable\n";
        let roles: Vec<Role> = classify_all(source, &RolesConfig::default())
            .into_iter()
            .map(|(_, c)| c.role)
            .collect();
        assert_eq!(roles, vec![Role::ScreenContainer, Role::SubScreen, Role::CustomView, Role::Unhandled]);
    }

    #[test]
    fn test_project_base_classes_are_followed() {
        let source = "abstract class BaseFragment : Fragment()\nclass HomeFragment : BaseFragment()\n";
        let result = classify_all(source, &RolesConfig::default());
        assert_eq!(result[1].0, "HomeFragment");
        assert_eq!(result[1].1.role, Role::SubScreen);
        assert!(!result[1].1.special_case);
    }

    #[test]
    fn test_special_case_anywhere_in_chain() {
        let roles = RolesConfig {
            special_cases: vec!["BaseBottomSheet".to_string()],
            ..RolesConfig::default()
        };
        let source = "abstract class BaseBottomSheet : BottomSheetDialogFragment()\nclass Picker : BaseBottomSheet()\n";
        let result = classify_all(source, &roles);
        assert_eq!(
            result[1].1,
            Classification {
                role: Role::SubScreen,
                special_case: true
            }
        );
    }

    #[test]
    fn test_cycles_terminate() {
        let source = "class A : B()\nclass B : A()\n";
        for (_, classification) in classify_all(source, &RolesConfig::default()) {
            assert_eq!(classification.role, Role::Unhandled);
        }
    }

    #[test]
    fn test_depth_limit() {
        let mut hierarchy = ClassHierarchy::new();
        hierarchy.insert("L0", vec!["L1".to_string()]);
        for i in 1..=MAX_ANCESTOR_DEPTH {
            hierarchy.insert(&format!("L{}", i), vec![format!("L{}", i + 1)]);
        }
        hierarchy.insert(&format!("L{}", MAX_ANCESTOR_DEPTH + 1), vec!["Activity".to_string()]);

        let tree = parse_file("class Leaf : L0()\n").unwrap();
        let roles = RolesConfig::default();
        let classification = Classifier::new(&roles, &hierarchy).classify(&tree, tree.classes()[0]);
        assert_eq!(classification.role, Role::Unhandled);
    }
}
