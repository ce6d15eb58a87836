use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

use crate::solver::engine::VariableId;

/// Groups scopes that are reorderings of the same logical constraint.
///
/// A logical constraint such as "row 3 is all-distinct" is registered once per
/// possible root position, so the checker can always keep the variable under
/// examination at position 0. All of those registrations share one `FamilyId`,
/// which is how the path selector recognizes them as redundant with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct FamilyId(pub u32);

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered tuple of variables that a constraint is defined over.
///
/// Scope identity is structural: two scopes are equal iff their variable
/// sequences are identical, regardless of family or label. Scopes are
/// immutable once built and serve as hash-map keys in the propagation loop,
/// so the structural hash is computed once at construction.
#[derive(Debug, Clone)]
pub struct Scope {
    variables: Arc<[VariableId]>,
    family: FamilyId,
    label: Option<Arc<str>>,
    hash: u64,
}

impl Scope {
    pub fn new(variables: Vec<VariableId>, family: FamilyId) -> Self {
        let variables: Arc<[VariableId]> = variables.into();
        let hash = structural_hash(&variables);
        Self {
            variables,
            family,
            label: None,
            hash,
        }
    }

    /// Attaches a human-readable label. Diagnostics only; identity is
    /// unaffected.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(Arc::from(label.into().as_str()));
        self
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    /// The variable at the given position. Position 0 is the root.
    pub fn variable(&self, position: usize) -> VariableId {
        self.variables[position]
    }

    /// The variable whose domain a check rooted at this scope prunes.
    pub fn root(&self) -> VariableId {
        self.variables[0]
    }

    pub fn contains(&self, variable: VariableId) -> bool {
        self.variables.contains(&variable)
    }

    pub fn family(&self) -> FamilyId {
        self.family
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The next root-position variant: the last variable moves to the front.
    /// Family and label carry over, so applying this `len() - 1` times
    /// registers every rotation of one logical constraint.
    pub fn rotated(&self) -> Self {
        let mut rotated = Vec::with_capacity(self.variables.len());
        if let Some(&last) = self.variables.last() {
            rotated.push(last);
            rotated.extend_from_slice(&self.variables[..self.variables.len() - 1]);
        }
        let mut scope = Self::new(rotated, self.family);
        scope.label = self.label.clone();
        scope
    }
}

fn structural_hash(variables: &[VariableId]) -> u64 {
    let mut hasher = DefaultHasher::new();
    variables.hash(&mut hasher);
    hasher.finish()
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.variables == other.variables
    }
}

impl Eq for Scope {}

impl PartialOrd for Scope {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// Total order by variable sequence, consistent with the structural `Eq`
// (which also compares only the variable sequence). Lets scopes key an
// ordered map so the propagation registry iterates deterministically.
impl Ord for Scope {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.variables.cmp(&other.variables)
    }
}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            return write!(f, "{label}");
        }
        write!(f, "[")?;
        for (i, variable) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{variable}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn equality_is_structural() {
        let a = Scope::new(vec![0, 1, 2], FamilyId(0));
        let b = Scope::new(vec![0, 1, 2], FamilyId(7)).with_label("row 0");
        let c = Scope::new(vec![2, 0, 1], FamilyId(0));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rotations_are_distinct_scopes_of_one_family() {
        let scope = Scope::new(vec![3, 4, 5], FamilyId(1));
        let once = scope.rotated();
        let twice = once.rotated();

        assert_eq!(once.variables(), &[5, 3, 4]);
        assert_eq!(twice.variables(), &[4, 5, 3]);
        assert_eq!(once.family(), scope.family());
        assert_ne!(scope, once);
        assert_eq!(twice.rotated(), scope);
    }

    #[test]
    fn usable_as_set_member() {
        let scope = Scope::new(vec![0, 1], FamilyId(0));
        let mut set = HashSet::new();
        assert!(set.insert(scope.clone()));
        // a structurally identical scope is the same member
        assert!(!set.insert(Scope::new(vec![0, 1], FamilyId(9))));
        assert!(set.insert(scope.rotated()));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn root_and_membership() {
        let scope = Scope::new(vec![6, 2, 9], FamilyId(2));
        assert_eq!(scope.root(), 6);
        assert_eq!(scope.variable(2), 9);
        assert!(scope.contains(2));
        assert!(!scope.contains(7));
    }

    #[test]
    fn display_prefers_label() {
        let bare = Scope::new(vec![1, 2], FamilyId(0));
        let labelled = bare.clone().with_label("column 1");
        assert_eq!(bare.to_string(), "[1 2]");
        assert_eq!(labelled.to_string(), "column 1");
    }
}
