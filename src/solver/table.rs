use std::collections::BTreeMap;

use crate::{
    error::{Result, SolverError},
    solver::{
        engine::VariableId,
        predicate::{Predicate, SharedPredicate},
        scope::Scope,
        value::DomainValue,
    },
};

/// The live scope → predicate registry the engine propagates over.
///
/// Keys are structural scope identities, so each rotation of a logical
/// constraint is its own entry while re-registering the same ordering is
/// rejected. Entries rooted at a solved variable get dropped as an
/// optimization; the original registrations survive on the engine for
/// escalation.
pub(crate) struct ConstraintTable<V: DomainValue> {
    entries: BTreeMap<Scope, SharedPredicate<V>>,
}

impl<V: DomainValue> ConstraintTable<V> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, scope: Scope, predicate: SharedPredicate<V>) -> Result<()> {
        if self.entries.contains_key(&scope) {
            return Err(SolverError::DuplicateScope {
                scope: scope.to_string(),
            }
            .into());
        }
        self.entries.insert(scope, predicate);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.entries.keys()
    }

    /// Every registered scope in which `variable` participates, at any
    /// position.
    pub fn scopes_containing(&self, variable: VariableId) -> Vec<Scope> {
        self.entries
            .keys()
            .filter(|scope| scope.contains(variable))
            .cloned()
            .collect()
    }

    /// Evaluates a registered scope's predicate on positionally aligned
    /// values.
    pub fn satisfied(&self, scope: &Scope, values: &[V]) -> bool {
        self.entries
            .get(scope)
            .expect("joint checks only reference registered scopes")
            .satisfied(values)
    }

    /// Drops every entry whose root is `variable`. Used once a domain
    /// collapses to a singleton: a scope rooted there can never prune again.
    pub fn drop_rooted_at(&mut self, variable: VariableId) {
        self.entries.retain(|scope, _| scope.root() != variable);
    }
}
