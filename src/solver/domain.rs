use std::collections::HashSet;

use im::Vector;

use crate::solver::{
    engine::VariableId,
    predicate::UnaryPredicate,
    value::DomainValue,
};

/// The candidate values still considered possible for every variable.
///
/// One domain per variable, indexed densely by [`VariableId`]. Domains are
/// duplicate-free from construction onwards and only ever shrink: setup
/// applies the unary filters once, and after that the consistency checker is
/// the sole mutator, removing one value at a known offset at a time.
///
/// Domains are persistent vectors, so [`DomainStore::snapshot`] is a cheap
/// structural-sharing copy that stays valid while the engine keeps pruning.
#[derive(Debug, Clone)]
pub struct DomainStore<V: DomainValue> {
    domains: Vec<Vector<V>>,
}

impl<V: DomainValue> DomainStore<V> {
    /// Builds the store, dropping duplicate candidates while keeping first
    /// occurrences in order.
    pub fn new(raw: Vec<Vec<V>>) -> Self {
        let domains = raw
            .into_iter()
            .map(|values| {
                let mut seen = HashSet::new();
                let mut domain = Vector::new();
                for value in values {
                    if seen.insert(value.clone()) {
                        domain.push_back(value);
                    }
                }
                domain
            })
            .collect();
        Self { domains }
    }

    pub fn variable_count(&self) -> usize {
        self.domains.len()
    }

    pub fn len_of(&self, variable: VariableId) -> usize {
        self.domains[variable].len()
    }

    pub fn value(&self, variable: VariableId, offset: usize) -> &V {
        &self.domains[variable][offset]
    }

    pub fn domain(&self, variable: VariableId) -> &Vector<V> {
        &self.domains[variable]
    }

    /// Removes the value at `offset` from `variable`'s domain.
    pub fn remove_at(&mut self, variable: VariableId, offset: usize) {
        self.domains[variable].remove(offset);
    }

    /// Keeps only the values the filter admits. Setup-time only; the result
    /// is order-independent because the filter is a pure predicate.
    pub fn retain(&mut self, variable: VariableId, filter: &dyn UnaryPredicate<V>) {
        self.domains[variable].retain(|value| filter.admits(value));
    }

    pub fn is_singleton(&self, variable: VariableId) -> bool {
        self.domains[variable].len() == 1
    }

    /// The sole remaining value, if the domain has collapsed to one.
    pub fn singleton(&self, variable: VariableId) -> Option<&V> {
        if self.is_singleton(variable) {
            self.domains[variable].front()
        } else {
            None
        }
    }

    pub fn any_empty(&self) -> bool {
        self.domains.iter().any(Vector::is_empty)
    }

    pub fn all_singletons(&self) -> bool {
        self.domains.iter().all(|domain| domain.len() == 1)
    }

    /// A structural-sharing copy of every domain.
    pub fn snapshot(&self) -> Vec<Vector<V>> {
        self.domains.clone()
    }
}
