use std::collections::HashSet;

use rand::Rng;

use crate::solver::scope::Scope;

/// The set of scopes awaiting (re-)examination.
///
/// A scope appears at most once no matter how many times it is requeued; the
/// membership set absorbs the multiplicity of discovering a scope through
/// each of its variables. Pops are uniform random over the pending scopes,
/// which decorrelates propagation order across steps.
#[derive(Debug, Default)]
pub struct WorkList {
    items: Vec<Scope>,
    members: HashSet<Scope>,
}

impl WorkList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Queues a scope unless it is already pending. Returns whether it was
    /// added.
    pub fn push(&mut self, scope: Scope) -> bool {
        if self.members.insert(scope.clone()) {
            self.items.push(scope);
            true
        } else {
            false
        }
    }

    /// Removes and returns a uniformly random pending scope.
    pub fn pop_random<R: Rng>(&mut self, rng: &mut R) -> Option<Scope> {
        if self.items.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.items.len());
        let scope = self.items.swap_remove(index);
        self.members.remove(&scope);
        Some(scope)
    }
}
