use crate::solver::{
    domain::DomainStore,
    engine::VariableId,
    scope::Scope,
    table::ConstraintTable,
    value::DomainValue,
};

/// One enumeration position in the joint walk: the variable it binds and the
/// offset of the value currently drawn from that variable's effective domain.
/// Offset -1 means "not yet drawn"; every visit advances it by one.
#[derive(Debug)]
struct Cursor {
    variable: VariableId,
    offset: isize,
}

/// Prunes unsupported values from a root variable's domain.
///
/// Given a joint scope sequence `P0..Pm` (the root scope plus the selector's
/// overlapping picks), a candidate value for `P0`'s root variable is kept iff
/// some assignment of every other variable in the joint set, drawn from
/// current domains, satisfies all of `P0..Pm` simultaneously. The search is
/// an iterative depth-first cursor walk: scopes in order, positions within a
/// scope left to right, backtracking one position at a time.
///
/// The fixed-variable overlay makes shared variables consistent across
/// scopes: once a scope's bindings are accepted, its variables are pinned so
/// deeper scopes see the pinned value as a one-element effective domain. The
/// overlay lives only inside a single [`ConsistencyChecker::reduce`] call and
/// is fully cleared on every exit and backtrack path. It is sized to the
/// variable count at engine construction, which is one of the reasons an
/// escalated engine is a fresh instance rather than a mutated one.
pub(crate) struct ConsistencyChecker<V: DomainValue> {
    fixed: Vec<Option<V>>,
}

impl<V: DomainValue> ConsistencyChecker<V> {
    pub fn new(variable_count: usize) -> Self {
        Self {
            fixed: vec![None; variable_count],
        }
    }

    /// Runs the support search rooted at `scopes[0]`, removing root-domain
    /// values with no jointly consistent extension. Returns whether the root
    /// domain changed.
    pub fn reduce(
        &mut self,
        scopes: &[Scope],
        domains: &mut DomainStore<V>,
        table: &ConstraintTable<V>,
    ) -> bool {
        debug_assert!(self.fixed.iter().all(Option::is_none));

        let root_variable = scopes[0].root();

        // Nothing to prune from an empty domain, and a lone candidate cannot
        // be removed safely by a check rooted here.
        if domains.len_of(root_variable) <= 1 {
            return false;
        }

        // A single-position root scope has no peers to enumerate; its
        // predicate filters the root domain directly.
        if scopes[0].len() == 1 {
            return self.reduce_single_position(&scopes[0], root_variable, domains, table);
        }

        let mut cursors: Vec<Vec<Cursor>> = scopes
            .iter()
            .map(|scope| {
                scope
                    .variables()
                    .iter()
                    .map(|&variable| Cursor {
                        variable,
                        offset: -1,
                    })
                    .collect()
            })
            .collect();
        let mut values: Vec<Vec<V>> = scopes
            .iter()
            .map(|scope| Vec::with_capacity(scope.len()))
            .collect();
        let mut fixed_by_scope: Vec<Vec<VariableId>> = vec![Vec::new(); scopes.len()];

        let mut changed = false;
        let mut path = 0usize;
        let mut pos = 0usize;

        loop {
            cursors[path][pos].offset += 1;
            let offset = cursors[path][pos].offset as usize;
            let variable = cursors[path][pos].variable;

            if offset >= self.effective_len(domains, variable) {
                // This position ran out of values.
                if pos == 0 {
                    if path == 0 {
                        // Root enumeration exhausted; the walk is done.
                        debug_assert!(self.fixed.iter().all(Option::is_none));
                        return changed;
                    }
                    // Retreat to the previous scope's last position and lift
                    // the pins it placed when it descended.
                    cursors[path][pos].offset = -1;
                    path -= 1;
                    pos = scopes[path].len() - 1;
                    for pinned in fixed_by_scope[path].drain(..) {
                        self.fixed[pinned] = None;
                    }
                    continue;
                }
                if pos == 1 && path == 0 {
                    // No combination extends the root's current value: it is
                    // unsupported. Remove it and step the cursor back so the
                    // next advance lands on the value that shifted into its
                    // slot.
                    let root_offset = cursors[0][0].offset as usize;
                    domains.remove_at(root_variable, root_offset);
                    cursors[0][0].offset -= 1;
                    changed = true;
                }
                cursors[path][pos].offset = -1;
                pos -= 1;
                continue;
            }

            let value = self.effective_value(domains, variable, offset);
            if pos < values[path].len() {
                values[path][pos] = value;
            } else {
                values[path].push(value);
            }

            if pos + 1 < scopes[path].len() {
                pos += 1;
                continue;
            }

            // All positions of the current scope are bound.
            if !table.satisfied(&scopes[path], &values[path]) {
                continue;
            }

            if path + 1 < scopes.len() {
                // Pin this scope's bindings so deeper scopes reuse them, then
                // descend.
                for (i, &pinned) in scopes[path].variables().iter().enumerate() {
                    if self.fixed[pinned].is_none() {
                        self.fixed[pinned] = Some(values[path][i].clone());
                        fixed_by_scope[path].push(pinned);
                    }
                }
                path += 1;
                pos = 0;
                continue;
            }

            // Every scope is satisfied at once: the root's current value is
            // supported. Lift all pins and rewind every cursor except the
            // root's, whose next advance moves to the next candidate.
            for pinned_by_scope in &mut fixed_by_scope {
                for pinned in pinned_by_scope.drain(..) {
                    self.fixed[pinned] = None;
                }
            }
            while pos > 0 || path > 0 {
                cursors[path][pos].offset = -1;
                if pos == 0 {
                    path -= 1;
                    pos = scopes[path].len() - 1;
                } else {
                    pos -= 1;
                }
            }
        }
    }

    fn reduce_single_position(
        &self,
        scope: &Scope,
        root_variable: VariableId,
        domains: &mut DomainStore<V>,
        table: &ConstraintTable<V>,
    ) -> bool {
        let mut changed = false;
        let mut offset = 0;
        while offset < domains.len_of(root_variable) {
            let candidate = [domains.value(root_variable, offset).clone()];
            if table.satisfied(scope, &candidate) {
                offset += 1;
            } else {
                domains.remove_at(root_variable, offset);
                changed = true;
            }
        }
        changed
    }

    fn effective_len(&self, domains: &DomainStore<V>, variable: VariableId) -> usize {
        if self.fixed[variable].is_some() {
            1
        } else {
            domains.len_of(variable)
        }
    }

    fn effective_value(&self, domains: &DomainStore<V>, variable: VariableId, offset: usize) -> V {
        match &self.fixed[variable] {
            Some(value) => value.clone(),
            None => domains.value(variable, offset).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::{
        predicate::SharedPredicate,
        scope::{FamilyId, Scope},
    };

    fn equal() -> SharedPredicate<i32> {
        Arc::new(|values: &[i32]| values[0] == values[1])
    }

    fn less_than() -> SharedPredicate<i32> {
        Arc::new(|values: &[i32]| values[0] < values[1])
    }

    fn setup(
        domains: Vec<Vec<i32>>,
        constraints: Vec<(Scope, SharedPredicate<i32>)>,
    ) -> (DomainStore<i32>, ConstraintTable<i32>, ConsistencyChecker<i32>) {
        let variable_count = domains.len();
        let store = DomainStore::new(domains);
        let mut table = ConstraintTable::new();
        for (scope, predicate) in constraints {
            table.insert(scope, predicate).unwrap();
        }
        (store, table, ConsistencyChecker::new(variable_count))
    }

    fn domain_values(store: &DomainStore<i32>, variable: usize) -> Vec<i32> {
        store.domain(variable).iter().copied().collect()
    }

    #[test]
    fn removes_values_without_single_constraint_support() {
        let scope = Scope::new(vec![0, 1], FamilyId(0));
        let (mut store, table, mut checker) =
            setup(vec![vec![1, 2, 3], vec![2]], vec![(scope.clone(), less_than())]);

        assert!(checker.reduce(&[scope], &mut store, &table));
        assert_eq!(domain_values(&store, 0), vec![1]);
        assert_eq!(domain_values(&store, 1), vec![2]);
    }

    #[test]
    fn reports_no_change_when_every_value_is_supported() {
        let scope = Scope::new(vec![0, 1], FamilyId(0));
        let (mut store, table, mut checker) = setup(
            vec![vec![1, 2], vec![1, 2]],
            vec![(scope.clone(), equal())],
        );

        assert!(!checker.reduce(&[scope], &mut store, &table));
        assert_eq!(domain_values(&store, 0), vec![1, 2]);
    }

    #[test]
    fn singleton_and_empty_roots_are_skipped() {
        let scope = Scope::new(vec![0, 1], FamilyId(0));
        let (mut store, table, mut checker) = setup(
            vec![vec![5], vec![1, 2]],
            vec![(scope.clone(), equal())],
        );
        assert!(!checker.reduce(&[scope.clone()], &mut store, &table));
        assert_eq!(domain_values(&store, 0), vec![5]);

        let (mut store, table, mut checker) =
            setup(vec![vec![], vec![1, 2]], vec![(scope.clone(), equal())]);
        assert!(!checker.reduce(&[scope], &mut store, &table));
    }

    #[test]
    fn joint_paths_prune_strictly_more_than_the_root_alone() {
        // a == b and b == c with c pinned to 2. The root constraint alone
        // supports a = 1 through b = 1; jointly with b == c it cannot.
        let p0 = Scope::new(vec![0, 1], FamilyId(0));
        let p1 = Scope::new(vec![1, 2], FamilyId(1));
        let (mut store, table, mut checker) = setup(
            vec![vec![1, 2], vec![1, 2], vec![2]],
            vec![(p0.clone(), equal()), (p1.clone(), equal())],
        );

        assert!(!checker.reduce(&[p0.clone()], &mut store, &table));
        assert_eq!(domain_values(&store, 0), vec![1, 2]);

        assert!(checker.reduce(&[p0, p1], &mut store, &table));
        assert_eq!(domain_values(&store, 0), vec![2]);
    }

    #[test]
    fn pinned_values_chain_through_deeper_scopes() {
        // a == b, b == c, c == d with d pinned to 2: support for a flows
        // through two levels of pinned bindings.
        let p0 = Scope::new(vec![0, 1], FamilyId(0));
        let p1 = Scope::new(vec![1, 2], FamilyId(1));
        let p2 = Scope::new(vec![2, 3], FamilyId(2));
        let (mut store, table, mut checker) = setup(
            vec![vec![1, 2], vec![1, 2], vec![1, 2], vec![2]],
            vec![
                (p0.clone(), equal()),
                (p1.clone(), equal()),
                (p2.clone(), equal()),
            ],
        );

        assert!(checker.reduce(&[p0, p1, p2], &mut store, &table));
        assert_eq!(domain_values(&store, 0), vec![2]);
    }

    #[test]
    fn overlay_is_clear_after_every_outcome() {
        let p0 = Scope::new(vec![0, 1], FamilyId(0));
        let p1 = Scope::new(vec![1, 2], FamilyId(1));
        let (mut store, table, mut checker) = setup(
            vec![vec![1, 2], vec![1, 2], vec![2]],
            vec![(p0.clone(), equal()), (p1.clone(), equal())],
        );

        checker.reduce(&[p0.clone(), p1.clone()], &mut store, &table);
        assert!(checker.fixed.iter().all(Option::is_none));

        // Run again on the already-reduced store: no change, still clear.
        assert!(!checker.reduce(&[p0, p1], &mut store, &table));
        assert!(checker.fixed.iter().all(Option::is_none));
    }

    #[test]
    fn empty_peer_domain_empties_the_root() {
        let scope = Scope::new(vec![0, 1], FamilyId(0));
        let (mut store, table, mut checker) =
            setup(vec![vec![1, 2], vec![]], vec![(scope.clone(), equal())]);

        assert!(checker.reduce(&[scope], &mut store, &table));
        assert_eq!(store.len_of(0), 0);
    }

    #[test]
    fn single_position_scope_filters_by_its_predicate() {
        let scope = Scope::new(vec![0], FamilyId(0));
        let even: SharedPredicate<i32> = Arc::new(|values: &[i32]| values[0] % 2 == 0);
        let (mut store, table, mut checker) =
            setup(vec![vec![1, 2, 3, 4]], vec![(scope.clone(), even)]);

        assert!(checker.reduce(&[scope], &mut store, &table));
        assert_eq!(domain_values(&store, 0), vec![2, 4]);
    }
}
