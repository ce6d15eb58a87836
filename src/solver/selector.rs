use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};

use crate::solver::{
    engine::VariableId,
    scope::{FamilyId, Scope},
    table::ConstraintTable,
    value::DomainValue,
};

/// Chooses up to `max_extra` scopes to examine jointly with `root`.
///
/// Eligibility rules:
/// 1. a chosen scope never contains the root variable (it would only
///    re-derive the root constraint),
/// 2. at most one scope per family, the root's family excluded (rotations of
///    an already-chosen logical constraint are redundant),
/// 3. each chosen scope overlaps the variables gathered so far, so the joint
///    set stays connected through shared variables.
///
/// Candidates are visited in a uniformly shuffled order and each family is
/// considered once, which makes the choice uniform without replacement and
/// keeps per-step work bounded by the table size. `max_extra` is an upper
/// bound; when fewer eligible scopes exist, all of them are taken.
pub(crate) fn select_overlapping<V: DomainValue, R: Rng>(
    root: &Scope,
    table: &ConstraintTable<V>,
    max_extra: usize,
    rng: &mut R,
) -> Vec<Scope> {
    if max_extra == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<&Scope> = table.scopes().collect();
    candidates.shuffle(rng);

    let root_variable: VariableId = root.root();
    let mut tried: HashSet<FamilyId> = HashSet::new();
    tried.insert(root.family());
    let mut joined: HashSet<VariableId> = root.variables().iter().copied().collect();
    let mut selected = Vec::new();

    for candidate in candidates {
        if selected.len() == max_extra {
            break;
        }
        if !tried.insert(candidate.family()) {
            continue;
        }
        if candidate.contains(root_variable) {
            continue;
        }
        if !candidate
            .variables()
            .iter()
            .any(|variable| joined.contains(variable))
        {
            continue;
        }
        joined.extend(candidate.variables().iter().copied());
        selected.push(candidate.clone());
    }

    selected
}
