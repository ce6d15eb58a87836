use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    error::{Result, SolverError},
    solver::{
        checker::ConsistencyChecker,
        domain::DomainStore,
        predicate::{Predicate, SharedPredicate, SharedUnaryPredicate},
        scope::Scope,
        selector,
        stats::SolveStats,
        table::ConstraintTable,
        value::DomainValue,
        work_list::WorkList,
    },
};

/// Variables are dense indices into the domain store.
pub type VariableId = usize;

/// Engine lifecycle state. `Running` until the worklist either produces an
/// empty domain or drains; the other three are terminal for this instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    /// Worklist items remain; keep stepping.
    Running,
    /// Some domain emptied, or the final assignment violates a constraint:
    /// the problem has no solution at any propagation strength.
    Invalid,
    /// The worklist drained with at least one domain still ambiguous.
    /// Propagation at the current strength cannot decide the problem; the
    /// recovery is escalation.
    TooWeak,
    /// Every domain is a singleton and the assignment satisfies every
    /// registered constraint.
    Finished,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Running)
    }
}

/// A PC0-k propagation engine.
///
/// One instance owns its domains, constraint table, worklist and random
/// source. Each [`Engine::step`] pops one scope uniformly at random, runs a
/// joint consistency check rooted there (the root constraint plus up to
/// `max_paths` overlapping constraints), and requeues every scope touching
/// the root variable when its domain shrank. `max_paths = 0` is classical
/// arc consistency; higher values buy pruning strength at combinatorial cost.
///
/// Instances are disposable: raising `max_paths` means building a new engine
/// over the already-pruned domains via [`Engine::escalate`], because the
/// checker's overlay and the registered-scope bookkeeping are sized to one
/// constraint set at construction.
pub struct Engine<V: DomainValue, R: Rng = ChaCha8Rng> {
    max_paths: usize,
    domains: DomainStore<V>,
    table: ConstraintTable<V>,
    work_list: WorkList,
    checker: ConsistencyChecker<V>,
    unary_filters: HashMap<VariableId, SharedUnaryPredicate<V>>,
    /// The registrations as handed in, untouched by the singleton-root
    /// optimization. Escalation and the final verification sweep read these.
    constraints: Vec<(Scope, SharedPredicate<V>)>,
    status: Status,
    stats: SolveStats,
    rng: R,
}

impl<V: DomainValue> Engine<V, ChaCha8Rng> {
    /// Builds an engine with an entropy-seeded generator.
    pub fn new(
        max_paths: usize,
        domains: Vec<Vec<V>>,
        unary_filters: HashMap<VariableId, SharedUnaryPredicate<V>>,
        constraints: Vec<(Scope, SharedPredicate<V>)>,
    ) -> Result<Self> {
        Self::with_rng(
            max_paths,
            domains,
            unary_filters,
            constraints,
            ChaCha8Rng::from_entropy(),
        )
    }

    /// Builds an engine with a reproducible generator. Runs with the same
    /// seed and inputs take identical steps.
    pub fn seeded(
        max_paths: usize,
        domains: Vec<Vec<V>>,
        unary_filters: HashMap<VariableId, SharedUnaryPredicate<V>>,
        constraints: Vec<(Scope, SharedPredicate<V>)>,
        seed: u64,
    ) -> Result<Self> {
        Self::with_rng(
            max_paths,
            domains,
            unary_filters,
            constraints,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }
}

impl<V: DomainValue, R: Rng> Engine<V, R> {
    /// Builds an engine around a caller-supplied generator.
    ///
    /// Fails fast on structurally malformed input: an empty scope, a scope or
    /// unary filter referencing a variable outside `0..domains.len()`, or the
    /// same scope ordering registered twice. Setup applies the unary filters
    /// and queues every scope once per member variable (the worklist absorbs
    /// the multiplicity).
    pub fn with_rng(
        max_paths: usize,
        domains: Vec<Vec<V>>,
        unary_filters: HashMap<VariableId, SharedUnaryPredicate<V>>,
        constraints: Vec<(Scope, SharedPredicate<V>)>,
        rng: R,
    ) -> Result<Self> {
        let variable_count = domains.len();

        for (scope, _) in &constraints {
            if scope.is_empty() {
                return Err(SolverError::EmptyScope.into());
            }
            for &variable in scope.variables() {
                if variable >= variable_count {
                    return Err(SolverError::ScopeVariableOutOfRange {
                        scope: scope.to_string(),
                        variable,
                        variable_count,
                    }
                    .into());
                }
            }
        }
        for &variable in unary_filters.keys() {
            if variable >= variable_count {
                return Err(SolverError::FilterVariableOutOfRange {
                    variable,
                    variable_count,
                }
                .into());
            }
        }

        let mut domains = DomainStore::new(domains);
        for (&variable, filter) in &unary_filters {
            domains.retain(variable, filter.as_ref());
        }

        let mut table = ConstraintTable::new();
        for (scope, predicate) in &constraints {
            table.insert(scope.clone(), predicate.clone())?;
        }

        let mut work_list = WorkList::new();
        for variable in 0..variable_count {
            for scope in table.scopes_containing(variable) {
                work_list.push(scope);
            }
        }

        Ok(Self {
            max_paths,
            checker: ConsistencyChecker::new(variable_count),
            domains,
            table,
            work_list,
            unary_filters,
            constraints,
            status: Status::Running,
            stats: SolveStats::default(),
            rng,
        })
    }

    /// The propagation strength: how many extra overlapping constraints each
    /// check examines jointly with the root constraint.
    pub fn max_paths(&self) -> usize {
        self.max_paths
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    pub fn variable_count(&self) -> usize {
        self.domains.variable_count()
    }

    /// Read-only view of one variable's current domain.
    pub fn domain(&self, variable: VariableId) -> &im::Vector<V> {
        self.domains.domain(variable)
    }

    /// A structural-sharing snapshot of every domain, safe to hold across
    /// steps.
    pub fn current_domains(&self) -> Vec<im::Vector<V>> {
        self.domains.snapshot()
    }

    /// Advances one worklist item and reports the post-step state. Calling
    /// this in a terminal state is a no-op returning that state.
    pub fn step(&mut self) -> Status {
        if self.status.is_terminal() {
            return self.status;
        }

        let Some(working) = self.work_list.pop_random(&mut self.rng) else {
            self.status = self.exhausted_status();
            debug!(status = ?self.status, "worklist exhausted");
            return self.status;
        };
        self.stats.steps += 1;
        trace!(scope = %working, pending = self.work_list.len(), "processing scope");

        let root = working.root();

        let mut joint = Vec::with_capacity(self.max_paths + 1);
        joint.push(working.clone());
        joint.extend(selector::select_overlapping(
            &working,
            &self.table,
            self.max_paths,
            &mut self.rng,
        ));

        let before = self.domains.len_of(root);
        let started = Instant::now();
        let changed = self.checker.reduce(&joint, &mut self.domains, &self.table);
        self.record_check(&working, before, started.elapsed());

        if changed {
            debug!(
                scope = %working,
                removed = before - self.domains.len_of(root),
                remaining = self.domains.len_of(root),
                "pruned root domain"
            );
            if self.domains.len_of(root) == 0 {
                self.status = Status::Invalid;
                return self.status;
            }
            for scope in self.table.scopes_containing(root) {
                if scope != working {
                    self.work_list.push(scope);
                }
            }
        }

        // Scopes rooted at a solved variable can never prune again. Entries
        // for them already queued go stale, which is harmless: their root is
        // a singleton and the checker skips singleton roots.
        if self.domains.len_of(root) == 1 {
            self.table.drop_rooted_at(root);
        }

        if self.work_list.is_empty() {
            self.status = self.exhausted_status();
            debug!(status = ?self.status, "worklist exhausted");
        }
        self.status
    }

    /// Loops [`Engine::step`] until a terminal state.
    pub fn run_to_completion(&mut self) -> Status {
        while !self.step().is_terminal() {}
        self.status
    }

    /// Rebuilds at `max_paths + 1` over the current (already-pruned) domains
    /// and the original constraint set, carrying the generator state along.
    pub fn escalate(self) -> Result<Self> {
        let Self {
            max_paths,
            domains,
            unary_filters,
            constraints,
            rng,
            ..
        } = self;
        let raw = domains
            .snapshot()
            .into_iter()
            .map(|domain| domain.into_iter().collect())
            .collect();
        Self::with_rng(max_paths + 1, raw, unary_filters, constraints, rng)
    }

    /// Runs to completion, escalating on `TooWeak` until `Finished`,
    /// `Invalid`, or the strength ceiling is reached. Returns the final
    /// status together with the last engine instance so the caller can read
    /// the converged domains.
    pub fn run_with_escalation(mut self, max_paths_ceiling: usize) -> Result<(Status, Self)> {
        loop {
            let status = self.run_to_completion();
            if status != Status::TooWeak || self.max_paths >= max_paths_ceiling {
                return Ok((status, self));
            }
            debug!(max_paths = self.max_paths + 1, "escalating propagation strength");
            self = self.escalate()?;
        }
    }

    /// Classifies a drained worklist. The verification sweep over the
    /// original registrations catches assignments that quiesced with every
    /// root a singleton yet violate a constraint, which per-root checks skip
    /// by design of the singleton early-out.
    fn exhausted_status(&self) -> Status {
        if self.domains.any_empty() {
            return Status::Invalid;
        }
        if !self.domains.all_singletons() {
            return Status::TooWeak;
        }
        for (scope, predicate) in &self.constraints {
            let assignment: Vec<V> = scope
                .variables()
                .iter()
                .map(|&variable| {
                    self.domains
                        .singleton(variable)
                        .expect("all domains are singletons")
                        .clone()
                })
                .collect();
            if !predicate.satisfied(&assignment) {
                return Status::Invalid;
            }
        }
        Status::Finished
    }

    fn record_check(&mut self, scope: &Scope, before: usize, elapsed: Duration) {
        self.stats.checks += 1;
        let pruned = (before - self.domains.len_of(scope.root())) as u64;
        self.stats.prunings += pruned;
        let family = self.stats.family_stats.entry(scope.family()).or_default();
        if family.label.is_empty() {
            if let Some(label) = scope.label() {
                family.label = label.to_string();
            }
        }
        family.checks += 1;
        family.prunings += pruned;
        family.time_spent_micros += elapsed.as_micros() as u64;
    }
}
