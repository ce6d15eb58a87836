//! Cribro is a tunable constraint-propagation engine.
//!
//! The algorithm, PC0-k, generalizes classical arc consistency (AC-3): every
//! check roots a constraint at one variable and searches for a jointly
//! consistent extension across that constraint plus up to `k` additional
//! overlapping constraints, removing root values with no such support. At
//! `k = 0` this is ordinary arc consistency; each increment of `k` prunes
//! strictly more at combinatorial cost.
//!
//! # Core Concepts
//!
//! - **[`Scope`]**: an ordered tuple of variables a constraint is defined
//!   over. Rotations of one logical constraint share a [`FamilyId`], so the
//!   engine can root a check at any participant while recognizing the
//!   rotations as one constraint.
//! - **[`Predicate`]**: the rule itself, a pure function over values aligned
//!   with a scope's variables. Plain closures work.
//! - **[`Engine`]**: owns the domains, worklist and random source; exposes
//!   single-step and run-to-completion driving plus the escalation protocol
//!   for when propagation stalls.
//!
//! [`Scope`]: solver::scope::Scope
//! [`FamilyId`]: solver::scope::FamilyId
//! [`Predicate`]: solver::predicate::Predicate
//! [`Engine`]: solver::engine::Engine
//!
//! # Example: A Simple 2-Variable Problem
//!
//! Solving `v0 != v1` where `v0` can be `1` or `2` and `v1` can only be `1`;
//! propagation alone deduces that `v0` must be `2`.
//!
//! ```
//! use std::{collections::HashMap, sync::Arc};
//!
//! use cribro::solver::{
//!     engine::{Engine, Status},
//!     predicate::SharedPredicate,
//!     scope::{FamilyId, Scope},
//! };
//!
//! let domains = vec![vec![1, 2], vec![1]];
//!
//! let not_equal: SharedPredicate<i32> = Arc::new(|values: &[i32]| values[0] != values[1]);
//! let scope = Scope::new(vec![0, 1], FamilyId(0)).with_label("v0 != v1");
//! let constraints = vec![
//!     (scope.clone(), not_equal.clone()),
//!     (scope.rotated(), not_equal),
//! ];
//!
//! let mut engine = Engine::seeded(0, domains, HashMap::new(), constraints, 7).unwrap();
//! assert_eq!(engine.run_to_completion(), Status::Finished);
//! assert_eq!(engine.domain(0).front(), Some(&2));
//! ```
//!
//! When `run_to_completion` returns [`Status::TooWeak`], the domains are
//! pruned as far as strength `k` can see; [`Engine::escalate`] rebuilds at
//! `k + 1` over those domains, and [`Engine::run_with_escalation`] packages
//! the loop up to a caller-chosen ceiling.
//!
//! [`Status::TooWeak`]: solver::engine::Status::TooWeak
//! [`Engine::escalate`]: solver::engine::Engine::escalate
//! [`Engine::run_with_escalation`]: solver::engine::Engine::run_with_escalation

pub mod error;
pub mod solver;
