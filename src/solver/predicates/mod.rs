//! Reusable predicates for common constraint shapes.

pub mod all_distinct;

pub use all_distinct::AllDistinct;
