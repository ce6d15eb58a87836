/// The base trait for any value that can appear in a variable's domain.
///
/// Domains are duplicate-free and predicate evaluation clones values into
/// scratch buffers, so candidate values must be cloneable, equatable and
/// hashable. This is a marker trait; any type satisfying the bounds
/// implements it.
pub trait DomainValue: Clone + Eq + std::hash::Hash + std::fmt::Debug + 'static {}
impl<T> DomainValue for T where T: Clone + Eq + std::hash::Hash + std::fmt::Debug + 'static {}
