//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::{BTreeMap, BTreeSet};

/// SmallVec for hierarchy children (usually a handful per node).
pub type SmallVec4<T> = SmallVec<[T; 4]>;
