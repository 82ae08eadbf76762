//! Convenience alias for the hash-map implementation used by this crate.

pub use hashbrown::hash_map::Entry;

/// Hash-map used for the handle↔node bookkeeping of the dynamic tree.
pub type HashMap<K, V> = hashbrown::HashMap<K, V>;
