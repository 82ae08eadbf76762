//! Various utilities shared by the two trees.

pub use self::sorted_pair::SortedPair;
pub use self::thread_pool::ThreadPool;

pub mod hashmap;
mod sorted_pair;
mod thread_pool;
