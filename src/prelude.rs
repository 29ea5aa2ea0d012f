pub use crate::builder::{CacheBuilder, CachePolicy, DynPolicy};
pub use crate::cache::Cache;
pub use crate::clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use crate::error::{ConfigError, InvariantError, KeyNotFound};
#[cfg(feature = "concurrency")]
pub use crate::guard::MutexLock;
pub use crate::guard::{Guard, NoLock};
pub use crate::policy::fifo::FifoPolicy;
pub use crate::policy::lfu::LfuPolicy;
pub use crate::policy::lifo::LifoPolicy;
pub use crate::policy::lru::LruPolicy;
pub use crate::policy::mru::MruPolicy;
pub use crate::policy::random::RandomPolicy;
pub use crate::policy::ttl::TtlPolicy;
pub use crate::policy::{EvictionPolicy, InsertOptions, NoPolicy};
pub use crate::store::{HashMapStore, StoreCore, StoreMetrics, StoreMut};
