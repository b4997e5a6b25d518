//! The resource cache: typed handles, deferred post-construction, and
//! budget-driven LRU eviction.

pub mod cache;
pub mod handle;
pub mod payload;

pub use cache::{DecodedPayload, RemoveFlags, ResourceCache, ResourceLoader, UnloadFlags};
pub use handle::{ResourceBehavior, ResourceHandle, ResourceKind, ResourceStatus};
pub use payload::{Animation, AudioClip, Material, Model, PythonScript, ResourcePayload, Skeleton};
