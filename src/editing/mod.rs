//! Inline editing coordination.
//!
//! - `lock`: EditLockState - which components are locked and until when
//! - `lifecycle`: ComponentPhase - per-component layout state machine

pub mod lifecycle;
pub mod lock;

pub use lifecycle::{ComponentPhase, LifecycleEvent};
pub use lock::{EditLockState, LockRelease, ReleaseReason, Timestamp, DEFAULT_IDLE_RELEASE};
