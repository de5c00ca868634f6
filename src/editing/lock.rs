//! Edit lock state.
//!
//! While a component is locked its data may change freely but it is neither
//! re-measured nor re-paginated. Locks are released by an idle timeout, by
//! blur, by cancel, or when the component unmounts; every release produces
//! exactly one [`LockRelease`] for the caller to turn into a relayout.
//!
//! All transitions are pure: they take the state by value and return the next
//! state. Time is passed in, never read.

use crate::model::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Idle time after the last edit before a lock releases by itself.
pub const DEFAULT_IDLE_RELEASE: Duration = Duration::from_secs(2);

/// Milliseconds on the host's monotonic clock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Wrap a raw host reading.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Raw milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// `self + duration`, saturating.
    pub fn after(&self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Why a lock was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseReason {
    /// No edit within the idle window.
    IdleTimeout,
    /// The editor lost focus.
    Blur,
    /// The edit was abandoned. Data already written stays.
    Cancel,
    /// The component left the canvas.
    Unmount,
}

/// A lock that has just been released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockRelease {
    /// Component whose lock ended.
    pub component: ComponentId,
    /// What ended it.
    pub reason: ReleaseReason,
    /// Edits made while the lock was held.
    pub edits: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldLock {
    deadline: Timestamp,
    edits: u32,
}

/// Set of locked components with their idle deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditLockState {
    idle_window: Duration,
    locks: BTreeMap<ComponentId, HeldLock>,
}

impl Default for EditLockState {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_RELEASE)
    }
}

impl EditLockState {
    /// Empty state releasing locks after `idle_window` without edits.
    pub fn new(idle_window: Duration) -> Self {
        Self {
            idle_window,
            locks: BTreeMap::new(),
        }
    }

    /// Time without edits after which a lock expires.
    pub fn idle_window(&self) -> Duration {
        self.idle_window
    }

    /// Lock `id`. Locking an already locked component restarts its idle window.
    pub fn request_component_lock(mut self, id: &ComponentId, now: Timestamp) -> Self {
        let deadline = now.after(self.idle_window);
        self.locks
            .entry(id.clone())
            .and_modify(|lock| lock.deadline = deadline)
            .or_insert_with(|| {
                debug!(component = %id, %deadline, "Edit lock acquired");
                HeldLock { deadline, edits: 0 }
            });
        self
    }

    /// Note an edit. Restarts the idle window; acquires the lock if needed.
    pub fn record_edit(mut self, id: &ComponentId, now: Timestamp) -> Self {
        let deadline = now.after(self.idle_window);
        let lock = self.locks.entry(id.clone()).or_insert(HeldLock { deadline, edits: 0 });
        lock.deadline = deadline;
        lock.edits = lock.edits.saturating_add(1);
        self
    }

    /// Release `id`. Returns `None` when it was not locked.
    pub fn release_component_lock(
        mut self,
        id: &ComponentId,
        reason: ReleaseReason,
    ) -> (Self, Option<LockRelease>) {
        let release = self.locks.remove(id).map(|lock| {
            debug!(component = %id, ?reason, edits = lock.edits, "Edit lock released");
            LockRelease {
                component: id.clone(),
                reason,
                edits: lock.edits,
            }
        });
        (self, release)
    }

    /// Release every lock whose deadline is at or before `now`.
    pub fn expire(mut self, now: Timestamp) -> (Self, Vec<LockRelease>) {
        let expired: Vec<ComponentId> = self
            .locks
            .iter()
            .filter(|(_, lock)| lock.deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        let mut releases = Vec::with_capacity(expired.len());
        for id in expired {
            let (next, release) = self.release_component_lock(&id, ReleaseReason::IdleTimeout);
            self = next;
            releases.extend(release);
        }
        (self, releases)
    }

    /// Earliest pending deadline, for scheduling the next `expire`.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.locks.values().map(|lock| lock.deadline).min()
    }

    /// Idle deadline of `id`, if locked.
    pub fn deadline_of(&self, id: &ComponentId) -> Option<Timestamp> {
        self.locks.get(id).map(|lock| lock.deadline)
    }

    /// Whether an editor holds `id`.
    pub fn is_locked(&self, id: &ComponentId) -> bool {
        self.locks.contains_key(id)
    }

    /// Locked components in id order.
    pub fn locked(&self) -> impl Iterator<Item = &ComponentId> {
        self.locks.keys()
    }

    /// Whether nothing is locked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cid(raw: &str) -> ComponentId {
        ComponentId::new(raw).unwrap()
    }

    fn at(millis: u64) -> Timestamp {
        Timestamp::from_millis(millis)
    }

    #[test]
    fn lock_sets_deadline_one_window_out() {
        let state = EditLockState::default().request_component_lock(&cid("a"), at(1_000));
        assert!(state.is_locked(&cid("a")));
        assert_eq!(state.deadline_of(&cid("a")), Some(at(3_000)));
    }

    #[test]
    fn each_edit_pushes_deadline() {
        let state = EditLockState::default()
            .request_component_lock(&cid("a"), at(0))
            .record_edit(&cid("a"), at(500))
            .record_edit(&cid("a"), at(1_500));
        assert_eq!(state.deadline_of(&cid("a")), Some(at(3_500)));

        let (state, released) = state.expire(at(3_499));
        assert!(released.is_empty());
        let (state, released) = state.expire(at(3_500));
        assert_eq!(
            released,
            vec![LockRelease {
                component: cid("a"),
                reason: ReleaseReason::IdleTimeout,
                edits: 2,
            }]
        );
        assert!(state.is_empty());
    }

    #[test]
    fn release_of_unlocked_component_is_none() {
        let (state, release) =
            EditLockState::default().release_component_lock(&cid("a"), ReleaseReason::Blur);
        assert_eq!(release, None);
        assert!(state.is_empty());
    }

    #[test]
    fn release_happens_once() {
        let state = EditLockState::default().request_component_lock(&cid("a"), at(0));
        let (state, first) = state.release_component_lock(&cid("a"), ReleaseReason::Blur);
        let (_, second) = state.expire(at(10_000));
        assert!(first.is_some());
        assert!(second.is_empty());
    }

    #[test]
    fn locks_are_independent() {
        let state = EditLockState::default()
            .request_component_lock(&cid("a"), at(0))
            .request_component_lock(&cid("b"), at(1_000));
        assert_eq!(state.next_deadline(), Some(at(2_000)));

        let (state, released) = state.expire(at(2_000));
        assert_eq!(released.len(), 1);
        assert_eq!(released[0].component, cid("a"));
        assert!(state.is_locked(&cid("b")));
    }

    #[test]
    fn custom_idle_window() {
        let state = EditLockState::new(Duration::from_millis(250))
            .request_component_lock(&cid("a"), at(100));
        assert_eq!(state.deadline_of(&cid("a")), Some(at(350)));
    }

    #[test]
    fn record_edit_acquires_missing_lock() {
        let state = EditLockState::default().record_edit(&cid("a"), at(0));
        assert!(state.is_locked(&cid("a")));
    }
}
