//! Per-component layout lifecycle.
//!
//! ```text
//! Idle ──FocusAcquired──▶ Editing ──LockReleased──▶ PendingRelease
//!   ▲                      │  ▲                          │
//!   │                 DataChanged                   PassStarted
//!   │                      └──┘                          ▼
//! Paginated ◀──PassCompleted{provisional: false}──── Measuring
//! ```
//!
//! `DataChanged` or `Invalidated` outside of editing moves a component
//! straight to `PendingRelease`. A provisional pass (pending measurements)
//! leaves the component in `PendingRelease` so the next pass picks it up
//! again.

use serde::Serialize;

/// Where a component sits between editing and a finished layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComponentPhase {
    /// Mounted, never laid out.
    #[default]
    Idle,
    /// Locked by an editor; layout suppressed.
    Editing,
    /// Needs a measurement and pagination pass.
    PendingRelease,
    /// Included in a pass that has not finished.
    Measuring,
    /// Laid out with authoritative sizes.
    Paginated,
}

/// Input to [`ComponentPhase::transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// An editor took the lock.
    FocusAcquired,
    /// Data the component reads was written.
    DataChanged,
    /// Page geometry, template or fonts changed.
    Invalidated,
    /// The edit lock was released.
    LockReleased,
    /// A layout pass began.
    PassStarted,
    /// A layout pass finished.
    PassCompleted {
        /// Some measurement was still pending.
        provisional: bool,
    },
}

impl ComponentPhase {
    /// Next phase after `event`. Events that do not apply leave the phase as is.
    pub fn transition(self, event: LifecycleEvent) -> Self {
        use ComponentPhase::*;
        use LifecycleEvent::*;

        match (self, event) {
            (_, FocusAcquired) => Editing,
            (Editing, DataChanged | Invalidated) => Editing,
            (_, DataChanged | Invalidated) => PendingRelease,
            (Editing, LockReleased) => PendingRelease,
            (Idle | PendingRelease, PassStarted) => Measuring,
            (Measuring, PassCompleted { provisional: false }) => Paginated,
            (Measuring, PassCompleted { provisional: true }) => PendingRelease,
            (phase, _) => phase,
        }
    }

    /// Whether the next pass must include this component.
    pub fn needs_pass(&self) -> bool {
        matches!(self, ComponentPhase::Idle | ComponentPhase::PendingRelease)
    }

    /// Whether an editor holds the lock.
    pub fn is_editing(&self) -> bool {
        *self == ComponentPhase::Editing
    }
}
