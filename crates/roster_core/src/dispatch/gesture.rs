//! Press-and-hold detection over abstract pointer events.
//!
//! # Responsibility
//! - Turn down/move/up/cancel sequences into taps and long presses.
//! - Model the hold timer as a cancellable deadline polled by the host.
//!
//! # Invariants
//! - A press fires at most one gesture.
//! - Moving beyond the slop cancels the hold; the release is then a tap.
//! - Releasing before the deadline is a tap; cancelling is nothing.
//! - Each item owns its own tracker; trackers never share timers.

use crate::config::RosterConfig;
use crate::view::render::ItemHandle;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressThresholds {
    pub hold_ms: u64,
    pub slop_px: f32,
}

impl PressThresholds {
    pub fn from_config(config: &RosterConfig) -> Self {
        Self {
            hold_ms: config.long_press_ms,
            slop_px: config.long_press_slop_px,
        }
    }
}

impl Default for PressThresholds {
    fn default() -> Self {
        Self::from_config(&RosterConfig::default())
    }
}

/// Pointer input for one item. Timestamps are host milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { at_ms: u64, position: Point },
    Move { at_ms: u64, position: Point },
    Up { at_ms: u64 },
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Tap,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PressState {
    Idle,
    Holding { started_ms: u64, origin: Point },
    /// Moved too far; the hold timer is cancelled.
    Drifted,
    /// Long press already delivered; the release is swallowed.
    Fired,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressTracker {
    thresholds: PressThresholds,
    state: PressState,
}

impl PressTracker {
    pub fn new(thresholds: PressThresholds) -> Self {
        Self {
            thresholds,
            state: PressState::Idle,
        }
    }

    /// Feeds one pointer event.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Gesture> {
        match event {
            PointerEvent::Down { at_ms, position } => {
                self.state = PressState::Holding {
                    started_ms: at_ms,
                    origin: position,
                };
                None
            }
            PointerEvent::Move { at_ms, position } => {
                if let Some(gesture) = self.poll(at_ms) {
                    return Some(gesture);
                }
                if let PressState::Holding { origin, .. } = self.state {
                    if origin.distance(position) > self.thresholds.slop_px {
                        self.state = PressState::Drifted;
                    }
                }
                None
            }
            PointerEvent::Up { at_ms } => {
                let released = std::mem::replace(&mut self.state, PressState::Idle);
                match released {
                    PressState::Holding { started_ms, .. }
                        if at_ms.saturating_sub(started_ms) >= self.thresholds.hold_ms =>
                    {
                        Some(Gesture::LongPress)
                    }
                    PressState::Holding { .. } | PressState::Drifted => Some(Gesture::Tap),
                    PressState::Fired | PressState::Idle => None,
                }
            }
            PointerEvent::Cancel => {
                self.state = PressState::Idle;
                None
            }
        }
    }

    /// Fires the hold timer if its deadline has passed.
    pub fn poll(&mut self, now_ms: u64) -> Option<Gesture> {
        match self.deadline_ms() {
            Some(deadline) if now_ms >= deadline => {
                self.state = PressState::Fired;
                Some(Gesture::LongPress)
            }
            _ => None,
        }
    }

    /// When the pending hold timer fires, if one is pending.
    pub fn deadline_ms(&self) -> Option<u64> {
        match self.state {
            PressState::Holding { started_ms, .. } => {
                Some(started_ms.saturating_add(self.thresholds.hold_ms))
            }
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == PressState::Idle
    }
}

/// One press tracker per rendered item.
#[derive(Debug, Clone, Default)]
pub struct GestureRouter {
    thresholds: PressThresholds,
    trackers: BTreeMap<ItemHandle, PressTracker>,
}

impl GestureRouter {
    pub fn new(thresholds: PressThresholds) -> Self {
        Self {
            thresholds,
            trackers: BTreeMap::new(),
        }
    }

    /// Routes a pointer event to the tracker owned by `handle`.
    pub fn pointer(&mut self, handle: ItemHandle, event: PointerEvent) -> Option<Gesture> {
        let thresholds = self.thresholds;
        let tracker = self
            .trackers
            .entry(handle)
            .or_insert_with(|| PressTracker::new(thresholds));
        let gesture = tracker.handle(event);
        if tracker.is_idle() {
            self.trackers.remove(&handle);
        }
        gesture
    }

    /// Fires every hold timer due at `now_ms`.
    pub fn tick(&mut self, now_ms: u64) -> Vec<(ItemHandle, Gesture)> {
        self.trackers
            .iter_mut()
            .filter_map(|(handle, tracker)| tracker.poll(now_ms).map(|gesture| (*handle, gesture)))
            .collect()
    }

    /// Earliest pending deadline across all items.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.trackers
            .values()
            .filter_map(PressTracker::deadline_ms)
            .min()
    }

    /// Drops every tracker; handles may no longer match rendered items.
    pub fn clear(&mut self) {
        self.trackers.clear();
    }
}
