//! Kinematic entities: positioned boxes that interpolate one axis at a time
//!
//! A movement advances its axis by at most `MAX_STEP` per tick toward the
//! target and never overshoots. Issuing a move while one is active is a
//! toggle: the active movement stops and its continuation is handed back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::schedule::{Scheduler, TimerId};
use super::sequencer::Cue;
use crate::consts::MAX_STEP;

/// Positional axes an entity can interpolate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    W,
    /// Vertical extension (height)
    H,
}

impl Axis {
    /// Axis a linked entity moves along when this axis moves
    #[inline]
    pub fn propagated(self) -> Axis {
        match self {
            Axis::H => Axis::Y,
            other => other,
        }
    }

    #[inline]
    fn slot(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::W => 2,
            Axis::H => 3,
        }
    }
}

/// Identifies an entity owned by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Rail,
    Joint,
    Arm,
    /// Slot in the toy registry
    Toy(usize),
}

/// Rotation pivot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Pivot {
    /// Top-left corner
    #[default]
    Origin,
    Center,
    /// Offset from the origin
    Offset(Vec2),
}

/// Everything the renderer needs to place an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Vec2,
    pub z: i32,
    pub size: Vec2,
    /// Signed rotation in degrees
    pub angle: f32,
    pub pivot: Pivot,
}

/// Parameters for starting a movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    pub axis: Axis,
    /// Falls back to the axis default when `None`
    pub target: Option<f32>,
    pub interval_ms: u64,
    pub on_complete: Option<Cue>,
}

impl MoveRequest {
    pub fn new(axis: Axis, interval_ms: u64) -> Self {
        Self {
            axis,
            target: None,
            interval_ms,
            on_complete: None,
        }
    }

    pub fn to(mut self, target: f32) -> Self {
        self.target = Some(target);
        self
    }

    pub fn then(mut self, cue: Cue) -> Self {
        self.on_complete = Some(cue);
        self
    }
}

/// The active movement of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    pub axis: Axis,
    pub target: f32,
    pub interval_ms: u64,
    pub on_complete: Option<Cue>,
    pub timer: TimerId,
}

/// Result of `Kinematic::move_axis`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveOutcome {
    Started(TimerId),
    /// An active movement was stopped instead; its continuation must run now
    Cancelled(Option<Cue>),
}

/// Result of one movement tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// The axis changed by `delta`; links follow on `axis.propagated()`
    Moved { axis: Axis, delta: f32 },
    /// The axis is at its target; the movement is over
    Arrived(Option<Cue>),
}

/// Number of ticks a leg of `distance` takes, including the completion tick
pub fn ticks_to_reach(distance: f32) -> u64 {
    (distance.abs() / MAX_STEP).ceil() as u64 + 1
}

/// A positioned, sized, z-ordered object with at most one active movement
#[derive(Debug, Clone)]
pub struct Kinematic {
    pub pos: Vec2,
    pub z: i32,
    pub size: Vec2,
    /// Signed display rotation in degrees
    pub angle: f32,
    pub pivot: Pivot,
    defaults: [f32; 4],
    movement: Option<Movement>,
}

impl Kinematic {
    pub fn new(rect: Rect, z: i32) -> Self {
        Self {
            pos: rect.origin,
            z,
            size: rect.size,
            angle: 0.0,
            pivot: Pivot::Origin,
            defaults: [rect.origin.x, rect.origin.y, rect.size.x, rect.size.y],
            movement: None,
        }
    }

    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.pos.x,
            Axis::Y => self.pos.y,
            Axis::W => self.size.x,
            Axis::H => self.size.y,
        }
    }

    pub fn set(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::X => self.pos.x = value,
            Axis::Y => self.pos.y = value,
            Axis::W => self.size.x = value,
            Axis::H => self.size.y = value,
        }
    }

    /// Shift an axis by a delta received from a driving entity
    #[inline]
    pub fn apply_delta(&mut self, axis: Axis, delta: f32) {
        self.set(axis, self.get(axis) + delta);
    }

    /// Resting value an untargeted move returns to
    pub fn default_value(&self, axis: Axis) -> f32 {
        self.defaults[axis.slot()]
    }

    pub fn set_default(&mut self, axis: Axis, value: f32) {
        self.defaults[axis.slot()] = value;
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn pose(&self) -> Pose {
        Pose {
            pos: self.pos,
            z: self.z,
            size: self.size,
            angle: self.angle,
            pivot: self.pivot,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.movement.is_some()
    }

    pub fn movement(&self) -> Option<&Movement> {
        self.movement.as_ref()
    }

    /// Start a movement, or stop the active one (press/release toggle).
    ///
    /// When a movement is active the request is ignored, the movement is
    /// dropped and its continuation is returned for the caller to run.
    pub fn move_axis(
        &mut self,
        request: MoveRequest,
        sched: &mut Scheduler,
        me: EntityRef,
    ) -> MoveOutcome {
        if let Some(active) = self.movement.take() {
            return MoveOutcome::Cancelled(active.on_complete);
        }
        MoveOutcome::Started(self.start(request, sched, me))
    }

    /// Discard any movement reference without running it, then start fresh
    pub fn resume_move(
        &mut self,
        request: MoveRequest,
        sched: &mut Scheduler,
        me: EntityRef,
    ) -> TimerId {
        self.movement = None;
        self.start(request, sched, me)
    }

    /// Stop moving without running the continuation
    pub fn halt(&mut self) -> Option<Movement> {
        self.movement.take()
    }

    /// Advance the movement owned by `timer` by one tick.
    ///
    /// Returns `None` for a stale timer (cancelled or replaced movement).
    pub fn step(&mut self, timer: TimerId) -> Option<Step> {
        let movement = self.movement?;
        if movement.timer != timer {
            return None;
        }

        let current = self.get(movement.axis);
        let distance = (current - movement.target).abs();
        if distance == 0.0 {
            self.movement = None;
            return Some(Step::Arrived(movement.on_complete));
        }

        let next = if distance <= MAX_STEP {
            movement.target
        } else {
            current + MAX_STEP * (movement.target - current).signum()
        };
        self.set(movement.axis, next);
        Some(Step::Moved {
            axis: movement.axis,
            delta: next - current,
        })
    }

    /// Distance between origins, rounded to the nearest whole unit
    pub fn distance_to(&self, other: &Kinematic) -> f32 {
        self.pos.distance(other.pos).round()
    }

    fn start(&mut self, request: MoveRequest, sched: &mut Scheduler, me: EntityRef) -> TimerId {
        assert!(
            request.interval_ms > 0,
            "movement tick interval must be positive"
        );
        let target = request
            .target
            .unwrap_or_else(|| self.default_value(request.axis));
        let timer = sched.every(request.interval_ms, me);
        self.movement = Some(Movement {
            axis: request.axis,
            target,
            interval_ms: request.interval_ms,
            on_complete: request.on_complete,
            timer,
        });
        timer
    }
}
