//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Millisecond clock driven only by `tick`/`advance`
//! - Seeded RNG only
//! - Timers fire in (due time, creation order)
//! - No rendering or platform dependencies

pub mod autoplay;
pub mod claw;
pub mod collection;
pub mod control;
pub mod entity;
pub mod rect;
pub mod schedule;
pub mod sequencer;
pub mod state;
pub mod targeting;
pub mod tick;
pub mod toy;

pub use autoplay::AutoPlayer;
pub use claw::ClawAssembly;
pub use collection::{CollectedToken, Collection};
pub use control::{ButtonEdge, ControlKind, Controls};
pub use entity::{Axis, EntityRef, Kinematic, MoveRequest, Pivot, Pose, ticks_to_reach};
pub use rect::Rect;
pub use schedule::{Scheduler, TimerId};
pub use sequencer::Cue;
pub use state::{GameEvent, GameState, GrabPhase};
pub use targeting::{capture_rect, select_target};
pub use tick::{FrameStepper, TickInput, tick};
pub use toy::{Toy, ToyKind, ToyRegistry, ToyStatus};
