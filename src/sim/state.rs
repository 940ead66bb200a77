//! Session state and the events emitted to collaborators
//!
//! `GameState` is the single session context: claw, toys, controls,
//! collection and the timer queue. Nothing here is global; a restart
//! rebuilds everything but the RNG stream and the clock.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::claw::ClawAssembly;
use super::collection::{CollectedToken, Collection};
use super::control::{ControlKind, Controls};
use super::entity::{Axis, EntityRef, Kinematic, MoveOutcome, MoveRequest, Pose, Step};
use super::schedule::{Fire, Scheduler, TimerId};
use super::sequencer::{self, Cue};
use super::toy::ToyRegistry;
use crate::error::ClawError;
use crate::settings::Settings;

/// Grab sequencer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrabPhase {
    /// Scripted startup move to the rest pose; controls locked
    Homing,
    /// Waiting for the horizontal control
    Idle,
    /// Rail travelling toward the far wall
    AimingHorizontal,
    /// Player jogs the joint with the vertical control
    AimingVertical,
    /// Pre-descent delay, then the arm extends to full reach
    Descending,
    /// Delay at the bottom before the gripper closes
    Grabbing,
    /// Arm retracting
    Retracting,
    /// Rail, then joint, returning to rest
    Ascending,
    /// Gripper open, toy falling to the collection point
    Dropping,
}

/// One-way notifications for the rendering, display and victory collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Pose { entity: EntityRef, pose: Pose },
    ShadowScale { scale: f32 },
    PhaseChanged { phase: GrabPhase },
    ControlLock { control: ControlKind, locked: bool },
    Gripper { open: bool },
    Missed { missed: bool },
    ToyGrabbed { index: u32 },
    ToyReleased { index: u32 },
    ToyReady { index: u32 },
    CollectIndicator { active: bool },
    Overlay { visible: bool },
    ToyCollected { index: u32, token: CollectedToken },
    CollectionReset,
    Victory,
}

/// Complete session state
#[derive(Debug)]
pub struct GameState {
    pub settings: Settings,
    /// Seed the session RNG started from
    pub seed: u64,
    rng: Pcg32,
    pub sched: Scheduler,
    pub claw: ClawAssembly,
    pub toys: ToyRegistry,
    pub controls: Controls,
    pub collection: Collection,
    pub phase: GrabPhase,
    /// Toy targeted (and carried) during the current grab cycle
    pub target: Option<usize>,
    /// Controls have been unlocked at least once and victory not yet reached
    pub playing: bool,
    pub shadow_scale: f32,
    pub overlay: bool,
    pub collect_indicator: bool,
    events: Vec<GameEvent>,
}

/// Borrow one entity body out of the claw or the registry
fn body_mut<'a>(
    claw: &'a mut ClawAssembly,
    toys: &'a mut ToyRegistry,
    entity: EntityRef,
) -> Option<&'a mut Kinematic> {
    match entity {
        EntityRef::Toy(slot) => toys.get_mut(slot).map(|t| &mut t.body),
        part => claw.part_mut(part),
    }
}

impl GameState {
    /// Create a session on the default cabinet and start homing
    pub fn new(seed: u64) -> Self {
        Self::build(Settings::default(), seed)
    }

    /// Create a session on validated settings and start homing
    pub fn with_settings(settings: Settings, seed: u64) -> Result<Self, ClawError> {
        settings.validate()?;
        Ok(Self::build(settings, seed))
    }

    fn build(settings: Settings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let toys = ToyRegistry::spawn(&settings, &mut rng);
        let claw = ClawAssembly::new(&settings);
        let collection = Collection::new(toys.len() as u32);
        let shadow_scale = claw.shadow_scale(&settings);

        let mut state = Self {
            settings,
            seed,
            rng,
            sched: Scheduler::new(),
            claw,
            toys,
            controls: Controls::default(),
            collection,
            phase: GrabPhase::Homing,
            target: None,
            playing: false,
            shadow_scale,
            overlay: false,
            collect_indicator: false,
            events: Vec::new(),
        };
        log::info!(
            "Claw machine session started (seed {}, {} toys)",
            seed,
            state.toys.len()
        );
        state.emit_all_poses();
        state.emit(GameEvent::ShadowScale { scale: shadow_scale });
        sequencer::start_homing(&mut state);
        state
    }

    /// Full re-initialization requested by the victory screen
    pub fn restart(&mut self) {
        log::info!("Restarting session");
        self.sched.clear();
        self.set_locked(ControlKind::Horizontal, true);
        self.set_locked(ControlKind::Vertical, true);
        self.set_overlay(false);
        self.set_collect_indicator(false);
        self.set_missed(false);
        self.set_gripper(false);

        self.claw = ClawAssembly::new(&self.settings);
        self.toys = ToyRegistry::spawn(&self.settings, &mut self.rng);
        self.collection.reset();
        self.target = None;
        self.playing = false;
        self.emit(GameEvent::CollectionReset);

        self.emit_all_poses();
        self.update_shadow();
        sequencer::start_homing(self);
    }

    /// Current simulation time (ms)
    pub fn now_ms(&self) -> u64 {
        self.sched.now_ms()
    }

    pub fn entity(&self, entity: EntityRef) -> Option<&Kinematic> {
        match entity {
            EntityRef::Toy(slot) => self.toys.get(slot).map(|t| &t.body),
            part => self.claw.part(part),
        }
    }

    pub fn entity_mut(&mut self, entity: EntityRef) -> Option<&mut Kinematic> {
        body_mut(&mut self.claw, &mut self.toys, entity)
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events emitted since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn emit_pose(&mut self, entity: EntityRef) {
        if let Some(pose) = self.entity(entity).map(Kinematic::pose) {
            self.emit(GameEvent::Pose { entity, pose });
        }
    }

    fn emit_all_poses(&mut self) {
        for part in [EntityRef::Rail, EntityRef::Joint, EntityRef::Arm] {
            self.emit_pose(part);
        }
        for slot in 0..self.toys.len() {
            self.emit_pose(EntityRef::Toy(slot));
        }
    }

    pub(crate) fn set_phase(&mut self, phase: GrabPhase) {
        if self.phase != phase {
            log::debug!("Phase {:?} -> {:?} at {} ms", self.phase, phase, self.now_ms());
            self.phase = phase;
            self.emit(GameEvent::PhaseChanged { phase });
        }
    }

    pub(crate) fn set_locked(&mut self, control: ControlKind, locked: bool) {
        if self.controls.set_locked(control, locked) {
            self.emit(GameEvent::ControlLock { control, locked });
        }
    }

    pub(crate) fn set_gripper(&mut self, open: bool) {
        if self.claw.gripper_open != open {
            self.claw.gripper_open = open;
            self.emit(GameEvent::Gripper { open });
        }
    }

    pub(crate) fn set_missed(&mut self, missed: bool) {
        if self.claw.missed != missed {
            self.claw.missed = missed;
            self.emit(GameEvent::Missed { missed });
        }
    }

    pub(crate) fn set_overlay(&mut self, visible: bool) {
        if self.overlay != visible {
            self.overlay = visible;
            self.emit(GameEvent::Overlay { visible });
        }
    }

    pub(crate) fn set_collect_indicator(&mut self, active: bool) {
        if self.collect_indicator != active {
            self.collect_indicator = active;
            self.emit(GameEvent::CollectIndicator { active });
        }
    }

    fn update_shadow(&mut self) {
        self.shadow_scale = self.claw.shadow_scale(&self.settings);
        self.emit(GameEvent::ShadowScale {
            scale: self.shadow_scale,
        });
    }

    /// Issue a toggling move; a cancelled movement's continuation runs now
    pub(crate) fn command(&mut self, entity: EntityRef, request: MoveRequest) {
        let Some(body) = body_mut(&mut self.claw, &mut self.toys, entity) else {
            log::warn!("Move requested for missing entity {:?}", entity);
            return;
        };
        match body.move_axis(request, &mut self.sched, entity) {
            MoveOutcome::Started(_) => {}
            MoveOutcome::Cancelled(cue) => {
                log::debug!("Cancelled movement of {:?}", entity);
                if let Some(cue) = cue {
                    sequencer::dispatch(self, cue);
                }
            }
        }
    }

    /// Start a fresh movement, discarding any stale one
    pub(crate) fn resume(&mut self, entity: EntityRef, request: MoveRequest) {
        match body_mut(&mut self.claw, &mut self.toys, entity) {
            Some(body) => {
                body.resume_move(request, &mut self.sched, entity);
            }
            None => log::warn!("Move requested for missing entity {:?}", entity),
        }
    }

    /// Run `cue` after `delay_ms`
    pub(crate) fn after(&mut self, delay_ms: u64, cue: Cue) {
        self.sched.after(delay_ms, cue);
    }

    /// Advance the clock, firing every timer that comes due on the way
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.sched.now_ms() + dt_ms;
        while let Some((timer, fire)) = self.sched.pop_due(until) {
            match fire {
                Fire::Tick(entity) => self.fire_tick(entity, timer),
                Fire::Delay(cue) => sequencer::dispatch(self, cue),
            }
        }
        self.sched.advance_to(until);
    }

    fn fire_tick(&mut self, entity: EntityRef, timer: TimerId) {
        let (step, interval) = {
            let Some(body) = body_mut(&mut self.claw, &mut self.toys, entity) else {
                return;
            };
            let Some(step) = body.step(timer) else {
                return;
            };
            (step, body.movement().map(|m| m.interval_ms))
        };

        match step {
            Step::Moved { axis, delta } => {
                self.emit_pose(entity);
                let linked_axis = axis.propagated();
                for link in self.claw.links(entity) {
                    if let Some(body) = self.entity_mut(link) {
                        body.apply_delta(linked_axis, delta);
                    }
                    self.emit_pose(link);
                }
                if axis == Axis::H && entity == EntityRef::Arm {
                    self.update_shadow();
                }
                if let Some(interval) = interval {
                    self.sched.rearm(timer, interval, entity);
                }
            }
            Step::Arrived(cue) => {
                if let Some(cue) = cue {
                    sequencer::dispatch(self, cue);
                }
            }
        }
    }
}
