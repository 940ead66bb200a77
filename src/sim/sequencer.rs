//! Grab sequencer
//!
//! Every continuation in the game is a `Cue`. Movements carry one to run on
//! arrival (or on cancellation), delays carry one to run when they elapse,
//! and `dispatch` is the transition table. Player input enters through
//! `press`, `release` and `collect`.
//!
//! One cycle: horizontal press moves the rail toward the far wall; release
//! (or arrival) hands over to the vertical control; vertical release starts
//! the scripted part: delay, open and extend, delay, close and grab, retract,
//! return rail, return joint, drop, delay, unlock.

use super::control::{ButtonEdge, ControlKind};
use super::entity::{Axis, EntityRef, MoveRequest, Pivot};
use super::state::{GameEvent, GameState, GrabPhase};
use super::targeting::acquire_target;
use super::toy::ToyStatus;
use crate::consts::{DISPLAY_Z, DROPPED_Z};
use crate::error::ClawError;

/// Named continuation fired by a finished movement or an elapsed delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Startup: joint reached its rest height
    HomingJointDone,
    /// Startup: rail reached its rest position
    HomingRailDone,
    /// Rail stopped (far wall or horizontal release)
    AimHorizontalDone,
    /// Pre-descent delay elapsed
    OpenGripper,
    /// Arm reached full reach
    ExtendDone,
    /// Delay at the bottom elapsed
    Grab,
    RetractDone,
    RailReturned,
    JointReturned,
    /// Post-drop delay elapsed
    DropSettled,
    /// Collected toy has been shown long enough
    CollectDisplayDone,
}

/// Scripted startup: joint to its rest height, then rail to its rest position
pub fn start_homing(state: &mut GameState) {
    state.set_phase(GrabPhase::Homing);
    let fast = state.settings.timing.fast_move_tick_ms;
    let rest_y = state.settings.joint_rest_y();
    state.command(
        EntityRef::Joint,
        MoveRequest::new(Axis::Y, fast)
            .to(rest_y)
            .then(Cue::HomingJointDone),
    );
}

/// Route a control edge; returns false when the control is locked
pub fn handle_control(state: &mut GameState, control: ControlKind, edge: ButtonEdge) -> bool {
    match edge {
        ButtonEdge::Press => press(state, control),
        ButtonEdge::Release => release(state, control),
    }
}

pub fn press(state: &mut GameState, control: ControlKind) -> bool {
    if state.controls.is_locked(control) {
        log::debug!("Ignoring {:?} press: control locked", control);
        return false;
    }
    match control {
        ControlKind::Horizontal => {
            state.set_missed(false);
            state.set_phase(GrabPhase::AimingHorizontal);
            let request = aim_horizontal_request(state);
            state.command(EntityRef::Rail, request);
        }
        ControlKind::Vertical => {
            let tick = state.settings.timing.move_tick_ms;
            let near_y = state.settings.joint_near_y();
            state.command(EntityRef::Joint, MoveRequest::new(Axis::Y, tick).to(near_y));
        }
    }
    true
}

pub fn release(state: &mut GameState, control: ControlKind) -> bool {
    if state.controls.is_locked(control) {
        log::debug!("Ignoring {:?} release: control locked", control);
        return false;
    }
    match control {
        ControlKind::Horizontal => {
            if state.claw.rail.is_moving() {
                // Same request again: the toggle stops the rail and runs its cue
                let request = aim_horizontal_request(state);
                state.command(EntityRef::Rail, request);
            } else {
                switch_to_vertical(state);
            }
        }
        ControlKind::Vertical => begin_grab(state),
    }
    true
}

/// Pick up a toy waiting at the collection point (by creation index).
///
/// Returns `Ok(false)` when the toy is not ready to collect.
pub fn collect(state: &mut GameState, index: u32) -> Result<bool, ClawError> {
    let slot = state.toys.slot_of(index).ok_or(ClawError::UnknownToy(index))?;
    let center = state.settings.machine_center();
    let Some(toy) = state.toys.get_mut(slot) else {
        return Err(ClawError::UnknownToy(index));
    };
    if toy.status != ToyStatus::ReadyToCollect {
        log::warn!("Toy #{} is not ready to collect ({:?})", index, toy.status);
        return Ok(false);
    }

    toy.body.halt();
    toy.body.pos = center - toy.body.size / 2.0;
    toy.body.z = DISPLAY_Z;
    toy.body.angle = 0.0;
    toy.body.pivot = Pivot::Center;
    toy.status = ToyStatus::Collected;
    let kind = toy.kind;
    state.emit_pose(EntityRef::Toy(slot));

    let token = state.collection.record(kind);
    log::info!(
        "Collected {} ({}/{})",
        kind.as_str(),
        state.collection.count(),
        state.collection.total()
    );
    state.emit(GameEvent::ToyCollected { index, token });
    state.set_overlay(true);
    let delay = state.settings.timing.collect_display_ms;
    state.after(delay, Cue::CollectDisplayDone);
    Ok(true)
}

/// Developer shortcut: signal victory now (still at most once per session)
pub fn force_victory(state: &mut GameState) {
    if state.collection.force_win() {
        signal_victory(state);
    }
}

/// Transition table: run the continuation named by `cue`
pub fn dispatch(state: &mut GameState, cue: Cue) {
    let timing = state.settings.timing;
    match cue {
        Cue::HomingJointDone => {
            let rest_x = state.settings.rail_rest_x();
            state.resume(
                EntityRef::Rail,
                MoveRequest::new(Axis::X, timing.fast_move_tick_ms)
                    .to(rest_x)
                    .then(Cue::HomingRailDone),
            );
        }
        Cue::HomingRailDone => {
            let rest_x = state.settings.rail_rest_x();
            let rest_y = state.settings.joint_rest_y();
            state.claw.joint.set_default(Axis::Y, rest_y);
            state.claw.joint.set_default(Axis::X, rest_x);
            state.claw.rail.set_default(Axis::X, rest_x);
            log::info!("Homing complete, controls ready");
            state.playing = true;
            activate_horizontal(state);
        }
        Cue::AimHorizontalDone => switch_to_vertical(state),
        Cue::OpenGripper => {
            state.set_gripper(true);
            let reach = state.settings.max_arm_length();
            state.command(
                EntityRef::Arm,
                MoveRequest::new(Axis::H, timing.move_tick_ms)
                    .to(reach)
                    .then(Cue::ExtendDone),
            );
        }
        Cue::ExtendDone => {
            state.set_phase(GrabPhase::Grabbing);
            state.after(timing.grab_delay_ms, Cue::Grab);
        }
        Cue::Grab => {
            state.set_gripper(false);
            grab_toy(state);
            state.set_phase(GrabPhase::Retracting);
            state.resume(
                EntityRef::Arm,
                MoveRequest::new(Axis::H, timing.move_tick_ms).then(Cue::RetractDone),
            );
        }
        Cue::RetractDone => {
            state.set_phase(GrabPhase::Ascending);
            state.resume(
                EntityRef::Rail,
                MoveRequest::new(Axis::X, timing.move_tick_ms).then(Cue::RailReturned),
            );
        }
        Cue::RailReturned => {
            state.resume(
                EntityRef::Joint,
                MoveRequest::new(Axis::Y, timing.move_tick_ms).then(Cue::JointReturned),
            );
        }
        Cue::JointReturned => {
            state.set_phase(GrabPhase::Dropping);
            drop_toy(state);
        }
        Cue::DropSettled => {
            state.set_gripper(false);
            activate_horizontal(state);
            if let Some(slot) = state.target.take() {
                if let Some(toy) = state.toys.get_mut(slot) {
                    toy.status = ToyStatus::ReadyToCollect;
                    let index = toy.index;
                    state.emit(GameEvent::ToyReady { index });
                }
                state.set_collect_indicator(true);
            }
        }
        Cue::CollectDisplayDone => {
            state.set_overlay(false);
            if !state.toys.any_ready() {
                state.set_collect_indicator(false);
            }
            if state.collection.check_win() {
                signal_victory(state);
            }
        }
    }
}

fn aim_horizontal_request(state: &GameState) -> MoveRequest {
    MoveRequest::new(Axis::X, state.settings.timing.move_tick_ms)
        .to(state.settings.rail_far_x())
        .then(Cue::AimHorizontalDone)
}

/// Unlock the horizontal control for a new cycle
fn activate_horizontal(state: &mut GameState) {
    state.claw.halt_all();
    state.set_locked(ControlKind::Horizontal, false);
    state.set_phase(GrabPhase::Idle);
}

fn switch_to_vertical(state: &mut GameState) {
    state.claw.joint.halt();
    state.set_locked(ControlKind::Horizontal, true);
    state.set_locked(ControlKind::Vertical, false);
    state.set_phase(GrabPhase::AimingVertical);
}

/// Vertical release: stop jogging and schedule the scripted descent
fn begin_grab(state: &mut GameState) {
    state.claw.joint.halt();
    state.set_locked(ControlKind::Vertical, true);
    state.set_phase(GrabPhase::Descending);
    let delay = state.settings.timing.grab_delay_ms;
    state.after(delay, Cue::OpenGripper);
}

/// Close on whatever is under the claw, or flag a miss
fn grab_toy(state: &mut GameState) {
    let claw_rect = state.claw.capture_rect(&state.settings);
    state.target = acquire_target(&mut state.toys, &claw_rect);

    let Some(slot) = state.target else {
        log::debug!("Grab missed at {:?}", claw_rect.origin);
        state.set_missed(true);
        return;
    };
    state.claw.attach(slot);
    if let Some(toy) = state.toys.get_mut(slot) {
        toy.status = ToyStatus::Grabbed;
        toy.apply_hanging_angle();
        let index = toy.index;
        state.emit_pose(EntityRef::Toy(slot));
        state.emit(GameEvent::ToyGrabbed { index });
    }
}

/// Open the gripper and let the carried toy fall on its own
fn drop_toy(state: &mut GameState) {
    state.set_gripper(true);
    if let Some(slot) = state.target {
        let fast = state.settings.timing.fast_move_tick_ms;
        let drop = state.toys.get_mut(slot).map(|toy| {
            toy.body.z = DROPPED_Z;
            (toy.index, toy.body.size.y)
        });
        if let Some((index, height)) = drop {
            state.emit_pose(EntityRef::Toy(slot));
            let drop_y = state.settings.drop_y(height);
            state.command(
                EntityRef::Toy(slot),
                MoveRequest::new(Axis::Y, fast).to(drop_y),
            );
            state.emit(GameEvent::ToyReleased { index });
        }
        state.claw.detach();
    }
    let delay = state.settings.timing.drop_delay_ms;
    state.after(delay, Cue::DropSettled);
}

fn signal_victory(state: &mut GameState) {
    log::info!("All toys collected!");
    state.playing = false;
    state.emit(GameEvent::Victory);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    /// A session that finished homing
    fn homed(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.advance(2_000);
        assert_eq!(state.phase, GrabPhase::Idle);
        state.drain_events();
        state
    }

    /// Put toy `slot` right under the resting claw, everything else out of reach
    fn plant_under_claw(state: &mut GameState, slot: usize) {
        let rect = state.claw.capture_rect(&state.settings);
        for other in 0..state.toys.len() {
            state.toys.get_mut(other).unwrap().body.pos = Vec2::new(-100.0, -100.0);
        }
        state.toys.get_mut(slot).unwrap().body.pos = rect.origin + Vec2::new(5.0, 5.0);
    }

    #[test]
    fn test_homing_sets_rest_defaults() {
        let state = homed(1);
        assert_eq!(state.claw.rail.pos.x, 36.0);
        assert_eq!(state.claw.joint.pos, Vec2::new(36.0, 184.0));
        assert_eq!(state.claw.rail.default_value(Axis::X), 36.0);
        assert_eq!(state.claw.joint.default_value(Axis::Y), 184.0);
        assert!(!state.controls.is_locked(ControlKind::Horizontal));
        assert!(state.controls.is_locked(ControlKind::Vertical));
        assert!(state.playing);
    }

    #[test]
    fn test_locked_controls_ignore_input() {
        let mut state = GameState::new(1);
        assert!(!press(&mut state, ControlKind::Horizontal));
        assert!(!release(&mut state, ControlKind::Vertical));
        assert_eq!(state.phase, GrabPhase::Homing);
    }

    #[test]
    fn test_horizontal_release_hands_over_to_vertical() {
        let mut state = homed(2);
        assert!(press(&mut state, ControlKind::Horizontal));
        assert_eq!(state.phase, GrabPhase::AimingHorizontal);
        state.advance(300);
        assert_eq!(state.claw.rail.pos.x, 66.0);

        assert!(release(&mut state, ControlKind::Horizontal));
        assert_eq!(state.phase, GrabPhase::AimingVertical);
        assert!(!state.claw.rail.is_moving());
        assert!(state.controls.is_locked(ControlKind::Horizontal));
        assert!(!state.controls.is_locked(ControlKind::Vertical));

        // No further ticks from the cancelled movement
        state.advance(1_000);
        assert_eq!(state.claw.rail.pos.x, 66.0);
        assert_eq!(state.claw.joint.pos.x, 66.0);
    }

    #[test]
    fn test_rail_arrival_hands_over_to_vertical() {
        let mut state = homed(3);
        press(&mut state, ControlKind::Horizontal);
        // 36 -> 324 is 29 steps plus the completion tick
        state.advance(3_000);
        assert_eq!(state.claw.rail.pos.x, 324.0);
        assert_eq!(state.phase, GrabPhase::AimingVertical);
        // Release of a locked control is swallowed
        assert!(!release(&mut state, ControlKind::Horizontal));
    }

    #[test]
    fn test_vertical_press_toggles_jogging() {
        let mut state = homed(4);
        press(&mut state, ControlKind::Horizontal);
        release(&mut state, ControlKind::Horizontal);
        press(&mut state, ControlKind::Vertical);
        state.advance(200);
        assert_eq!(state.claw.joint.pos.y, 164.0);
        press(&mut state, ControlKind::Vertical);
        state.advance(500);
        assert_eq!(state.claw.joint.pos.y, 164.0);
        assert_eq!(state.phase, GrabPhase::AimingVertical);
    }

    #[test]
    fn test_grab_attaches_toy_under_claw() {
        let mut state = homed(5);
        plant_under_claw(&mut state, 3);
        let index = state.toys.get(3).unwrap().index;

        press(&mut state, ControlKind::Horizontal);
        release(&mut state, ControlKind::Horizontal);
        press(&mut state, ControlKind::Vertical);
        release(&mut state, ControlKind::Vertical);
        assert_eq!(state.phase, GrabPhase::Descending);
        assert!(state.controls.is_locked(ControlKind::Vertical));

        // Pre-descent delay + 32 extension steps + completion + grab delay
        state.advance(500 + 3_300 + 500);
        assert_eq!(state.phase, GrabPhase::Retracting);
        assert_eq!(state.claw.attached, Some(3));
        assert_eq!(state.target, Some(3));
        assert!(!state.claw.missed);
        let toy = state.toys.get(3).unwrap();
        assert_eq!(toy.status, ToyStatus::Grabbed);
        assert!(matches!(toy.body.pivot, Pivot::Offset(_)));
        assert!(state.drain_events().contains(&GameEvent::ToyGrabbed { index }));
    }

    #[test]
    fn test_empty_grab_sets_missed() {
        let mut state = homed(6);
        // Clear the pit so nothing can be caught
        for slot in 0..state.toys.len() {
            state.toys.get_mut(slot).unwrap().body.pos = Vec2::new(-100.0, -100.0);
        }
        press(&mut state, ControlKind::Horizontal);
        release(&mut state, ControlKind::Horizontal);
        press(&mut state, ControlKind::Vertical);
        release(&mut state, ControlKind::Vertical);
        state.advance(4_300);

        assert!(state.claw.missed);
        assert_eq!(state.claw.attached, None);
        assert_eq!(state.target, None);
        assert_eq!(state.phase, GrabPhase::Retracting);

        // The next horizontal press clears the flag
        state.advance(10_000);
        assert_eq!(state.phase, GrabPhase::Idle);
        press(&mut state, ControlKind::Horizontal);
        assert!(!state.claw.missed);
    }

    #[test]
    fn test_collect_requires_ready_toy() {
        let mut state = homed(7);
        assert!(matches!(collect(&mut state, 8), Err(ClawError::UnknownToy(8))));
        assert_eq!(collect(&mut state, 0).unwrap(), false);
        assert_eq!(state.collection.count(), 0);
    }

    #[test]
    fn test_collect_moves_toy_to_display() {
        let mut state = homed(8);
        let slot = state.toys.slot_of(2).unwrap();
        state.toys.get_mut(slot).unwrap().status = ToyStatus::ReadyToCollect;
        state.set_collect_indicator(true);

        assert!(collect(&mut state, 2).unwrap());
        let toy = state.toys.get(slot).unwrap();
        assert_eq!(toy.status, ToyStatus::Collected);
        assert_eq!(toy.body.rect().center(), state.settings.machine_center());
        assert_eq!(toy.body.z, DISPLAY_Z);
        assert_eq!(toy.body.pivot, Pivot::Center);
        assert_eq!(state.collection.count(), 1);
        assert!(state.overlay);

        state.advance(1_000);
        assert!(!state.overlay);
        assert!(!state.collect_indicator);
        // Second collection of the same toy is refused
        assert_eq!(collect(&mut state, 2).unwrap(), false);
    }

    #[test]
    fn test_force_victory_signals_once() {
        let mut state = homed(9);
        force_victory(&mut state);
        force_victory(&mut state);
        let victories = state
            .drain_events()
            .iter()
            .filter(|e| **e == GameEvent::Victory)
            .count();
        assert_eq!(victories, 1);
        assert!(!state.playing);
    }
}
