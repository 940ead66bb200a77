//! Fixed timestep simulation tick
//!
//! Applies one frame of player input, then advances the millisecond clock.

use super::control::{ButtonEdge, ControlKind};
use super::sequencer;
use super::state::GameState;
use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};

/// Largest frame time fed into the accumulator (ms)
const MAX_FRAME_MS: f64 = 100.0;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Horizontal button edge
    pub horizontal: Option<ButtonEdge>,
    /// Vertical button edge
    pub vertical: Option<ButtonEdge>,
    /// Creation index of a toy clicked at the collection point
    pub collect: Option<u32>,
    /// Start over (victory screen)
    pub restart: bool,
    /// Developer shortcut to the victory screen
    pub force_victory: bool,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record an edge for `control`
    pub fn set_edge(&mut self, control: ControlKind, edge: ButtonEdge) {
        match control {
            ControlKind::Horizontal => self.horizontal = Some(edge),
            ControlKind::Vertical => self.vertical = Some(edge),
        }
    }
}

/// Apply `input`, then advance the game by `dt_ms`
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u64) {
    if input.restart {
        state.restart();
    }
    if input.force_victory {
        sequencer::force_victory(state);
    }
    if let Some(edge) = input.horizontal {
        sequencer::handle_control(state, ControlKind::Horizontal, edge);
    }
    if let Some(edge) = input.vertical {
        sequencer::handle_control(state, ControlKind::Vertical, edge);
    }
    if let Some(index) = input.collect {
        if let Err(err) = sequencer::collect(state, index) {
            log::warn!("Collect ignored: {}", err);
        }
    }

    state.advance(dt_ms);
}

/// Turns variable frame times into whole `SIM_DT_MS` steps
#[derive(Debug, Clone, Default)]
pub struct FrameStepper {
    accumulator_ms: f64,
}

impl FrameStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many fixed steps as `frame_ms` covers; returns the count.
    ///
    /// `input` is applied on the first step only.
    pub fn step(&mut self, state: &mut GameState, input: &TickInput, frame_ms: f64) -> u32 {
        self.accumulator_ms += frame_ms.clamp(0.0, MAX_FRAME_MS);

        let dt = SIM_DT_MS as f64;
        let idle = TickInput::default();
        let mut substeps = 0;
        while self.accumulator_ms >= dt && substeps < MAX_SUBSTEPS {
            let frame_input = if substeps == 0 { input } else { &idle };
            tick(state, frame_input, SIM_DT_MS);
            self.accumulator_ms -= dt;
            substeps += 1;
        }
        if substeps == 0 && !input.is_empty() {
            // Never drop an edge on a short frame
            tick(state, input, 0);
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GrabPhase;

    #[test]
    fn test_tick_advances_clock() {
        let mut state = GameState::new(1);
        tick(&mut state, &TickInput::default(), 250);
        assert_eq!(state.now_ms(), 250);
    }

    #[test]
    fn test_press_applies_before_advance() {
        let mut state = GameState::new(2);
        tick(&mut state, &TickInput::default(), 2_000);
        assert_eq!(state.phase, GrabPhase::Idle);

        let mut input = TickInput::default();
        input.set_edge(ControlKind::Horizontal, ButtonEdge::Press);
        tick(&mut state, &input, 100);
        assert_eq!(state.phase, GrabPhase::AimingHorizontal);
        assert_eq!(state.claw.rail.pos.x, 46.0);
    }

    #[test]
    fn test_unknown_collect_is_ignored() {
        let mut state = GameState::new(3);
        let input = TickInput {
            collect: Some(99),
            ..Default::default()
        };
        tick(&mut state, &input, 10);
        assert_eq!(state.collection.count(), 0);
    }

    #[test]
    fn test_stepper_runs_fixed_substeps() {
        let mut state = GameState::new(4);
        let mut stepper = FrameStepper::new();
        assert_eq!(stepper.step(&mut state, &TickInput::default(), 35.0), 3);
        assert_eq!(state.now_ms(), 30);
        assert_eq!(stepper.step(&mut state, &TickInput::default(), 5.0), 1);
        assert_eq!(state.now_ms(), 40);
    }

    #[test]
    fn test_stepper_clamps_long_frames() {
        let mut state = GameState::new(5);
        let mut stepper = FrameStepper::new();
        assert_eq!(stepper.step(&mut state, &TickInput::default(), 5_000.0), 10);
        assert_eq!(state.now_ms(), 100);
    }

    #[test]
    fn test_stepper_keeps_input_on_short_frame() {
        let mut state = GameState::new(6);
        let mut stepper = FrameStepper::new();
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        assert_eq!(stepper.step(&mut state, &input, 1.0), 0);
        assert!(state.drain_events().contains(&crate::sim::GameEvent::CollectionReset));
    }
}
