//! Idle/demo mode - the machine plays itself
//!
//! Produces the same `TickInput` a player would: aims the rail at a toy,
//! jogs the joint until the capture rectangle sits over it, releases, and
//! collects whatever lands at the collection point.

use super::control::{ButtonEdge, ControlKind};
use super::state::{GameState, GrabPhase};
use super::tick::TickInput;
use super::toy::{Toy, ToyStatus};
use crate::settings::Settings;

#[derive(Debug, Clone, Default)]
pub struct AutoPlayer {
    /// Registry slot being aimed at
    aim: Option<usize>,
    holding: Option<ControlKind>,
    /// Slots that came up empty once; never retried
    skipped: Vec<usize>,
    finished: bool,
}

/// Whether some reachable claw position puts the toy's origin inside the capture rect
pub fn reachable(settings: &Settings, toy: &Toy) -> bool {
    settings.catch_area().contains_point_strict(toy.body.pos)
}

impl AutoPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nothing reachable is left, or the game is won
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Input for the next tick
    pub fn next_input(&mut self, state: &GameState) -> TickInput {
        let mut input = TickInput::default();
        if state.collection.victory_signalled() {
            self.finished = true;
            return input;
        }

        // Collect first so dropped toys never pile up under the claw
        if let Some(toy) = state.toys.iter().find(|t| t.status == ToyStatus::ReadyToCollect) {
            if !state.overlay {
                input.collect = Some(toy.index);
            }
            return input;
        }

        match state.phase {
            GrabPhase::Idle => self.start_cycle(state, &mut input),
            GrabPhase::AimingHorizontal => self.aim_horizontal(state, &mut input),
            GrabPhase::AimingVertical => self.aim_vertical(state, &mut input),
            _ => {}
        }
        input
    }

    fn aimed_toy<'a>(&self, state: &'a GameState) -> Option<&'a Toy> {
        self.aim.and_then(|slot| state.toys.get(slot))
    }

    fn start_cycle(&mut self, state: &GameState, input: &mut TickInput) {
        if let Some(slot) = self.aim.take() {
            if state.claw.missed {
                log::debug!("Autoplay missed slot {}, skipping it", slot);
                self.skipped.push(slot);
            }
        }

        let next = state
            .toys
            .iter()
            .enumerate()
            .filter(|(slot, toy)| toy.status == ToyStatus::Resting && !self.skipped.contains(slot))
            .filter(|(_, toy)| reachable(&state.settings, toy))
            .max_by_key(|(_, toy)| toy.index)
            .map(|(slot, _)| slot);

        match next {
            Some(slot) => {
                log::debug!("Autoplay aiming at slot {}", slot);
                self.aim = Some(slot);
                self.holding = Some(ControlKind::Horizontal);
                input.set_edge(ControlKind::Horizontal, ButtonEdge::Press);
            }
            // The last collection can still end in victory
            None if state.overlay => {}
            None => {
                if !self.finished {
                    log::info!("Autoplay: no reachable toys left");
                }
                self.finished = true;
            }
        }
    }

    fn aim_horizontal(&mut self, state: &GameState, input: &mut TickInput) {
        if self.holding != Some(ControlKind::Horizontal) {
            return;
        }
        let Some(toy) = self.aimed_toy(state) else {
            return;
        };
        let rect = state.claw.capture_rect(&state.settings);
        if rect.origin.x + rect.size.x / 2.0 >= toy.body.pos.x || !state.claw.rail.is_moving() {
            self.holding = None;
            input.set_edge(ControlKind::Horizontal, ButtonEdge::Release);
        }
    }

    fn aim_vertical(&mut self, state: &GameState, input: &mut TickInput) {
        let Some(toy) = self.aimed_toy(state) else {
            input.set_edge(ControlKind::Vertical, ButtonEdge::Release);
            return;
        };
        let rect = state.claw.capture_rect(&state.settings);
        let over_toy = rect.origin.y < toy.body.pos.y;

        if self.holding != Some(ControlKind::Vertical) {
            if over_toy {
                input.set_edge(ControlKind::Vertical, ButtonEdge::Release);
            } else {
                self.holding = Some(ControlKind::Vertical);
                input.set_edge(ControlKind::Vertical, ButtonEdge::Press);
            }
        } else if over_toy || !state.claw.joint.is_moving() {
            self.holding = None;
            input.set_edge(ControlKind::Vertical, ButtonEdge::Release);
        }
    }
}
