//! Keyboard mapping
//!
//! `ArrowRight`/`d` drive the horizontal control, `ArrowUp`/`w` the vertical
//! one. Key names follow `KeyboardEvent.key`.

use crate::sim::{ButtonEdge, ControlKind, TickInput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Control(ControlKind, ButtonEdge),
    /// Ctrl+Shift+V developer shortcut
    ForceVictory,
}

impl KeyAction {
    /// Merge into the input for the next tick
    pub fn apply(self, input: &mut TickInput) {
        match self {
            KeyAction::Control(control, edge) => input.set_edge(control, edge),
            KeyAction::ForceVictory => input.force_victory = true,
        }
    }
}

fn control_for(key: &str) -> Option<ControlKind> {
    match key {
        "ArrowRight" | "d" | "D" => Some(ControlKind::Horizontal),
        "ArrowUp" | "w" | "W" => Some(ControlKind::Vertical),
        _ => None,
    }
}

/// Map a key-down; auto-repeat events map to nothing
pub fn key_down(key: &str, repeat: bool, ctrl: bool, shift: bool) -> Option<KeyAction> {
    if repeat {
        return None;
    }
    if ctrl && shift && key.eq_ignore_ascii_case("v") {
        return Some(KeyAction::ForceVictory);
    }
    control_for(key).map(|control| KeyAction::Control(control, ButtonEdge::Press))
}

pub fn key_up(key: &str) -> Option<KeyAction> {
    control_for(key).map(|control| KeyAction::Control(control, ButtonEdge::Release))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_keys() {
        assert_eq!(
            key_down("ArrowRight", false, false, false),
            Some(KeyAction::Control(ControlKind::Horizontal, ButtonEdge::Press))
        );
        assert_eq!(
            key_down("w", false, false, false),
            Some(KeyAction::Control(ControlKind::Vertical, ButtonEdge::Press))
        );
        assert_eq!(
            key_up("d"),
            Some(KeyAction::Control(ControlKind::Horizontal, ButtonEdge::Release))
        );
        assert_eq!(key_down("Enter", false, false, false), None);
        assert_eq!(key_up("v"), None);
    }

    #[test]
    fn test_repeat_is_ignored() {
        assert_eq!(key_down("ArrowUp", true, false, false), None);
        assert_eq!(key_down("V", true, true, true), None);
    }

    #[test]
    fn test_force_victory_needs_both_modifiers() {
        assert_eq!(key_down("V", false, true, true), Some(KeyAction::ForceVictory));
        assert_eq!(key_down("v", false, true, false), None);
        assert_eq!(key_down("v", false, false, true), None);
    }

    #[test]
    fn test_apply_sets_tick_input() {
        let mut input = TickInput::default();
        KeyAction::Control(ControlKind::Vertical, ButtonEdge::Release).apply(&mut input);
        KeyAction::ForceVictory.apply(&mut input);
        assert_eq!(input.vertical, Some(ButtonEdge::Release));
        assert_eq!(input.horizontal, None);
        assert!(input.force_victory);
    }
}
