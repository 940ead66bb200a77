//! Player controls
//!
//! Two logical buttons. A locked button swallows input; only the grab
//! sequencer locks and unlocks them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    Horizontal,
    Vertical,
}

/// Press or release edge of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtonEdge {
    Press,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub locked: bool,
}

impl Default for Control {
    fn default() -> Self {
        Self { locked: true }
    }
}

/// Both controls, locked until homing finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub horizontal: Control,
    pub vertical: Control,
}

impl Controls {
    pub fn get(&self, kind: ControlKind) -> &Control {
        match kind {
            ControlKind::Horizontal => &self.horizontal,
            ControlKind::Vertical => &self.vertical,
        }
    }

    pub fn is_locked(&self, kind: ControlKind) -> bool {
        self.get(kind).locked
    }

    /// Set the lock state; returns true if it changed
    pub fn set_locked(&mut self, kind: ControlKind, locked: bool) -> bool {
        let control = match kind {
            ControlKind::Horizontal => &mut self.horizontal,
            ControlKind::Vertical => &mut self.vertical,
        };
        let changed = control.locked != locked;
        control.locked = locked;
        changed
    }
}
