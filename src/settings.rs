//! Machine geometry and timing settings
//!
//! Supplied once when a session is created and treated as immutable for the
//! session. Loaded from JSON; any missing field falls back to the default
//! cabinet.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ClawError;
use crate::sim::{Rect, ToyKind, capture_rect};

/// Outer cabinet measurements (pixels, relative to the page like the DOM bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineGeometry {
    pub width: f32,
    pub height: f32,
    /// Page offset of the cabinet's top edge
    pub top: f32,
    /// Height of the upper (claw) region
    pub top_height: f32,
    /// Page offset of the lower (toy pit) region's top edge
    pub bottom_top: f32,
    /// Height of the lower (toy pit) region
    pub bottom_height: f32,
}

impl Default for MachineGeometry {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 630.0,
            top: 0.0,
            top_height: 200.0,
            bottom_top: 360.0,
            bottom_height: 270.0,
        }
    }
}

/// Clearance kept between the claw and the cabinet walls
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineBuffer {
    pub x: f32,
    pub y: f32,
}

impl Default for MachineBuffer {
    fn default() -> Self {
        Self {
            x: MACHINE_BUFFER_X,
            y: MACHINE_BUFFER_Y,
        }
    }
}

/// Toy grid layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToyLayout {
    pub corner_buffer: f32,
    pub toys_per_row: u32,
    pub toy_rows: u32,
    /// Grid slot reserved for the collection point
    pub skip_index: u32,
    /// Random horizontal offset range (± pixels)
    pub jitter_x: i32,
    /// Random vertical offset range (± pixels)
    pub jitter_y: i32,
}

impl Default for ToyLayout {
    fn default() -> Self {
        Self {
            corner_buffer: CORNER_BUFFER,
            toys_per_row: TOYS_PER_ROW,
            toy_rows: TOY_ROWS,
            skip_index: SKIP_INDEX,
            jitter_x: 6,
            jitter_y: 2,
        }
    }
}

/// Initial claw part placements and the capture footprint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClawGeometry {
    pub rail: Rect,
    pub joint: Rect,
    pub arm: Rect,
    /// Offset of the capture rectangle from the joint origin
    pub capture_offset: f32,
    pub capture_size: Vec2,
}

impl Default for ClawGeometry {
    fn default() -> Self {
        Self {
            rail: Rect::new(Vec2::new(160.0, 0.0), Vec2::new(24.0, 200.0)),
            joint: Rect::new(Vec2::new(160.0, 0.0), Vec2::new(40.0, 24.0)),
            arm: Rect::new(Vec2::new(160.0, 12.0), Vec2::new(40.0, 24.0)),
            capture_offset: CLAW_OFFSET,
            capture_size: Vec2::new(CLAW_WIDTH, CLAW_HEIGHT),
        }
    }
}

/// Tick intervals and phase delays (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub move_tick_ms: u64,
    pub fast_move_tick_ms: u64,
    pub grab_delay_ms: u64,
    pub drop_delay_ms: u64,
    pub collect_display_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            move_tick_ms: MOVE_TICK_MS,
            fast_move_tick_ms: FAST_MOVE_TICK_MS,
            grab_delay_ms: GRAB_DELAY_MS,
            drop_delay_ms: DROP_DELAY_MS,
            collect_display_ms: COLLECT_DISPLAY_MS,
        }
    }
}

/// Complete world configuration for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pixel art scale applied to toy footprints
    pub scale: f32,
    pub machine: MachineGeometry,
    pub buffer: MachineBuffer,
    pub layout: ToyLayout,
    pub claw: ClawGeometry,
    pub timing: Timing,
    /// Gap left under a dropped toy
    pub drop_clearance: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scale: SCALE,
            machine: MachineGeometry::default(),
            buffer: MachineBuffer::default(),
            layout: ToyLayout::default(),
            claw: ClawGeometry::default(),
            timing: Timing::default(),
            drop_clearance: DROP_CLEARANCE,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON document
    pub fn from_json(json: &str) -> Result<Self, ClawError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ClawError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject geometry that cannot produce a playable machine
    pub fn validate(&self) -> Result<(), ClawError> {
        let m = &self.machine;
        if self.scale <= 0.0 {
            return Err(ClawError::invalid_settings("scale must be positive"));
        }
        if m.width <= 0.0 || m.height <= 0.0 || m.top_height <= 0.0 || m.bottom_height <= 0.0 {
            return Err(ClawError::invalid_settings(
                "machine dimensions must be positive",
            ));
        }
        if self.max_arm_length() <= 0.0 {
            return Err(ClawError::invalid_settings(format!(
                "bottom region top ({}) must lie below the machine top ({}) plus buffer ({})",
                m.bottom_top, m.top, self.buffer.y
            )));
        }
        if self.rail_far_x() <= self.buffer.x {
            return Err(ClawError::invalid_settings(
                "machine is too narrow for the claw to travel",
            ));
        }
        let l = &self.layout;
        if l.toys_per_row == 0 || l.toy_rows == 0 {
            return Err(ClawError::invalid_settings("toy grid must not be empty"));
        }
        if l.jitter_x < 0 || l.jitter_y < 0 {
            return Err(ClawError::invalid_settings("jitter ranges must not be negative"));
        }
        let slots = l.toys_per_row * l.toy_rows;
        if slots as usize > ToyKind::ALL.len() * 2 {
            return Err(ClawError::invalid_settings(format!(
                "{} grid slots exceed the {} available toys",
                slots,
                ToyKind::ALL.len() * 2
            )));
        }
        if self.total_toys() == 0 {
            return Err(ClawError::invalid_settings("layout places no toys"));
        }
        if self.claw.capture_size.x <= MAX_STEP || self.claw.capture_size.y <= MAX_STEP {
            return Err(ClawError::invalid_settings(format!(
                "capture area must be wider and taller than one movement step ({})",
                MAX_STEP
            )));
        }
        self.check_reach()?;
        let t = &self.timing;
        if t.move_tick_ms == 0 || t.fast_move_tick_ms == 0 {
            return Err(ClawError::invalid_settings("tick intervals must be positive"));
        }
        Ok(())
    }

    /// Every toy of every kind must be catchable wherever jitter puts it
    fn check_reach(&self) -> Result<(), ClawError> {
        let area = self.catch_area();
        let jitter = Vec2::new(self.layout.jitter_x as f32, self.layout.jitter_y as f32);
        let slots = self.layout.toys_per_row * self.layout.toy_rows;
        for index in (0..slots).filter(|&i| i != self.layout.skip_index) {
            for kind in ToyKind::ALL {
                let base = self.slot_origin(index, kind.footprint(self.scale));
                if !area.contains_point_strict(base - jitter)
                    || !area.contains_point_strict(base + jitter)
                {
                    return Err(ClawError::invalid_settings(format!(
                        "toy slot {} can land outside the claw's reach ({} at {:?})",
                        index,
                        kind.as_str(),
                        base
                    )));
                }
            }
        }
        Ok(())
    }

    /// Grid position of slot `index` for a toy of `size`, before jitter
    pub fn slot_origin(&self, index: u32, size: Vec2) -> Vec2 {
        let layout = &self.layout;
        let machine = &self.machine;
        let corner = layout.corner_buffer;
        let col_step = (machine.width - corner * 3.0) / layout.toys_per_row as f32;
        let row_step = (machine.bottom_height - corner * 2.0) / layout.toy_rows as f32;
        let col = (index % layout.toys_per_row) as f32;
        let row = (index / layout.toys_per_row) as f32;
        Vec2::new(
            corner + col * col_step + size.x / 2.0,
            machine.bottom_top - machine.top + corner + row * row_step - size.y / 2.0,
        )
    }

    /// Union of every capture rectangle the claw can reach.
    ///
    /// The rail and joint move at most `MAX_STEP` per tick, which is smaller
    /// than the capture size, so the reachable rectangles leave no gaps. A toy
    /// origin strictly inside this area is inside some reachable capture rect.
    pub fn catch_area(&self) -> Rect {
        let near = capture_rect(Vec2::new(self.rail_rest_x(), self.joint_near_y()), self);
        let far = capture_rect(Vec2::new(self.rail_far_x(), self.joint_rest_y()), self);
        Rect::new(near.origin, Vec2::new(far.max_x(), far.max_y()) - near.origin)
    }

    /// Longest the arm can extend
    pub fn max_arm_length(&self) -> f32 {
        self.machine.bottom_top - self.machine.top - self.buffer.y
    }

    /// Far horizontal bound for the rail
    pub fn rail_far_x(&self) -> f32 {
        self.machine.width - self.claw.joint.size.x - self.buffer.x
    }

    /// Near horizontal rest position for the rail and joint
    pub fn rail_rest_x(&self) -> f32 {
        self.buffer.x
    }

    /// Joint rest height after homing
    pub fn joint_rest_y(&self) -> f32 {
        self.machine.top_height - self.buffer.y
    }

    /// Joint's near bound while jogging
    pub fn joint_near_y(&self) -> f32 {
        self.buffer.y
    }

    /// Number of toys placed in the grid
    pub fn total_toys(&self) -> u32 {
        let slots = self.layout.toys_per_row * self.layout.toy_rows;
        if self.layout.skip_index < slots {
            slots - 1
        } else {
            slots
        }
    }

    /// Center of the cabinet (collection display point)
    pub fn machine_center(&self) -> Vec2 {
        Vec2::new(self.machine.width / 2.0, self.machine.height / 2.0)
    }

    /// Resting height of a dropped toy
    pub fn drop_y(&self, toy_height: f32) -> f32 {
        self.machine.height - toy_height - self.drop_clearance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.total_toys(), 11);
        assert_eq!(settings.max_arm_length(), 344.0);
        assert_eq!(settings.rail_far_x(), 324.0);
        assert_eq!(settings.joint_rest_y(), 184.0);
    }

    #[test]
    fn test_catch_area_spans_claw_travel() {
        let settings = Settings::default();
        let area = settings.catch_area();
        // Near corner: rail at rest, joint pulled fully back
        assert_eq!(area.origin, Vec2::new(36.0 + 7.0, 16.0 + 344.0 + 16.0 + 7.0));
        // Far corner: rail at the far stop, joint at rest height
        assert_eq!(area.max_x(), 324.0 + 7.0 + 40.0);
        assert_eq!(area.max_y(), 184.0 + 344.0 + 16.0 + 7.0 + 32.0);
    }

    #[test]
    fn test_every_default_slot_is_catchable() {
        let settings = Settings::default();
        let area = settings.catch_area();
        let jitter = Vec2::new(6.0, 2.0);
        for index in (0..12).filter(|&i| i != 8) {
            for kind in ToyKind::ALL {
                let base = settings.slot_origin(index, kind.footprint(2.0));
                assert!(
                    area.contains_point_strict(base - jitter)
                        && area.contains_point_strict(base + jitter),
                    "slot {} ({}) at {:?} is outside {:?}",
                    index,
                    kind.as_str(),
                    base,
                    area
                );
            }
        }
    }

    #[test]
    fn test_rejects_unreachable_front_row() {
        // A tight corner buffer pushes the front row above the claw's reach
        let json = r#"{ "layout": { "corner_buffer": 16.0 } }"#;
        let err = Settings::from_json(json).unwrap_err();
        match err {
            ClawError::InvalidSettings(msg) => assert!(msg.contains("toy slot 0"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_capture_smaller_than_a_step() {
        let mut settings = Settings::default();
        settings.claw.capture_size = Vec2::new(8.0, 32.0);
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "timing": { "grab_delay_ms": 250 } }"#).unwrap();
        assert_eq!(settings.timing.grab_delay_ms, 250);
        assert_eq!(settings.timing.drop_delay_ms, DROP_DELAY_MS);
        assert_eq!(settings.machine, MachineGeometry::default());
    }

    #[test]
    fn test_rejects_inverted_regions() {
        let json = r#"{ "machine": { "top": 400.0, "bottom_top": 300.0 } }"#;
        let err = Settings::from_json(json).unwrap_err();
        assert!(matches!(err, ClawError::InvalidSettings(_)));
    }

    #[test]
    fn test_rejects_zero_tick() {
        let mut settings = Settings::default();
        settings.timing.move_tick_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(ClawError::Json(_))
        ));
    }
}
