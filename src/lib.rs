//! Claw Machine - a retro claw machine arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (claw kinematics, targeting, grab sequencing)
//! - `settings`: World geometry and timing configuration
//! - `platform`: Keyboard mapping and the browser bridge

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::ClawError;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step in milliseconds (divides every tick interval and delay)
    pub const SIM_DT_MS: u64 = 10;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 16;

    /// Largest distance an axis may travel in one movement tick
    pub const MAX_STEP: f32 = 10.0;

    /// Pixel art scale multiplier
    pub const SCALE: f32 = 2.0;

    /// Buffer distances
    pub const CORNER_BUFFER: f32 = 60.0;
    pub const MACHINE_BUFFER_X: f32 = 36.0;
    pub const MACHINE_BUFFER_Y: f32 = 16.0;

    /// Animation timing (ms)
    pub const MOVE_TICK_MS: u64 = 100;
    pub const FAST_MOVE_TICK_MS: u64 = 50;
    pub const GRAB_DELAY_MS: u64 = 500;
    pub const DROP_DELAY_MS: u64 = 700;
    pub const COLLECT_DISPLAY_MS: u64 = 1000;

    /// Toy grid
    pub const TOYS_PER_ROW: u32 = 4;
    pub const TOY_ROWS: u32 = 3;
    /// Grid slot left empty for the collection point
    pub const SKIP_INDEX: u32 = 8;

    /// Claw capture rectangle, relative to the arm joint
    pub const CLAW_OFFSET: f32 = 7.0;
    pub const CLAW_WIDTH: f32 = 40.0;
    pub const CLAW_HEIGHT: f32 = 32.0;

    /// Gap left under a dropped toy
    pub const DROP_CLEARANCE: f32 = 30.0;

    /// Stacking orders
    pub const DROPPED_Z: i32 = 3;
    pub const DISPLAY_Z: i32 = 7;

    /// Collection tokens beyond this count are squeezed together
    pub const SQUEEZE_AFTER: u32 = 6;
}

/// Convert radians to whole degrees
#[inline]
pub fn rad_to_deg(rad: f32) -> f32 {
    (rad * (180.0 / std::f32::consts::PI)).round()
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    let adjusted = angle % 360.0;
    if adjusted < 0.0 { adjusted + 360.0 } else { adjusted }
}

/// Re-express a [0, 360) angle as the signed display angle.
///
/// Angles below 180 are negated, the rest become `360 - angle`.
#[inline]
pub fn signed_display_angle(normalized: f32) -> f32 {
    if normalized < 180.0 {
        -normalized
    } else {
        360.0 - normalized
    }
}
