//! The claw assembly: horizontal rail, vertical joint and extending arm
//!
//! The parts are rigidly coupled. Rail motion carries the joint, the arm and
//! the hanging toy; joint motion carries the arm and the toy; arm extension
//! lowers the toy. At most one toy hangs from the claw.

use super::entity::{EntityRef, Kinematic};
use super::rect::Rect;
use super::targeting::capture_rect;
use crate::settings::Settings;

/// Stacking order of the claw parts (above resting toys)
pub const CLAW_Z: i32 = 5;

#[derive(Debug, Clone)]
pub struct ClawAssembly {
    pub rail: Kinematic,
    pub joint: Kinematic,
    pub arm: Kinematic,
    /// Registry slot of the toy hanging from the claw
    pub attached: Option<usize>,
    pub gripper_open: bool,
    /// Set when the last grab came up empty
    pub missed: bool,
}

impl ClawAssembly {
    pub fn new(settings: &Settings) -> Self {
        Self {
            rail: Kinematic::new(settings.claw.rail, CLAW_Z),
            joint: Kinematic::new(settings.claw.joint, CLAW_Z),
            arm: Kinematic::new(settings.claw.arm, CLAW_Z),
            attached: None,
            gripper_open: false,
            missed: false,
        }
    }

    pub fn part(&self, part: EntityRef) -> Option<&Kinematic> {
        match part {
            EntityRef::Rail => Some(&self.rail),
            EntityRef::Joint => Some(&self.joint),
            EntityRef::Arm => Some(&self.arm),
            EntityRef::Toy(_) => None,
        }
    }

    pub fn part_mut(&mut self, part: EntityRef) -> Option<&mut Kinematic> {
        match part {
            EntityRef::Rail => Some(&mut self.rail),
            EntityRef::Joint => Some(&mut self.joint),
            EntityRef::Arm => Some(&mut self.arm),
            EntityRef::Toy(_) => None,
        }
    }

    /// Entities that receive the same per-tick delta as `driver`
    pub fn links(&self, driver: EntityRef) -> Vec<EntityRef> {
        let mut links = match driver {
            EntityRef::Rail => vec![EntityRef::Joint, EntityRef::Arm],
            EntityRef::Joint => vec![EntityRef::Arm],
            EntityRef::Arm => Vec::new(),
            EntityRef::Toy(_) => return Vec::new(),
        };
        if let Some(slot) = self.attached {
            links.push(EntityRef::Toy(slot));
        }
        links
    }

    pub fn attach(&mut self, slot: usize) {
        self.attached = Some(slot);
    }

    pub fn detach(&mut self) -> Option<usize> {
        self.attached.take()
    }

    /// Drop every movement reference without running continuations
    pub fn halt_all(&mut self) {
        self.rail.halt();
        self.joint.halt();
        self.arm.halt();
    }

    /// Current catch area under the joint
    pub fn capture_rect(&self, settings: &Settings) -> Rect {
        capture_rect(self.joint.pos, settings)
    }

    /// Shadow size cue: 0.5 with the arm retracted, approaching 1.0 at full reach
    pub fn shadow_scale(&self, settings: &Settings) -> f32 {
        0.5 + self.arm.size.y / settings.max_arm_length() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_follow_coupling() {
        let mut claw = ClawAssembly::new(&Settings::default());
        assert_eq!(claw.links(EntityRef::Rail), vec![EntityRef::Joint, EntityRef::Arm]);
        assert_eq!(claw.links(EntityRef::Joint), vec![EntityRef::Arm]);
        assert!(claw.links(EntityRef::Arm).is_empty());

        claw.attach(4);
        assert_eq!(
            claw.links(EntityRef::Rail),
            vec![EntityRef::Joint, EntityRef::Arm, EntityRef::Toy(4)]
        );
        assert_eq!(claw.links(EntityRef::Arm), vec![EntityRef::Toy(4)]);
        assert!(claw.links(EntityRef::Toy(4)).is_empty());

        assert_eq!(claw.detach(), Some(4));
        assert!(claw.links(EntityRef::Arm).is_empty());
    }

    #[test]
    fn test_shadow_scale_range() {
        let settings = Settings::default();
        let mut claw = ClawAssembly::new(&settings);
        claw.arm.size.y = 0.0;
        assert_eq!(claw.shadow_scale(&settings), 0.5);
        claw.arm.size.y = settings.max_arm_length();
        assert_eq!(claw.shadow_scale(&settings), 1.0);
    }

    #[test]
    fn test_parts_start_at_configured_rects() {
        let settings = Settings::default();
        let claw = ClawAssembly::new(&settings);
        assert_eq!(claw.rail.rect(), settings.claw.rail);
        assert_eq!(claw.joint.rect(), settings.claw.joint);
        assert_eq!(claw.arm.rect(), settings.claw.arm);
        assert!(claw.part(EntityRef::Toy(0)).is_none());
    }
}
