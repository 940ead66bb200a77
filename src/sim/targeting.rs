//! Claw targeting
//!
//! The claw catches whatever toy has its origin strictly inside the capture
//! rectangle. This is a point test, not a rectangle intersection: a toy whose
//! body overlaps the claw but whose origin sits just outside is not caught.
//! Among candidates the last toy in grid order wins.

use glam::Vec2;

use super::rect::Rect;
use super::toy::{ToyRegistry, ToyStatus};
use crate::settings::Settings;

/// The claw's catch area for the current joint position
pub fn capture_rect(joint_pos: Vec2, settings: &Settings) -> Rect {
    let claw = &settings.claw;
    let origin = Vec2::new(
        joint_pos.x + claw.capture_offset,
        joint_pos.y + settings.max_arm_length() + settings.buffer.y + claw.capture_offset,
    );
    Rect::new(origin, claw.capture_size)
}

/// Registry slot of the toy the claw would catch, if any
pub fn select_target(toys: &ToyRegistry, claw: &Rect) -> Option<usize> {
    toys.iter()
        .enumerate()
        .filter(|(_, toy)| toy.status != ToyStatus::Collected)
        .filter(|(_, toy)| claw.contains_point_strict(toy.body.pos))
        .max_by_key(|(_, toy)| toy.index)
        .map(|(slot, _)| slot)
}

/// Select a target and prime it for hanging from the claw
pub fn acquire_target(toys: &mut ToyRegistry, claw: &Rect) -> Option<usize> {
    let slot = select_target(toys, claw)?;
    if let Some(toy) = toys.get_mut(slot) {
        toy.mark_targeted(claw.origin);
        log::debug!(
            "Targeted toy #{} ({}) at {:?}",
            toy.index,
            toy.kind.as_str(),
            toy.body.pos
        );
    }
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Pivot;
    use crate::sim::toy::{Toy, ToyKind};

    fn toy(index: u32, x: f32, y: f32) -> Toy {
        Toy::new(
            index,
            ToyKind::Bear,
            Rect::new(Vec2::new(x, y), ToyKind::Bear.footprint(2.0)),
        )
    }

    fn claw() -> Rect {
        Rect::new(Vec2::new(100.0, 400.0), Vec2::new(40.0, 32.0))
    }

    #[test]
    fn test_capture_rect_from_joint() {
        let settings = Settings::default();
        let rect = capture_rect(Vec2::new(36.0, 184.0), &settings);
        assert_eq!(rect.origin, Vec2::new(43.0, 184.0 + 344.0 + 16.0 + 7.0));
        assert_eq!(rect.size, Vec2::new(40.0, 32.0));
    }

    #[test]
    fn test_highest_index_wins() {
        let toys = ToyRegistry::new(vec![
            toy(3, 110.0, 410.0),
            toy(7, 120.0, 420.0),
            toy(5, 105.0, 405.0),
        ]);
        assert_eq!(select_target(&toys, &claw()), Some(1));
    }

    #[test]
    fn test_tie_break_ignores_distance() {
        // The closer toy has the lower index and loses
        let toys = ToyRegistry::new(vec![toy(9, 138.0, 430.0), toy(2, 120.0, 416.0)]);
        assert_eq!(select_target(&toys, &claw()), Some(0));
    }

    #[test]
    fn test_origin_outside_is_not_caught() {
        // Body overlaps the claw but the origin sits left of it
        let toys = ToyRegistry::new(vec![toy(0, 90.0, 410.0)]);
        assert_eq!(select_target(&toys, &claw()), None);

        // Origin exactly on the edge
        let toys = ToyRegistry::new(vec![toy(0, 100.0, 410.0)]);
        assert_eq!(select_target(&toys, &claw()), None);
    }

    #[test]
    fn test_no_candidates_is_a_miss() {
        let toys = ToyRegistry::new(vec![toy(0, 10.0, 10.0), toy(1, 300.0, 500.0)]);
        assert_eq!(select_target(&toys, &claw()), None);
        let mut toys = toys;
        assert_eq!(acquire_target(&mut toys, &claw()), None);
        assert!(toys.iter().all(|t| t.claw_point.is_none()));
    }

    #[test]
    fn test_collected_toys_are_skipped() {
        let mut toys = ToyRegistry::new(vec![toy(1, 110.0, 410.0), toy(4, 110.0, 410.0)]);
        toys.get_mut(1).unwrap().status = ToyStatus::Collected;
        assert_eq!(select_target(&toys, &claw()), Some(0));
    }

    #[test]
    fn test_acquire_records_claw_point() {
        let mut toys = ToyRegistry::new(vec![toy(0, 110.0, 410.0)]);
        assert_eq!(acquire_target(&mut toys, &claw()), Some(0));
        let target = toys.get(0).unwrap();
        assert_eq!(target.claw_point, Some(Vec2::new(100.0, 400.0)));
        assert_eq!(target.body.pivot, Pivot::Offset(Vec2::new(-10.0, -10.0)));
    }
}
