//! Toys, the toy catalog and grid placement

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{Kinematic, Pivot};
use super::rect::Rect;
use crate::settings::Settings;
use crate::{normalize_degrees, rad_to_deg, signed_display_angle};

/// Toy types in the fixed catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToyKind {
    Bear,
    Bunny,
    Golem,
    Cucumber,
    Penguin,
    Robot,
    Roses,
}

impl ToyKind {
    pub const ALL: [ToyKind; 7] = [
        ToyKind::Bear,
        ToyKind::Bunny,
        ToyKind::Golem,
        ToyKind::Cucumber,
        ToyKind::Penguin,
        ToyKind::Robot,
        ToyKind::Roses,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToyKind::Bear => "bear",
            ToyKind::Bunny => "bunny",
            ToyKind::Golem => "golem",
            ToyKind::Cucumber => "cucumber",
            ToyKind::Penguin => "penguin",
            ToyKind::Robot => "robot",
            ToyKind::Roses => "roses",
        }
    }

    /// Unscaled pixel art footprint
    pub fn base_footprint(&self) -> Vec2 {
        match self {
            ToyKind::Bear => Vec2::new(20.0, 27.0),
            ToyKind::Bunny => Vec2::new(20.0, 29.0),
            ToyKind::Golem => Vec2::new(20.0, 27.0),
            ToyKind::Cucumber => Vec2::new(16.0, 28.0),
            ToyKind::Penguin => Vec2::new(24.0, 22.0),
            ToyKind::Robot => Vec2::new(20.0, 30.0),
            ToyKind::Roses => Vec2::new(20.0, 30.0),
        }
    }

    pub fn footprint(&self, scale: f32) -> Vec2 {
        self.base_footprint() * scale
    }
}

/// Where a toy is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToyStatus {
    /// Lying in the pit
    #[default]
    Resting,
    /// Hanging from the claw
    Grabbed,
    /// Dropped at the collection point, waiting for the player to pick it
    ReadyToCollect,
    Collected,
}

/// A toy: a kinematic body plus catalog data
#[derive(Debug, Clone)]
pub struct Toy {
    /// Grid slot the toy was created for (0-based, skips the reserved slot)
    pub index: u32,
    pub kind: ToyKind,
    pub body: Kinematic,
    pub status: ToyStatus,
    /// Claw capture point recorded when targeted
    pub claw_point: Option<Vec2>,
}

impl Toy {
    pub fn new(index: u32, kind: ToyKind, rect: Rect) -> Self {
        Self {
            index,
            kind,
            body: Kinematic::new(rect, 0),
            status: ToyStatus::Resting,
            claw_point: None,
        }
    }

    /// Record the capture point and pivot around it
    pub fn mark_targeted(&mut self, claw_point: Vec2) {
        self.body.pivot = Pivot::Offset(claw_point - self.body.pos);
        self.claw_point = Some(claw_point);
    }

    /// Signed hanging angle toward the recorded claw point
    pub fn hanging_angle(&self) -> Option<f32> {
        let claw = self.claw_point?;
        let center = self.body.rect().center();
        let angle = rad_to_deg((center.y - claw.y).atan2(center.x - claw.x)) - 90.0;
        let normalized = normalize_degrees(angle).round();
        Some(signed_display_angle(normalized))
    }

    /// Apply the hanging angle (held fixed until the toy is released)
    pub fn apply_hanging_angle(&mut self) {
        if let Some(angle) = self.hanging_angle() {
            self.body.angle = angle;
        }
    }
}

/// Uniform whole number in `[min, max]`
pub fn random_in_range(rng: &mut Pcg32, min: i32, max: i32) -> f32 {
    let r: f32 = rng.random();
    (min as f32 + r * (max - min + 1) as f32)
        .floor()
        .min(max as f32)
}

/// All toys of a session, in creation order
#[derive(Debug, Clone, Default)]
pub struct ToyRegistry {
    toys: Vec<Toy>,
}

impl ToyRegistry {
    pub fn new(toys: Vec<Toy>) -> Self {
        Self { toys }
    }

    /// Fill every grid slot but the reserved one with a shuffled catalog pick
    pub fn spawn(settings: &Settings, rng: &mut Pcg32) -> Self {
        let mut deck: Vec<ToyKind> = ToyKind::ALL
            .iter()
            .chain(ToyKind::ALL.iter())
            .copied()
            .collect();
        deck.shuffle(rng);

        let layout = &settings.layout;
        let slots = layout.toys_per_row * layout.toy_rows;
        let mut toys = Vec::with_capacity(slots as usize);
        for index in 0..slots {
            if index == layout.skip_index {
                continue;
            }
            let kind = deck[index as usize];
            let size = kind.footprint(settings.scale);
            let base = settings.slot_origin(index, size);
            let x = base.x + random_in_range(rng, -layout.jitter_x, layout.jitter_x);
            let y = base.y + random_in_range(rng, -layout.jitter_y, layout.jitter_y);

            toys.push(Toy::new(index, kind, Rect::new(Vec2::new(x, y), size)));
        }

        log::debug!(
            "Spawned {} toys: {:?}",
            toys.len(),
            toys.iter().map(|t| t.kind.as_str()).collect::<Vec<_>>()
        );
        Self { toys }
    }

    pub fn len(&self) -> usize {
        self.toys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toys.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&Toy> {
        self.toys.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Toy> {
        self.toys.get_mut(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toy> {
        self.toys.iter()
    }

    /// Registry slot of the toy created for grid index `index`
    pub fn slot_of(&self, index: u32) -> Option<usize> {
        self.toys.iter().position(|t| t.index == index)
    }

    /// Whether any toy is waiting at the collection point
    pub fn any_ready(&self) -> bool {
        self.toys
            .iter()
            .any(|t| t.status == ToyStatus::ReadyToCollect)
    }
}
