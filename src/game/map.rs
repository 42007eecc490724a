//! Arena Layout
//!
//! Static arena description: bounds, platforms (some of them zones),
//! spawn points and power-up candidate locations.

use serde::{Serialize, Deserialize};

use crate::core::constants::{ARENA_WIDTH, ARENA_HEIGHT};
use crate::core::vec2::{Vec2, Rect};
use crate::game::state::{Platform, Side, ZoneState};

/// One platform in a layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    /// Collision rectangle
    pub rect: Rect,
    /// Zone label if capturable
    pub zone: Option<char>,
}

/// Static arena description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArenaLayout {
    width: f64,
    height: f64,
    platforms: Vec<PlatformSpec>,
    spawn_points: [Vec2; 2],
    power_up_locations: Vec<Vec2>,
}

impl ArenaLayout {
    /// Empty arena of the given size.
    pub fn new(width: f64, height: f64, spawn_a: Vec2, spawn_b: Vec2) -> Self {
        Self {
            width,
            height,
            platforms: Vec::new(),
            spawn_points: [spawn_a, spawn_b],
            power_up_locations: Vec::new(),
        }
    }

    /// Empty arena with the standard size and spawn points.
    pub fn empty() -> Self {
        Self::new(
            ARENA_WIDTH,
            ARENA_HEIGHT,
            Vec2::new(150.0, 200.0),
            Vec2::new(1000.0, 200.0),
        )
    }

    /// The classic five-zone arena.
    ///
    /// Home zones A and B sit under the spawns, D and E on the flanks,
    /// and C at the top center reached by the middle staircase.
    pub fn classic() -> Self {
        Self::empty()
            .with_platform(Rect::new(0.0, 570.0, 1200.0, 30.0))
            .with_zone('A', Rect::new(50.0, 480.0, 150.0, 35.0))
            .with_zone('B', Rect::new(1000.0, 480.0, 150.0, 35.0))
            .with_zone('D', Rect::new(220.0, 260.0, 130.0, 35.0))
            .with_zone('E', Rect::new(850.0, 260.0, 130.0, 35.0))
            .with_zone('C', Rect::new(520.0, 140.0, 160.0, 35.0))
            // Side stairs
            .with_platform(Rect::new(250.0, 420.0, 120.0, 20.0))
            .with_platform(Rect::new(400.0, 340.0, 120.0, 20.0))
            .with_platform(Rect::new(830.0, 420.0, 120.0, 20.0))
            .with_platform(Rect::new(680.0, 340.0, 120.0, 20.0))
            // Center staircase
            .with_platform(Rect::new(460.0, 380.0, 100.0, 20.0))
            .with_platform(Rect::new(520.0, 300.0, 100.0, 20.0))
            .with_platform(Rect::new(580.0, 220.0, 100.0, 20.0))
            // Ledges
            .with_platform(Rect::new(100.0, 360.0, 80.0, 15.0))
            .with_platform(Rect::new(1020.0, 360.0, 80.0, 15.0))
            .with_platform(Rect::new(360.0, 180.0, 90.0, 15.0))
            .with_platform(Rect::new(750.0, 180.0, 90.0, 15.0))
            .with_power_up_locations([
                Vec2::new(300.0, 445.0),
                Vec2::new(500.0, 515.0),
                Vec2::new(900.0, 445.0),
                Vec2::new(700.0, 515.0),
                Vec2::new(600.0, 315.0),
                Vec2::new(480.0, 355.0),
                Vec2::new(720.0, 355.0),
                Vec2::new(240.0, 180.0),
                Vec2::new(930.0, 180.0),
                Vec2::new(380.0, 225.0),
                Vec2::new(770.0, 225.0),
            ])
    }

    /// Add a solid platform.
    pub fn with_platform(mut self, rect: Rect) -> Self {
        self.platforms.push(PlatformSpec { rect, zone: None });
        self
    }

    /// Add a capturable zone platform.
    pub fn with_zone(mut self, label: char, rect: Rect) -> Self {
        self.platforms.push(PlatformSpec { rect, zone: Some(label) });
        self
    }

    /// Add power-up candidate locations.
    pub fn with_power_up_locations(mut self, locations: impl IntoIterator<Item = Vec2>) -> Self {
        self.power_up_locations.extend(locations);
        self
    }

    /// Arena width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Arena height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Arena bounds as a rectangle at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Platform specs in layout order.
    pub fn platforms(&self) -> &[PlatformSpec] {
        &self.platforms
    }

    /// Spawn point of a side.
    pub fn spawn_point(&self, side: Side) -> Vec2 {
        self.spawn_points[side.index()]
    }

    /// Power-up candidate locations.
    pub fn power_up_locations(&self) -> &[Vec2] {
        &self.power_up_locations
    }

    /// Number of zones.
    pub fn zone_count(&self) -> usize {
        self.platforms.iter().filter(|p| p.zone.is_some()).count()
    }

    /// Fresh platforms with neutral zone state.
    pub fn build_platforms(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .map(|spec| Platform {
                rect: spec.rect,
                zone: spec.zone.map(ZoneState::new),
            })
            .collect()
    }
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self::classic()
    }
}
