//! Game definition: arena geometry and paddle dimensions
//!
//! Authored in logical (pixel) units; divided by `scale` to get physics units.
//! Keys are camelCase so the same JSON the clients load can be fed in.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Player;
use crate::consts::DEFAULT_BALL_RADIUS;
use crate::error::ConfigError;

/// Axis-aligned rectangle in logical units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub min: Vec2,
    pub max: Vec2,
}

impl Zone {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Point containment, edges inclusive
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True if the two zones share a region of positive area
    pub fn overlaps(&self, other: &Zone) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    fn is_degenerate(&self) -> bool {
        !(self.min.is_finite() && self.max.is_finite())
            || self.min.x >= self.max.x
            || self.min.y >= self.max.y
    }
}

fn default_ball_radius() -> f32 {
    DEFAULT_BALL_RADIUS
}

/// Static description of one match's arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDefinition {
    /// Logical units per physics unit
    pub scale: f32,
    pub paddle_width: f32,
    pub paddle_height: f32,
    #[serde(default = "default_ball_radius")]
    pub ball_radius: f32,
    pub player_one: Zone,
    pub player_two: Zone,
    pub above_net: Zone,
}

impl Default for GameDefinition {
    /// Symmetric 960×640 court with the net in the middle
    fn default() -> Self {
        Self {
            scale: 30.0,
            paddle_width: 100.0,
            paddle_height: 20.0,
            ball_radius: DEFAULT_BALL_RADIUS,
            player_one: Zone::new(Vec2::new(0.0, 0.0), Vec2::new(470.0, 600.0)),
            player_two: Zone::new(Vec2::new(490.0, 0.0), Vec2::new(960.0, 600.0)),
            above_net: Zone::new(Vec2::new(470.0, 0.0), Vec2::new(490.0, 440.0)),
        }
    }
}

impl GameDefinition {
    /// Zone a player defends
    pub fn zone(&self, player: Player) -> &Zone {
        match player {
            Player::One => &self.player_one,
            Player::Two => &self.player_two,
        }
    }

    /// Convert a logical point to physics units
    #[inline]
    pub fn to_world(&self, logical: Vec2) -> Vec2 {
        logical / self.scale
    }

    /// Convert a physics point to logical units
    #[inline]
    pub fn to_logical(&self, world: Vec2) -> Vec2 {
        world * self.scale
    }

    /// Lower edge of the player zones, where the floor surface sits (logical units)
    pub fn floor_level(&self) -> f32 {
        self.player_one.max.y.max(self.player_two.max.y)
    }

    /// Horizontal extent covered by the player zones (logical units)
    pub fn court_span(&self) -> (f32, f32) {
        (
            self.player_one.min.x.min(self.player_two.min.x),
            self.player_one.max.x.max(self.player_two.max.x),
        )
    }

    /// Check the definition is usable for a match
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ConfigError::Invalid(format!("scale must be positive, got {}", self.scale)));
        }
        if !(self.paddle_width > 0.0 && self.paddle_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "paddle size must be positive, got {}x{}",
                self.paddle_width, self.paddle_height
            )));
        }
        if !(self.ball_radius > 0.0 && self.ball_radius.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "ball radius must be positive, got {}",
                self.ball_radius
            )));
        }
        for (name, zone) in [
            ("playerOne", &self.player_one),
            ("playerTwo", &self.player_two),
            ("aboveNet", &self.above_net),
        ] {
            if zone.is_degenerate() {
                return Err(ConfigError::Invalid(format!("zone {name} is empty: {zone:?}")));
            }
        }
        // A landing spot must never belong to both sides
        if self.player_one.overlaps(&self.player_two) {
            return Err(ConfigError::Invalid("player zones overlap".to_string()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let def: Self = serde_json::from_str(json)?;
        def.validate()?;
        Ok(def)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let def = Self::from_json(&json)?;
        log::info!("Loaded game definition from {}", path.as_ref().display());
        Ok(def)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_contains_edges_inclusive() {
        let zone = Zone::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
        assert!(zone.contains(Vec2::new(0.0, 0.0)));
        assert!(zone.contains(Vec2::new(10.0, 5.0)));
        assert!(zone.contains(Vec2::new(3.0, 2.0)));
        assert!(!zone.contains(Vec2::new(10.1, 2.0)));
        assert!(!zone.contains(Vec2::new(3.0, -0.1)));
    }

    #[test]
    fn test_zone_center_and_size() {
        let zone = Zone::new(Vec2::new(80.0, 40.0), Vec2::new(120.0, 60.0));
        assert_eq!(zone.center(), Vec2::new(100.0, 50.0));
        assert_eq!(zone.size(), Vec2::new(40.0, 20.0));
    }

    #[test]
    fn test_touching_zones_do_not_overlap() {
        let a = Zone::new(Vec2::ZERO, Vec2::new(10.0, 10.0));
        let b = Zone::new(Vec2::new(10.0, 0.0), Vec2::new(20.0, 10.0));
        let c = Zone::new(Vec2::new(5.0, 5.0), Vec2::new(15.0, 15.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn test_default_definition_is_valid() {
        let def = GameDefinition::default();
        assert!(def.validate().is_ok());
        assert_eq!(def.floor_level(), 600.0);
        assert_eq!(def.court_span(), (0.0, 960.0));
    }

    #[test]
    fn test_validate_rejects_bad_scale() {
        let def = GameDefinition {
            scale: 0.0,
            ..Default::default()
        };
        assert!(matches!(def.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_overlapping_player_zones() {
        let mut def = GameDefinition::default();
        def.player_two.min.x = 400.0;
        assert!(matches!(def.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_json_camel_case_with_default_ball_radius() {
        let json = r#"{
            "scale": 20.0,
            "paddleWidth": 80.0,
            "paddleHeight": 16.0,
            "playerOne": { "min": [0.0, 0.0], "max": [300.0, 400.0] },
            "playerTwo": { "min": [320.0, 0.0], "max": [620.0, 400.0] },
            "aboveNet": { "min": [300.0, 0.0], "max": [320.0, 300.0] }
        }"#;
        let def = GameDefinition::from_json(json).unwrap();
        assert_eq!(def.scale, 20.0);
        assert_eq!(def.ball_radius, DEFAULT_BALL_RADIUS);
        assert_eq!(def.player_two.center(), Vec2::new(470.0, 200.0));
        assert_eq!(def.to_world(Vec2::new(40.0, 20.0)), Vec2::new(2.0, 1.0));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            GameDefinition::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
