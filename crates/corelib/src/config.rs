//! Design constants for the editor, loadable from JSON.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Vec3,
    body::RenderHandle,
    error::{CoreError, CoreResult},
};

/// Closed sampling interval. A degenerate, inverted or overflowing range always yields `min`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min && (self.max - self.min).is_finite() {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Both ends and the span must be finite.
    pub fn check(&self, field: &'static str) -> CoreResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid(field, format!("bounds {}..{} are not finite", self.min, self.max)));
        }
        if !(self.max - self.min).is_finite() {
            return Err(invalid(field, format!("span {}..{} overflows", self.min, self.max)));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> CoreError {
    CoreError::InvalidConfig { field, reason }
}

fn check_vec3(field: &'static str, v: Vec3) -> CoreResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} is not finite")))
    }
}

fn check_scalar(field: &'static str, v: f32) -> CoreResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{v} must be finite and non-negative")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SolarConfig {
    /// PRNG seed. `0` picks a random seed; the registry reports the one it used.
    pub seed: u64,
    pub sun: SunConfig,
    pub planets: PlanetConfig,
    pub moons: MoonConfig,
}

impl SolarConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject values that would break sampling or produce non-finite positions.
    pub fn validate(&self) -> CoreResult<()> {
        check_vec3("sun.position", self.sun.position)?;
        check_vec3("sun.scale", self.sun.scale)?;
        check_scalar("sun.spin_speed", self.sun.spin_speed)?;

        let planets = &self.planets;
        match &planets.placement {
            PlanetPlacement::Polar { radius } => radius.check("planets.placement.radius")?,
            PlanetPlacement::Box { x, y } => {
                x.check("planets.placement.x")?;
                y.check("planets.placement.y")?;
            }
        }
        check_vec3("planets.scale", planets.scale)?;
        planets.spin_speed.check("planets.spin_speed")?;
        planets.orbit_speed.check("planets.orbit_speed")?;

        let moons = &self.moons;
        check_scalar("moons.orbit_radius", moons.orbit_radius)?;
        moons.scale.check("moons.scale")?;
        moons.spin_speed.check("moons.spin_speed")?;
        moons.orbit_speed.check("moons.orbit_speed")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    pub position: Vec3,
    pub scale: Vec3,
    /// Radians per tick.
    pub spin_speed: f32,
    pub render: RenderHandle,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::splat(2.0),
            spin_speed: 0.005,
            render: RenderHandle(0),
        }
    }
}

/// Where new planets are dropped relative to the sun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PlanetPlacement {
    /// On the sun's X-Z plane at a sampled radius and uniform random angle.
    Polar { radius: ValueRange },
    /// Uniform in an X/Y box around the sun with Z = 0. The orbit still lies in
    /// the X-Z plane, so any Y offset folds into the radius on the first tick.
    Box { x: ValueRange, y: ValueRange },
}

impl Default for PlanetPlacement {
    fn default() -> Self {
        PlanetPlacement::Polar {
            radius: ValueRange::new(40.0, 150.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    pub max_count: usize,
    pub placement: PlanetPlacement,
    pub scale: Vec3,
    pub spin_speed: ValueRange,
    pub orbit_speed: ValueRange,
    pub render: RenderHandle,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            max_count: 5,
            placement: PlanetPlacement::default(),
            scale: Vec3::splat(0.75),
            spin_speed: ValueRange::new(0.02, 0.03),
            orbit_speed: ValueRange::new(0.001, 0.002),
            render: RenderHandle(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonConfig {
    /// Distance from the parent planet at creation.
    pub orbit_radius: f32,
    /// Uniform scale factor.
    pub scale: ValueRange,
    pub spin_speed: ValueRange,
    pub orbit_speed: ValueRange,
    pub render: RenderHandle,
}

impl Default for MoonConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 15.0,
            scale: ValueRange::new(0.2, 0.4),
            spin_speed: ValueRange::new(0.005, 0.01),
            orbit_speed: ValueRange::new(0.01, 0.02),
            render: RenderHandle(2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn defaults_match_editor_constants() {
        let cfg = SolarConfig::default();
        assert_eq!(cfg.seed, 0);
        assert_eq!(cfg.sun.scale, Vec3::splat(2.0));
        assert_eq!(cfg.sun.spin_speed, 0.005);
        assert_eq!(cfg.planets.max_count, 5);
        assert_eq!(cfg.moons.orbit_radius, 15.0);
    }

    #[test]
    fn range_sampling_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let range = ValueRange::new(0.02, 0.03);
        for _ in 0..1000 {
            assert!(range.contains(range.sample(&mut rng)));
        }
        assert_eq!(ValueRange::new(3.0, 1.0).sample(&mut rng), 3.0);
        assert_eq!(ValueRange::new(2.0, 2.0).sample(&mut rng), 2.0);
    }

    #[test]
    fn overflowing_range_is_rejected_and_never_sampled() {
        let huge = ValueRange::new(-3e38, 3e38);
        assert!(matches!(
            huge.check("x"),
            Err(CoreError::InvalidConfig { field: "x", .. })
        ));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(huge.sample(&mut rng), -3e38);

        let mut cfg = SolarConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        cfg.planets.placement = PlanetPlacement::Box {
            x: huge,
            y: ValueRange::new(-90.0, 90.0),
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("planets.placement.x"), "{err}");
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut cfg = SolarConfig::default();
        cfg.moons.orbit_radius = f32::NAN;
        assert!(cfg.validate().is_err());

        let mut cfg = SolarConfig::default();
        cfg.sun.scale = Vec3::new(1.0, f32::INFINITY, 1.0);
        assert!(cfg.validate().is_err());

        let mut cfg = SolarConfig::default();
        cfg.planets.spin_speed = ValueRange::new(f32::NEG_INFINITY, 0.03);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: SolarConfig = serde_json::from_str(
            r#"{
                "seed": 42,
                "planets": {
                    "max_count": 8,
                    "placement": { "policy": "box", "x": { "min": -150, "max": 150 }, "y": { "min": -90, "max": 90 } }
                }
            }"#,
        )
        .expect("parse config");
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.planets.max_count, 8);
        assert!(matches!(cfg.planets.placement, PlanetPlacement::Box { .. }));
        assert_eq!(cfg.planets.scale, Vec3::splat(0.75));
        assert_eq!(cfg.sun, SunConfig::default());
        assert_eq!(cfg.moons, MoonConfig::default());
    }

    #[test]
    fn json_round_trip() {
        let cfg = SolarConfig::default().with_seed(99);
        let text = serde_json::to_string_pretty(&cfg).expect("serialize");
        let back: SolarConfig = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, cfg);
    }
}
