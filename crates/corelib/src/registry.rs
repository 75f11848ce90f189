//! Body registry: owns every body, enforces the sun/planet/moon hierarchy and
//! drives the per-tick update in parent-before-child order.
//!
//! Bodies live in one dense table and refer to their parent by [`BodyId`], so a
//! parent link is a lookup, never an ownership edge.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Mat4, Vec3,
    body::{BodyId, BodyKind, BodyRecord, CelestialBody, RenderHandle},
    config::{PlanetPlacement, SolarConfig},
    error::{CoreError, CoreResult},
};

/// Explicit planet parameters. [`Registry::add_planet`] samples these from config.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetParams {
    pub position: Vec3,
    pub scale: Vec3,
    pub spin_speed: f32,
    pub orbit_speed: f32,
}

/// Explicit moon parameters. The moon is placed on the X-Z plane of the most
/// recently added planet, `angle` radians around it at the configured radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoonParams {
    pub angle: f32,
    pub scale: Vec3,
    pub spin_speed: f32,
    pub orbit_speed: f32,
}

/// What a renderer needs to draw one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderItem {
    pub id: BodyId,
    pub render: RenderHandle,
    pub world: Mat4,
}

#[derive(Debug)]
pub struct Registry {
    config: SolarConfig,
    bodies: Vec<CelestialBody>,
    sun: Option<BodyId>,
    planets: Vec<BodyId>,
    moons: Vec<BodyId>,
    rng: StdRng,
    seed: u64,
    ticks: u64,
    elapsed: f32,
}

impl Registry {
    pub fn new(config: SolarConfig) -> Self {
        let seed = if config.seed == 0 {
            rand::random()
        } else {
            config.seed
        };
        log::info!("Registry created (seed={seed})");

        Self {
            config,
            bodies: Vec::new(),
            sun: None,
            planets: Vec::new(),
            moons: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            ticks: 0,
            elapsed: 0.0,
        }
    }

    pub fn add_sun(&mut self) -> CoreResult<BodyId> {
        if self.sun.is_some() {
            return Err(reject(CoreError::AlreadyExists(BodyKind::Sun)));
        }

        let cfg = &self.config.sun;
        let body = CelestialBody::fixed(
            BodyKind::Sun,
            cfg.position,
            cfg.scale,
            cfg.spin_speed,
            cfg.render,
        );
        let id = self.push(body);
        self.sun = Some(id);
        Ok(id)
    }

    /// Add a planet around the sun with sampled position and speeds.
    pub fn add_planet(&mut self) -> CoreResult<BodyId> {
        let sun = self.planet_slot()?;
        let center = self.bodies[sun.index()].position();

        let cfg = &self.config.planets;
        let offset = match &cfg.placement {
            PlanetPlacement::Polar { radius } => {
                let r = radius.sample(&mut self.rng);
                let a = self.rng.gen_range(0.0..TAU);
                Vec3::new(r * a.cos(), 0.0, r * a.sin())
            }
            PlanetPlacement::Box { x, y } => {
                Vec3::new(x.sample(&mut self.rng), y.sample(&mut self.rng), 0.0)
            }
        };
        let params = PlanetParams {
            position: center + offset,
            scale: cfg.scale,
            spin_speed: cfg.spin_speed.sample(&mut self.rng),
            orbit_speed: cfg.orbit_speed.sample(&mut self.rng),
        };
        self.insert_planet(sun, params)
    }

    pub fn add_planet_with(&mut self, params: PlanetParams) -> CoreResult<BodyId> {
        let sun = self.planet_slot()?;
        self.insert_planet(sun, params)
    }

    /// Add a moon to the most recently added planet with sampled angle and speeds.
    pub fn add_moon(&mut self) -> CoreResult<BodyId> {
        let planet = self.moon_parent()?;

        let cfg = &self.config.moons;
        let params = MoonParams {
            angle: self.rng.gen_range(0.0..TAU),
            scale: Vec3::splat(cfg.scale.sample(&mut self.rng)),
            spin_speed: cfg.spin_speed.sample(&mut self.rng),
            orbit_speed: cfg.orbit_speed.sample(&mut self.rng),
        };
        self.insert_moon(planet, params)
    }

    pub fn add_moon_with(&mut self, params: MoonParams) -> CoreResult<BodyId> {
        let planet = self.moon_parent()?;
        self.insert_moon(planet, params)
    }

    /// Re-insert a persisted body. Records must arrive in their saved order
    /// into a cleared registry so that parent ids line up.
    pub fn restore(&mut self, record: &BodyRecord) -> CoreResult<BodyId> {
        let render = match record.kind {
            BodyKind::Sun => {
                if self.sun.is_some() {
                    return Err(reject(CoreError::AlreadyExists(BodyKind::Sun)));
                }
                if record.parent.is_some() {
                    return Err(reject(invalid_parent(record)));
                }
                self.config.sun.render
            }
            BodyKind::Planet => {
                let sun = self.planet_slot()?;
                if record.parent != Some(sun) {
                    return Err(reject(invalid_parent(record)));
                }
                self.config.planets.render
            }
            BodyKind::Moon => {
                self.moon_parent()?;
                let parent_is_planet = record
                    .parent
                    .is_some_and(|p| self.planets.contains(&p));
                if !parent_is_planet {
                    return Err(reject(invalid_parent(record)));
                }
                self.config.moons.render
            }
        };

        let id = self.push(CelestialBody::from_record(record, render));
        match record.kind {
            BodyKind::Sun => self.sun = Some(id),
            BodyKind::Planet => self.planets.push(id),
            BodyKind::Moon => self.moons.push(id),
        }
        Ok(id)
    }

    /// Advance every body one tick: sun, then planets, then moons, each in
    /// insertion order. `dt` only feeds the elapsed-time counter; speeds are
    /// per tick.
    pub fn update_all(&mut self, dt: f32) {
        if let Some(sun) = self.sun {
            self.advance(sun);
        }
        for i in 0..self.planets.len() {
            self.advance(self.planets[i]);
        }
        for i in 0..self.moons.len() {
            self.advance(self.moons[i]);
        }

        self.ticks += 1;
        self.elapsed += dt;
    }

    /// Drop every body. The PRNG keeps its stream.
    pub fn clear(&mut self) {
        log::info!("Clearing {} bodies", self.bodies.len());
        self.bodies.clear();
        self.sun = None;
        self.planets.clear();
        self.moons.clear();
        self.ticks = 0;
        self.elapsed = 0.0;
    }

    /// Body ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        (0..self.bodies.len()).map(BodyId::from_index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &CelestialBody)> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (BodyId::from_index(i), b))
    }

    /// Render handoff, in insertion order.
    pub fn render_list(&self) -> impl Iterator<Item = RenderItem> + '_ {
        self.iter().map(|(id, b)| RenderItem {
            id,
            render: b.render(),
            world: b.world_matrix(),
        })
    }

    #[inline]
    pub fn get(&self, id: BodyId) -> Option<&CelestialBody> {
        self.bodies.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn sun(&self) -> Option<BodyId> {
        self.sun
    }

    pub fn planets(&self) -> &[BodyId] {
        &self.planets
    }

    pub fn moons(&self) -> &[BodyId] {
        &self.moons
    }

    pub fn planet_count(&self) -> usize {
        self.planets.len()
    }

    pub fn moon_count(&self) -> usize {
        self.moons.len()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SolarConfig {
        &self.config
    }

    /// Ticks since creation or the last [`Registry::clear`].
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    fn planet_slot(&self) -> CoreResult<BodyId> {
        let sun = self.sun.ok_or_else(|| {
            reject(CoreError::MissingPrerequisite {
                kind: BodyKind::Planet,
                requires: BodyKind::Sun,
            })
        })?;
        let max = self.config.planets.max_count;
        if self.planets.len() >= max {
            return Err(reject(CoreError::CapacityExceeded {
                kind: BodyKind::Planet,
                max,
            }));
        }
        Ok(sun)
    }

    fn moon_parent(&self) -> CoreResult<BodyId> {
        self.planets.last().copied().ok_or_else(|| {
            reject(CoreError::MissingPrerequisite {
                kind: BodyKind::Moon,
                requires: BodyKind::Planet,
            })
        })
    }

    fn insert_planet(&mut self, sun: BodyId, params: PlanetParams) -> CoreResult<BodyId> {
        let body = CelestialBody::orbiting(
            BodyKind::Planet,
            params.position,
            params.scale,
            params.spin_speed,
            params.orbit_speed,
            sun,
            self.bodies[sun.index()].position(),
            self.config.planets.render,
        );
        let id = self.push(body);
        self.planets.push(id);
        Ok(id)
    }

    fn insert_moon(&mut self, planet: BodyId, params: MoonParams) -> CoreResult<BodyId> {
        let center = self.bodies[planet.index()].position();
        let r = self.config.moons.orbit_radius;
        let position = center + Vec3::new(r * params.angle.cos(), 0.0, r * params.angle.sin());
        let body = CelestialBody::orbiting(
            BodyKind::Moon,
            position,
            params.scale,
            params.spin_speed,
            params.orbit_speed,
            planet,
            center,
            self.config.moons.render,
        );
        let id = self.push(body);
        self.moons.push(id);
        Ok(id)
    }

    fn push(&mut self, body: CelestialBody) -> BodyId {
        let id = BodyId::from_index(self.bodies.len());
        log::info!("Added {id}: {body}");
        self.bodies.push(body);
        id
    }

    fn advance(&mut self, id: BodyId) {
        let parent_position = self.bodies[id.index()]
            .parent()
            .map(|p| self.bodies[p.index()].position());
        self.bodies[id.index()].advance(parent_position);
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(SolarConfig::default())
    }
}

fn reject(err: CoreError) -> CoreError {
    log::warn!("Rejected: {err}");
    err
}

fn invalid_parent(record: &BodyRecord) -> CoreError {
    CoreError::InvalidParent {
        kind: record.kind,
        parent: record.parent,
    }
}
