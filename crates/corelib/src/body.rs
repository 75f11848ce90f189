//! Celestial body model and the per-tick orbital update.

use std::{f32::consts::TAU, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Mat4, Vec3, transform::Transform};

/// Stable body id (dense, index into the registry's body table).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u32);

impl BodyId {
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Sun,
    Planet,
    Moon,
}

impl BodyKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            BodyKind::Sun => "sun",
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
        }
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sun" => Ok(BodyKind::Sun),
            "planet" => Ok(BodyKind::Planet),
            "moon" => Ok(BodyKind::Moon),
            other => Err(format!("unknown body kind '{other}'")),
        }
    }
}

/// Opaque render tag. The renderer owns whatever mesh/texture it points at;
/// the core only carries it through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u32);

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Plain snapshot of a body, used for persistence and restore.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyRecord {
    pub kind: BodyKind,
    pub position: Vec3,
    /// Position at creation time.
    pub original_position: Vec3,
    pub scale: Vec3,
    pub spin_angle: f32,
    pub spin_speed: f32,
    pub orbit_angle: f32,
    pub orbit_speed: f32,
    pub orbit_radius: f32,
    pub parent: Option<BodyId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    kind: BodyKind,
    position: Vec3,
    original_position: Vec3,
    scale: Vec3,
    spin_angle: f32,
    spin_speed: f32,
    orbit_angle: f32,
    orbit_speed: f32,
    orbit_radius: f32,
    parent: Option<BodyId>,
    render: RenderHandle,
}

impl CelestialBody {
    /// Body without a parent: it spins in place and never moves.
    pub(crate) fn fixed(
        kind: BodyKind,
        position: Vec3,
        scale: Vec3,
        spin_speed: f32,
        render: RenderHandle,
    ) -> Self {
        Self {
            kind,
            position,
            original_position: position,
            scale,
            spin_angle: 0.0,
            spin_speed: spin_speed.max(0.0),
            orbit_angle: 0.0,
            orbit_speed: 0.0,
            orbit_radius: 0.0,
            parent: None,
            render,
        }
    }

    /// Body orbiting `parent`. Radius and starting angle come from the offset
    /// to the parent's position at creation time and are never recomputed.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn orbiting(
        kind: BodyKind,
        position: Vec3,
        scale: Vec3,
        spin_speed: f32,
        orbit_speed: f32,
        parent: BodyId,
        parent_position: Vec3,
        render: RenderHandle,
    ) -> Self {
        let offset = position - parent_position;
        Self {
            kind,
            position,
            original_position: position,
            scale,
            spin_angle: 0.0,
            spin_speed: spin_speed.max(0.0),
            orbit_angle: wrap_angle(offset.z.atan2(offset.x)),
            orbit_speed,
            orbit_radius: position.distance(parent_position),
            parent: Some(parent),
            render,
        }
    }

    pub(crate) fn from_record(record: &BodyRecord, render: RenderHandle) -> Self {
        let orbiting = record.parent.is_some();
        Self {
            kind: record.kind,
            position: record.position,
            original_position: record.original_position,
            scale: record.scale,
            spin_angle: wrap_angle(record.spin_angle),
            spin_speed: record.spin_speed.max(0.0),
            orbit_angle: if orbiting { wrap_angle(record.orbit_angle) } else { 0.0 },
            orbit_speed: if orbiting { record.orbit_speed } else { 0.0 },
            orbit_radius: if orbiting { record.orbit_radius.max(0.0) } else { 0.0 },
            parent: record.parent,
            render,
        }
    }

    pub fn record(&self) -> BodyRecord {
        BodyRecord {
            kind: self.kind,
            position: self.position,
            original_position: self.original_position,
            scale: self.scale,
            spin_angle: self.spin_angle,
            spin_speed: self.spin_speed,
            orbit_angle: self.orbit_angle,
            orbit_speed: self.orbit_speed,
            orbit_radius: self.orbit_radius,
            parent: self.parent,
        }
    }

    /// Advance one tick. `parent_position` must be the parent's position
    /// after its own update for this tick; it is ignored for root bodies.
    pub(crate) fn advance(&mut self, parent_position: Option<Vec3>) {
        self.spin_angle = wrap_angle(self.spin_angle + self.spin_speed);

        if let (Some(_), Some(center)) = (self.parent, parent_position) {
            self.orbit_angle = wrap_angle(self.orbit_angle + self.orbit_speed);
            let (sin, cos) = self.orbit_angle.sin_cos();
            self.position = center + Vec3::new(cos * self.orbit_radius, 0.0, sin * self.orbit_radius);
        }
    }

    #[inline]
    pub fn transform(&self) -> Transform {
        Transform::from_tss(self.position, self.spin_angle, self.scale)
    }

    #[inline]
    pub fn world_matrix(&self) -> Mat4 {
        self.transform().matrix()
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn original_position(&self) -> Vec3 {
        self.original_position
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn spin_speed(&self) -> f32 {
        self.spin_speed
    }

    pub fn orbit_angle(&self) -> f32 {
        self.orbit_angle
    }

    pub fn orbit_speed(&self) -> f32 {
        self.orbit_speed
    }

    pub fn orbit_radius(&self) -> f32 {
        self.orbit_radius
    }

    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }

    pub fn render(&self) -> RenderHandle {
        self.render
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.position;
        let s = self.scale;
        write!(
            f,
            "{} at ({:.2}, {:.2}, {:.2}) (scale {:.2}x{:.2}x{:.2}, spin {:.2})",
            self.kind, p.x, p.y, p.z, s.x, s.y, s.z, self.spin_angle
        )
    }
}
