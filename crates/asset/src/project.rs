//! Project files: a line-oriented text dump of the registry.
//!
//! ```text
//! orrery-project 1
//! seed 1234
//! body <kind> <px> <py> <pz> <ox> <oy> <oz> <sx> <sy> <sz> <spin> <spin_speed> <orbit> <orbit_speed> <radius> <parent|->
//! ```
//!
//! `o*` is the creation position. Bodies are written in iteration order and a parent is referenced by its
//! index in that order, so it always precedes its children.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};

use corelib::{BodyId, BodyKind, BodyRecord, Registry, SolarConfig, Vec3};

const MAGIC: &str = "orrery-project";
const VERSION: u32 = 1;

/// Parsed project contents before they are turned into a registry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectData {
    pub seed: u64,
    pub bodies: Vec<BodyRecord>,
}

impl ProjectData {
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            seed: registry.seed(),
            bodies: registry.iter().map(|(_, b)| b.record()).collect(),
        }
    }

    /// Build a fresh registry holding these bodies. Every record goes through
    /// the registry's own hierarchy checks.
    pub fn build_registry(&self, config: SolarConfig) -> Result<Registry> {
        let mut registry = Registry::new(config.with_seed(self.seed));
        for (index, record) in self.bodies.iter().enumerate() {
            registry
                .restore(record)
                .with_context(|| format!("Failed to restore body {index} ({})", record.kind))?;
        }
        log::info!("Restored {} bodies", registry.len());
        Ok(registry)
    }
}

/// Save a registry to a file path.
pub fn save_project_to_path(registry: &Registry, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create project file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_project(&ProjectData::from_registry(registry), &mut writer)?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush project file: {}", path.display()))?;
    log::info!("Saved {} bodies to {}", registry.len(), path.display());
    Ok(())
}

pub fn write_project<W: Write>(data: &ProjectData, mut writer: W) -> Result<()> {
    writeln!(writer, "{MAGIC} {VERSION}")?;
    writeln!(writer, "seed {}", data.seed)?;
    for b in &data.bodies {
        let parent = b
            .parent
            .map(|p| p.index().to_string())
            .unwrap_or_else(|| "-".to_owned());
        writeln!(
            writer,
            "body {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            b.kind,
            b.position.x,
            b.position.y,
            b.position.z,
            b.original_position.x,
            b.original_position.y,
            b.original_position.z,
            b.scale.x,
            b.scale.y,
            b.scale.z,
            b.spin_angle,
            b.spin_speed,
            b.orbit_angle,
            b.orbit_speed,
            b.orbit_radius,
            parent
        )?;
    }
    Ok(())
}

/// Convenience helper producing the project text in memory.
pub fn project_to_string(data: &ProjectData) -> Result<String> {
    let mut buf = Vec::new();
    write_project(data, &mut buf)?;
    String::from_utf8(buf).context("Project text is not UTF-8")
}

/// Load a project from a file path.
pub fn load_project_from_path(path: impl AsRef<Path>) -> Result<ProjectData> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open project file: {}", path.as_ref().display()))?;
    load_project_from_reader(BufReader::new(file))
}

/// Load a project from a [`BufRead`] implementation.
pub fn load_project_from_reader<R: BufRead>(reader: R) -> Result<ProjectData> {
    parse_project(reader)
}

/// Convenience helper to parse project text.
pub fn load_project_from_str(contents: &str) -> Result<ProjectData> {
    parse_project(io::Cursor::new(contents))
}

fn parse_project<R: BufRead>(reader: R) -> Result<ProjectData> {
    let mut header_seen = false;
    let mut seed: Option<u64> = None;
    let mut bodies: Vec<BodyRecord> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_no + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let tag = parts
            .next()
            .ok_or_else(|| anyhow!("Malformed project line {}: '{}'", line_no + 1, trimmed))?;

        if !header_seen {
            if tag != MAGIC {
                anyhow::bail!("Not a project file: expected '{MAGIC}' on line {}", line_no + 1);
            }
            let version: u32 = parse_num(parts.next(), line_no, "version")?;
            if version != VERSION {
                anyhow::bail!("Unsupported project version {version} on line {}", line_no + 1);
            }
            header_seen = true;
            continue;
        }

        match tag {
            "seed" => {
                seed = Some(parse_num(parts.next(), line_no, "seed")?);
            }
            "body" => {
                let kind = parts
                    .next()
                    .ok_or_else(|| anyhow!("Missing body kind on line {}", line_no + 1))?
                    .parse::<BodyKind>()
                    .map_err(|e| anyhow!("{e} on line {}", line_no + 1))?;
                let position = parse_vec3(&mut parts, line_no, "position")?;
                let original_position = parse_vec3(&mut parts, line_no, "original position")?;
                let scale = parse_vec3(&mut parts, line_no, "scale")?;
                let spin_angle = parse_num(parts.next(), line_no, "spin angle")?;
                let spin_speed = parse_num(parts.next(), line_no, "spin speed")?;
                let orbit_angle = parse_num(parts.next(), line_no, "orbit angle")?;
                let orbit_speed = parse_num(parts.next(), line_no, "orbit speed")?;
                let orbit_radius = parse_num(parts.next(), line_no, "orbit radius")?;
                let parent = parse_parent(parts.next(), bodies.len(), line_no)?;

                bodies.push(BodyRecord {
                    kind,
                    position,
                    original_position,
                    scale,
                    spin_angle,
                    spin_speed,
                    orbit_angle,
                    orbit_speed,
                    orbit_radius,
                    parent,
                });
            }
            other => {
                log::debug!("Ignoring unknown directive '{}' on line {}", other, line_no + 1);
            }
        }
    }

    if !header_seen {
        anyhow::bail!("Project file is empty");
    }
    let seed = seed.ok_or_else(|| anyhow!("Project file has no seed line"))?;

    Ok(ProjectData { seed, bodies })
}

fn parse_num<T>(value: Option<&str>, line_no: usize, what: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let token = value.ok_or_else(|| anyhow!("Missing {} on line {}", what, line_no + 1))?;
    token
        .parse::<T>()
        .with_context(|| format!("Failed to parse {} on line {}", what, line_no + 1))
}

fn parse_vec3<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
    what: &str,
) -> Result<Vec3> {
    let x = parse_num(parts.next(), line_no, &format!("{what} x"))?;
    let y = parse_num(parts.next(), line_no, &format!("{what} y"))?;
    let z = parse_num(parts.next(), line_no, &format!("{what} z"))?;
    Ok(Vec3::new(x, y, z))
}

fn parse_parent(token: Option<&str>, current: usize, line_no: usize) -> Result<Option<BodyId>> {
    let token = token.ok_or_else(|| anyhow!("Missing parent on line {}", line_no + 1))?;
    if token == "-" {
        return Ok(None);
    }
    let index: usize = parse_num(Some(token), line_no, "parent index")?;
    if index >= current {
        anyhow::bail!(
            "Parent {} must precede body {} on line {}",
            index,
            current,
            line_no + 1
        );
    }
    Ok(Some(BodyId::from_index(index)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_registry() -> Registry {
        let mut reg = Registry::new(SolarConfig::default().with_seed(2024));
        reg.add_sun().unwrap();
        reg.add_planet().unwrap();
        reg.add_planet().unwrap();
        reg.add_moon().unwrap();
        for _ in 0..250 {
            reg.update_all(1.0 / 60.0);
        }
        reg
    }

    #[test]
    fn saved_project_restores_orbits_and_parents() {
        let reg = sample_registry();
        let text = project_to_string(&ProjectData::from_registry(&reg)).expect("write");
        let data = load_project_from_str(&text).expect("parse");
        assert_eq!(data.seed, 2024);
        assert_eq!(data.bodies.len(), 4);

        let mut restored = data.build_registry(SolarConfig::default()).expect("restore");
        assert_eq!(restored.seed(), 2024);
        assert_eq!(restored.planet_count(), 2);
        assert_eq!(restored.moon_count(), 1);
        for ((_, a), (_, b)) in reg.iter().zip(restored.iter()) {
            assert_eq!(a.record(), b.record());
            assert_eq!(a.original_position(), b.original_position());
        }
        // Orbiting bodies have moved away from where they were created.
        let planet = restored.planets()[0];
        let body = restored.get(planet).unwrap();
        assert_ne!(body.original_position(), body.position());

        // Motion carries on from where it was saved.
        let mut live = reg;
        live.update_all(1.0);
        restored.update_all(1.0);
        for ((_, a), (_, b)) in live.iter().zip(restored.iter()) {
            assert!(a.position().abs_diff_eq(b.position(), 1e-4));
            assert_abs_diff_eq!(a.spin_angle(), b.spin_angle(), epsilon = 1e-6);
        }
    }

    #[test]
    fn parse_minimal_project() {
        let src = r#"
            # hand-written
            orrery-project 1
            seed 9
            body sun 0 0 0 0 0 0 2 2 2 0.5 0.005 0 0 0 -
            body planet 50 0 0 0 0 50 0.75 0.75 0.75 0 0.02 0 0.01 50 0
        "#;
        let data = load_project_from_str(src).expect("parse project");
        assert_eq!(data.bodies.len(), 2);
        assert_eq!(data.bodies[0].kind, BodyKind::Sun);
        assert_eq!(data.bodies[0].parent, None);
        assert_eq!(data.bodies[1].parent, Some(BodyId::from_index(0)));
        assert_eq!(data.bodies[1].position, Vec3::new(50.0, 0.0, 0.0));
        assert_eq!(data.bodies[1].original_position, Vec3::new(0.0, 0.0, 50.0));

        let reg = data.build_registry(SolarConfig::default()).expect("restore");
        assert_eq!(reg.len(), 2);
        let planet = reg.get(BodyId::from_index(1)).unwrap();
        assert_eq!(planet.original_position(), Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(planet.position(), Vec3::new(50.0, 0.0, 0.0));
    }

    #[test]
    fn rejects_bad_header() {
        let err = load_project_from_str("solar 1\nseed 1\n").unwrap_err();
        assert!(err.to_string().contains("Not a project file"));
        let err = load_project_from_str("orrery-project 2\nseed 1\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported project version"));
        assert!(load_project_from_str("").is_err());
    }

    #[test]
    fn reports_line_of_bad_field() {
        let src = "orrery-project 1\nseed 1\nbody sun 0 0 zero 0 0 0 1 1 1 0 0 0 0 0 -\n";
        let err = load_project_from_str(src).unwrap_err();
        assert!(err.to_string().contains("position z on line 3"), "{err}");
    }

    #[test]
    fn rejects_forward_parent_reference() {
        let src = "orrery-project 1\nseed 1\nbody planet 1 0 0 1 0 0 1 1 1 0 0 0 0 1 1\n";
        let err = load_project_from_str(src).unwrap_err();
        assert!(err.to_string().contains("must precede"), "{err}");
    }

    #[test]
    fn hierarchy_violations_fail_restore() {
        let src = "orrery-project 1\nseed 1\n\
                   body sun 0 0 0 0 0 0 1 1 1 0 0 0 0 0 -\n\
                   body sun 0 0 0 0 0 0 1 1 1 0 0 0 0 0 -\n";
        let data = load_project_from_str(src).expect("parse");
        let err = data.build_registry(SolarConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("sun already exists"), "{err:#}");

        let orphan = "orrery-project 1\nseed 1\nbody moon 15 0 0 15 0 0 1 1 1 0 0 0 0 15 -\n";
        let data = load_project_from_str(orphan).expect("parse");
        assert!(data.build_registry(SolarConfig::default()).is_err());
    }
}
