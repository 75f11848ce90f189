//! Entry point for Orrery.
//! Headless host: logging, CLI flags, a scripted editor session and the tick loop.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};

use corelib::{BodyKind, Registry, SolarConfig, camera::Camera};

/// One editor command, as issued from a menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    AddSun,
    AddPlanet,
    AddMoon,
    Clear,
}

fn parse_command(token: &str) -> Option<Command> {
    match token.trim().to_ascii_lowercase().as_str() {
        "sun" => Some(Command::AddSun),
        "planet" => Some(Command::AddPlanet),
        "moon" => Some(Command::AddMoon),
        "clear" | "new" => Some(Command::Clear),
        _ => None,
    }
}

fn parse_script_arg(args: &[String]) -> Vec<Command> {
    // --script=sun,planet,planet,moon ; по умолчанию пустой сценарий
    let mut script = Vec::new();
    for arg in args {
        if let Some(val) = arg.strip_prefix("--script=") {
            script.clear();
            for token in val.split(',').filter(|t| !t.trim().is_empty()) {
                match parse_command(token) {
                    Some(cmd) => script.push(cmd),
                    None => log::warn!("Unknown command '{}' in script, skipped.", token),
                }
            }
        }
    }
    script
}

fn parse_u64_arg(args: &[String], flag: &str, default: u64) -> u64 {
    let prefix = format!("--{flag}=");
    for arg in args {
        if let Some(val) = arg.strip_prefix(prefix.as_str()) {
            match val.parse::<u64>() {
                Ok(v) => return v,
                Err(_) => log::warn!("Invalid value '{}' for --{}, using {}.", val, flag, default),
            }
        }
    }
    default
}

fn parse_dt_arg(args: &[String]) -> f32 {
    for arg in args {
        if let Some(val) = arg.strip_prefix("--dt=") {
            if let Ok(dt) = val.parse::<f32>() {
                if dt.is_finite() && dt > 0.0 {
                    return dt;
                }
            }
            log::warn!("Invalid --dt '{}', falling back to 1/60.", val);
        }
    }
    1.0 / 60.0
}

fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    let prefix = format!("--{flag}=");
    args.iter()
        .filter_map(|arg| arg.strip_prefix(prefix.as_str()))
        .filter(|v| !v.is_empty())
        .last()
        .map(PathBuf::from)
}

fn load_config(path: Option<&PathBuf>) -> Result<SolarConfig> {
    let Some(path) = path else {
        return Ok(SolarConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: SolarConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply one command. Rejections are logged by the registry and never abort the session.
fn apply(registry: &mut Registry, cmd: Command) {
    let result = match cmd {
        Command::AddSun => registry.add_sun(),
        Command::AddPlanet => registry.add_planet(),
        Command::AddMoon => registry.add_moon(),
        Command::Clear => {
            registry.clear();
            return;
        }
    };
    if let Err(err) = result {
        log::debug!("{:?} ignored: {}", cmd, err);
    }
}

/// Log what a renderer would be handed this frame.
fn report(registry: &Registry, camera: &Camera) {
    let pv = camera.proj_view();
    log::info!(
        "tick {} ({:.2}s): {} bodies",
        registry.ticks(),
        registry.elapsed(),
        registry.len()
    );
    for item in registry.render_list() {
        let Some(body) = registry.get(item.id) else {
            continue;
        };
        let ndc = (pv * item.world).project_point3(corelib::Vec3::ZERO);
        log::info!(
            "  {} handle={} {} -> ndc ({:.3}, {:.3})",
            item.id,
            item.render.0,
            body,
            ndc.x,
            ndc.y
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = parse_path_arg(&args, "config");
    let load_path = parse_path_arg(&args, "load");
    let save_path = parse_path_arg(&args, "save");
    let script = parse_script_arg(&args);
    let ticks = parse_u64_arg(&args, "ticks", 600);
    let report_every = parse_u64_arg(&args, "report-every", 0);
    let dt = parse_dt_arg(&args);

    let mut config = load_config(config_path.as_ref())?;
    config.seed = parse_u64_arg(&args, "seed", config.seed);

    log::info!(
        "Starting Orrery. script={:?}, ticks={}, dt={:.4}",
        script,
        ticks,
        dt
    );

    let mut registry = match &load_path {
        Some(path) => asset::load_project_from_path(path)?.build_registry(config)?,
        None => Registry::new(config),
    };
    for cmd in &script {
        apply(&mut registry, *cmd);
    }

    let camera = Camera::editor(16.0 / 9.0);
    for _ in 0..ticks {
        registry.update_all(dt);
        if report_every > 0 && registry.ticks() % report_every == 0 {
            report(&registry, &camera);
        }
    }
    report(&registry, &camera);

    let count = |kind: BodyKind| registry.iter().filter(|(_, b)| b.kind() == kind).count();
    log::info!(
        "Final system: {} sun, {} planets, {} moons (seed={})",
        count(BodyKind::Sun),
        count(BodyKind::Planet),
        count(BodyKind::Moon),
        registry.seed()
    );

    if let Some(path) = save_path {
        asset::save_project_to_path(&registry, &path)?;
    }

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
