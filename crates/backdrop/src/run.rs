use anyhow::{Context, Result};
use backdrop_renderer::{
    probe_adapter, run_preview, AdapterProfile, BackdropOptions, PreviewConfig,
};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{apply_overrides, load_settings, parse_surface_size, DEFAULT_SURFACE_SIZE};
use crate::cli::{Cli, Command, ProbeArgs, RunArgs};
use crate::paths::AppPaths;

pub fn run(cli: Cli) -> Result<()> {
    initialise_tracing();

    let paths = AppPaths::discover()?;
    tracing::debug!(config = %paths.config_dir().display(), "resolved backdrop paths");

    match cli.command {
        Some(Command::Settings) => print_settings(&cli.run, &paths),
        Some(Command::Probe(args)) => probe(&args),
        None => preview(&cli.run, &paths),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_settings(args: &RunArgs, paths: &AppPaths) -> Result<()> {
    let settings = load_settings(args, paths)?;
    let rendered = settings
        .to_toml_string()
        .context("failed to render settings")?;
    print!("{rendered}");
    Ok(())
}

fn probe(args: &ProbeArgs) -> Result<()> {
    let profile = pollster::block_on(probe_adapter()).context("GPU probe failed")?;
    if args.json {
        let rendered = serde_json::to_string_pretty(&profile_json(&profile))
            .context("failed to encode adapter profile")?;
        println!("{rendered}");
    } else {
        println!("adapter: {}", profile.name);
        println!("backend: {:?}", profile.backend);
        println!("device type: {:?}", profile.device_type);
        println!("driver: {}", profile.driver);
        println!("max texture dimension: {}", profile.max_texture_dimension_2d);
        println!("software: {}", profile.is_software());
    }
    Ok(())
}

fn profile_json(profile: &AdapterProfile) -> serde_json::Value {
    serde_json::json!({
        "name": profile.name,
        "backend": format!("{:?}", profile.backend),
        "device_type": format!("{:?}", profile.device_type),
        "driver": profile.driver,
        "max_texture_dimension_2d": profile.max_texture_dimension_2d,
        "software": profile.is_software(),
    })
}

fn preview(args: &RunArgs, paths: &AppPaths) -> Result<()> {
    let settings = apply_overrides(load_settings(args, paths)?, args)?;
    let surface_size = match args.size.as_deref() {
        Some(spec) => parse_surface_size(spec)?,
        None => DEFAULT_SURFACE_SIZE,
    };

    let options = BackdropOptions::from(&settings);
    let motion = options.motion_profile(false);
    tracing::info!(
        width = surface_size.0,
        height = surface_size.1,
        reduced_motion = motion.reduced,
        intensity = motion.intensity,
        force_fallback = args.force_fallback,
        "launching backdrop preview"
    );

    run_preview(PreviewConfig {
        options,
        surface_size,
        force_fallback: args.force_fallback,
    })
}
