use std::path::Path;

use anyhow::{Context, Result};
use backdrop_settings::BackdropSettings;

use crate::cli::RunArgs;
use crate::paths::AppPaths;

pub const DEFAULT_SURFACE_SIZE: (u32, u32) = (1280, 720);

pub fn parse_surface_size(spec: &str) -> Result<(u32, u32)> {
    let trimmed = spec.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow::anyhow!("expected WxH format, e.g. 1920x1080"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }

    Ok((width, height))
}

/// Loads settings from `--config`, else from the config directory, else
/// falls back to defaults. An explicit path must exist.
pub fn load_settings(args: &RunArgs, paths: &AppPaths) -> Result<BackdropSettings> {
    if let Some(path) = args.config.as_deref() {
        return load_from(path);
    }

    let path = paths.settings_file();
    if path.is_file() {
        load_from(&path)
    } else {
        tracing::debug!(path = %path.display(), "no settings file; using defaults");
        Ok(BackdropSettings::default())
    }
}

fn load_from(path: &Path) -> Result<BackdropSettings> {
    let settings = BackdropSettings::load(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Applies command-line overrides on top of loaded settings.
pub fn apply_overrides(mut settings: BackdropSettings, args: &RunArgs) -> Result<BackdropSettings> {
    if args.reduced_motion {
        settings.motion.reduced_motion = true;
    }
    if let Some(intensity) = args.intensity {
        if settings.motion.reduced_motion {
            settings.display.reduced_intensity = intensity;
        } else {
            settings.display.intensity = intensity;
        }
    }
    settings
        .validate()
        .context("invalid command-line overrides")?;
    Ok(settings)
}
