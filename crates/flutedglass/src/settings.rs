use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glassconfig::{EffectFile, EffectSettings, InteractionMode};

use crate::cli::EffectArgs;
use crate::paths::AppPaths;

/// Settings after layering file, attributes and flags, plus where the file
/// layer came from.
#[derive(Debug)]
pub struct LoadedSettings {
    pub settings: EffectSettings,
    pub source: Option<PathBuf>,
}

/// Layers, lowest precedence first: config file, `--attr` pairs, explicit flags.
///
/// An explicitly named file must exist; the default file is optional.
pub fn load(explicit: Option<&Path>, args: &EffectArgs) -> Result<LoadedSettings> {
    let (file, source) = match explicit {
        Some(path) => (read_effect_file(path)?, Some(path.to_path_buf())),
        None => {
            let paths = AppPaths::discover()?;
            tracing::debug!(
                config_dir = %paths.config_dir().display(),
                "resolved config directory"
            );
            let path = paths.effect_file();
            if path.is_file() {
                (read_effect_file(&path)?, Some(path))
            } else {
                tracing::debug!(path = %path.display(), "no effect config file; using defaults");
                (EffectSettings::default(), None)
            }
        }
    };

    let attributes = EffectSettings::from_attributes(args.attributes.iter().cloned());
    let flags = flag_settings(args);
    flags
        .validate()
        .context("invalid effect flags on the command line")?;

    let settings = file.layered(&attributes).layered(&flags);
    tracing::debug!(?settings, source = ?source, "layered effect settings");
    Ok(LoadedSettings { settings, source })
}

fn read_effect_file(path: &Path) -> Result<EffectSettings> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read effect config {}", path.display()))?;
    let file = EffectFile::from_toml_str(&raw)
        .with_context(|| format!("failed to parse effect config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded effect config");
    Ok(file.effect)
}

fn flag_settings(args: &EffectArgs) -> EffectSettings {
    EffectSettings {
        rotation: args.rotation,
        segments: args.segments,
        overlay: args.overlay,
        mode: args.mode.as_deref().map(InteractionMode::parse_lenient),
        motion: args.motion,
        pointer_attenuation: args.pointer_attenuation,
    }
}
