//! Effect configuration for the fluted glass renderer.
//!
//! Settings arrive in two shapes: a versioned TOML file (strict, rejects
//! nonsense values) and a flat attribute map as found on markup containers
//! (lenient, corrects nonsense to documented defaults). Both produce an
//! [`EffectSettings`] which is resolved against the loaded image into an
//! immutable [`EffectConfig`].

use std::fmt;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROTATION_DEGREES: f32 = 0.0;
pub const DEFAULT_SEGMENT_COUNT: f32 = 80.0;
pub const MIN_SEGMENT_COUNT: f32 = 1.0;
pub const DEFAULT_OVERLAY_OPACITY: f32 = 0.0;
pub const MAX_OVERLAY_OPACITY: f32 = 100.0;
pub const DEFAULT_MOTION_FACTOR: f32 = 1.0;
/// Pointer-mode attenuation `k`; folded into the pointer factor at setup.
pub const DEFAULT_POINTER_ATTENUATION: f32 = 1.0;

const ATTRIBUTE_PREFIX: &str = "fluted-glass-";
/// Vendor prefix carried by legacy markup, e.g. `tlg-fluted-glass-segments`.
const LEGACY_VENDOR_PREFIX: &str = "tlg-";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("source image has unusable dimensions {width}x{height}")]
    InvalidImage { width: u32, height: u32 },
}

/// Which input signal drives the motion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Static,
    Pointer,
    Scroll,
}

impl InteractionMode {
    /// Maps a user-supplied mode name; anything unrecognised is `Static`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pointer" | "mouse" => Self::Pointer,
            "scroll" => Self::Scroll,
            _ => Self::Static,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Pointer => "pointer",
            Self::Scroll => "scroll",
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for InteractionMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Unresolved effect settings; `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<InteractionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pointer_attenuation: Option<f32>,
}

impl EffectSettings {
    /// Reads settings from markup-style attributes.
    ///
    /// Keys may carry the `fluted-glass-` or `tlg-fluted-glass-` prefix.
    /// Values that fail to parse fall back to defaults, unknown keys are
    /// ignored.
    pub fn from_attributes<I, K, V>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Self::default();
        for (key, value) in attributes {
            let key = key.as_ref().trim();
            let key = key.strip_prefix(LEGACY_VENDOR_PREFIX).unwrap_or(key);
            let key = key.strip_prefix(ATTRIBUTE_PREFIX).unwrap_or(key);
            let value = value.as_ref();
            match key {
                "rotation" => settings.rotation = parse_finite(value),
                "segments" => settings.segments = parse_finite(value),
                "overlay" => settings.overlay = parse_finite(value),
                "mode" => settings.mode = Some(InteractionMode::parse_lenient(value)),
                "motion" => settings.motion = parse_finite(value),
                "pointer-attenuation" => settings.pointer_attenuation = parse_finite(value),
                _ => {}
            }
        }
        settings
    }

    /// Returns `self` with every field present in `overrides` replaced.
    pub fn layered(&self, overrides: &EffectSettings) -> EffectSettings {
        EffectSettings {
            rotation: overrides.rotation.or(self.rotation),
            segments: overrides.segments.or(self.segments),
            overlay: overrides.overlay.or(self.overlay),
            mode: overrides.mode.or(self.mode),
            motion: overrides.motion.or(self.motion),
            pointer_attenuation: overrides.pointer_attenuation.or(self.pointer_attenuation),
        }
    }

    /// Strict checks applied to file-based settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite_fields = [
            ("rotation", self.rotation),
            ("segments", self.segments),
            ("overlay", self.overlay),
            ("motion", self.motion),
            ("pointer_attenuation", self.pointer_attenuation),
        ];
        for (name, value) in finite_fields {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(ConfigError::Invalid(format!(
                        "effect.{name} must be a finite number"
                    )));
                }
            }
        }

        if let Some(segments) = self.segments {
            if segments <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "effect.segments must be greater than zero (got {segments})"
                )));
            }
        }

        Ok(())
    }
}

fn parse_finite(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
}

/// On-disk configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EffectFile {
    pub version: u32,
    #[serde(default)]
    pub effect: EffectSettings,
}

impl EffectFile {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: EffectFile = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }
        self.effect.validate()
    }
}

/// Intrinsic pixel size of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(self) -> Result<f32, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidImage {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.width as f32 / self.height as f32)
    }
}

/// Fully resolved, immutable effect configuration.
///
/// Construction guarantees `segment_count >= 1`, a strictly positive image
/// aspect ratio, and an overlay opacity within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectConfig {
    rotation_degrees: f32,
    segment_count: f32,
    overlay_opacity_percent: f32,
    image_aspect_ratio: f32,
    interaction_mode: InteractionMode,
    motion_factor: f32,
    pointer_attenuation: f32,
}

impl EffectConfig {
    pub fn resolve(settings: &EffectSettings, image: ImageDimensions) -> Result<Self, ConfigError> {
        let image_aspect_ratio = image.aspect_ratio()?;
        let segment_count = settings
            .segments
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_SEGMENT_COUNT)
            .max(MIN_SEGMENT_COUNT);
        let overlay_opacity_percent = settings
            .overlay
            .filter(|value| value.is_finite())
            .unwrap_or(DEFAULT_OVERLAY_OPACITY)
            .clamp(0.0, MAX_OVERLAY_OPACITY);

        Ok(Self {
            rotation_degrees: finite_or(settings.rotation, DEFAULT_ROTATION_DEGREES),
            segment_count,
            overlay_opacity_percent,
            image_aspect_ratio,
            interaction_mode: settings.mode.unwrap_or_default(),
            motion_factor: finite_or(settings.motion, DEFAULT_MOTION_FACTOR),
            pointer_attenuation: finite_or(
                settings.pointer_attenuation,
                DEFAULT_POINTER_ATTENUATION,
            ),
        })
    }

    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }

    pub fn rotation_radians(&self) -> f32 {
        self.rotation_degrees.to_radians()
    }

    pub fn segment_count(&self) -> f32 {
        self.segment_count
    }

    pub fn overlay_opacity_percent(&self) -> f32 {
        self.overlay_opacity_percent
    }

    pub fn image_aspect_ratio(&self) -> f32 {
        self.image_aspect_ratio
    }

    pub fn interaction_mode(&self) -> InteractionMode {
        self.interaction_mode
    }

    pub fn motion_factor(&self) -> f32 {
        self.motion_factor
    }

    pub fn pointer_attenuation(&self) -> f32 {
        self.pointer_attenuation
    }
}

fn finite_or(value: Option<f32>, default: f32) -> f32 {
    value.filter(|value| value.is_finite()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1

[effect]
rotation = 15.0
segments = 50
overlay = 40
mode = "scroll"
motion = -2.5
"#;

    #[test]
    fn parses_sample_config() {
        let file = EffectFile::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(file.version, 1);
        assert_eq!(file.effect.rotation, Some(15.0));
        assert_eq!(file.effect.segments, Some(50.0));
        assert_eq!(file.effect.mode, Some(InteractionMode::Scroll));
        assert_eq!(file.effect.motion, Some(-2.5));
        assert_eq!(file.effect.pointer_attenuation, None);
    }

    #[test]
    fn rejects_unsupported_version() {
        let err = EffectFile::from_toml_str("version = 2\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_segments_in_file() {
        let config = r#"
version = 1

[effect]
segments = 0
"#;
        let err = EffectFile::from_toml_str(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_effect_keys() {
        let config = r#"
version = 1

[effect]
amplitude = 0.5
"#;
        let err = EffectFile::from_toml_str(config).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_mode_falls_back_to_static() {
        let config = r#"
version = 1

[effect]
mode = "hover"
"#;
        let file = EffectFile::from_toml_str(config).unwrap();
        assert_eq!(file.effect.mode, Some(InteractionMode::Static));
    }

    #[test]
    fn attributes_are_parsed_leniently() {
        let settings = EffectSettings::from_attributes([
            ("fluted-glass-rotation", "30"),
            ("fluted-glass-segments", "not a number"),
            ("overlay", "250"),
            ("mode", "mouse"),
            ("motion", "inf"),
            ("unrelated", "whatever"),
        ]);
        assert_eq!(settings.rotation, Some(30.0));
        assert_eq!(settings.segments, None);
        assert_eq!(settings.overlay, Some(250.0));
        assert_eq!(settings.mode, Some(InteractionMode::Pointer));
        assert_eq!(settings.motion, None);

        let config = EffectConfig::resolve(&settings, ImageDimensions::new(400, 200)).unwrap();
        assert_eq!(config.segment_count(), DEFAULT_SEGMENT_COUNT);
        assert_eq!(config.overlay_opacity_percent(), MAX_OVERLAY_OPACITY);
        assert_eq!(config.motion_factor(), DEFAULT_MOTION_FACTOR);
        assert_eq!(config.image_aspect_ratio(), 2.0);

        let legacy = EffectSettings::from_attributes([
            ("tlg-fluted-glass-segments", "40"),
            ("tlg-fluted-glass-rotation", "30"),
            ("tlg-fluted-glass-overlay", "15"),
            ("tlg-fluted-glass-mode", "scroll"),
            ("tlg-fluted-glass-motion", "2"),
        ]);
        assert_eq!(legacy.segments, Some(40.0));
        assert_eq!(legacy.rotation, Some(30.0));
        assert_eq!(legacy.overlay, Some(15.0));
        assert_eq!(legacy.mode, Some(InteractionMode::Scroll));
        assert_eq!(legacy.motion, Some(2.0));
    }

    #[test]
    fn resolve_clamps_segments_and_overlay() {
        let settings = EffectSettings {
            segments: Some(-4.0),
            overlay: Some(-10.0),
            ..EffectSettings::default()
        };
        let config = EffectConfig::resolve(&settings, ImageDimensions::new(10, 10)).unwrap();
        assert_eq!(config.segment_count(), MIN_SEGMENT_COUNT);
        assert_eq!(config.overlay_opacity_percent(), 0.0);
        assert_eq!(config.interaction_mode(), InteractionMode::Static);
        assert_eq!(config.pointer_attenuation(), DEFAULT_POINTER_ATTENUATION);
    }

    #[test]
    fn resolve_rejects_zero_height_image() {
        let err = EffectConfig::resolve(&EffectSettings::default(), ImageDimensions::new(640, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidImage {
                width: 640,
                height: 0
            }
        ));
    }

    #[test]
    fn layering_prefers_overrides() {
        let base = EffectSettings {
            rotation: Some(10.0),
            segments: Some(60.0),
            ..EffectSettings::default()
        };
        let overrides = EffectSettings {
            segments: Some(12.0),
            mode: Some(InteractionMode::Pointer),
            ..EffectSettings::default()
        };
        let merged = base.layered(&overrides);
        assert_eq!(merged.rotation, Some(10.0));
        assert_eq!(merged.segments, Some(12.0));
        assert_eq!(merged.mode, Some(InteractionMode::Pointer));
    }
}
