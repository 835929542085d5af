use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

/// Element id the web host looks up when no override is configured.
pub const DEFAULT_CANVAS_ID: &str = "backdrop-canvas";
/// Body class that selects the static fallback styling.
pub const DEFAULT_FALLBACK_CLASS: &str = "backdrop-fallback";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackdropSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub page: PageSettings,
    #[serde(default)]
    pub motion: MotionSettings,
    #[serde(default)]
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PageSettings {
    pub canvas_id: String,
    pub fallback_class: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MotionSettings {
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub frame_interval: Duration,
    #[serde(
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub reduced_frame_interval: Duration,
    pub pointer_smoothing: f32,
    pub reduced_motion: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub max_device_pixel_ratio: f32,
    pub intensity: f32,
    pub reduced_intensity: f32,
}

fn default_version() -> u32 {
    1
}

impl Default for BackdropSettings {
    fn default() -> Self {
        Self {
            version: default_version(),
            page: PageSettings::default(),
            motion: MotionSettings::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            canvas_id: DEFAULT_CANVAS_ID.to_string(),
            fallback_class: DEFAULT_FALLBACK_CLASS.to_string(),
        }
    }
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_millis(16),
            reduced_frame_interval: Duration::from_millis(34),
            pointer_smoothing: 0.12,
            reduced_motion: false,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            max_device_pixel_ratio: 1.2,
            intensity: 1.0,
            reduced_intensity: 0.45,
        }
    }
}

fn serialize_duration<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&humantime::format_duration(*value).to_string())
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() || v.is_infinite() {
                return Err(E::custom("duration must be a finite, non-negative number"));
            }
            Duration::try_from_secs_f64(v)
                .map_err(|err| E::custom(format!("invalid duration {v}: {err}")))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl BackdropSettings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: BackdropSettings = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.page.canvas_id.trim().is_empty() {
            return Err(ConfigError::Invalid("page.canvas_id may not be empty".into()));
        }

        if self.page.fallback_class.trim().is_empty()
            || self.page.fallback_class.contains(char::is_whitespace)
        {
            return Err(ConfigError::Invalid(format!(
                "page.fallback_class '{}' must be a single non-empty class name",
                self.page.fallback_class
            )));
        }

        if self.motion.frame_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "motion.frame_interval must be greater than zero".into(),
            ));
        }

        if self.motion.reduced_frame_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "motion.reduced_frame_interval must be greater than zero".into(),
            ));
        }

        let smoothing = self.motion.pointer_smoothing;
        if !(smoothing > 0.0 && smoothing <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "motion.pointer_smoothing must be in (0, 1], got {smoothing}"
            )));
        }

        let ratio = self.display.max_device_pixel_ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "display.max_device_pixel_ratio must be positive, got {ratio}"
            )));
        }

        for (name, value) in [
            ("display.intensity", self.display.intensity),
            ("display.reduced_intensity", self.display.reduced_intensity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        Ok(())
    }
}
