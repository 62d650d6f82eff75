use std::fmt;
use std::path::PathBuf;

/// Configuration defects, rejected before the first frame runs.
#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    NoLevels,
    ZeroDuration { level: usize },
    InvertedRange { name: &'static str, min: i32, max: i32 },
    NonFinite { name: &'static str, value: f32 },
    NonPositive { name: &'static str, value: f32 },
    ScreenTooSmall { width: f32, height: f32 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::NoLevels => write!(f, "level list is empty"),
            Self::ZeroDuration { level } => {
                write!(f, "level {} has a zero duration", level + 1)
            }
            Self::InvertedRange { name, min, max } => {
                write!(f, "{name}: min {min} is greater than max {max}")
            }
            Self::NonFinite { name, value } => {
                write!(f, "{name} must be a finite number, got {value}")
            }
            Self::NonPositive { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
            Self::ScreenTooSmall { width, height } => {
                write!(f, "screen {width}x{height} is too small for the configured margins")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}
