//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TB_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;
use throwball_core::BallSpec;
use throwball_input::GripConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsConfig,
    /// Size and surface of the ball
    #[serde(default)]
    pub ball: BallSpec,
    /// Grip thresholds and push force
    #[serde(default)]
    pub grip: GripConfig,
    /// Session and provider configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TB_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // TB_GRIP__FORCE_MAGNITUDE=0 -> grip.force_magnitude = 0
        figment = figment.merge(Env::prefixed("TB_").split("__"));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with
    ///
    /// Serde accepts any float, including negative and NaN ones, so numeric
    /// ranges are checked here once instead of in every consumer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        let non_negative = |v: f32| v.is_finite() && v >= 0.0;

        let checks = [
            ("physics.gravity", self.physics.gravity.is_finite()),
            ("physics.max_dt", positive(self.physics.max_dt)),
            ("physics.fixed_dt", positive(self.physics.fixed_dt)),
            ("ball.radius", positive(self.ball.radius)),
            ("ball.mass", positive(self.ball.mass)),
            ("ball.friction", non_negative(self.ball.friction)),
            ("ball.restitution", non_negative(self.ball.restitution)),
            ("grip.curl_threshold", non_negative(self.grip.curl_threshold)),
            ("grip.proximity_threshold", non_negative(self.grip.proximity_threshold)),
            ("grip.force_magnitude", non_negative(self.grip.force_magnitude)),
        ];
        match checks.iter().find(|(_, ok)| !ok) {
            Some((key, _)) => Err(ConfigError::Invalid(key.to_string())),
            None => Ok(()),
        }
    }

    /// Physics world settings derived from this configuration
    pub fn physics_world_config(&self) -> throwball_core::PhysicsConfig {
        throwball_core::PhysicsConfig::new(self.physics.gravity)
    }
}

/// Physics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity (negative = downward, m/s²)
    pub gravity: f32,
    /// Longest step the simulation will take in one frame (seconds)
    pub max_dt: f32,
    /// Step used when replaying recordings (seconds)
    pub fixed_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: -9.81,
            max_dt: 0.25,
            fixed_dt: 1.0 / 90.0,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whether the device offers hand tracking
    pub hand_tracking_supported: bool,
    /// Whether the device offers scene reconstruction
    pub scene_reconstruction_supported: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            hand_tracking_supported: true,
            scene_reconstruction_supported: true,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub enum ConfigError {
    /// A source could not be read or did not match the schema
    Load(Box<figment::Error>),
    /// A value is out of range; holds the offending key
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Load(e) => write!(f, "Configuration error: {}", e),
            ConfigError::Invalid(key) => write!(f, "Configuration error: {} is out of range", key),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Load(e) => Some(e.as_ref()),
            ConfigError::Invalid(_) => None,
        }
    }
}
