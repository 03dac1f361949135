/// Application configuration
///
/// Loaded from `config.json` in the user's config directory:
/// - Linux: ~/.config/wedding-polaroids/config.json
/// - macOS: ~/Library/Application Support/wedding-polaroids/config.json
/// - Windows: %APPDATA%\wedding-polaroids\config.json
///
/// Every field has a default, so a partial (or missing) file is fine.
/// A few environment variables override the file for deployment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub curated: CuratedConfig,
    pub carousel: CarouselConfig,
    pub images: ImageConfig,
}

/// Hosted backend that lists approved guest photos
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    /// Set to false to show curated photos only
    pub enabled: bool,
    /// Project URL, e.g. "https://xyz.supabase.co"
    pub base_url: String,
    /// Public (anon) API key sent with every request
    pub api_key: String,
    /// Storage bucket holding the photo objects
    pub bucket: String,
    pub timeout_secs: u64,
    /// How often the photo list is re-fetched (0 disables refresh)
    pub refresh_interval_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: String::new(),
            api_key: String::new(),
            bucket: "photos".to_string(),
            timeout_secs: 15,
            refresh_interval_secs: 5 * 60,
        }
    }
}

impl FeedConfig {
    /// The feed is only queried when it is enabled and has somewhere to go
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.base_url.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

/// Curated photos shipped with the site
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct CuratedConfig {
    /// Folder with curated images (and an optional captions.json)
    pub dir: Option<PathBuf>,
}

/// Tuning for the card stack and swipe gesture
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CarouselConfig {
    /// Drag distance (px) past which a release commits
    pub boundary_px: f32,
    /// Release speed (px/s) past which a release commits
    pub velocity_threshold: f32,
    /// Maximum jitter rotation in degrees
    pub jitter_rotate_deg: f32,
    /// Maximum jitter translation per axis in px
    pub jitter_translate_px: f32,
    /// Exit animation length; also the settle delay of the transition guard
    pub exit_duration_ms: u64,
    /// Duration of a card moving between stack positions
    pub role_duration_ms: u64,
    pub spring_stiffness: f32,
    pub spring_damping: f32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            boundary_px: 150.0,
            velocity_threshold: 800.0,
            jitter_rotate_deg: 8.0,
            jitter_translate_px: 10.0,
            exit_duration_ms: 300,
            role_duration_ms: 300,
            spring_stiffness: 300.0,
            spring_damping: 30.0,
        }
    }
}

impl CarouselConfig {
    pub fn exit_duration(&self) -> Duration {
        Duration::from_millis(self.exit_duration_ms)
    }

    pub fn role_duration(&self) -> Duration {
        Duration::from_millis(self.role_duration_ms)
    }
}

/// Decoded image limits
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct ImageConfig {
    /// Width of the photo area after decoding. Photos are cropped to 4:5
    /// and framed, so this also fixes the polaroid's pixel size.
    pub photo_width_px: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self { photo_width_px: 480 }
    }
}

impl Config {
    /// Load the config from its default location, then apply env overrides.
    ///
    /// A missing file yields defaults. A malformed file is logged and
    /// replaced by defaults rather than stopping the app.
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) => match Self::from_file(&path) {
                Ok(Some(config)) => {
                    log::info!("⚙️  Loaded config from {}", path.display());
                    config
                }
                Ok(None) => {
                    log::debug!("No config at {}, using defaults", path.display());
                    Self::default()
                }
                Err(e) => {
                    log::warn!("⚠️  Ignoring config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Get the path where the config file should live
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir().or_else(dirs::home_dir)?;
        path.push("wedding-polaroids");
        path.push("config.json");
        Some(path)
    }

    /// Read a config file; `Ok(None)` when it does not exist
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(Some(config))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply environment overrides through `lookup` (env::var in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("POLAROIDS_FEED_URL") {
            self.feed.base_url = url;
        }
        if let Some(key) = lookup("POLAROIDS_FEED_KEY") {
            self.feed.api_key = key;
        }
        if let Some(dir) = lookup("POLAROIDS_CURATED_DIR") {
            self.curated.dir = Some(PathBuf::from(dir));
        }
    }

    /// Reject values that would make the gesture math meaningless
    pub fn validate(&self) -> Result<()> {
        let c = &self.carousel;
        if !(c.boundary_px > 0.0) {
            return Err(Error::Config("carousel.boundary_px must be positive".into()));
        }
        if !(c.velocity_threshold > 0.0) {
            return Err(Error::Config("carousel.velocity_threshold must be positive".into()));
        }
        if c.jitter_rotate_deg < 0.0 || c.jitter_translate_px < 0.0 {
            return Err(Error::Config("carousel jitter magnitudes must not be negative".into()));
        }
        // The transition guard clears after the exit; role animations must be done by then
        if c.role_duration_ms > c.exit_duration_ms {
            return Err(Error::Config(
                "carousel.role_duration_ms must not exceed carousel.exit_duration_ms".into(),
            ));
        }
        // Without both the snap-back spring never settles
        if !(c.spring_stiffness > 0.0) || !(c.spring_damping > 0.0) {
            return Err(Error::Config("carousel spring stiffness and damping must be positive".into()));
        }
        if self.images.photo_width_px < 24 {
            return Err(Error::Config("images.photo_width_px must be at least 24".into()));
        }
        Ok(())
    }
}
