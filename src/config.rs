use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;
use tracemon_core::{ChartConfig, TraceStyle};

/// Frame rate bounds accepted from the config file.
const FPS_RANGE: std::ops::RangeInclusive<u32> = 1..=240;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplaySettings {
    /// Initial window size in physical pixels.
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub borderless: bool,
    pub fps: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            title: "tracemon".into(),
            borderless: false,
            fps: 60,
        }
    }
}

impl DisplaySettings {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OverlaySettings {
    pub visible: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self { visible: true }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub display: DisplaySettings,
    pub chart: ChartConfig,
    pub overlay: OverlaySettings,
}

impl Settings {
    fn validate(self) -> anyhow::Result<Self> {
        if !FPS_RANGE.contains(&self.display.fps) {
            bail!(
                "display.fps must be within {}..={}, got {}",
                FPS_RANGE.start(),
                FPS_RANGE.end(),
                self.display.fps
            );
        }
        if !(self.chart.pursuit_rate.is_finite() && self.chart.pursuit_rate > 0.0) {
            bail!("chart.pursuit_rate must be positive, got {}", self.chart.pursuit_rate);
        }
        if self.display.width == 0 || self.display.height == 0 {
            bail!("display.width and display.height must be non-zero");
        }
        if let TraceStyle::Projected { vanish_x, vanish_y } = self.chart.style
            && !(vanish_x.is_finite() && vanish_y.is_finite())
        {
            bail!("chart.style vanishing point must be finite, got ({vanish_x}, {vanish_y})");
        }
        Ok(self)
    }
}

pub fn parse(raw: &str) -> anyhow::Result<Settings> {
    toml::from_str::<Settings>(raw)
        .context("TOML parse error")?
        .validate()
}

/// Load settings from a TOML file. A missing file yields the defaults so the
/// chart always starts; an unreadable or invalid one is an error.
pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Settings> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(Settings::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read '{}'", path.display()))?;
    parse(&raw).with_context(|| format!("invalid config '{}'", path.display()))
}

/// Default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("tracemon").join("tracemon.toml")
}
