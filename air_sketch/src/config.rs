//! Application configuration.
//!
//! Layers, later wins: built-in defaults → `air_sketch.toml` (or
//! `--config`) → environment → command-line flags (applied in `main`).

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use tracing::debug;

use air_canvas::{StrokeStyle, DEFAULT_STYLE};
use air_gemini::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};
use air_gesture::DEFAULT_PROMPT;

/// Looked for in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "air_sketch.toml";

/// Where frames and hand observations come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Synthetic backdrop + keyboard/mouse hand.
    Simulation,
    /// Raw `rgb24` video and/or an external detector process.
    Hardware {
        raw_video: Option<String>,
        detector:  Option<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width:  usize,
    pub height: usize,
    /// Flip frames horizontally before detection and display.
    pub mirror: bool,

    // ── capabilities ─────────────────────────────────────────────────────
    /// `rgb24` frame stream: a path, or `-` for stdin.
    pub raw_video:  Option<String>,
    /// Detector command line, spawned once.
    pub detector:   Option<String>,
    /// Minimum detector score for a hand to count.
    pub confidence: f32,

    // ── drawing ──────────────────────────────────────────────────────────
    pub stroke_width: u32,

    // ── interpreter ──────────────────────────────────────────────────────
    pub prompt:       String,
    pub model:        String,
    pub api_key:      Option<String>,
    pub base_url:     String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            width:        1280,
            height:       720,
            mirror:       true,
            raw_video:    None,
            detector:     None,
            confidence:   0.7,
            stroke_width: DEFAULT_STYLE.width,
            prompt:       DEFAULT_PROMPT.to_string(),
            model:        DEFAULT_MODEL.to_string(),
            api_key:      None,
            base_url:     DEFAULT_BASE_URL.to_string(),
            timeout_secs: 60,
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid config file")
    }

    /// Read an explicit config path, or `air_sketch.toml` if it exists, or
    /// fall back to defaults.  An explicit path that can't be read is an
    /// error; a missing default file is not.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(AppConfig::default()),
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        debug!(path = %path.display(), "loaded config file");
        AppConfig::from_toml_str(&raw)
    }

    /// Overlay environment values.  `lookup` is `std::env::var(..).ok()` in
    /// production.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("GEMINI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(v);
        }
        if let Some(v) = lookup("AIR_SKETCH__MODEL") {
            self.model = v;
        }
        if let Some(v) = lookup("AIR_SKETCH__PROMPT") {
            self.prompt = v;
        }
        if let Some(v) = lookup("AIR_SKETCH__DETECTOR") {
            self.detector = Some(v);
        }
    }

    /// Reject settings no frame source or window can honour.  Run after
    /// every layer has been applied.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "frame size must be non-zero, got {}x{}",
            self.width,
            self.height
        );
        ensure!(
            (0.0..=1.0).contains(&self.confidence),
            "confidence must be within 0..=1, got {}",
            self.confidence
        );
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        if self.raw_video.is_none() && self.detector.is_none() {
            Mode::Simulation
        } else {
            Mode::Hardware {
                raw_video: self.raw_video.clone(),
                detector:  self.detector.clone(),
            }
        }
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        StrokeStyle { width: self.stroke_width.max(1), ..DEFAULT_STYLE }
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key:  self.api_key.clone(),
            model:    self.model.clone(),
            base_url: self.base_url.clone(),
            timeout:  Duration::from_secs(self.timeout_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_simulation() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.mode(), Mode::Simulation);
        assert_eq!((cfg.width, cfg.height), (1280, 720));
        assert!(cfg.mirror);
        assert_eq!(cfg.prompt, "Analyze the drawing and provide a text response.");
    }

    #[test]
    fn file_overrides_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            width = 640
            height = 480
            mirror = false
            detector = "python3 hand_detect.py"
            prompt = "Solve this math problem"
            "#,
        )
        .unwrap();
        assert_eq!((cfg.width, cfg.height), (640, 480));
        assert!(!cfg.mirror);
        assert_eq!(cfg.prompt, "Solve this math problem");
        // untouched keys keep defaults
        assert_eq!(cfg.model, "gemini-2.0-flash");
        assert_eq!(
            cfg.mode(),
            Mode::Hardware { raw_video: None, detector: Some("python3 hand_detect.py".into()) }
        );
    }

    #[test]
    fn bad_file_is_an_error() {
        assert!(AppConfig::from_toml_str("width = \"wide\"").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let mut cfg = AppConfig::from_toml_str("model = \"from-file\"").unwrap();
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "secret"),
            ("AIR_SKETCH__MODEL", "from-env"),
        ]
        .into_iter()
        .collect();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.model, "from-env");
        assert_eq!(cfg.gemini().api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn blank_api_key_is_ignored() {
        let mut cfg = AppConfig { api_key: Some("keep".into()), ..AppConfig::default() };
        cfg.apply_env(|k| (k == "GEMINI_API_KEY").then(|| "  ".to_string()));
        assert_eq!(cfg.api_key.as_deref(), Some("keep"));
    }

    #[test]
    fn zero_frame_size_is_rejected() {
        assert!(AppConfig::default().validate().is_ok());
        let err = AppConfig { width: 0, ..AppConfig::default() }.validate().unwrap_err();
        assert!(err.to_string().contains("0x720"), "{}", err);
        let cfg = AppConfig::from_toml_str("height = 0").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        assert!(AppConfig { confidence: 1.5, ..AppConfig::default() }.validate().is_err());
    }

    #[test]
    fn stroke_width_never_zero() {
        let cfg = AppConfig { stroke_width: 0, ..AppConfig::default() };
        assert_eq!(cfg.stroke_style().width, 1);
        assert_eq!(cfg.stroke_style().color, [255, 0, 255]);
    }
}
