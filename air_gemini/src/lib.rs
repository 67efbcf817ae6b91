//! # air_gemini
//!
//! An [`Interpreter`] that sends the canvas snapshot to Google's Generative
//! Language API and returns the model's text reply.
//!
//! The snapshot is PNG-encoded, base64'd, and posted inline next to the
//! prompt.  The call is blocking: the session waits for it on the frame
//! loop, so two dispatches can never overlap.

pub mod wire;

use std::io::Cursor;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use tracing::{debug, info};

use air_canvas::Raster;
use air_gesture::{DispatchError, Interpreter};

use crate::wire::{GenerateRequest, GenerateResponse};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// ════════════════════════════════════════════════════════════════════════════
// GeminiConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    /// Without a key every dispatch reports [`DispatchError::MissingApiKey`].
    pub api_key:  Option<String>,
    pub model:    String,
    pub base_url: String,
    pub timeout:  Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key:  None,
            model:    DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout:  Duration::from_secs(60),
        }
    }
}

impl GeminiConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// GeminiInterpreter
// ════════════════════════════════════════════════════════════════════════════

pub struct GeminiInterpreter {
    http: Client,
    config: GeminiConfig,
}

impl GeminiInterpreter {
    pub fn new(config: GeminiConfig) -> Result<Self, DispatchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;
        Ok(GeminiInterpreter { http, config })
    }
}

impl Interpreter for GeminiInterpreter {
    fn interpret(&mut self, snapshot: &Raster, prompt: &str) -> Result<String, DispatchError> {
        let key = self.config.api_key.as_deref().ok_or(DispatchError::MissingApiKey)?;

        let png = encode_png(snapshot)?;
        debug!(bytes = png.len(), model = %self.config.model, "encoded canvas snapshot");
        let body = GenerateRequest::prompt_with_png(prompt, STANDARD.encode(&png));

        let response = self
            .http
            .post(self.config.endpoint())
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(DispatchError::Status { code: status.as_u16(), body });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| DispatchError::Transport(format!("invalid response body: {}", e)))?;
        let text = parsed.text()?;
        info!(model = %self.config.model, chars = text.len(), "model replied");
        Ok(text)
    }
}

/// PNG-encode an RGB raster.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, DispatchError> {
    let img = image::RgbImage::from_raw(
        raster.width() as u32,
        raster.height() as u32,
        raster.as_bytes().to_vec(),
    )
    .ok_or_else(|| DispatchError::Encode("invalid RGB buffer".to_string()))?;
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| DispatchError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_model() {
        let cfg = GeminiConfig {
            base_url: "http://localhost:9999/".into(),
            model: "test-model".into(),
            ..GeminiConfig::default()
        };
        assert_eq!(cfg.endpoint(), "http://localhost:9999/v1beta/models/test-model:generateContent");
    }

    #[test]
    fn default_model() {
        assert_eq!(GeminiConfig::default().model, "gemini-2.0-flash");
    }

    #[test]
    fn png_round_trips_pixels() {
        let mut r = Raster::blank(7, 5);
        r.put(3, 2, [255, 0, 255]);
        let png = encode_png(&r).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let back = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (7, 5));
        assert_eq!(back.get_pixel(3, 2).0, [255, 0, 255]);
        assert_eq!(back.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn missing_key_fails_without_network() {
        let mut gemini = GeminiInterpreter::new(GeminiConfig::default()).unwrap();
        let err = gemini.interpret(&Raster::blank(2, 2), "hi").unwrap_err();
        assert_eq!(err, DispatchError::MissingApiKey);
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let mut gemini = GeminiInterpreter::new(GeminiConfig {
            api_key: Some("k".into()),
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(2),
            ..GeminiConfig::default()
        })
        .unwrap();
        let err = gemini.interpret(&Raster::blank(2, 2), "hi").unwrap_err();
        assert!(matches!(err, DispatchError::Transport(_)), "{:?}", err);
    }
}
