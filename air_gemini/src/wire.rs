//! JSON shapes for `models/{model}:generateContent`.

use serde::{Deserialize, Serialize};

use air_gesture::DispatchError;

// ── request ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GenerateRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: Blob },
}

#[derive(Debug, Serialize)]
pub struct Blob {
    pub mime_type: &'static str,
    /// Base64, standard alphabet, padded.
    pub data: String,
}

impl<'a> GenerateRequest<'a> {
    /// One user turn: the instruction followed by the image.
    pub fn prompt_with_png(prompt: &'a str, png_b64: String) -> Self {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Inline { inline_data: Blob { mime_type: "image/png", data: png_b64 } },
                ],
            }],
        }
    }
}

// ── response ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Result<String, DispatchError> {
        let text: String = self
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().filter_map(|p| p.text.as_deref()).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            Err(DispatchError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_shape() {
        let req = GenerateRequest::prompt_with_png("Solve this", "iVBOR".into());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "contents": [{
                    "parts": [
                        { "text": "Solve this" },
                        { "inline_data": { "mime_type": "image/png", "data": "iVBOR" } }
                    ]
                }]
            })
        );
    }

    #[test]
    fn text_joins_parts_of_first_candidate() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": "x = " }, { "text": "4" } ] },
                  "finishReason": "STOP" },
                { "content": { "parts": [ { "text": "ignored" } ] } }
            ],
            "usageMetadata": { "promptTokenCount": 10 }
        }))
        .unwrap();
        assert_eq!(resp.text().unwrap(), "x = 4");
    }

    #[test]
    fn no_candidates_is_empty() {
        let resp: GenerateResponse =
            serde_json::from_value(json!({ "promptFeedback": { "blockReason": "SAFETY" } })).unwrap();
        assert_eq!(resp.text(), Err(DispatchError::EmptyResponse));
    }

    #[test]
    fn candidate_without_text_is_empty() {
        let resp: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [ { "finishReason": "SAFETY" } ] })).unwrap();
        assert_eq!(resp.text(), Err(DispatchError::EmptyResponse));
    }
}
