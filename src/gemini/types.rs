//! Wire format of the `generateContent` endpoint.
use serde::{Deserialize, Serialize};

use crate::gemini::GeneratedImage;
use crate::utils::encode::DEFAULT_MEDIA_TYPE;

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text { text: String },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineData {
    pub data: String,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(rename = "inlineData", default)]
    pub inline_data: Option<InlineData>,
}

impl GenerateContentResponse {
    /// First inline-image part of the first candidate, if any.
    pub fn first_image(&self) -> Option<GeneratedImage> {
        let content = self.candidates.first()?.content.as_ref()?;
        content.parts.iter().find_map(|part| {
            part.inline_data.as_ref().map(|inline| GeneratedImage {
                data: inline.data.clone(),
                media_type: inline
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string()),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_text_then_inline_parts() {
        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text { text: "hi".into() },
                    RequestPart::InlineData {
                        inline_data: InlineData { data: "AAA=".into(), mime_type: Some("image/png".into()) },
                    },
                ],
            }],
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"contents": [{"parts": [
                {"text": "hi"},
                {"inlineData": {"data": "AAA=", "mimeType": "image/png"}}
            ]}]})
        );
    }

    #[test]
    fn picks_first_inline_part_of_first_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [
                    {"text": "here you go"},
                    {"inlineData": {"data": "Zmlyc3Q=", "mimeType": "image/jpeg"}},
                    {"inlineData": {"data": "c2Vjb25k", "mimeType": "image/png"}}
                ]}},
                {"content": {"parts": [{"inlineData": {"data": "b3RoZXI="}}]}}
            ]
        }))
        .unwrap();
        let img = resp.first_image().unwrap();
        assert_eq!(img.data, "Zmlyc3Q=");
        assert_eq!(img.media_type, "image/jpeg");
    }

    #[test]
    fn missing_mime_type_defaults() {
        let resp: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"inlineData": {"data": "eA=="}}]}}]
        }))
        .unwrap();
        assert_eq!(resp.first_image().unwrap().media_type, "image/png");
    }

    #[test]
    fn empty_shapes_have_no_image() {
        for body in [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{}]}),
            json!({"candidates": [{"content": {"parts": [{"text": "refused"}]}}]}),
        ] {
            let resp: GenerateContentResponse = serde_json::from_value(body).unwrap();
            assert!(resp.first_image().is_none());
        }
    }
}
