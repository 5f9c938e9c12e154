//! Wire types for the analyze endpoint.

use crate::analysis::{AnalysisResult, DetectedInfo};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/analyze`.
///
/// Both fields are validated by the handler rather than by serde, so a missing
/// field produces a 400 with a Spanish message instead of a bare 422.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Document image as a `data:image/...;base64,...` URI.
    pub image: Option<String>,
    /// The user's free-form context for the document.
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub extracted_text: String,
    pub summary: String,
    pub label: String,
    pub detected_info: DetectedInfo,
    pub tags: Vec<String>,
}

impl AnalyzeResponse {
    pub fn new(extracted_text: String, analysis: AnalysisResult) -> Self {
        Self {
            extracted_text,
            summary: analysis.summary,
            label: analysis.label,
            detected_info: analysis.detected_info,
            tags: analysis.tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DetectedEntity;

    #[test]
    fn response_serializes_camel_case() {
        let response = AnalyzeResponse::new(
            "Hola".to_string(),
            AnalysisResult {
                summary: "Una nota".to_string(),
                label: "Nota".to_string(),
                detected_info: DetectedInfo {
                    entities: Vec::<DetectedEntity>::new(),
                    key_points: vec!["punto".to_string()],
                    document_type: "Nota personal".to_string(),
                    understanding: "Comprendido".to_string(),
                },
                tags: vec!["Nota".to_string()],
            },
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["extractedText"], "Hola");
        assert_eq!(json["detectedInfo"]["keyPoints"][0], "punto");
        assert_eq!(json["detectedInfo"]["documentType"], "Nota personal");
    }
}
