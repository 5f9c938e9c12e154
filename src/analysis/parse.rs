//! Defensive shaping of model completions.
//!
//! Models do not always honor the "JSON only" instruction. The shaping here
//! never fails: markdown fences are stripped, the outermost brace pair is
//! located, missing fields are backfilled with defaults, and a completion that
//! cannot be parsed at all degrades to a summary-only result built from the
//! raw text.

use super::{AnalysisResult, DetectedEntity, DetectedInfo};
use serde_json::Value;

pub const DEFAULT_LABEL: &str = "Documento General";
pub const DEFAULT_SUMMARY: &str = "No se pudo generar resumen";
pub const DEFAULT_UNDERSTANDING: &str = "Análisis del documento completado";
pub const DEGRADED_UNDERSTANDING: &str =
    "Se procesó el documento pero no se pudo extraer información estructurada. El resumen contiene la información disponible.";

/// Truncation length for the degraded summary.
const DEGRADED_SUMMARY_CHARS: usize = 500;

/// Shape a raw completion into a structurally complete [`AnalysisResult`].
pub fn shape_completion(completion: &str) -> AnalysisResult {
    match extract_json(completion).and_then(|json| serde_json::from_str::<Value>(&json).ok()) {
        Some(value) => shaped_from_value(&value),
        None => degraded(completion),
    }
}

/// Strip markdown fences and cut the completion down to its outermost brace
/// pair. Returns `None` when no braces are present.
fn extract_json(completion: &str) -> Option<String> {
    let cleaned = completion.trim().replace("```json", "").replace("```", "");
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    Some(cleaned[start..=end].to_string())
}

fn shaped_from_value(value: &Value) -> AnalysisResult {
    let label = non_empty_string(value.get("label")).unwrap_or_else(|| DEFAULT_LABEL.to_string());
    let detected = value.get("detectedInfo");

    // Entities with an unknown confidence value or a missing field are dropped
    // one by one rather than failing the whole list.
    let entities = detected
        .and_then(|d| d.get("entities"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<DetectedEntity>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default();

    let key_points = detected
        .and_then(|d| d.get("keyPoints"))
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();

    let document_type = detected
        .and_then(|d| non_empty_string(d.get("documentType")))
        .unwrap_or_else(|| label.clone());

    let understanding = detected
        .and_then(|d| non_empty_string(d.get("understanding")))
        .unwrap_or_else(|| DEFAULT_UNDERSTANDING.to_string());

    let tags: Vec<String> = value
        .get("tags")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    let tags = if tags.is_empty() { vec![label.clone()] } else { tags };

    AnalysisResult {
        summary: non_empty_string(value.get("summary")).unwrap_or_else(|| DEFAULT_SUMMARY.to_string()),
        label,
        detected_info: DetectedInfo {
            entities,
            key_points,
            document_type,
            understanding,
        },
        tags,
    }
}

/// Fallback when the completion holds no parseable JSON: the raw text,
/// truncated, becomes the summary.
fn degraded(completion: &str) -> AnalysisResult {
    AnalysisResult {
        summary: completion.chars().take(DEGRADED_SUMMARY_CHARS).collect(),
        label: DEFAULT_LABEL.to_string(),
        detected_info: DetectedInfo {
            entities: Vec::new(),
            key_points: Vec::new(),
            document_type: DEFAULT_LABEL.to_string(),
            understanding: DEGRADED_UNDERSTANDING.to_string(),
        },
        tags: vec![DEFAULT_LABEL.to_string()],
    }
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
