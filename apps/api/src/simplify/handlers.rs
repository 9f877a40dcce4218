//! Axum route handlers for the Simplify API.

use anyhow::anyhow;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::AppError;
use crate::simplify::levels::{parameters_for, GenerationParameters, Level};
use crate::simplify::service::SimplificationRequest;
use crate::simplify::stats::{text_stats, TextStats};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Generation settings a browser computed for display. Advisory only:
/// never forwarded upstream, the server always derives its own from `level`.
#[derive(Debug, Default, Deserialize)]
pub struct ClientHint {
    pub max_length: Option<f64>,
    pub min_length: Option<f64>,
    pub temperature: Option<f64>,
}

impl ClientHint {
    /// True when any supplied value differs from the authoritative parameters.
    pub fn disagrees_with(&self, params: &GenerationParameters) -> bool {
        // temperatures are f32 server-side, so compare with a tolerance
        let differs =
            |hint: Option<f64>, actual: f64| hint.is_some_and(|h| (h - actual).abs() > 1e-6);
        differs(self.max_length, f64::from(params.max_output_tokens))
            || differs(self.min_length, f64::from(params.min_output_tokens))
            || differs(self.temperature, f64::from(params.temperature))
    }
}

/// Fields stay loose JSON so a mistyped value is a 400, not a body rejection.
#[derive(Debug, Deserialize)]
pub struct SimplifyBody {
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub level: Option<Value>,
    #[serde(default)]
    pub parameters: Option<Value>,
}

/// Missing or null text is treated as empty and rejected later by validation.
fn text_from_json(raw: Option<Value>) -> Result<String, AppError> {
    match raw {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(AppError::InvalidInput("Text must be a string.".to_string())),
    }
}

/// Accepts a JSON number or a numeric string such as `"50"`.
fn level_from_json(raw: Option<&Value>) -> Result<Level, AppError> {
    let value = match raw {
        None | Some(Value::Null) => {
            return Err(AppError::InvalidInput(
                "A simplification level between 0 and 100 is required.".to_string(),
            ))
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    let value = value.ok_or_else(|| {
        AppError::InvalidInput("Level must be a number between 0 and 100.".to_string())
    })?;
    Level::try_from(value)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifyResponse {
    pub simplified: String,
    pub token_count: usize,
    pub char_count: usize,
}

#[derive(Debug, Serialize)]
pub struct LevelPreviewResponse {
    pub level: Level,
    #[serde(flatten)]
    pub parameters: GenerationParameters,
}

#[derive(Debug, Deserialize)]
pub struct StatsRequest {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/simplify
///
/// A body that is not a JSON object is treated as an internal fault.
pub async fn handle_simplify(
    State(state): State<AppState>,
    payload: Result<Json<SimplifyBody>, JsonRejection>,
) -> Result<Json<SimplifyResponse>, AppError> {
    let Json(body) =
        payload.map_err(|e| AppError::Internal(anyhow!("Malformed simplify request body: {e}")))?;

    let level = level_from_json(body.level.as_ref())?;

    // advisory only, so a hint of the wrong shape is simply dropped
    let hint = body
        .parameters
        .and_then(|raw| serde_json::from_value::<ClientHint>(raw).ok());
    if let Some(hint) = &hint {
        let params = parameters_for(level);
        if hint.disagrees_with(&params) {
            debug!(
                ?hint,
                ?params,
                "Ignoring client generation hint that differs from server parameters"
            );
        }
    }

    let request = SimplificationRequest {
        text: text_from_json(body.text)?,
        level,
    };

    let result = state.simplifier.simplify(&request).await?;

    Ok(Json(SimplifyResponse {
        simplified: result.simplified,
        token_count: result.source_word_count,
        char_count: result.source_char_count,
    }))
}

/// GET /api/levels/:level
///
/// Exposes the level bands so display code never re-derives them.
pub async fn handle_level_preview(
    Path(raw): Path<String>,
) -> Result<Json<LevelPreviewResponse>, AppError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Level '{raw}' is not a whole number.")))?;
    let level = Level::try_from(value)?;

    Ok(Json(LevelPreviewResponse {
        level,
        parameters: parameters_for(level),
    }))
}

/// POST /api/stats
pub async fn handle_stats(
    payload: Result<Json<StatsRequest>, JsonRejection>,
) -> Result<Json<TextStats>, AppError> {
    let Json(request) = payload.map_err(|e| {
        AppError::InvalidInput(format!("Request body must be JSON with a text field: {e}"))
    })?;
    Ok(Json(text_stats(&request.text)))
}
