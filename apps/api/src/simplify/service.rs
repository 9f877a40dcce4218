//! Simplification service — validate, prompt, call the model, clean up the answer.
//!
//! Stateless: every call builds its own request, parameters and prompt.
//! Validation failures return before any network traffic.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::{AppError, EMPTY_UPSTREAM_MESSAGE};
use crate::llm_client::{CompletionProvider, CompletionRequest};
use crate::simplify::levels::{parameters_for, Level};
use crate::simplify::prompts::build_simplify_prompt;
use crate::simplify::stats::{char_count, word_count};

/// Maximum raw character length of submitted text.
pub const MAX_CHARS: usize = 1500;
/// Minimum number of whitespace-separated words.
pub const MIN_WORDS: usize = 5;

/// Leading words some models echo back from the instruction.
const ECHOED_VERBS: &[&str] = &["Summarize", "Simplify"];

#[derive(Debug, Clone)]
pub struct SimplificationRequest {
    pub text: String,
    pub level: Level,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Simplification {
    pub simplified: String,
    pub source_word_count: usize,
    pub source_char_count: usize,
}

pub struct SimplificationService {
    provider: Arc<dyn CompletionProvider>,
}

impl SimplificationService {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Runs the full pipeline for one request. Exactly one upstream attempt.
    pub async fn simplify(
        &self,
        request: &SimplificationRequest,
    ) -> Result<Simplification, AppError> {
        validate_text(&request.text)?;

        let params = parameters_for(request.level);
        let span = info_span!(
            "simplify",
            request_id = %Uuid::new_v4(),
            level = request.level.value(),
            style = %params.style,
        );

        async move {
            let prompt = build_simplify_prompt(&request.text, params.style);
            debug!(
                max_tokens = params.max_output_tokens,
                temperature = params.temperature,
                "Dispatching simplification"
            );

            let completion = self
                .provider
                .complete(&CompletionRequest {
                    prompt: &prompt,
                    max_tokens: params.max_output_tokens,
                    temperature: params.temperature,
                })
                .await?;

            let simplified = sanitize_completion(&completion)
                .ok_or_else(|| AppError::UpstreamRejected(EMPTY_UPSTREAM_MESSAGE.to_string()))?;

            info!(output_chars = char_count(&simplified), "Simplification complete");

            Ok::<_, AppError>(Simplification {
                simplified,
                source_word_count: word_count(&request.text),
                source_char_count: char_count(&request.text),
            })
        }
        .instrument(span)
        .await
    }
}

/// Acceptance checks, first failure wins: empty, too long, too short.
pub fn validate_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::InvalidInput("Please enter text to simplify.".to_string()));
    }
    let chars = char_count(text);
    if chars > MAX_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Text is too long ({chars} characters): the limit is {MAX_CHARS}."
        )));
    }
    let words = word_count(text);
    if words < MIN_WORDS {
        return Err(AppError::InvalidInput(format!(
            "Text is too short ({words} words): please enter at least {MIN_WORDS} words."
        )));
    }
    Ok(())
}

/// Trims the completion and drops one leading echoed instruction verb.
/// Returns `None` when nothing is left.
pub fn sanitize_completion(raw: &str) -> Option<String> {
    let cleaned = strip_echoed_verb(raw.trim()).trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

/// The verb must be a whole token: `Simplify:`, `simplify rest` or just `Simplify`.
/// `Simplifying ...` is left alone.
fn strip_echoed_verb(text: &str) -> &str {
    for verb in ECHOED_VERBS {
        let Some(head) = text.get(..verb.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(verb) {
            continue;
        }
        let rest = &text[verb.len()..];
        match rest.chars().next() {
            None => return rest,
            Some(':') => return &rest[1..],
            Some(c) if c.is_whitespace() => return rest,
            Some(_) => {}
        }
    }
    text
}
