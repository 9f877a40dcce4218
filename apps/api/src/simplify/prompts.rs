// All LLM prompt text for the Simplify module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{NO_PREAMBLE_INSTRUCTION, PLAIN_PARAGRAPH_INSTRUCTION};
use crate::simplify::levels::StyleLabel;

/// Wraps the user's text so the model can tell payload from instruction.
pub const SOURCE_DELIMITER: &str = "\"\"\"";

/// Simplification prompt template.
/// Replace: {style}, {plain_paragraph}, {no_preamble}, {delimiter}, {text}
pub const SIMPLIFY_PROMPT_TEMPLATE: &str = r#"Please simplify the following text using {style} language for general readers.
{plain_paragraph}
Rewrite it the way a patient professor would re-explain it, defining a term when the reader needs it.
{no_preamble}

Text:
{delimiter}{text}{delimiter}

Simplified:"#;

/// Builds the instruction for one request. Deterministic in `(text, style)`.
///
/// `{text}` is substituted last so user text containing placeholder-looking
/// braces is never expanded.
pub fn build_simplify_prompt(text: &str, style: StyleLabel) -> String {
    SIMPLIFY_PROMPT_TEMPLATE
        .replace("{style}", style.as_prompt_word())
        .replace("{plain_paragraph}", PLAIN_PARAGRAPH_INSTRUCTION)
        .replace("{no_preamble}", NO_PREAMBLE_INSTRUCTION)
        .replace("{delimiter}", SOURCE_DELIMITER)
        .replace("{text}", text)
}
