// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting fragments about output shape.

/// Forces a single unformatted paragraph.
pub const PLAIN_PARAGRAPH_INSTRUCTION: &str = "Only return a single paragraph. \
    Avoid markdown, bullet points, and titles.";

/// Stops the model from opening with conversational filler.
pub const NO_PREAMBLE_INSTRUCTION: &str = "Do not start with phrases like \"Sure,\" \
    \"Here is,\" or \"Okay.\" Only return the output itself.";
