// Text simplification pipeline.
// Level mapping, prompt construction, one upstream call, response cleanup.
// All LLM calls go through llm_client — no direct provider calls here.

pub mod handlers;
pub mod levels;
pub mod prompts;
pub mod service;
pub mod stats;
