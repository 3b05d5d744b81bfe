//! External answer providers for PulseBot.
//!
//! The resolution pipeline delegates unmatched questions to an
//! [`AnswerProvider`]. The only shipping adapter targets OpenAI-compatible
//! chat-completions endpoints (OpenAI, Azure-style proxies, Ollama, vLLM).
//! Provider failures are domain errors that the pipeline converts into a
//! fallthrough; nothing here ever reaches a chat caller directly.

pub mod openai_compat;
pub mod traits;

pub use openai_compat::OpenAiCompatProvider;
pub use traits::AnswerProvider;
