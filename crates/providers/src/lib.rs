//! Model provider implementations for burrow.

pub mod gemini;

pub use gemini::GeminiProvider;
