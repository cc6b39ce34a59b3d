//! Provider specific [`ClientWrapper`](crate::client_wrapper::ClientWrapper) implementations.
//!
//! Groq exposes an OpenAI compatible chat completions endpoint, so the Groq client is a thin
//! layer over [`openai_compatible::OpenAICompatibleClient`].

pub mod common;

pub mod groq;
pub mod openai_compatible;
