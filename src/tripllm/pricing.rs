//! Price metadata attached to the model configuration.
//!
//! Prices are expressed in USD per 1 000 tokens, split between prompt and completion, the same
//! `[prompt, completion]` pair hosted-model configurations usually carry.

use crate::client_wrapper::TokenUsage;

/// USD per 1 000 prompt / completion tokens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelPrice {
    pub prompt_per_1k: f64,
    pub completion_per_1k: f64,
}

impl ModelPrice {
    pub fn new(prompt_per_1k: f64, completion_per_1k: f64) -> Self {
        ModelPrice {
            prompt_per_1k,
            completion_per_1k,
        }
    }

    /// Cost in USD of the given usage.
    pub fn cost(&self, usage: &TokenUsage) -> f64 {
        (usage.input_tokens as f64 * self.prompt_per_1k
            + usage.output_tokens as f64 * self.completion_per_1k)
            / 1000.0
    }
}

impl Default for ModelPrice {
    /// `[0.2, 0.2]`, the figure configured for `llama3-8b-8192`.
    fn default() -> Self {
        ModelPrice::new(0.2, 0.2)
    }
}
