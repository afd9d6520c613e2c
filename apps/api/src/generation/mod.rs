// Multi-pass resume reconciliation: role extraction, initial draft, gap reconciliation.
// All LLM calls go through llm_client; nothing here talks to a provider directly.

pub mod allocation;
pub mod drafter;
pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod reconciler;
pub mod roles;
pub mod settings;

#[cfg(test)]
pub mod fixtures;
