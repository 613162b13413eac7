//! Chat Message Hook System
//!
//! The host hands every outbound chat message to the registered hooks before
//! it reaches the model provider. Hooks may rewrite the message's parts in
//! place; the host keeps its reference to the same [`ChatOutput`].

pub mod clipboard;

use crate::parts::{ChatInput, ChatOutput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// A hook invoked once per outbound chat message.
#[async_trait]
pub trait ChatMessageHook: Send + Sync {
    /// Hook name for logging/debugging
    fn name(&self) -> &str;

    /// Inspect `input` and rewrite `output` in place.
    async fn on_chat_message(&self, input: &ChatInput, output: &mut ChatOutput) -> Result<()>;
}

/// Hook registry that manages and invokes hooks
pub struct HookRegistry {
    hooks: Vec<Arc<dyn ChatMessageHook>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self { hooks: Vec::new() }
    }

    /// Register a new hook
    pub fn register(&mut self, hook: Arc<dyn ChatMessageHook>) {
        self.hooks.push(hook);
    }

    /// Run every hook in registration order.
    ///
    /// The first failure stops the chain and is returned to the host.
    pub async fn invoke(&self, input: &ChatInput, output: &mut ChatOutput) -> Result<()> {
        for hook in &self.hooks {
            hook.on_chat_message(input, output)
                .await
                .with_context(|| format!("Hook '{}' failed", hook.name()))?;
        }
        Ok(())
    }

    /// Get number of registered hooks
    pub fn count(&self) -> usize {
        self.hooks.len()
    }

    /// Get all registered hook names
    pub fn hook_names(&self) -> Vec<String> {
        self.hooks.iter().map(|h| h.name().to_string()).collect()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
