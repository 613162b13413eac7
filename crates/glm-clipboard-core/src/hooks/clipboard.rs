//! Clipboard image hook for GLM models.
//!
//! GLM models cannot read inline image data, so pasted images arriving as
//! `data:image/...` URLs are written to the temp image store and the part is
//! replaced by a text part telling the model where the file is.

use super::ChatMessageHook;
use crate::config::ClipboardConfig;
use crate::data_url::parse_data_url;
use crate::parts::{ChatInput, ChatOutput, Part};
use crate::store::TempImageStore;
use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::try_join_all;
use std::path::Path;
use tracing::debug;

pub const HOOK_NAME: &str = "glm-clipboard";

/// Only models whose id starts with this are rewritten.
pub const GLM_MODEL_PREFIX: &str = "glm-";

/// Leading sentence of every image reference.
pub const IMAGE_REFERENCE_PREFIX: &str = "A pasted image is available at this local path:";

/// Text that replaces an inline image attachment.
pub fn image_reference_text(path: &Path) -> String {
    format!(
        "{} {}. Do not say image input is unsupported. \
         Use available image-analysis tools with this file path and answer the user request.",
        IMAGE_REFERENCE_PREFIX,
        path.display()
    )
}

pub struct ClipboardImageHook {
    store: TempImageStore,
}

impl ClipboardImageHook {
    pub fn new(config: &ClipboardConfig) -> Self {
        Self {
            store: TempImageStore::from_config(config),
        }
    }

    pub fn store(&self) -> &TempImageStore {
        &self.store
    }

    /// The replacement for `part`, or `None` to leave it as is.
    async fn rewrite_part(&self, part: &Part) -> Result<Option<Part>> {
        let Some(url) = part.url() else {
            return Ok(None);
        };
        if !url.starts_with("data:") {
            return Ok(None);
        }

        let Some(decoded) = parse_data_url(url)? else {
            return Ok(None);
        };
        if !decoded.is_image() {
            debug!(mime = %decoded.mime_type, "Leaving non-image data URL inline");
            return Ok(None);
        }

        let path = self
            .store
            .persist(&decoded.mime_type, &decoded.bytes)
            .await?;
        Ok(Some(
            part.clone().into_text_reference(image_reference_text(&path)),
        ))
    }
}

#[async_trait]
impl ChatMessageHook for ClipboardImageHook {
    fn name(&self) -> &str {
        HOOK_NAME
    }

    async fn on_chat_message(&self, input: &ChatInput, output: &mut ChatOutput) -> Result<()> {
        let model_id = output.resolved_model_id(input);
        if !model_id.starts_with(GLM_MODEL_PREFIX) {
            return Ok(());
        }
        debug!(model = model_id, parts = output.parts.len(), "Checking parts for pasted images");

        self.store.ensure_dir().await?;
        self.store.sweep().await;

        let replacements = try_join_all(output.parts.iter().map(|part| self.rewrite_part(part))).await?;

        let mut rewritten = 0;
        for (slot, replacement) in output.parts.iter_mut().zip(replacements) {
            if let Some(part) = replacement {
                *slot = part;
                rewritten += 1;
            }
        }
        if rewritten > 0 {
            debug!(rewritten, "Replaced pasted images with file references");
        }
        Ok(())
    }
}
