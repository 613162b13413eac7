pub mod config;
pub mod data_url;
pub mod hooks;
pub mod installer;
pub mod logging;
pub mod mime;
pub mod parts;
pub mod store;

// Re-export the hook surface at crate root for convenience
pub use config::ClipboardConfig;
pub use hooks::clipboard::ClipboardImageHook;
pub use hooks::{ChatMessageHook, HookRegistry};
pub use parts::{ChatInput, ChatOutput, Part};
