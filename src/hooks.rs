//! Declarative hooks: event filters bound to typed actions.

pub mod config;
pub mod engine;
pub mod filter;

pub use config::{Hook, HookAction, HookFilter, parse_hooks_config};
pub use engine::{HookRegistry, dispatch_hooks};
