//! Application plumbing shared by the command handlers.

mod context;
mod prompt;
mod resolver;

pub use context::{env_secret, AppContext};
pub use prompt::TerminalPrompter;
pub use resolver::{resolve_config_path, vault_relative};
