//! Command handlers. Each takes the [`AppContext`](crate::app::AppContext)
//! and its parsed arguments.

mod check;
mod files;
mod init;
mod list;
mod misc;
mod password;
mod shell;

pub use check::handle_check;
pub use files::{handle_decrypt, handle_encrypt};
pub use init::handle_init;
pub use list::handle_list;
pub use misc::handle_completions;
pub use password::{handle_change_password, handle_strength};
pub use shell::handle_shell;
