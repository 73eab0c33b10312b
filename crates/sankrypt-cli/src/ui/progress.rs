//! Progress bar for re-encrypting a vault.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::context::UiContext;

/// Wraps an indicatif bar; hidden when animation is not allowed.
pub struct ReencryptProgress {
    bar: ProgressBar,
}

impl ReencryptProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let bar = if ctx.allows_animation() {
            ProgressBar::new(total as u64)
        } else {
            ProgressBar::hidden()
        };
        let template = if ctx.unicode {
            "{spinner} [{bar:30}] {pos}/{len} {msg}"
        } else {
            "[{bar:30}] {pos}/{len} {msg}"
        };
        if let Ok(style) = ProgressStyle::with_template(template) {
            bar.set_style(style.progress_chars("=> "));
        }
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Called before artifact `index` (0-based) of `total`.
    pub fn on_artifact(&self, index: usize, total: usize, path: &Path) {
        self.bar.set_length(total as u64);
        self.bar.set_position(index as u64);
        self.bar.set_message(path.display().to_string());
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
