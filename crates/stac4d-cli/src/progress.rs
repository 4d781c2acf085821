use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Create a progress bar for determinate progress
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg}\n[{bar:40.cyan/blue}] {pos}/{len} ({percent}%) ETA: {eta}")
    {
        pb.set_style(style.progress_chars("█▓▒░ "));
    }
    pb.set_message(message.to_string());
    pb
}

/// Progress for a batch of files; hidden in JSON mode
pub struct IngestProgressBar {
    bar: ProgressBar,
}

impl IngestProgressBar {
    pub fn new(total: usize, visible: bool) -> Self {
        let bar = if visible {
            create_progress_bar(total as u64, "Ingesting point clouds")
        } else {
            ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::hidden())
        };
        Self { bar }
    }

    pub fn update(&self, current: usize, file_name: &str) {
        self.bar.set_message(format!("Ingesting {}", file_name));
        self.bar.set_position(current.saturating_sub(1) as u64);
    }

    pub fn finish(&self, succeeded: usize, failed: usize) {
        self.bar.set_position(self.bar.length().unwrap_or(0));
        if failed == 0 {
            self.bar.finish_with_message(format!("✓ Ingested {} files", succeeded));
        } else {
            self.bar.finish_with_message(format!("✗ Ingested {} files, {} failed", succeeded, failed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_bar_tracks_position() {
        let progress = IngestProgressBar::new(3, false);
        progress.update(2, "b.las");
        assert_eq!(progress.bar.position(), 1);
        progress.finish(3, 0);
        assert_eq!(progress.bar.position(), 3);
    }
}
