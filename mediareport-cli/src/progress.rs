// ============================================================================
// mediareport-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Batch export progress bar
//
// One tick per exported source. indicatif hides the bar on its own when
// stderr is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

static EXPORT_STYLE: Lazy<ProgressStyle> = Lazy::new(|| {
    ProgressStyle::with_template("{spinner} Exporting [{bar:30}] {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>.")
});

/// Progress bar over the sources of an export run. Hidden for a single
/// source, where there is nothing to track.
pub fn export_progress(sources: usize) -> ProgressBar {
    if sources < 2 {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(sources as u64);
    bar.set_style(EXPORT_STYLE.clone());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_tick_per_source() {
        let bar = export_progress(3);
        assert_eq!(bar.length(), Some(3));
        bar.inc(1);
        assert_eq!(bar.position(), 1);
        assert!(export_progress(1).is_hidden());
    }
}
