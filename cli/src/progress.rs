use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Returns a progress bar for the road distance matrix rows.
///
/// Draws to stderr, so it disappears when stderr is not a terminal.
pub fn row_bar(prefix: String) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    pb.set_prefix(prefix);
    pb.set_style(
        ProgressStyle::with_template("{prefix}...\n[{wide_bar:.cyan/blue}] {pos}/{len} rows")
            .expect("incorrect progress bar format string")
            .progress_chars("#>-"),
    );
    pb
}
