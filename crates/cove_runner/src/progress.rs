use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str =
    "{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.magenta/blue}] {pos}/{len} ({eta})";

/// Progress bar for one fan-out stage, or `None` when disabled or there is nothing to do.
pub(crate) fn stage_progress(label: &str, total: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total == 0 {
        return None;
    }

    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar.set_message(label.to_string());
    Some(bar)
}

pub(crate) fn tick(bar: &Option<ProgressBar>) {
    if let Some(progress_bar) = bar {
        progress_bar.inc(1);
    }
}

pub(crate) fn finish(bar: Option<ProgressBar>) {
    if let Some(progress_bar) = bar {
        progress_bar.finish_with_message("Completed");
    }
}
