/// Format milliseconds as `m:ss`
pub fn format_time(millis: u64) -> String {
    let minutes = millis / 60_000;
    let seconds = (millis % 60_000) / 1000;
    format!("{}:{:02}", minutes, seconds)
}

/// Fixed-width text progress bar for `progress` in `0.0..=1.0`
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}
