//! Clock formatting for the view layer.

/// Format whole seconds as a zero-padded `MM:SS` clock. Durations of an
/// hour or more overflow into the minutes field.
pub fn format_clock(total_secs: u64) -> String {
    let minutes = total_secs / 60;
    let seconds = total_secs % 60;
    format!("{minutes:02}:{seconds:02}")
}
