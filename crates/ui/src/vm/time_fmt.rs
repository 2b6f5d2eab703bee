/// `m:ss`, e.g. `4:05`. Minutes are not capped at 59.
#[must_use]
pub fn format_clock(seconds: u32) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    format!("{minutes}:{remainder:02}")
}

/// Human phrasing for time spent on an attempt.
#[must_use]
pub fn format_time_spent(seconds: u32) -> String {
    match seconds {
        0 => "under a second".to_string(),
        1..=59 => format!("{seconds}s"),
        _ => {
            let minutes = seconds / 60;
            let remainder = seconds % 60;
            if remainder == 0 {
                format!("{minutes}m")
            } else {
                format!("{minutes}m {remainder}s")
            }
        }
    }
}
