use chrono::{DateTime, Local};

/// Format a price for display, e.g. `¥12.50`
pub fn format_price(value: f64) -> String {
    format!("¥{:.2}", value)
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Describe when data was last fetched, relative to `now`
pub fn format_refreshed(at: Option<DateTime<Local>>, now: DateTime<Local>) -> String {
    let Some(at) = at else {
        return "never".to_string();
    };
    let secs = (now - at).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        _ => at.format("%H:%M").to_string(),
    }
}
