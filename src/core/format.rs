// Author: Dustin Pilgrim
// License: MIT

/// Renders accrued seconds as `1h 1m 5s`, `1m 30s`, `45s`; zero is `00s`.
pub fn format_duration(total_seconds: u64) -> String {
    if total_seconds == 0 {
        return "00s".to_string();
    }

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::format_duration;

    #[test]
    fn renders_known_values() {
        assert_eq!(format_duration(0), "00s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(3665), "1h 1m 5s");
    }

    #[test]
    fn keeps_inner_zero_components() {
        assert_eq!(format_duration(3600), "1h 0m 0s");
        assert_eq!(format_duration(60), "1m 0s");
    }
}
