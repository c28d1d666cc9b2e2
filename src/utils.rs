//! Utility functions and helpers

use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize logging based on configuration
///
/// `level` accepts any `EnvFilter` directive; an unparsable directive falls
/// back to `info`. `format` is `json` or anything else for plain text.
pub fn init_logging(level: &str, format: &str) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
    }
}

/// Format bytes as a human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}

/// Format hash rate as a human-readable string
pub fn format_hash_rate(hashes_per_sec: f64) -> String {
    const UNITS: &[&str] = &["H/s", "KH/s", "MH/s", "GH/s"];
    let mut rate = hashes_per_sec;
    let mut unit_index = 0;

    while rate >= 1000.0 && unit_index < UNITS.len() - 1 {
        rate /= 1000.0;
        unit_index += 1;
    }

    format!("{:.2} {}", rate, UNITS[unit_index])
}

/// Format an elapsed time at millisecond precision
pub fn format_duration(elapsed: Duration) -> String {
    let millis = Duration::from_millis(elapsed.as_millis() as u64);
    humantime::format_duration(millis).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(16_776_896), "16.00 MiB");
        assert_eq!(format_bytes(1 << 30), "1.00 GiB");
    }

    #[test]
    fn test_format_hash_rate() {
        assert_eq!(format_hash_rate(500.0), "500.00 H/s");
        assert_eq!(format_hash_rate(1_500.0), "1.50 KH/s");
        assert_eq!(format_hash_rate(2_500_000.0), "2.50 MH/s");
        assert_eq!(format_hash_rate(0.0), "0.00 H/s");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_micros(1_500_700)), "1s 500ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }
}
