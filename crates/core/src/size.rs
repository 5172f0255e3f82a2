//! Human-readable byte sizes

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary scaling and one decimal place
///
/// The unit is the largest one that keeps the value below 1024; anything
/// from 1024 TB upwards is shown in PB.
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.1}{unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1}PB")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_boundaries() {
        assert_eq!(format_size(0), "0.0B");
        assert_eq!(format_size(1023), "1023.0B");
        assert_eq!(format_size(1024), "1.0KB");
        assert_eq!(format_size(1536), "1.5KB");
        assert_eq!(format_size(1_048_576), "1.0MB");
        assert_eq!(format_size(1_073_741_824), "1.0GB");
        assert_eq!(format_size(1_099_511_627_776), "1.0TB");
    }

    #[test]
    fn test_format_size_petabytes() {
        assert_eq!(format_size(1_125_899_906_842_624), "1.0PB");
        assert_eq!(format_size(1_125_899_906_842_624 * 2048), "2048.0PB");
    }
}
