pub const UNKNOWN_LABEL: &str = "Unknown";

const LABELS: [&str; 4] = [
    "Low Congestion",
    "Moderate Congestion",
    "High Congestion",
    "Accident Prone",
];

/// Display name for a class index. Indices outside the table resolve to `"Unknown"`.
pub fn resolve(index: i64) -> &'static str {
    usize::try_from(index)
        .ok()
        .and_then(|i| LABELS.get(i))
        .copied()
        .unwrap_or(UNKNOWN_LABEL)
}

pub fn is_known(index: i64) -> bool {
    resolve(index) != UNKNOWN_LABEL
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_fixed() {
        assert_eq!(resolve(0), "Low Congestion");
        assert_eq!(resolve(1), "Moderate Congestion");
        assert_eq!(resolve(2), "High Congestion");
        assert_eq!(resolve(3), "Accident Prone");
    }

    #[test]
    fn out_of_table_is_unknown() {
        for i in [-1, 4, 42, i64::MIN, i64::MAX] {
            assert_eq!(resolve(i), "Unknown");
            assert!(!is_known(i));
        }
    }
}
