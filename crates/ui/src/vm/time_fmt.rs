use chrono::{DateTime, Local, Utc};

/// "Saved at 14:03:27" in the viewer's local time zone.
#[must_use]
pub fn format_synced_at(value: DateTime<Utc>) -> String {
    format!("Saved at {}", value.with_timezone(&Local).format("%H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn clock_time_only() {
        let label = format_synced_at(fixed_now());
        assert!(label.starts_with("Saved at "));
        assert_eq!(label.len(), "Saved at 00:00:00".len());
    }
}
