//! Block id generation.

use std::time::{SystemTime, UNIX_EPOCH};

/// Generate a fresh block id of the form `YYYYMMDDhhmmss-xxxxxxx`.
///
/// The timestamp is UTC; the suffix is the first seven hex digits of a
/// random UUID.
#[must_use]
pub fn new_node_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", timestamp(secs), &suffix[..7])
}

/// Format seconds since the Unix epoch as `YYYYMMDDhhmmss`.
fn timestamp(secs: u64) -> String {
    let days = i64::try_from(secs / 86_400).unwrap_or_default();
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{year:04}{month:02}{day:02}{:02}{:02}{:02}",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Convert days since 1970-01-01 to a proleptic Gregorian date.
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (
        year,
        u32::try_from(month).unwrap_or(1),
        u32::try_from(day).unwrap_or(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_epoch() {
        assert_eq!(timestamp(0), "19700101000000");
    }

    #[test]
    fn test_timestamp_known_date() {
        // 2021-03-04 05:06:07 UTC
        assert_eq!(timestamp(1_614_834_367), "20210304050607");
    }

    #[test]
    fn test_leap_day() {
        // 2020-02-29 00:00:00 UTC
        assert_eq!(timestamp(1_582_934_400), "20200229000000");
    }

    #[test]
    fn test_new_node_id_shape() {
        let id = new_node_id();
        let (ts, suffix) = id.split_once('-').unwrap();
        assert_eq!(ts.len(), 14);
        assert_eq!(suffix.len(), 7);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert_ne!(id, new_node_id());
    }
}
