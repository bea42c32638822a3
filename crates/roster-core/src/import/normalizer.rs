use chrono::NaiveDate;
use tracing::warn;

/// Parses a headcount cell. Blank is zero; anything unreadable is zero too,
/// with a warning, because partial spreadsheet rows are routine.
///
/// `1.200` is read as a thousands-grouped `1200`; `10.0` and `10,0` are read
/// as `10`. A fractional count such as `8.5` is unreadable.
pub(crate) fn parse_count(field: &'static str, row: usize, raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return 0;
    };

    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    let parsed = if is_thousands_grouped(&compact) {
        compact.replace('.', "").parse::<u32>().ok()
    } else {
        whole_number(&compact.replace(',', "."))
    };

    match parsed {
        Some(count) => count,
        None => {
            warn!(field, row, value = raw, "unreadable headcount; treating as zero");
            0
        }
    }
}

/// `1.200` or `12.345.678`: a leading group of one to three digits, then
/// dot-separated groups of exactly three.
fn is_thousands_grouped(value: &str) -> bool {
    let mut groups = value.split('.');
    let Some(lead) = groups.next() else {
        return false;
    };
    let all_digits = |group: &str| group.chars().all(|ch| ch.is_ascii_digit());

    let mut grouped = false;
    for group in groups {
        if group.len() != 3 || !all_digits(group) {
            return false;
        }
        grouped = true;
    }
    grouped && (1..=3).contains(&lead.len()) && all_digits(lead)
}

fn whole_number(value: &str) -> Option<u32> {
    if let Ok(count) = value.parse::<u32>() {
        return Some(count);
    }
    let number = value.parse::<f64>().ok()?;
    let in_range = number.is_finite() && number >= 0.0 && number <= f64::from(u32::MAX);
    (in_range && number.fract() == 0.0).then_some(number as u32)
}

/// Accepts `85`, `85%`, `85.5` and `85,5`.
pub(crate) fn parse_percentage(field: &'static str, row: usize, raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;
    let cleaned = raw.trim_end_matches('%').trim().replace(',', ".");

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!(field, row, value = raw, "unreadable percentage; ignoring");
            None
        }
    }
}

/// Accepts `YYYY-MM-DD`, `DD/MM/YYYY` and `MM/YYYY` (first of the month).
pub(crate) fn parse_movement_date(row: usize, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty())?;

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%d/%m/%Y") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("01/{raw}"), "%d/%m/%Y") {
        return Some(date);
    }

    warn!(row, value = raw, "unreadable projected movement date; leaving unscheduled");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_degrade_to_zero() {
        assert_eq!(parse_count("TMFT", 1, Some(" 12 ")), 12);
        assert_eq!(parse_count("TMFT", 1, Some("1.200")), 1200);
        assert_eq!(parse_count("TMFT", 1, Some("")), 0);
        assert_eq!(parse_count("TMFT", 1, None), 0);
        assert_eq!(parse_count("TMFT", 1, Some("n/d")), 0);
        assert_eq!(parse_count("TMFT", 1, Some("10.0")), 10);
        assert_eq!(parse_count("EXI", 1, Some("8,0")), 8);
        assert_eq!(parse_count("EXI", 1, Some("8.5")), 0);
        assert_eq!(parse_count("EXI", 1, Some("-3")), 0);
    }

    #[test]
    fn only_three_digit_groups_count_as_thousands() {
        assert!(is_thousands_grouped("1.200"));
        assert!(is_thousands_grouped("12.345.678"));
        assert!(!is_thousands_grouped("10.0"));
        assert!(!is_thousands_grouped("1200"));
        assert!(!is_thousands_grouped("1234.567"));
        assert!(!is_thousands_grouped("1.20"));
    }

    #[test]
    fn percentages_accept_common_spreadsheet_forms() {
        assert_eq!(parse_percentage("pct", 1, Some("85%")), Some(85.0));
        assert_eq!(parse_percentage("pct", 1, Some("85,5")), Some(85.5));
        assert_eq!(parse_percentage("pct", 1, Some(" ")), None);
        assert_eq!(parse_percentage("pct", 1, Some("abc")), None);
    }

    #[test]
    fn movement_dates_accept_iso_brazilian_and_month_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 7, 14).expect("valid date");
        assert_eq!(parse_movement_date(1, Some("2025-07-14")), Some(expected));
        assert_eq!(parse_movement_date(1, Some("14/07/2025")), Some(expected));
        assert_eq!(
            parse_movement_date(1, Some("07/2025")),
            NaiveDate::from_ymd_opt(2025, 7, 1)
        );
        assert_eq!(parse_movement_date(1, Some("soon")), None);
    }
}
