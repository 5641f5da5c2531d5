// lakehouse-core/src/domain/silver/parse.rs
//
// Column-level coercions applied by the Silver rules.

use chrono::NaiveDate;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Trimmed text, `None` when blank.
pub fn clean_text(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Trimmed, upper-cased code (country codes, ISO identifiers).
pub fn clean_code(raw: Option<&str>) -> Option<String> {
    clean_text(raw).map(|s| s.to_uppercase())
}

/// Calendar date; datetimes keep their date part. Unparseable values become `None`.
pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    // "2021-06-01 00:00:00" / "2021-06-01T00:00:00Z"
    let date_part = value
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(value);

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Finite number. A lone `,` is read as the decimal separator.
pub fn parse_number(raw: Option<&str>) -> Option<f64> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    let normalized = if value.contains(',') && !value.contains('.') && value.matches(',').count() == 1
    {
        value.replace(',', ".")
    } else {
        value.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Elapsed days between two dates; `None` if either is missing or the range is inverted.
pub fn duration_days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    let days = (end? - start?).num_days();
    (days >= 0).then_some(days)
}

/// `project/101000001` → `101000001`
pub fn trailing_segment(raw: Option<&str>) -> Option<String> {
    let value = clean_text(raw)?;
    let segment = value.rsplit('/').find(|s| !s.is_empty())?;
    Some(segment.to_string())
}
