//! Shared CSV cell helpers.

use crate::DatasetError;

/// Finds `column` in a header row.
///
/// Header names are compared after trimming surrounding whitespace.
pub(crate) fn column_index(
    headers: &csv::StringRecord,
    column: &str,
    file: &str,
) -> Result<usize, DatasetError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| DatasetError::MissingColumn {
            file: file.to_string(),
            column: column.to_string(),
        })
}

/// Parses a non-negative count. Accepts integers and whole floats (pandas
/// writes `12.0` for integer columns that once held a NaN). Blank cells
/// count as zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Some(v);
    }

    let v = raw.parse::<f64>().ok()?;
    if v.is_finite() && v >= 0.0 && v.fract().abs() < f64::EPSILON {
        Some(v as u64)
    } else {
        None
    }
}

/// Reads and parses a count cell, mapping failure to
/// [`DatasetError::InvalidValue`].
pub(crate) fn count_cell(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    file: &str,
    row: u64,
) -> Result<u64, DatasetError> {
    let raw = record.get(idx).unwrap_or("");
    parse_count(raw).ok_or_else(|| invalid(file, row, column, raw))
}

pub(crate) fn invalid(file: &str, row: u64, column: &str, value: &str) -> DatasetError {
    DatasetError::InvalidValue {
        file: file.to_string(),
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_counts() {
        assert_eq!(parse_count("12"), Some(12));
        assert_eq!(parse_count(" 12 "), Some(12));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count(""), Some(0));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count("abc"), None);
    }

    #[test]
    fn finds_trimmed_headers() {
        let headers = csv::StringRecord::from(vec!["GEOID", " Total population "]);
        assert_eq!(column_index(&headers, "Total population", "t.csv").unwrap(), 1);
        assert!(matches!(
            column_index(&headers, "White", "t.csv"),
            Err(DatasetError::MissingColumn { column, .. }) if column == "White"
        ));
    }
}
