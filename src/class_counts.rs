use crate::error::SubmissionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCount {
    pub class_name: String,
    pub count: u64,
}

/// Parses `"6a: 20, 7b: 15"`; malformed segments are skipped.
pub fn parse(encoded: &str) -> Vec<ClassCount> {
    encoded
        .split(',')
        .filter_map(|segment| {
            let Some((class_name, count)) = segment.split_once(':') else {
                tracing::debug!(segment, "skipping class count without a colon");
                return None;
            };
            let class_name = class_name.trim();
            let count = count.trim();
            if class_name.is_empty() || count.is_empty() {
                tracing::debug!(segment, "skipping incomplete class count");
                return None;
            }
            Some(ClassCount {
                class_name: class_name.to_string(),
                count: digits_to_count(count),
            })
        })
        .collect()
}

// Saturates at u64::MAX rather than wrapping or resetting to 0.
fn digits_to_count(raw: &str) -> u64 {
    raw.chars()
        .filter_map(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}

pub fn encode(counts: &[ClassCount]) -> String {
    counts
        .iter()
        .map(|c| format!("{}: {}", c.class_name, c.count))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn parse_assignment(raw: &str) -> Result<ClassCount, SubmissionError> {
    let (class_name, count) = raw
        .split_once('=')
        .ok_or_else(|| SubmissionError::InvalidClassCount(raw.to_string()))?;
    let class_name = class_name.trim();
    let count = count
        .trim()
        .parse::<u64>()
        .map_err(|_| SubmissionError::InvalidClassCount(raw.to_string()))?;
    if class_name.is_empty() {
        return Err(SubmissionError::InvalidClassCount(raw.to_string()));
    }
    Ok(ClassCount {
        class_name: class_name.to_string(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(encoded: &str) -> Vec<(String, u64)> {
        parse(encoded)
            .into_iter()
            .map(|c| (c.class_name, c.count))
            .collect()
    }

    #[test]
    fn parses_well_formed_pairs() {
        assert_eq!(
            pairs("6a: 20, 7b: 15"),
            vec![("6a".to_string(), 20), ("7b".to_string(), 15)]
        );
    }

    #[test]
    fn non_numeric_count_defaults_to_zero() {
        assert_eq!(pairs("6a:abc"), vec![("6a".to_string(), 0)]);
    }

    #[test]
    fn strips_non_digits_from_counts() {
        assert_eq!(pairs("8c: ~12 students"), vec![("8c".to_string(), 12)]);
    }

    #[test]
    fn oversized_counts_saturate() {
        assert_eq!(
            pairs("6a: 99999999999999999999999"),
            vec![("6a".to_string(), u64::MAX)]
        );
    }

    #[test]
    fn garbage_segments_are_skipped() {
        assert!(pairs("garbage").is_empty());
        assert!(pairs("").is_empty());
        assert_eq!(
            pairs("6a: 20, : 4, 7b:, 9d: 3"),
            vec![("6a".to_string(), 20), ("9d".to_string(), 3)]
        );
    }

    #[test]
    fn splits_on_first_colon_only() {
        assert_eq!(pairs("Lab:1: 7"), vec![("Lab".to_string(), 17)]);
    }

    #[test]
    fn encode_matches_wire_format() {
        let counts = vec![
            parse_assignment("6a=20").unwrap(),
            parse_assignment(" 7b = 15 ").unwrap(),
        ];
        assert_eq!(encode(&counts), "6a: 20, 7b: 15");
        assert_eq!(parse(&encode(&counts)), counts);
    }

    #[test]
    fn rejects_bad_assignments() {
        assert!(parse_assignment("6a").is_err());
        assert!(parse_assignment("=4").is_err());
        assert!(parse_assignment("6a=many").is_err());
    }
}
