//! Quality rating buckets shared by the `*Qual`, `*Cond`, `BsmtFinType*`
//! and `Fence` style columns

use serde::{Deserialize, Serialize};
use std::fmt;

const POSITIVE_CODES: [&str; 6] = ["Ex", "Gd", "GLQ", "Fin", "GdPrv", "GdWo"];
const NEUTRAL_CODES: [&str; 5] = ["TA", "Av", "ALQ", "Rec", "RFn"];
const NEGATIVE_CODES: [&str; 8] = ["Fa", "Po", "Mn", "BLQ", "LwQ", "Unf", "MnPrv", "MnWw"];

/// Bucket of a quality code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Positive,
    Neutral,
    Negative,
    /// Unknown code or missing value
    Others,
}

impl Rating {
    /// Bucket a raw code. `None` and unknown codes map to `Others`.
    pub fn classify(code: Option<&str>) -> Self {
        match code {
            Some(c) if is_positive_rate(c) => Rating::Positive,
            Some(c) if is_neutral_rate(c) => Rating::Neutral,
            Some(c) if is_negative_rate(c) => Rating::Negative,
            _ => Rating::Others,
        }
    }

    /// Label written into transformed columns
    pub fn label(&self) -> &'static str {
        match self {
            Rating::Positive => "positive",
            Rating::Neutral => "neutral",
            Rating::Negative => "negative",
            Rating::Others => "Others",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn is_positive_rate(value: &str) -> bool {
    POSITIVE_CODES.contains(&value)
}

pub fn is_neutral_rate(value: &str) -> bool {
    NEUTRAL_CODES.contains(&value)
}

pub fn is_negative_rate(value: &str) -> bool {
    NEGATIVE_CODES.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Rating::classify(Some("Ex")), Rating::Positive);
        assert_eq!(Rating::classify(Some("GdWo")), Rating::Positive);
        assert_eq!(Rating::classify(Some("TA")), Rating::Neutral);
        assert_eq!(Rating::classify(Some("RFn")), Rating::Neutral);
        assert_eq!(Rating::classify(Some("Po")), Rating::Negative);
        assert_eq!(Rating::classify(Some("MnWw")), Rating::Negative);
        assert_eq!(Rating::classify(Some("NA")), Rating::Others);
        assert_eq!(Rating::classify(None), Rating::Others);
    }

    #[test]
    fn test_buckets_are_disjoint() {
        for code in POSITIVE_CODES.iter().chain(NEUTRAL_CODES.iter()).chain(NEGATIVE_CODES.iter()) {
            let hits = [is_positive_rate(code), is_neutral_rate(code), is_negative_rate(code)]
                .iter()
                .filter(|&&b| b)
                .count();
            assert_eq!(hits, 1, "code {} in {} buckets", code, hits);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(Rating::Positive.to_string(), "positive");
        assert_eq!(Rating::Others.label(), "Others");
    }
}
