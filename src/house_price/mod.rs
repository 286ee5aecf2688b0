//! Business rules for the Kaggle house prices schema
//!
//! Quality codes are bucketed into ratings, rare categories are collapsed
//! into `"Others"` and single-valued-dominant columns become `Int8`
//! indicators.

mod processor;
mod rating;

pub use processor::{HousePriceProcessor, MAX_VALID_YEAR, MIN_VALID_YEAR, OTHERS};
pub use rating::{is_negative_rate, is_neutral_rate, is_positive_rate, Rating};

/// Rating predicates, grouped the way pipelines mix them in
pub struct HousePriceFeatureManager;

impl HousePriceFeatureManager {
    pub fn is_positive_rate(value: &str) -> bool {
        is_positive_rate(value)
    }

    pub fn is_neutral_rate(value: &str) -> bool {
        is_neutral_rate(value)
    }

    pub fn is_negative_rate(value: &str) -> bool {
        is_negative_rate(value)
    }

    pub fn rating(value: Option<&str>) -> Rating {
        Rating::classify(value)
    }
}
