use super::types::RatingValue;

/// Logistic expectation of `rating` against `opponent`.
pub fn expected_result(rating: RatingValue, opponent: RatingValue) -> f64 {
    1.0 / (1.0 + 10f64.powf((opponent - rating) / 400.0))
}

pub fn rating_change(k_factor: f64, actual: f64, expected: f64) -> RatingValue {
    k_factor * (actual - expected)
}
