/// Popularity scoring
///
/// Pure function of (like count, age). Score grows with likes and
/// decays with age; the gravity exponent is above 1 so old items decay
/// faster than they accumulate likes.
use crate::config::RankingConfig;

/// `likes / (age_hours + offset)^gravity`. Negative ages (clock skew)
/// are clamped to zero.
pub fn calculate_score(config: &RankingConfig, likes: i64, age_hours: f64) -> f64 {
    let age = age_hours.max(0.0);
    likes as f64 / (age + config.age_offset_hours).powf(config.gravity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RankingConfig {
        RankingConfig::default()
    }

    #[test]
    fn more_likes_never_lowers_score() {
        let cfg = config();
        for age in [0.0, 0.5, 1.0, 24.0, 720.0] {
            let mut prev = calculate_score(&cfg, 0, age);
            for likes in 1..200 {
                let score = calculate_score(&cfg, likes, age);
                assert!(
                    score >= prev,
                    "score dropped from {prev} to {score} at likes={likes} age={age}"
                );
                prev = score;
            }
        }
    }

    #[test]
    fn aging_never_raises_score() {
        let cfg = config();
        for likes in [0, 1, 10, 500] {
            let mut prev = calculate_score(&cfg, likes, 0.0);
            for age in 1..1000 {
                let score = calculate_score(&cfg, likes, age as f64);
                assert!(
                    score <= prev,
                    "score rose from {prev} to {score} at likes={likes} age={age}"
                );
                prev = score;
            }
        }
    }

    #[test]
    fn fresh_item_outranks_old_item_with_equal_likes() {
        let cfg = config();
        let fresh = calculate_score(&cfg, 10, 1.0);
        let old = calculate_score(&cfg, 10, 100.0);
        assert!(fresh > old);
    }

    #[test]
    fn zero_likes_scores_zero() {
        let cfg = config();
        assert_eq!(calculate_score(&cfg, 0, 0.0), 0.0);
        assert_eq!(calculate_score(&cfg, 0, 48.0), 0.0);
    }

    #[test]
    fn brand_new_item_score_is_finite() {
        let cfg = config();
        let score = calculate_score(&cfg, 1000, 0.0);
        assert!(score.is_finite());
        assert!(score > 0.0);
    }

    #[test]
    fn negative_age_is_clamped() {
        let cfg = config();
        assert_eq!(
            calculate_score(&cfg, 5, -3.0),
            calculate_score(&cfg, 5, 0.0)
        );
    }
}
