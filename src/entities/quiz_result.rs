//! QuizResult entity - Esito immutabile di una sessione completata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct QuizResult {
    pub result_id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub elapsed_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn score(&self) -> f64 {
        percentage(self.correct_answers, self.total_questions)
    }
}

/// correct / total * 100, rounded to two decimals; 0 when there is nothing to divide by
pub fn percentage(correct: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = correct as f64 / total as f64 * 100.0;
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::percentage;

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(5, 5), 100.0);
    }

    #[test]
    fn percentage_without_questions_is_zero() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
    }
}
