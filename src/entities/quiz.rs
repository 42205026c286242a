//! Quiz e Question entities, con la logica di correzione delle risposte

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Quiz {
    pub quiz_id: i64,
    pub organization_id: i64,
    pub title: String,
    pub description: String,
    pub frequency_days: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Question {
    pub question_id: i64,
    pub quiz_id: i64,
    pub position: i64,
    pub text: String,
    #[sqlx(json)]
    pub answers: Vec<String>,
    #[sqlx(json)]
    pub correct_answer: Vec<String>,
}

impl Question {
    /// Exact set equality: order and repeated entries do not matter.
    pub fn is_answered_correctly(&self, submitted: &[String]) -> bool {
        let expected: BTreeSet<&str> = self.correct_answer.iter().map(String::as_str).collect();
        let given: BTreeSet<&str> = submitted.iter().map(String::as_str).collect();
        expected == given
    }
}

/// Counts the questions answered correctly.
///
/// `submitted` pairs a question id with the chosen options. Ids that do not
/// belong to `questions` are ignored, unanswered questions count as wrong and
/// when the same id appears twice the last entry wins.
pub fn count_correct<'a, I>(questions: &[Question], submitted: I) -> i64
where
    I: IntoIterator<Item = (i64, &'a [String])>,
{
    let by_question: HashMap<i64, &[String]> = submitted.into_iter().collect();

    questions
        .iter()
        .filter(|question| {
            by_question
                .get(&question.question_id)
                .is_some_and(|answer| question.is_answered_correctly(answer))
        })
        .count() as i64
}
