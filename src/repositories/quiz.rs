//! QuizRepository - Quiz e domande di un'organizzazione
//!
//! Quiz e domande vengono sempre scritti insieme in una transazione, così un
//! quiz non resta mai con un insieme di domande parziale.

use super::{Delete, Read};
use crate::dtos::{CreateQuizDTO, NewQuestion, UpdateQuizDTO};
use crate::entities::{Question, Quiz};
use chrono::Utc;
use sqlx::types::Json;
use sqlx::{Error, Sqlite, SqlitePool, Transaction};
use std::collections::HashSet;

const QUIZ_COLUMNS: &str = "quiz_id, organization_id, title, description, frequency_days, created_at";
const QUESTION_COLUMNS: &str = "question_id, quiz_id, position, text, answers, correct_answer";

pub struct QuizRepository {
    connection_pool: SqlitePool,
}

async fn insert_question(
    tx: &mut Transaction<'_, Sqlite>,
    quiz_id: i64,
    question: &NewQuestion<'_>,
) -> Result<(), Error> {
    sqlx::query(
        r#"
        INSERT INTO questions (quiz_id, position, text, answers, correct_answer)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(quiz_id)
    .bind(question.position)
    .bind(question.text)
    .bind(Json(question.answers))
    .bind(Json(question.correct_answer))
    .execute(&mut **tx)
    .await?;
    Ok(())
}

impl QuizRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create_with_questions(&self, data: &CreateQuizDTO) -> Result<Quiz, Error> {
        let now = Utc::now();
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO quizzes (organization_id, title, description, frequency_days, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(data.organization)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.frequency_days)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let quiz_id = result.last_insert_rowid();

        for (position, question) in data.questions.iter().enumerate() {
            insert_question(&mut tx, quiz_id, &NewQuestion::from_dto(position, question)).await?;
        }

        tx.commit().await?;

        Ok(Quiz {
            quiz_id,
            organization_id: data.organization,
            title: data.title.clone(),
            description: data.description.clone(),
            frequency_days: data.frequency_days,
            created_at: now,
        })
    }

    /// Sostituisce i dati del quiz e riconcilia le domande per id:
    /// quelle con id vengono aggiornate, quelle senza inserite, le altre eliminate.
    ///
    /// Gli id devono appartenere al quiz (controllato dal service prima della chiamata).
    pub async fn update_with_questions(
        &self,
        quiz_id: i64,
        data: &UpdateQuizDTO,
    ) -> Result<Quiz, Error> {
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query(
            "UPDATE quizzes SET title = ?, description = ?, frequency_days = ? WHERE quiz_id = ?",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.frequency_days)
        .bind(quiz_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(Error::RowNotFound);
        }

        let kept: HashSet<i64> = data.questions.iter().filter_map(|q| q.id).collect();
        let existing: Vec<i64> =
            sqlx::query_scalar("SELECT question_id FROM questions WHERE quiz_id = ?")
                .bind(quiz_id)
                .fetch_all(&mut *tx)
                .await?;

        for stale in existing.iter().filter(|id| !kept.contains(id)) {
            sqlx::query("DELETE FROM questions WHERE question_id = ?")
                .bind(stale)
                .execute(&mut *tx)
                .await?;
        }

        for (position, question) in data.questions.iter().enumerate() {
            let new_question = NewQuestion::from_dto(position, question);
            match question.id {
                Some(question_id) => {
                    sqlx::query(
                        r#"
                        UPDATE questions
                        SET position = ?, text = ?, answers = ?, correct_answer = ?
                        WHERE question_id = ? AND quiz_id = ?
                        "#,
                    )
                    .bind(new_question.position)
                    .bind(new_question.text)
                    .bind(Json(new_question.answers))
                    .bind(Json(new_question.correct_answer))
                    .bind(question_id)
                    .bind(quiz_id)
                    .execute(&mut *tx)
                    .await?;
                }
                None => insert_question(&mut tx, quiz_id, &new_question).await?,
            }
        }

        tx.commit().await?;
        self.read(&quiz_id).await?.ok_or(Error::RowNotFound)
    }

    pub async fn questions(&self, quiz_id: i64) -> Result<Vec<Question>, Error> {
        sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = ? ORDER BY position, question_id"
        ))
        .bind(quiz_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn question_ids(&self, quiz_id: i64) -> Result<HashSet<i64>, Error> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT question_id FROM questions WHERE quiz_id = ?")
            .bind(quiz_id)
            .fetch_all(&self.connection_pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    /// Quiz di tutte le organizzazioni di cui l'utente è membro
    pub async fn list_for_member(&self, user_id: i64) -> Result<Vec<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(&format!(
            r#"
            SELECT {QUIZ_COLUMNS} FROM quizzes
            WHERE organization_id IN (SELECT organization_id FROM memberships WHERE user_id = ?)
            ORDER BY created_at DESC, quiz_id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn list_for_organization(&self, organization_id: i64) -> Result<Vec<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(&format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE organization_id = ? ORDER BY created_at DESC, quiz_id DESC"
        ))
        .bind(organization_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Quiz più vecchi della loro frequenza
    pub async fn list_due(&self) -> Result<Vec<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(&format!(
            r#"
            SELECT {QUIZ_COLUMNS} FROM quizzes
            WHERE datetime(created_at) <= datetime('now', '-' || frequency_days || ' days')
            ORDER BY quiz_id
            "#
        ))
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Membri dell'organizzazione del quiz senza un risultato più recente di `frequency_days`
    pub async fn members_due(&self, quiz: &Quiz) -> Result<Vec<i64>, Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT m.user_id FROM memberships m
            WHERE m.organization_id = ?
              AND NOT EXISTS (
                SELECT 1 FROM quiz_results r
                WHERE r.user_id = m.user_id
                  AND r.quiz_id = ?
                  AND datetime(r.created_at) > datetime('now', ?)
              )
            ORDER BY m.user_id
            "#,
        )
        .bind(quiz.organization_id)
        .bind(quiz.quiz_id)
        .bind(format!("-{} days", quiz.frequency_days))
        .fetch_all(&self.connection_pool)
        .await
    }
}

impl Read<Quiz, i64> for QuizRepository {
    async fn read(&self, id: &i64) -> Result<Option<Quiz>, Error> {
        sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE quiz_id = ?"))
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
    }
}

impl Delete<i64> for QuizRepository {
    async fn delete(&self, id: &i64) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM quizzes WHERE quiz_id = ?")
            .bind(id)
            .execute(&self.connection_pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RowNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::QuestionDTO;

    fn question(id: Option<i64>, text: &str) -> QuestionDTO {
        QuestionDTO {
            id,
            text: text.to_string(),
            answers: vec!["yes".to_string(), "no".to_string()],
            correct_answer: vec!["yes".to_string()],
        }
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "organizations", "quizzes")))]
    async fn questions_keep_their_json_answers(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = QuizRepository::new(pool);
        let questions = repo.questions(1).await?;

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].answers, vec!["3", "4", "5"]);
        assert_eq!(questions[0].correct_answer, vec!["4"]);
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "organizations", "quizzes")))]
    async fn update_reconciles_questions_by_id(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = QuizRepository::new(pool);
        let update = UpdateQuizDTO {
            title: "Arithmetic v2".to_string(),
            description: String::new(),
            frequency_days: 7,
            // keep question 1, drop question 2, add a new one
            questions: vec![question(Some(1), "Renamed"), question(None, "Brand new")],
        };

        let quiz = repo.update_with_questions(1, &update).await?;
        assert_eq!(quiz.title, "Arithmetic v2");
        assert_eq!(quiz.frequency_days, 7);

        let questions = repo.questions(1).await?;
        let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["Renamed", "Brand new"]);
        assert_eq!(questions[0].question_id, 1);
        assert!(!repo.question_ids(1).await?.contains(&2));
        Ok(())
    }
}
