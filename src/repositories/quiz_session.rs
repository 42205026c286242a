//! QuizSessionRepository - Sessioni di quiz e loro chiusura

use super::Read;
use crate::entities::{QuizResult, QuizSession, SessionStatus};
use chrono::Utc;
use sqlx::{Error, SqlitePool};

const SESSION_COLUMNS: &str = "session_id, user_id, quiz_id, status, started_at, finished_at";

pub struct QuizSessionRepository {
    connection_pool: SqlitePool,
}

impl QuizSessionRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn find_started(&self, user_id: i64, quiz_id: i64) -> Result<Option<QuizSession>, Error> {
        sqlx::query_as::<_, QuizSession>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM quiz_sessions
            WHERE user_id = ? AND quiz_id = ? AND status = 'started'
            ORDER BY session_id DESC
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    pub async fn start(&self, user_id: i64, quiz_id: i64) -> Result<QuizSession, Error> {
        let now = Utc::now();
        let status = SessionStatus::Started;
        let result = sqlx::query(
            "INSERT INTO quiz_sessions (user_id, quiz_id, status, started_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(quiz_id)
        .bind(status)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(QuizSession {
            session_id: result.last_insert_rowid(),
            user_id,
            quiz_id,
            status,
            started_at: now,
            finished_at: None,
        })
    }

    /// Chiude la sessione e salva il risultato in un'unica transazione.
    ///
    /// Il passaggio di stato è condizionato a `status = 'started'`: di due chiamate
    /// concorrenti solo una scrive il risultato, l'altra riceve `Ok(None)`.
    pub async fn complete(
        &self,
        session: &QuizSession,
        correct_answers: i64,
        total_questions: i64,
    ) -> Result<Option<QuizResult>, Error> {
        let finished_at = Utc::now();
        let mut tx = self.connection_pool.begin().await?;

        let flipped = sqlx::query(
            r#"
            UPDATE quiz_sessions SET status = ?, finished_at = ?
            WHERE session_id = ? AND status = 'started'
            "#,
        )
        .bind(SessionStatus::Completed)
        .bind(finished_at)
        .bind(session.session_id)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let elapsed_ms = (finished_at - session.started_at).num_milliseconds().max(0);
        let result = sqlx::query(
            r#"
            INSERT INTO quiz_results (user_id, quiz_id, correct_answers, total_questions, elapsed_ms, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.user_id)
        .bind(session.quiz_id)
        .bind(correct_answers)
        .bind(total_questions)
        .bind(elapsed_ms)
        .bind(finished_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(QuizResult {
            result_id: result.last_insert_rowid(),
            user_id: session.user_id,
            quiz_id: session.quiz_id,
            correct_answers,
            total_questions,
            elapsed_ms,
            created_at: finished_at,
        }))
    }
}

impl Read<QuizSession, i64> for QuizSessionRepository {
    async fn read(&self, id: &i64) -> Result<Option<QuizSession>, Error> {
        sqlx::query_as::<_, QuizSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM quiz_sessions WHERE session_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "organizations", "quizzes")))]
    async fn completing_twice_writes_one_result(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = QuizSessionRepository::new(pool.clone());
        let session = repo.start(3, 1).await?;

        let first = repo.complete(&session, 1, 2).await?;
        assert!(first.is_some());
        assert!(repo.complete(&session, 2, 2).await?.is_none());

        let (results,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM quiz_results WHERE user_id = 3 AND quiz_id = 1")
                .fetch_one(&pool)
                .await?;
        assert_eq!(results, 1);

        let stored = repo.read(&session.session_id).await?.expect("session exists");
        assert!(stored.is_completed());
        assert!(stored.finished_at.is_some());
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "organizations", "quizzes")))]
    async fn started_session_is_reused(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = QuizSessionRepository::new(pool);
        assert!(repo.find_started(3, 1).await?.is_none());

        let session = repo.start(3, 1).await?;
        let found = repo.find_started(3, 1).await?.expect("started session");
        assert_eq!(found.session_id, session.session_id);
        Ok(())
    }
}
