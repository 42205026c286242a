//! QuizResultRepository - Letture aggregate sui risultati per le statistiche
//!
//! I risultati sono immutabili: vengono scritti solo da
//! `QuizSessionRepository::complete`, qui ci sono solo letture.

use crate::dtos::{LastCompletionDTO, MyLastCompletionDTO, ResultExportRow};
use chrono::NaiveDate;
use sqlx::{Error, SqlitePool};

/// Somme di risposte corrette e domande totali
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct ScoreTotals {
    pub correct: i64,
    pub total: i64,
}

/// Totali di un giorno per un soggetto (utente o quiz)
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DailyTotals {
    pub id: i64,
    pub day: NaiveDate,
    pub correct: i64,
    pub total: i64,
}

pub struct QuizResultRepository {
    connection_pool: SqlitePool,
}

impl QuizResultRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn totals_in_organization(
        &self,
        user_id: i64,
        organization_id: i64,
    ) -> Result<ScoreTotals, Error> {
        sqlx::query_as::<_, ScoreTotals>(
            r#"
            SELECT COALESCE(SUM(r.correct_answers), 0) AS correct,
                   COALESCE(SUM(r.total_questions), 0) AS total
            FROM quiz_results r
            JOIN quizzes q ON q.quiz_id = r.quiz_id
            WHERE r.user_id = ? AND q.organization_id = ?
            "#,
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(&self.connection_pool)
        .await
    }

    pub async fn totals_for_user(&self, user_id: i64) -> Result<ScoreTotals, Error> {
        sqlx::query_as::<_, ScoreTotals>(
            r#"
            SELECT COALESCE(SUM(correct_answers), 0) AS correct,
                   COALESCE(SUM(total_questions), 0) AS total
            FROM quiz_results
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.connection_pool)
        .await
    }

    /// Totali giornalieri per ogni utente dell'organizzazione, estremi inclusi
    pub async fn daily_by_user(
        &self,
        organization_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyTotals>, Error> {
        sqlx::query_as::<_, DailyTotals>(
            r#"
            SELECT r.user_id AS id, date(r.created_at) AS day,
                   SUM(r.correct_answers) AS correct, SUM(r.total_questions) AS total
            FROM quiz_results r
            JOIN quizzes q ON q.quiz_id = r.quiz_id
            WHERE q.organization_id = ? AND date(r.created_at) BETWEEN ? AND ?
            GROUP BY r.user_id, date(r.created_at)
            ORDER BY r.user_id, day
            "#,
        )
        .bind(organization_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Totali giornalieri di un utente, raggruppati per quiz dell'organizzazione
    pub async fn daily_by_quiz(
        &self,
        organization_id: i64,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyTotals>, Error> {
        sqlx::query_as::<_, DailyTotals>(
            r#"
            SELECT r.quiz_id AS id, date(r.created_at) AS day,
                   SUM(r.correct_answers) AS correct, SUM(r.total_questions) AS total
            FROM quiz_results r
            JOIN quizzes q ON q.quiz_id = r.quiz_id
            WHERE q.organization_id = ? AND r.user_id = ? AND date(r.created_at) BETWEEN ? AND ?
            GROUP BY r.quiz_id, date(r.created_at)
            ORDER BY r.quiz_id, day
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.connection_pool)
        .await
    }

    /// Totali giornalieri di un utente su tutte le organizzazioni
    pub async fn daily_for_user(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyTotals>, Error> {
        sqlx::query_as::<_, DailyTotals>(
            r#"
            SELECT r.user_id AS id, date(r.created_at) AS day,
                   SUM(r.correct_answers) AS correct, SUM(r.total_questions) AS total
            FROM quiz_results r
            WHERE r.user_id = ? AND date(r.created_at) BETWEEN ? AND ?
            GROUP BY r.user_id, date(r.created_at)
            ORDER BY day
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn last_completions_in_organization(
        &self,
        organization_id: i64,
    ) -> Result<Vec<LastCompletionDTO>, Error> {
        sqlx::query_as::<_, LastCompletionDTO>(
            r#"
            SELECT q.quiz_id AS quiz, q.title, MAX(datetime(r.created_at)) AS last_completed_at
            FROM quiz_results r
            JOIN quizzes q ON q.quiz_id = r.quiz_id
            WHERE q.organization_id = ?
            GROUP BY q.quiz_id, q.title
            ORDER BY q.quiz_id
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.connection_pool)
        .await
    }

    pub async fn last_completions_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<MyLastCompletionDTO>, Error> {
        sqlx::query_as::<_, MyLastCompletionDTO>(
            r#"
            SELECT q.quiz_id AS quiz, q.title, q.organization_id AS organization,
                   MAX(datetime(r.created_at)) AS last_completed_at
            FROM quiz_results r
            JOIN quizzes q ON q.quiz_id = r.quiz_id
            WHERE r.user_id = ?
            GROUP BY q.quiz_id, q.title, q.organization_id
            ORDER BY q.quiz_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }
    /// Ultimo risultato dell'utente per il quiz, con i nomi per l'export
    pub async fn latest_for_export(
        &self,
        user_id: i64,
        quiz_id: i64,
    ) -> Result<Option<ResultExportRow>, Error> {
        sqlx::query_as::<_, ResultExportRow>(
            r#"
            SELECT r.result_id AS id, u.username AS user, o.name AS organization,
                   q.title AS quiz, r.correct_answers, r.total_questions, r.created_at
            FROM quiz_results r
            JOIN users u ON u.user_id = r.user_id
            JOIN quizzes q ON q.quiz_id = r.quiz_id
            JOIN organizations o ON o.organization_id = q.organization_id
            WHERE r.user_id = ? AND r.quiz_id = ?
            ORDER BY datetime(r.created_at) DESC, r.result_id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&self.connection_pool)
        .await
    }

    /// Tutti i risultati dell'organizzazione, opzionalmente di un solo utente
    pub async fn organization_for_export(
        &self,
        organization_id: i64,
        user_id: Option<i64>,
    ) -> Result<Vec<ResultExportRow>, Error> {
        sqlx::query_as::<_, ResultExportRow>(
            r#"
            SELECT r.result_id AS id, u.username AS user, o.name AS organization,
                   q.title AS quiz, r.correct_answers, r.total_questions, r.created_at
            FROM quiz_results r
            JOIN users u ON u.user_id = r.user_id
            JOIN quizzes q ON q.quiz_id = r.quiz_id
            JOIN organizations o ON o.organization_id = q.organization_id
            WHERE q.organization_id = ? AND (? IS NULL OR r.user_id = ?)
            ORDER BY datetime(r.created_at), r.result_id
            "#,
        )
        .bind(organization_id)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await
    }
}
