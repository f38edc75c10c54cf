use exam_core::model::{AssessmentId, AttemptRecord, UserId};
use sqlx::Row;
use std::collections::HashSet;

use super::SqliteRepository;
use super::mapping::{answers_to_json, map_attempt_row, ser};
use crate::repository::{AttemptRepository, AttemptRow, StorageError};

fn map_attempt_row_with_id(row: &sqlx::sqlite::SqliteRow) -> Result<AttemptRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    let record = map_attempt_row(row)?;
    Ok(AttemptRow::new(id, record))
}

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(
        &self,
        user_id: &UserId,
        record: &AttemptRecord,
    ) -> Result<i64, StorageError> {
        let answers = answers_to_json(record.answers())?;

        let res = sqlx::query(
            r"
                INSERT INTO attempts (
                    user_id, assessment_id, answers, score,
                    correct, wrong, empty, total_questions,
                    started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ",
        )
        .bind(user_id.as_str())
        .bind(record.assessment_id().as_str())
        .bind(answers)
        .bind(i64::from(record.score()))
        .bind(i64::from(record.correct()))
        .bind(i64::from(record.wrong()))
        .bind(i64::from(record.empty()))
        .bind(i64::from(record.total_questions()))
        .bind(record.started_at())
        .bind(record.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_attempt(&self, id: i64) -> Result<AttemptRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    assessment_id, answers, score, correct, wrong, empty,
                    total_questions, started_at, completed_at
                FROM attempts
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_attempt_row(&row)
    }

    async fn list_attempts(
        &self,
        user_id: &UserId,
        assessment_id: &AssessmentId,
        completed_from: Option<chrono::DateTime<chrono::Utc>>,
        completed_until: Option<chrono::DateTime<chrono::Utc>>,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT
                    id, assessment_id, answers, score, correct, wrong, empty,
                    total_questions, started_at, completed_at
                FROM attempts
                WHERE user_id = ?1 AND assessment_id = ?2
            ",
        );

        let mut bind_index = 3;
        if completed_from.is_some() {
            sql.push_str(" AND completed_at >= ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        if completed_until.is_some() {
            sql.push_str(" AND completed_at <= ?");
            sql.push_str(&bind_index.to_string());
            bind_index += 1;
        }
        sql.push_str(" ORDER BY completed_at DESC, id DESC");
        sql.push_str(" LIMIT ?");
        sql.push_str(&bind_index.to_string());

        let mut query = sqlx::query(&sql)
            .bind(user_id.as_str())
            .bind(assessment_id.as_str());
        if let Some(from) = completed_from {
            query = query.bind(from);
        }
        if let Some(until) = completed_until {
            query = query.bind(until);
        }
        query = query.bind(i64::from(limit));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_attempt_row_with_id(&row)?);
        }

        Ok(out)
    }

    async fn list_latest_rows(
        &self,
        user_id: &UserId,
        assessment_ids: &[AssessmentId],
    ) -> Result<Vec<AttemptRow>, StorageError> {
        if assessment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            r"
                SELECT
                    id, assessment_id, answers, score, correct, wrong, empty,
                    total_questions, started_at, completed_at
                FROM attempts
                WHERE user_id = ?1 AND assessment_id IN (
            ",
        );

        for i in 0..assessment_ids.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push('?');
            sql.push_str(&(i + 2).to_string());
        }
        sql.push_str(")\n ORDER BY assessment_id ASC, completed_at DESC, id DESC");

        let mut query = sqlx::query(&sql).bind(user_id.as_str());
        for assessment_id in assessment_ids {
            query = query.bind(assessment_id.as_str());
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for row in rows {
            let assessment_id: String = row.try_get("assessment_id").map_err(ser)?;
            if !seen.insert(assessment_id) {
                continue;
            }
            out.push(map_attempt_row_with_id(&row)?);
        }

        Ok(out)
    }
}
