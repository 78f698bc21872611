use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use thiserror::Error;

use placement_core::types::GeneratedRecord;

/// Repository writing generated students together with their dependent rows.
#[derive(Clone)]
pub struct StudentRepository {
    pub(crate) pool: SqlitePool,
}

impl StudentRepository {
    /// Number of students currently stored.
    pub async fn count(&self) -> Result<u64, InsertError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM students")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.get("total");
        Ok(total as u64)
    }

    /// Inserts every record of the batch inside a single transaction.
    ///
    /// Either the whole batch is committed or, on the first failure, nothing
    /// from it is: the transaction is rolled back when dropped uncommitted.
    pub async fn insert_batch(&self, records: &[GeneratedRecord]) -> Result<u64, InsertError> {
        let mut tx = self.pool.begin().await?;
        for record in records {
            insert_record(&mut tx, record).await?;
        }
        tx.commit().await?;
        Ok(records.len() as u64)
    }
}

/// Inserts the student row, then exactly one row in each dependent table.
async fn insert_record(
    tx: &mut Transaction<'_, Sqlite>,
    record: &GeneratedRecord,
) -> Result<i64, InsertError> {
    let student = &record.student;
    let student_id = sqlx::query(
        "INSERT INTO students \
         (name, age, gender, email, phone, enrollment_year, course_batch, city, graduation_year) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&student.name)
    .bind(student.age)
    .bind(student.gender.as_str())
    .bind(&student.email)
    .bind(&student.phone)
    .bind(student.enrollment_year)
    .bind(student.course.as_str())
    .bind(&student.city)
    .bind(student.graduation_year)
    .execute(&mut **tx)
    .await?
    .last_insert_rowid();

    let programming = &record.programming;
    sqlx::query(
        "INSERT INTO programming \
         (programming_id, student_id, language, problems_solved, assessments_completed, \
          mini_projects, certifications_earned, latest_project_score) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&programming.programming_id)
    .bind(student_id)
    .bind(&programming.language)
    .bind(programming.problems_solved)
    .bind(programming.assessments_completed)
    .bind(programming.mini_projects)
    .bind(programming.certifications_earned)
    .bind(programming.latest_project_score)
    .execute(&mut **tx)
    .await
    .map_err(|err| classify(err, &programming.programming_id))?;

    let soft_skills = &record.soft_skills;
    let scores = soft_skills.scores;
    sqlx::query(
        "INSERT INTO soft_skills \
         (soft_skill_id, student_id, communication, teamwork, presentation, leadership, \
          critical_thinking, interpersonal_skills) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&soft_skills.soft_skill_id)
    .bind(student_id)
    .bind(scores.communication)
    .bind(scores.teamwork)
    .bind(scores.presentation)
    .bind(scores.leadership)
    .bind(scores.critical_thinking)
    .bind(scores.interpersonal_skills)
    .execute(&mut **tx)
    .await
    .map_err(|err| classify(err, &soft_skills.soft_skill_id))?;

    let placement = &record.placement;
    let offer = placement.offer.as_ref();
    sqlx::query(
        "INSERT INTO placements \
         (placement_id, student_id, mock_interview_score, internships_completed, \
          placement_status, company_name, placement_package, interview_rounds_cleared, \
          placement_date) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&placement.placement_id)
    .bind(student_id)
    .bind(placement.mock_interview_score)
    .bind(placement.internships_completed)
    .bind(placement.status.as_str())
    .bind(offer.map(|offer| offer.company_name.as_str()))
    .bind(offer.map(|offer| offer.package_label()))
    .bind(offer.map(|offer| offer.interview_rounds_cleared))
    .bind(offer.map(|offer| offer.placement_date))
    .execute(&mut **tx)
    .await
    .map_err(|err| classify(err, &placement.placement_id))?;

    Ok(student_id)
}

fn classify(err: sqlx::Error, id: &str) -> InsertError {
    match err {
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // SQLITE_CONSTRAINT_PRIMARYKEY / SQLITE_CONSTRAINT_UNIQUE
            Some("1555") | Some("2067") => InsertError::DuplicateId(id.to_string()),
            // SQLITE_CONSTRAINT_FOREIGNKEY
            Some("787") => InsertError::MissingStudent,
            _ => InsertError::Database(sqlx::Error::Database(db_err)),
        },
        other => InsertError::Database(other),
    }
}

/// Errors that can occur while writing a generated batch.
#[derive(Debug, Error)]
pub enum InsertError {
    #[error("derived id {0} already exists")]
    DuplicateId(String),
    #[error("dependent row references a missing student")]
    MissingStudent,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for InsertError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::setup_db;
    use chrono::NaiveDate;
    use placement_core::types::PlacementStatus;
    use placement_core::RecordGenerator;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date")
    }

    #[tokio::test]
    async fn insert_batch_writes_one_row_per_table_per_student() {
        let (db, _dir) = setup_db().await;
        let records = RecordGenerator::seeded(17, reference_date())
            .generate(50)
            .expect("generate");

        let inserted = db
            .students()
            .insert_batch(&records)
            .await
            .expect("insert succeeds");
        assert_eq!(inserted, 50);
        assert_eq!(db.students().count().await.expect("count"), 50);

        for table in ["programming", "soft_skills", "placements"] {
            let row: (i64, i64) = sqlx::query_as(&format!(
                "SELECT COUNT(*), COUNT(DISTINCT student_id) FROM {table}"
            ))
            .fetch_one(db.pool())
            .await
            .expect("count dependents");
            assert_eq!(row, (50, 50), "table {table}");
        }
    }

    #[tokio::test]
    async fn offer_columns_are_null_unless_placed() {
        let (db, _dir) = setup_db().await;
        let records = RecordGenerator::seeded(4, reference_date())
            .generate(200)
            .expect("generate");
        db.students()
            .insert_batch(&records)
            .await
            .expect("insert succeeds");

        let rows = sqlx::query(
            "SELECT placement_status, company_name, placement_package, \
                    interview_rounds_cleared, placement_date FROM placements",
        )
        .fetch_all(db.pool())
        .await
        .expect("fetch placements");

        for row in rows {
            let status: String = row.get("placement_status");
            let placed = status.parse::<PlacementStatus>().expect("known status").is_placed();
            let company: Option<String> = row.get("company_name");
            let package: Option<String> = row.get("placement_package");
            let rounds: Option<i64> = row.get("interview_rounds_cleared");
            let date: Option<NaiveDate> = row.get("placement_date");
            assert_eq!(company.is_some(), placed);
            assert_eq!(package.is_some(), placed);
            assert_eq!(rounds.is_some(), placed);
            assert_eq!(date.is_some(), placed);
        }
    }

    #[tokio::test]
    async fn failed_batch_commits_nothing() {
        let (db, _dir) = setup_db().await;
        let mut records = RecordGenerator::seeded(9, reference_date())
            .generate(3)
            .expect("generate");
        records[2].programming.programming_id = records[0].programming.programming_id.clone();

        let err = db
            .students()
            .insert_batch(&records)
            .await
            .expect_err("duplicate id must fail the batch");
        assert!(
            matches!(&err, InsertError::DuplicateId(id) if *id == records[0].programming.programming_id),
            "unexpected error: {err}"
        );
        assert_eq!(db.students().count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn consecutive_batches_append() {
        let (db, _dir) = setup_db().await;
        let mut generator = RecordGenerator::seeded(12, reference_date());
        let first = generator.generate(10).expect("generate");
        let second = generator.generate(5).expect("generate");

        db.students().insert_batch(&first).await.expect("first batch");
        db.students().insert_batch(&second).await.expect("second batch");
        assert_eq!(db.students().count().await.expect("count"), 15);
    }
}
