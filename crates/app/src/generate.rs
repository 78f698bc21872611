use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

use placement_core::{IdCounters, IdError, RecordGenerator, ID_COUNTER_BASE};
use placement_storage::{Database, InsertError};
use placement_util::GeneratorSettings;

/// Outcome of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateReport {
    pub inserted: u64,
    pub first_counter: u32,
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read existing student count: {0}")]
    ExistingCount(#[source] InsertError),
    #[error("id counter space exhausted: {existing} stored students plus {requested} new records")]
    CounterOverflow { existing: u64, requested: u32 },
    #[error(transparent)]
    Ids(#[from] IdError),
    #[error("failed to insert generated batch: {0}")]
    Insert(#[source] InsertError),
}

/// Generates `settings.record_count` records and commits them as one batch.
///
/// Counters resume after the students already stored so derived ids never
/// collide with an earlier run against the same database.
pub async fn run(
    database: &Database,
    settings: GeneratorSettings,
    reference_date: NaiveDate,
) -> Result<GenerateReport, GenerateError> {
    let students = database.students();
    let existing = students.count().await.map_err(GenerateError::ExistingCount)?;
    let first_counter = counter_base(existing, settings.record_count)?;

    let generator = match settings.seed {
        Some(seed) => RecordGenerator::seeded(seed, reference_date),
        None => RecordGenerator::from_entropy(reference_date),
    };
    let mut generator = generator.with_counters(IdCounters::starting_at(first_counter));

    info!(
        stage = "generator",
        requested = settings.record_count,
        existing,
        first_counter,
        seeded = settings.seed.is_some(),
        "generating synthetic student records"
    );

    let records = generator.generate(settings.record_count as usize)?;
    let inserted = students.insert_batch(&records).await.map_err(|err| {
        warn!(stage = "generator", error = %err, "batch rolled back");
        GenerateError::Insert(err)
    })?;

    info!(stage = "generator", inserted, "batch committed");

    Ok(GenerateReport {
        inserted,
        first_counter,
    })
}

fn counter_base(existing: u64, requested: u32) -> Result<u32, GenerateError> {
    let overflow = || GenerateError::CounterOverflow {
        existing,
        requested,
    };
    let base = u32::try_from(existing)
        .ok()
        .and_then(|existing| ID_COUNTER_BASE.checked_add(existing))
        .ok_or_else(overflow)?;
    base.checked_add(requested).ok_or_else(overflow)?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("placement.db").display()
        );
        let database = Database::connect(&url).await.expect("connect");
        database.run_migrations().await.expect("migrations");
        (database, dir)
    }

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date")
    }

    fn settings(record_count: u32, seed: Option<u64>) -> GeneratorSettings {
        GeneratorSettings { record_count, seed }
    }

    #[tokio::test]
    async fn run_inserts_requested_count() {
        let (database, _dir) = setup_db().await;
        let report = run(&database, settings(40, Some(1)), reference_date())
            .await
            .expect("run succeeds");

        assert_eq!(report.inserted, 40);
        assert_eq!(report.first_counter, ID_COUNTER_BASE);
        assert_eq!(database.students().count().await.expect("count"), 40);
    }

    #[tokio::test]
    async fn second_run_continues_counters() {
        let (database, _dir) = setup_db().await;
        run(&database, settings(25, Some(3)), reference_date())
            .await
            .expect("first run");
        let report = run(&database, settings(25, Some(3)), reference_date())
            .await
            .expect("same seed must not collide on a populated store");

        assert_eq!(report.first_counter, ID_COUNTER_BASE + 25);
        assert_eq!(database.students().count().await.expect("count"), 50);
        let overview = database.dashboard().overview().await.expect("overview");
        assert_eq!(overview.total_students, 50);
    }

    #[tokio::test]
    async fn unseeded_run_inserts_records() {
        let (database, _dir) = setup_db().await;
        let report = run(&database, settings(5, None), reference_date())
            .await
            .expect("run succeeds");
        assert_eq!(report.inserted, 5);
    }

    #[test]
    fn counter_base_starts_after_existing_students() {
        assert_eq!(counter_base(0, 10).expect("base"), ID_COUNTER_BASE);
        assert_eq!(counter_base(120, 10).expect("base"), ID_COUNTER_BASE + 120);
    }

    #[test]
    fn counter_base_rejects_overflow() {
        assert!(matches!(
            counter_base(u64::from(u32::MAX), 1),
            Err(GenerateError::CounterOverflow { .. })
        ));
        assert!(counter_base(0, u32::MAX).is_err());
    }
}
