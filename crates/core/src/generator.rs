use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::catalog::{self, CITIES, COMPANIES, FIRST_NAMES, LAST_NAMES};
use crate::ids::{IdCounters, IdError};
use crate::types::{
    round_to_cents, Course, GeneratedRecord, Gender, NewStudent, PlacementOffer, PlacementRecord,
    PlacementStatus, ProgrammingRecord, SoftSkillRecord, SoftSkillScores,
};

const AGE_RANGE: (u32, u32) = (20, 35);
const ENROLLMENT_YEARS: (i32, i32) = (2022, 2025);
const ASSESSMENTS_MAX: u32 = 10;
const CERTIFICATIONS_MAX: u32 = 5;
const PROJECT_SCORE_RANGE: (u32, u32) = (60, 100);
const PACKAGE_LPA_RANGE: (f64, f64) = (3.5, 15.0);
const INTERVIEW_ROUNDS_RANGE: (u32, u32) = (3, 5);

/// Produces internally consistent synthetic student records.
///
/// The generator owns its randomness and its ID counters, so two instances
/// never interfere and a seeded instance always yields the same sequence.
pub struct RecordGenerator<R> {
    rng: R,
    counters: IdCounters,
    reference_date: NaiveDate,
    decade_start: NaiveDate,
}

impl RecordGenerator<StdRng> {
    /// Deterministic generator for the provided seed.
    pub fn seeded(seed: u64, reference_date: NaiveDate) -> Self {
        Self::new(StdRng::seed_from_u64(seed), reference_date)
    }

    pub fn from_entropy(reference_date: NaiveDate) -> Self {
        Self::new(StdRng::from_entropy(), reference_date)
    }
}

impl<R: Rng> RecordGenerator<R> {
    /// `reference_date` bounds placement dates: they fall between the start of
    /// its decade and the date itself.
    pub fn new(rng: R, reference_date: NaiveDate) -> Self {
        let decade = reference_date.year() - reference_date.year().rem_euclid(10);
        let decade_start = NaiveDate::from_yo_opt(decade, 1).unwrap_or(reference_date);
        Self {
            rng,
            counters: IdCounters::default(),
            reference_date,
            decade_start,
        }
    }

    /// Replaces the ID counters, e.g. to continue numbering an existing corpus.
    pub fn with_counters(mut self, counters: IdCounters) -> Self {
        self.counters = counters;
        self
    }

    pub fn counters(&self) -> IdCounters {
        self.counters
    }

    /// Fails without yielding a partial batch once the id counters run out.
    pub fn generate(&mut self, count: usize) -> Result<Vec<GeneratedRecord>, IdError> {
        (0..count).map(|_| self.next_record()).collect()
    }

    pub fn next_record(&mut self) -> Result<GeneratedRecord, IdError> {
        let student = self.next_student();
        let ids = self
            .counters
            .next_ids(&student.name, student.enrollment_year)?;
        let language = student.course.sample_tools(&mut self.rng);

        let status = PlacementStatus::from_draw(self.rng.gen::<f64>());
        let band = status.band();

        let problems_solved = band.problems_solved.sample(&mut self.rng);
        let mock_interview_score = band.mock_interview_score.sample(&mut self.rng);
        let scores = SoftSkillScores {
            communication: band.soft_skill.sample(&mut self.rng),
            teamwork: band.soft_skill.sample(&mut self.rng),
            presentation: band.soft_skill.sample(&mut self.rng),
            leadership: band.soft_skill.sample(&mut self.rng),
            critical_thinking: band.soft_skill.sample(&mut self.rng),
            interpersonal_skills: band.soft_skill.sample(&mut self.rng),
        };
        let offer = status.is_placed().then(|| self.next_offer());
        let internships_completed = band.internships.sample(&mut self.rng);
        let mini_projects = band.mini_projects.sample(&mut self.rng);

        let programming = ProgrammingRecord {
            programming_id: ids.programming_id,
            language,
            problems_solved,
            assessments_completed: self.rng.gen_range(0..=ASSESSMENTS_MAX),
            mini_projects,
            certifications_earned: self.rng.gen_range(0..=CERTIFICATIONS_MAX),
            latest_project_score: self
                .rng
                .gen_range(PROJECT_SCORE_RANGE.0..=PROJECT_SCORE_RANGE.1),
        };

        Ok(GeneratedRecord {
            student,
            programming,
            soft_skills: SoftSkillRecord {
                soft_skill_id: ids.soft_skill_id,
                scores,
            },
            placement: PlacementRecord {
                placement_id: ids.placement_id,
                mock_interview_score,
                internships_completed,
                status,
                offer,
            },
        })
    }

    fn next_student(&mut self) -> NewStudent {
        let name = format!(
            "{} {}",
            catalog::pick(&mut self.rng, FIRST_NAMES),
            catalog::pick(&mut self.rng, LAST_NAMES)
        );
        let age = self.rng.gen_range(AGE_RANGE.0..=AGE_RANGE.1);
        let gender = if self.rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let email = catalog::email_for(&mut self.rng, &name);
        let phone = catalog::phone_number(&mut self.rng);
        let enrollment_year = self
            .rng
            .gen_range(ENROLLMENT_YEARS.0..=ENROLLMENT_YEARS.1);
        let course = *Course::ALL
            .choose(&mut self.rng)
            .unwrap_or(&Course::DataScience);
        let city = catalog::pick(&mut self.rng, CITIES).to_string();

        NewStudent {
            name,
            age,
            gender,
            email,
            phone,
            enrollment_year,
            course,
            city,
            graduation_year: enrollment_year,
        }
    }

    fn next_offer(&mut self) -> PlacementOffer {
        let company_name = catalog::pick(&mut self.rng, COMPANIES).to_string();
        let package_lpa =
            round_to_cents(self.rng.gen_range(PACKAGE_LPA_RANGE.0..=PACKAGE_LPA_RANGE.1));
        let interview_rounds_cleared = self
            .rng
            .gen_range(INTERVIEW_ROUNDS_RANGE.0..=INTERVIEW_ROUNDS_RANGE.1);
        let span = (self.reference_date - self.decade_start).num_days().max(0);
        let placement_date = self.decade_start + Duration::days(self.rng.gen_range(0..=span));

        PlacementOffer {
            company_name,
            package_lpa,
            interview_rounds_cleared,
            placement_date,
        }
    }
}
