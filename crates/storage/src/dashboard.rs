use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;

use placement_core::dashboard::{CriteriaFilter, Insight, OverviewCounts, OverviewError};
use placement_core::types::{Course, PlacementStatus};

/// Read-only queries backing the dashboard views.
#[derive(Clone)]
pub struct DashboardRepository {
    pub(crate) pool: SqlitePool,
}

/// Errors that can occur while answering a dashboard query.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Overview(#[from] OverviewError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, sqlx::FromRow)]
struct OverviewTotals {
    total: i64,
    placed: i64,
    ready: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PlacedStudentRow {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company_name: Option<String>,
    pub placement_package: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ReadyStudentRow {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Row returned by the criteria filter.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CandidateRow {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course_batch: String,
    pub language: String,
    pub problems_solved: i64,
    pub mini_projects: i64,
    pub communication: i64,
    pub teamwork: i64,
    pub presentation: i64,
    pub leadership: i64,
    pub critical_thinking: i64,
    pub interpersonal_skills: i64,
    pub soft_skill_avg: f64,
    pub placement_status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TopReadyRow {
    pub student_id: i64,
    pub name: String,
    pub course_batch: String,
    pub soft_skill_avg: f64,
    pub problems_solved: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SoftSkillRow {
    pub student_id: i64,
    pub name: String,
    pub communication: i64,
    pub teamwork: i64,
    pub presentation: i64,
    pub leadership: i64,
    pub critical_thinking: i64,
    pub interpersonal_skills: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MockInterviewRow {
    pub student_id: i64,
    pub name: String,
    pub mock_interview_score: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PackageRow {
    pub student_id: i64,
    pub name: String,
    pub company_name: Option<String>,
    pub placement_package: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CertificationRow {
    pub student_id: i64,
    pub name: String,
    pub certifications_earned: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct FullProfileRow {
    pub student_id: i64,
    pub name: String,
    pub email: String,
    pub course_batch: String,
    pub language: String,
    pub problems_solved: i64,
    pub certifications_earned: i64,
    pub communication: i64,
    pub teamwork: i64,
    pub presentation: i64,
    pub leadership: i64,
    pub critical_thinking: i64,
    pub interpersonal_skills: i64,
    pub placement_status: String,
    pub company_name: Option<String>,
    pub placement_package: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct MiniProjectRow {
    pub student_id: i64,
    pub name: String,
    pub mini_projects: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct GraduateRow {
    pub student_id: i64,
    pub name: String,
    pub graduation_year: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct InternshipRow {
    pub student_id: i64,
    pub name: String,
    pub internships_completed: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct CourseAverageRow {
    pub course_batch: String,
    pub avg_problems: f64,
}

/// Tabular result of an insight query; serializes as a plain array of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InsightRows {
    TopReady(Vec<TopReadyRow>),
    SoftSkills(Vec<SoftSkillRow>),
    MockInterview(Vec<MockInterviewRow>),
    Packages(Vec<PackageRow>),
    Certifications(Vec<CertificationRow>),
    FullProfile(Vec<FullProfileRow>),
    MiniProjects(Vec<MiniProjectRow>),
    Graduates(Vec<GraduateRow>),
    Internships(Vec<InternshipRow>),
    CourseAverages(Vec<CourseAverageRow>),
}

impl InsightRows {
    pub fn len(&self) -> usize {
        match self {
            Self::TopReady(rows) => rows.len(),
            Self::SoftSkills(rows) => rows.len(),
            Self::MockInterview(rows) => rows.len(),
            Self::Packages(rows) => rows.len(),
            Self::Certifications(rows) => rows.len(),
            Self::FullProfile(rows) => rows.len(),
            Self::MiniProjects(rows) => rows.len(),
            Self::Graduates(rows) => rows.len(),
            Self::Internships(rows) => rows.len(),
            Self::CourseAverages(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DashboardRepository {
    /// Loads the headline counts and derives the not-placed / not-ready figures.
    pub async fn overview(&self) -> Result<OverviewCounts, DashboardError> {
        let totals = sqlx::query_as::<_, OverviewTotals>(
            r#"
SELECT (SELECT COUNT(*) FROM students) AS total,
       (SELECT COUNT(*) FROM placements WHERE placement_status = ?) AS placed,
       (SELECT COUNT(*) FROM placements WHERE placement_status = ?) AS ready
            "#,
        )
        .bind(PlacementStatus::Placed.as_str())
        .bind(PlacementStatus::Ready.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(OverviewCounts::derive(
            totals.total.max(0) as u64,
            totals.placed.max(0) as u64,
            totals.ready.max(0) as u64,
        )?)
    }

    pub async fn placed_students(
        &self,
        course: Course,
    ) -> Result<Vec<PlacedStudentRow>, DashboardError> {
        let rows = sqlx::query_as::<_, PlacedStudentRow>(
            r#"
SELECT s.student_id, s.name, s.email, s.phone, pl.company_name, pl.placement_package
  FROM students AS s
  JOIN placements AS pl ON s.student_id = pl.student_id
 WHERE pl.placement_status = ?
   AND s.course_batch = ?
 ORDER BY s.student_id
            "#,
        )
        .bind(PlacementStatus::Placed.as_str())
        .bind(course.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn ready_students(
        &self,
        course: Course,
    ) -> Result<Vec<ReadyStudentRow>, DashboardError> {
        let rows = sqlx::query_as::<_, ReadyStudentRow>(
            r#"
SELECT s.student_id, s.name, s.email, s.phone
  FROM students AS s
  JOIN placements AS pl ON s.student_id = pl.student_id
 WHERE pl.placement_status = ?
   AND s.course_batch = ?
 ORDER BY s.student_id
            "#,
        )
        .bind(PlacementStatus::Ready.as_str())
        .bind(course.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Not-yet-placed students of a course meeting every threshold.
    pub async fn candidates(
        &self,
        filter: &CriteriaFilter,
    ) -> Result<Vec<CandidateRow>, DashboardError> {
        let rows = sqlx::query_as::<_, CandidateRow>(
            r#"
SELECT s.student_id, s.name, s.email, s.phone, s.course_batch,
       p.language, p.problems_solved, p.mini_projects,
       ss.communication, ss.teamwork, ss.presentation, ss.leadership,
       ss.critical_thinking, ss.interpersonal_skills,
       ROUND((ss.communication + ss.teamwork + ss.presentation + ss.leadership +
              ss.critical_thinking + ss.interpersonal_skills) / 6.0, 2) AS soft_skill_avg,
       pl.placement_status
  FROM students AS s
  JOIN programming AS p ON s.student_id = p.student_id
  JOIN soft_skills AS ss ON s.student_id = ss.student_id
  JOIN placements AS pl ON s.student_id = pl.student_id
 WHERE s.course_batch = ?
   AND p.problems_solved >= ?
   AND p.mini_projects >= ?
   AND ROUND((ss.communication + ss.teamwork + ss.presentation + ss.leadership +
              ss.critical_thinking + ss.interpersonal_skills) / 6.0, 2) >= ?
   AND pl.placement_status != ?
 ORDER BY s.student_id
            "#,
        )
        .bind(filter.course.as_str())
        .bind(filter.min_problems)
        .bind(filter.min_projects)
        .bind(filter.min_soft_skill)
        .bind(PlacementStatus::Placed.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Runs one entry of the insight menu.
    ///
    /// `param` is the row limit or threshold resolved by
    /// [`Insight::resolve_param`]; `current_year` feeds the graduates query.
    pub async fn insight(
        &self,
        insight: Insight,
        param: Option<u32>,
        current_year: i32,
    ) -> Result<InsightRows, DashboardError> {
        let param = i64::from(param.or(insight.default_param()).unwrap_or_default());

        let rows = match insight {
            Insight::TopReady => InsightRows::TopReady(
                sqlx::query_as::<_, TopReadyRow>(
                    r#"
SELECT s.student_id, s.name, s.course_batch,
       ROUND((ss.communication + ss.teamwork + ss.presentation + ss.leadership +
              ss.critical_thinking + ss.interpersonal_skills) / 6.0, 2) AS soft_skill_avg,
       p.problems_solved
  FROM students AS s
  JOIN soft_skills AS ss ON s.student_id = ss.student_id
  JOIN programming AS p ON s.student_id = p.student_id
  JOIN placements AS pl ON s.student_id = pl.student_id
 WHERE pl.placement_status = ?
 ORDER BY soft_skill_avg DESC, p.problems_solved DESC, s.student_id
 LIMIT ?
                    "#,
                )
                .bind(PlacementStatus::Ready.as_str())
                .bind(param)
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::SoftSkillDistribution => InsightRows::SoftSkills(
                sqlx::query_as::<_, SoftSkillRow>(
                    r#"
SELECT s.student_id, s.name, ss.communication, ss.teamwork, ss.presentation,
       ss.leadership, ss.critical_thinking, ss.interpersonal_skills
  FROM students AS s
  JOIN soft_skills AS ss ON s.student_id = ss.student_id
 ORDER BY s.student_id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::TopMockInterview => InsightRows::MockInterview(
                sqlx::query_as::<_, MockInterviewRow>(
                    r#"
SELECT s.student_id, s.name, pl.mock_interview_score
  FROM students AS s
  JOIN placements AS pl ON s.student_id = pl.student_id
 ORDER BY pl.mock_interview_score DESC, s.student_id
 LIMIT ?
                    "#,
                )
                .bind(param)
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::TopPackages => InsightRows::Packages(
                sqlx::query_as::<_, PackageRow>(
                    r#"
SELECT s.student_id, s.name, pl.company_name, pl.placement_package
  FROM students AS s
  JOIN placements AS pl ON s.student_id = pl.student_id
 WHERE pl.placement_status = ?
 ORDER BY CAST(REPLACE(pl.placement_package, ' LPA', '') AS REAL) DESC, s.student_id
 LIMIT ?
                    "#,
                )
                .bind(PlacementStatus::Placed.as_str())
                .bind(param)
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::Certifications => InsightRows::Certifications(
                sqlx::query_as::<_, CertificationRow>(
                    r#"
SELECT s.student_id, s.name, p.certifications_earned
  FROM students AS s
  JOIN programming AS p ON s.student_id = p.student_id
 WHERE p.certifications_earned > ?
 ORDER BY s.student_id
                    "#,
                )
                .bind(param)
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::FullProfile => InsightRows::FullProfile(
                sqlx::query_as::<_, FullProfileRow>(
                    r#"
SELECT s.student_id, s.name, s.email, s.course_batch,
       p.language, p.problems_solved, p.certifications_earned,
       ss.communication, ss.teamwork, ss.presentation,
       ss.leadership, ss.critical_thinking, ss.interpersonal_skills,
       pl.placement_status, pl.company_name, pl.placement_package
  FROM students AS s
  JOIN programming AS p ON s.student_id = p.student_id
  JOIN soft_skills AS ss ON s.student_id = ss.student_id
  JOIN placements AS pl ON s.student_id = pl.student_id
 ORDER BY s.student_id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::MiniProjectPerformers => InsightRows::MiniProjects(
                sqlx::query_as::<_, MiniProjectRow>(
                    r#"
SELECT s.student_id, s.name, p.mini_projects
  FROM students AS s
  JOIN programming AS p ON s.student_id = p.student_id
 WHERE p.mini_projects IN (9, 10)
 ORDER BY s.student_id
                    "#,
                )
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::GraduatingThisYear => InsightRows::Graduates(
                sqlx::query_as::<_, GraduateRow>(
                    r#"
SELECT student_id, name, graduation_year
  FROM students
 WHERE graduation_year = ?
 ORDER BY student_id
                    "#,
                )
                .bind(current_year)
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::Internships => InsightRows::Internships(
                sqlx::query_as::<_, InternshipRow>(
                    r#"
SELECT s.student_id, s.name, pl.internships_completed
  FROM students AS s
  JOIN placements AS pl ON s.student_id = pl.student_id
 WHERE pl.internships_completed > ?
 ORDER BY s.student_id
                    "#,
                )
                .bind(param)
                .fetch_all(&self.pool)
                .await?,
            ),
            Insight::AvgProblemsPerCourse => InsightRows::CourseAverages(
                sqlx::query_as::<_, CourseAverageRow>(
                    r#"
SELECT s.course_batch, ROUND(AVG(p.problems_solved), 2) AS avg_problems
  FROM students AS s
  JOIN programming AS p ON s.student_id = p.student_id
 GROUP BY s.course_batch
 ORDER BY s.course_batch
                    "#,
                )
                .fetch_all(&self.pool)
                .await?,
            ),
        };

        Ok(rows)
    }
}
