use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors raised when parsing catalog values supplied from the outside.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown course: {0}")]
    UnknownCourse(String),
    #[error("unknown placement status: {0}")]
    UnknownStatus(String),
}

/// Fixed catalog of course batches offered to students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Course {
    DataScience,
    FullStackDevelopment,
    AutomationTesting,
    UiUx,
    DevOps,
    DataEngineering,
    BusinessAnalytics,
}

impl Course {
    pub const ALL: [Course; 7] = [
        Self::DataScience,
        Self::FullStackDevelopment,
        Self::AutomationTesting,
        Self::UiUx,
        Self::DevOps,
        Self::DataEngineering,
        Self::BusinessAnalytics,
    ];

    /// Returns the display name stored in `students.course_batch`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DataScience => "Data Science",
            Self::FullStackDevelopment => "Full Stack Development",
            Self::AutomationTesting => "Automation & Testing",
            Self::UiUx => "UI/UX",
            Self::DevOps => "DevOps",
            Self::DataEngineering => "Data Engineering",
            Self::BusinessAnalytics => "Business Analytics with Digital Marketing",
        }
    }

    /// Languages and tools taught in the course.
    pub fn tools(self) -> &'static [&'static str] {
        match self {
            Self::DataScience => &["Python", "SQL"],
            Self::FullStackDevelopment => &["JavaScript", "Node.js", "React", "HTML", "CSS"],
            Self::AutomationTesting => &["Python", "Selenium", "Java"],
            Self::UiUx => &["HTML", "CSS", "Figma"],
            Self::DevOps => &["Shell", "Python", "Docker", "Kubernetes"],
            Self::DataEngineering => &["Python", "SQL", "Spark"],
            Self::BusinessAnalytics => &["Excel", "SQL", "Python"],
        }
    }

    /// Samples a non-empty subset of [`Course::tools`] and joins it for display.
    pub fn sample_tools<R: Rng + ?Sized>(self, rng: &mut R) -> String {
        let tools = self.tools();
        let size = rng.gen_range(1..=tools.len());
        tools
            .choose_multiple(rng, size)
            .copied()
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Course {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|course| course.as_str() == value.trim())
            .ok_or_else(|| CatalogError::UnknownCourse(value.to_string()))
    }
}

impl Serialize for Course {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Course {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Course::from_str(&value).map_err(D::Error::custom)
    }
}

/// Inclusive integer range used by the status bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> u32 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Attribute ranges a student is drawn from, keyed by placement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBand {
    pub problems_solved: Bounds,
    pub mock_interview_score: Bounds,
    pub soft_skill: Bounds,
    pub mini_projects: Bounds,
    pub internships: Bounds,
}

/// Placement outcome of a student. Exactly one per student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlacementStatus {
    Placed,
    Ready,
    NotReady,
}

impl PlacementStatus {
    pub const ALL: [PlacementStatus; 3] = [Self::Placed, Self::Ready, Self::NotReady];

    /// Upper bound of the uniform draw that maps to `Placed`.
    pub const PLACED_THRESHOLD: f64 = 0.15;
    /// Upper bound of the uniform draw that maps to `Ready`.
    pub const READY_THRESHOLD: f64 = 0.53;

    /// Maps a single uniform draw in `[0, 1)` onto a status.
    pub fn from_draw(draw: f64) -> Self {
        if draw < Self::PLACED_THRESHOLD {
            Self::Placed
        } else if draw < Self::READY_THRESHOLD {
            Self::Ready
        } else {
            Self::NotReady
        }
    }

    /// Value stored in `placements.placement_status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Ready => "Ready",
            Self::NotReady => "Not Ready",
        }
    }

    pub fn band(self) -> StatusBand {
        match self {
            Self::Placed => StatusBand {
                problems_solved: Bounds::new(250, 600),
                mock_interview_score: Bounds::new(70, 100),
                soft_skill: Bounds::new(70, 100),
                mini_projects: Bounds::new(8, 10),
                internships: Bounds::new(1, 3),
            },
            Self::Ready => StatusBand {
                problems_solved: Bounds::new(250, 600),
                mock_interview_score: Bounds::new(70, 85),
                soft_skill: Bounds::new(70, 100),
                mini_projects: Bounds::new(8, 10),
                internships: Bounds::new(0, 2),
            },
            Self::NotReady => StatusBand {
                problems_solved: Bounds::new(50, 249),
                mock_interview_score: Bounds::new(50, 69),
                soft_skill: Bounds::new(50, 69),
                mini_projects: Bounds::new(5, 7),
                internships: Bounds::new(0, 1),
            },
        }
    }

    pub fn is_placed(self) -> bool {
        matches!(self, Self::Placed)
    }
}

impl fmt::Display for PlacementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlacementStatus {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Placed" => Ok(Self::Placed),
            "Ready" => Ok(Self::Ready),
            "Not Ready" => Ok(Self::NotReady),
            other => Err(CatalogError::UnknownStatus(other.to_string())),
        }
    }
}

impl Serialize for PlacementStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlacementStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        PlacementStatus::from_str(&value).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

/// Student profile prior to insertion; the store assigns `student_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewStudent {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub email: String,
    pub phone: String,
    pub enrollment_year: i32,
    pub course: Course,
    pub city: String,
    /// Always equal to `enrollment_year` for generated students.
    pub graduation_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgrammingRecord {
    pub programming_id: String,
    pub language: String,
    pub problems_solved: u32,
    pub assessments_completed: u32,
    pub mini_projects: u32,
    pub certifications_earned: u32,
    pub latest_project_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoftSkillScores {
    pub communication: u32,
    pub teamwork: u32,
    pub presentation: u32,
    pub leadership: u32,
    pub critical_thinking: u32,
    pub interpersonal_skills: u32,
}

impl SoftSkillScores {
    pub fn values(&self) -> [u32; 6] {
        [
            self.communication,
            self.teamwork,
            self.presentation,
            self.leadership,
            self.critical_thinking,
            self.interpersonal_skills,
        ]
    }

    /// Mean of the six scores rounded to two decimals, matching the dashboard SQL.
    pub fn average(&self) -> f64 {
        let total: u32 = self.values().iter().sum();
        round_to_cents(f64::from(total) / 6.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoftSkillRecord {
    pub soft_skill_id: String,
    pub scores: SoftSkillScores,
}

/// Offer details recorded only for placed students.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementOffer {
    pub company_name: String,
    /// Package in lakhs per annum, rounded to two decimals.
    pub package_lpa: f64,
    pub interview_rounds_cleared: u32,
    pub placement_date: NaiveDate,
}

impl PlacementOffer {
    /// Text stored in `placements.placement_package`, e.g. `"7.25 LPA"`.
    /// Whole amounts keep one decimal place (`"15.0 LPA"`).
    pub fn package_label(&self) -> String {
        if self.package_lpa.fract() == 0.0 {
            format!("{:.1} LPA", self.package_lpa)
        } else {
            format!("{} LPA", self.package_lpa)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementRecord {
    pub placement_id: String,
    pub mock_interview_score: u32,
    pub internships_completed: u32,
    pub status: PlacementStatus,
    /// `Some` exactly when `status` is [`PlacementStatus::Placed`].
    pub offer: Option<PlacementOffer>,
}

/// A student together with the three rows that depend on it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedRecord {
    pub student: NewStudent,
    pub programming: ProgrammingRecord,
    pub soft_skills: SoftSkillRecord,
    pub placement: PlacementRecord,
}

pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
