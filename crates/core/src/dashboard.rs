use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::types::{CatalogError, Course};

/// Headline counts shown on the overview page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OverviewCounts {
    pub total_students: u64,
    pub placed: u64,
    pub ready: u64,
    pub not_placed: u64,
    pub not_ready: u64,
}

/// Raised when the stored statuses do not partition the student set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverviewError {
    #[error("placed ({placed}) + ready ({ready}) exceeds total students ({total})")]
    TaxonomyViolation { total: u64, placed: u64, ready: u64 },
}

impl OverviewCounts {
    /// Derives the not-placed and not-ready figures from the three raw counts.
    pub fn derive(total: u64, placed: u64, ready: u64) -> Result<Self, OverviewError> {
        let violation = OverviewError::TaxonomyViolation {
            total,
            placed,
            ready,
        };
        let not_placed = total.checked_sub(placed).ok_or(violation.clone())?;
        let not_ready = not_placed.checked_sub(ready).ok_or(violation)?;

        Ok(Self {
            total_students: total,
            placed,
            ready,
            not_placed,
            not_ready,
        })
    }
}

/// Rejected criteria input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u32,
        max: u32,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Thresholds for listing not-yet-placed candidates of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriteriaFilter {
    pub course: Course,
    pub min_problems: u32,
    pub min_projects: u32,
    pub min_soft_skill: u32,
}

impl CriteriaFilter {
    pub const PROBLEMS_BOUNDS: (u32, u32) = (1, 600);
    pub const PROJECTS_BOUNDS: (u32, u32) = (1, 10);
    pub const SOFT_SKILL_BOUNDS: (u32, u32) = (1, 100);

    pub const DEFAULT_MIN_PROBLEMS: u32 = 150;
    pub const DEFAULT_MIN_PROJECTS: u32 = 5;
    pub const DEFAULT_MIN_SOFT_SKILL: u32 = 60;

    /// Validates raw inputs; any threshold outside its bounds is rejected.
    pub fn new(
        course: &str,
        min_problems: i64,
        min_projects: i64,
        min_soft_skill: i64,
    ) -> Result<Self, CriteriaError> {
        Ok(Self {
            course: course.parse()?,
            min_problems: check_bounds("min_problems", min_problems, Self::PROBLEMS_BOUNDS)?,
            min_projects: check_bounds("min_projects", min_projects, Self::PROJECTS_BOUNDS)?,
            min_soft_skill: check_bounds(
                "min_soft_skill",
                min_soft_skill,
                Self::SOFT_SKILL_BOUNDS,
            )?,
        })
    }
}

fn check_bounds(
    field: &'static str,
    value: i64,
    (min, max): (u32, u32),
) -> Result<u32, CriteriaError> {
    if value < i64::from(min) || value > i64::from(max) {
        return Err(CriteriaError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value as u32)
}

/// Fixed menu of aggregate and ranking queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Insight {
    TopReady,
    SoftSkillDistribution,
    TopMockInterview,
    TopPackages,
    Certifications,
    FullProfile,
    MiniProjectPerformers,
    GraduatingThisYear,
    Internships,
    AvgProblemsPerCourse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InsightError {
    #[error("unknown insight: {0}")]
    Unknown(String),
    #[error("insight {0} does not take a parameter")]
    ParameterNotSupported(&'static str),
}

impl Insight {
    pub const ALL: [Insight; 10] = [
        Self::TopReady,
        Self::SoftSkillDistribution,
        Self::TopMockInterview,
        Self::TopPackages,
        Self::Certifications,
        Self::FullProfile,
        Self::MiniProjectPerformers,
        Self::GraduatingThisYear,
        Self::Internships,
        Self::AvgProblemsPerCourse,
    ];

    /// URL-safe identifier.
    pub fn slug(self) -> &'static str {
        match self {
            Self::TopReady => "top-ready",
            Self::SoftSkillDistribution => "soft-skill-distribution",
            Self::TopMockInterview => "top-mock-interview",
            Self::TopPackages => "top-packages",
            Self::Certifications => "certifications",
            Self::FullProfile => "full-profile",
            Self::MiniProjectPerformers => "mini-project-performers",
            Self::GraduatingThisYear => "graduating-this-year",
            Self::Internships => "internships",
            Self::AvgProblemsPerCourse => "avg-problems-per-course",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::TopReady => "Top students ready for placement",
            Self::SoftSkillDistribution => "Distribution of soft skills scores",
            Self::TopMockInterview => "Top performing students in mock interview",
            Self::TopPackages => "Students with highest package",
            Self::Certifications => "Students with more certificates than the threshold",
            Self::FullProfile => "Join all student tables",
            Self::MiniProjectPerformers => "Top mini project performers",
            Self::GraduatingThisYear => "Students graduating this year",
            Self::Internships => "Students with more internships than the threshold",
            Self::AvgProblemsPerCourse => "Average programming performance per batch",
        }
    }

    /// Row limit or threshold applied when the caller does not supply one.
    pub fn default_param(self) -> Option<u32> {
        match self {
            Self::TopReady => Some(5),
            Self::TopMockInterview => Some(20),
            Self::TopPackages => Some(10),
            Self::Certifications => Some(4),
            Self::Internships => Some(2),
            _ => None,
        }
    }

    /// Resolves the effective parameter, falling back to [`Insight::default_param`].
    pub fn resolve_param(self, requested: Option<u32>) -> Result<Option<u32>, InsightError> {
        match (self.default_param(), requested) {
            (None, Some(_)) => Err(InsightError::ParameterNotSupported(self.slug())),
            (default, requested) => Ok(requested.or(default)),
        }
    }
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Insight {
    type Err = InsightError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|insight| insight.slug() == value)
            .ok_or_else(|| InsightError::Unknown(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_derives_remaining_counts() {
        let counts = OverviewCounts::derive(100, 15, 38).expect("valid counts");
        assert_eq!(counts.not_placed, 85);
        assert_eq!(counts.not_ready, 47);
    }

    #[test]
    fn overview_of_empty_corpus_is_all_zero() {
        let counts = OverviewCounts::derive(0, 0, 0).expect("valid counts");
        assert_eq!(counts.not_placed, 0);
        assert_eq!(counts.not_ready, 0);
    }

    #[test]
    fn overview_rejects_counts_that_would_go_negative() {
        assert!(OverviewCounts::derive(10, 11, 0).is_err());
        let err = OverviewCounts::derive(10, 6, 5).expect_err("ready overflows");
        assert_eq!(
            err,
            OverviewError::TaxonomyViolation {
                total: 10,
                placed: 6,
                ready: 5
            }
        );
    }

    #[test]
    fn criteria_accepts_bounds_inclusive() {
        let filter = CriteriaFilter::new("DevOps", 1, 10, 100).expect("valid");
        assert_eq!(filter.course, Course::DevOps);
        assert!(CriteriaFilter::new("DevOps", 600, 1, 1).is_ok());
    }

    #[test]
    fn criteria_rejects_out_of_range_thresholds() {
        let err = CriteriaFilter::new("DevOps", 601, 5, 60).expect_err("too many problems");
        assert!(matches!(
            err,
            CriteriaError::OutOfRange {
                field: "min_problems",
                value: 601,
                ..
            }
        ));
        assert!(CriteriaFilter::new("DevOps", 100, 0, 60).is_err());
        assert!(CriteriaFilter::new("DevOps", 100, 5, 101).is_err());
        assert!(CriteriaFilter::new("DevOps", -1, 5, 60).is_err());
    }

    #[test]
    fn criteria_rejects_unknown_course() {
        let err = CriteriaFilter::new("Pottery", 100, 5, 60).expect_err("unknown course");
        assert!(matches!(err, CriteriaError::Catalog(_)));
    }

    #[test]
    fn insight_slugs_round_trip() {
        for insight in Insight::ALL {
            assert_eq!(insight.slug().parse(), Ok(insight));
        }
        assert!("nope".parse::<Insight>().is_err());
    }

    #[test]
    fn insight_params_fall_back_to_defaults() {
        assert_eq!(Insight::TopReady.resolve_param(None), Ok(Some(5)));
        assert_eq!(Insight::TopPackages.resolve_param(Some(3)), Ok(Some(3)));
        assert_eq!(Insight::FullProfile.resolve_param(None), Ok(None));
        assert_eq!(
            Insight::FullProfile.resolve_param(Some(1)),
            Err(InsightError::ParameterNotSupported("full-profile"))
        );
    }
}
