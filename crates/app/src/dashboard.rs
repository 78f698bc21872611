use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Datelike;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use placement_core::dashboard::{CriteriaError, CriteriaFilter, Insight, InsightError, OverviewCounts};
use placement_core::types::{CatalogError, Course};
use placement_storage::dashboard::{CandidateRow, PlacedStudentRow, ReadyStudentRow};
use placement_storage::{DashboardError, InsightRows};

use crate::problem::ProblemResponse;
use crate::router::AppState;

const NO_PLACED_MESSAGE: &str = "No students placed for the selected course.";
const NO_READY_MESSAGE: &str = "No students in Ready state for the selected course.";
const NO_CANDIDATES_MESSAGE: &str = "No students matched the given criteria.";
const NO_INSIGHT_ROWS_MESSAGE: &str = "No rows for the selected insight.";

/// Rows of one view plus an explicit empty-state marker.
#[derive(Debug, Serialize)]
pub struct Table<T> {
    pub count: usize,
    pub empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub rows: T,
}

impl<T> Table<T> {
    fn new(rows: T, count: usize, empty_message: &'static str) -> Self {
        Self {
            count,
            empty: count == 0,
            message: (count == 0).then_some(empty_message),
            rows,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseEntry {
    pub name: Course,
    pub tools: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
pub struct CourseQuery {
    course: String,
}

#[derive(Debug, Deserialize)]
pub struct CriteriaQuery {
    course: String,
    #[serde(default)]
    min_problems: Option<i64>,
    #[serde(default)]
    min_projects: Option<i64>,
    #[serde(default)]
    min_soft_skill: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CriteriaResponse {
    pub filter: CriteriaFilter,
    #[serde(flatten)]
    pub table: Table<Vec<CandidateRow>>,
}

#[derive(Debug, Serialize)]
pub struct InsightEntry {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_param: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct InsightQuery {
    #[serde(default)]
    n: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct InsightResponse {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<u32>,
    #[serde(flatten)]
    pub table: Table<InsightRows>,
}

pub async fn list_courses() -> Json<Vec<CourseEntry>> {
    Json(
        Course::ALL
            .into_iter()
            .map(|course| CourseEntry {
                name: course,
                tools: course.tools(),
            })
            .collect(),
    )
}

pub async fn overview(State(state): State<AppState>) -> Result<Json<OverviewCounts>, ProblemResponse> {
    let counts = state
        .storage()
        .dashboard()
        .overview()
        .await
        .map_err(|err| storage_failure("overview", err))?;

    record("overview", "ok");
    Ok(Json(counts))
}

pub async fn placed_students(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Result<Json<Table<Vec<PlacedStudentRow>>>, ProblemResponse> {
    let course = parse_course("overview.placed", query)?;
    let rows = state
        .storage()
        .dashboard()
        .placed_students(course)
        .await
        .map_err(|err| storage_failure("overview.placed", err))?;

    record("overview.placed", if rows.is_empty() { "empty" } else { "ok" });
    let count = rows.len();
    Ok(Json(Table::new(rows, count, NO_PLACED_MESSAGE)))
}

pub async fn ready_students(
    State(state): State<AppState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Result<Json<Table<Vec<ReadyStudentRow>>>, ProblemResponse> {
    let course = parse_course("overview.ready", query)?;
    let rows = state
        .storage()
        .dashboard()
        .ready_students(course)
        .await
        .map_err(|err| storage_failure("overview.ready", err))?;

    record("overview.ready", if rows.is_empty() { "empty" } else { "ok" });
    let count = rows.len();
    Ok(Json(Table::new(rows, count, NO_READY_MESSAGE)))
}

pub async fn criteria(
    State(state): State<AppState>,
    query: Result<Query<CriteriaQuery>, QueryRejection>,
) -> Result<Json<CriteriaResponse>, ProblemResponse> {
    let Query(query) = query.map_err(|rejection| {
        record("criteria", "rejected");
        ProblemResponse::bad_request("invalid_query", rejection.body_text())
    })?;

    let filter = CriteriaFilter::new(
        &query.course,
        query
            .min_problems
            .unwrap_or(i64::from(CriteriaFilter::DEFAULT_MIN_PROBLEMS)),
        query
            .min_projects
            .unwrap_or(i64::from(CriteriaFilter::DEFAULT_MIN_PROJECTS)),
        query
            .min_soft_skill
            .unwrap_or(i64::from(CriteriaFilter::DEFAULT_MIN_SOFT_SKILL)),
    )
    .map_err(|err| {
        record("criteria", "rejected");
        match err {
            CriteriaError::OutOfRange { .. } => {
                ProblemResponse::bad_request("threshold_out_of_range", err.to_string())
            }
            CriteriaError::Catalog(_) => {
                ProblemResponse::bad_request("unknown_course", err.to_string())
            }
        }
    })?;

    let rows = state
        .storage()
        .dashboard()
        .candidates(&filter)
        .await
        .map_err(|err| storage_failure("criteria", err))?;

    info!(
        stage = "dashboard",
        course = %filter.course,
        min_problems = filter.min_problems,
        min_projects = filter.min_projects,
        min_soft_skill = filter.min_soft_skill,
        matched = rows.len(),
        "criteria filter evaluated"
    );
    record("criteria", if rows.is_empty() { "empty" } else { "ok" });
    let count = rows.len();
    Ok(Json(CriteriaResponse {
        filter,
        table: Table::new(rows, count, NO_CANDIDATES_MESSAGE),
    }))
}

pub async fn list_insights() -> Json<Vec<InsightEntry>> {
    Json(
        Insight::ALL
            .into_iter()
            .map(|insight| InsightEntry {
                name: insight.slug(),
                title: insight.title(),
                default_param: insight.default_param(),
            })
            .collect(),
    )
}

pub async fn run_insight(
    State(state): State<AppState>,
    Path(name): Path<String>,
    query: Result<Query<InsightQuery>, QueryRejection>,
) -> Result<Json<InsightResponse>, ProblemResponse> {
    let Query(query) = query.map_err(|rejection| {
        record("insight", "rejected");
        ProblemResponse::bad_request("invalid_query", rejection.body_text())
    })?;

    let insight: Insight = name.parse().map_err(|err: InsightError| {
        record("insight", "rejected");
        ProblemResponse::new(StatusCode::NOT_FOUND, "unknown_insight", err.to_string())
    })?;
    let param = insight.resolve_param(query.n).map_err(|err| {
        record("insight", "rejected");
        ProblemResponse::bad_request("unsupported_parameter", err.to_string())
    })?;

    let rows = state
        .storage()
        .dashboard()
        .insight(insight, param, state.now().year())
        .await
        .map_err(|err| storage_failure("insight", err))?;

    record("insight", if rows.is_empty() { "empty" } else { "ok" });
    let count = rows.len();
    Ok(Json(InsightResponse {
        name: insight.slug(),
        title: insight.title(),
        param,
        table: Table::new(rows, count, NO_INSIGHT_ROWS_MESSAGE),
    }))
}

fn parse_course(
    view: &'static str,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Result<Course, ProblemResponse> {
    let Query(query) = query.map_err(|rejection| {
        record(view, "rejected");
        ProblemResponse::bad_request("invalid_query", rejection.body_text())
    })?;

    query.course.parse().map_err(|err: CatalogError| {
        record(view, "rejected");
        ProblemResponse::bad_request("unknown_course", err.to_string())
    })
}

fn storage_failure(view: &'static str, err: DashboardError) -> ProblemResponse {
    record(view, "error");
    match err {
        DashboardError::Overview(violation) => {
            error!(stage = "dashboard", view, error = %violation, "placement status taxonomy violated");
            ProblemResponse::internal("stored placement statuses are inconsistent")
        }
        DashboardError::Database(err) => {
            error!(stage = "dashboard", view, error = %err, "dashboard query failed");
            ProblemResponse::internal("failed to query the placement store")
        }
    }
}

fn record(view: &'static str, result: &'static str) {
    counter!("dashboard_requests_total", "view" => view, "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::Value;

    use super::*;
    use crate::router::app_router;
    use crate::router::test_support::{get_text, setup_state};
    use placement_core::dashboard::OverviewError;
    use placement_core::RecordGenerator;

    async fn seeded_state(count: usize) -> (AppState, tempfile::TempDir) {
        let (state, dir) = setup_state().await;
        let reference = NaiveDate::from_ymd_opt(2025, 4, 1).expect("valid date");
        let records = RecordGenerator::seeded(7, reference)
            .generate(count)
            .expect("generate");
        state
            .storage()
            .students()
            .insert_batch(&records)
            .await
            .expect("seed corpus");
        (state, dir)
    }

    fn json(body: &str) -> Value {
        serde_json::from_str(body).expect("valid json")
    }

    #[tokio::test]
    async fn overview_reports_consistent_counts() {
        let (state, _dir) = seeded_state(150).await;
        let (status, _, body) = get_text(app_router(state), "/api/overview").await;

        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        let total = value["total_students"].as_u64().expect("total");
        let placed = value["placed"].as_u64().expect("placed");
        let ready = value["ready"].as_u64().expect("ready");
        assert_eq!(total, 150);
        assert_eq!(value["not_placed"].as_u64(), Some(total - placed));
        assert_eq!(value["not_ready"].as_u64(), Some(total - placed - ready));
    }

    #[tokio::test]
    async fn courses_lists_the_fixed_catalog() {
        let (state, _dir) = setup_state().await;
        let (status, _, body) = get_text(app_router(state), "/api/courses").await;

        assert_eq!(status, StatusCode::OK);
        let courses = json(&body);
        let courses = courses.as_array().expect("array");
        assert_eq!(courses.len(), 7);
        assert_eq!(courses[3]["name"], "UI/UX");
        assert_eq!(courses[3]["tools"][2], "Figma");
    }

    #[tokio::test]
    async fn placed_listing_requires_known_course() {
        let (state, _dir) = seeded_state(20).await;
        let (status, content_type, body) =
            get_text(app_router(state), "/api/overview/placed?course=Pottery").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type, "application/problem+json");
        assert_eq!(json(&body)["type"], "unknown_course");
    }

    #[tokio::test]
    async fn empty_listing_is_an_explicit_state() {
        let (state, _dir) = setup_state().await;
        let (status, _, body) =
            get_text(app_router(state), "/api/overview/ready?course=DevOps").await;

        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["empty"], true);
        assert_eq!(value["count"], 0);
        assert_eq!(value["message"], NO_READY_MESSAGE);
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn criteria_never_returns_placed_students() {
        let (state, _dir) = seeded_state(300).await;
        let (status, _, body) = get_text(
            app_router(state),
            "/api/criteria?course=Data%20Science&min_problems=1&min_projects=1&min_soft_skill=1",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["filter"]["course"], "Data Science");
        let rows = value["rows"].as_array().expect("rows");
        assert!(!rows.is_empty());
        for row in rows {
            assert_ne!(row["placement_status"], "Placed");
            assert_eq!(row["course_batch"], "Data Science");
        }
    }

    #[tokio::test]
    async fn criteria_applies_default_thresholds() {
        let (state, _dir) = seeded_state(50).await;
        let (status, _, body) =
            get_text(app_router(state), "/api/criteria?course=DevOps").await;

        assert_eq!(status, StatusCode::OK);
        let filter = &json(&body)["filter"];
        assert_eq!(filter["min_problems"], 150);
        assert_eq!(filter["min_projects"], 5);
        assert_eq!(filter["min_soft_skill"], 60);
    }

    #[tokio::test]
    async fn criteria_rejects_out_of_range_thresholds() {
        let (state, _dir) = seeded_state(10).await;
        let app = app_router(state);

        for uri in [
            "/api/criteria?course=DevOps&min_problems=0",
            "/api/criteria?course=DevOps&min_problems=601",
            "/api/criteria?course=DevOps&min_projects=11",
            "/api/criteria?course=DevOps&min_soft_skill=101",
        ] {
            let (status, content_type, body) = get_text(app.clone(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(content_type, "application/problem+json");
            assert_eq!(json(&body)["type"], "threshold_out_of_range");
        }
    }

    #[tokio::test]
    async fn criteria_rejects_non_numeric_threshold() {
        let (state, _dir) = seeded_state(10).await;
        let (status, _, body) = get_text(
            app_router(state),
            "/api/criteria?course=DevOps&min_problems=lots",
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["type"], "invalid_query");
    }

    #[tokio::test]
    async fn criteria_without_matches_reports_no_results() {
        let (state, _dir) = setup_state().await;
        let (status, _, body) = get_text(
            app_router(state),
            "/api/criteria?course=DevOps&min_problems=600&min_projects=10&min_soft_skill=100",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["empty"], true);
        assert_eq!(value["message"], NO_CANDIDATES_MESSAGE);
    }

    #[tokio::test]
    async fn insights_menu_lists_every_query() {
        let (state, _dir) = setup_state().await;
        let (status, _, body) = get_text(app_router(state), "/api/insights").await;

        assert_eq!(status, StatusCode::OK);
        let menu = json(&body);
        let menu = menu.as_array().expect("array");
        assert_eq!(menu.len(), Insight::ALL.len());
        assert_eq!(menu[0]["name"], "top-ready");
        assert_eq!(menu[0]["default_param"], 5);
    }

    #[tokio::test]
    async fn insight_honours_limit_parameter() {
        let (state, _dir) = seeded_state(100).await;
        let (status, _, body) =
            get_text(app_router(state), "/api/insights/top-mock-interview?n=3").await;

        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["param"], 3);
        assert_eq!(value["count"], 3);
        assert_eq!(value["rows"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn graduating_this_year_uses_dashboard_clock() {
        let (state, _dir) = seeded_state(100).await;
        let fixed = Utc.with_ymd_and_hms(2031, 1, 15, 0, 0, 0).unwrap();
        let state = state.with_clock(Arc::new(move || fixed));

        let (status, _, body) =
            get_text(app_router(state), "/api/insights/graduating-this-year").await;

        assert_eq!(status, StatusCode::OK);
        let value = json(&body);
        assert_eq!(value["empty"], true);
        assert_eq!(value["message"], NO_INSIGHT_ROWS_MESSAGE);
    }

    #[tokio::test]
    async fn unknown_insight_is_not_found() {
        let (state, _dir) = setup_state().await;
        let (status, content_type, body) =
            get_text(app_router(state), "/api/insights/best-haircut").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(content_type, "application/problem+json");
        assert_eq!(json(&body)["type"], "unknown_insight");
    }

    #[tokio::test]
    async fn parameter_on_fixed_insight_is_rejected() {
        let (state, _dir) = setup_state().await;
        let (status, _, body) =
            get_text(app_router(state), "/api/insights/full-profile?n=2").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["type"], "unsupported_parameter");
    }

    #[test]
    fn taxonomy_violation_maps_to_internal_error() {
        let violation = OverviewError::TaxonomyViolation {
            total: 3,
            placed: 2,
            ready: 2,
        };
        let problem = storage_failure("overview", DashboardError::Overview(violation));
        assert_eq!(problem.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
