//! Axum route handlers for the Charts API.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::charts::score::ScoreRange;
use crate::charts::service::{
    load_chart, load_episode_count, load_score_range, load_show, ChartRequest,
};
use crate::charts::time_window::{
    can_step_forward, compute_range, format_range_label, step_window, DateRange, Direction,
    TimeWindow,
};
use crate::charts::view::{render_dashboard, render_show, DashboardState, DashboardView, ShowView};
use crate::errors::AppError;
use crate::models::episode::Region;
use crate::state::AppState;

/// Upper bound on `limit`, matching the show page's per-region fetch.
const MAX_LIMIT: i64 = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    pub region: Option<String>,
    pub window: Option<String>,
    pub date: Option<String>,
    pub limit: Option<String>,
    pub q: Option<String>,
    pub expanded: Option<String>,
    /// `prev` or `next`, applied to `date` before loading.
    pub step: Option<String>,
    /// Episode id whose expansion flips before rendering.
    pub toggle: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowParams {
    pub expanded: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StepParams {
    pub window: Option<String>,
    pub date: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub date: NaiveDate,
    pub range: DateRange,
    pub label: String,
    /// False when a forward step would land after today.
    pub allowed: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/charts
///
/// Ranked episodes for a region and time window, with labels and navigation.
/// `step` and `toggle` apply one user action to the submitted selection.
pub async fn handle_get_chart(
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> Result<Json<DashboardView>, AppError> {
    let today = Utc::now().date_naive();
    let region = parse_region(params.region.as_deref())?;
    let time_window = parse_window(params.window.as_deref())?;
    let reference_date = parse_date(params.date.as_deref(), today)?;
    let limit = parse_limit(params.limit.as_deref(), state.config.default_limit)?;

    let mut dashboard = DashboardState::new(region, time_window, reference_date);
    dashboard.search = params.q.filter(|q| !q.trim().is_empty());
    dashboard.expanded = parse_expanded(params.expanded.as_deref())?;
    if let Some(raw) = params.step.as_deref() {
        let direction = raw.parse::<Direction>().map_err(AppError::Validation)?;
        dashboard = dashboard.navigate(direction, today);
    }
    if let Some(episode_id) = parse_episode_id(params.toggle.as_deref(), "toggle")? {
        dashboard = dashboard.toggle_expanded(episode_id);
    }

    let strategy = state.config.score_strategy;
    let request = ChartRequest {
        region,
        time_window,
        reference_date: dashboard.reference_date,
        limit,
    };
    let chart = load_chart(state.repo.as_ref(), strategy, &request).await;
    let score_range = resolve_score_range(&state).await;

    Ok(Json(render_dashboard(
        &dashboard,
        &chart,
        strategy,
        score_range.as_ref(),
        today,
    )))
}

/// GET /api/v1/charts/count
pub async fn handle_get_count(
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> Result<Json<CountResponse>, AppError> {
    let today = Utc::now().date_naive();
    let region = parse_region(params.region.as_deref())?;
    let time_window = parse_window(params.window.as_deref())?;
    let reference_date = parse_date(params.date.as_deref(), today)?;

    let count = load_episode_count(state.repo.as_ref(), region, time_window, reference_date).await;
    Ok(Json(CountResponse { count }))
}

/// GET /api/v1/scores/range
///
/// Global score range, or the fallback range when it cannot be loaded.
pub async fn handle_get_score_range(State(state): State<AppState>) -> Json<ScoreRange> {
    Json(load_score_range(state.repo.as_ref()).await)
}

/// GET /api/v1/shows/:show_id
///
/// The path segment arrives percent-decoded from the extractor.
pub async fn handle_get_show(
    State(state): State<AppState>,
    Path(show_id): Path<String>,
    Query(params): Query<ShowParams>,
) -> Result<Json<ShowView>, AppError> {
    let expanded = parse_expanded(params.expanded.as_deref())?;
    let strategy = state.config.score_strategy;

    let show = load_show(state.repo.as_ref(), strategy, &show_id).await;
    if show.error.is_none() && show.episodes.is_empty() {
        return Err(AppError::NotFound(format!("Show {show_id} not found")));
    }
    let score_range = resolve_score_range(&state).await;

    Ok(Json(render_show(
        &show_id,
        &show,
        strategy,
        score_range.as_ref(),
        &expanded,
    )))
}

/// GET /api/v1/time-window/step
///
/// Steps a reference date by one window. Blocked forward steps return the
/// original date with `allowed: false`.
pub async fn handle_step_window(
    Query(params): Query<StepParams>,
) -> Result<Json<StepResponse>, AppError> {
    let today = Utc::now().date_naive();
    let time_window = parse_window(params.window.as_deref())?;
    let reference_date = parse_date(params.date.as_deref(), today)?;
    let direction = match params.direction.as_deref() {
        Some(raw) => raw.parse::<Direction>().map_err(AppError::Validation)?,
        None => return Err(AppError::Validation("direction is required".to_string())),
    };

    let allowed = match direction {
        Direction::Prev => time_window != TimeWindow::All,
        Direction::Next => can_step_forward(reference_date, time_window, today),
    };
    let date = if allowed {
        step_window(reference_date, time_window, direction)
    } else {
        reference_date
    };
    let range = compute_range(time_window, date);

    Ok(Json(StepResponse {
        date,
        label: format_range_label(&range, time_window, Some(date)),
        range,
        allowed,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn resolve_score_range(state: &AppState) -> Option<ScoreRange> {
    if state.config.score_strategy.needs_score_range() {
        Some(load_score_range(state.repo.as_ref()).await)
    } else {
        None
    }
}

fn parse_region(raw: Option<&str>) -> Result<Region, AppError> {
    match raw {
        Some(raw) => raw
            .parse::<Region>()
            .map_err(|e| AppError::Validation(e.to_string())),
        None => Ok(Region::Se),
    }
}

fn parse_window(raw: Option<&str>) -> Result<TimeWindow, AppError> {
    match raw {
        Some(raw) => raw.parse::<TimeWindow>().map_err(AppError::Validation),
        None => Ok(TimeWindow::Week),
    }
}

fn parse_date(raw: Option<&str>, today: NaiveDate) -> Result<NaiveDate, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("date '{raw}' must be YYYY-MM-DD"))),
        None => Ok(today),
    }
}

/// Row limit clamped to `1..=MAX_LIMIT`.
fn parse_limit(raw: Option<&str>, default_limit: i64) -> Result<i64, AppError> {
    let limit = match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("limit '{raw}' is not a number")))?,
        None => default_limit,
    };
    Ok(limit.clamp(1, MAX_LIMIT))
}

fn parse_episode_id(raw: Option<&str>, field: &str) -> Result<Option<i64>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{field} id '{raw}' is not a number"))),
        None => Ok(None),
    }
}

/// Parses a comma-separated list of episode ids.
fn parse_expanded(raw: Option<&str>) -> Result<BTreeSet<i64>, AppError> {
    let Some(raw) = raw else {
        return Ok(BTreeSet::new());
    };
    raw.split(',')
        .filter_map(|s| parse_episode_id(Some(s), "expanded").transpose())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
        assert_eq!(parse_region(None).unwrap(), Region::Se);
        assert_eq!(parse_window(None).unwrap(), TimeWindow::Week);
        assert_eq!(parse_date(None, today).unwrap(), today);
        assert_eq!(parse_date(Some(" "), today).unwrap(), today);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
        assert!(matches!(parse_region(Some("dk")), Err(AppError::Validation(_))));
        assert!(matches!(parse_window(Some("day")), Err(AppError::Validation(_))));
        assert!(matches!(
            parse_date(Some("15/12/2024"), today),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_expanded(Some("1,x")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_limit_and_toggle() {
        assert_eq!(parse_limit(None, 25).unwrap(), 25);
        assert_eq!(parse_limit(Some("0"), 25).unwrap(), 1);
        assert_eq!(parse_limit(Some("5000"), 25).unwrap(), MAX_LIMIT);
        assert!(matches!(parse_limit(Some("abc"), 25), Err(AppError::Validation(_))));
        assert_eq!(parse_episode_id(Some(" 3 "), "toggle").unwrap(), Some(3));
        assert_eq!(parse_episode_id(None, "toggle").unwrap(), None);
        assert!(matches!(
            parse_episode_id(Some("x"), "toggle"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_expanded_list() {
        let ids = parse_expanded(Some("3, 1,,3")).unwrap();
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec![1, 3]);
        assert!(parse_expanded(None).unwrap().is_empty());
    }
}
