//! View models for the dashboard and show pages.
//!
//! Selection state travels as an explicit `DashboardState` value and every
//! render function here is pure: same state and rows in, same view out.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::charts::score::{ScoreRange, ScoreStrategy};
use crate::charts::service::{show_id_of, ChartResult, ShowResult};
use crate::charts::text::{exceeds, truncate, DESCRIPTION_LIMIT};
use crate::charts::time_window::{
    can_step_forward, compute_range_at, format_range_label, format_span_label, step_window,
    DateRange, Direction, TimeWindow,
};
use crate::models::episode::{Episode, Region};

/// Everything the user has selected on the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub region: Region,
    pub time_window: TimeWindow,
    pub reference_date: NaiveDate,
    pub search: Option<String>,
    /// Episode ids whose description is shown in full.
    pub expanded: BTreeSet<i64>,
}

impl DashboardState {
    pub fn new(region: Region, time_window: TimeWindow, reference_date: NaiveDate) -> Self {
        Self {
            region,
            time_window,
            reference_date,
            search: None,
            expanded: BTreeSet::new(),
        }
    }

    /// Steps the reference date; blocked forward steps leave the state as is.
    pub fn navigate(&self, direction: Direction, today: NaiveDate) -> Self {
        if direction == Direction::Next
            && !can_step_forward(self.reference_date, self.time_window, today)
        {
            return self.clone();
        }
        Self {
            reference_date: step_window(self.reference_date, self.time_window, direction),
            ..self.clone()
        }
    }

    /// Flips one episode between truncated and full description.
    pub fn toggle_expanded(&self, episode_id: i64) -> Self {
        let mut expanded = self.expanded.clone();
        if !expanded.remove(&episode_id) {
            expanded.insert(episode_id);
        }
        Self {
            expanded,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EpisodeCard {
    pub rank: usize,
    pub id: i64,
    pub episode_name: String,
    pub show_name: String,
    pub show_id: String,
    pub display_score: f64,
    pub first_appearance: String,
    pub region: Region,
    pub region_label: &'static str,
    pub show_description: String,
    pub episode_description: Option<String>,
    pub expandable: bool,
    pub expanded: bool,
    pub episode_duration: Option<i64>,
    pub episode_url: String,
    pub show_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub region: Region,
    pub region_label: &'static str,
    pub time_window: TimeWindow,
    pub time_window_label: &'static str,
    pub reference_date: NaiveDate,
    pub range: DateRange,
    pub range_label: String,
    pub range_span: String,
    pub can_navigate: bool,
    pub previous_date: Option<NaiveDate>,
    pub next_date: Option<NaiveDate>,
    pub score_strategy: ScoreStrategy,
    pub total: usize,
    pub episodes: Vec<EpisodeCard>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowView {
    pub show_id: String,
    pub show_uri: String,
    pub show_name: Option<String>,
    pub show_description: Option<String>,
    pub score_strategy: ScoreStrategy,
    pub total: usize,
    pub episodes: Vec<EpisodeCard>,
    pub error: Option<String>,
}

/// "Dec 15, 2024".
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Case-insensitive substring match on episode or show name.
pub fn matches_search(episode: &Episode, search: Option<&str>) -> bool {
    let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    episode.episode_name.to_lowercase().contains(&needle)
        || episode.show_name.to_lowercase().contains(&needle)
}

/// Numbers already-ordered rows and applies the display transform.
pub fn build_cards(
    episodes: &[Episode],
    strategy: ScoreStrategy,
    score_range: Option<&ScoreRange>,
    expanded: &BTreeSet<i64>,
) -> Vec<EpisodeCard> {
    episodes
        .iter()
        .enumerate()
        .map(|(index, episode)| {
            let is_expanded = expanded.contains(&episode.id);
            let expandable = episode
                .episode_description
                .as_deref()
                .is_some_and(|d| exceeds(d, DESCRIPTION_LIMIT));
            let episode_description = episode.episode_description.as_deref().map(|d| {
                if is_expanded {
                    d.to_string()
                } else {
                    truncate(d, DESCRIPTION_LIMIT)
                }
            });
            EpisodeCard {
                rank: index + 1,
                id: episode.id,
                episode_name: episode.episode_name.clone(),
                show_name: episode.show_name.clone(),
                show_id: show_id_of(&episode.show_uri).to_string(),
                display_score: strategy.display_score(episode.score, score_range),
                first_appearance: format_display_date(episode.first_appearance_date),
                region: episode.region,
                region_label: episode.region.label(),
                show_description: episode.show_description.clone(),
                episode_description,
                expandable,
                expanded: is_expanded,
                episode_duration: episode.episode_duration,
                episode_url: episode.episode_uri.clone(),
                show_url: episode.show_uri.clone(),
            }
        })
        .collect()
}

pub fn render_dashboard(
    state: &DashboardState,
    chart: &ChartResult,
    strategy: ScoreStrategy,
    score_range: Option<&ScoreRange>,
    today: NaiveDate,
) -> DashboardView {
    let window = state.time_window;
    let range = compute_range_at(window, state.reference_date, today);
    let can_navigate = window != TimeWindow::All;

    let visible: Vec<Episode> = chart
        .episodes
        .iter()
        .filter(|e| matches_search(e, state.search.as_deref()))
        .cloned()
        .collect();
    let episodes = build_cards(&visible, strategy, score_range, &state.expanded);

    DashboardView {
        region: state.region,
        region_label: state.region.label(),
        time_window: window,
        time_window_label: window.label(),
        reference_date: state.reference_date,
        range,
        range_label: format_range_label(&range, window, Some(state.reference_date)),
        range_span: format_span_label(&range, window),
        can_navigate,
        previous_date: can_navigate
            .then(|| step_window(state.reference_date, window, Direction::Prev)),
        next_date: can_step_forward(state.reference_date, window, today)
            .then(|| step_window(state.reference_date, window, Direction::Next)),
        score_strategy: strategy,
        total: episodes.len(),
        episodes,
        error: chart.error.clone(),
    }
}

pub fn render_show(
    show_id: &str,
    show: &ShowResult,
    strategy: ScoreStrategy,
    score_range: Option<&ScoreRange>,
    expanded: &BTreeSet<i64>,
) -> ShowView {
    let first = show.episodes.first();
    let episodes = build_cards(&show.episodes, strategy, score_range, expanded);
    ShowView {
        show_id: show_id.to_string(),
        show_uri: show.show_uri.clone(),
        show_name: first.map(|e| e.show_name.clone()),
        show_description: first.map(|e| e.show_description.clone()),
        score_strategy: strategy,
        total: episodes.len(),
        episodes,
        error: show.error.clone(),
    }
}
