//! Chart loading: turns a region/window/date selection into fetched rows.
//!
//! Fetch failures never escalate past this layer: they are logged and
//! replaced with an empty result plus a user-facing message. One attempt per
//! request, no retries.

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::charts::repository::{EpisodeQuery, EpisodeRepository};
use crate::charts::score::{ScoreRange, ScoreStrategy};
use crate::charts::time_window::{compute_range, DateRange, TimeWindow};
use crate::models::episode::{Episode, Region};

pub const CHART_LOAD_ERROR: &str = "Failed to load episodes. Please try again.";
pub const SHOW_LOAD_ERROR: &str = "Failed to load podcast episodes. Please try again.";

/// Row limit per region when collecting a show's episodes.
pub const SHOW_FETCH_LIMIT: i64 = 1000;

const SHOW_URI_PREFIX: &str = "spotify:show:";

#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub region: Region,
    pub time_window: TimeWindow,
    pub reference_date: NaiveDate,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct ChartResult {
    pub episodes: Vec<Episode>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ShowResult {
    pub show_uri: String,
    pub episodes: Vec<Episode>,
    pub error: Option<String>,
}

/// Date filter for a window; `all` is not filtered at all.
pub fn query_range(time_window: TimeWindow, reference_date: NaiveDate) -> Option<DateRange> {
    (time_window != TimeWindow::All).then(|| compute_range(time_window, reference_date))
}

pub async fn load_chart(
    repo: &dyn EpisodeRepository,
    strategy: ScoreStrategy,
    request: &ChartRequest,
) -> ChartResult {
    let query = EpisodeQuery {
        region: request.region,
        range: query_range(request.time_window, request.reference_date),
        order: strategy.sort_order(),
        limit: request.limit,
    };

    match repo.top_episodes(&query).await {
        Ok(episodes) => {
            info!(
                "Loaded {} {} episodes for {} window at {}",
                episodes.len(),
                request.region,
                request.time_window,
                request.reference_date
            );
            ChartResult {
                episodes,
                error: None,
            }
        }
        Err(e) => {
            error!("Error fetching episodes: {e}");
            ChartResult {
                episodes: Vec::new(),
                error: Some(CHART_LOAD_ERROR.to_string()),
            }
        }
    }
}

/// Number of episodes matching a selection; `0` when the count fails.
pub async fn load_episode_count(
    repo: &dyn EpisodeRepository,
    region: Region,
    time_window: TimeWindow,
    reference_date: NaiveDate,
) -> i64 {
    match repo
        .episode_count(region, query_range(time_window, reference_date))
        .await
    {
        Ok(count) => count,
        Err(e) => {
            error!("Error getting episode count: {e}");
            0
        }
    }
}

/// Global score range, or [`ScoreRange::FALLBACK`] when unavailable.
pub async fn load_score_range(repo: &dyn EpisodeRepository) -> ScoreRange {
    match repo.score_range().await {
        Ok(Some(range)) => range,
        Ok(None) => {
            warn!("No scores stored yet, using fallback score range");
            ScoreRange::FALLBACK
        }
        Err(e) => {
            error!("Error fetching score range: {e}");
            ScoreRange::FALLBACK
        }
    }
}

/// Accepts a bare show id or a full `spotify:show:` URI.
pub fn show_uri_for(show_id: &str) -> String {
    if show_id.starts_with(SHOW_URI_PREFIX) {
        show_id.to_string()
    } else {
        format!("{SHOW_URI_PREFIX}{show_id}")
    }
}

/// Inverse of [`show_uri_for`] for building links.
pub fn show_id_of(show_uri: &str) -> &str {
    show_uri.strip_prefix(SHOW_URI_PREFIX).unwrap_or(show_uri)
}

/// All charting episodes of one show across every region, best first.
pub async fn load_show(
    repo: &dyn EpisodeRepository,
    strategy: ScoreStrategy,
    show_id: &str,
) -> ShowResult {
    let show_uri = show_uri_for(show_id);
    let queries: Vec<EpisodeQuery> = Region::ALL
        .iter()
        .map(|&region| EpisodeQuery {
            region,
            range: None,
            order: strategy.sort_order(),
            limit: SHOW_FETCH_LIMIT,
        })
        .collect();

    let (se, us) = tokio::join!(repo.top_episodes(&queries[0]), repo.top_episodes(&queries[1]));

    let fetched = match (se, us) {
        (Ok(mut se), Ok(us)) => {
            se.extend(us);
            se
        }
        (Err(e), _) | (_, Err(e)) => {
            error!("Failed to fetch podcast episodes for {show_uri}: {e}");
            return ShowResult {
                show_uri,
                episodes: Vec::new(),
                error: Some(SHOW_LOAD_ERROR.to_string()),
            };
        }
    };

    let mut episodes: Vec<Episode> = fetched
        .into_iter()
        .filter(|e| e.show_uri == show_uri)
        .collect();
    episodes.sort_by(|a, b| strategy.rank_cmp(a.score, b.score).then(a.id.cmp(&b.id)));

    info!("Loaded {} episodes for show {show_uri}", episodes.len());
    ShowResult {
        show_uri,
        episodes,
        error: None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::charts::repository::MemoryEpisodeRepository;
    use crate::errors::AppError;

    /// Repository whose every call fails like an unreachable database.
    pub(crate) struct FailingRepository;

    #[async_trait]
    impl EpisodeRepository for FailingRepository {
        async fn top_episodes(&self, _query: &EpisodeQuery) -> Result<Vec<Episode>, AppError> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn episode_count(
            &self,
            _region: Region,
            _range: Option<DateRange>,
        ) -> Result<i64, AppError> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }

        async fn score_range(&self) -> Result<Option<ScoreRange>, AppError> {
            Err(AppError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(region: Region, time_window: TimeWindow, reference_date: NaiveDate) -> ChartRequest {
        ChartRequest {
            region,
            time_window,
            reference_date,
            limit: 25,
        }
    }

    #[test]
    fn test_all_window_has_no_date_filter() {
        assert!(query_range(TimeWindow::All, date(2024, 1, 1)).is_none());
        assert!(query_range(TimeWindow::Week, date(2024, 1, 1)).is_some());
    }

    #[tokio::test]
    async fn test_load_chart_orders_by_strategy() {
        let repo = MemoryEpisodeRepository::with_sample_data();
        let req = request(Region::Us, TimeWindow::Quarter, date(2024, 2, 14));

        let raw = load_chart(&repo, ScoreStrategy::Raw, &req).await;
        let ids: Vec<i64> = raw.episodes.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![8, 10, 7, 9, 6]);

        let inverted = load_chart(&repo, ScoreStrategy::Inverted, &req).await;
        let ids: Vec<i64> = inverted.episodes.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![6, 9, 7, 10, 8]);
        assert!(inverted.error.is_none());
    }

    #[tokio::test]
    async fn test_week_scenario_for_sweden() {
        let repo = MemoryEpisodeRepository::with_sample_data();
        // Week of Monday 2024-11-25 through Sunday 2024-12-01.
        let req = request(Region::Se, TimeWindow::Week, date(2024, 12, 1));
        let result = load_chart(&repo, ScoreStrategy::Raw, &req).await;
        assert_eq!(result.episodes.len(), 1);
        assert_eq!(result.episodes[0].id, 11);

        let empty = load_chart(
            &repo,
            ScoreStrategy::Raw,
            &request(Region::Se, TimeWindow::Week, date(2024, 12, 15)),
        )
        .await;
        assert!(empty.episodes.is_empty());
        assert!(empty.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_recovers_locally() {
        let req = request(Region::Se, TimeWindow::Month, date(2024, 1, 1));
        let result = load_chart(&FailingRepository, ScoreStrategy::Raw, &req).await;
        assert!(result.episodes.is_empty());
        assert_eq!(result.error.as_deref(), Some(CHART_LOAD_ERROR));

        let count =
            load_episode_count(&FailingRepository, Region::Se, TimeWindow::All, date(2024, 1, 1))
                .await;
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_score_range_fallback() {
        assert_eq!(load_score_range(&FailingRepository).await, ScoreRange::FALLBACK);
        let empty = MemoryEpisodeRepository::new(vec![]);
        assert_eq!(load_score_range(&empty).await, ScoreRange::FALLBACK);
    }

    #[tokio::test]
    async fn test_load_show_collects_across_regions() {
        let repo = MemoryEpisodeRepository::with_sample_data();
        let show = load_show(&repo, ScoreStrategy::Raw, "1").await;
        assert_eq!(show.show_uri, "spotify:show:1");
        let ids: Vec<i64> = show.episodes.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 11]);

        let inverted = load_show(&repo, ScoreStrategy::Inverted, "spotify:show:1").await;
        let ids: Vec<i64> = inverted.episodes.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![11, 1]);
    }

    #[tokio::test]
    async fn test_load_show_failure() {
        let show = load_show(&FailingRepository, ScoreStrategy::Raw, "1").await;
        assert!(show.episodes.is_empty());
        assert_eq!(show.error.as_deref(), Some(SHOW_LOAD_ERROR));
    }

    #[test]
    fn test_show_id_round_trip() {
        assert_eq!(show_uri_for("abc"), "spotify:show:abc");
        assert_eq!(show_id_of("spotify:show:abc"), "abc");
        assert_eq!(show_id_of("https://example.com/x"), "https://example.com/x");
    }
}
