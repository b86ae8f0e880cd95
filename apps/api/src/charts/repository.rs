//! Episode data access. Trait-based so handlers never touch SQL.
//!
//! `PgEpisodeRepository` is used whenever `DATABASE_URL` is set.
//! `MemoryEpisodeRepository` serves the bundled sample dataset (local runs
//! and tests) with the same filter/order/limit semantics.
//!
//! `AppState` holds an `Arc<dyn EpisodeRepository>`, chosen at startup.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::charts::score::{ScoreRange, SortOrder};
use crate::charts::time_window::DateRange;
use crate::errors::AppError;
use crate::models::episode::{Episode, Region};

/// Filter for a ranked episode listing.
#[derive(Debug, Clone)]
pub struct EpisodeQuery {
    pub region: Region,
    /// `None` disables date filtering entirely.
    pub range: Option<DateRange>,
    pub order: SortOrder,
    pub limit: i64,
}

#[async_trait]
pub trait EpisodeRepository: Send + Sync {
    async fn top_episodes(&self, query: &EpisodeQuery) -> Result<Vec<Episode>, AppError>;

    async fn episode_count(
        &self,
        region: Region,
        range: Option<DateRange>,
    ) -> Result<i64, AppError>;

    /// Global min/max score, `None` when there are no episodes.
    async fn score_range(&self) -> Result<Option<ScoreRange>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres
// ────────────────────────────────────────────────────────────────────────────

pub struct PgEpisodeRepository {
    pool: PgPool,
}

impl PgEpisodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EpisodeRepository for PgEpisodeRepository {
    async fn top_episodes(&self, query: &EpisodeQuery) -> Result<Vec<Episode>, AppError> {
        // ORDER BY direction cannot be bound; it comes from a closed enum.
        let sql = format!(
            r#"
            SELECT *
            FROM episodes
            WHERE region = $1
              AND ($2::date IS NULL OR first_appearance_date >= $2)
              AND ($3::date IS NULL OR first_appearance_date <= $3)
            ORDER BY score {}, id ASC
            LIMIT $4
            "#,
            query.order.sql()
        );

        let (start, end) = bounds(query.range);
        let episodes = sqlx::query_as::<_, Episode>(&sql)
            .bind(query.region.as_str())
            .bind(start)
            .bind(end)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(episodes)
    }

    async fn episode_count(
        &self,
        region: Region,
        range: Option<DateRange>,
    ) -> Result<i64, AppError> {
        let (start, end) = bounds(range);
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM episodes
            WHERE region = $1
              AND ($2::date IS NULL OR first_appearance_date >= $2)
              AND ($3::date IS NULL OR first_appearance_date <= $3)
            "#,
        )
        .bind(region.as_str())
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn score_range(&self) -> Result<Option<ScoreRange>, AppError> {
        let (min_score, max_score): (Option<f64>, Option<f64>) =
            sqlx::query_as("SELECT MIN(score)::float8, MAX(score)::float8 FROM episodes")
                .fetch_one(&self.pool)
                .await?;
        Ok(min_score
            .zip(max_score)
            .map(|(min_score, max_score)| ScoreRange {
                min_score,
                max_score,
            }))
    }
}

fn bounds(range: Option<DateRange>) -> (Option<NaiveDate>, Option<NaiveDate>) {
    match range {
        Some(r) => (Some(r.start_date), Some(r.end_date)),
        None => (None, None),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory
// ────────────────────────────────────────────────────────────────────────────

pub struct MemoryEpisodeRepository {
    episodes: Vec<Episode>,
}

impl MemoryEpisodeRepository {
    pub fn new(episodes: Vec<Episode>) -> Self {
        Self { episodes }
    }

    pub fn with_sample_data() -> Self {
        Self::new(sample_episodes())
    }
}

#[async_trait]
impl EpisodeRepository for MemoryEpisodeRepository {
    async fn top_episodes(&self, query: &EpisodeQuery) -> Result<Vec<Episode>, AppError> {
        let mut episodes = filter_by_region(&self.episodes, query.region);
        if let Some(range) = query.range {
            episodes = filter_by_date_range(&episodes, &range);
        }
        sort_by_score(&mut episodes, query.order);
        episodes.truncate(usize::try_from(query.limit.max(0)).unwrap_or(usize::MAX));
        Ok(episodes)
    }

    async fn episode_count(
        &self,
        region: Region,
        range: Option<DateRange>,
    ) -> Result<i64, AppError> {
        let count = self
            .episodes
            .iter()
            .filter(|e| e.region == region)
            .filter(|e| range.map_or(true, |r| r.contains(e.first_appearance_date)))
            .count();
        Ok(i64::try_from(count).context("episode count does not fit in i64")?)
    }

    async fn score_range(&self) -> Result<Option<ScoreRange>, AppError> {
        let mut scores = self.episodes.iter().map(|e| e.score);
        let Some(first) = scores.next() else {
            return Ok(None);
        };
        let (min_score, max_score) =
            scores.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
        Ok(Some(ScoreRange {
            min_score,
            max_score,
        }))
    }
}

pub fn filter_by_region(episodes: &[Episode], region: Region) -> Vec<Episode> {
    episodes
        .iter()
        .filter(|e| e.region == region)
        .cloned()
        .collect()
}

pub fn filter_by_date_range(episodes: &[Episode], range: &DateRange) -> Vec<Episode> {
    episodes
        .iter()
        .filter(|e| range.contains(e.first_appearance_date))
        .cloned()
        .collect()
}

/// Stable sort by score, ties broken by id like the SQL query.
pub fn sort_by_score(episodes: &mut [Episode], order: SortOrder) {
    episodes.sort_by(|a, b| {
        let by_score = match order {
            SortOrder::Ascending => a.score.total_cmp(&b.score),
            SortOrder::Descending => b.score.total_cmp(&a.score),
        };
        by_score.then(a.id.cmp(&b.id))
    });
}

// ────────────────────────────────────────────────────────────────────────────
// Sample dataset
// ────────────────────────────────────────────────────────────────────────────

type SampleRow = (
    i64,
    (i32, u32, u32),
    f64,
    &'static str,
    &'static str,
    u32,
    &'static str,
    Region,
);

#[rustfmt::skip]
const SAMPLE_ROWS: &[SampleRow] = &[
    (1, (2024, 1, 15), 5.0, "The Future of AI in Healthcare", "Tech Talk Stockholm", 1,
     "Sweden's premier technology podcast discussing AI, healthcare, and innovation.", Region::Se),
    (2, (2024, 1, 18), 12.0, "Climate Solutions for the Nordic Region", "Green Nordic", 2,
     "Environmental discussions focused on Nordic sustainability initiatives.", Region::Se),
    (3, (2024, 1, 20), 8.0, "Swedish Startup Success Stories", "Entrepreneur Sweden", 3,
     "Inspiring stories from Swedish entrepreneurs and business leaders.", Region::Se),
    (4, (2024, 2, 1), 3.0, "Music Industry Revolution", "Stockholm Sound", 4,
     "Deep dive into the music industry from Stockholm's perspective.", Region::Se),
    (5, (2024, 2, 10), 15.0, "Nordic Design Philosophy", "Design Stockholm", 5,
     "Exploring the principles behind Nordic design and minimalism.", Region::Se),
    (6, (2024, 1, 12), 2.0, "Silicon Valley Insider Stories", "Valley Talk", 6,
     "Behind-the-scenes stories from Silicon Valley's biggest companies.", Region::Us),
    (7, (2024, 1, 16), 7.0, "The Psychology of Success", "Mind Matters USA", 7,
     "Exploring the mental frameworks that drive success in America.", Region::Us),
    (8, (2024, 1, 22), 11.0, "Cryptocurrency Market Analysis", "Crypto America", 8,
     "Weekly analysis of cryptocurrency trends in the US market.", Region::Us),
    (9, (2024, 2, 3), 4.0, "Hollywood Behind the Scenes", "Entertainment Weekly", 9,
     "Exclusive interviews with Hollywood's biggest stars and directors.", Region::Us),
    (10, (2024, 2, 12), 9.0, "American Sports Analytics", "Sports Science USA", 10,
     "Data-driven analysis of American sports performance and trends.", Region::Us),
    (11, (2024, 12, 1), 1.0, "Year-End Tech Roundup", "Tech Talk Stockholm", 1,
     "Sweden's premier technology podcast discussing AI, healthcare, and innovation.", Region::Se),
    (12, (2024, 12, 5), 6.0, "Holiday Shopping Trends 2024", "Consumer Insights", 11,
     "Analysis of consumer behavior during the holiday season.", Region::Us),
];

/// Twelve episodes across both regions, mostly early 2024 plus two in December.
pub fn sample_episodes() -> Vec<Episode> {
    SAMPLE_ROWS
        .iter()
        .filter_map(
            |&(id, (y, m, d), score, episode_name, show_name, show, show_description, region)| {
                let first_appearance_date = NaiveDate::from_ymd_opt(y, m, d)?;
                let created_at: DateTime<Utc> = first_appearance_date.and_hms_opt(8, 0, 0)?.and_utc();
                Some(Episode {
                    id,
                    first_appearance_date,
                    score,
                    episode_name: episode_name.to_string(),
                    show_name: show_name.to_string(),
                    episode_uri: format!("spotify:episode:{id}"),
                    show_uri: format!("spotify:show:{show}"),
                    show_description: show_description.to_string(),
                    region,
                    episode_description: None,
                    episode_duration: None,
                    created_at,
                    updated_at: created_at,
                })
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::time_window::{compute_range, TimeWindow};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ids(episodes: &[Episode]) -> Vec<i64> {
        episodes.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_sample_data_complete() {
        let episodes = sample_episodes();
        assert_eq!(episodes.len(), 12);
        assert_eq!(episodes.iter().filter(|e| e.region == Region::Se).count(), 6);
    }

    #[tokio::test]
    async fn test_top_episodes_filters_and_orders() {
        let repo = MemoryEpisodeRepository::with_sample_data();
        let query = EpisodeQuery {
            region: Region::Se,
            range: Some(compute_range(TimeWindow::Month, date(2024, 1, 10))),
            order: SortOrder::Descending,
            limit: 25,
        };
        let episodes = repo.top_episodes(&query).await.unwrap();
        assert_eq!(ids(&episodes), vec![2, 3, 1]);

        let ascending = EpisodeQuery {
            order: SortOrder::Ascending,
            ..query
        };
        let episodes = repo.top_episodes(&ascending).await.unwrap();
        assert_eq!(ids(&episodes), vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_no_range_and_limit() {
        let repo = MemoryEpisodeRepository::with_sample_data();
        let query = EpisodeQuery {
            region: Region::Us,
            range: None,
            order: SortOrder::Descending,
            limit: 2,
        };
        let episodes = repo.top_episodes(&query).await.unwrap();
        assert_eq!(ids(&episodes), vec![8, 10]);
    }

    #[tokio::test]
    async fn test_count_respects_range() {
        let repo = MemoryEpisodeRepository::with_sample_data();
        let q1 = compute_range(TimeWindow::Quarter, date(2024, 3, 1));
        assert_eq!(repo.episode_count(Region::Se, Some(q1)).await.unwrap(), 5);
        assert_eq!(repo.episode_count(Region::Se, None).await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_score_range() {
        let repo = MemoryEpisodeRepository::with_sample_data();
        let range = repo.score_range().await.unwrap().unwrap();
        assert_eq!(range.min_score, 1.0);
        assert_eq!(range.max_score, 15.0);

        let empty = MemoryEpisodeRepository::new(vec![]);
        assert!(empty.score_range().await.unwrap().is_none());
    }

    #[test]
    fn test_date_filter_is_inclusive() {
        let range = DateRange {
            start_date: date(2024, 1, 15),
            end_date: date(2024, 1, 20),
        };
        let filtered = filter_by_date_range(&sample_episodes(), &range);
        assert_eq!(ids(&filtered), vec![1, 2, 3, 7]);
    }
}
