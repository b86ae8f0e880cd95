use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Se,
    Us,
}

#[derive(Debug, Error)]
#[error("unknown region '{0}' (expected se or us)")]
pub struct UnknownRegion(pub String);

impl Region {
    pub const ALL: [Region; 2] = [Region::Se, Region::Us];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Se => "se",
            Region::Us => "us",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Se => "Sweden",
            Region::Us => "United States",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "se" => Ok(Region::Se),
            "us" => Ok(Region::Us),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}

impl TryFrom<String> for Region {
    type Error = UnknownRegion;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One charting episode as stored in the `episodes` table. Read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Episode {
    pub id: i64,
    pub first_appearance_date: NaiveDate,
    pub score: f64,
    pub episode_name: String,
    pub show_name: String,
    pub episode_uri: String,
    pub show_uri: String,
    pub show_description: String,
    #[sqlx(try_from = "String")]
    pub region: Region,
    pub episode_description: Option<String>,
    /// Milliseconds.
    pub episode_duration: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
