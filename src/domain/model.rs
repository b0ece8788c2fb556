use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 投票類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movie,
    Tv,
    Game,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Movie, Category::Tv, Category::Game];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movie => "movie",
            Category::Tv => "tv",
            Category::Game => "game",
        }
    }

    /// 搜尋沒有結果時顯示的訊息
    pub fn empty_results_message(&self) -> &'static str {
        match self {
            Category::Tv => "No shows with 2025 episodes found. Try a different search.",
            Category::Movie | Category::Game => "No 2025 releases found. Try a different search.",
        }
    }

    /// 用於摘要的單複數名稱，例如 "2 movies"、"1 TV show"
    pub fn noun(&self, count: usize) -> String {
        let singular = match self {
            Category::Movie => "movie",
            Category::Tv => "TV show",
            Category::Game => "game",
        };
        if count > 1 {
            format!("{} {}s", count, singular)
        } else {
            format!("{} {}", count, singular)
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Category::Movie),
            "tv" | "show" | "shows" => Ok(Category::Tv),
            "game" | "games" => Ok(Category::Game),
            other => Err(format!("unknown category '{}' (expected movie, tv or game)", other)),
        }
    }
}

/// 正規化後的搜尋結果，`id` 只在同一類別內唯一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub poster: Option<String>,
    pub year: String,
}

impl CatalogItem {
    /// 選票欄位格式 "Title (Year)"
    pub fn ballot_label(&self) -> String {
        format!("{} ({})", self.title, self.year)
    }
}

/// 持久化的登入狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub authenticated: bool,
    pub issued_at_epoch_ms: i64,
}

impl SessionToken {
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            issued_at_epoch_ms: now.timestamp_millis(),
        }
    }

    /// `now - issued_at < ttl` 時才有效
    pub fn is_live_at(&self, now_epoch_ms: i64, ttl_ms: i64) -> bool {
        self.authenticated && now_epoch_ms - self.issued_at_epoch_ms < ttl_ms
    }
}

/// 送往試算表端點的九欄位選票
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPayload {
    #[serde(rename = "voterName")]
    pub voter_name: String,
    #[serde(rename = "movie1st")]
    pub movie_first: String,
    #[serde(rename = "movie2nd")]
    pub movie_second: String,
    #[serde(rename = "movie3rd")]
    pub movie_third: String,
    #[serde(rename = "tv1st")]
    pub tv_first: String,
    #[serde(rename = "tv2nd")]
    pub tv_second: String,
    #[serde(rename = "tv3rd")]
    pub tv_third: String,
    #[serde(rename = "game1st")]
    pub game_first: String,
    #[serde(rename = "game2nd")]
    pub game_second: String,
    #[serde(rename = "game3rd")]
    pub game_third: String,
}

/// 請求已送出且沒有傳輸錯誤。
///
/// 端點回應是不透明的：這不代表伺服器已接受資料，只代表請求離開了本機。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReceipt {
    pub dispatched_at: DateTime<Utc>,
}
