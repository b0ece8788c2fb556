use crate::core::catalog::{starts_with_any, year_of, CatalogProfile, Enriched};
use crate::domain::model::{CatalogItem, Category};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

const RELEASE_YEARS: [&str; 2] = ["2024", "2025"];
const UPDATE_YEAR: &str = "2025";
const SEARCH_PAGE_SIZE: &str = "15";

/// RAWG `/games` 的單筆結果
#[derive(Debug, Clone, Deserialize)]
pub struct GameCandidate {
    pub id: i64,
    pub name: Option<String>,
    pub released: Option<String>,
    pub background_image: Option<String>,
}

/// RAWG `/games/{id}` 中需要的欄位
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GameDetail {
    pub released: Option<String>,
    pub updated: Option<String>,
}

impl GameDetail {
    /// 2024-2025 發行（搶先體驗轉正式版），或 2025 有更新（DLC、資料片）
    pub fn is_relevant(&self) -> bool {
        starts_with_any(self.released.as_deref(), &RELEASE_YEARS)
            || starts_with_any(self.updated.as_deref(), &[UPDATE_YEAR])
    }
}

#[derive(Debug, Clone)]
pub struct GameProfile {
    base_url: String,
    api_key: String,
}

impl GameProfile {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl CatalogProfile for GameProfile {
    type Candidate = GameCandidate;
    type Detail = GameDetail;

    fn category(&self) -> Category {
        Category::Game
    }

    fn candidate_cap(&self) -> usize {
        12
    }

    fn search_request(&self, client: &Client, query: &str) -> RequestBuilder {
        client.get(format!("{}/games", self.base_url)).query(&[
            ("key", self.api_key.as_str()),
            ("search", query),
            ("page_size", SEARCH_PAGE_SIZE),
        ])
    }

    fn detail_request(&self, client: &Client, candidate: &GameCandidate) -> RequestBuilder {
        client
            .get(format!("{}/games/{}", self.base_url, candidate.id))
            .query(&[("key", self.api_key.as_str())])
    }

    fn enrich(&self, mut candidate: GameCandidate, detail: Option<GameDetail>) -> Enriched<GameCandidate> {
        match detail {
            Some(detail) => {
                let relevant = detail.is_relevant();
                // 明細的發行日比搜尋結果準確
                candidate.released = detail.released;
                Enriched::new(candidate, relevant)
            }
            None => {
                let relevant = starts_with_any(candidate.released.as_deref(), &RELEASE_YEARS);
                Enriched::new(candidate, relevant)
            }
        }
    }

    // RAWG 給的是完整圖片網址，不需要加前綴
    fn normalize(&self, candidate: GameCandidate) -> CatalogItem {
        CatalogItem {
            id: candidate.id,
            year: year_of(candidate.released.as_deref(), "2025"),
            poster: candidate.background_image.filter(|url| !url.is_empty()),
            title: candidate.name.unwrap_or_default(),
            release_date: candidate.released,
        }
    }
}
