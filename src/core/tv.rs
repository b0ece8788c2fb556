use crate::core::catalog::{poster_url, year_of, CatalogProfile, Enriched};
use crate::domain::model::{CatalogItem, Category};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

const WINDOW_START: &str = "2025-01-01";
const WINDOW_END: &str = "2025-12-31";

/// TMDB `/search/tv` 的單筆結果
#[derive(Debug, Clone, Deserialize)]
pub struct TvCandidate {
    pub id: i64,
    pub name: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
}

/// TMDB `/tv/{id}` 中需要的欄位
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowDetail {
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
}

impl ShowDetail {
    /// 2025 年內有播出：首播不晚於年底，且最後播出不早於年初。兩個日期都必須存在。
    pub fn aired_in_window(&self) -> bool {
        match (non_empty(&self.first_air_date), non_empty(&self.last_air_date)) {
            (Some(first), Some(last)) => first <= WINDOW_END && last >= WINDOW_START,
            _ => false,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct TvProfile {
    base_url: String,
    api_key: String,
    image_base: String,
}

impl TvProfile {
    pub fn new(base_url: &str, api_key: &str, image_base: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            image_base: image_base.to_string(),
        }
    }
}

impl CatalogProfile for TvProfile {
    type Candidate = TvCandidate;
    type Detail = ShowDetail;

    fn category(&self) -> Category {
        Category::Tv
    }

    fn candidate_cap(&self) -> usize {
        15
    }

    fn search_request(&self, client: &Client, query: &str) -> RequestBuilder {
        client
            .get(format!("{}/search/tv", self.base_url))
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
    }

    fn detail_request(&self, client: &Client, candidate: &TvCandidate) -> RequestBuilder {
        client
            .get(format!("{}/tv/{}", self.base_url, candidate.id))
            .query(&[("api_key", self.api_key.as_str())])
    }

    // 明細失敗等同兩個日期都是空的，節目會被排除
    fn enrich(&self, candidate: TvCandidate, detail: Option<ShowDetail>) -> Enriched<TvCandidate> {
        let relevant = detail.unwrap_or_default().aired_in_window();
        Enriched::new(candidate, relevant)
    }

    fn normalize(&self, candidate: TvCandidate) -> CatalogItem {
        CatalogItem {
            id: candidate.id,
            year: year_of(candidate.first_air_date.as_deref(), ""),
            poster: poster_url(&self.image_base, candidate.poster_path.as_deref()),
            title: candidate.name.unwrap_or_default(),
            release_date: candidate.first_air_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(first: Option<&str>, last: Option<&str>) -> ShowDetail {
        ShowDetail {
            first_air_date: first.map(str::to_string),
            last_air_date: last.map(str::to_string),
        }
    }

    #[test]
    fn test_aired_in_window() {
        assert!(!detail(Some("2023-01-01"), Some("2024-12-31")).aired_in_window());
        assert!(detail(Some("2025-06-01"), Some("2025-09-01")).aired_in_window());
        assert!(detail(Some("2019-04-01"), Some("2025-01-01")).aired_in_window());
        assert!(detail(Some("2025-12-31"), Some("2026-02-01")).aired_in_window());
        assert!(!detail(Some("2026-01-05"), Some("2026-02-01")).aired_in_window());
        assert!(!detail(Some("2025-06-01"), None).aired_in_window());
        assert!(!detail(None, Some("2025-06-01")).aired_in_window());
        assert!(!detail(Some(""), Some("2025-06-01")).aired_in_window());
    }

    #[test]
    fn test_failed_detail_drops_show() {
        let profile = TvProfile::new("https://api.example/3", "key", "https://img.example/w200");
        let candidate = TvCandidate {
            id: 3,
            name: Some("Severance".to_string()),
            first_air_date: Some("2025-01-17".to_string()),
            poster_path: None,
        };
        assert!(!profile.enrich(candidate, None).relevant);
    }

    #[test]
    fn test_normalize_uses_search_air_date() {
        let profile = TvProfile::new("https://api.example/3", "key", "https://img.example/w200");
        let item = profile.normalize(TvCandidate {
            id: 3,
            name: Some("Severance".to_string()),
            first_air_date: Some("2022-02-18".to_string()),
            poster_path: Some("/sev.jpg".to_string()),
        });
        assert_eq!(item.title, "Severance");
        assert_eq!(item.year, "2022");
        assert_eq!(item.poster.as_deref(), Some("https://img.example/w200/sev.jpg"));

        let item = profile.normalize(TvCandidate {
            id: 4,
            name: None,
            first_air_date: None,
            poster_path: None,
        });
        assert_eq!(item.year, "");
    }
}
