use crate::core::catalog::{poster_url, starts_with_any, year_of, CatalogProfile, Enriched};
use crate::domain::model::{CatalogItem, Category};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

const TARGET_YEAR: &str = "2025";

/// TMDB `/search/movie` 的單筆結果
#[derive(Debug, Clone, Deserialize)]
pub struct MovieCandidate {
    pub id: i64,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
}

/// TMDB `/movie/{id}/release_dates`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseDates {
    #[serde(default)]
    pub results: Vec<CountryReleases>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryReleases {
    #[serde(default)]
    pub release_dates: Vec<ReleaseEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReleaseEntry {
    pub release_date: Option<String>,
}

impl ReleaseDates {
    /// 任何國家、任何發行類型在目標年份有上映
    pub fn has_release_in(&self, year: &str) -> bool {
        self.results.iter().any(|country| {
            country
                .release_dates
                .iter()
                .any(|r| starts_with_any(r.release_date.as_deref(), &[year]))
        })
    }
}

#[derive(Debug, Clone)]
pub struct MovieProfile {
    base_url: String,
    api_key: String,
    image_base: String,
}

impl MovieProfile {
    pub fn new(base_url: &str, api_key: &str, image_base: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            image_base: image_base.to_string(),
        }
    }
}

impl CatalogProfile for MovieProfile {
    type Candidate = MovieCandidate;
    type Detail = ReleaseDates;

    fn category(&self) -> Category {
        Category::Movie
    }

    fn candidate_cap(&self) -> usize {
        12
    }

    // 不在搜尋時限制年份，限量上映或跨年上映的片要靠明細判斷
    fn search_request(&self, client: &Client, query: &str) -> RequestBuilder {
        client
            .get(format!("{}/search/movie", self.base_url))
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
    }

    fn detail_request(&self, client: &Client, candidate: &MovieCandidate) -> RequestBuilder {
        client
            .get(format!("{}/movie/{}/release_dates", self.base_url, candidate.id))
            .query(&[("api_key", self.api_key.as_str())])
    }

    fn enrich(&self, candidate: MovieCandidate, detail: Option<ReleaseDates>) -> Enriched<MovieCandidate> {
        let relevant = match detail {
            Some(dates) => dates.has_release_in(TARGET_YEAR),
            None => starts_with_any(candidate.release_date.as_deref(), &[TARGET_YEAR]),
        };
        Enriched::new(candidate, relevant)
    }

    fn normalize(&self, candidate: MovieCandidate) -> CatalogItem {
        CatalogItem {
            id: candidate.id,
            year: year_of(candidate.release_date.as_deref(), TARGET_YEAR),
            poster: poster_url(&self.image_base, candidate.poster_path.as_deref()),
            title: candidate.title.unwrap_or_default(),
            release_date: candidate.release_date,
        }
    }
}
