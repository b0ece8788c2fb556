use crate::core::game::GameProfile;
use crate::core::movie::MovieProfile;
use crate::core::search::DebouncedSearch;
use crate::core::tv::TvProfile;
use crate::domain::model::{CatalogItem, Category};
use crate::domain::ports::{CatalogSearch, ConfigProvider};
use crate::utils::batch::{batched_fetch, BatchPolicy};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// 正規化後最多回傳的筆數
pub const DEFAULT_RESULT_LIMIT: usize = 8;

/// 單一類別的搜尋規則：端點、明細端點、相關性判斷與正規化
pub trait CatalogProfile: Send + Sync {
    type Candidate: DeserializeOwned + Send + Sync;
    type Detail: DeserializeOwned + Send;

    fn category(&self) -> Category;

    /// 送去補充明細的候選上限
    fn candidate_cap(&self) -> usize;

    fn search_request(&self, client: &Client, query: &str) -> RequestBuilder;

    fn detail_request(&self, client: &Client, candidate: &Self::Candidate) -> RequestBuilder;

    /// `detail` 為 `None` 表示明細取得失敗
    fn enrich(&self, candidate: Self::Candidate, detail: Option<Self::Detail>) -> Enriched<Self::Candidate>;

    fn normalize(&self, candidate: Self::Candidate) -> CatalogItem;
}

/// 補充明細後的候選與相關性判斷結果
#[derive(Debug, Clone, PartialEq)]
pub struct Enriched<C> {
    pub candidate: C,
    pub relevant: bool,
}

impl<C> Enriched<C> {
    pub fn new(candidate: C, relevant: bool) -> Self {
        Self { candidate, relevant }
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage<C> {
    #[serde(default = "Vec::new")]
    results: Vec<C>,
}

pub struct CatalogPipeline<P: CatalogProfile> {
    profile: P,
    client: Client,
    batch_policy: BatchPolicy,
    result_limit: usize,
}

impl<P: CatalogProfile> CatalogPipeline<P> {
    pub fn new(profile: P) -> Self {
        Self {
            profile,
            client: Client::new(),
            batch_policy: BatchPolicy::enrichment(),
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_batch_policy(mut self, batch_policy: BatchPolicy) -> Self {
        self.batch_policy = batch_policy;
        self
    }

    pub fn with_result_limit(mut self, result_limit: usize) -> Self {
        self.result_limit = result_limit;
        self
    }

    pub fn profile(&self) -> &P {
        &self.profile
    }

    /// 搜尋並補充明細。空白查詢不發請求；任何主搜尋失敗都回傳空結果。
    pub async fn search(&self, query: &str) -> Vec<CatalogItem> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        match self.try_search(query).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("⚠️ Error searching {}: {}", self.profile.category(), e);
                Vec::new()
            }
        }
    }

    async fn try_search(&self, query: &str) -> Result<Vec<CatalogItem>> {
        let category = self.profile.category();
        tracing::debug!("🔎 Searching {} for '{}'", category, query);

        let page: SearchPage<P::Candidate> = self
            .profile
            .search_request(&self.client, query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let candidates: Vec<P::Candidate> = page
            .results
            .into_iter()
            .take(self.profile.candidate_cap())
            .collect();
        tracing::debug!("🔎 {}: enriching {} candidates", category, candidates.len());

        let enriched = batched_fetch(candidates, &self.batch_policy, |candidate| {
            self.enrich_candidate(candidate)
        })
        .await;

        let items: Vec<CatalogItem> = enriched
            .into_iter()
            .filter(|e| e.relevant)
            .take(self.result_limit)
            .map(|e| self.profile.normalize(e.candidate))
            .collect();

        tracing::info!("🔎 {} '{}': {} results", category, query, items.len());
        Ok(items)
    }

    async fn enrich_candidate(&self, candidate: P::Candidate) -> Enriched<P::Candidate> {
        match self.fetch_detail(&candidate).await {
            Ok(detail) => self.profile.enrich(candidate, Some(detail)),
            Err(e) => {
                tracing::debug!(
                    "📡 {} detail lookup failed, using fallback: {}",
                    self.profile.category(),
                    e
                );
                self.profile.enrich(candidate, None)
            }
        }
    }

    async fn fetch_detail(&self, candidate: &P::Candidate) -> Result<P::Detail> {
        let detail: P::Detail = self
            .profile
            .detail_request(&self.client, candidate)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(detail)
    }
}

#[async_trait]
impl<P: CatalogProfile> CatalogSearch for CatalogPipeline<P> {
    fn category(&self) -> Category {
        self.profile.category()
    }

    async fn search(&self, query: &str) -> Vec<CatalogItem> {
        CatalogPipeline::search(self, query).await
    }
}

/// 三個類別的搜尋管道
pub struct CatalogSearchClient {
    pub movies: CatalogPipeline<MovieProfile>,
    pub tv: CatalogPipeline<TvProfile>,
    pub games: CatalogPipeline<GameProfile>,
}

/// 一次搜尋三個類別的結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedResults {
    pub movies: Vec<CatalogItem>,
    pub tv: Vec<CatalogItem>,
    pub games: Vec<CatalogItem>,
}

impl CatalogSearchClient {
    pub fn new(
        movies: CatalogPipeline<MovieProfile>,
        tv: CatalogPipeline<TvProfile>,
        games: CatalogPipeline<GameProfile>,
    ) -> Self {
        Self { movies, tv, games }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let batch_policy = config.batch_policy();
        let limit = config.result_limit();

        let movies = CatalogPipeline::new(MovieProfile::new(
            config.tmdb_base_url(),
            config.tmdb_api_key(),
            config.tmdb_image_base(),
        ));
        let tv = CatalogPipeline::new(TvProfile::new(
            config.tmdb_base_url(),
            config.tmdb_api_key(),
            config.tmdb_image_base(),
        ));
        let games = CatalogPipeline::new(GameProfile::new(
            config.rawg_base_url(),
            config.rawg_api_key(),
        ));

        Ok(Self {
            movies: movies
                .with_client(client.clone())
                .with_batch_policy(batch_policy)
                .with_result_limit(limit),
            tv: tv
                .with_client(client.clone())
                .with_batch_policy(batch_policy)
                .with_result_limit(limit),
            games: games
                .with_client(client)
                .with_batch_policy(batch_policy)
                .with_result_limit(limit),
        })
    }

    /// 拆成三個獨立的搜尋來源，給防抖動搜尋或投票流程使用
    pub fn into_sources(self) -> Vec<Arc<dyn CatalogSearch>> {
        vec![
            Arc::new(self.movies) as Arc<dyn CatalogSearch>,
            Arc::new(self.tv) as Arc<dyn CatalogSearch>,
            Arc::new(self.games) as Arc<dyn CatalogSearch>,
        ]
    }

    /// 每個類別一個防抖動搜尋框
    pub fn into_debounced(self, quiet_period: Duration) -> Vec<DebouncedSearch> {
        self.into_sources()
            .into_iter()
            .map(|source| DebouncedSearch::new(source).with_quiet_period(quiet_period))
            .collect()
    }

    pub fn pipeline(&self, category: Category) -> &dyn CatalogSearch {
        match category {
            Category::Movie => &self.movies,
            Category::Tv => &self.tv,
            Category::Game => &self.games,
        }
    }

    pub async fn search(&self, category: Category, query: &str) -> Vec<CatalogItem> {
        self.pipeline(category).search(query).await
    }

    /// 三個類別互不相干，可同時搜尋
    pub async fn search_all(&self, query: &str) -> CombinedResults {
        let (movies, tv, games) = tokio::join!(
            self.movies.search(query),
            self.tv.search(query),
            self.games.search(query)
        );
        CombinedResults { movies, tv, games }
    }
}

/// 取日期字串 "-" 之前的年份；沒有日期時使用 `default`
pub(crate) fn year_of(date: Option<&str>, default: &str) -> String {
    match date {
        Some(d) if !d.is_empty() => d.split('-').next().unwrap_or(default).to_string(),
        _ => default.to_string(),
    }
}

pub(crate) fn starts_with_any(date: Option<&str>, prefixes: &[&str]) -> bool {
    date.map(|d| prefixes.iter().any(|p| d.starts_with(p)))
        .unwrap_or(false)
}

pub(crate) fn poster_url(image_base: &str, path: Option<&str>) -> Option<String> {
    match path {
        Some(p) if !p.is_empty() => Some(format!("{}{}", image_base, p)),
        _ => None,
    }
}
