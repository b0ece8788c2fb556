use crate::domain::model::{CatalogItem, Category, SessionToken};
use crate::utils::batch::BatchPolicy;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 持久化登入狀態的儲存（原本是瀏覽器的 key/value 儲存）
pub trait SessionStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Option<SessionToken>>> + Send;
    fn save(&self, token: &SessionToken) -> impl std::future::Future<Output = Result<()>> + Send;
    fn clear(&self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 靜態設定，啟動後不再變動
pub trait ConfigProvider: Send + Sync {
    fn tmdb_api_key(&self) -> &str;
    fn tmdb_base_url(&self) -> &str;
    fn tmdb_image_base(&self) -> &str;
    fn rawg_api_key(&self) -> &str;
    fn rawg_base_url(&self) -> &str;
    fn sink_url(&self) -> &str;
    fn site_password(&self) -> &str;
    fn session_ttl(&self) -> Duration;
    fn batch_policy(&self) -> BatchPolicy;
    fn debounce(&self) -> Duration;
    fn result_limit(&self) -> usize;
    fn request_timeout(&self) -> Option<Duration>;
}

/// 單一類別的搜尋。失敗一律降級為空結果，所以不回傳 `Result`。
#[async_trait]
pub trait CatalogSearch: Send + Sync {
    fn category(&self) -> Category;
    async fn search(&self, query: &str) -> Vec<CatalogItem>;
}
