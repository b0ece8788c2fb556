use crate::domain::model::{CatalogItem, Category};
use crate::domain::ports::CatalogSearch;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// 目前應該顯示的搜尋狀態
#[derive(Debug, Clone, PartialEq)]
pub enum SearchUpdate {
    Idle,
    /// 輸入被清空，結果區塊也清空
    Cleared,
    Searching { query: String },
    Results { query: String, items: Vec<CatalogItem> },
}

/// 單一類別搜尋框的防抖動處理。
///
/// 每次輸入都會遞增世代編號；排程中的搜尋在觸發前、以及結果回來後都會比對編號，
/// 不是最新輸入的結果會被丟棄，所以較慢回來的舊查詢不會覆蓋新結果。
/// 已經送出的請求不會被取消。
pub struct DebouncedSearch {
    source: Arc<dyn CatalogSearch>,
    quiet_period: Duration,
    generation: Arc<AtomicU64>,
    updates: Arc<watch::Sender<SearchUpdate>>,
}

impl DebouncedSearch {
    pub fn new(source: Arc<dyn CatalogSearch>) -> Self {
        let (updates, _) = watch::channel(SearchUpdate::Idle);
        Self {
            source,
            quiet_period: DEFAULT_DEBOUNCE,
            generation: Arc::new(AtomicU64::new(0)),
            updates: Arc::new(updates),
        }
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn category(&self) -> Category {
        self.source.category()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchUpdate> {
        self.updates.subscribe()
    }

    pub fn current(&self) -> SearchUpdate {
        self.updates.borrow().clone()
    }

    /// 新的輸入值。必須在 tokio runtime 內呼叫。
    pub fn input(&self, query: impl Into<String>) {
        let query = query.into();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if query.trim().is_empty() {
            self.updates.send_replace(SearchUpdate::Cleared);
            return;
        }

        let source = Arc::clone(&self.source);
        let current = Arc::clone(&self.generation);
        let updates = Arc::clone(&self.updates);
        let quiet_period = self.quiet_period;

        tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let is_current = || current.load(Ordering::SeqCst) == generation;

            // 在 watch 的寫入鎖內比對世代，避免覆蓋之後送出的 Cleared
            let started = updates.send_if_modified(|state| {
                if !is_current() {
                    return false;
                }
                *state = SearchUpdate::Searching { query: query.clone() };
                true
            });
            if !started {
                return;
            }

            let items = source.search(&query).await;

            let published = updates.send_if_modified(|state| {
                if !is_current() {
                    return false;
                }
                *state = SearchUpdate::Results {
                    query: query.clone(),
                    items,
                };
                true
            });
            if !published {
                tracing::debug!(
                    "🗑️ Discarding stale {} results for '{}'",
                    source.category(),
                    query
                );
            }
        });
    }

    /// 選擇項目後清除結果，並讓進行中的搜尋失效
    pub fn reset(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.updates.send_replace(SearchUpdate::Cleared);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeSearch {
        latency: HashMap<String, Duration>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeSearch {
        fn new(latency: &[(&str, u64)]) -> Arc<Self> {
            Arc::new(Self {
                latency: latency
                    .iter()
                    .map(|(q, ms)| (q.to_string(), Duration::from_millis(*ms)))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CatalogSearch for FakeSearch {
        fn category(&self) -> Category {
            Category::Movie
        }

        async fn search(&self, query: &str) -> Vec<CatalogItem> {
            self.calls.lock().unwrap().push(query.to_string());
            let delay = self.latency.get(query).copied().unwrap_or(Duration::from_millis(10));
            tokio::time::sleep(delay).await;
            vec![CatalogItem {
                id: query.len() as i64,
                title: query.to_string(),
                release_date: None,
                poster: None,
                year: "2025".to_string(),
            }]
        }
    }

    fn result_query(update: &SearchUpdate) -> Option<&str> {
        match update {
            SearchUpdate::Results { query, .. } => Some(query),
            _ => None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_triggers_single_search() {
        let fake = FakeSearch::new(&[]);
        let search = DebouncedSearch::new(fake.clone());

        for query in ["d", "du", "dun", "dune"] {
            search.input(query);
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(fake.calls(), vec!["dune".to_string()]);
        assert_eq!(result_query(&search.current()), Some("dune"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let fake = FakeSearch::new(&[("a", 1000), ("ab", 100)]);
        let search = DebouncedSearch::new(fake.clone());

        search.input("a");
        // "a" 已經送出，1000ms 後才回來
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(
            search.current(),
            SearchUpdate::Searching {
                query: "a".to_string()
            }
        );

        search.input("ab");
        tokio::time::sleep(Duration::from_millis(2000)).await;

        assert_eq!(fake.calls(), vec!["a".to_string(), "ab".to_string()]);
        assert_eq!(result_query(&search.current()), Some("ab"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_input_clears_without_search() {
        let fake = FakeSearch::new(&[]);
        let search = DebouncedSearch::new(fake.clone()).with_quiet_period(Duration::from_millis(50));

        search.input("zelda");
        tokio::time::sleep(Duration::from_millis(10)).await;
        search.input("   ");
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert!(fake.calls().is_empty());
        assert_eq!(search.current(), SearchUpdate::Cleared);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_invalidates_in_flight_search() {
        let fake = FakeSearch::new(&[("hades", 300)]);
        let search = DebouncedSearch::new(fake.clone());
        let mut updates = search.subscribe();

        search.input("hades");
        tokio::time::sleep(Duration::from_millis(450)).await;
        search.reset();
        tokio::time::sleep(Duration::from_millis(1000)).await;

        assert_eq!(fake.calls(), vec!["hades".to_string()]);
        assert_eq!(*updates.borrow_and_update(), SearchUpdate::Cleared);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reset_is_never_overwritten_by_landing_results() {
        let fake = FakeSearch::new(&[]);

        // reset 落在結果回來的前後，最後狀態都必須是 Cleared
        for round in 0..50u64 {
            let search = DebouncedSearch::new(fake.clone()).with_quiet_period(Duration::ZERO);
            search.input(format!("q{}", round));
            tokio::time::sleep(Duration::from_millis(5 + round % 10)).await;
            search.reset();
            tokio::time::sleep(Duration::from_millis(40)).await;
            assert_eq!(search.current(), SearchUpdate::Cleared, "round {}", round);
        }
    }
}
