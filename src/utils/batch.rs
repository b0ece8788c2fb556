use futures::future::{join_all, try_join_all};
use std::future::Future;
use std::time::Duration;

/// 批次大小與批次間的延遲，用來避開上游的速率限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub batch_size: usize,
    pub delay: Duration,
}

impl BatchPolicy {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self { batch_size, delay }
    }

    /// 搜尋結果補充明細時使用：每批 5 筆，間隔 150ms
    pub fn enrichment() -> Self {
        Self::new(5, Duration::from_millis(150))
    }

    /// `ceil(n / batch_size) - 1`
    pub fn pauses_for(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.effective_size()).saturating_sub(1)
    }

    fn effective_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(100))
    }
}

/// 依批次對每個項目執行 `fetch`，輸出順序與輸入相同。
///
/// 同一批內的 future 會並行執行，整批完成後才進入下一批；除了最後一批，
/// 每批結束後會等待 `policy.delay`。錯誤處理交給 `fetch` 本身，這裡不重試。
pub async fn batched_fetch<I, T, F, Fut>(items: Vec<I>, policy: &BatchPolicy, mut fetch: F) -> Vec<T>
where
    F: FnMut(I) -> Fut,
    Fut: Future<Output = T>,
{
    let total = items.len();
    let batch_size = policy.effective_size();
    let mut results = Vec::with_capacity(total);
    let mut items = items.into_iter();
    let mut processed = 0;

    while processed < total {
        let batch: Vec<Fut> = items.by_ref().take(batch_size).map(&mut fetch).collect();
        processed += batch.len();
        tracing::debug!("📦 Running batch of {} ({}/{})", batch.len(), processed, total);
        results.extend(join_all(batch).await);

        if processed < total {
            tokio::time::sleep(policy.delay).await;
        }
    }

    results
}

/// 與 [`batched_fetch`] 相同，但任一項目失敗就中止整個呼叫並回傳該錯誤。
/// 已經開始的批次仍會跑完，後續批次不會再開始。
pub async fn try_batched_fetch<I, T, E, F, Fut>(
    items: Vec<I>,
    policy: &BatchPolicy,
    mut fetch: F,
) -> std::result::Result<Vec<T>, E>
where
    F: FnMut(I) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let total = items.len();
    let batch_size = policy.effective_size();
    let mut results = Vec::with_capacity(total);
    let mut items = items.into_iter();
    let mut processed = 0;

    while processed < total {
        let batch: Vec<Fut> = items.by_ref().take(batch_size).map(&mut fetch).collect();
        processed += batch.len();
        results.extend(try_join_all(batch).await?);

        if processed < total {
            tokio::time::sleep(policy.delay).await;
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    // 暫停的時鐘會把計時器對齊到毫秒，容許少量誤差
    fn assert_elapsed(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual <= expected + Duration::from_millis(10),
            "elapsed {:?}, expected about {:?}",
            actual,
            expected
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_preserves_input_order_with_uneven_latency() {
        let items: Vec<u64> = (0..12).collect();
        let policy = BatchPolicy::new(5, Duration::from_millis(100));

        // 越前面的項目越慢完成
        let results = batched_fetch(items, &policy, |i| async move {
            tokio::time::sleep(Duration::from_millis(50 - i * 4)).await;
            i * 10
        })
        .await;

        assert_eq!(results, (0..12).map(|i| i * 10).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_count_matches_batches() {
        for (count, batch_size) in [(0usize, 5usize), (3, 5), (5, 5), (6, 5), (12, 5), (12, 4), (7, 1)] {
            let policy = BatchPolicy::new(batch_size, Duration::from_millis(100));
            let start = Instant::now();

            let results = batched_fetch((0..count).collect(), &policy, |i| async move { i }).await;

            assert_eq!(results.len(), count);
            let expected_pauses = policy.pauses_for(count);
            assert_eq!(expected_pauses, count.div_ceil(batch_size).saturating_sub(1));
            assert_elapsed(start.elapsed(), Duration::from_millis(100 * expected_pauses as u64));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_within_a_batch_run_concurrently() {
        let policy = BatchPolicy::new(5, Duration::from_millis(100));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let start = Instant::now();

        batched_fetch((0..10).collect::<Vec<_>>(), &policy, |_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
            }
        })
        .await;

        // 兩批各 50ms，中間一次 100ms 延遲
        assert_elapsed(start.elapsed(), Duration::from_millis(200));
        assert_eq!(peak.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_try_batched_fetch_aborts_on_first_error() {
        let policy = BatchPolicy::new(2, Duration::from_millis(10));
        let started = Arc::new(std::sync::Mutex::new(Vec::new()));

        let result: std::result::Result<Vec<u32>, String> =
            try_batched_fetch((0..6).collect(), &policy, |i: u32| {
                let started = started.clone();
                async move {
                    started.lock().unwrap().push(i);
                    if i == 2 {
                        Err(format!("item {} failed", i))
                    } else {
                        Ok(i)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap_err(), "item 2 failed");
        // 第三批沒有開始
        assert!(started.lock().unwrap().iter().all(|i| *i < 4));
    }

    #[tokio::test]
    async fn test_try_batched_fetch_success() {
        let policy = BatchPolicy::new(2, Duration::from_millis(1));
        let result: std::result::Result<Vec<u32>, String> =
            try_batched_fetch(vec![1, 2, 3], &policy, |i| async move { Ok(i + 1) }).await;
        assert_eq!(result.unwrap(), vec![2, 3, 4]);
    }

    #[test]
    fn test_zero_batch_size_is_treated_as_one() {
        let policy = BatchPolicy::new(0, Duration::from_millis(100));
        assert_eq!(policy.pauses_for(3), 2);
        assert_eq!(policy.pauses_for(0), 0);
    }
}
