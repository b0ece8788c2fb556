use crate::core::selection::SelectionStore;
use crate::domain::model::{BallotPayload, Category, DispatchReceipt};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, VoteError};
use chrono::Utc;
use reqwest::Client;

/// 送出前的檢查結果，也用來產生提示文字
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReadiness {
    NeedsPick,
    NeedsName,
    Ready { summary: String },
}

impl SubmitReadiness {
    pub fn evaluate(voter_name: &str, selections: &SelectionStore) -> Self {
        if selections.total_picks() == 0 {
            return SubmitReadiness::NeedsPick;
        }
        if voter_name.trim().is_empty() {
            return SubmitReadiness::NeedsName;
        }

        let summary = Category::ALL
            .iter()
            .map(|c| selections.get(*c).len())
            .zip(Category::ALL)
            .filter(|(count, _)| *count > 0)
            .map(|(count, category)| category.noun(count))
            .collect::<Vec<_>>()
            .join(", ");
        SubmitReadiness::Ready { summary }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, SubmitReadiness::Ready { .. })
    }

    pub fn hint(&self) -> String {
        match self {
            SubmitReadiness::NeedsPick => "Select at least one pick from any category".to_string(),
            SubmitReadiness::NeedsName => "Enter your name to submit".to_string(),
            SubmitReadiness::Ready { summary } => format!("Ready to submit: {}", summary),
        }
    }
}

/// 把三個排名清單攤平成九個欄位
pub fn flatten_ballot(voter_name: &str, selections: &SelectionStore) -> BallotPayload {
    let [movie_first, movie_second, movie_third] = selections.get(Category::Movie).ballot_slots();
    let [tv_first, tv_second, tv_third] = selections.get(Category::Tv).ballot_slots();
    let [game_first, game_second, game_third] = selections.get(Category::Game).ballot_slots();

    BallotPayload {
        voter_name: voter_name.trim().to_string(),
        movie_first,
        movie_second,
        movie_third,
        tv_first,
        tv_second,
        tv_third,
        game_first,
        game_second,
        game_third,
    }
}

/// 驗證姓名與至少一個選擇；先檢查姓名
pub fn validate_ballot(voter_name: &str, selections: &SelectionStore) -> Result<()> {
    if voter_name.trim().is_empty() {
        return Err(VoteError::ValidationError {
            message: "Please enter your name".to_string(),
        });
    }
    if selections.total_picks() == 0 {
        return Err(VoteError::ValidationError {
            message: "Please select at least one pick from any category".to_string(),
        });
    }
    Ok(())
}

/// 把選票送到試算表端點。
///
/// 回應內容與狀態碼都不會被讀取：`Ok` 只代表請求送出時沒有傳輸錯誤，
/// 不代表資料已被寫入。沒有重試，也沒有冪等鍵，重送可能產生重複的列。
pub struct BallotSubmitter {
    client: Client,
    sink_url: String,
}

impl BallotSubmitter {
    pub fn new(sink_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            sink_url: sink_url.into(),
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self::new(config.sink_url()).with_client(builder.build()?))
    }

    pub async fn submit(&self, voter_name: &str, selections: &SelectionStore) -> Result<DispatchReceipt> {
        validate_ballot(voter_name, selections)?;

        let payload = flatten_ballot(voter_name, selections);
        tracing::info!(
            "📨 Submitting ballot for '{}' ({} picks)",
            payload.voter_name,
            selections.total_picks()
        );

        let response = self
            .client
            .post(&self.sink_url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| VoteError::SubmissionError { source })?;

        // 狀態碼只記錄，不作為成功與否的依據
        tracing::debug!("📨 Sink answered with status {} (not inspected)", response.status());

        Ok(DispatchReceipt {
            dispatched_at: Utc::now(),
        })
    }
}
