use crate::core::ballot::{BallotSubmitter, SubmitReadiness};
use crate::core::catalog::CatalogSearchClient;
use crate::core::selection::{AddOutcome, SelectionStore};
use crate::domain::model::{CatalogItem, Category, DispatchReceipt};
use crate::domain::ports::CatalogSearch;
use crate::utils::error::{Result, VoteError};
use std::collections::HashMap;
use std::sync::Arc;

/// 投票流程：搜尋、挑選、排序、送出，送出成功後整個表單重設
pub struct VotingBooth {
    sources: HashMap<Category, Arc<dyn CatalogSearch>>,
    submitter: BallotSubmitter,
    selections: SelectionStore,
    results: HashMap<Category, Vec<CatalogItem>>,
    voter_name: String,
}

impl VotingBooth {
    pub fn new(sources: Vec<Arc<dyn CatalogSearch>>, submitter: BallotSubmitter) -> Self {
        Self {
            sources: sources.into_iter().map(|s| (s.category(), s)).collect(),
            submitter,
            selections: SelectionStore::new(),
            results: HashMap::new(),
            voter_name: String::new(),
        }
    }

    pub fn from_client(client: CatalogSearchClient, submitter: BallotSubmitter) -> Self {
        Self::new(client.into_sources(), submitter)
    }

    pub fn selections(&self) -> &SelectionStore {
        &self.selections
    }

    pub fn results(&self, category: Category) -> &[CatalogItem] {
        self.results.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn voter_name(&self) -> &str {
        &self.voter_name
    }

    pub fn set_voter_name(&mut self, name: impl Into<String>) {
        self.voter_name = name.into();
    }

    /// 搜尋並保留結果供 `pick` 使用；空白查詢直接清空結果
    pub async fn search(&mut self, category: Category, query: &str) -> &[CatalogItem] {
        let items = match self.sources.get(&category) {
            Some(source) => source.search(query).await,
            None => {
                tracing::warn!("⚠️ No search source configured for {}", category);
                Vec::new()
            }
        };
        self.results.insert(category, items);
        self.results(category)
    }

    /// 依目前結果的索引挑選，挑選後清除該類別的結果
    pub fn pick(&mut self, category: Category, result_index: usize) -> Result<AddOutcome> {
        let item = self
            .results(category)
            .get(result_index)
            .cloned()
            .ok_or_else(|| VoteError::ValidationError {
                message: format!("There is no {} result #{}", category, result_index + 1),
            })?;

        let outcome = self.selections.try_add(category, item)?;
        if matches!(outcome, AddOutcome::Added { .. }) {
            self.results.remove(&category);
        }
        Ok(outcome)
    }

    pub fn remove(&mut self, category: Category, index: usize) -> &[CatalogItem] {
        self.selections.remove(category, index)
    }

    pub fn move_up(&mut self, category: Category, index: usize) -> &[CatalogItem] {
        self.selections.move_up(category, index)
    }

    pub fn move_down(&mut self, category: Category, index: usize) -> &[CatalogItem] {
        self.selections.move_down(category, index)
    }

    pub fn clear(&mut self, category: Category) -> &[CatalogItem] {
        self.selections.clear(category)
    }

    pub fn readiness(&self) -> SubmitReadiness {
        SubmitReadiness::evaluate(&self.voter_name, &self.selections)
    }

    /// 送出選票。成功後清除所有選擇、結果與姓名；失敗時保留，讓使用者重送。
    pub async fn submit(&mut self) -> Result<DispatchReceipt> {
        let receipt = self.submitter.submit(&self.voter_name, &self.selections).await?;
        self.reset();
        Ok(receipt)
    }

    pub fn reset(&mut self) {
        self.selections.clear_all();
        self.results.clear();
        self.voter_name.clear();
    }
}
