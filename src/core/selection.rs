use crate::domain::model::{CatalogItem, Category};
use crate::utils::error::{Result, VoteError};

/// 每個類別最多可選的數量
pub const MAX_PICKS: usize = 3;

pub const RANK_LABELS: [&str; MAX_PICKS] = ["1st", "2nd", "3rd"];

/// `add` 的結果；容量已滿或重複都不是錯誤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// 新加入，附帶 1 起算的名次
    Added { rank: usize },
    Duplicate,
    Full,
}

/// 單一類別的排名清單，索引 0 為第一名
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedSelection {
    items: Vec<CatalogItem>,
}

impl RankedSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&CatalogItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_PICKS
    }

    pub fn remaining_slots(&self) -> usize {
        MAX_PICKS - self.items.len()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.items.iter().any(|i| i.id == id)
    }

    /// 1 起算的名次
    pub fn rank_of(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|i| i.id == id).map(|p| p + 1)
    }

    /// 新項目一律排在下一個空位
    pub fn add(&mut self, item: CatalogItem) -> AddOutcome {
        if self.contains(item.id) {
            return AddOutcome::Duplicate;
        }
        if self.is_full() {
            return AddOutcome::Full;
        }
        self.items.push(item);
        AddOutcome::Added {
            rank: self.items.len(),
        }
    }

    /// 與 `add` 相同，但容量已滿時回傳 `CapacityError`
    pub fn try_add(&mut self, category: Category, item: CatalogItem) -> Result<AddOutcome> {
        match self.add(item) {
            AddOutcome::Full => Err(VoteError::CapacityError {
                category,
                max: MAX_PICKS,
            }),
            outcome => Ok(outcome),
        }
    }

    /// 移除後後面的名次往前補
    pub fn remove(&mut self, index: usize) -> Option<CatalogItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// 與前一名交換；索引 0 或超出範圍時不動作
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.items.len() {
            return false;
        }
        self.items.swap(index - 1, index);
        true
    }

    /// 與後一名交換；最後一名或超出範圍時不動作
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.items.len() {
            return false;
        }
        self.items.swap(index, index + 1);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// 給選票使用的三個欄位，空位為空字串
    pub fn ballot_slots(&self) -> [String; MAX_PICKS] {
        std::array::from_fn(|i| self.items.get(i).map(CatalogItem::ballot_label).unwrap_or_default())
    }
}

/// 三個類別的選擇，由呼叫端持有並傳入需要的地方
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionStore {
    movie: RankedSelection,
    tv: RankedSelection,
    game: RankedSelection,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category) -> &RankedSelection {
        match category {
            Category::Movie => &self.movie,
            Category::Tv => &self.tv,
            Category::Game => &self.game,
        }
    }

    fn get_mut(&mut self, category: Category) -> &mut RankedSelection {
        match category {
            Category::Movie => &mut self.movie,
            Category::Tv => &mut self.tv,
            Category::Game => &mut self.game,
        }
    }

    pub fn add(&mut self, category: Category, item: CatalogItem) -> AddOutcome {
        let outcome = self.get_mut(category).add(item);
        tracing::debug!("🗳️ add to {}: {:?}", category, outcome);
        outcome
    }

    pub fn try_add(&mut self, category: Category, item: CatalogItem) -> Result<AddOutcome> {
        self.get_mut(category).try_add(category, item)
    }

    /// 以下變更都回傳該類別變更後的清單，方便直接重新顯示
    pub fn remove(&mut self, category: Category, index: usize) -> &[CatalogItem] {
        let selection = self.get_mut(category);
        selection.remove(index);
        selection.items()
    }

    pub fn move_up(&mut self, category: Category, index: usize) -> &[CatalogItem] {
        let selection = self.get_mut(category);
        selection.move_up(index);
        selection.items()
    }

    pub fn move_down(&mut self, category: Category, index: usize) -> &[CatalogItem] {
        let selection = self.get_mut(category);
        selection.move_down(index);
        selection.items()
    }

    pub fn clear(&mut self, category: Category) -> &[CatalogItem] {
        let selection = self.get_mut(category);
        selection.clear();
        selection.items()
    }

    pub fn clear_all(&mut self) {
        for category in Category::ALL {
            self.get_mut(category).clear();
        }
    }

    pub fn total_picks(&self) -> usize {
        Category::ALL.iter().map(|c| self.get(*c).len()).sum()
    }
}
