//! 結果一覧のタブ（フィルタ）

use crate::types::ReferenceResult;

/// 詳細一覧のフィルタ
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResultFilter {
    All,
    Valid,
    Invalid,
    #[default]
    Indexed,
}

impl ResultFilter {
    pub const TABS: [ResultFilter; 4] = [
        ResultFilter::Indexed,
        ResultFilter::Valid,
        ResultFilter::Invalid,
        ResultFilter::All,
    ];

    pub fn matches(&self, result: &ReferenceResult) -> bool {
        match self {
            ResultFilter::All => true,
            ResultFilter::Valid => result.status.is_valid(),
            ResultFilter::Invalid => !result.status.is_valid(),
            ResultFilter::Indexed => result.is_indexed(),
        }
    }

    /// 元の順序を保ったまま絞り込む
    pub fn apply<'a>(&self, results: &'a [ReferenceResult]) -> Vec<(usize, &'a ReferenceResult)> {
        results
            .iter()
            .enumerate()
            .filter(|(_, r)| self.matches(r))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResultFilter::All => "Semua",
            ResultFilter::Valid => "Valid",
            ResultFilter::Invalid => "Invalid",
            ResultFilter::Indexed => "Terindeks",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultFilter::All => "all",
            ResultFilter::Valid => "valid",
            ResultFilter::Invalid => "invalid",
            ResultFilter::Indexed => "indexed",
        }
    }
}

/// タブごとの件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TabCounts {
    pub all: usize,
    pub valid: usize,
    pub invalid: usize,
    pub indexed: usize,
}

impl TabCounts {
    pub fn from_results(results: &[ReferenceResult]) -> Self {
        let count = |filter: ResultFilter| results.iter().filter(|r| filter.matches(r)).count();
        Self {
            all: results.len(),
            valid: count(ResultFilter::Valid),
            invalid: count(ResultFilter::Invalid),
            indexed: count(ResultFilter::Indexed),
        }
    }

    pub fn get(&self, filter: ResultFilter) -> usize {
        match filter {
            ResultFilter::All => self.all,
            ResultFilter::Valid => self.valid,
            ResultFilter::Invalid => self.invalid,
            ResultFilter::Indexed => self.indexed,
        }
    }
}
