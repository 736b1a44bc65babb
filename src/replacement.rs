//! 置換ポリシー（FIFO / ランダム）

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// 置換ポリシーの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReplacementPolicy {
    /// 挿入順で最も古いブロックを追い出す（ヒットで順序は変わらない）
    #[serde(rename = "FIFO", alias = "fifo", alias = "Fifo")]
    Fifo,
    /// セット内から一様ランダムに追い出す
    #[serde(
        rename = "RANDOM",
        alias = "random",
        alias = "Random",
        alias = "RAND",
        alias = "rand"
    )]
    Random,
}

impl ReplacementPolicy {
    /// 旧形式の設定ファイルでの番号（0: ランダム, 1: FIFO）から変換
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ReplacementPolicy::Random),
            1 => Some(ReplacementPolicy::Fifo),
            _ => None,
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicy::Fifo => write!(f, "FIFO"),
            ReplacementPolicy::Random => write!(f, "RANDOM"),
        }
    }
}

/// エンジンが値として保持する置換器
///
/// ランダム置換の乱数生成器はエンジンごとに所有され、スレッド間で共有されない。
#[derive(Debug, Clone)]
pub enum Replacer {
    Fifo,
    Random(StdRng),
}

impl Replacer {
    /// OS のエントロピーから乱数の種を取って置換器を作成
    pub fn new(policy: ReplacementPolicy) -> Self {
        match policy {
            ReplacementPolicy::Fifo => Replacer::Fifo,
            ReplacementPolicy::Random => Replacer::Random(StdRng::from_entropy()),
        }
    }

    /// 固定の種で置換器を作成（再現可能な実行用）
    pub fn with_seed(policy: ReplacementPolicy, seed: u64) -> Self {
        match policy {
            ReplacementPolicy::Fifo => Replacer::Fifo,
            ReplacementPolicy::Random => Replacer::Random(StdRng::seed_from_u64(seed)),
        }
    }

    /// 置換ポリシーの種類
    pub fn policy(&self) -> ReplacementPolicy {
        match self {
            Replacer::Fifo => ReplacementPolicy::Fifo,
            Replacer::Random(_) => ReplacementPolicy::Random,
        }
    }

    /// 満杯のセットから追い出すスロットを選択
    ///
    /// `oldest` は FIFO で最も古いスロット、`len` はセット内のスロット数（1 以上）。
    pub(crate) fn select_victim(&mut self, oldest: usize, len: usize) -> usize {
        match self {
            Replacer::Fifo => oldest,
            Replacer::Random(rng) => rng.gen_range(0..len),
        }
    }
}
