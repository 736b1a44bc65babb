//! キャッシュエンジンの実装

use crate::address::Address;
use crate::cache_set::{CacheBlock, CacheSet};
use crate::config::{CacheConfig, CacheGeometry};
use crate::error::ConfigError;
use crate::replacement::Replacer;
use crate::stats::{Results, StatisticsAccumulator};
use crate::trace::MemoryAccess;

/// キャッシュエンジン
///
/// セットと置換器（ランダム置換の乱数生成器を含む）を単独で所有するため、
/// エンジンごとに別スレッドへ移して実行できる。
#[derive(Debug, Clone)]
pub struct CacheEngine {
    /// 検証済みの構成
    geometry: CacheGeometry,
    /// キャッシュセット
    sets: Vec<CacheSet>,
    /// 置換器
    replacer: Replacer,
}

impl CacheEngine {
    /// 新しいキャッシュを作成（乱数の種は OS から取得）
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let geometry = CacheGeometry::new(config)?;
        Ok(Self::from_geometry(geometry, Replacer::new(geometry.replacement_policy)))
    }

    /// 乱数の種を指定してキャッシュを作成
    pub fn with_seed(config: &CacheConfig, seed: u64) -> Result<Self, ConfigError> {
        let geometry = CacheGeometry::new(config)?;
        Ok(Self::from_geometry(
            geometry,
            Replacer::with_seed(geometry.replacement_policy, seed),
        ))
    }

    /// 検証済みの構成と置換器からキャッシュを作成
    pub fn from_geometry(geometry: CacheGeometry, replacer: Replacer) -> Self {
        log::debug!(
            "キャッシュを作成: {} セット × {} ブロック, ライン {} バイト, {}, ライトアロケート={}",
            geometry.num_sets,
            geometry.blocks_per_set,
            geometry.line_size,
            replacer.policy(),
            geometry.write_allocate,
        );
        let sets = (0..geometry.num_sets)
            .map(|_| CacheSet::new(geometry.blocks_per_set as usize))
            .collect();
        Self {
            geometry,
            sets,
            replacer,
        }
    }

    /// メモリアクセスを行い、ヒットなら true を返す
    pub fn access(&mut self, address: Address, is_read: bool) -> bool {
        let decoded = self.geometry.layout.decode(address);
        let set = &mut self.sets[decoded.index];

        if set.lookup(decoded.tag) {
            // キャッシュヒット（FIFO もランダムも順序は変えない）
            return true;
        }

        // ノーライトアロケートでは書き込みミスをキャッシュに載せない
        if !is_read && !self.geometry.write_allocate {
            return false;
        }

        let block = CacheBlock {
            tag: decoded.tag,
            dirty: !is_read,
        };
        if let Some(evicted) = set.admit(block, &mut self.replacer) {
            log::trace!(
                "セット {} からタグ 0x{:X} を追い出し、タグ 0x{:X} を格納",
                decoded.index,
                evicted.tag,
                decoded.tag
            );
        }
        false
    }

    /// キャッシュをフラッシュ（全てのブロックを削除）
    pub fn clear(&mut self) {
        for set in &mut self.sets {
            set.clear();
        }
    }

    /// トレースを順に実行して結果を集計
    pub fn simulate(&mut self, trace: &[MemoryAccess]) -> Results {
        let mut stats = StatisticsAccumulator::new(self.geometry.miss_penalty);
        for access in trace {
            let hit = self.access(access.address, access.is_read);
            stats.observe(access.is_read, hit, access.gap);
        }
        stats.finalize()
    }

    /// 構成を取得
    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    /// キャッシュセットを取得
    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    /// 格納されているブロックの総数
    pub fn resident_blocks(&self) -> usize {
        self.sets.iter().map(CacheSet::len).sum()
    }
}

/// 新しいキャッシュでトレースを実行
pub fn simulate(config: &CacheConfig, trace: &[MemoryAccess]) -> Result<Results, ConfigError> {
    Ok(CacheEngine::new(config)?.simulate(trace))
}
