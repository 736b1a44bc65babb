//! キャッシュセット（インデックスごとのブロック集合）

use std::collections::HashMap;

use crate::replacement::Replacer;

/// セット内のブロックを指す安定したハンドル（スロット番号）
pub type BlockHandle = usize;

/// キャッシュブロック
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheBlock {
    /// タグ
    pub tag: u32,
    /// ダーティビット（書き込みで格納されたかどうか）
    ///
    /// 記録するだけで、タイミングや追い出しの判断には使わない。
    pub dirty: bool,
}

/// キャッシュセット
///
/// ブロックはスロットの配列に格納し、タグからスロットへの索引を別に持つ。
/// スロットは先頭から順に埋まり、クリアされるまで減らないため、
/// FIFO の最古ブロックは巡回するカーソル一つで表せる。
#[derive(Debug, Clone)]
pub struct CacheSet {
    /// 最大ブロック数
    capacity: usize,
    /// ブロックのスロット
    slots: Vec<CacheBlock>,
    /// タグからスロットへの索引
    lookup: HashMap<u32, BlockHandle>,
    /// 挿入順で最も古いスロット
    oldest: BlockHandle,
}

impl CacheSet {
    /// 空のキャッシュセットを作成
    ///
    /// 領域は格納したブロックの分だけ確保する。フルアソシアティブでは
    /// `capacity` がキャッシュ全体のブロック数になるため、先に確保しない。
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::new(),
            lookup: HashMap::new(),
            oldest: 0,
        }
    }

    /// 最大ブロック数
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 現在のブロック数
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// 指定されたタグのブロックが存在するか
    pub fn lookup(&self, tag: u32) -> bool {
        self.lookup.contains_key(&tag)
    }

    /// 指定されたタグのブロックを取得
    pub fn get(&self, tag: u32) -> Option<&CacheBlock> {
        self.lookup.get(&tag).map(|&handle| &self.slots[handle])
    }

    /// ブロックを格納し、満杯なら置換器の選んだブロックを追い出して返す
    ///
    /// 呼び出し側は `tag` がセット内に無いことを確認してから呼ぶ。
    pub fn admit(&mut self, block: CacheBlock, replacer: &mut Replacer) -> Option<CacheBlock> {
        debug_assert!(!self.lookup(block.tag));

        if !self.is_full() {
            let handle = self.slots.len();
            self.slots.push(block);
            self.lookup.insert(block.tag, handle);
            return None;
        }

        let handle = replacer.select_victim(self.oldest, self.slots.len());
        let evicted = std::mem::replace(&mut self.slots[handle], block);
        self.lookup.remove(&evicted.tag);
        self.lookup.insert(block.tag, handle);

        // 最古のスロットを置き換えた場合のみ、次に古いスロットへ進める
        if handle == self.oldest {
            self.oldest = (self.oldest + 1) % self.slots.len();
        }

        Some(evicted)
    }

    /// 全てのブロックを削除し、置換の状態をリセット
    pub fn clear(&mut self) {
        self.slots.clear();
        self.lookup.clear();
        self.oldest = 0;
    }

    /// 格納されているブロックを列挙
    pub fn resident(&self) -> impl Iterator<Item = &CacheBlock> {
        self.slots.iter()
    }
}
