//! シミュレーション統計の集計

use std::fmt;

use serde::Serialize;

/// シミュレーション結果
///
/// 分母が 0 になるヒット率（読み込みや書き込みが 1 回も無いトレース）は NaN とする。
/// 平均メモリアクセス時間も総アクセス数が 0 なら NaN になる。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Results {
    /// 全体のヒット率
    pub total_hit_rate: f64,
    /// 読み込みのヒット率
    pub read_hit_rate: f64,
    /// 書き込みのヒット率
    pub write_hit_rate: f64,
    /// 実行時間（サイクル）
    pub run_time: u64,
    /// 平均メモリアクセス時間（サイクル/アクセス）
    pub average_memory_access_time: f64,
}

/// 比率を計算（分母が 0 なら NaN）
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator as f64 / denominator as f64
    }
}

/// アクセスごとの結果を受け取り、最後に `Results` を作る集計器
#[derive(Debug, Clone, Default)]
pub struct StatisticsAccumulator {
    /// ミスペナルティ（サイクル）
    miss_penalty: u64,
    /// 読み込み数
    reads: u64,
    /// 書き込み数
    writes: u64,
    /// 読み込みミス数
    read_misses: u64,
    /// 書き込みミス数
    write_misses: u64,
    /// 実行命令数（メモリ命令を含む）
    instructions: u64,
}

impl StatisticsAccumulator {
    pub fn new(miss_penalty: u32) -> Self {
        Self {
            miss_penalty: u64::from(miss_penalty),
            ..Self::default()
        }
    }

    /// 1 回のアクセス結果を記録（トレース順に呼ぶ）
    pub fn observe(&mut self, is_read: bool, is_hit: bool, gap: u32) {
        if is_read {
            self.reads += 1;
            if !is_hit {
                self.read_misses += 1;
            }
        } else {
            self.writes += 1;
            if !is_hit {
                self.write_misses += 1;
            }
        }
        self.instructions += u64::from(gap) + 1;
    }

    /// 総アクセス数
    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    /// 総ミス数
    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// 集計結果を確定
    pub fn finalize(self) -> Results {
        if self.reads == 0 {
            log::warn!("読み込みが 1 回もないため、読み込みヒット率は未定義です");
        }
        if self.writes == 0 {
            log::warn!("書き込みが 1 回もないため、書き込みヒット率は未定義です");
        }

        let total_hit_rate = 1.0 - ratio(self.misses(), self.accesses());
        Results {
            total_hit_rate,
            read_hit_rate: 1.0 - ratio(self.read_misses, self.reads),
            write_hit_rate: 1.0 - ratio(self.write_misses, self.writes),
            run_time: self.instructions + self.misses() * self.miss_penalty,
            average_memory_access_time: 1.0 + (1.0 - total_hit_rate) * self.miss_penalty as f64,
        }
    }
}

/// ヒット率を百分率で表示（未定義なら N/A）
struct Percent(f64);

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            write!(f, "N/A")
        } else {
            write!(f, "{:.2}%", self.0 * 100.0)
        }
    }
}

impl Results {
    pub(crate) fn percent(rate: f64) -> impl fmt::Display {
        Percent(rate)
    }
}

impl fmt::Display for Results {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "シミュレーション結果:")?;
        writeln!(f, "  全体ヒット率: {}", Percent(self.total_hit_rate))?;
        writeln!(f, "  読み込みヒット率: {}", Percent(self.read_hit_rate))?;
        writeln!(f, "  書き込みヒット率: {}", Percent(self.write_hit_rate))?;
        writeln!(f, "  実行時間: {} サイクル", self.run_time)?;
        if self.average_memory_access_time.is_nan() {
            write!(f, "  平均メモリアクセス時間: N/A")
        } else {
            write!(f, "  平均メモリアクセス時間: {:.4} サイクル", self.average_memory_access_time)
        }
    }
}
