//! 複数の設定 × 複数のトレースのシミュレーション実行

use rayon::prelude::*;
use serde::Serialize;

use crate::cache::CacheEngine;
use crate::config::{CacheGeometry, NamedConfig};
use crate::error::ConfigError;
use crate::replacement::Replacer;
use crate::stats::Results;
use crate::trace::Trace;

/// シミュレータの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulatorOptions {
    /// 組み合わせごとに並列実行するかどうか
    pub parallel: bool,
    /// ランダム置換の乱数の種（None なら OS から取得）
    pub seed: Option<u64>,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            seed: None,
        }
    }
}

/// 1 つの (設定, トレース) の組み合わせの結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRun {
    pub config: String,
    pub trace: String,
    pub results: Results,
}

/// 1 つの組み合わせを新しいキャッシュで実行
fn run_one(geometry: CacheGeometry, config: &str, trace: &Trace, seed: Option<u64>) -> SimulationRun {
    let replacer = match seed {
        Some(seed) => Replacer::with_seed(geometry.replacement_policy, seed),
        None => Replacer::new(geometry.replacement_policy),
    };
    let mut cache = CacheEngine::from_geometry(geometry, replacer);

    log::info!("シミュレーション開始: {} × {} ({} アクセス)", config, trace.name, trace.len());
    let results = cache.simulate(&trace.accesses);
    log::info!(
        "シミュレーション終了: {} × {} (ヒット率 {})",
        config,
        trace.name,
        Results::percent(results.total_hit_rate)
    );

    SimulationRun {
        config: config.to_string(),
        trace: trace.name.clone(),
        results,
    }
}

/// 全ての設定と全てのトレースの組み合わせを実行
///
/// 設定は実行前にすべて検証し、不正なものがあれば何も実行せずにエラーを返す。
/// 結果は並列実行の有無にかかわらず設定順、その中でトレース順に並ぶ。
pub fn run_all(
    configs: &[NamedConfig],
    traces: &[Trace],
    options: SimulatorOptions,
) -> Result<Vec<SimulationRun>, ConfigError> {
    let geometries = configs
        .iter()
        .map(|named| CacheGeometry::new(&named.config).map(|geometry| (named.name.as_str(), geometry)))
        .collect::<Result<Vec<_>, ConfigError>>()?;

    let jobs: Vec<_> = geometries
        .iter()
        .flat_map(|&(name, geometry)| traces.iter().map(move |trace| (name, geometry, trace)))
        .collect();

    let runs: Vec<SimulationRun> = if options.parallel {
        jobs.par_iter()
            .map(|&(name, geometry, trace)| run_one(geometry, name, trace, options.seed))
            .collect()
    } else {
        jobs.iter()
            .map(|&(name, geometry, trace)| run_one(geometry, name, trace, options.seed))
            .collect()
    };
    Ok(runs)
}
