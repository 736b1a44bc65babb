//! シミュレーション結果の表示

use std::fmt::Write;

use crate::simulator::SimulationRun;
use crate::stats::Results;

/// 結果を表形式の文字列にする
pub fn render_table(runs: &[SimulationRun]) -> String {
    let config_width = runs
        .iter()
        .map(|run| run.config.chars().count())
        .chain(std::iter::once("config".len()))
        .max()
        .unwrap_or(0);
    let trace_width = runs
        .iter()
        .map(|run| run.trace.chars().count())
        .chain(std::iter::once("trace".len()))
        .max()
        .unwrap_or(0);

    let mut table = String::new();
    // String への書き込みは失敗しない
    let _ = writeln!(
        table,
        "{:<cw$}  {:<tw$}  {:>9}  {:>9}  {:>9}  {:>12}  {:>10}",
        "config",
        "trace",
        "total",
        "load",
        "store",
        "run time",
        "AMAT",
        cw = config_width,
        tw = trace_width,
    );
    for run in runs {
        let r = &run.results;
        let amat = if r.average_memory_access_time.is_nan() {
            "N/A".to_string()
        } else {
            format!("{:.4}", r.average_memory_access_time)
        };
        let _ = writeln!(
            table,
            "{:<cw$}  {:<tw$}  {:>9}  {:>9}  {:>9}  {:>12}  {:>10}",
            run.config,
            run.trace,
            Results::percent(r.total_hit_rate).to_string(),
            Results::percent(r.read_hit_rate).to_string(),
            Results::percent(r.write_hit_rate).to_string(),
            r.run_time,
            amat,
            cw = config_width,
            tw = trace_width,
        );
    }
    table
}

/// 結果を JSON にする（未定義のヒット率は null）
pub fn to_json(runs: &[SimulationRun]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(runs)
}
