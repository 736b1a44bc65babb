use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use cache_simulator::{report, run_all, NamedConfig, SimulatorOptions, Trace};

/// キャッシュシミュレータ
#[derive(Debug, Parser)]
#[command(name = "cache_simulator", version, about = "セットアソシアティブキャッシュのシミュレータ")]
struct Cli {
    /// キャッシュ設定ファイル（.toml または 6 数値形式）
    #[arg(short = 'c', long = "cache-conf", value_name = "FILE", required = true, num_args = 1..)]
    configs: Vec<PathBuf>,

    /// メモリアクセスのトレースファイル
    #[arg(short = 't', long = "trace", visible_short_alias = 's', visible_alias = "stack-trace", value_name = "FILE", required = true, num_args = 1..)]
    traces: Vec<PathBuf>,

    /// 組み合わせを順番に実行する（既定は並列）
    #[arg(long)]
    serial: bool,

    /// ランダム置換の乱数の種
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// 結果を JSON で出力
    #[arg(long)]
    json: bool,

    /// ログを詳しくする（-v: info, -vv: debug, -vvv: trace）
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> SimulatorOptions {
        SimulatorOptions {
            parallel: !self.serial,
            seed: self.seed,
        }
    }

    fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter())).init();

    if let Err(e) = run(&cli) {
        eprintln!("エラー: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let configs = cli
        .configs
        .iter()
        .map(|path| {
            NamedConfig::from_file(path)
                .with_context(|| format!("設定ファイル '{}' の読み込みに失敗しました", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let traces = cli
        .traces
        .iter()
        .map(|path| {
            Trace::from_file(path)
                .with_context(|| format!("トレースファイル '{}' の読み込みに失敗しました", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    let runs = run_all(&configs, &traces, cli.options()).context("キャッシュ設定が不正です")?;

    if cli.json {
        println!("{}", report::to_json(&runs)?);
    } else {
        print!("{}", report::render_table(&runs));
    }
    Ok(())
}
