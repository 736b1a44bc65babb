//! エラー型の定義

use std::path::PathBuf;

use thiserror::Error;

/// キャッシュ構成の不正
///
/// エンジン構築時にのみ発生し、そのエンジンでのシミュレーションは行えない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} は 0 にできません")]
    Zero { field: &'static str },

    #[error("{field} は 2 の累乗である必要があります: {value}")]
    NotPowerOfTwo { field: &'static str, value: u32 },

    #[error("キャッシュサイズ {cache_size} が 連想度 × ラインサイズ ({set_bytes}) で割り切れません")]
    NotDivisible { cache_size: u32, set_bytes: u32 },

    #[error("連想度 {associativity} × ラインサイズ {line_size} がアドレス空間を超えています")]
    Overflow { associativity: u32, line_size: u32 },
}

/// シミュレータ全体のエラー
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("ファイル '{}' を読み込めません: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{line} 行目: {message}")]
    Parse { line: usize, message: String },

    #[error("TOML の解析に失敗しました: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SimulatorError {
    /// 行番号付きの解析エラーを作成
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SimulatorError::Parse {
            line,
            message: message.into(),
        }
    }
}
