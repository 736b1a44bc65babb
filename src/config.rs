//! キャッシュ構成と設定ファイルの読み込み

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::AddressLayout;
use crate::error::{ConfigError, SimulatorError};
use crate::replacement::ReplacementPolicy;

/// キャッシュの設定（検証前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// ラインサイズ（バイト）
    pub line_size: u32,
    /// 連想度（0 ならフルアソシアティブ）
    pub associativity: u32,
    /// キャッシュサイズ（バイト）
    pub cache_size: u32,
    /// 置換ポリシー
    pub replacement_policy: ReplacementPolicy,
    /// ミスペナルティ（サイクル）
    pub miss_penalty: u32,
    /// ライトアロケートかどうか（false ならノーライトアロケート・ライトスルー）
    pub write_allocate: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            line_size: 32,
            associativity: 4,
            cache_size: 32 * 1024, // 32KB
            replacement_policy: ReplacementPolicy::Fifo,
            miss_penalty: 30,
            write_allocate: true,
        }
    }
}

impl CacheConfig {
    /// 旧形式の設定を解析
    ///
    /// 空白区切りの 6 つの数値: ラインサイズ, 連想度, キャッシュサイズ(KB),
    /// 置換ポリシー(0: ランダム, 1: FIFO), ミスペナルティ, ライトアロケート(0/1)
    pub fn parse_legacy(text: &str) -> Result<Self, SimulatorError> {
        let mut values = Vec::with_capacity(6);
        for (line_num, line) in text.lines().enumerate() {
            // コメント以降は無視
            let line = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line,
            };
            for token in line.split_whitespace() {
                let value = token.parse::<u32>().map_err(|e| {
                    SimulatorError::parse(line_num + 1, format!("数値ではありません: '{}': {}", token, e))
                })?;
                values.push((line_num + 1, value));
            }
        }

        if values.len() != 6 {
            let line = values.last().map_or(1, |&(line, _)| line);
            return Err(SimulatorError::parse(
                line,
                format!("設定値は 6 個必要ですが {} 個あります", values.len()),
            ));
        }

        let (size_line, size_kib) = values[2];
        let cache_size = size_kib.checked_mul(1024).ok_or_else(|| {
            SimulatorError::parse(size_line, format!("キャッシュサイズが大きすぎます: {}KB", size_kib))
        })?;

        let (policy_line, policy_code) = values[3];
        let replacement_policy = ReplacementPolicy::from_code(policy_code).ok_or_else(|| {
            SimulatorError::parse(policy_line, format!("不明な置換ポリシーです: {}", policy_code))
        })?;

        let (alloc_line, write_allocate) = values[5];
        let write_allocate = match write_allocate {
            0 => false,
            1 => true,
            other => {
                return Err(SimulatorError::parse(
                    alloc_line,
                    format!("ライトアロケートは 0 か 1 です: {}", other),
                ))
            }
        };

        Ok(Self {
            line_size: values[0].1,
            associativity: values[1].1,
            cache_size,
            replacement_policy,
            miss_penalty: values[4].1,
            write_allocate,
        })
    }

    /// TOML 形式の設定を解析
    pub fn parse_toml(text: &str) -> Result<Self, SimulatorError> {
        Ok(toml::from_str(text)?)
    }

    /// 設定ファイルを読み込む（拡張子が .toml なら TOML、それ以外は旧形式）
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimulatorError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimulatorError::File {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            Self::parse_toml(&text)
        } else {
            Self::parse_legacy(&text)
        }
    }
}

/// 名前付きのキャッシュ設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedConfig {
    pub name: String,
    pub config: CacheConfig,
}

impl NamedConfig {
    /// 設定ファイルを読み込み、ファイル名（拡張子なし）を名前にする
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimulatorError> {
        let path = path.as_ref();
        let config = CacheConfig::from_file(path)?;
        Ok(Self {
            name: file_stem(path),
            config,
        })
    }
}

/// ファイル名から拡張子を除いた部分
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 検証済みのキャッシュ構成
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    /// ラインサイズ（バイト）
    pub line_size: u32,
    /// 連想度（0 ならフルアソシアティブ）
    pub associativity: u32,
    /// キャッシュサイズ（バイト）
    pub cache_size: u32,
    /// セット数
    pub num_sets: u32,
    /// 1 セットあたりの最大ブロック数
    pub blocks_per_set: u32,
    /// ライトアロケートかどうか
    pub write_allocate: bool,
    /// 置換ポリシー
    pub replacement_policy: ReplacementPolicy,
    /// ミスペナルティ（サイクル）
    pub miss_penalty: u32,
    /// アドレスのビット配置
    pub layout: AddressLayout,
}

impl CacheGeometry {
    /// 設定を検証して構成を導出
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        let CacheConfig {
            line_size,
            associativity,
            cache_size,
            ..
        } = *config;

        if line_size == 0 {
            return Err(ConfigError::Zero { field: "line_size" });
        }
        if cache_size == 0 {
            return Err(ConfigError::Zero { field: "cache_size" });
        }
        if !line_size.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "line_size",
                value: line_size,
            });
        }

        let (num_sets, blocks_per_set) = if associativity == 0 {
            // フルアソシアティブ: セットは 1 つだけ
            if cache_size % line_size != 0 {
                return Err(ConfigError::NotDivisible {
                    cache_size,
                    set_bytes: line_size,
                });
            }
            (1, cache_size / line_size)
        } else {
            let set_bytes = associativity
                .checked_mul(line_size)
                .ok_or(ConfigError::Overflow {
                    associativity,
                    line_size,
                })?;
            if cache_size % set_bytes != 0 {
                return Err(ConfigError::NotDivisible {
                    cache_size,
                    set_bytes,
                });
            }
            (cache_size / set_bytes, associativity)
        };

        if !num_sets.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwo {
                field: "num_sets",
                value: num_sets,
            });
        }

        Ok(Self {
            line_size,
            associativity,
            cache_size,
            num_sets,
            blocks_per_set,
            write_allocate: config.write_allocate,
            replacement_policy: config.replacement_policy,
            miss_penalty: config.miss_penalty,
            layout: AddressLayout::new(line_size, num_sets),
        })
    }

    /// フルアソシアティブかどうか
    pub fn is_fully_associative(&self) -> bool {
        self.associativity == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config(line_size: u32, associativity: u32, cache_size: u32) -> CacheConfig {
        CacheConfig {
            line_size,
            associativity,
            cache_size,
            replacement_policy: ReplacementPolicy::Fifo,
            miss_penalty: 70,
            write_allocate: false,
        }
    }

    #[test]
    fn test_geometry_derivation() {
        let geometry = CacheGeometry::new(&config(32, 2, 128 * 1024)).unwrap();
        assert_eq!(geometry.num_sets, (128 * 1024) / (32 * 2));
        assert_eq!(geometry.blocks_per_set, 2);
        assert_eq!(geometry.layout.offset_bits(), 5);
        assert_eq!(geometry.layout.index_bits(), 11);
        assert_eq!(geometry.layout.tag_bits(), 16);
        assert!(!geometry.write_allocate);
    }

    #[test]
    fn test_fully_associative_geometry() {
        let geometry = CacheGeometry::new(&config(16, 0, 1024)).unwrap();
        assert!(geometry.is_fully_associative());
        assert_eq!(geometry.num_sets, 1);
        assert_eq!(geometry.blocks_per_set, 64);
        assert_eq!(geometry.layout.index_bits(), 0);
        assert_eq!(geometry.layout.tag_bits(), 28);
    }

    #[test]
    fn test_invalid_geometries() {
        assert_eq!(
            CacheGeometry::new(&config(24, 2, 1024)),
            Err(ConfigError::NotPowerOfTwo { field: "line_size", value: 24 })
        );
        assert_eq!(
            CacheGeometry::new(&config(0, 2, 1024)),
            Err(ConfigError::Zero { field: "line_size" })
        );
        assert_eq!(
            CacheGeometry::new(&config(16, 2, 0)),
            Err(ConfigError::Zero { field: "cache_size" })
        );
        assert_eq!(
            CacheGeometry::new(&config(16, 3, 1024)),
            Err(ConfigError::NotDivisible { cache_size: 1024, set_bytes: 48 })
        );
        // 3 セットは 2 の累乗ではない
        assert_eq!(
            CacheGeometry::new(&config(16, 2, 96)),
            Err(ConfigError::NotPowerOfTwo { field: "num_sets", value: 3 })
        );
        // 1 セット分にも満たない
        assert_eq!(
            CacheGeometry::new(&config(16, 4, 32)),
            Err(ConfigError::NotDivisible { cache_size: 32, set_bytes: 64 })
        );
        assert_eq!(
            CacheGeometry::new(&config(1 << 20, 1 << 13, 1 << 30)),
            Err(ConfigError::Overflow { associativity: 1 << 13, line_size: 1 << 20 })
        );
    }

    #[test]
    fn test_non_power_of_two_associativity_is_allowed() {
        // 連想度そのものは 2 の累乗でなくてもよい
        let geometry = CacheGeometry::new(&config(16, 3, 16 * 3 * 4)).unwrap();
        assert_eq!(geometry.num_sets, 4);
        assert_eq!(geometry.blocks_per_set, 3);
    }

    #[test]
    fn test_parse_legacy() {
        let parsed = CacheConfig::parse_legacy("8\n4\n16\n1\n30\n1\n").unwrap();
        assert_eq!(
            parsed,
            CacheConfig {
                line_size: 8,
                associativity: 4,
                cache_size: 16 * 1024,
                replacement_policy: ReplacementPolicy::Fifo,
                miss_penalty: 30,
                write_allocate: true,
            }
        );

        let parsed = CacheConfig::parse_legacy("32 0 64 0 70 0 # フルアソシアティブ").unwrap();
        assert_eq!(parsed.associativity, 0);
        assert_eq!(parsed.replacement_policy, ReplacementPolicy::Random);
        assert!(!parsed.write_allocate);
    }

    #[test]
    fn test_parse_legacy_errors() {
        assert!(matches!(
            CacheConfig::parse_legacy("8 4 16 1 30"),
            Err(SimulatorError::Parse { .. })
        ));
        assert!(matches!(
            CacheConfig::parse_legacy("8\n4\nabc\n1\n30\n1"),
            Err(SimulatorError::Parse { line: 3, .. })
        ));
        assert!(matches!(
            CacheConfig::parse_legacy("8 4 16 5 30 1"),
            Err(SimulatorError::Parse { .. })
        ));
        assert!(matches!(
            CacheConfig::parse_legacy("8 4 16 1 30 2"),
            Err(SimulatorError::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
            line_size = 64
            associativity = 8
            cache_size = 65536
            replacement_policy = "random"
            miss_penalty = 100
            write_allocate = true
        "#;
        let parsed = CacheConfig::parse_toml(text).unwrap();
        assert_eq!(parsed.line_size, 64);
        assert_eq!(parsed.cache_size, 65536);
        assert_eq!(parsed.replacement_policy, ReplacementPolicy::Random);

        assert!(matches!(
            CacheConfig::parse_toml("line_size = 64"),
            Err(SimulatorError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();

        let legacy_path = dir.path().join("4way-fifo.conf");
        let mut file = std::fs::File::create(&legacy_path).unwrap();
        writeln!(file, "16\n4\n32\n1\n50\n1").unwrap();
        let named = NamedConfig::from_file(&legacy_path).unwrap();
        assert_eq!(named.name, "4way-fifo");
        assert_eq!(named.config.cache_size, 32 * 1024);

        let toml_path = dir.path().join("direct.toml");
        std::fs::write(
            &toml_path,
            "line_size = 4\nassociativity = 1\ncache_size = 1024\n\
             replacement_policy = \"FIFO\"\nmiss_penalty = 10\nwrite_allocate = false\n",
        )
        .unwrap();
        let named = NamedConfig::from_file(&toml_path).unwrap();
        assert_eq!(named.name, "direct");
        assert_eq!(named.config.associativity, 1);

        let missing = dir.path().join("missing.conf");
        assert!(matches!(
            CacheConfig::from_file(&missing),
            Err(SimulatorError::File { .. })
        ));
    }
}
