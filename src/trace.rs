//! メモリアクセスのトレース

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::config::file_stem;
use crate::error::SimulatorError;

/// 1 回のメモリアクセス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryAccess {
    /// アクセスするアドレス
    pub address: Address,
    /// true: ロード, false: ストア
    pub is_read: bool,
    /// 直前のメモリアクセスから実行されたメモリ以外の命令数
    pub gap: u32,
}

impl MemoryAccess {
    pub fn load(address: Address, gap: u32) -> Self {
        Self {
            address,
            is_read: true,
            gap,
        }
    }

    pub fn store(address: Address, gap: u32) -> Self {
        Self {
            address,
            is_read: false,
            gap,
        }
    }

    /// トレースの 1 行（例: `l 0x1fffff50 1`）を解析
    ///
    /// 空行とコメント行は `Ok(None)` を返す。
    pub fn parse_line(line_num: usize, line: &str) -> Result<Option<Self>, SimulatorError> {
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut fields = line.split_whitespace();
        let (kind, address, gap) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(kind), Some(address), Some(gap), None) => (kind, address, gap),
            _ => {
                return Err(SimulatorError::parse(
                    line_num,
                    format!("'<l|s> <アドレス> <命令数>' の形式ではありません: '{}'", line),
                ))
            }
        };

        let is_read = match kind {
            "l" | "L" => true,
            "s" | "S" => false,
            other => {
                return Err(SimulatorError::parse(
                    line_num,
                    format!("不明なアクセス種別です: '{}'", other),
                ))
            }
        };

        let hex = address
            .strip_prefix("0x")
            .or_else(|| address.strip_prefix("0X"))
            .unwrap_or(address);
        let address = Address::from_str_radix(hex, 16).map_err(|e| {
            SimulatorError::parse(
                line_num,
                format!("文字列から16進数への変換に失敗しました: '{}': {}", address, e),
            )
        })?;

        let gap = gap.parse::<u32>().map_err(|e| {
            SimulatorError::parse(line_num, format!("命令数が不正です: '{}': {}", gap, e))
        })?;

        Ok(Some(Self { address, is_read, gap }))
    }
}

/// 名前付きのトレース
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub name: String,
    pub accesses: Vec<MemoryAccess>,
}

impl Trace {
    pub fn new(name: impl Into<String>, accesses: Vec<MemoryAccess>) -> Self {
        Self {
            name: name.into(),
            accesses,
        }
    }

    /// 任意の読み込み元からトレースを解析
    pub fn parse<R: BufRead>(name: impl Into<String>, reader: R) -> Result<Self, SimulatorError> {
        let mut accesses = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| {
                SimulatorError::parse(line_num + 1, format!("行を読み込めませんでした: {}", e))
            })?;
            if let Some(access) = MemoryAccess::parse_line(line_num + 1, &line)? {
                accesses.push(access);
            }
        }
        Ok(Self::new(name, accesses))
    }

    /// トレースファイルを読み込み、ファイル名（拡張子なし）を名前にする
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SimulatorError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SimulatorError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let trace = Self::parse(file_stem(path), BufReader::new(file))?;
        log::debug!("トレース '{}' を読み込みました ({} アクセス)", trace.name, trace.len());
        Ok(trace)
    }

    pub fn len(&self) -> usize {
        self.accesses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accesses.is_empty()
    }
}
