//! セットアソシアティブキャッシュのシミュレータ
//!
//! メモリアクセスのトレースをキャッシュ構成ごとに実行し、ヒット率と
//! 平均メモリアクセス時間を求める。

pub mod address;
pub mod cache;
pub mod cache_set;
pub mod config;
pub mod error;
pub mod replacement;
pub mod report;
pub mod simulator;
pub mod stats;
pub mod trace;

pub use address::{Address, AddressLayout, DecodedAddress};
pub use cache::{simulate, CacheEngine};
pub use cache_set::{CacheBlock, CacheSet};
pub use config::{CacheConfig, CacheGeometry, NamedConfig};
pub use error::{ConfigError, SimulatorError};
pub use replacement::{ReplacementPolicy, Replacer};
pub use simulator::{run_all, SimulationRun, SimulatorOptions};
pub use stats::{Results, StatisticsAccumulator};
pub use trace::{MemoryAccess, Trace};
