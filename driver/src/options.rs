use std::path::PathBuf;

use clap::Parser;
use writeback_cache::Workload;

/// Serves concurrent readers and writers of an item file through a
/// write-back LRU cache.
#[derive(Parser, Debug, Clone)]
#[command(name = "writeback-driver")]
#[command(about = "Run reader and writer workloads against a cached item file", long_about = None)]
pub struct Options {
  /// Maximum number of items kept in the cache
  pub capacity: usize,

  /// File listing one reader input path per line; answers go to `<input>.out`
  pub readers: PathBuf,

  /// File listing one writer input path per line
  pub writers: PathBuf,

  /// Item file, one value per line; key `n` maps to line `n - 1`
  pub items: PathBuf,

  /// Use exclusive locks instead of reader/writer locks
  #[arg(long)]
  pub write_heavy: bool,

  /// Store values as `f32` so items can live in lock-free atomics
  #[arg(long)]
  pub float_optimized: bool,

  /// Write every update through to the item file instead of on release
  #[arg(long)]
  pub realtime_consistent: bool,
}

impl Options {
  pub fn workload(&self) -> Workload {
    Workload::from_write_heavy(self.write_heavy)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn positional_arguments_and_flags() {
    let options =
      Options::try_parse_from(["writeback-driver", "16", "readers", "writers", "items", "--write-heavy"]).unwrap();
    assert_eq!(options.capacity, 16);
    assert_eq!(options.items, PathBuf::from("items"));
    assert_eq!(options.workload(), Workload::WriteHeavy);
    assert!(!options.float_optimized);
    assert!(!options.realtime_consistent);
  }

  #[test]
  fn missing_or_unknown_arguments_fail() {
    assert!(Options::try_parse_from(["writeback-driver", "16", "readers", "writers"]).is_err());
    assert!(Options::try_parse_from(["writeback-driver", "x", "r", "w", "i"]).is_err());
    assert!(Options::try_parse_from(["writeback-driver", "1", "r", "w", "i", "--fast"]).is_err());
  }
}
