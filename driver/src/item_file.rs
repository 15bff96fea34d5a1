use crate::error::{Error, Result};

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use writeback_cache::{LockStrategy, Workload};

/// A line-oriented backing store: item `n` (1-based) lives on line `n - 1`.
///
/// Reads take the shared side of the file's lock and writes the exclusive
/// side. A write rewrites the whole file through `<path>.tmp` and renames
/// it over the original, so readers never see a half-written file.
#[derive(Debug)]
pub struct ItemFile {
  path: LockStrategy<PathBuf>,
}

impl ItemFile {
  /// Opens an existing, non-empty item file.
  pub fn open(path: impl Into<PathBuf>, workload: Workload) -> Result<Self> {
    let path = path.into();
    let metadata = File::open(&path)
      .and_then(|file| file.metadata())
      .map_err(|err| Error::io(&path, err))?;
    if metadata.len() == 0 {
      return Err(Error::EmptyItemFile(path));
    }

    tracing::debug!(path = %path.display(), %workload, "opened item file");
    Ok(Self {
      path: LockStrategy::new(path, workload),
    })
  }

  pub fn path(&self) -> PathBuf {
    self.path.acquire_shared().clone()
  }

  /// Returns line `num` (0-based) without its line terminator.
  pub fn read_line(&self, num: usize) -> Result<String> {
    let path = self.path.acquire_shared();
    let file = File::open(&*path).map_err(|err| Error::io(&*path, err))?;

    match BufReader::new(file).lines().nth(num) {
      Some(Ok(line)) => Ok(line),
      Some(Err(err)) => Err(Error::io(&*path, err)),
      None => Err(Error::MissingLine {
        path: path.clone(),
        line: num,
      }),
    }
  }

  /// Replaces line `num` (0-based) with `text`.
  ///
  /// Fails without touching the file if it has no line `num`.
  pub fn write_line(&self, num: usize, text: &str) -> Result<()> {
    let path = self.path.acquire_exclusive();
    let temp_path = temp_path_for(&path);

    match rewrite_into(&path, &temp_path, num, text) {
      Ok(true) => {}
      Ok(false) => {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::MissingLine {
          path: path.clone(),
          line: num,
        });
      }
      Err(err) => {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
      }
    }

    fs::rename(&temp_path, &*path).map_err(|err| Error::io(&temp_path, err))?;
    tracing::trace!(path = %path.display(), line = num, "rewrote item file line");
    Ok(())
  }
}

fn temp_path_for(path: &Path) -> PathBuf {
  let mut temp: OsString = path.as_os_str().to_owned();
  temp.push(".tmp");
  PathBuf::from(temp)
}

// Copies `source` into `target` with line `num` replaced. Returns whether
// the line existed.
fn rewrite_into(source: &Path, target: &Path, num: usize, text: &str) -> Result<bool> {
  let input = File::open(source).map_err(|err| Error::io(source, err))?;
  let output = File::create(target).map_err(|err| Error::io(target, err))?;
  let mut out = BufWriter::new(output);

  let mut replaced = false;
  for (index, line) in BufReader::new(input).lines().enumerate() {
    let line = line.map_err(|err| Error::io(source, err))?;
    let line = if index == num {
      replaced = true;
      text
    } else {
      line.as_str()
    };
    writeln!(out, "{line}").map_err(|err| Error::io(target, err))?;
  }

  out.flush().map_err(|err| Error::io(target, err))?;
  Ok(replaced)
}
