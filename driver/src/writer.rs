use crate::error::{Error, Result};
use crate::reader::parse_key;
use crate::worker::Worker;

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

/// Reads `<key> <value>` lines and hands each pair to the write task.
///
/// The value is everything after the first space and must not be empty.
pub struct Writer<F> {
  input_path: PathBuf,
  input: Lines<BufReader<File>>,
  task: F,
}

impl<F> Writer<F>
where
  F: FnMut(usize, String) -> Result<()>,
{
  pub fn new(input: impl Into<PathBuf>, task: F) -> Result<Self> {
    let input_path = input.into();
    let input = File::open(&input_path).map_err(|err| Error::io(&input_path, err))?;
    Ok(Self {
      input: BufReader::new(input).lines(),
      input_path,
      task,
    })
  }
}

impl<F> Worker for Writer<F>
where
  F: FnMut(usize, String) -> Result<()> + Send,
{
  fn step(&mut self) -> Result<bool> {
    let line = match self.input.next() {
      Some(line) => line.map_err(|err| Error::io(&self.input_path, err))?,
      None => return Ok(false),
    };

    let (key, value) = split_entry(&line, &self.input_path)?;
    (self.task)(key, value)?;
    Ok(true)
  }

  fn input_path(&self) -> &Path {
    &self.input_path
  }
}

fn split_entry(line: &str, source: &Path) -> Result<(usize, String)> {
  let (key, value) = line
    .split_once(' ')
    .ok_or_else(|| Error::MissingDelimiter(line.to_string()))?;
  if value.is_empty() {
    return Err(Error::MissingValue(line.to_string()));
  }
  Ok((parse_key(key, source)?, value.to_string()))
}
