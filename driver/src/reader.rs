use crate::error::{Error, Result};
use crate::worker::Worker;

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

/// Reads one key per line and writes the read task's answer for each key to
/// an output file, one line per key.
pub struct Reader<F> {
  input_path: PathBuf,
  output_path: PathBuf,
  input: Lines<BufReader<File>>,
  output: BufWriter<File>,
  task: F,
}

impl<F> Reader<F>
where
  F: FnMut(usize) -> Result<String>,
{
  /// Opens `input` for reading and truncates or creates `output`.
  pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, task: F) -> Result<Self> {
    let input_path = input.into();
    let output_path = output.into();
    let input = File::open(&input_path).map_err(|err| Error::io(&input_path, err))?;
    let output = File::create(&output_path).map_err(|err| Error::io(&output_path, err))?;

    Ok(Self {
      input: BufReader::new(input).lines(),
      output: BufWriter::new(output),
      input_path,
      output_path,
      task,
    })
  }

  pub fn output_path(&self) -> &Path {
    &self.output_path
  }

  fn finish(&mut self) -> Result<bool> {
    self.output.flush().map_err(|err| Error::io(&self.output_path, err))?;
    Ok(false)
  }
}

impl<F> Worker for Reader<F>
where
  F: FnMut(usize) -> Result<String> + Send,
{
  fn step(&mut self) -> Result<bool> {
    let line = match self.input.next() {
      Some(line) => line.map_err(|err| Error::io(&self.input_path, err))?,
      None => return self.finish(),
    };

    let key = parse_key(&line, &self.input_path)?;
    let answer = (self.task)(key)?;
    writeln!(self.output, "{answer}").map_err(|err| Error::io(&self.output_path, err))?;
    Ok(true)
  }

  fn input_path(&self) -> &Path {
    &self.input_path
  }
}

/// Parses a 1-based item key.
pub(crate) fn parse_key(text: &str, source: &Path) -> Result<usize> {
  let key = text
    .trim()
    .parse::<usize>()
    .map_err(|_| Error::InvalidKey(text.to_string()))?;
  if key == 0 {
    return Err(Error::ZeroKey(source.to_path_buf()));
  }
  Ok(key)
}
