use crate::error::{Error, Result};
use crate::item_file::ItemFile;
use crate::options::Options;
use crate::reader::Reader;
use crate::value::StoredValue;
use crate::worker::Worker;
use crate::writer::Writer;

use std::any::Any;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use writeback_cache::{Cache, CacheBuilder, NoopHook};

/// Totals reported after a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
  pub readers: usize,
  pub writers: usize,
  /// Input lines processed across all workers.
  pub steps: usize,
}

/// Runs every reader and writer listed in `options` to completion, then
/// drops the cache so every cached value is written back.
pub fn run(options: &Options) -> Result<RunSummary> {
  if options.float_optimized {
    run_with::<f32>(options)
  } else {
    run_with::<String>(options)
  }
}

fn run_with<V: StoredValue>(options: &Options) -> Result<RunSummary> {
  let item_file = Arc::new(ItemFile::open(&options.items, options.workload())?);
  let cache = Arc::new(build_cache::<V>(options, &item_file)?);
  let realtime = options.realtime_consistent;

  let mut workers: Vec<Box<dyn Worker>> = Vec::new();
  for input in list_paths(&options.readers)? {
    let output = output_path_for(&input);
    let cache = Arc::clone(&cache);
    let file = Arc::clone(&item_file);
    let reader = Reader::new(input, output, move |key: usize| read_through::<V>(&cache, &file, key))?;
    workers.push(Box::new(reader));
  }
  let readers = workers.len();

  for input in list_paths(&options.writers)? {
    let cache = Arc::clone(&cache);
    let file = Arc::clone(&item_file);
    let writer = Writer::new(input, move |key: usize, text: String| {
      write_through::<V>(&cache, &file, key, &text, realtime)
    })?;
    workers.push(Box::new(writer));
  }
  let writers = workers.len() - readers;

  tracing::info!(
    capacity = options.capacity,
    workload = %options.workload(),
    float_optimized = options.float_optimized,
    realtime,
    readers,
    writers,
    "starting workers"
  );
  let steps = drive(workers)?;

  // Workers are gone, so this is the last reference: dropping it flushes
  // every tracked item through the hook.
  drop(cache);

  tracing::info!(steps, "all workers finished, cache flushed");
  Ok(RunSummary {
    readers,
    writers,
    steps,
  })
}

fn build_cache<V: StoredValue>(options: &Options, item_file: &Arc<ItemFile>) -> Result<Cache<usize, V>> {
  let builder = CacheBuilder::with_default_value(V::unresolved())
    .capacity(options.capacity)
    .workload(options.workload());

  let builder = if options.realtime_consistent {
    builder.eviction_hook(NoopHook)
  } else {
    let file = Arc::clone(item_file);
    builder.eviction_hook(move |key: &usize, value: V| {
      if let Err(err) = write_back(&file, *key, &value) {
        tracing::warn!(key = *key, error = %err, "write-back failed, value dropped");
      }
    })
  };

  Ok(builder.build()?)
}

/// Answers a read of `key`: from the cache when the item is resolved,
/// otherwise from the item file, installing the loaded value unless a
/// concurrent writer got there first.
pub fn read_through<V: StoredValue>(cache: &Cache<usize, V>, file: &ItemFile, key: usize) -> Result<String> {
  let item = cache.access(key)?;
  let value = item.read();
  if value != V::unresolved() {
    return Ok(format!("{} Cache", value.render()));
  }

  let line = file.read_line(line_for(file, key)?)?;
  let loaded = V::decode(&line)?;
  item.compare_exchange(&V::unresolved(), loaded);
  Ok(format!("{line} Disk"))
}

/// Stores `text` for `key` in the cache. With `realtime` set the value is
/// also written to the item file before returning.
pub fn write_through<V: StoredValue>(
  cache: &Cache<usize, V>,
  file: &ItemFile,
  key: usize,
  text: &str,
  realtime: bool,
) -> Result<()> {
  let value = V::decode(text)?;
  cache.access(key)?.update(value.clone());
  if realtime {
    write_back(file, key, &value)?;
  }
  Ok(())
}

/// Persists `value` as the line for `key`. The unresolved sentinel is
/// never written.
pub fn write_back<V: StoredValue>(file: &ItemFile, key: usize, value: &V) -> Result<()> {
  match value.encode() {
    Some(text) => file.write_line(line_for(file, key)?, &text),
    None => Ok(()),
  }
}

fn line_for(file: &ItemFile, key: usize) -> Result<usize> {
  key.checked_sub(1).ok_or_else(|| Error::ZeroKey(file.path()))
}

// Runs every worker on its own scoped thread. All start together; the first
// failure stops the rest at their next step.
fn drive(workers: Vec<Box<dyn Worker>>) -> Result<usize> {
  let barrier = Barrier::new(workers.len());
  let stop = AtomicBool::new(false);

  let results: Vec<Result<usize>> = thread::scope(|scope| {
    let handles: Vec<_> = workers
      .into_iter()
      .map(|mut worker| {
        let barrier = &barrier;
        let stop = &stop;
        let path = worker.input_path().to_path_buf();
        let handle = scope.spawn(move || {
          barrier.wait();
          let mut steps = 0;
          while !stop.load(Ordering::Acquire) {
            match worker.step() {
              Ok(true) => steps += 1,
              Ok(false) => break,
              Err(err) => {
                stop.store(true, Ordering::Release);
                tracing::error!(input = %worker.input_path().display(), error = %err, "worker aborted");
                return Err(err);
              }
            }
          }
          Ok(steps)
        });
        (path, handle)
      })
      .collect();

    handles
      .into_iter()
      .map(|(path, handle)| {
        handle.join().unwrap_or_else(|payload| {
          stop.store(true, Ordering::Release);
          Err(Error::WorkerPanicked {
            path,
            message: panic_message(payload.as_ref()),
          })
        })
      })
      .collect()
  });

  let mut steps = 0;
  let mut first_error = None;
  for result in results {
    match result {
      Ok(count) => steps += count,
      Err(err) => {
        first_error.get_or_insert(err);
      }
    }
  }
  first_error.map_or(Ok(steps), Err)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "non-string panic payload".to_string()
  }
}

/// Reads a list file: one path per line, blank lines ignored.
fn list_paths(list: &Path) -> Result<Vec<PathBuf>> {
  let contents = fs::read_to_string(list).map_err(|err| Error::io(list, err))?;
  Ok(
    contents
      .lines()
      .map(str::trim)
      .filter(|line| !line.is_empty())
      .map(PathBuf::from)
      .collect(),
  )
}

/// `<input>.out`, next to the reader's input.
pub fn output_path_for(input: &Path) -> PathBuf {
  let mut output: OsString = input.as_os_str().to_owned();
  output.push(".out");
  PathBuf::from(output)
}
