//! Drives concurrent readers and writers of a line-oriented item file
//! through a [`writeback_cache::Cache`].
//!
//! Readers resolve keys from the cache, falling back to the item file on a
//! miss; writers update the cache only. Values reach the file when the
//! cache releases an item, or on every write in realtime-consistent mode.

pub mod app;
pub mod error;
pub mod item_file;
pub mod options;
pub mod reader;
pub mod value;
pub mod worker;
pub mod writer;

pub use app::{run, RunSummary};
pub use error::{Error, Result};
pub use item_file::ItemFile;
pub use options::Options;
pub use reader::Reader;
pub use value::StoredValue;
pub use worker::Worker;
pub use writer::Writer;
