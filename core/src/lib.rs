pub mod config;
pub mod db;
pub mod error;
pub mod gaps;
pub mod models;
pub mod normalize;
pub mod payload;
pub mod protocol;
pub mod query;
pub mod runs;
pub mod sticker;
pub mod writer;
mod migrations;

pub use db::{open_archive, open_archive_with, ArchiveDb};
pub use error::CoreError;
pub use migrations::LATEST_VERSION;
pub use normalize::Normalizer;
pub use writer::BatchWriter;
