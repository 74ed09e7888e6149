//! File-backed repository implementations.

mod record;

pub use record::FileRecordRepository;
