//! Storage error types

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// RocksDB error
    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    /// A stored value could not be decoded
    #[error("corrupted record in {table}: {reason}")]
    Corrupted {
        /// Column family or table name
        table: &'static str,
        /// What was wrong
        reason: String,
    },

    /// Commit attempted before the ledger was initialized
    #[error("ledger state not initialized")]
    NotInitialized,

    /// Invalid column family
    #[error("invalid column family: {0}")]
    InvalidColumnFamily(String),

    /// Database not open
    #[error("database not open")]
    NotOpen,

    /// Database already open
    #[error("database already open")]
    AlreadyOpen,

    /// Backend refused the write
    #[error("write rejected: {0}")]
    WriteRejected(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
