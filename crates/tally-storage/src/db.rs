//! RocksDB wrapper

use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};
use std::path::Path;
use std::sync::Arc;

/// Column family names
pub mod cf {
    /// Candidate table, keyed by big-endian index
    pub const CANDIDATES: &str = "candidates";
    /// Voter table, keyed by address bytes
    pub const VOTERS: &str = "voters";
    /// Singletons: admin, voting period, state version
    pub const META: &str = "meta";
}

/// All column family names
pub const ALL_CFS: &[&str] = &[cf::CANDIDATES, cf::VOTERS, cf::META];

type RocksDB = DBWithThreadMode<MultiThreaded>;

/// Database configuration
#[derive(Clone, Debug)]
pub struct DbConfig {
    /// Create database if missing
    pub create_if_missing: bool,
    /// Maximum number of open files
    pub max_open_files: i32,
    /// Write buffer size
    pub write_buffer_size: usize,
    /// Maximum write buffers
    pub max_write_buffer_number: i32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            max_open_files: 256,
            write_buffer_size: 16 * 1024 * 1024, // 16MB
            max_write_buffer_number: 2,
        }
    }
}

/// RocksDB wrapper with column family support
pub struct Database {
    db: Arc<RwLock<Option<RocksDB>>>,
    path: String,
}

impl Database {
    /// Create a new database instance (not yet opened)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            db: Arc::new(RwLock::new(None)),
            path: path.as_ref().to_string_lossy().to_string(),
        }
    }

    /// Open the database with default config
    pub fn open(&self) -> StorageResult<()> {
        self.open_with_config(DbConfig::default())
    }

    /// Open the database with custom config
    pub fn open_with_config(&self, config: DbConfig) -> StorageResult<()> {
        let mut db_guard = self.db.write();
        if db_guard.is_some() {
            return Err(StorageError::AlreadyOpen);
        }

        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_max_write_buffer_number(config.max_write_buffer_number);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = RocksDB::open_cf_descriptors(&opts, &self.path, cf_descriptors)?;
        *db_guard = Some(db);
        tracing::debug!(path = %self.path, "database opened");
        Ok(())
    }

    /// Close the database
    pub fn close(&self) {
        let mut db_guard = self.db.write();
        *db_guard = None;
    }

    /// Get a value from a column family
    pub fn get(&self, cf_name: &str, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, cf_name)?;
        Ok(db.get_cf(&cf, key)?)
    }

    /// All entries of a column family in key order
    pub fn entries(&self, cf_name: &str) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;
        let cf = self.get_cf(db, cf_name)?;
        let mut out = Vec::new();
        for item in db.iterator_cf(&cf, IteratorMode::Start) {
            let (key, value) = item?;
            out.push((key.to_vec(), value.to_vec()));
        }
        Ok(out)
    }

    /// Create a write batch
    pub fn batch(&self) -> WriteBatchWrapper {
        WriteBatchWrapper::new()
    }

    /// Execute a write batch atomically
    pub fn write_batch(&self, batch: WriteBatchWrapper) -> StorageResult<()> {
        let db_guard = self.db.read();
        let db = db_guard.as_ref().ok_or(StorageError::NotOpen)?;

        let mut rocks_batch = WriteBatch::default();
        for op in batch.operations {
            let cf = self.get_cf(db, op.cf_name)?;
            rocks_batch.put_cf(&cf, &op.key, &op.value);
        }

        db.write(rocks_batch)?;
        Ok(())
    }

    fn get_cf<'a>(&self, db: &'a RocksDB, name: &str) -> StorageResult<Arc<BoundColumnFamily<'a>>> {
        db.cf_handle(name)
            .ok_or_else(|| StorageError::InvalidColumnFamily(name.to_string()))
    }

    /// Get database path
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            path: self.path.clone(),
        }
    }
}

/// Ledger state is append/overwrite only, so batches carry puts alone.
struct BatchPut {
    cf_name: &'static str,
    key: Vec<u8>,
    value: Vec<u8>,
}

/// Write batch wrapper
#[derive(Default)]
pub struct WriteBatchWrapper {
    operations: Vec<BatchPut>,
}

impl WriteBatchWrapper {
    /// Create a new write batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a put operation
    pub fn put(&mut self, cf_name: &'static str, key: &[u8], value: &[u8]) {
        self.operations.push(BatchPut {
            cf_name,
            key: key.to_vec(),
            value: value.to_vec(),
        });
    }

    /// Get number of operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Check if batch is empty
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
