//! File-backed account record store.
//!
//! The store is a flat sequence of fixed-width records (see
//! [`crate::account`]) in insertion order. There is no index and no in-place
//! update: lookups are linear scans and every mutation rewrites the whole
//! file through [`RecordStore::atomic_replace`].

use crate::account::{AccountRecord, RECORD_LEN};
use crate::error::{LedgerError, Result};
use log::{debug, warn};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

/// Account numbers are allocated above this baseline.
pub const ACCOUNT_NUMBER_BASELINE: u32 = 100_000;

/// Owns the on-disk account set: one primary file plus a temp file that only
/// exists while a replace is in progress (or after one failed).
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    temp_path: PathBuf,
}

impl RecordStore {
    /// Uses `path` as the primary file and `<path>.tmp` as the temp file.
    ///
    /// Nothing is created until the first append.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut temp: OsString = path.as_os_str().to_owned();
        temp.push(".tmp");
        RecordStore {
            path,
            temp_path: PathBuf::from(temp),
        }
    }

    /// Uses an explicit temp file location. It must live on the same
    /// filesystem as `path` for the final rename to be atomic.
    pub fn with_temp_path(path: impl Into<PathBuf>, temp_path: impl Into<PathBuf>) -> Self {
        RecordStore {
            path: path.into(),
            temp_path: temp_path.into(),
        }
    }

    /// Location of the primary store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the scratch file used by [`RecordStore::atomic_replace`].
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Returns a lazy iterator over every record in file order.
    ///
    /// The file is re-opened on each call. A missing file yields an empty
    /// sequence. The iterator stops after the first error it yields.
    pub fn scan_all(&self) -> Result<Records> {
        let reader = match File::open(&self.path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        Ok(Records { reader, offset: 0 })
    }

    /// Returns the first record carrying `account_number`.
    pub fn find_by_number(&self, account_number: u32) -> Result<Option<AccountRecord>> {
        for record in self.scan_all()? {
            let record = record?;
            if record.account_number == account_number {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Appends one record, creating the store if needed.
    pub fn append(&self, record: &AccountRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&record.encode())?;
        debug!(
            "Appended account {} to {}",
            record.account_number,
            self.path.display()
        );
        Ok(())
    }

    /// Rewrites the store, passing every record that matches `predicate`
    /// through `transform`. `None` from the transform drops the record,
    /// `Some` replaces it. Non-matching records are copied unchanged and the
    /// original relative order is kept.
    ///
    /// The new contents are written to the temp file, synced, and renamed
    /// over the primary file. Returns whether any record matched; when none
    /// did, the temp file is discarded and the store is left untouched. If
    /// writing fails, the temp file is left behind.
    pub fn atomic_replace<P, T>(&self, mut predicate: P, mut transform: T) -> Result<bool>
    where
        P: FnMut(&AccountRecord) -> bool,
        T: FnMut(AccountRecord) -> Option<AccountRecord>,
    {
        match fs::metadata(&self.path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Replace on missing store {}, nothing to match", self.path.display());
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        }

        let mut writer = BufWriter::new(File::create(&self.temp_path)?);
        let mut matched = false;
        let mut written = 0usize;

        for record in self.scan_all()? {
            let record = record?;
            let output = if predicate(&record) {
                matched = true;
                transform(record)
            } else {
                Some(record)
            };
            if let Some(record) = output {
                writer.write_all(&record.encode())?;
                written += 1;
            }
        }

        let file = writer.into_inner().map_err(io::IntoInnerError::into_error)?;
        file.sync_all()?;
        drop(file);

        if !matched {
            fs::remove_file(&self.temp_path)?;
            return Ok(false);
        }

        fs::rename(&self.temp_path, &self.path)?;
        debug!(
            "Replaced {} with {} records",
            self.path.display(),
            written
        );
        Ok(true)
    }

    /// Returns one more than the highest account number in the store, or
    /// `ACCOUNT_NUMBER_BASELINE + 1` for an empty store.
    pub fn allocate_next_account_number(&self) -> Result<u32> {
        let mut highest = ACCOUNT_NUMBER_BASELINE;
        for record in self.scan_all()? {
            highest = highest.max(record?.account_number);
        }
        highest
            .checked_add(1)
            .ok_or(LedgerError::AccountNumbersExhausted)
    }
}

/// Lazy record iterator returned by [`RecordStore::scan_all`].
pub struct Records {
    reader: Option<BufReader<File>>,
    offset: u64,
}

impl Iterator for Records {
    type Item = Result<AccountRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        let mut buf = [0u8; RECORD_LEN];

        let filled = match read_full(reader, &mut buf) {
            Ok(n) => n,
            Err(e) => {
                self.reader = None;
                return Some(Err(e.into()));
            }
        };

        if filled < RECORD_LEN {
            if filled > 0 {
                warn!(
                    "Ignoring {} trailing bytes at offset {} (partial record)",
                    filled, self.offset
                );
            }
            self.reader = None;
            return None;
        }

        let offset = self.offset;
        self.offset += RECORD_LEN as u64;
        let decoded = AccountRecord::decode(&buf, offset);
        if decoded.is_err() {
            self.reader = None;
        }
        Some(decoded)
    }
}

/// Reads until `buf` is full or EOF. Returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
