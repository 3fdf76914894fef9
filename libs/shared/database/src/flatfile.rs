use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec::RecordCodec;
use crate::error::StorageError;

/// A file holding a flat run of fixed-size records with no header. The end
/// of the file marks the end of the list.
pub struct RecordFile<C> {
    path: PathBuf,
    codec: C,
}

impl<C: RecordCodec> RecordFile<C> {
    pub fn new(path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every record in file order. A missing file is an empty list; a
    /// trailing partial record is ignored.
    pub fn load_all(&self) -> Result<Vec<C::Item>, StorageError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let chunks = bytes.chunks_exact(C::RECORD_SIZE);
        let leftover = chunks.remainder().len();
        if leftover > 0 {
            warn!(
                "{} ends with a partial record of {} bytes, ignoring it",
                self.path.display(),
                leftover
            );
        }

        let items = chunks
            .enumerate()
            .map(|(index, chunk)| {
                self.codec.decode(chunk).map_err(|e| match e {
                    StorageError::CorruptRecord { reason, .. } => {
                        StorageError::CorruptRecord { index, reason }
                    }
                    other => StorageError::CorruptRecord {
                        index,
                        reason: other.to_string(),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} records from {}", items.len(), self.path.display());
        Ok(items)
    }

    /// Replaces the file contents with `items`. The records are written to a
    /// sibling file first and renamed over the target, so a failed write
    /// leaves the previous contents in place.
    pub fn save_all<'a, I>(&self, items: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = &'a C::Item>,
        C::Item: 'a,
    {
        let mut buf = vec![0u8; C::RECORD_SIZE];
        let mut encoded = Vec::new();
        for item in items {
            self.codec.encode(item, &mut buf)?;
            encoded.extend_from_slice(&buf);
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let staging = self.staging_path();
        if let Err(e) = write_and_replace(&staging, &self.path, &encoded) {
            if let Err(cleanup) = fs::remove_file(&staging) {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", staging.display(), cleanup);
                }
            }
            return Err(e.into());
        }

        debug!(
            "Saved {} records to {}",
            encoded.len() / C::RECORD_SIZE,
            self.path.display()
        );
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_and_replace(staging: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(staging)?);
    writer.write_all(bytes)?;
    writer.flush()?;
    drop(writer);
    fs::rename(staging, target)
}
