//! Document generator capability: turn a receipt into a saved file.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::receipt::Receipt;
use crate::render::ReceiptFormat;

#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("failed to write receipt to {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("receipt store is poisoned")]
    Poisoned,
}

/// A document offered to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub file_name: String,
    /// Where it was saved, when saved to disk.
    pub path: Option<PathBuf>,
    pub bytes: usize,
}

pub trait DocumentGenerator: Send + Sync {
    fn generate(&self, receipt: &Receipt) -> Result<GeneratedDocument, ReceiptError>;
}

/// Saves receipts into a local directory (the "download" folder).
#[derive(Debug, Clone)]
pub struct FileDocumentGenerator {
    dir: PathBuf,
    format: ReceiptFormat,
}

impl FileDocumentGenerator {
    pub fn new(dir: impl Into<PathBuf>, format: ReceiptFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentGenerator for FileDocumentGenerator {
    fn generate(&self, receipt: &Receipt) -> Result<GeneratedDocument, ReceiptError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ReceiptError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let file_name = receipt.file_name(self.format.extension());
        let path = self.dir.join(&file_name);
        let contents = self.format.render(receipt);
        std::fs::write(&path, &contents).map_err(|source| ReceiptError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(file = %path.display(), kind = %receipt.kind, "receipt saved");
        Ok(GeneratedDocument {
            file_name,
            path: Some(path),
            bytes: contents.len(),
        })
    }
}

/// Keeps rendered receipts in memory, for embedding UIs that serve the
/// download themselves.
#[derive(Debug, Default)]
pub struct MemoryDocumentGenerator {
    format: ReceiptFormat,
    documents: Mutex<Vec<(String, String)>>,
}

impl MemoryDocumentGenerator {
    pub fn new(format: ReceiptFormat) -> Self {
        Self {
            format,
            documents: Mutex::new(Vec::new()),
        }
    }

    /// `(file name, contents)` pairs in generation order.
    pub fn documents(&self) -> Vec<(String, String)> {
        self.documents
            .lock()
            .map(|docs| docs.clone())
            .unwrap_or_default()
    }
}

impl DocumentGenerator for MemoryDocumentGenerator {
    fn generate(&self, receipt: &Receipt) -> Result<GeneratedDocument, ReceiptError> {
        let file_name = receipt.file_name(self.format.extension());
        let contents = self.format.render(receipt);
        let bytes = contents.len();
        self.documents
            .lock()
            .map_err(|_| ReceiptError::Poisoned)?
            .push((file_name.clone(), contents));
        Ok(GeneratedDocument {
            file_name,
            path: None,
            bytes,
        })
    }
}
