//! Local document preview.
//!
//! Staging a preview materializes a transient copy of the selected file for
//! an external viewer. The copy lives exactly as long as the handle: it is
//! released on replacement input, on a staging error, and on teardown.
//! There is no exit path that leaks it. PDF only, matching the hosted
//! client.

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;

use crate::util::{format_file_size, DocumentKind};

#[derive(Debug)]
pub struct Preview {
    staged: NamedTempFile,
    pub file_name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl Preview {
    /// Stage a transient copy of `path` for viewing.
    pub fn stage(path: &Path) -> Result<Self> {
        match DocumentKind::from_path(path) {
            Some(DocumentKind::Pdf) => {}
            _ => bail!("Preview not available for this file type"),
        }

        let metadata = std::fs::metadata(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut source = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;

        let mut staged = tempfile::Builder::new()
            .prefix("dropdesk-preview-")
            .suffix(".pdf")
            .tempfile()
            .context("staging preview copy")?;
        std::io::copy(&mut source, staged.as_file_mut()).context("copying preview bytes")?;

        Ok(Self {
            staged,
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document.pdf".to_string()),
            size: metadata.len(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Where the staged copy lives, for handing to a viewer.
    pub fn path(&self) -> &Path {
        self.staged.path()
    }

    /// Swap in a new input. The previous copy is released whether or not
    /// the new one stages successfully.
    pub fn replace(self, path: &Path) -> Result<Self> {
        drop(self);
        Self::stage(path)
    }

    /// One-line summary for the preview card.
    pub fn describe(&self) -> String {
        match self.modified {
            Some(modified) => format!(
                "{} • {} • modified {}",
                self.file_name,
                format_file_size(self.size),
                modified.format("%Y-%m-%d")
            ),
            None => format!("{} • {}", self.file_name, format_file_size(self.size)),
        }
    }
}
