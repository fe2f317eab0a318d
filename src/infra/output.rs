//! Filesystem output for rendered documents.

use std::path::{Path, PathBuf};

use tokio::{fs, io::AsyncWriteExt};

use crate::application::render::RenderedDocument;

use super::error::InfraError;

/// Directory rendered documents are written into.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `document` as `<slug of title>.<ext>`, creating the directory
    /// on first use. Existing files are replaced. Returns the written path.
    pub async fn write(
        &self,
        title: &str,
        document: &RenderedDocument,
    ) -> Result<PathBuf, InfraError> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|err| InfraError::io(self.root.display().to_string(), err))?;

        let path = self.root.join(document.suggested_filename(title));
        write_file(&path, &document.bytes).await?;
        Ok(path)
    }
}

/// Write `bytes` to `path`, flushing before returning.
pub async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), InfraError> {
    let describe = || path.display().to_string();
    let mut file = fs::File::create(path)
        .await
        .map_err(|err| InfraError::io(describe(), err))?;
    file.write_all(bytes)
        .await
        .map_err(|err| InfraError::io(describe(), err))?;
    file.flush().await.map_err(|err| InfraError::io(describe(), err))
}
