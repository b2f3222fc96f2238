use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::crawler::classifier::MemberRecord;
use crate::crawler::error::CrawlError;

/// 只追加的成员记录文件，一行一条
pub struct MemberLog {
    path: PathBuf,
}

impl MemberLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, record: &MemberRecord) -> Result<(), CrawlError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CrawlError::PersistenceFailed(e.to_string()))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| CrawlError::PersistenceFailed(e.to_string()))?;

        let line = record.to_line() + "\n";
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| CrawlError::PersistenceFailed(e.to_string()))?;
        file.flush()
            .await
            .map_err(|e| CrawlError::PersistenceFailed(e.to_string()))?;

        Ok(())
    }
}
