use crate::domain::ports::ResultLog;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Appends one line per completed check to a local file.
#[derive(Debug, Clone)]
pub struct LocalResultLog {
    path: PathBuf,
}

impl LocalResultLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ResultLog for LocalResultLog {
    async fn append(&self, line: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", line.trim_end()).as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
