use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{ResultExt, ensure};
use tracing::info;

use crate::io::{
    sheets::Sheet,
    sink::{EmptySnafu, EncodeSnafu, IoSnafu, SinkError, TabularSink, WriteSnafu},
};

/// Writes each sheet as a pretty-printed JSON array to `{dir}/{sheet}.json`.
#[derive(Debug, Clone)]
pub struct JsonSink {
    dir: PathBuf,
}

impl JsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl TabularSink for JsonSink {
    type Output = Vec<PathBuf>;

    async fn write(&self, sheets: &[Sheet]) -> Result<Self::Output, SinkError> {
        ensure!(!sheets.is_empty(), EmptySnafu);
        tokio::fs::create_dir_all(&self.dir).await.context(IoSnafu)?;

        let mut paths = Vec::with_capacity(sheets.len());
        for sheet in sheets {
            let body = serde_json::to_vec_pretty(&sheet.rows).context(EncodeSnafu {
                sheet: sheet.name.as_str(),
            })?;
            let path = self.dir.join(format!("{}.json", sheet.name));
            tokio::fs::write(&path, body).await.map_err(|e| {
                WriteSnafu {
                    sheet: sheet.name.as_str(),
                    message: format!("{}: {e}", path.display()),
                }
                .build()
            })?;
            info!(sheet = %sheet.name, rows = sheet.rows.len(), path = %path.display(), "sheet written");
            paths.push(path);
        }
        Ok(paths)
    }
}
