use crate::domain::model::SessionToken;
use crate::domain::ports::SessionStore;
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const AUTH_KEY: &str = "bestof_auth";
const SESSION_KEY: &str = "bestof_session";

/// 以 JSON 檔保存兩個 key/value 項目：登入旗標與發放時間（epoch 毫秒）
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 檔案不存在或內容無法解析時都回傳空的項目；只有 I/O 錯誤會往上傳
    async fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&data) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    "⚠️ Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionToken>> {
        let entries = self.read_entries().await?;

        // 缺少任一項目或時間無法解析都視為沒有登入
        let authenticated = entries.get(AUTH_KEY).map(|v| v == "true");
        let issued_at = entries.get(SESSION_KEY).and_then(|v| v.parse::<i64>().ok());

        Ok(match (authenticated, issued_at) {
            (Some(authenticated), Some(issued_at_epoch_ms)) => Some(SessionToken {
                authenticated,
                issued_at_epoch_ms,
            }),
            _ => None,
        })
    }

    async fn save(&self, token: &SessionToken) -> Result<()> {
        let mut entries = self.read_entries().await?;
        entries.insert(AUTH_KEY.to_string(), token.authenticated.to_string());
        entries.insert(SESSION_KEY.to_string(), token.issued_at_epoch_ms.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec_pretty(&entries)?;
        tokio::fs::write(&self.path, data).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
