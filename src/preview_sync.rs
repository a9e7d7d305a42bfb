//! 预览同步 - 把编辑器推送的页面文件写入预览工程目录
//!
//! 请求体：`{"files": [{"path": "...", "content": "..."}]}`
//! 成功：`{"success": true, "synced": [...]}`；非 POST 返回 405。

use crate::config::PreviewConfig;
use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFile {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRequest {
    pub files: Vec<SyncFile>,
}

/// 状态码 + JSON 响应体
#[derive(Debug, Clone, PartialEq)]
pub struct SyncResponse {
    pub status: u16,
    pub body: JsonValue,
}

pub struct PreviewSync {
    target_dir: PathBuf,
    allow_list: Vec<String>,
}

impl PreviewSync {
    pub fn new(target_dir: impl Into<PathBuf>, allow_list: Vec<String>) -> Self {
        Self {
            target_dir: target_dir.into(),
            allow_list,
        }
    }

    pub fn from_config(config: &PreviewConfig) -> Self {
        Self::new(&config.target_dir, config.allow_list.clone())
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// 白名单项以 `/` 结尾表示目录前缀，否则精确匹配
    pub fn is_allowed(&self, path: &str) -> bool {
        let relative = Path::new(path);
        let safe = !path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return false;
        }
        self.allow_list.iter().any(|entry| {
            if entry.ends_with('/') {
                path.starts_with(entry.as_str())
            } else {
                path == entry
            }
        })
    }

    /// 写入白名单内的文件，返回已同步的路径
    pub fn sync(&self, request: &SyncRequest) -> Result<Vec<String>, SyncError> {
        let mut synced = Vec::new();
        for file in &request.files {
            if !self.is_allowed(&file.path) {
                log::debug!("skip {}", file.path);
                continue;
            }
            let dest = self.target_dir.join(&file.path);
            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|source| SyncError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&dest, &file.content).map_err(|source| SyncError::Write {
                path: dest.clone(),
                source,
            })?;
            synced.push(file.path.clone());
        }
        log::info!("synced {} of {} file(s)", synced.len(), request.files.len());
        Ok(synced)
    }

    /// 处理一次 HTTP 请求
    pub fn handle(&self, method: &str, body: &str) -> SyncResponse {
        match self.try_handle(method, body) {
            Ok(synced) => SyncResponse {
                status: 200,
                body: json!({ "success": true, "synced": synced }),
            },
            Err(err) => {
                let status = match err {
                    SyncError::MethodNotAllowed(_) => 405,
                    SyncError::BadRequest(_) => 400,
                    SyncError::Write { .. } => 500,
                };
                log::warn!("preview sync failed: {}", err);
                SyncResponse {
                    status,
                    body: json!({ "success": false, "error": err.to_string() }),
                }
            }
        }
    }

    fn try_handle(&self, method: &str, body: &str) -> Result<Vec<String>, SyncError> {
        if !method.eq_ignore_ascii_case("POST") {
            return Err(SyncError::MethodNotAllowed(method.to_string()));
        }
        let request: SyncRequest =
            serde_json::from_str(body).map_err(|e| SyncError::BadRequest(e.to_string()))?;
        self.sync(&request)
    }
}
