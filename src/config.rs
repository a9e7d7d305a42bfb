//! 引擎配置

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 表达式引擎选择
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorKind {
    /// 内置路径表达式求值
    #[default]
    Path,
    /// QuickJS 求值
    Js,
}

/// engine.json 配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub evaluator: EvaluatorKind,
    /// 是否捕获渲染器 panic
    #[serde(default = "default_catch_panics")]
    pub catch_panics: bool,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewConfig {
    #[serde(default = "default_target_dir")]
    pub target_dir: String,
    #[serde(default = "default_allow_list")]
    pub allow_list: Vec<String>,
}

fn default_catch_panics() -> bool { true }
fn default_http_timeout() -> u64 { 10 }
fn default_target_dir() -> String { "preview-app".to_string() }
fn default_allow_list() -> Vec<String> {
    vec![
        "pages/".to_string(),
        "app.json".to_string(),
        "app.js".to_string(),
        "app.wxss".to_string(),
    ]
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            evaluator: EvaluatorKind::default(),
            catch_panics: default_catch_panics(),
            http_timeout_secs: default_http_timeout(),
            preview: PreviewConfig::default(),
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            allow_list: default_allow_list(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// 从文件加载配置
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// 文件不存在时退回默认配置
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
