//! 错误类型定义

use std::path::PathBuf;
use thiserror::Error;

/// 表达式求值错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),
    #[error("data source `{id}` failed: {message}")]
    DataSource { id: String, message: String },
    #[error("script error: {0}")]
    Script(String),
}

/// 渲染错误，节点级别隔离，不会中断整次渲染
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("unknown component: {0}")]
    UnknownComponent(String),
    #[error("expression error in `{prop}`: {source}")]
    Expression {
        prop: String,
        #[source]
        source: EvalError,
    },
    #[error("renderer `{component}` failed: {message}")]
    Renderer { component: String, message: String },
}

impl RenderError {
    /// 供自定义渲染器使用的便捷构造
    pub fn renderer(component: &str, message: impl Into<String>) -> Self {
        RenderError::Renderer {
            component: component.to_string(),
            message: message.into(),
        }
    }
}

/// 数据源目录错误
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("global data source `{0}` does not exist")]
    UnknownGlobal(String),
    #[error("data source id must not be empty")]
    EmptyId,
    #[error("data source `{id}` is defined twice in `{scope}`")]
    DuplicateId { scope: String, id: String },
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog json: {0}")]
    Json(#[from] serde_json::Error),
}

/// 预览同步错误
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
