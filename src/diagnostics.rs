//! 诊断上报 - 编辑器据此在画布上标出错误

use crate::error::RenderError;
use serde::Serialize;
use std::cell::RefCell;

/// 诊断接收方，实现不得 panic
pub trait DiagnosticsSink {
    fn report(&self, node_id: &str, prop: Option<&str>, error: &RenderError);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnknownComponent,
    Expression,
    Renderer,
}

impl From<&RenderError> for DiagnosticKind {
    fn from(error: &RenderError) -> Self {
        match error {
            RenderError::UnknownComponent(_) => DiagnosticKind::UnknownComponent,
            RenderError::Expression { .. } => DiagnosticKind::Expression,
            RenderError::Renderer { .. } => DiagnosticKind::Renderer,
        }
    }
}

/// 一条诊断记录
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub node_id: String,
    pub prop: Option<String>,
    pub kind: DiagnosticKind,
    pub message: String,
}

/// 内存收集器，一次渲染一份
#[derive(Debug, Default)]
pub struct DiagnosticsCollector {
    entries: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    pub fn for_node(&self, node_id: &str) -> Vec<Diagnostic> {
        self.entries
            .borrow()
            .iter()
            .filter(|d| d.node_id == node_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }
}

impl DiagnosticsSink for DiagnosticsCollector {
    fn report(&self, node_id: &str, prop: Option<&str>, error: &RenderError) {
        // 不得 panic，借用冲突时丢弃这条记录
        if let Ok(mut entries) = self.entries.try_borrow_mut() {
            entries.push(Diagnostic {
                node_id: node_id.to_string(),
                prop: prop.map(str::to_string),
                kind: error.into(),
                message: error.to_string(),
            });
        }
    }
}

/// 只写日志的接收方，不保留记录
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticsSink for LogSink {
    fn report(&self, node_id: &str, prop: Option<&str>, error: &RenderError) {
        match prop {
            Some(prop) => log::warn!("[{}.{}] {}", node_id, prop, error),
            None => log::warn!("[{}] {}", node_id, error),
        }
    }
}
