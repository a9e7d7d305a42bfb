//! Page Render Engine - 页面搭建器渲染引擎
//! 把组件树与数据源渲染为可预览的输出，绑定表达式随上下文变化重新求值

// 错误与配置
pub mod error;
pub mod config;

// 组件树与表达式模板
pub mod parser;

// 表达式上下文与求值
pub mod expr;

// QuickJS 表达式引擎
pub mod js;

// 组件注册表与树渲染
pub mod renderer;

// 诊断上报
pub mod diagnostics;

// 数据源模型
pub mod datasource;

// 页面运行时
pub mod runtime;

// 预览同步
pub mod preview_sync;

pub use config::{EngineConfig, EvaluatorKind};
pub use datasource::{DataSourceCatalog, DataSourceDef, Resolution, ResolutionStore, Scope};
pub use diagnostics::{Diagnostic, DiagnosticsCollector, DiagnosticsSink, LogSink};
pub use error::{CatalogError, EvalError, RenderError, SyncError};
pub use expr::{Binding, ExpressionContext, ExpressionEvaluator, PathEvaluator, Value};
pub use parser::{ComponentNode, PropValue};
pub use renderer::{ComponentRegistry, RenderInput, RenderOutput, Renderer, TreeRenderer};
pub use runtime::{PageApp, PageDocument};

// 单元测试
#[cfg(test)]
mod tests;
