//! 页面应用 - 组合注册表、表达式引擎与数据源，执行一次次渲染

use crate::config::{EngineConfig, EvaluatorKind};
use crate::datasource::{DataSourceCatalog, DataSourceDef, HttpFetcher, ResolutionStore, Scope};
use crate::diagnostics::{Diagnostic, DiagnosticsCollector};
use crate::expr::{ExpressionEvaluator, PathEvaluator};
use crate::js::JsEvaluator;
use crate::parser::ComponentNode;
use crate::renderer::{ComponentRegistry, RenderOutput, TreeRenderer};
use std::time::{Duration, Instant};

/// 一次渲染的结果
#[derive(Debug, Clone)]
pub struct RenderPass {
    pub output: RenderOutput,
    pub diagnostics: Vec<Diagnostic>,
    pub elapsed: Duration,
}

/// 页面应用
pub struct PageApp {
    config: EngineConfig,
    registry: ComponentRegistry,
    evaluator: Box<dyn ExpressionEvaluator>,
    catalog: DataSourceCatalog,
    store: ResolutionStore,
}

impl PageApp {
    pub fn new(config: EngineConfig) -> Result<Self, String> {
        let evaluator: Box<dyn ExpressionEvaluator> = match config.evaluator {
            EvaluatorKind::Path => Box::new(PathEvaluator),
            EvaluatorKind::Js => {
                Box::new(JsEvaluator::new().map_err(|e| format!("JS engine init failed: {}", e))?)
            }
        };
        log::info!("page engine initialized ({:?} evaluator)", config.evaluator);

        Ok(Self {
            config,
            registry: ComponentRegistry::with_builtins(),
            evaluator,
            catalog: DataSourceCatalog::new(),
            store: ResolutionStore::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    pub fn catalog(&self) -> &DataSourceCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut DataSourceCatalog {
        &mut self.catalog
    }

    pub fn store(&self) -> &ResolutionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResolutionStore {
        &mut self.store
    }

    /// 删除全局数据源，连同其引用与已有结果；返回被清理引用的页面
    pub fn remove_global(&mut self, id: &str) -> Option<(DataSourceDef, Vec<String>)> {
        let removed = self.catalog.remove_global(id)?;
        self.store.forget(&Scope::Global, id);
        Some(removed)
    }

    /// 删除页面，连同其数据源结果
    pub fn remove_page(&mut self, page: &str) {
        self.catalog.remove_page(page);
        self.store.forget_scope(&Scope::page(page));
    }

    /// 在渲染之外加载页面数据源，返回失败个数
    pub fn refresh(&mut self, page: &str) -> usize {
        let fetcher = HttpFetcher::new(Duration::from_secs(self.config.http_timeout_secs));
        fetcher.refresh(&self.catalog, page, &mut self.store)
    }

    /// 渲染页面：每次都从当前结果重新构建上下文
    pub fn render_page(&self, page: &str, tree: &ComponentNode) -> RenderPass {
        let start = Instant::now();
        let ctx = self.catalog.build_context(page, &self.store);
        let diagnostics = DiagnosticsCollector::new();

        let output = TreeRenderer::new(&self.registry, self.evaluator.as_ref(), &diagnostics)
            .catch_panics(self.config.catch_panics)
            .render(tree, &ctx);

        let elapsed = start.elapsed();
        let diagnostics = diagnostics.take();
        log::info!(
            "rendered page `{}`: {} node(s), {} diagnostic(s) in {:?}",
            page,
            tree.node_count(),
            diagnostics.len(),
            elapsed
        );

        RenderPass { output, diagnostics, elapsed }
    }
}
