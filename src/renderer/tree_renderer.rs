//! 树渲染器 - 递归求值组件树
//!
//! 对每个节点：查注册表取渲染器，按上下文求值 props 与 style，
//! 再把求值结果连同惰性的子节点渲染函数交给渲染器。
//! 任何节点上的失败都只影响该节点本身，兄弟与父节点照常输出。

use super::components::placeholder;
use super::registry::{ComponentRegistry, RenderInput};
use super::output::RenderOutput;
use crate::diagnostics::DiagnosticsSink;
use crate::error::RenderError;
use crate::expr::{evaluate_props, ExpressionContext, ExpressionEvaluator, PropFailure};
use crate::parser::ComponentNode;
use std::panic::{self, AssertUnwindSafe};

pub struct TreeRenderer<'a> {
    registry: &'a ComponentRegistry,
    evaluator: &'a dyn ExpressionEvaluator,
    diagnostics: &'a dyn DiagnosticsSink,
    catch_panics: bool,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(
        registry: &'a ComponentRegistry,
        evaluator: &'a dyn ExpressionEvaluator,
        diagnostics: &'a dyn DiagnosticsSink,
    ) -> Self {
        Self {
            registry,
            evaluator,
            diagnostics,
            catch_panics: true,
        }
    }

    /// 关闭后渲染器 panic 会直接向上传播。
    /// 开启时 panic 被转为错误标记，但 panic 信息仍会经过进程的 panic hook 输出。
    pub fn catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }

    /// 渲染一棵树
    pub fn render(&self, root: &ComponentNode, ctx: &ExpressionContext) -> RenderOutput {
        self.render_node(root, ctx)
    }

    /// 渲染多个根节点
    pub fn render_all(&self, roots: &[ComponentNode], ctx: &ExpressionContext) -> RenderOutput {
        RenderOutput::fragment(roots.iter().map(|n| self.render_node(n, ctx)).collect())
    }

    fn render_node(&self, node: &ComponentNode, ctx: &ExpressionContext) -> RenderOutput {
        log::debug!("render {} ({})", node.id, node.component_type);

        let Some(renderer) = self.registry.get(&node.component_type) else {
            self.report(node, None, &RenderError::UnknownComponent(node.component_type.clone()));
            return placeholder::unknown(node);
        };

        // 父节点属性先于任何子节点求值
        let (props, prop_failures) = evaluate_props(self.evaluator, &node.props, ctx);
        let (style, style_failures) = evaluate_props(self.evaluator, &node.style, ctx);
        self.report_failures(node, "", prop_failures);
        self.report_failures(node, "style.", style_failures);

        let render_children = || {
            node.children
                .iter()
                .map(|child| self.render_node(child, ctx))
                .collect::<Vec<_>>()
        };
        let input = RenderInput::new(node, ctx, &props, &style, &render_children);

        let result = if self.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| renderer.render(&input))).unwrap_or_else(|payload| {
                Err(RenderError::renderer(&node.component_type, panic_message(payload.as_ref())))
            })
        } else {
            renderer.render(&input)
        };

        match result {
            Ok(output) => output,
            Err(err) => {
                self.report(node, None, &err);
                placeholder::error(node, &err)
            }
        }
    }

    fn report_failures(&self, node: &ComponentNode, prefix: &str, failures: Vec<PropFailure>) {
        for failure in failures {
            let prop = format!("{}{}", prefix, failure.prop);
            let err = RenderError::Expression {
                prop: prop.clone(),
                source: failure.error,
            };
            self.report(node, Some(&prop), &err);
        }
    }

    fn report(&self, node: &ComponentNode, prop: Option<&str>, err: &RenderError) {
        log::warn!("node {}: {}", node.id, err);
        self.diagnostics.report(&node.id, prop, err);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "renderer panicked".to_string()
    }
}
