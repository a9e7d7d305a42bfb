//! 组件注册表 - 组件类型名到渲染器的映射

use super::components::{ButtonRenderer, ContainerRenderer, ImageRenderer, TextRenderer};
use super::output::RenderOutput;
use crate::error::RenderError;
use crate::expr::{EvaluatedProps, ExpressionContext};
use crate::parser::ComponentNode;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 渲染器入参
pub struct RenderInput<'a> {
    pub node: &'a ComponentNode,
    pub context: &'a ExpressionContext,
    pub props: &'a EvaluatedProps,
    pub style: &'a EvaluatedProps,
    children: &'a dyn Fn() -> Vec<RenderOutput>,
}

impl<'a> RenderInput<'a> {
    pub fn new(
        node: &'a ComponentNode,
        context: &'a ExpressionContext,
        props: &'a EvaluatedProps,
        style: &'a EvaluatedProps,
        children: &'a dyn Fn() -> Vec<RenderOutput>,
    ) -> Self {
        Self { node, context, props, style, children }
    }

    /// 按声明顺序渲染直接子节点；不调用则子树不会被求值
    pub fn render_children(&self) -> Vec<RenderOutput> {
        (self.children)()
    }
}

/// 渲染器，不得修改节点或上下文
pub trait Renderer: Send + Sync {
    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutput, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&RenderInput<'_>) -> Result<RenderOutput, RenderError> + Send + Sync,
{
    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutput, RenderError> {
        self(input)
    }
}

/// 组件注册表
#[derive(Default)]
pub struct ComponentRegistry {
    renderers: HashMap<String, Arc<dyn Renderer>>,
    order: Vec<String>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置内置组件
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("View", ContainerRenderer::new("div"));
        registry.register("Block", ContainerRenderer::new("span"));
        registry.register("Text", TextRenderer);
        registry.register("Image", ImageRenderer);
        registry.register("Button", ButtonRenderer);
        registry
    }

    /// 注册渲染器，同名覆盖（后写生效），面板顺序保持首次注册的位置
    pub fn register(&mut self, name: &str, renderer: impl Renderer + 'static) {
        if self.renderers.insert(name.to_string(), Arc::new(renderer)).is_some() {
            log::debug!("renderer `{}` overridden", name);
        } else {
            self.order.push(name.to_string());
        }
    }

    /// 以闭包注册
    pub fn register_fn<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&RenderInput<'_>) -> Result<RenderOutput, RenderError> + Send + Sync + 'static,
    {
        self.register(name, f);
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        if self.renderers.remove(name).is_some() {
            self.order.retain(|n| n != name);
            true
        } else {
            false
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Renderer>> {
        self.renderers.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// 已注册组件名，按注册顺序
    pub fn registered_components(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// 全局共享注册表，供插件在加载时注册组件
static SHARED_REGISTRY: Lazy<RwLock<ComponentRegistry>> =
    Lazy::new(|| RwLock::new(ComponentRegistry::with_builtins()));

pub fn shared() -> &'static RwLock<ComponentRegistry> {
    &SHARED_REGISTRY
}
