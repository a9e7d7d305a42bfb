//! view 组件 - 基础视图容器

use super::base::*;
use crate::error::RenderError;
use crate::renderer::{RenderInput, RenderOutput, Renderer};

/// 通用容器，按输出标签参数化（div / span）
pub struct ContainerRenderer {
    tag: String,
}

impl ContainerRenderer {
    pub fn new(tag: &str) -> Self {
        Self { tag: tag.to_string() }
    }
}

impl Renderer for ContainerRenderer {
    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutput, RenderError> {
        let children = input.render_children();
        Ok(base_element(input, &self.tag, &[]).with_children(children))
    }
}
