//! text 组件 - 文本显示

use super::base::*;
use crate::error::RenderError;
use crate::renderer::{RenderInput, RenderOutput, Renderer};

/// 文本组件，从不渲染子节点
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutput, RenderError> {
        // undefined / null 显示为空串
        let content = input.props.get("content").to_display_string();
        Ok(base_element(input, "span", &["content"]).with_children(vec![RenderOutput::text(content)]))
    }
}
