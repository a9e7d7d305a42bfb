//! button 组件 - 按钮
//!
//! - type: default / primary / warn
//! - size: default / mini
//! - plain: 镂空按钮
//! - disabled: 禁用状态

use super::base::*;
use crate::error::RenderError;
use crate::renderer::{RenderInput, RenderOutput, Renderer};

pub struct ButtonRenderer;

impl Renderer for ButtonRenderer {
    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutput, RenderError> {
        let props = input.props;
        let btn_type = props.get_str("type").unwrap_or("default");
        let btn_size = props.get_str("size").unwrap_or("default");

        let mut classes = vec![format!("btn-{}", btn_type)];
        if btn_size == "mini" {
            classes.push("btn-mini".to_string());
        }
        if bool_prop(props, "plain") {
            classes.push("btn-plain".to_string());
        }

        let mut element = base_element(input, "button", &["content", "type", "size", "plain", "disabled"])
            .with_attr("class", classes.join(" "));
        if bool_prop(props, "disabled") {
            element = element.with_attr("disabled", true);
        }

        let mut children = Vec::new();
        let content = props.get("content");
        if !content.is_undefined() {
            children.push(RenderOutput::text(content.to_display_string()));
        }
        children.extend(input.render_children());
        Ok(element.with_children(children))
    }
}
