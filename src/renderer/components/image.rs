//! image 组件 - 图片
//!
//! 属性：
//! - src: 图片资源地址
//! - mode: 缩放模式，映射为 object-fit
//!   - scaleToFill: 不保持纵横比缩放
//!   - aspectFit: 保持纵横比，完整显示
//!   - aspectFill: 保持纵横比，只保证短边完全显示
//!
//! 样式里显式给出的 object-fit 优先于 mode。

use super::base::*;
use crate::error::RenderError;
use crate::renderer::{RenderInput, RenderOutput, Renderer};

pub struct ImageRenderer;

/// mode -> object-fit
pub fn object_fit(mode: &str) -> Option<&'static str> {
    match mode {
        "scaleToFill" => Some("fill"),
        "aspectFit" => Some("contain"),
        "aspectFill" => Some("cover"),
        "widthFix" | "heightFix" => Some("contain"),
        _ => None,
    }
}

impl Renderer for ImageRenderer {
    fn render(&self, input: &RenderInput<'_>) -> Result<RenderOutput, RenderError> {
        let mut element = base_element(input, "img", &["mode", "lazyLoad"]);
        if bool_prop(input.props, "lazyLoad") {
            element = element.with_attr("loading", "lazy");
        }

        let has_fit = !input.style.get("objectFit").is_undefined();
        if !has_fit {
            let mode = input.props.get_str("mode").unwrap_or("scaleToFill");
            if let Some(fit) = object_fit(mode) {
                element = element.with_style("objectFit", fit);
            }
        }
        Ok(element)
    }
}
