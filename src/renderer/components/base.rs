//! 组件基础定义

use crate::expr::EvaluatedProps;
use crate::renderer::output::is_safe_attr_name;
use crate::renderer::{RenderInput, RenderOutput};

/// 构建带属性与样式的元素，`skip` 中的属性不输出为标签属性。
/// 不能作为 HTML 属性名的 prop（含 `on*` 事件属性）会被丢弃。
pub fn base_element(input: &RenderInput<'_>, tag: &str, skip: &[&str]) -> RenderOutput {
    let mut element = RenderOutput::element(tag, &input.node.id);
    if let RenderOutput::Element { attrs, style, .. } = &mut element {
        *attrs = input
            .props
            .to_json_map()
            .into_iter()
            .filter(|(k, _)| !skip.contains(&k.as_str()))
            .filter(|(k, _)| {
                let safe = is_safe_attr_name(k);
                if !safe {
                    log::warn!("node {}: dropped attribute `{}`", input.node.id, k);
                }
                safe
            })
            .collect();
        *style = input.style.to_json_map();
    }
    element
}

/// 读取布尔属性：`true`、`"true"` 以及其他真值
pub fn bool_prop(props: &EvaluatedProps, name: &str) -> bool {
    match props.get_str(name) {
        Some(s) => s == "true" || s == name,
        None => props.get(name).is_truthy(),
    }
}
