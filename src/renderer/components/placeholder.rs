//! 占位标记 - 未知组件与渲染失败

use crate::error::RenderError;
use crate::parser::ComponentNode;
use crate::renderer::{MarkerKind, RenderOutput};

pub fn unknown(node: &ComponentNode) -> RenderOutput {
    RenderOutput::marker(
        MarkerKind::Unknown,
        &node.id,
        format!("unknown component: {}", node.component_type),
    )
}

pub fn error(node: &ComponentNode, err: &RenderError) -> RenderOutput {
    RenderOutput::marker(
        MarkerKind::Error,
        &node.id,
        format!("render error in {} ({}): {}", node.component_type, node.id, err),
    )
}
