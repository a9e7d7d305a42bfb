//! UI 渲染器 - 将组件树渲染为输出树

pub mod components;
mod output;
pub mod registry;
mod tree_renderer;

pub use output::{MarkerKind, RenderOutput};
pub use registry::{ComponentRegistry, RenderInput, Renderer};
pub use tree_renderer::TreeRenderer;
