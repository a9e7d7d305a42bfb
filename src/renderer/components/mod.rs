//! 内置组件实现
//! 每个组件独立文件，便于维护

mod base;
mod button;
mod image;
pub mod placeholder;
mod text;
mod view;

pub use base::*;
pub use button::ButtonRenderer;
pub use image::{object_fit, ImageRenderer};
pub use text::TextRenderer;
pub use view::ContainerRenderer;
