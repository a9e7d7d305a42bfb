//! 页面运行时

mod app;
mod page;

pub use app::{PageApp, RenderPass};
pub use page::PageDocument;
