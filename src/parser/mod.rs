//! 页面树与表达式模板解析

pub mod node;
pub mod template;

pub use node::{ComponentNode, PropMap, PropValue, EXPR_KEY};
pub use template::{Segment, Template};
