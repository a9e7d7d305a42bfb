//! 数据源模型 - 定义、页面引用与结果解析

mod catalog;
mod def;
mod fetch;
mod resolver;

pub use catalog::DataSourceCatalog;
pub use def::{DataSourceDef, HttpMethod, RequestOptions, ResponseField};
pub use fetch::HttpFetcher;
pub use resolver::{DataSourceResolver, Resolution, ResolutionStore, Scope};
