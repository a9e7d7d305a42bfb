//! 数据源结果解析

use super::DataSourceDef;
use crate::expr::Binding;
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// 数据源当前结果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Pending,
    Value(JsonValue),
    Error(String),
}

impl From<Resolution> for Binding {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Pending => Binding::Pending,
            Resolution::Value(v) => Binding::Value(v),
            Resolution::Error(e) => Binding::Error(e),
        }
    }
}

/// 数据源所在的命名空间：全局，或某个页面
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Global,
    Page(String),
}

impl Scope {
    pub fn page(name: &str) -> Self {
        Scope::Page(name.to_string())
    }
}

/// 外部解析能力（网络、mock、缓存），渲染期间只读
pub trait DataSourceResolver {
    fn resolve(&self, scope: &Scope, def: &DataSourceDef) -> Resolution;
}

/// 最近一次结果的存储，由渲染之外的加载流程写入
///
/// 结果按 (命名空间, id) 存放，不同页面的同名数据源互不影响；
/// 从未写入过的数据源视为加载中。
#[derive(Debug, Clone, Default)]
pub struct ResolutionStore {
    results: HashMap<(Scope, String), Resolution>,
}

impl ResolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, scope: &Scope, id: &str, resolution: Resolution) {
        self.results.insert((scope.clone(), id.to_string()), resolution);
    }

    pub fn apply_value(&mut self, scope: &Scope, id: &str, value: JsonValue) {
        self.apply(scope, id, Resolution::Value(value));
    }

    pub fn forget(&mut self, scope: &Scope, id: &str) -> Option<Resolution> {
        self.results.remove(&(scope.clone(), id.to_string()))
    }

    /// 清除一个命名空间下的全部结果，返回清除个数
    pub fn forget_scope(&mut self, scope: &Scope) -> usize {
        let before = self.results.len();
        self.results.retain(|(s, _), _| s != scope);
        before - self.results.len()
    }

    pub fn get(&self, scope: &Scope, id: &str) -> Option<&Resolution> {
        self.results.get(&(scope.clone(), id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

impl DataSourceResolver for ResolutionStore {
    fn resolve(&self, scope: &Scope, def: &DataSourceDef) -> Resolution {
        self.get(scope, &def.id).cloned().unwrap_or(Resolution::Pending)
    }
}
