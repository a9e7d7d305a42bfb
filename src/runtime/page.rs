//! 页面文件 - CLI 与预览使用的单页描述

use super::PageApp;
use crate::datasource::{DataSourceDef, Scope};
use crate::error::CatalogError;
use crate::parser::ComponentNode;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;

/// page.json 结构
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    #[serde(default = "default_page")]
    pub page: String,
    pub tree: ComponentNode,
    #[serde(default)]
    pub globals: Vec<DataSourceDef>,
    #[serde(default)]
    pub page_sources: Vec<DataSourceDef>,
    /// 引用的全局数据源 id
    #[serde(default)]
    pub references: Vec<String>,
    /// 预置的数据源结果
    #[serde(default)]
    pub results: BTreeMap<String, JsonValue>,
}

fn default_page() -> String { "index".to_string() }

impl PageDocument {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// 把数据源、引用和预置结果装入应用
    pub fn install(&self, app: &mut PageApp) -> Result<(), CatalogError> {
        let catalog = app.catalog_mut();
        for def in &self.globals {
            catalog.add_global(def.clone())?;
        }
        catalog.set_page_sources(&self.page, self.page_sources.clone())?;
        for id in &self.references {
            if !catalog.is_referenced(&self.page, id) {
                catalog.toggle_reference(&self.page, id)?;
            }
        }

        // 预置结果写入该 id 在本页生效的命名空间
        let page_scope = Scope::page(&self.page);
        let global_scope = Scope::Global;
        let store = app.store_mut();
        for (id, value) in &self.results {
            let scope = if self.page_sources.iter().any(|d| &d.id == id) {
                &page_scope
            } else {
                &global_scope
            };
            store.apply_value(scope, id, value.clone());
        }

        let dups = self.tree.duplicate_ids();
        if !dups.is_empty() {
            log::warn!("duplicate node ids in page `{}`: {}", self.page, dups.join(", "));
        }
        Ok(())
    }
}
