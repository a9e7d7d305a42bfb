//! 数据源目录 - 全局数据源、页面数据源与页面引用集合

use super::{DataSourceDef, DataSourceResolver, Scope};
use crate::error::CatalogError;
use crate::expr::{Binding, ExpressionContext};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceCatalog {
    /// 全局数据源，按创建顺序
    #[serde(default)]
    globals: Vec<DataSourceDef>,
    /// 页面私有数据源
    #[serde(default)]
    page_sources: BTreeMap<String, Vec<DataSourceDef>>,
    /// 页面 -> 引用的全局数据源 id
    #[serde(default)]
    references: BTreeMap<String, BTreeSet<String>>,
}

impl DataSourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        check_ids("global", &catalog.globals)?;
        for (page, sources) in &catalog.page_sources {
            check_ids(page, sources)?;
        }
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        std::fs::write(path, self.to_json()?).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    // ---- 全局数据源 ----

    pub fn list_global(&self) -> &[DataSourceDef] {
        &self.globals
    }

    pub fn get_global(&self, id: &str) -> Option<&DataSourceDef> {
        self.globals.iter().find(|d| d.id == id)
    }

    /// 新增或替换，替换时保留原位置
    pub fn add_global(&mut self, def: DataSourceDef) -> Result<(), CatalogError> {
        if def.id.is_empty() {
            return Err(CatalogError::EmptyId);
        }
        match self.globals.iter_mut().find(|d| d.id == def.id) {
            Some(existing) => *existing = def,
            None => self.globals.push(def),
        }
        Ok(())
    }

    /// 删除全局数据源，并从所有页面的引用集合中清除该 id。
    /// 返回被清理的页面。
    pub fn remove_global(&mut self, id: &str) -> Option<(DataSourceDef, Vec<String>)> {
        let index = self.globals.iter().position(|d| d.id == id)?;
        let def = self.globals.remove(index);

        let mut pruned = Vec::new();
        for (page, refs) in self.references.iter_mut() {
            if refs.remove(id) {
                pruned.push(page.clone());
            }
        }
        self.references.retain(|_, refs| !refs.is_empty());

        log::info!("removed global data source `{}`, pruned {} page(s)", id, pruned.len());
        Some((def, pruned))
    }

    // ---- 页面引用 ----

    /// 切换引用：已引用则移除，未引用则加入。返回切换后的状态。
    pub fn toggle_reference(&mut self, page: &str, id: &str) -> Result<bool, CatalogError> {
        if let Some(refs) = self.references.get_mut(page) {
            if refs.remove(id) {
                if refs.is_empty() {
                    self.references.remove(page);
                }
                return Ok(false);
            }
        }

        if self.get_global(id).is_none() {
            return Err(CatalogError::UnknownGlobal(id.to_string()));
        }
        self.references
            .entry(page.to_string())
            .or_default()
            .insert(id.to_string());
        Ok(true)
    }

    pub fn is_referenced(&self, page: &str, id: &str) -> bool {
        self.references
            .get(page)
            .map(|refs| refs.contains(id))
            .unwrap_or(false)
    }

    pub fn references(&self, page: &str) -> Vec<String> {
        self.references
            .get(page)
            .map(|refs| refs.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// 反查引用了某个全局数据源的页面（遍历所有页面）
    pub fn pages_referencing(&self, id: &str) -> Vec<String> {
        self.references
            .iter()
            .filter(|(_, refs)| refs.contains(id))
            .map(|(page, _)| page.clone())
            .collect()
    }

    // ---- 页面数据源 ----

    /// 替换页面数据源；同一页面内 id 必须非空且唯一
    pub fn set_page_sources(&mut self, page: &str, sources: Vec<DataSourceDef>) -> Result<(), CatalogError> {
        check_ids(page, &sources)?;
        if sources.is_empty() {
            self.page_sources.remove(page);
        } else {
            self.page_sources.insert(page.to_string(), sources);
        }
        Ok(())
    }

    pub fn page_sources(&self, page: &str) -> &[DataSourceDef] {
        self.page_sources.get(page).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// 删除页面及其引用
    pub fn remove_page(&mut self, page: &str) {
        self.page_sources.remove(page);
        self.references.remove(page);
    }

    /// 页面生效的数据源：被引用的全局数据源（按全局顺序）在前，页面数据源在后。
    /// 页面数据源与全局同名时遮蔽全局。
    pub fn active_sources(&self, page: &str) -> Vec<&DataSourceDef> {
        self.scoped_sources(page).into_iter().map(|(_, def)| def).collect()
    }

    /// 同 `active_sources`，附带每个数据源所在的命名空间
    pub fn scoped_sources(&self, page: &str) -> Vec<(Scope, &DataSourceDef)> {
        let locals = self.page_sources(page);
        let mut active: Vec<(Scope, &DataSourceDef)> = self
            .globals
            .iter()
            .filter(|d| self.is_referenced(page, &d.id))
            .filter(|d| !locals.iter().any(|l| l.id == d.id))
            .map(|d| (Scope::Global, d))
            .collect();
        let scope = Scope::page(page);
        active.extend(locals.iter().map(|d| (scope.clone(), d)));
        active
    }

    /// 为页面构建表达式上下文：全局层在外，页面层在内
    pub fn build_context(&self, page: &str, resolver: &dyn DataSourceResolver) -> ExpressionContext {
        let globals = self
            .globals
            .iter()
            .filter(|d| self.is_referenced(page, &d.id))
            .map(|d| (d.id.clone(), Binding::from(resolver.resolve(&Scope::Global, d))))
            .collect::<Vec<_>>();
        let scope = Scope::page(page);
        let locals = self
            .page_sources(page)
            .iter()
            .map(|d| (d.id.clone(), Binding::from(resolver.resolve(&scope, d))))
            .collect::<Vec<_>>();

        ExpressionContext::new().child(globals).child(locals)
    }
}

fn check_ids(scope: &str, sources: &[DataSourceDef]) -> Result<(), CatalogError> {
    let mut seen = BTreeSet::new();
    for def in sources {
        if def.id.is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if !seen.insert(def.id.as_str()) {
            return Err(CatalogError::DuplicateId {
                scope: scope.to_string(),
                id: def.id.clone(),
            });
        }
    }
    Ok(())
}
