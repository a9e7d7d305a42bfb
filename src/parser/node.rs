//! 组件节点 - 页面声明式 UI 树

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, HashSet};

/// 绑定表达式在 JSON 中的键名：`{"$expr": "ds1.name"}`
pub const EXPR_KEY: &str = "$expr";

/// 属性值：字面量或绑定表达式，在编辑时就已确定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JsonValue", into = "JsonValue")]
pub enum PropValue {
    Literal(JsonValue),
    Bound(String),
}

impl PropValue {
    pub fn literal(value: impl Into<JsonValue>) -> Self {
        PropValue::Literal(value.into())
    }

    pub fn bound(source: impl Into<String>) -> Self {
        PropValue::Bound(source.into())
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, PropValue::Bound(_))
    }
}

impl TryFrom<JsonValue> for PropValue {
    type Error = String;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        if let JsonValue::Object(map) = &value {
            if map.len() == 1 {
                if let Some(expr) = map.get(EXPR_KEY) {
                    return match expr {
                        JsonValue::String(s) => Ok(PropValue::Bound(s.clone())),
                        other => Err(format!("`{}` must be a string, got {}", EXPR_KEY, other)),
                    };
                }
            }
        }
        Ok(PropValue::Literal(value))
    }
}

impl From<PropValue> for JsonValue {
    fn from(value: PropValue) -> Self {
        match value {
            PropValue::Literal(v) => v,
            PropValue::Bound(source) => {
                let mut map = Map::new();
                map.insert(EXPR_KEY.to_string(), JsonValue::String(source));
                JsonValue::Object(map)
            }
        }
    }
}

/// 属性表，按键名排序保证求值顺序稳定
pub type PropMap = BTreeMap<String, PropValue>;

/// 组件节点
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComponentNode {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub component_type: String,
    #[serde(default)]
    pub props: PropMap,
    #[serde(default)]
    pub style: PropMap,
    #[serde(default)]
    pub children: Vec<ComponentNode>,
}

impl ComponentNode {
    pub fn new(id: &str, component_type: &str) -> Self {
        Self {
            id: id.to_string(),
            component_type: component_type.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_value(value: JsonValue) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.props.insert(name.to_string(), PropValue::literal(value));
        self
    }

    pub fn bind_prop(mut self, name: &str, source: &str) -> Self {
        self.props.insert(name.to_string(), PropValue::bound(source));
        self
    }

    pub fn with_style(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        self.style.insert(name.to_string(), PropValue::literal(value));
        self
    }

    pub fn bind_style(mut self, name: &str, source: &str) -> Self {
        self.style.insert(name.to_string(), PropValue::bound(source));
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ComponentNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// 按 id 深度优先查找
    pub fn find(&self, id: &str) -> Option<&ComponentNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// 树中节点总数
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// 返回重复出现的 id（按首次重复的顺序）
    pub fn duplicate_ids(&self) -> Vec<String> {
        fn walk<'a>(node: &'a ComponentNode, seen: &mut HashSet<&'a str>, dups: &mut Vec<String>) {
            if !seen.insert(node.id.as_str()) && !dups.contains(&node.id) {
                dups.push(node.id.clone());
            }
            for child in &node.children {
                walk(child, seen, dups);
            }
        }

        let mut seen = HashSet::new();
        let mut dups = Vec::new();
        walk(self, &mut seen, &mut dups);
        dups
    }
}
