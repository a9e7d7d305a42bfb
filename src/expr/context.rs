//! 表达式上下文 - 父链式不可变作用域

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// 上下文中的一个具名绑定
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Value(JsonValue),
    /// 数据源还在加载，表达式看到的是 undefined
    Pending,
    /// 数据源加载失败
    Error(String),
}

struct Frame {
    bindings: BTreeMap<String, Binding>,
    parent: Option<Rc<Frame>>,
}

/// 单次渲染内不可变的上下文快照
///
/// 子作用域通过 [`ExpressionContext::child`] 叠加在父作用域之上，
/// 同名绑定只遮蔽、不覆盖，父作用域本身永远不会被修改。
#[derive(Clone, Default)]
pub struct ExpressionContext {
    frame: Option<Rc<Frame>>,
}

impl ExpressionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(bindings: impl IntoIterator<Item = (String, Binding)>) -> Self {
        Self::new().child(bindings)
    }

    /// 由 JSON 对象构建，每个顶层键成为一个绑定
    pub fn from_json(data: &JsonValue) -> Self {
        let bindings = data
            .as_object()
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), Binding::Value(v.clone())))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Self::from_bindings(bindings)
    }

    /// 叠加一层新作用域
    pub fn child(&self, bindings: impl IntoIterator<Item = (String, Binding)>) -> Self {
        Self {
            frame: Some(Rc::new(Frame {
                bindings: bindings.into_iter().collect(),
                parent: self.frame.clone(),
            })),
        }
    }

    pub fn with_binding(&self, name: &str, binding: Binding) -> Self {
        self.child([(name.to_string(), binding)])
    }

    pub fn with_value(&self, name: &str, value: JsonValue) -> Self {
        self.with_binding(name, Binding::Value(value))
    }

    /// 由内向外查找
    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        let mut current = self.frame.as_deref();
        while let Some(frame) = current {
            if let Some(binding) = frame.bindings.get(name) {
                return Some(binding);
            }
            current = frame.parent.as_deref();
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// 作用域层数
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.frame.as_deref();
        while let Some(frame) = current {
            depth += 1;
            current = frame.parent.as_deref();
        }
        depth
    }

    /// 可见绑定的扁平视图，内层优先
    pub fn flatten(&self) -> BTreeMap<String, Binding> {
        let mut frames = Vec::new();
        let mut current = self.frame.as_deref();
        while let Some(frame) = current {
            frames.push(frame);
            current = frame.parent.as_deref();
        }

        let mut visible = BTreeMap::new();
        for frame in frames.into_iter().rev() {
            for (name, binding) in &frame.bindings {
                visible.insert(name.clone(), binding.clone());
            }
        }
        visible
    }
}

impl fmt::Debug for ExpressionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpressionContext")
            .field("depth", &self.depth())
            .field("bindings", &self.flatten())
            .finish()
    }
}
