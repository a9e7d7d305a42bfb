//! 渲染输出树

use crate::expr::json_to_string;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// 标记类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    /// 未注册的组件类型
    Unknown,
    /// 渲染器执行失败
    Error,
}

impl MarkerKind {
    fn css_class(self) -> &'static str {
        match self {
            MarkerKind::Unknown => "render-marker--unknown",
            MarkerKind::Error => "render-marker--error",
        }
    }
}

/// 自闭合标签
const VOID_TAGS: &[&str] = &["img", "input", "br", "hr"];

/// 渲染节点
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderOutput {
    #[serde(rename_all = "camelCase")]
    Element {
        tag: String,
        node_id: String,
        attrs: BTreeMap<String, JsonValue>,
        style: BTreeMap<String, JsonValue>,
        children: Vec<RenderOutput>,
    },
    Text { text: String },
    Fragment { children: Vec<RenderOutput> },
    #[serde(rename_all = "camelCase")]
    Marker {
        marker: MarkerKind,
        node_id: String,
        message: String,
    },
    Empty,
}

impl RenderOutput {
    pub fn element(tag: &str, node_id: &str) -> Self {
        RenderOutput::Element {
            tag: tag.to_string(),
            node_id: node_id.to_string(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        RenderOutput::Text { text: text.into() }
    }

    pub fn fragment(children: Vec<RenderOutput>) -> Self {
        RenderOutput::Fragment { children }
    }

    pub fn marker(marker: MarkerKind, node_id: &str, message: impl Into<String>) -> Self {
        RenderOutput::Marker {
            marker,
            node_id: node_id.to_string(),
            message: message.into(),
        }
    }

    /// 追加子节点，非容器节点忽略
    pub fn with_children(mut self, extra: Vec<RenderOutput>) -> Self {
        match &mut self {
            RenderOutput::Element { children, .. } | RenderOutput::Fragment { children } => {
                children.extend(extra)
            }
            _ => {}
        }
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        if let RenderOutput::Element { attrs, .. } = &mut self {
            attrs.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn with_style(mut self, name: &str, value: impl Into<JsonValue>) -> Self {
        if let RenderOutput::Element { style, .. } = &mut self {
            style.insert(name.to_string(), value.into());
        }
        self
    }

    pub fn children(&self) -> &[RenderOutput] {
        match self {
            RenderOutput::Element { children, .. } | RenderOutput::Fragment { children } => children.as_slice(),
            _ => &[],
        }
    }

    pub fn node_id(&self) -> Option<&str> {
        match self {
            RenderOutput::Element { node_id, .. } | RenderOutput::Marker { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    pub fn is_marker(&self) -> bool {
        matches!(self, RenderOutput::Marker { .. })
    }

    /// 所有可见文本，标记的说明文字也包含在内
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderOutput::Text { text } => out.push_str(text),
            RenderOutput::Marker { message, .. } => out.push_str(message),
            RenderOutput::Element { children, .. } | RenderOutput::Fragment { children } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            RenderOutput::Empty => {}
        }
    }

    /// 深度优先收集所有标记
    pub fn markers(&self) -> Vec<&RenderOutput> {
        let mut found = Vec::new();
        self.walk(&mut |n| {
            if n.is_marker() {
                found.push(n);
            }
        });
        found
    }

    /// 按节点 id 查找输出
    pub fn find(&self, id: &str) -> Option<&RenderOutput> {
        if self.node_id() == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a RenderOutput)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// 序列化为 HTML 供预览宿主使用
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            RenderOutput::Text { text } => out.push_str(&escape_html(text)),
            RenderOutput::Fragment { children } => {
                for child in children {
                    child.write_html(out);
                }
            }
            RenderOutput::Marker { marker, node_id, message } => {
                out.push_str(&format!(
                    "<div class=\"render-marker {}\" data-node-id=\"{}\">{}</div>",
                    marker.css_class(),
                    escape_html(node_id),
                    escape_html(message)
                ));
            }
            RenderOutput::Element { tag, node_id, attrs, style, children } => {
                let tag = if is_valid_tag(tag) { tag.as_str() } else { "div" };
                out.push('<');
                out.push_str(tag);
                if !node_id.is_empty() {
                    out.push_str(&format!(" data-node-id=\"{}\"", escape_html(node_id)));
                }
                for (name, value) in attrs.iter().filter(|(name, _)| is_safe_attr_name(name)) {
                    match value {
                        JsonValue::Bool(true) => out.push_str(&format!(" {}", name)),
                        JsonValue::Bool(false) | JsonValue::Null => {}
                        other => out.push_str(&format!(
                            " {}=\"{}\"",
                            name,
                            escape_html(&json_to_string(other))
                        )),
                    }
                }
                let css = style
                    .iter()
                    .filter(|(k, v)| !v.is_null() && is_css_property(k))
                    .map(|(k, v)| format!("{}: {}", kebab_case(k), json_to_string(v)))
                    .collect::<Vec<_>>()
                    .join("; ");
                if !css.is_empty() {
                    out.push_str(&format!(" style=\"{}\"", escape_html(&css)));
                }
                if VOID_TAGS.contains(&tag) {
                    out.push_str(" />");
                    return;
                }
                out.push('>');
                for child in children {
                    child.write_html(out);
                }
                out.push_str(&format!("</{}>", tag));
            }
            RenderOutput::Empty => {}
        }
    }
}

/// 可以输出为 HTML 属性的名字：`[A-Za-z_:][-A-Za-z0-9_:.]*`，且不是 `on*` 事件属性
pub fn is_safe_attr_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == ':') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.')) {
        return false;
    }
    !name.get(..2).map_or(false, |p| p.eq_ignore_ascii_case("on"))
}

/// 标签名只允许字母开头的字母、数字与连字符
fn is_valid_tag(tag: &str) -> bool {
    tag.chars().next().map_or(false, |c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// 样式属性名只允许字母与连字符
fn is_css_property(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '-')
}

/// backgroundColor -> background-color
fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
