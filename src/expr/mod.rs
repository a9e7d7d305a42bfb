//! 表达式求值 - 连接求值引擎与节点属性

mod context;
mod path;

pub use context::{Binding, ExpressionContext};
pub use path::PathEvaluator;

use crate::error::EvalError;
use crate::parser::{PropMap, PropValue, Segment, Template};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// 求值结果，区分 undefined 与 JSON null
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Json(JsonValue),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Value::Json(v) => Some(v),
            Value::Undefined => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(|v| v.as_str())
    }

    /// 转为 JSON，undefined 变为 null
    pub fn to_json(&self) -> JsonValue {
        self.as_json().cloned().unwrap_or(JsonValue::Null)
    }

    /// 显示用字符串，undefined 与 null 都是空串
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => String::new(),
            Value::Json(v) => json_to_string(v),
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Json(v) => is_truthy(v),
        }
    }
}

impl From<JsonValue> for Value {
    fn from(value: JsonValue) -> Self {
        Value::Json(value)
    }
}

pub(crate) fn json_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => number_to_string(n),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => String::new(),
        _ => value.to_string(),
    }
}

fn number_to_string(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
        }
    }
    n.to_string()
}

pub(crate) fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// 外部表达式求值能力
///
/// 实现只需处理单个表达式（不含 `${}`），模板拼接与数据源状态由 [`evaluate_source`] 处理。
pub trait ExpressionEvaluator {
    fn evaluate(&self, expr: &str, ctx: &ExpressionContext) -> Result<Value, EvalError>;
}

/// 对一段表达式源码求值
pub fn evaluate_source(
    evaluator: &dyn ExpressionEvaluator,
    source: &str,
    ctx: &ExpressionContext,
) -> Result<Value, EvalError> {
    match Template::parse(source)? {
        Template::Expr(expr) => evaluate_guarded(evaluator, &expr, ctx),
        Template::Interpolated(segments) => {
            let mut out = String::new();
            for segment in &segments {
                match segment {
                    Segment::Text(text) => out.push_str(text),
                    Segment::Expr(expr) => {
                        out.push_str(&evaluate_guarded(evaluator, expr, ctx)?.to_display_string())
                    }
                }
            }
            Ok(Value::Json(JsonValue::String(out)))
        }
    }
}

/// 先检查表达式引用的数据源状态：失败则报错，加载中则为 undefined
fn evaluate_guarded(
    evaluator: &dyn ExpressionEvaluator,
    expr: &str,
    ctx: &ExpressionContext,
) -> Result<Value, EvalError> {
    let mut pending = false;
    for name in free_identifiers(expr) {
        match ctx.lookup(&name) {
            Some(Binding::Error(message)) => {
                return Err(EvalError::DataSource {
                    id: name,
                    message: message.clone(),
                })
            }
            Some(Binding::Pending) => pending = true,
            _ => {}
        }
    }
    if pending {
        return Ok(Value::Undefined);
    }
    evaluator.evaluate(expr, ctx)
}

/// 单个属性求值失败的记录
#[derive(Debug, Clone, PartialEq)]
pub struct PropFailure {
    pub prop: String,
    pub error: EvalError,
}

/// 求值后的属性表
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EvaluatedProps {
    values: BTreeMap<String, Value>,
}

impl EvaluatedProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// 不存在的属性视为 undefined
    pub fn get(&self, name: &str) -> &Value {
        const UNDEFINED: &Value = &Value::Undefined;
        self.values.get(name).unwrap_or(UNDEFINED)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).as_str()
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// 只保留有值的条目，undefined 被丢弃
    pub fn to_json_map(&self) -> BTreeMap<String, JsonValue> {
        self.values
            .iter()
            .filter_map(|(k, v)| v.as_json().map(|j| (k.clone(), j.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 对属性表逐项求值：字面量原样传递，绑定表达式求值，失败的项为 undefined
pub fn evaluate_props(
    evaluator: &dyn ExpressionEvaluator,
    props: &PropMap,
    ctx: &ExpressionContext,
) -> (EvaluatedProps, Vec<PropFailure>) {
    let mut evaluated = EvaluatedProps::new();
    let mut failures = Vec::new();

    for (name, value) in props {
        let value = match value {
            PropValue::Literal(v) => Value::Json(v.clone()),
            PropValue::Bound(source) => match evaluate_source(evaluator, source, ctx) {
                Ok(v) => v,
                Err(error) => {
                    failures.push(PropFailure {
                        prop: name.clone(),
                        error,
                    });
                    Value::Undefined
                }
            },
        };
        evaluated.insert(name, value);
    }

    (evaluated, failures)
}

const KEYWORDS: &[&str] = &[
    "true", "false", "null", "undefined", "typeof", "instanceof", "new", "this", "in", "of",
    "void", "NaN", "Infinity", "function", "return", "var", "let", "const",
];

/// 扫描表达式中的自由标识符（跳过字符串字面量与成员访问）
pub fn free_identifiers(expr: &str) -> Vec<String> {
    let chars: Vec<char> = expr.chars().collect();
    let mut names: Vec<String> = Vec::new();
    let mut pos = 0;
    let mut prev_significant: Option<char> = None;

    while pos < chars.len() {
        let c = chars[pos];
        if c == '\'' || c == '"' || c == '`' {
            pos += 1;
            while pos < chars.len() && chars[pos] != c {
                if chars[pos] == '\\' {
                    pos += 1;
                }
                pos += 1;
            }
            pos += 1;
            prev_significant = Some(c);
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let start = pos;
            while pos < chars.len() && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '$') {
                pos += 1;
            }
            let ident: String = chars[start..pos].iter().collect();
            let member = prev_significant == Some('.');
            if !member && !KEYWORDS.contains(&ident.as_str()) && !names.contains(&ident) {
                names.push(ident);
            }
            prev_significant = Some('a');
            continue;
        }

        if c.is_ascii_digit() {
            while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '.') {
                pos += 1;
            }
            prev_significant = Some('0');
            continue;
        }

        if !c.is_whitespace() {
            prev_significant = Some(c);
        }
        pos += 1;
    }

    names
}
