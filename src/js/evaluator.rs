//! 基于 QuickJS 的表达式求值器

use super::JsRuntime;
use crate::error::EvalError;
use crate::expr::{Binding, ExpressionContext, ExpressionEvaluator, Value};
use serde_json::{Map, Value as JsonValue};

// 在 with 作用域内直接 eval，上下文绑定即为局部变量。每次求值使用新的 Context。
// 返回值编码：u = undefined，v<json> = 值，eR<msg> = 引用错误，eS<msg> = 其他错误
const EVAL_SCRIPT: &str = r#"
(function () {
    try {
        var __scope = JSON.parse(__scope_json);
        var __pending = JSON.parse(__pending_json);
        for (var i = 0; i < __pending.length; i++) {
            __scope[__pending[i]] = undefined;
        }
        var __r;
        with (__scope) {
            __r = eval(__expr);
        }
        if (__r === undefined) return "u";
        var __s = JSON.stringify(__r);
        return __s === undefined ? "u" : "v" + __s;
    } catch (e) {
        var kind = e && e.name === "ReferenceError" ? "R" : "S";
        var msg = e && e.message !== undefined ? e.message : String(e);
        return "e" + kind + msg;
    }
})()
"#;

/// JS 表达式求值器
pub struct JsEvaluator {
    runtime: JsRuntime,
}

impl JsEvaluator {
    pub fn new() -> Result<Self, String> {
        Ok(Self { runtime: JsRuntime::new()? })
    }

    fn scope_json(ctx: &ExpressionContext) -> (String, String) {
        let mut scope = Map::new();
        let mut pending = Vec::new();
        for (name, binding) in ctx.flatten() {
            match binding {
                Binding::Value(v) => {
                    scope.insert(name, v);
                }
                Binding::Pending => pending.push(JsonValue::String(name)),
                Binding::Error(_) => {}
            }
        }
        (
            JsonValue::Object(scope).to_string(),
            JsonValue::Array(pending).to_string(),
        )
    }
}

impl ExpressionEvaluator for JsEvaluator {
    fn evaluate(&self, expr: &str, ctx: &ExpressionContext) -> Result<Value, EvalError> {
        let (scope, pending) = Self::scope_json(ctx);
        let globals = [
            ("__scope_json", scope.as_str()),
            ("__pending_json", pending.as_str()),
            ("__expr", expr),
        ];

        let encoded = self
            .runtime
            .eval_with_globals(&globals, EVAL_SCRIPT)
            .map_err(EvalError::Script)?;
        decode_result(&encoded)
    }
}

fn decode_result(encoded: &str) -> Result<Value, EvalError> {
    if encoded == "u" {
        return Ok(Value::Undefined);
    }
    if let Some(json) = encoded.strip_prefix('v') {
        let value = serde_json::from_str(json).map_err(|e| EvalError::Script(e.to_string()))?;
        return Ok(Value::Json(value));
    }
    if let Some(msg) = encoded.strip_prefix("eR") {
        // "'ds9' is not defined"
        let name = msg.split_whitespace().next().unwrap_or(msg).trim_matches('\'');
        return Err(EvalError::UnresolvedReference(name.to_string()));
    }
    if let Some(msg) = encoded.strip_prefix("eS") {
        return Err(EvalError::Script(msg.to_string()));
    }
    Err(EvalError::Script(format!("unexpected engine result `{}`", encoded)))
}
