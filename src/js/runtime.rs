//! QuickJS 运行时

use rquickjs::{context::EvalOptions, Context, Runtime, Result as JsResult};

/// JS 运行时
///
/// 每次执行都新建 Context，上一次执行留下的全局变量不会影响下一次。
pub struct JsRuntime {
    runtime: Runtime,
}

impl JsRuntime {
    pub fn new() -> Result<Self, String> {
        let runtime = Runtime::new().map_err(|e| e.to_string())?;
        Ok(Self { runtime })
    }

    /// 执行返回字符串的 JS 代码
    pub fn eval_string(&self, code: &str) -> Result<String, String> {
        self.eval_with_globals(&[], code)
    }

    /// 写入全局字符串变量后执行返回字符串的 JS 代码
    pub fn eval_with_globals(&self, globals: &[(&str, &str)], code: &str) -> Result<String, String> {
        let context = Context::full(&self.runtime).map_err(|e| e.to_string())?;
        context.with(|ctx| {
            let global = ctx.globals();
            for (name, value) in globals {
                global.set(*name, *value).map_err(|e| e.to_string())?;
            }
            let mut options = EvalOptions::default();
            options.strict = false;
            let result: JsResult<String> = ctx.eval_with_options(code, options);
            result.map_err(|e| format!("{:?}", e))
        })
    }
}
