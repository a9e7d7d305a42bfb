//! QuickJS 表达式引擎

mod evaluator;
mod runtime;

pub use evaluator::JsEvaluator;
pub use runtime::JsRuntime;
