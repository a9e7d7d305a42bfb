//! 单元测试模块
//! 覆盖表达式求值、组件注册、树渲染、数据源与预览同步

pub mod renderer_tests;
pub mod runtime_tests;
