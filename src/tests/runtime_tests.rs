//! 页面运行时测试

use crate::config::{EngineConfig, EvaluatorKind};
use crate::datasource::{DataSourceDef, RequestOptions, Resolution, Scope};
use crate::diagnostics::DiagnosticKind;
use crate::runtime::{PageApp, PageDocument};

const PAGE: &str = r#"{
    "page": "home",
    "tree": {
        "id": "root",
        "type": "View",
        "children": [
            { "id": "title", "type": "Text", "props": { "content": { "$expr": "Hi ${user.name}" } } },
            { "id": "count", "type": "Text", "props": { "content": { "$expr": "${orders.length} orders" } } },
            { "id": "promo", "type": "Text", "props": { "content": { "$expr": "banner.title" } } }
        ]
    },
    "globals": [
        { "id": "user", "options": { "url": "/api/user" } },
        { "id": "banner", "options": { "url": "/api/banner" } }
    ],
    "pageSources": [
        { "id": "orders", "options": { "url": "/api/orders" } }
    ],
    "references": ["user", "banner"],
    "results": {
        "user": { "name": "Alice" },
        "orders": [1, 2, 3]
    }
}"#;

fn app_with_page() -> (PageApp, PageDocument) {
    let document = PageDocument::from_json(PAGE).unwrap();
    let mut app = PageApp::new(EngineConfig::default()).unwrap();
    document.install(&mut app).unwrap();
    (app, document)
}

#[test]
fn test_config_defaults() {
    let config = EngineConfig::from_json("{}").unwrap();
    assert_eq!(config.evaluator, EvaluatorKind::Path);
    assert!(config.catch_panics);
    assert_eq!(config.http_timeout_secs, 10);
    assert!(config.preview.allow_list.contains(&"pages/".to_string()));

    let js = EngineConfig::from_json(r#"{ "evaluator": "js", "preview": { "targetDir": "out" } }"#).unwrap();
    assert_eq!(js.evaluator, EvaluatorKind::Js);
    assert_eq!(js.preview.target_dir, "out");
    assert_eq!(js.preview.allow_list.len(), 4);

    assert!(EngineConfig::from_json(r#"{ "evaluator": "lua" }"#).is_err());
}

/// 渲染一个页面：banner 仍在加载中，显示为空
#[test]
fn test_render_page() {
    let (app, document) = app_with_page();
    let pass = app.render_page(&document.page, &document.tree);

    assert_eq!(pass.output.find("title").unwrap().text_content(), "Hi Alice");
    assert_eq!(pass.output.find("count").unwrap().text_content(), "3 orders");
    assert_eq!(pass.output.find("promo").unwrap().text_content(), "");
    assert!(pass.diagnostics.is_empty());
}

/// 数据源结果推入后，下次渲染使用新值
#[test]
fn test_rerender_after_resolution() {
    let (mut app, document) = app_with_page();
    app.store_mut().apply_value(&Scope::Global, "banner", serde_json::json!({ "title": "Sale" }));
    let pass = app.render_page(&document.page, &document.tree);
    assert_eq!(pass.output.find("promo").unwrap().text_content(), "Sale");

    app.store_mut().apply(&Scope::Global, "banner", Resolution::Error("HTTP 502".into()));
    let pass = app.render_page(&document.page, &document.tree);
    assert_eq!(pass.output.find("promo").unwrap().text_content(), "");
    assert_eq!(pass.diagnostics.len(), 1);
    assert_eq!(pass.diagnostics[0].node_id, "promo");
    assert_eq!(pass.diagnostics[0].kind, DiagnosticKind::Expression);
}

/// 取消引用后绑定变为未解析引用
#[test]
fn test_toggle_reference_affects_next_pass() {
    let (mut app, document) = app_with_page();
    app.catalog_mut().toggle_reference("home", "user").unwrap();

    let pass = app.render_page(&document.page, &document.tree);
    assert_eq!(pass.output.find("title").unwrap().text_content(), "");
    assert_eq!(pass.diagnostics.len(), 1);
    assert_eq!(pass.diagnostics[0].prop.as_deref(), Some("content"));
}

/// 删除全局数据源后页面不再引用它，重新添加时从加载中开始
#[test]
fn test_remove_global_from_app() {
    let (mut app, document) = app_with_page();
    let (removed, pruned) = app.remove_global("user").unwrap();
    assert_eq!(pruned, vec!["home"]);
    assert!(!app.catalog().is_referenced("home", "user"));
    assert!(app.store().get(&Scope::Global, "user").is_none());

    app.catalog_mut().add_global(removed).unwrap();
    app.catalog_mut().toggle_reference("home", "user").unwrap();
    let pass = app.render_page(&document.page, &document.tree);
    assert_eq!(pass.output.find("title").unwrap().text_content(), "Hi ");
    assert!(pass.diagnostics.is_empty());
}

/// 预置结果按数据源所在命名空间写入；删除页面时一并清除
#[test]
fn test_results_scoped_and_remove_page() {
    let (mut app, _) = app_with_page();
    let home = Scope::page("home");
    assert_eq!(app.store().get(&home, "orders"), Some(&Resolution::Value(serde_json::json!([1, 2, 3]))));
    assert!(app.store().get(&Scope::Global, "orders").is_none());
    assert!(app.store().get(&Scope::Global, "user").is_some());

    app.remove_page("home");
    assert!(app.store().get(&home, "orders").is_none());
    assert!(app.catalog().page_sources("home").is_empty());
    assert!(app.store().get(&Scope::Global, "user").is_some());
}

#[test]
fn test_js_engine_page() {
    let document = PageDocument::from_json(PAGE).unwrap();
    let config = EngineConfig { evaluator: EvaluatorKind::Js, ..Default::default() };
    let mut app = PageApp::new(config).unwrap();
    document.install(&mut app).unwrap();
    app.catalog_mut()
        .set_page_sources("home", vec![DataSourceDef::new("orders", RequestOptions::get("/api/orders"))])
        .unwrap();

    let pass = app.render_page(&document.page, &document.tree);
    assert_eq!(pass.output.find("title").unwrap().text_content(), "Hi Alice");
    assert_eq!(pass.output.find("count").unwrap().text_content(), "3 orders");
}
