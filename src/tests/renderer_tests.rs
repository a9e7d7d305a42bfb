//! 树渲染器单元测试
//! 测试属性绑定、未知组件、失败隔离与渲染顺序

use crate::diagnostics::{DiagnosticKind, DiagnosticsCollector, LogSink};
use crate::error::{EvalError, RenderError};
use crate::expr::{Binding, ExpressionContext, ExpressionEvaluator, PathEvaluator, Value};
use crate::parser::ComponentNode;
use crate::renderer::{ComponentRegistry, MarkerKind, RenderOutput, TreeRenderer};
use serde_json::json;
use std::cell::RefCell;

/// 辅助函数：用内置组件渲染
fn render_with(registry: &ComponentRegistry, node: &ComponentNode, ctx: &ExpressionContext) -> (RenderOutput, DiagnosticsCollector) {
    let diagnostics = DiagnosticsCollector::new();
    let out = TreeRenderer::new(registry, &PathEvaluator, &diagnostics).render(node, ctx);
    (out, diagnostics)
}

fn render(node: &ComponentNode, ctx: &ExpressionContext) -> (RenderOutput, DiagnosticsCollector) {
    render_with(&ComponentRegistry::with_builtins(), node, ctx)
}

fn text(id: &str, content: &str) -> ComponentNode {
    ComponentNode::new(id, "Text").with_prop("content", content)
}

/// 测试数据绑定渲染
#[test]
fn test_text_binding_render() {
    let node = ComponentNode::new("t1", "Text").bind_prop("content", "${ds1.name}");
    let ctx = ExpressionContext::from_json(&json!({ "ds1": { "name": "Alice" } }));

    let (out, diagnostics) = render(&node, &ctx);

    assert_eq!(
        out,
        RenderOutput::element("span", "t1").with_children(vec![RenderOutput::text("Alice")])
    );
    assert!(diagnostics.is_empty());
}

/// 数据源加载中时渲染空文本，不报错
#[test]
fn test_text_pending_renders_empty() {
    let node = ComponentNode::new("t1", "Text").bind_prop("content", "${ds1.name}");
    let pending = ExpressionContext::from_bindings(vec![("ds1".to_string(), Binding::Pending)]);
    let null = ExpressionContext::from_json(&json!({ "ds1": null }));

    for ctx in [pending, null] {
        let (out, diagnostics) = render(&node, &ctx);
        assert_eq!(out.text_content(), "");
        assert!(!out.to_html().contains("undefined"));
        assert!(!out.to_html().contains("null"));
        assert!(diagnostics.is_empty());
    }
}

/// 测试未知组件
#[test]
fn test_unknown_component_marker() {
    let node = ComponentNode::new("u1", "Unknown").bind_prop("x", "nope.value");
    let (out, diagnostics) = render(&node, &ExpressionContext::new());

    assert!(out.is_marker());
    assert!(out.text_content().contains("Unknown"));
    assert_eq!(out.node_id(), Some("u1"));

    let reports = diagnostics.for_node("u1");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].kind, DiagnosticKind::UnknownComponent);
    assert_eq!(reports[0].prop, None);
}

/// 第二个子节点渲染失败，第一个子节点的输出仍然保留
#[test]
fn test_failing_child_is_isolated() {
    let mut registry = ComponentRegistry::with_builtins();
    registry.register_fn("Broken", |input| {
        Err(RenderError::renderer(&input.node.component_type, "kaboom"))
    });

    let tree = ComponentNode::new("root", "View")
        .with_child(text("a", "first"))
        .with_child(ComponentNode::new("b", "Broken"));

    let (out, diagnostics) = render_with(&registry, &tree, &ExpressionContext::new());
    let children = out.children();

    assert_eq!(children.len(), 2);
    assert_eq!(children[0].text_content(), "first");
    match &children[1] {
        RenderOutput::Marker { marker, node_id, message } => {
            assert_eq!(*marker, MarkerKind::Error);
            assert_eq!(node_id, "b");
            assert!(message.contains("kaboom"));
            assert!(message.contains("b"));
        }
        other => panic!("expected marker, got {:?}", other),
    }

    let reports = diagnostics.entries();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].node_id, "b");
    assert_eq!(reports[0].kind, DiagnosticKind::Renderer);
}

/// 渲染器 panic 同样被隔离
#[test]
fn test_panicking_renderer_is_isolated() {
    let mut registry = ComponentRegistry::with_builtins();
    registry.register_fn("Panics", |_input| panic!("renderer exploded"));

    let tree = ComponentNode::new("root", "View")
        .with_child(ComponentNode::new("p", "Panics"))
        .with_child(text("after", "still here"));

    let (out, diagnostics) = render_with(&registry, &tree, &ExpressionContext::new());

    assert!(out.children()[0].is_marker());
    assert!(out.children()[0].text_content().contains("renderer exploded"));
    assert_eq!(out.children()[1].text_content(), "still here");
    assert_eq!(diagnostics.for_node("p").len(), 1);
}

/// 子节点按声明顺序输出
#[test]
fn test_children_declaration_order() {
    let tree = ComponentNode::new("root", "View").with_children(vec![
        text("A", "A"),
        ComponentNode::new("B", "Block").with_child(text("B1", "B")),
        text("C", "C"),
    ]);

    let (out, _) = render(&tree, &ExpressionContext::new());
    let ids: Vec<_> = out.children().iter().filter_map(|c| c.node_id()).collect();

    assert_eq!(ids, vec!["A", "B", "C"]);
    assert_eq!(out.text_content(), "ABC");
}

/// 记录求值顺序的求值器
struct RecordingEvaluator {
    seen: RefCell<Vec<String>>,
}

impl ExpressionEvaluator for RecordingEvaluator {
    fn evaluate(&self, expr: &str, ctx: &ExpressionContext) -> Result<Value, EvalError> {
        self.seen.borrow_mut().push(expr.to_string());
        PathEvaluator.evaluate(expr, ctx)
    }
}

/// 父节点属性先于子节点求值
#[test]
fn test_parent_props_evaluated_first() {
    let ctx = ExpressionContext::from_json(&json!({ "p": 1, "c1": 2, "c2": 3 }));
    let tree = ComponentNode::new("root", "View")
        .bind_prop("data-p", "p")
        .with_child(ComponentNode::new("x", "Text").bind_prop("content", "c1"))
        .with_child(ComponentNode::new("y", "Text").bind_prop("content", "c2"));

    let evaluator = RecordingEvaluator { seen: RefCell::new(Vec::new()) };
    let diagnostics = DiagnosticsCollector::new();
    let registry = ComponentRegistry::with_builtins();
    let out = TreeRenderer::new(&registry, &evaluator, &diagnostics).render(&tree, &ctx);

    assert_eq!(*evaluator.seen.borrow(), vec!["p", "c1", "c2"]);
    assert_eq!(out.text_content(), "23");
}

/// 不调用 render_children 的组件不会求值子树
#[test]
fn test_children_are_lazy() {
    let tree = text("t", "leaf").with_child(ComponentNode::new("ghost", "DoesNotExist"));
    let (out, diagnostics) = render(&tree, &ExpressionContext::new());

    assert_eq!(out.text_content(), "leaf");
    assert!(diagnostics.is_empty());
}

/// 表达式失败只影响该属性
#[test]
fn test_expression_failure_reported_per_prop() {
    let ctx = ExpressionContext::from_bindings(vec![
        ("ds1".to_string(), Binding::Value(json!({ "name": "Alice" }))),
        ("ds2".to_string(), Binding::Error("HTTP 500".into())),
    ]);
    let tree = ComponentNode::new("root", "View")
        .bind_style("color", "ds2.color")
        .with_child(ComponentNode::new("t1", "Text").bind_prop("content", "ds1.nmae.first"))
        .with_child(ComponentNode::new("t2", "Text").bind_prop("content", "missing.name"))
        .with_child(ComponentNode::new("t3", "Text").bind_prop("content", "ds1.name"));

    let (out, diagnostics) = render(&tree, &ctx);

    // 拼错的路径是 undefined，不算错误
    assert_eq!(out.text_content(), "Alice");
    assert_eq!(out.children().len(), 3);
    assert!(out.markers().is_empty());

    let root = diagnostics.for_node("root");
    assert_eq!(root.len(), 1);
    assert_eq!(root[0].prop.as_deref(), Some("style.color"));
    assert_eq!(root[0].kind, DiagnosticKind::Expression);

    let t2 = diagnostics.for_node("t2");
    assert_eq!(t2.len(), 1);
    assert_eq!(t2[0].prop.as_deref(), Some("content"));
    assert!(t2[0].message.contains("missing"));
    assert_eq!(diagnostics.len(), 2);
}

/// 恶意或残缺的树也能完整渲染
#[test]
fn test_malformed_tree_never_fails() {
    let tree = ComponentNode::from_value(json!({
        "id": "root",
        "type": "View",
        "children": [
            { "id": "a" },
            { "id": "b", "type": "Text", "props": { "content": { "$expr": "${" } } },
            { "id": "c", "type": "Text", "props": { "content": { "$expr": "a.b.c.d" } } },
            { "id": "d", "type": "Image", "style": { "width": { "$expr": "w ? " } } }
        ]
    }))
    .unwrap();

    let (out, diagnostics) = render(&tree, &ExpressionContext::new());

    assert_eq!(out.children().len(), 4);
    assert_eq!(out.markers().len(), 1);
    assert_eq!(diagnostics.len(), 4);
}

#[test]
fn test_builtin_components_html() {
    let ctx = ExpressionContext::from_json(&json!({ "user": { "avatar": "https://img/a.png" }, "busy": true }));
    let tree = ComponentNode::new("root", "View")
        .with_style("backgroundColor", "#fff")
        .with_child(
            ComponentNode::new("img", "Image")
                .bind_prop("src", "user.avatar")
                .with_prop("mode", "aspectFit"),
        )
        .with_child(
            ComponentNode::new("btn", "Button")
                .with_prop("type", "primary")
                .with_prop("content", "Save & <go>")
                .bind_prop("disabled", "busy"),
        );

    let (out, diagnostics) = render(&tree, &ctx);
    let html = out.to_html();

    assert!(diagnostics.is_empty());
    assert!(html.starts_with("<div data-node-id=\"root\" style=\"background-color: #fff\">"));
    assert!(html.contains("<img data-node-id=\"img\" src=\"https://img/a.png\" style=\"object-fit: contain\" />"));
    assert!(html.contains("class=\"btn-primary\""));
    assert!(html.contains(" disabled"));
    assert!(html.contains("Save &amp; &lt;go&gt;</button>"));
    assert!(html.ends_with("</div>"));
}

#[test]
fn test_marker_html() {
    let (out, _) = render(&ComponentNode::new("x", "Carousel"), &ExpressionContext::new());
    assert_eq!(
        out.to_html(),
        "<div class=\"render-marker render-marker--unknown\" data-node-id=\"x\">unknown component: Carousel</div>"
    );
}

#[test]
fn test_output_serialization() {
    let (out, _) = render(&text("t", "hi"), &ExpressionContext::new());
    let value = serde_json::to_value(&out).unwrap();
    assert_eq!(value["kind"], "element");
    assert_eq!(value["nodeId"], "t");
    assert_eq!(value["children"][0], json!({ "kind": "text", "text": "hi" }));
}

/// 只写日志的接收方同样得到完整输出
#[test]
fn test_log_sink_render() {
    let registry = ComponentRegistry::with_builtins();
    let tree = ComponentNode::new("root", "View")
        .with_child(ComponentNode::new("x", "Carousel"))
        .with_child(ComponentNode::new("t", "Text").bind_prop("content", "nope"));

    let out = TreeRenderer::new(&registry, &PathEvaluator, &LogSink).render(&tree, &ExpressionContext::new());

    assert_eq!(out.children().len(), 2);
    assert_eq!(out.markers().len(), 1);
    assert_eq!(out.children()[1].text_content(), "");
}

/// 非法属性名与事件属性不会进入 HTML
#[test]
fn test_unsafe_attribute_names_dropped() {
    let tree = ComponentNode::new("v", "View")
        .with_prop("x\"><script>alert(1)</script><i a=\"", "1")
        .with_prop("onclick", "alert(1)")
        .with_prop("ONLOAD", "alert(1)")
        .with_prop("data-title", "ok")
        .with_style("color: red; background", "x");

    let (out, diagnostics) = render(&tree, &ExpressionContext::new());
    let html = out.to_html();

    assert!(diagnostics.is_empty());
    assert_eq!(html, "<div data-node-id=\"v\" data-title=\"ok\"></div>");
    match &out {
        RenderOutput::Element { attrs, .. } => assert_eq!(attrs.len(), 1),
        other => panic!("expected element, got {:?}", other),
    }
}

/// 自定义渲染器直接构造的非法标签和属性在序列化时被过滤
#[test]
fn test_custom_renderer_output_sanitized() {
    let mut registry = ComponentRegistry::with_builtins();
    registry.register_fn("Raw", |input| {
        Ok(RenderOutput::element("img src=x onerror=alert(1)", &input.node.id)
            .with_attr("onmouseover", "alert(1)")
            .with_attr("title", "a\"b"))
    });

    let (out, _) = render_with(&registry, &ComponentNode::new("r", "Raw"), &ExpressionContext::new());
    assert_eq!(out.to_html(), "<div data-node-id=\"r\" title=\"a&quot;b\"></div>");
}

/// 关闭 panic 捕获后 panic 向上传播
#[test]
fn test_catch_panics_disabled_propagates() {
    let mut registry = ComponentRegistry::with_builtins();
    registry.register_fn("Panics", |_input| panic!("renderer exploded"));
    let tree = ComponentNode::new("root", "View").with_child(ComponentNode::new("p", "Panics"));

    let diagnostics = DiagnosticsCollector::new();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        TreeRenderer::new(&registry, &PathEvaluator, &diagnostics)
            .catch_panics(false)
            .render(&tree, &ExpressionContext::new())
    }));

    assert!(result.is_err());
    assert!(diagnostics.is_empty());
}
