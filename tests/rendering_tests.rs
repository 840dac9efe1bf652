mod common;

use common::{TestResult, render};
use motemplate::{FnContext, Motemplate, Value};
use serde::Serialize;
use serde_json::json;

// ============================================================================
// Interpolation
// ============================================================================

#[test]
fn test_literal_text_is_unchanged() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = render("hello world", json!({}))?;
    assert_eq!(output.text, "hello world");
    assert!(output.errors.is_empty());
    Ok(())
}

#[test]
fn test_escaped_and_unescaped_variables() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    assert_eq!(render("{{x}}", json!({ "x": "<a>&b" }))?.text, "&lt;a&gt;&amp;b");
    assert_eq!(render("{{{x}}}", json!({ "x": "<a>&b" }))?.text, "<a>&b");
    Ok(())
}

#[test]
fn test_scalar_text_forms() -> TestResult {
    let output = render(
        "{{n}} {{f}} {{b}} {{list}}",
        json!({ "n": 42, "f": 1.5, "b": false, "list": [1, 2] }),
    )?;
    assert_eq!(output.text, "42 1.5 false [1,2]");
    Ok(())
}

#[test]
fn test_missing_variable_is_not_fatal() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = render("before {{missing}} after", json!({}))?;
    assert_eq!(output.text, "before  after");
    assert_eq!(output.errors.len(), 1);
    assert!(output.errors[0].contains("'missing'"));
    assert!(output.errors[0].contains("line 1"));
    Ok(())
}

#[test]
fn test_null_counts_as_missing() -> TestResult {
    let output = render("{{x}}", json!({ "x": null }))?;
    assert_eq!(output.text, "");
    assert_eq!(output.errors.len(), 1);
    Ok(())
}

#[test]
fn test_dotted_paths() -> TestResult {
    let output = render(
        "{{user.address.city}}",
        json!({ "user": { "address": { "city": "Wonderland" } } }),
    )?;
    assert_eq!(output.text, "Wonderland");
    Ok(())
}

#[test]
fn test_json_dump() -> TestResult {
    let output = render("{{*data}}", json!({ "data": { "a": [1, "<x>"] } }))?;
    assert_eq!(output.text, r#"{"a":[1,"<x>"]}"#);
    Ok(())
}

// ============================================================================
// Sections
// ============================================================================

#[test]
fn test_section_iterates_in_order() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = render("{{#items}}{{.}}{{/items}}", json!({ "items": [3, 1, 2] }))?;
    assert_eq!(output.text, "312");

    let output = render(
        "{{#items}}{{v}}{{/items}}",
        json!({ "items": [{ "v": "a" }, { "v": "b" }, { "v": "c" }] }),
    )?;
    assert_eq!(output.text, "abc");
    assert!(output.errors.is_empty());

    let output = render("{{#items}}x{{/items}}", json!({ "items": [] }))?;
    assert_eq!(output.text, "");
    assert!(output.errors.is_empty());
    Ok(())
}

#[test]
fn test_section_over_map_pushes_scope() -> TestResult {
    let output = render(
        "{{#user}}{{name}} from {{city}}{{/user}}",
        json!({ "user": { "name": "Ann" }, "city": "Oslo" }),
    )?;
    assert_eq!(output.text, "Ann from Oslo");
    Ok(())
}

#[test]
fn test_inner_scope_shadows_outer() -> TestResult {
    let output = render(
        "{{name}}/{{#child}}{{name}}{{/child}}/{{name}}",
        json!({ "name": "outer", "child": { "name": "inner" } }),
    )?;
    assert_eq!(output.text, "outer/inner/outer");
    Ok(())
}

#[test]
fn test_verted_and_inverted_are_complementary() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let values = [
        json!(true),
        json!(false),
        json!([]),
        json!([0]),
        json!(""),
        json!(0),
        json!({}),
        json!(null),
    ];
    for value in values {
        let output = render("{{?x}}A{{/x}}{{^x}}B{{/x}}", json!({ "x": value.clone() }))?;
        assert!(
            output.text == "A" || output.text == "B",
            "{} rendered {:?}",
            value,
            output.text
        );
    }
    assert_eq!(render("{{?x}}A{{/x}}", json!({ "x": [] }))?.text, "");
    assert_eq!(render("{{^x}}B{{/x}}", json!({}))?.text, "B");
    Ok(())
}

#[test]
fn test_else_clause() -> TestResult {
    let template = Motemplate::new("{{?admin}}Admin{{:admin}}Guest{{/admin}}", None)?;
    assert_eq!(template.render([Value::from(json!({ "admin": true }))]).text, "Admin");
    assert_eq!(template.render([Value::from(json!({ "admin": false }))]).text, "Guest");

    let template = Motemplate::new("{{#items}}{{.}}{{:}}none{{/}}", None)?;
    assert_eq!(template.render([Value::from(json!({ "items": [1, 2] }))]).text, "12");
    assert_eq!(template.render([Value::from(json!({ "items": [] }))]).text, "none");

    let template = Motemplate::new("{{^x}}A{{:x}}B{{/x}}", None)?;
    let output = template.render([Value::from(json!({ "x": true }))]);
    assert_eq!(output.text, "B");
    assert!(output.errors.is_empty());
    assert_eq!(template.render([Value::from(json!({ "x": false }))]).text, "A");
    let output = template.render([Value::from(json!({}))]);
    assert_eq!(output.text, "A");
    assert!(output.errors.is_empty());
    Ok(())
}

#[test]
fn test_bound_names() -> TestResult {
    let output = render(
        "{{#row:rows}}{{#cell:row}}{{cell}};{{/row}}|{{/rows}}",
        json!({ "rows": [["a", "b"], ["c"]] }),
    )?;
    assert_eq!(output.text, "a;b;|c;|");
    assert!(output.errors.is_empty());

    let output = render("{{?f:flag}}{{f}}{{/flag}}", json!({ "flag": "on" }))?;
    assert_eq!(output.text, "on");
    Ok(())
}

#[test]
fn test_section_over_scalar_is_an_error() -> TestResult {
    let output = render("{{#n}}x{{/n}}", json!({ "n": "text" }))?;
    assert_eq!(output.text, "");
    assert!(output.errors[0].ends_with("(not a list or a context)"));
    Ok(())
}

#[test]
fn test_self_closing_section_renders_nothing() -> TestResult {
    let output = render("a{{?flag /}}b", json!({ "flag": true }))?;
    assert_eq!(output.text, "ab");
    Ok(())
}

// ============================================================================
// Comments, assertions, built-ins
// ============================================================================

#[test]
fn test_comments_render_nothing() -> TestResult {
    let output = render("a{{- one {{- nested -}} -}}b", json!({}))?;
    assert_eq!(output.text, "ab");
    Ok(())
}

#[test]
fn test_assertions() -> TestResult {
    let output = render("{{!user a user is required}}ok", json!({ "user": "x" }))?;
    assert_eq!(output.text, "ok");
    assert!(output.errors.is_empty());

    let output = render("{{!user a user is required}}ok", json!({}))?;
    assert_eq!(output.text, "ok");
    assert_eq!(
        output.errors,
        vec!["Failed to resolve 'user' at line 1 column 4 in <root> (a user is required)"]
    );
    Ok(())
}

#[test]
fn test_template_sees_its_own_errors() -> TestResult {
    let output = render("{{a}}{{b}}[{{{_.errors}}}]", json!({}))?;
    assert_eq!(output.errors.len(), 2);
    assert_eq!(
        output.text,
        "[Failed to resolve 'a' at line 1 column 3 in <root>Failed to resolve 'b' at line 1 column 8 in <root>]"
    );
    Ok(())
}

// ============================================================================
// Contexts
// ============================================================================

#[test]
fn test_first_context_takes_precedence() -> TestResult {
    let template = Motemplate::new("{{x}} {{y}}", None)?;
    let output = template.render([
        Value::from(json!({ "x": "first" })),
        Value::from(json!({ "x": "second", "y": "fallback" })),
    ]);
    assert_eq!(output.text, "first fallback");
    Ok(())
}

#[test]
fn test_struct_and_function_contexts() -> TestResult {
    #[derive(Serialize)]
    struct Invoice {
        number: u32,
        customer: String,
    }

    let template = Motemplate::new("#{{number}} for {{customer}}, due {{due}}", None)?;
    let invoice = Value::from_serialize(&Invoice { number: 7, customer: "Acme".into() })?;
    let lazy = Value::object(FnContext(|key: &str| {
        (key == "due").then(|| Value::from("tomorrow"))
    }));
    let output = template.render([invoice, lazy]);
    assert_eq!(output.text, "#7 for Acme, due tomorrow");
    assert!(output.errors.is_empty());
    Ok(())
}

#[test]
fn test_repeated_parses_and_renders_agree() -> TestResult {
    let source = "{{#items}}<{{.}}>{{/items}}{{missing}}";
    let data = json!({ "items": ["a", "b"] });
    let first = Motemplate::new(source, None)?;
    let second = Motemplate::new(source, None)?;
    let expected = first.render([Value::from(data.clone())]);
    for _ in 0..3 {
        assert_eq!(first.render([Value::from(data.clone())]), expected);
        assert_eq!(second.render([Value::from(data.clone())]), expected);
    }
    assert_eq!(expected.text, "<a><b>");
    assert_eq!(expected.errors.len(), 1);
    Ok(())
}

#[test]
fn test_concurrent_renders_share_one_template() -> TestResult {
    let template = std::sync::Arc::new(Motemplate::new("{{n}}", None)?);
    let handles: Vec<_> = (0..4i64)
        .map(|n| {
            let template = std::sync::Arc::clone(&template);
            std::thread::spawn(move || template.render([Value::from(json!({ "n": n }))]).text)
        })
        .collect();
    for (n, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().map_err(|_| "render thread panicked")?, n.to_string());
    }
    Ok(())
}
