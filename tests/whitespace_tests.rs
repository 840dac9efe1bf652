mod common;

use common::{TestResult, render, render_with_partials};
use serde_json::json;

#[test]
fn test_comment_leaves_no_trace() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = render("a\n{{- comment -}}\nb", json!({}))?;
    assert_eq!(output.text, "a\nb");

    let output = render("a\n{{- spans\nlines -}}\nb", json!({}))?;
    assert_eq!(output.text, "a\nb");
    Ok(())
}

#[test]
fn test_standalone_section_tags_disappear() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let source = "<ul>\n  {{#items}}\n  <li>{{name}}</li>\n  {{/items}}\n</ul>\n";
    let output = render(source, json!({ "items": [{ "name": "a" }, { "name": "b" }] }))?;
    assert_eq!(output.text, "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n");

    let output = render(source, json!({ "items": [] }))?;
    assert_eq!(output.text, "<ul>\n</ul>\n");
    Ok(())
}

#[test]
fn test_verted_block() -> TestResult {
    let source = "a\n{{?show}}\nyes\n{{/show}}\nb";
    assert_eq!(render(source, json!({ "show": true }))?.text, "a\nyes\nb");
    assert_eq!(render(source, json!({ "show": false }))?.text, "a\nb");
    Ok(())
}

#[test]
fn test_block_else_clause() -> TestResult {
    let source = "{{?x}}\nA\n{{:x}}\nB\n{{/x}}";
    assert_eq!(render(source, json!({ "x": true }))?.text, "A\n");
    assert_eq!(render(source, json!({ "x": false }))?.text, "B\n");
    Ok(())
}

#[test]
fn test_variable_on_its_own_line() -> TestResult {
    let output = render("a\n{{x}}\nb", json!({ "x": "1" }))?;
    assert_eq!(output.text, "a\n1\nb");
    Ok(())
}

#[test]
fn test_inline_variable_keeps_surrounding_text() -> TestResult {
    let output = render("Name: {{name}}\nNext", json!({ "name": "x\ny" }))?;
    assert_eq!(output.text, "Name: xy\nNext");
    Ok(())
}

#[test]
fn test_indented_partial() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = render_with_partials(
        "<table>\n  {{+row(v:x) /}}\n</table>",
        json!({ "x": 1 }),
        &[("row", "<tr>\n  <td>{{v}}</td>\n</tr>\n")],
    )?;
    assert_eq!(output.text, "<table>\n  <tr>\n    <td>1</td>\n  </tr>\n</table>");
    Ok(())
}

#[test]
fn test_indented_multi_line_value_keeps_blank_lines_blank() -> TestResult {
    let output = render("list:\n    {{{body}}}\nend", json!({ "body": "one\n\ntwo" }))?;
    assert_eq!(output.text, "list:\n    one\n\n    two\nend");
    Ok(())
}
