mod common;

use common::TestResult;
use motemplate::{ExecutionConfig, LoaderError, TemplateError, TemplateLoader};
use std::fs;

#[test]
fn test_load_with_partials_directory() -> TestResult {
    let _ = env_logger::builder().is_test(true).try_init();

    let dir = tempfile::tempdir()?;
    let partials = dir.path().join("partials");
    fs::create_dir(&partials)?;
    fs::write(partials.join("header.mt"), "== {{title}} ==")?;
    fs::write(partials.join("footer.mt"), "-- end --")?;
    let page = dir.path().join("page.mt");
    fs::write(&page, "{{+header /}}\nbody\n{{+footer /}}\n")?;

    let loader = TemplateLoader::new(&partials)?;
    assert_eq!(loader.partial_names().collect::<Vec<_>>(), vec!["footer", "header"]);

    let template = loader.load(&page)?;
    assert_eq!(template.name(), Some("page"));
    assert!(template.features().includes_partials);

    let output = template.execute(r#"{"title": "T"}"#, ExecutionConfig::default())?;
    assert_eq!(output.text, "== T ==\nbody\n-- end --\n");
    assert!(output.is_clean());
    Ok(())
}

#[test]
fn test_errors_name_the_loaded_template() -> TestResult {
    let dir = tempfile::tempdir()?;
    let page = dir.path().join("report.mt");
    fs::write(&page, "{{missing}}")?;

    let template = TemplateLoader::default().load(&page)?;
    let output = template.execute("{}", ExecutionConfig::default())?;
    assert_eq!(output.errors, vec!["Failed to resolve 'missing' at line 1 column 3 in report"]);

    let strict = template.execute("{}", ExecutionConfig { strict: true });
    assert!(matches!(strict, Err(TemplateError::ExecutionError(_))));
    Ok(())
}

#[test]
fn test_invalid_partial_file_name() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("bad name.mt"), "x")?;
    assert!(matches!(
        TemplateLoader::new(dir.path()),
        Err(LoaderError::InvalidPartialName { .. })
    ));
    Ok(())
}

#[test]
fn test_parse_failure_reports_the_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let page = dir.path().join("broken.mt");
    fs::write(&page, "{{#open}}never closed")?;

    let err = match TemplateLoader::default().load(&page) {
        Err(err) => err,
        Ok(_) => panic!("expected a parse failure"),
    };
    assert!(matches!(err, LoaderError::Template { .. }));
    let message = err.to_string();
    assert!(message.contains("broken.mt"));
    assert!(message.contains("Reached EOF but expected {{/"));
    Ok(())
}

#[test]
fn test_missing_files() -> TestResult {
    let dir = tempfile::tempdir()?;
    assert!(matches!(
        TemplateLoader::new(dir.path().join("nope")),
        Err(LoaderError::Io { .. })
    ));
    assert!(matches!(
        TemplateLoader::default().load(dir.path().join("nope.mt")),
        Err(LoaderError::Io { .. })
    ));
    Ok(())
}
