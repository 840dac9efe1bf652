use motemplate::{ExecutionConfig, LoaderError, TemplateLoader};
use std::env;
use std::fs;
use std::path::PathBuf;

/// A simple CLI to render a template against a JSON data file.
fn main() -> Result<(), LoaderError> {
    env_logger::init();

    let mut args: Vec<String> = env::args().collect();
    let strict = match args.iter().position(|arg| arg == "--strict") {
        Some(index) => {
            args.remove(index);
            true
        }
        None => false,
    };
    if args.len() < 3 || args.len() > 4 {
        eprintln!("Renders a Motemplate template against JSON data.");
        eprintln!();
        eprintln!(
            "Usage: {} [--strict] <path/to/template> <path/to/data.json> [path/to/partials]",
            args.first().map_or("motemplate", String::as_str)
        );
        eprintln!();
        eprintln!("Every file in the partials directory can be included by its file stem.");
        eprintln!("With --strict, unresolved identifiers fail the render.");
        std::process::exit(1);
    }

    let loader = match args.get(3) {
        Some(partials_dir) => TemplateLoader::new(partials_dir)?,
        None => TemplateLoader::default(),
    };
    let template = loader.load(&args[1])?;

    let data_path = PathBuf::from(&args[2]);
    let data = fs::read_to_string(&data_path)
        .map_err(|source| LoaderError::Io { path: data_path.clone(), source })?;

    let output = template.execute(&data, ExecutionConfig { strict })?;
    print!("{}", output.text);
    for error in &output.errors {
        eprintln!("{}", error);
    }
    Ok(())
}
