//! Scene export tool
//!
//! Converts scene files to the text scene format without opening the
//! editor:
//!
//! ```text
//! scene_export [--schema <schema.toml>] <file.source_scene>...
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use scene_editor::{DocumentRegistry, EditorConfig, OpenDocument, SceneDocument};

const USAGE: &str = "usage: scene_export [--schema <schema.toml>] <file.source_scene>...";

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = EditorConfig::load()?;
    let mut files = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--schema" => match args.next() {
                Some(path) => config.schema_path = Some(PathBuf::from(path)),
                None => return Err(format!("--schema needs a path\n{}", USAGE).into()),
            },
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => files.push(PathBuf::from(arg)),
        }
    }
    if files.is_empty() {
        return Err(format!("no input files\n{}", USAGE).into());
    }

    let schema = config.schema()?;
    let mut registry = DocumentRegistry::from_config(&config);
    let mut failures = 0;
    for file in &files {
        match SceneDocument::open(schema.clone(), file) {
            Ok(doc) => {
                registry.add(OpenDocument::Scene(doc.configured(&config)));
            }
            Err(e) => {
                log::error!("{:?}: {}", file, e);
                failures += 1;
            }
        }
    }

    for doc in registry.scene_documents() {
        match doc.export() {
            Ok(path) => log::info!("{:?} -> {:?}", doc.uri(), path),
            Err(e) => {
                log::error!("{:?}: {}", doc.uri(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} of {} files failed to export", failures, files.len()).into());
    }
    Ok(())
}
