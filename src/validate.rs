use crate::config::Config;
use ansi_term::Colour::{Green, Red};
use anyhow::{anyhow, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Validate the target file or every config file in the target directory
pub fn validate_target(target: &Path) -> Result<()> {
    if !target.exists() {
        return Err(anyhow!(
            "{:?} ... {} - file/directory does not exist",
            target,
            Red.paint("Failed")
        ));
    }

    // Scan all files recursive from the target directory
    // that match *.yaml or *.yml and validate them
    if target.is_dir() {
        let mut files = vec![];
        for entry in WalkDir::new(target) {
            let entry = entry?;
            if entry.path().is_file() && is_yaml(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }

        let mut failed = 0;
        for file in &files {
            if let Err(e) = validate_file(file) {
                eprintln!("{}", e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(anyhow!("{} of {} file(s) are invalid", failed, files.len()));
        }

        return Ok(());
    }

    // Validate single file
    validate_file(target)
}

/// Validate target yaml file
pub fn validate_file(file: &Path) -> Result<()> {
    Config::new(file).map_err(|e| anyhow!("{:?} ... {} - {}", file, Red.paint("invalid"), e))?;

    // "OK" in green color
    println!("{:?} ... {}", file, Green.paint("ok"));

    Ok(())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}
