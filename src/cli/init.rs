//! habitviz init command implementation
//!
//! Writes a default `.habitviz.toml` and creates the archive directory.

use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE_NAME};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Options for the init command
pub struct InitOptions {
    pub path: Option<PathBuf>,
    pub force: bool,
    pub output: OutputOptions,
}

#[derive(serde::Serialize)]
struct InitReport {
    config: PathBuf,
    overwritten: bool,
    created_archive_dir: bool,
}

pub fn run(options: InitOptions) -> Result<()> {
    let path = match options.path {
        Some(path) => path,
        None => std::env::current_dir()?.join(CONFIG_FILE_NAME),
    };

    let existed = path.exists();
    if existed && !options.force {
        return Err(Error::ConfigExists(path));
    }

    let config = Config::default();
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    config.save(&path)?;

    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let archive_dir = config
        .sources
        .archive
        .parent()
        .map(|dir| base.join(dir))
        .unwrap_or_else(|| base.to_path_buf());
    let created_archive_dir = ensure_dir(&archive_dir)?;

    let report = InitReport {
        config: path.clone(),
        overwritten: existed,
        created_archive_dir,
    };

    let header = if existed {
        "habitviz init: config overwritten"
    } else {
        "habitviz init: config written"
    };
    let mut human = HumanOutput::new(header);
    human.push_summary("config", path.display().to_string());
    human.push_summary("archive", base.join(&config.sources.archive).display().to_string());
    human.push_next_step("set [credentials] or HABITVIZ_API_USER / HABITVIZ_API_KEY");
    human.push_next_step("habitviz show");

    emit_success(options.output, "init", &report, Some(&human))
}

fn ensure_dir(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::create_dir_all(path)?;
    Ok(true)
}
