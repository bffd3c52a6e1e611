//! `colcmp compare` / `colcmp validate` — config-driven column comparison.

use std::path::{Path, PathBuf};

use colcmp_io::FileSource;
use colcmp_recon::report::CompareReport;
use colcmp_recon::CompareConfig;

use crate::exit_codes::{EXIT_DIFFERENCES, EXIT_ERROR, EXIT_IO, EXIT_TEMPLATE_MISMATCH};
use crate::{render, CliError};

fn load_config(path: &Path) -> Result<CompareConfig, CliError> {
    CompareConfig::from_path(path).map_err(|e| {
        let err = CliError::recon(&e);
        match e {
            colcmp_recon::ReconError::MappingTarget { .. } => {
                err.with_hint("mapping targets count [[files]] from 0; the reference is #0")
            }
            colcmp_recon::ReconError::UnknownColumn { .. } => {
                err.with_hint("add the column to that file's `columns` list")
            }
            _ => err,
        }
    })
}

pub fn cmd_compare(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    search: Option<String>,
    strict: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    log::info!("{}: {} file(s)", config.name, config.files.len());

    let report = colcmp_recon::run(&config, &FileSource).map_err(|e| CliError::recon(&e))?;

    if output_file.is_some() || json_output {
        let json_str = serde_json::to_string_pretty(&report).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str).map_err(|e| CliError {
                code: EXIT_IO,
                message: format!("cannot write output: {e}"),
                hint: None,
            })?;
            eprintln!("wrote {}", path.display());
        }
        if json_output {
            println!("{json_str}");
        }
    }

    if !json_output {
        print!("{}", render::report(&report, search.as_deref().unwrap_or("")));
    }

    // Human summary to stderr
    for line in render::summary_lines(&report) {
        eprintln!("{line}");
    }

    if strict {
        strict_outcome(&report)
    } else {
        Ok(())
    }
}

/// Differences outrank template drift.
fn strict_outcome(report: &CompareReport) -> Result<(), CliError> {
    if report.has_differences() {
        return Err(CliError {
            code: EXIT_DIFFERENCES,
            message: "differences found".into(),
            hint: None,
        });
    }
    let drifted: Vec<String> = report.template_issues().map(|(c, _)| c.target.name.clone()).collect();
    if !drifted.is_empty() {
        return Err(CliError {
            code: EXIT_TEMPLATE_MISMATCH,
            message: format!("template mismatch in {}", drifted.join(", ")),
            hint: Some("run `colcmp preview` on the target to find its header row".into()),
        });
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let session = config.session().map_err(|e| CliError::recon(&e))?;

    let pairs: usize = session.mappings.iter().map(|m| m.pairs.len()).sum();
    let mode = if session.template.is_some() { ", template mode" } else { "" };
    eprintln!(
        "{}: OK ({} files, {} comparisons, {} column pairs{})",
        config.name,
        session.files.len(),
        session.mappings.len(),
        pairs,
        mode
    );
    Ok(())
}
