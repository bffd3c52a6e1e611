// colcmp CLI - compare selected spreadsheet columns across files

mod compare;
mod exit_codes;
mod inspect;
mod logging;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use colcmp_recon::ReconError;

use exit_codes::{recon_exit_code, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "colcmp")]
#[command(about = "Compare spreadsheet columns across files: shared values, unique values, and the rows that hold them")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the reference file against every mapped target
    #[command(after_help = "\
Examples:
  colcmp compare vendors.toml
  colcmp compare vendors.toml --search 'A11*'
  colcmp compare vendors.toml --json > result.json
  colcmp compare monthly.toml --output result.json --strict")]
    Compare {
        /// Path to the comparison config (TOML)
        config: PathBuf,

        /// Output JSON to stdout instead of the text report
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only show result rows matching PATTERN (*text*, *text, text*, text)
        #[arg(long, value_name = "PATTERN")]
        search: Option<String>,

        /// Exit 4 on differences, 5 on template mismatches
        #[arg(long)]
        strict: bool,
    },

    /// Check a config without reading any workbook
    #[command(after_help = "\
Examples:
  colcmp validate vendors.toml")]
    Validate {
        /// Path to the comparison config (TOML)
        config: PathBuf,
    },

    /// List sheets, hidden flags and table/filter header rows
    #[command(after_help = "\
Examples:
  colcmp sheets vendors.xlsx
  colcmp sheets vendors.xlsx --json")]
    Sheets {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },

    /// List the column names found on a header row
    #[command(after_help = "\
Examples:
  colcmp columns vendors.xlsx --header-row 0
  colcmp columns vendors.xlsx --sheet Data --header-row 2")]
    Columns {
        file: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// 0-based header row, as written in the config
        #[arg(long)]
        header_row: usize,

        #[arg(long)]
        json: bool,
    },

    /// Show the top-left corner of a sheet to pick the header row
    #[command(after_help = "\
Examples:
  colcmp preview vendors.xlsx
  colcmp preview vendors.xlsx --sheet Data --rows 20 --cols 8")]
    Preview {
        file: PathBuf,

        /// Sheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Rows to show [default: 200]
        #[arg(long)]
        rows: Option<usize>,

        /// Columns to show [default: 40]
        #[arg(long)]
        cols: Option<usize>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  colcmp-recon ", env!("CARGO_PKG_VERSION"),
        "\nbuild:   ", env!("BUILD_PROFILE"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Compare { config, json, output, search, strict } => {
            compare::cmd_compare(config, json, output, search, strict)
        }
        Commands::Validate { config } => compare::cmd_validate(config),
        Commands::Sheets { file, json } => inspect::cmd_sheets(file, json),
        Commands::Columns { file, sheet, header_row, json } => {
            inspect::cmd_columns(file, sheet, header_row, json)
        }
        Commands::Preview { file, sheet, rows, cols } => inspect::cmd_preview(file, sheet, rows, cols),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = e.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(e.code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    /// Engine error with its registry exit code.
    pub fn recon(err: &ReconError) -> Self {
        let hint = match err {
            ReconError::SheetNotFound { .. } => Some("run `colcmp sheets <file>` to list sheets".to_string()),
            _ => None,
        };
        Self { code: recon_exit_code(err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbose_is_counted_and_global() {
        let cli = Cli::try_parse_from(["colcmp", "validate", "x.toml", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn columns_requires_header_row() {
        assert!(Cli::try_parse_from(["colcmp", "columns", "a.xlsx"]).is_err());
    }

    #[test]
    fn recon_errors_carry_codes_and_hints() {
        let err = CliError::recon(&ReconError::SheetNotFound { path: "a.xlsx".into(), sheet: "Data".into() });
        assert_eq!(err.code, exit_codes::EXIT_IO);
        assert!(err.hint.is_some());

        let err = CliError::args("bad").with_hint("try --help");
        assert_eq!(err.code, EXIT_USAGE);
        assert_eq!(err.hint.as_deref(), Some("try --help"));
    }
}
