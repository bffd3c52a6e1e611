//! CLI Exit Code Registry
//!
//! Single source of truth for `colcmp` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error (unspecified)                               |
//! | 2    | Usage or config error (bad args, invalid TOML, bad mapping) |
//! | 3    | I/O error (missing file, unreadable workbook or sheet)    |
//! | 4    | Differences found (`compare --strict`)                    |
//! | 5    | Template mismatch in a target (`compare --strict`)        |
//!
//! Differences take precedence over template mismatches.

use colcmp_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid or inconsistent config.
pub const EXIT_USAGE: u8 = 2;

/// A file, workbook or sheet could not be read, or output could not be written.
pub const EXIT_IO: u8 = 3;

/// `--strict`: at least one pair has values unique to one side.
pub const EXIT_DIFFERENCES: u8 = 4;

/// `--strict`, template mode: a target's sheet or header drifted.
pub const EXIT_TEMPLATE_MISMATCH: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_)
        | ReconError::ConfigValidation(_)
        | ReconError::UnknownColumn { .. }
        | ReconError::MappingTarget { .. } => EXIT_USAGE,
        ReconError::Workbook { .. } | ReconError::SheetNotFound { .. } | ReconError::Io(_) => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_usage() {
        assert_eq!(recon_exit_code(&ReconError::ConfigParse("x".into())), EXIT_USAGE);
        assert_eq!(
            recon_exit_code(&ReconError::MappingTarget { target: 3, files: 2 }),
            EXIT_USAGE
        );
    }

    #[test]
    fn read_errors_are_io() {
        let err = ReconError::Workbook { path: "a.xlsx".into(), message: "bad zip".into() };
        assert_eq!(recon_exit_code(&err), EXIT_IO);
        assert_eq!(recon_exit_code(&ReconError::Io("gone".into())), EXIT_IO);
    }

    #[test]
    fn codes_are_distinct() {
        let codes = [EXIT_SUCCESS, EXIT_ERROR, EXIT_USAGE, EXIT_IO, EXIT_DIFFERENCES, EXIT_TEMPLATE_MISMATCH];
        for (i, a) in codes.iter().enumerate() {
            for b in &codes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
