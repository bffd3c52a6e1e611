use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no files, no columns, bad ratio, etc.).
    ConfigValidation(String),
    /// A mapping references a column the file did not select.
    UnknownColumn { file: String, column: String },
    /// A mapping targets a file index that does not exist.
    MappingTarget { target: usize, files: usize },
    /// Workbook could not be opened or decoded.
    Workbook { path: String, message: String },
    /// Workbook opened but contains no usable sheet.
    SheetNotFound { path: String, sheet: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::UnknownColumn { file, column } => {
                write!(f, "file '{file}': column '{column}' is not among its selected columns")
            }
            Self::MappingTarget { target, files } => {
                write!(f, "mapping target #{target} out of range (valid: 1..{})", files.saturating_sub(1))
            }
            Self::Workbook { path, message } => write!(f, "cannot read workbook '{path}': {message}"),
            Self::SheetNotFound { path, sheet } => {
                write!(f, "workbook '{path}': sheet '{sheet}' not found")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_target_message_names_valid_range() {
        let err = ReconError::MappingTarget { target: 5, files: 3 };
        assert_eq!(err.to_string(), "mapping target #5 out of range (valid: 1..2)");
    }

    #[test]
    fn unknown_column_message() {
        let err = ReconError::UnknownColumn { file: "b.xlsx".into(), column: "Code".into() };
        assert!(err.to_string().contains("'Code'"));
        assert!(err.to_string().contains("b.xlsx"));
    }
}
