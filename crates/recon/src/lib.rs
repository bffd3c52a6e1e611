//! `colcmp-recon` — Column-value reconciliation engine for spreadsheets.
//!
//! Pure engine crate: reads sheets through a `WorkbookSource`, returns which
//! normalized values each file shares and which rows hold the differences.
//! No CLI or file-format dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;
pub mod source;
pub mod template;

pub use config::{CompareConfig, Session};
pub use engine::{compare_pair, reconcile, run};
pub use error::ReconError;
pub use matcher::matches;
pub use model::{CellValue, ColumnData, FileConfig, ReconciliationResult, Sheet};
pub use normalize::normalize;
pub use report::{CompareReport, ResultTable};
pub use source::WorkbookSource;
