//! Impact-test table I/O for dynstiff.
//!
//! This crate provides:
//!
//! - **Table reading**: [`read_table`] loads delimited text exports from
//!   acquisition software into an [`ImpactRecord`](dynstiff_analysis::ImpactRecord)
//! - **Table writing**: [`write_table`] stores a record as plain CSV
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynstiff_analysis::{Axis, StiffnessAnalyzer};
//! use dynstiff_io::read_table;
//!
//! let record = read_table("impact.csv")?;
//! let report = StiffnessAnalyzer::default().analyze(&record, Axis::X, Some(1.0), &[]);
//! println!("{} diagnostics", report.diagnostics.len());
//! # Ok::<(), dynstiff_io::Error>(())
//! ```

mod table;

pub use table::{Separator, parse_table, read_table, write_table};

/// Error types for table I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line could not be interpreted.
    #[error("line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },

    /// A required column was not found in the header.
    #[error("missing required column '{0}'")]
    MissingColumn(String),

    /// The table contained no usable data rows.
    #[error("no valid data rows")]
    NoData,

    /// The parsed columns could not form a record.
    #[error("invalid record: {0}")]
    Analysis(#[from] dynstiff_analysis::AnalysisError),
}

/// Convenience result type for table I/O.
pub type Result<T> = std::result::Result<T, Error>;
