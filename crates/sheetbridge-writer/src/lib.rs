//! Instruction builder for a remotely hosted spreadsheet.
//!
//! The remote document cannot be mutated by passing data structures. It only
//! accepts textual instructions executed inside its scripting engine. This
//! crate turns a fluent cell/row/sheet API into an ordered instruction list
//! per sheet, and compiles a [`Document`] into a [`Plan`] of tasks that must
//! run one after another.
//!
//! # Architecture
//!
//! - **Codec** (`codec.rs`): column labels, colors, widths, day counts
//! - **Style** (`style.rs`): cell options, border line styles, sheet defaults
//! - **Border** (`border.rs`): the shared `fillBorder` routine and its edge model
//! - **Sheet** (`sheet.rs`): cursor and instruction accumulator
//! - **Document** (`document.rs`): sheet registry, renames, plan compilation
//! - **Plan** (`plan.rs`): tasks threading the sheet-name accumulator
//!
//! # Example
//!
//! ```rust
//! use sheetbridge_writer::{CellOptions, Document};
//!
//! let mut doc = Document::new();
//! let bold = CellOptions::new().with_bold(true);
//! doc.sheet("Report")
//!     .titles(["Item", "Price"], bold)
//!     .row()
//!     .cell("Coffee", None)
//!     .currency(3.5, Some("$"), Some(2), None);
//!
//! let plan = doc.build().unwrap();
//! // one task creating "Report", one replaying it
//! assert_eq!(plan.len(), 2);
//! ```

pub mod border;
pub mod codec;
pub mod document;
pub mod error;
pub mod plan;
pub mod sheet;
pub mod style;

// Re-export key types
pub use border::{BorderRegion, Edge, Side};
pub use codec::{Rgb, Timestamp};
pub use document::Document;
pub use error::{Result, WriterError};
pub use plan::{Plan, Task, TaskKind};
pub use sheet::{Batch, CellInput, Instruction, Layout, Sheet, SheetName, ValueType};
pub use style::{
    Alignment, BorderLayer, BorderOptions, BorderToEnd, CellOptions, Font, HorizontalAlign,
    LineStyle, SheetOptions, VerticalAlign,
};
