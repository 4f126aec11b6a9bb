//! Change order rendering: line items and totals laid out as a spreadsheet.
//!
//! [`sections`] turns a change order into positioned rows through the
//! [`document::DocumentBuilder`], and [`xlsx`] writes the result as a workbook.

pub mod document;
pub mod format;
pub mod sections;
pub mod xlsx;

pub use document::{CellValue, Document, DocumentBuilder, Row, RowStyle, COLUMN_COUNT};
pub use sections::build_document;
pub use xlsx::{render_xlsx, XLSX_CONTENT_TYPE};
