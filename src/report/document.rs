use serde::Serialize;

/// Columns A through I
pub const COLUMN_COUNT: usize = 9;

/// Column widths in character units, A through I
pub const COLUMN_WIDTHS: [f64; COLUMN_COUNT] =
    [10.0, 60.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0, 15.0];

/// Row of the first section; the title sits on row 0 with a blank row after it
const FIRST_SECTION_ROW: u32 = 2;

/// Typed cell content. Formatting happens when the document is written out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    Blank,
    Text(String),
    Number(f64),
    /// Rendered as `US$ 0.00`
    Currency(f64),
    /// Whole percentage, rendered as `10%`
    Percent(u32),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Text cell that stays blank for empty strings
    pub fn optional_text(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Blank
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStyle {
    /// Column headings: grey fill, bold, centred
    Header,
    /// Line items and labels: bordered only
    Body,
    /// Category totals: orange fill
    Subtotal,
    /// Key totals: green fill
    Total,
    /// Closing total: yellow fill
    FinalTotal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub cells: [CellValue; COLUMN_COUNT],
    pub style: RowStyle,
}

impl Row {
    pub fn new(style: RowStyle) -> Self {
        Self {
            cells: std::array::from_fn(|_| CellValue::Blank),
            style,
        }
    }

    /// Set the cell in column `col`; out-of-range columns are ignored
    pub fn with(mut self, col: usize, value: CellValue) -> Self {
        if let Some(cell) = self.cells.get_mut(col) {
            *cell = value;
        }
        self
    }

    pub fn cell(&self, col: usize) -> &CellValue {
        &self.cells[col]
    }
}

/// A row pinned to its sheet position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedRow {
    pub index: u32,
    pub row: Row,
}

/// Laid-out change order ready to be written to a workbook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub title: String,
    pub rows: Vec<PositionedRow>,
}

impl Document {
    /// First row whose column B carries `label`
    pub fn find_row(&self, label: &str) -> Option<&PositionedRow> {
        self.rows
            .iter()
            .find(|r| matches!(r.row.cell(1), CellValue::Text(t) if t == label))
    }

    /// Index of the last occupied row, counting the title
    pub fn last_row(&self) -> u32 {
        self.rows.last().map_or(0, |r| r.index)
    }
}

/// Owns the row cursor while sections are appended.
///
/// Each section is written on consecutive rows and followed by one empty
/// spacer row.
#[derive(Debug)]
pub struct DocumentBuilder {
    title: String,
    next_row: u32,
    rows: Vec<PositionedRow>,
}

impl DocumentBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            next_row: FIRST_SECTION_ROW,
            rows: Vec::new(),
        }
    }

    pub fn append_section(&mut self, rows: Vec<Row>) {
        if rows.is_empty() {
            return;
        }
        for row in rows {
            self.rows.push(PositionedRow {
                index: self.next_row,
                row,
            });
            self.next_row += 1;
        }
        self.next_row += 1;
    }

    pub fn render(self) -> Document {
        Document {
            title: self.title,
            rows: self.rows,
        }
    }
}
