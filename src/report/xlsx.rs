use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};

use crate::error::AppError;
use crate::report::document::{CellValue, Document, RowStyle, COLUMN_COUNT, COLUMN_WIDTHS};
use crate::report::format::{format_percent, format_usd};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const SHEET_NAME: &str = "Change Order";

const HEADER_FILL: u32 = 0xD3D3D3;
const SUBTOTAL_FILL: u32 = 0xFFD699;
const TOTAL_FILL: u32 = 0xC4D79B;
const FINAL_TOTAL_FILL: u32 = 0xFFFF00;

/// Cell formats per row style
struct Styles {
    title: Format,
    header: Format,
    body: Format,
    subtotal: Format,
    total: Format,
    final_total: Format,
}

impl Styles {
    fn new() -> Self {
        let bordered = Format::new().set_border(FormatBorder::Thin);
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_align(FormatAlign::Center),
            header: bordered
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            subtotal: bordered.clone().set_background_color(Color::RGB(SUBTOTAL_FILL)),
            total: bordered.clone().set_background_color(Color::RGB(TOTAL_FILL)),
            final_total: bordered
                .clone()
                .set_background_color(Color::RGB(FINAL_TOTAL_FILL)),
            body: bordered,
        }
    }

    fn for_row(&self, style: RowStyle) -> &Format {
        match style {
            RowStyle::Header => &self.header,
            RowStyle::Body => &self.body,
            RowStyle::Subtotal => &self.subtotal,
            RowStyle::Total => &self.total,
            RowStyle::FinalTotal => &self.final_total,
        }
    }
}

/// Write a laid-out change order to an in-memory `.xlsx` workbook
pub fn render_xlsx(document: &Document) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    write_sheet(worksheet, document).map_err(render_error)?;
    workbook.save_to_buffer().map_err(render_error)
}

fn write_sheet(worksheet: &mut Worksheet, document: &Document) -> Result<(), XlsxError> {
    let styles = Styles::new();

    worksheet.set_name(SHEET_NAME)?;
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    worksheet.merge_range(
        0,
        0,
        0,
        (COLUMN_COUNT - 1) as u16,
        &document.title,
        &styles.title,
    )?;

    for positioned in &document.rows {
        let row = positioned.index;
        let format = styles.for_row(positioned.row.style);

        for (col, cell) in positioned.row.cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Blank => worksheet.write_blank(row, col, format)?,
                CellValue::Text(text) => {
                    worksheet.write_string_with_format(row, col, text, format)?
                }
                CellValue::Number(n) => worksheet.write_number_with_format(row, col, *n, format)?,
                CellValue::Currency(amount) => {
                    worksheet.write_string_with_format(row, col, format_usd(*amount), format)?
                }
                CellValue::Percent(p) => {
                    worksheet.write_string_with_format(row, col, format_percent(*p), format)?
                }
            };
        }
    }

    Ok(())
}

fn render_error(err: XlsxError) -> AppError {
    AppError::RenderError(format!("Failed to create Excel file: {}", err))
}
