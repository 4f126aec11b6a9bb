use crate::models::{ChangeOrderInput, EquipmentItem, LaborItem, MaterialItem, SubcontractorItem};
use crate::pricing::{
    MarkupTier, MonetaryReport, SubcontractorBreakdown, OVERHEAD_RATE, PROFIT_RATE,
};
use crate::report::document::{CellValue, Document, DocumentBuilder, Row, RowStyle};
use crate::report::format::format_thousands;

// Column positions
const ITEM: usize = 0;
const DESCRIPTION: usize = 1;
const C: usize = 2;
const D: usize = 3;
const E: usize = 4;
const F: usize = 5;
const G: usize = 6;
const H: usize = 7;
const TOTAL: usize = 8;

/// Lay out a change order and its totals as spreadsheet rows.
///
/// Materials, equipment and labor always appear; the subcontractor block and
/// general requirements only when they have items.
pub fn build_document(input: &ChangeOrderInput, report: &MonetaryReport) -> Document {
    let mut builder = DocumentBuilder::new(input.display_title());

    builder.append_section(materials_section(&input.materials, report.materials_subtotal));
    builder.append_section(equipment_section(&input.equipment, report.equipment_subtotal));
    builder.append_section(labor_section(&input.labor, report.labor_subtotal));

    if let Some(subs) = &report.subcontractors {
        builder.append_section(subcontractor_section(&input.subcontractors, subs));
        builder.append_section(subcontractor_markup_section(subs));
    }

    if !input.general_requirements.is_empty() {
        builder.append_section(general_requirements_section(
            &input.general_requirements,
            report.general_requirements_subtotal,
        ));
    }

    builder.append_section(summary_section(report));

    if report.subcontractors.is_some() {
        builder.append_section(vec![Row::new(RowStyle::FinalTotal)
            .with(DESCRIPTION, CellValue::text("Total Cost"))
            .with(TOTAL, CellValue::Currency(report.grand_total))]);
    }

    builder.render()
}

fn header(title: &str, columns: [(usize, &str); 7]) -> Row {
    let row = Row::new(RowStyle::Header)
        .with(ITEM, CellValue::text("ITEM"))
        .with(DESCRIPTION, CellValue::text(title));
    columns
        .into_iter()
        .filter(|(_, label)| !label.is_empty())
        .fold(row, |row, (col, label)| row.with(col, CellValue::text(label)))
}

fn item_row(number: usize, description: &str) -> Row {
    Row::new(RowStyle::Body)
        .with(ITEM, CellValue::Number(number as f64))
        .with(DESCRIPTION, CellValue::optional_text(description))
}

fn subtotal_row(label: &str, amount: f64) -> Row {
    Row::new(RowStyle::Subtotal)
        .with(DESCRIPTION, CellValue::text(label))
        .with(TOTAL, CellValue::Currency(amount))
}

fn unit_priced_section(
    title: &str,
    subtotal_label: &str,
    items: &[MaterialItem],
    subtotal: f64,
) -> Vec<Row> {
    let mut rows = vec![header(
        title,
        [(C, "QTY"), (D, "Unit"), (E, ""), (F, ""), (G, ""), (H, "Unit ($)"), (TOTAL, "Total")],
    )];
    rows.extend(items.iter().enumerate().map(|(i, item)| {
        item_row(i + 1, &item.description)
            .with(C, CellValue::Number(item.quantity))
            .with(D, CellValue::optional_text(&item.unit))
            .with(H, CellValue::Currency(item.unit_price))
            .with(TOTAL, CellValue::Currency(item.line_total()))
    }));
    rows.push(subtotal_row(subtotal_label, subtotal));
    rows
}

fn materials_section(items: &[MaterialItem], subtotal: f64) -> Vec<Row> {
    unit_priced_section(
        "Work Performed By GC (MATERIAL)",
        "Total Direct Cost (Materials)",
        items,
        subtotal,
    )
}

fn general_requirements_section(items: &[MaterialItem], subtotal: f64) -> Vec<Row> {
    unit_priced_section(
        "General Requirements",
        "Total Direct Cost (General Requirements)",
        items,
        subtotal,
    )
}

fn equipment_section(items: &[EquipmentItem], subtotal: f64) -> Vec<Row> {
    let mut rows = vec![header(
        "Work Performed By GC (EQUIPMENT)",
        [
            (C, "QTY"),
            (D, "Unit"),
            (E, "Duration"),
            (F, "Units"),
            (G, ""),
            (H, "Unit ($)"),
            (TOTAL, "Total"),
        ],
    )];
    rows.extend(items.iter().enumerate().map(|(i, item)| {
        item_row(i + 1, &item.description)
            .with(C, CellValue::Number(item.quantity))
            .with(D, CellValue::optional_text(&item.unit))
            .with(E, CellValue::Number(item.duration))
            .with(F, CellValue::optional_text(&item.duration_unit))
            .with(H, CellValue::Currency(item.unit_price))
            .with(TOTAL, CellValue::Currency(item.line_total()))
    }));
    rows.push(subtotal_row("Total Direct Cost (Equipment)", subtotal));
    rows
}

fn labor_section(items: &[LaborItem], subtotal: f64) -> Vec<Row> {
    let mut rows = vec![header(
        "Work Performed By GC (LABOR)",
        [
            (C, "Trade"),
            (D, "# of Workers"),
            (E, "Hrs/Day"),
            (F, "Days"),
            (G, "Total Hrs"),
            (H, "Hourly Rate"),
            (TOTAL, "Total"),
        ],
    )];
    rows.extend(items.iter().enumerate().map(|(i, item)| {
        item_row(i + 1, &item.description)
            .with(C, CellValue::optional_text(&item.trade))
            .with(D, CellValue::Number(item.workers as f64))
            .with(E, CellValue::Number(item.hours_per_day))
            .with(F, CellValue::Number(item.days))
            .with(G, CellValue::Number(item.total_hours()))
            .with(H, CellValue::Currency(item.hourly_rate))
            .with(TOTAL, CellValue::Currency(item.line_total()))
    }));
    rows.push(subtotal_row("Total Direct Cost (Labor)", subtotal));
    rows
}

fn subcontractor_section(items: &[SubcontractorItem], subs: &SubcontractorBreakdown) -> Vec<Row> {
    let mut rows = vec![header(
        "Work Performed By ELEC-Sub Contractor",
        [(C, "$ Price"), (D, "QTY"), (E, "Unit"), (F, ""), (G, ""), (H, ""), (TOTAL, "Total")],
    )];
    rows.extend(items.iter().enumerate().map(|(i, item)| {
        item_row(i + 1, &item.description)
            .with(C, CellValue::Currency(item.price))
            .with(D, CellValue::Number(item.quantity))
            .with(E, CellValue::optional_text(&item.unit))
            .with(TOTAL, CellValue::Currency(item.line_total()))
    }));
    rows.push(
        Row::new(RowStyle::Total)
            .with(ITEM, CellValue::text("A"))
            .with(DESCRIPTION, CellValue::text("Sub - Contractor's Total Cost"))
            .with(TOTAL, CellValue::Currency(subs.subtotal)),
    );
    rows
}

fn subcontractor_markup_section(subs: &SubcontractorBreakdown) -> Vec<Row> {
    let mut rows = vec![Row::new(RowStyle::Body).with(
        DESCRIPTION,
        CellValue::text("GC's OH & P on Sub-Contractor's Work"),
    )];
    rows.extend(subs.tiers.iter().map(|tier| {
        Row::new(RowStyle::Body)
            .with(DESCRIPTION, CellValue::text(tier_label(&tier.tier)))
            .with(C, CellValue::Currency(tier.amount))
            .with(H, CellValue::Percent(tier.tier.percent()))
            .with(TOTAL, CellValue::Currency(tier.charge))
    }));
    rows.push(
        Row::new(RowStyle::Total)
            .with(ITEM, CellValue::text("B"))
            .with(
                DESCRIPTION,
                CellValue::text("GC's Overhead & Profit for Subcontractor's Work"),
            )
            .with(TOTAL, CellValue::Currency(subs.markup_total)),
    );
    rows
}

fn summary_section(report: &MonetaryReport) -> Vec<Row> {
    let overhead_percent = (OVERHEAD_RATE * 100.0).round() as u32;
    let profit_percent = (PROFIT_RATE * 100.0).round() as u32;

    vec![
        Row::new(RowStyle::Total)
            .with(
                DESCRIPTION,
                CellValue::text("Total Direct Cost (Labor + Material + Equipment+ General Requirements)"),
            )
            .with(TOTAL, CellValue::Currency(report.total_direct_cost)),
        Row::new(RowStyle::Body)
            .with(DESCRIPTION, CellValue::text(format!("Overhead @ {}%", overhead_percent)))
            .with(H, CellValue::Percent(overhead_percent))
            .with(TOTAL, CellValue::Currency(report.overhead_amount)),
        Row::new(RowStyle::Body)
            .with(DESCRIPTION, CellValue::text(format!("Profit @ {}%", profit_percent)))
            .with(H, CellValue::Percent(profit_percent))
            .with(TOTAL, CellValue::Currency(report.profit_amount)),
        Row::new(RowStyle::Total)
            .with(ITEM, CellValue::text("C"))
            .with(DESCRIPTION, CellValue::text("Grand Total"))
            .with(TOTAL, CellValue::Currency(report.grand_total)),
    ]
}

/// Band label such as `$ 10,001.00 - $ 99,000.00 --(5%)`
pub fn tier_label(tier: &MarkupTier) -> String {
    let from = if tier.floor == 0.0 {
        "$ 0".to_string()
    } else {
        format!("$ {}", format_thousands(tier.floor + 1.0))
    };
    let to = match tier.ceiling {
        Some(ceiling) => format!(" - $ {}", format_thousands(ceiling)),
        None => " & above".to_string(),
    };
    format!("{from}{to} --({}%)", tier.percent())
}
