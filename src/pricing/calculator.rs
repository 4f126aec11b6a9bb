use crate::models::ChangeOrderInput;
use crate::pricing::models::{
    MonetaryReport, SubcontractorBreakdown, TierCharge, OVERHEAD_RATE, PROFIT_RATE,
    SUBCONTRACTOR_TIERS,
};

/// Roll line items up into the totals printed on the change order.
///
/// Subcontractor work is kept out of the direct cost; it is added to the grand
/// total together with its tiered markup only when subcontractor items exist.
/// No rounding happens here.
pub fn compute(input: &ChangeOrderInput) -> MonetaryReport {
    let materials_subtotal: f64 = input.materials.iter().map(|i| i.line_total()).sum();
    let equipment_subtotal: f64 = input.equipment.iter().map(|i| i.line_total()).sum();
    let labor_subtotal: f64 = input.labor.iter().map(|i| i.line_total()).sum();
    let general_requirements_subtotal: f64 = input
        .general_requirements
        .iter()
        .map(|i| i.line_total())
        .sum();

    let total_direct_cost =
        materials_subtotal + equipment_subtotal + labor_subtotal + general_requirements_subtotal;
    let overhead_amount = total_direct_cost * OVERHEAD_RATE;
    let profit_amount = total_direct_cost * PROFIT_RATE;

    let subcontractors = input.has_subcontractors().then(|| {
        let subtotal: f64 = input.subcontractors.iter().map(|i| i.line_total()).sum();
        subcontractor_markup(subtotal)
    });

    let mut grand_total = total_direct_cost + overhead_amount + profit_amount;
    if let Some(subs) = &subcontractors {
        grand_total += subs.subtotal + subs.markup_total;
    }

    MonetaryReport {
        materials_subtotal,
        equipment_subtotal,
        labor_subtotal,
        general_requirements_subtotal,
        total_direct_cost,
        overhead_amount,
        profit_amount,
        subcontractors,
        grand_total,
    }
}

/// Apply the marginal OH&P schedule to a subcontractor subtotal
pub fn subcontractor_markup(subtotal: f64) -> SubcontractorBreakdown {
    let tiers = SUBCONTRACTOR_TIERS.map(|tier| {
        let amount = tier.portion_of(subtotal);
        TierCharge {
            tier,
            amount,
            charge: amount * tier.rate,
        }
    });
    let markup_total = tiers.iter().map(|t| t.charge).sum();

    SubcontractorBreakdown {
        subtotal,
        tiers,
        markup_total,
    }
}
