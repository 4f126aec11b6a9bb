use serde::Serialize;

/// Overhead applied to total direct cost
pub const OVERHEAD_RATE: f64 = 0.10;

/// Profit applied to total direct cost
pub const PROFIT_RATE: f64 = 0.10;

/// One marginal band of the subcontractor OH&P schedule.
///
/// `floor` is exclusive and `ceiling` inclusive, so a subtotal sitting exactly
/// on a breakpoint is absorbed by the lower band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarkupTier {
    pub floor: f64,
    /// `None` for the open-ended top band
    pub ceiling: Option<f64>,
    pub rate: f64,
}

impl MarkupTier {
    /// Portion of `subtotal` that falls inside this band.
    ///
    /// The lowest band is not floored at zero, so a negative subtotal shows up
    /// there instead of vanishing.
    pub fn portion_of(&self, subtotal: f64) -> f64 {
        let above_floor = if self.floor == 0.0 {
            subtotal
        } else {
            (subtotal - self.floor).max(0.0)
        };

        match self.ceiling {
            Some(ceiling) => above_floor.min(ceiling - self.floor),
            None => above_floor,
        }
    }

    /// Rate as a whole percentage, e.g. `10` for 10%
    pub fn percent(&self) -> u32 {
        (self.rate * 100.0).round() as u32
    }
}

/// GC's overhead & profit schedule on subcontractor work:
/// $0-$10,000 at 10%, $10,001-$99,000 at 5%, above $99,000 at 3%.
pub const SUBCONTRACTOR_TIERS: [MarkupTier; 3] = [
    MarkupTier {
        floor: 0.0,
        ceiling: Some(10_000.0),
        rate: 0.10,
    },
    MarkupTier {
        floor: 10_000.0,
        ceiling: Some(99_000.0),
        rate: 0.05,
    },
    MarkupTier {
        floor: 99_000.0,
        ceiling: None,
        rate: 0.03,
    },
];

/// Amount of subcontractor cost inside one tier and the markup it earns
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierCharge {
    pub tier: MarkupTier,
    pub amount: f64,
    pub charge: f64,
}

/// Subcontractor subtotal with its tiered markup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcontractorBreakdown {
    pub subtotal: f64,
    pub tiers: [TierCharge; 3],
    pub markup_total: f64,
}

/// Monetary totals of a change order, kept at full precision
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MonetaryReport {
    pub materials_subtotal: f64,
    pub equipment_subtotal: f64,
    pub labor_subtotal: f64,
    pub general_requirements_subtotal: f64,
    pub total_direct_cost: f64,
    pub overhead_amount: f64,
    pub profit_amount: f64,
    /// Present only when the change order has subcontractor items
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcontractors: Option<SubcontractorBreakdown>,
    pub grand_total: f64,
}

impl MonetaryReport {
    /// Subcontractor subtotal, zero when there are no subcontractor items
    pub fn subcontractor_subtotal(&self) -> f64 {
        self.subcontractors.as_ref().map_or(0.0, |s| s.subtotal)
    }

    /// Subcontractor markup, zero when there are no subcontractor items
    pub fn subcontractor_markup(&self) -> f64 {
        self.subcontractors.as_ref().map_or(0.0, |s| s.markup_total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_portions_at_breakpoints() {
        let [t1, t2, t3] = SUBCONTRACTOR_TIERS;

        assert_eq!(t1.portion_of(10_000.0), 10_000.0);
        assert_eq!(t2.portion_of(10_000.0), 0.0);
        assert_eq!(t3.portion_of(10_000.0), 0.0);

        assert_eq!(t1.portion_of(99_000.0), 10_000.0);
        assert_eq!(t2.portion_of(99_000.0), 89_000.0);
        assert_eq!(t3.portion_of(99_000.0), 0.0);
    }

    #[test]
    fn test_lowest_tier_keeps_negative_subtotal() {
        let [t1, t2, t3] = SUBCONTRACTOR_TIERS;
        assert_eq!(t1.portion_of(-500.0), -500.0);
        assert_eq!(t2.portion_of(-500.0), 0.0);
        assert_eq!(t3.portion_of(-500.0), 0.0);
    }

    #[test]
    fn test_percent() {
        let percents: Vec<u32> = SUBCONTRACTOR_TIERS.iter().map(|t| t.percent()).collect();
        assert_eq!(percents, vec![10, 5, 3]);
    }

    #[test]
    fn test_report_accessors_without_subcontractors() {
        let report = MonetaryReport::default();
        assert_eq!(report.subcontractor_subtotal(), 0.0);
        assert_eq!(report.subcontractor_markup(), 0.0);
    }
}
