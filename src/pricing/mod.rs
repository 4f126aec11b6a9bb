pub mod calculator;
pub mod models;

pub use calculator::{compute, subcontractor_markup};
pub use models::{
    MarkupTier, MonetaryReport, SubcontractorBreakdown, TierCharge, OVERHEAD_RATE, PROFIT_RATE,
    SUBCONTRACTOR_TIERS,
};
