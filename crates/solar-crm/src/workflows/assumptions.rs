use serde::{Deserialize, Serialize};

/// Policy constants behind production, savings, and break-even estimates.
///
/// Jurisdictional or policy changes (a new federal credit rate, a different
/// regional capacity factor) are applied by swapping this value rather than
/// editing the formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelAssumptions {
    /// Share of incident irradiance converted to electricity by the modules.
    pub module_efficiency: f64,
    /// Annual yield of one installed kW, used to size the system.
    pub capacity_factor_kwh_per_kw: f64,
    /// Average daily yield of one installed kW, used for the monthly estimate.
    pub daily_yield_kwh_per_kw: f64,
    /// Federal investment tax credit as a fraction of gross cost.
    pub federal_credit_rate: f64,
    /// Share of the current utility bill assumed to be offset when computing break-even.
    pub bill_offset_fraction: f64,
}

impl ModelAssumptions {
    pub const DEFAULT_MODULE_EFFICIENCY: f64 = 0.18;
    pub const DEFAULT_CAPACITY_FACTOR_KWH_PER_KW: f64 = 1500.0;
    pub const DEFAULT_DAILY_YIELD_KWH_PER_KW: f64 = 4.0;
    pub const DEFAULT_FEDERAL_CREDIT_RATE: f64 = 0.30;
    pub const DEFAULT_BILL_OFFSET_FRACTION: f64 = 0.8;

    /// Days per month used when turning the daily yield into a monthly estimate.
    pub const DAYS_PER_MONTH: f64 = 30.0;
}

impl Default for ModelAssumptions {
    fn default() -> Self {
        Self {
            module_efficiency: Self::DEFAULT_MODULE_EFFICIENCY,
            capacity_factor_kwh_per_kw: Self::DEFAULT_CAPACITY_FACTOR_KWH_PER_KW,
            daily_yield_kwh_per_kw: Self::DEFAULT_DAILY_YIELD_KWH_PER_KW,
            federal_credit_rate: Self::DEFAULT_FEDERAL_CREDIT_RATE,
            bill_offset_fraction: Self::DEFAULT_BILL_OFFSET_FRACTION,
        }
    }
}
