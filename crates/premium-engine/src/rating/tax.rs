/// Statutory tax rate on net premium.
pub const STATUTORY_TAX_RATE: f64 = 0.18;

pub fn calculate_tax(net_premium: f64) -> f64 {
    calculate_tax_at(net_premium, STATUTORY_TAX_RATE)
}

/// Unrounded tax at an explicit rate.
pub fn calculate_tax_at(net_premium: f64, tax_rate: f64) -> f64 {
    net_premium * tax_rate
}
