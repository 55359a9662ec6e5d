//! Catalog consumers whose misses resolve to "no effect" instead of failing
//! the whole computation.

mod deductible;
mod discount;
mod ncb;

pub use deductible::{resolve_deductible, ResolvedDeductible};
pub use discount::{discount_range, resolve_discount, DiscountContext, DiscountOffer};
pub use ncb::{resolve_ncb, NcbContext, NcbModel, ResolvedNcb};
