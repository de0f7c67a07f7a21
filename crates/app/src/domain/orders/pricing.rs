//! Order pricing rules, in minor units.

/// Tax charged on the items subtotal, in percent.
pub const TAX_RATE_PERCENT: u64 = 10;

/// Minor units in one whole currency unit.
pub const MINOR_PER_MAJOR: u64 = 100;

/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: u64 = 500_00;

/// Flat shipping charge below the threshold.
pub const FLAT_SHIPPING: u64 = 50_00;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub items_price: u64,
    pub tax_price: u64,
    pub shipping_price: u64,
    pub total_price: u64,
}

impl OrderTotals {
    /// Derive tax, shipping and total from an items subtotal.
    ///
    /// Tax rounds half up to a whole currency unit.
    #[must_use]
    pub fn from_items_price(items_price: u64) -> Self {
        // items * rate is in hundredths of a minor unit
        let tax_major = items_price
            .saturating_mul(TAX_RATE_PERCENT)
            .saturating_add(50 * MINOR_PER_MAJOR)
            / (100 * MINOR_PER_MAJOR);
        let tax_price = tax_major.saturating_mul(MINOR_PER_MAJOR);

        let shipping_price = if items_price > FREE_SHIPPING_THRESHOLD {
            0
        } else {
            FLAT_SHIPPING
        };

        Self {
            items_price,
            tax_price,
            shipping_price,
            total_price: items_price
                .saturating_add(tax_price)
                .saturating_add(shipping_price),
        }
    }
}
