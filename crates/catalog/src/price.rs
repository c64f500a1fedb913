//! Price calculation shared by the cart, product detail and list sort.

/// Price after the discount percentage is applied, in whole won.
///
/// Discounts above 100 are clamped. The fractional part is dropped, so a
/// 15% discount on 9,990 yields 8,491.
pub fn effective_price(original_price: u32, discount_percent: u8) -> u32 {
    let discount = u64::from(discount_percent.min(100));
    let discounted = u64::from(original_price) * (100 - discount) / 100;
    // Never larger than the original price, so it always fits back into u32.
    discounted as u32
}
