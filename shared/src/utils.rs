//! # Shared Utility Functions
//!
//! Display helpers used by the portal client and its command-line front end.
//!
//! ## Account Numbers
//!
//! - [`mask_account_number`] - Hide all but the last N digits
//!
//! ## Money
//!
//! - [`format_money`] - Two decimals with thousands separators and a currency code
//!
//! ## Usage
//!
//! ```rust
//! use shared::utils::mask_account_number;
//!
//! assert_eq!(mask_account_number("9876543210", 4), "******3210");
//! ```

use rust_decimal::Decimal;

/// Mask an account number, keeping only the last `visible` characters.
///
/// If the number has `visible` characters or fewer, it is returned as-is.
///
/// # Examples
///
/// ```rust
/// use shared::utils::mask_account_number;
///
/// assert_eq!(mask_account_number("12345678", 4), "****5678");
/// assert_eq!(mask_account_number("123", 4), "123");
/// ```
pub fn mask_account_number(number: &str, visible: usize) -> String {
    let len = number.chars().count();
    if len <= visible {
        return number.to_string();
    }

    let tail: String = number.chars().skip(len - visible).collect();
    format!("{}{}", "*".repeat(len - visible), tail)
}

/// Format an amount as `"<CUR> 1,234.50"`, rounded half-even to two decimals.
///
/// # Examples
///
/// ```rust
/// use rust_decimal::Decimal;
/// use shared::utils::format_money;
///
/// assert_eq!(format_money(Decimal::new(123450, 2), "USD"), "USD 1,234.50");
/// ```
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{} {}{}.{}", currency, sign, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_mask_account_number() {
        assert_eq!(mask_account_number("9876543210", 4), "******3210");
        assert_eq!(mask_account_number("9876543210", 2), "********10");
        assert_eq!(mask_account_number("", 4), "");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(1000), "USD"), "USD 1,000.00");
        assert_eq!(format_money(dec!(999.999), "EUR"), "EUR 1,000.00");
        assert_eq!(format_money(dec!(12), "GBP"), "GBP 12.00");
        assert_eq!(format_money(dec!(-1234567.891), "USD"), "USD -1,234,567.89");
        assert_eq!(format_money(dec!(0), "USD"), "USD 0.00");
    }
}
