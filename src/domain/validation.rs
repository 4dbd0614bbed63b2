use std::str::FromStr;
use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use regex::Regex;

use super::customer::CustomerInput;
use super::errors::DomainError;

pub const PHONE_PATTERN: &str = r"^\+?\d[\d\-]{7,}\d$";

/// Column widths of `customers.name`, `customers.email` and `products.name`.
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_EMAIL_LEN: usize = 254;

/// `products.price` is `NUMERIC(10, 2)`.
pub const PRICE_SCALE: i64 = 2;
const PRICE_INTEGER_DIGITS: u32 = 8;

pub fn is_valid_phone(phone: &str) -> bool {
    static PHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = PHONE_REGEX.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));
    regex.is_match(phone)
}

/// An absent or empty phone is accepted; anything else must match [`PHONE_PATTERN`].
pub fn validate_phone(phone: Option<&str>) -> Result<(), DomainError> {
    match phone {
        Some(p) if !p.is_empty() && !is_valid_phone(p) => Err(DomainError::InvalidPhone),
        _ => Ok(()),
    }
}

pub fn parse_price(raw: &str) -> Result<BigDecimal, DomainError> {
    BigDecimal::from_str(raw.trim()).map_err(|_| DomainError::InvalidPrice(raw.to_string()))
}

fn check_len(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    if value.chars().count() > max {
        return Err(DomainError::InvalidInput(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Name and email must fit their columns.
pub fn validate_customer_fields(input: &CustomerInput) -> Result<(), DomainError> {
    check_len("name", &input.name, MAX_NAME_LEN)?;
    check_len("email", &input.email, MAX_EMAIL_LEN)
}

/// Price is checked before stock; the first violation wins.
///
/// Prices must be representable as stored: at most two decimal places and
/// below 10^8. Trailing zeros do not count towards the scale.
pub fn validate_product(price: &BigDecimal, stock: i32) -> Result<(), DomainError> {
    if *price <= BigDecimal::from(0) {
        return Err(DomainError::NonPositivePrice);
    }
    let (_, scale) = price.normalized().as_bigint_and_exponent();
    if scale > PRICE_SCALE {
        return Err(DomainError::PriceTooPrecise);
    }
    if *price >= BigDecimal::from(10u64.pow(PRICE_INTEGER_DIGITS)) {
        return Err(DomainError::PriceTooLarge);
    }
    if stock < 0 {
        return Err(DomainError::NegativeStock);
    }
    Ok(())
}

/// `orders.total_amount` is `NUMERIC(12, 2)`.
pub fn validate_order_total(total: &BigDecimal) -> Result<(), DomainError> {
    if *total >= BigDecimal::from(10u64.pow(PRICE_INTEGER_DIGITS + 2)) {
        return Err(DomainError::InvalidInput(
            "order total must be less than 10000000000".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_product_name(name: &str) -> Result<(), DomainError> {
    check_len("name", name, MAX_NAME_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_phones() {
        for phone in ["+1234567890", "123-456-7890", "1234567890", "+1-800-555-0199"] {
            assert!(is_valid_phone(phone), "{phone} should be accepted");
        }
    }

    #[test]
    fn rejects_malformed_phones() {
        for phone in [
            "12345",
            "123456789",
            "+",
            "abc1234567",
            "-123456789",
            "123456789-",
            "++1234567890",
            "123 456 7890",
            "(123)456-7890",
        ] {
            assert!(!is_valid_phone(phone), "{phone} should be rejected");
        }
    }

    #[test]
    fn absent_or_empty_phone_is_fine() {
        assert!(validate_phone(None).is_ok());
        assert!(validate_phone(Some("")).is_ok());
    }

    #[test]
    fn validate_phone_reports_invalid_format() {
        assert!(matches!(
            validate_phone(Some("12-34")),
            Err(DomainError::InvalidPhone)
        ));
    }

    #[test]
    fn parse_price_accepts_decimal_strings() {
        let price = parse_price(" 999.99 ").unwrap();
        assert_eq!(price, BigDecimal::from_str("999.99").unwrap());
    }

    #[test]
    fn parse_price_rejects_garbage() {
        assert!(matches!(
            parse_price("ten"),
            Err(DomainError::InvalidPrice(raw)) if raw == "ten"
        ));
    }

    #[test]
    fn zero_and_negative_prices_are_rejected() {
        for raw in ["0", "0.00", "-1.50"] {
            let price = BigDecimal::from_str(raw).unwrap();
            assert!(matches!(
                validate_product(&price, 5),
                Err(DomainError::NonPositivePrice)
            ));
        }
    }

    #[test]
    fn negative_stock_is_rejected() {
        let price = BigDecimal::from_str("1.00").unwrap();
        assert!(matches!(
            validate_product(&price, -1),
            Err(DomainError::NegativeStock)
        ));
        assert!(validate_product(&price, 0).is_ok());
    }

    #[test]
    fn sub_cent_prices_are_rejected() {
        for raw in ["0.001", "1.999"] {
            let price = BigDecimal::from_str(raw).unwrap();
            assert!(
                matches!(validate_product(&price, 1), Err(DomainError::PriceTooPrecise)),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        for raw in ["1.500", "10", "99999999.99"] {
            let price = BigDecimal::from_str(raw).unwrap();
            assert!(validate_product(&price, 1).is_ok(), "{raw} should be accepted");
        }
    }

    #[test]
    fn prices_beyond_the_column_are_rejected() {
        for raw in ["1e8", "100000000", "123456789.50"] {
            let price = BigDecimal::from_str(raw).unwrap();
            assert!(
                matches!(validate_product(&price, 1), Err(DomainError::PriceTooLarge)),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn customer_fields_must_fit_their_columns() {
        let ok = CustomerInput::new("x".repeat(MAX_NAME_LEN), "a@example.com", None);
        assert!(validate_customer_fields(&ok).is_ok());

        let long_name = CustomerInput::new("x".repeat(MAX_NAME_LEN + 1), "a@example.com", None);
        assert!(matches!(
            validate_customer_fields(&long_name),
            Err(DomainError::InvalidInput(msg)) if msg == "name must be at most 255 characters"
        ));

        let long_email = format!("{}@example.com", "a".repeat(MAX_EMAIL_LEN));
        let long_email = CustomerInput::new("A", long_email, None);
        assert!(matches!(
            validate_customer_fields(&long_email),
            Err(DomainError::InvalidInput(msg)) if msg == "email must be at most 254 characters"
        ));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let name = "é".repeat(MAX_NAME_LEN);
        assert!(validate_product_name(&name).is_ok());
        assert!(validate_product_name(&format!("{name}é")).is_err());
    }

    #[test]
    fn price_is_checked_before_stock() {
        let price = BigDecimal::from(0);
        assert!(matches!(
            validate_product(&price, -1),
            Err(DomainError::NonPositivePrice)
        ));
    }
}
