//! Amount helpers for turning activity-feed values into record fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NATIVE_DECIMALS: u32 = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Fractional component of {amount} exceeds {decimals} decimals")]
    TooManyDecimals { amount: String, decimals: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenStandard {
    Native,
    Erc20,
    Erc721,
    Erc1155,
}

/// Value of a transfer as reported by the activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactedValue {
    pub currency: Option<String>,
    pub value: Option<f64>,
}

/// Scales a decimal amount like `"1.5"` to base units (`"1500000"` for 6
/// decimals). Leading zeros are dropped; a zero amount yields `"0"`.
pub fn parse_units(amount: &str, decimals: u32) -> Result<String, ConversionError> {
    let invalid = || ConversionError::InvalidAmount(amount.to_string());

    let trimmed = amount.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };

    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (unsigned, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    // trailing zeros past the precision are harmless
    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(ConversionError::TooManyDecimals {
            amount: amount.to_string(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat('0').take(decimals as usize - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok("0".to_string());
    }
    Ok(if negative {
        format!("-{}", digits)
    } else {
        digits.to_string()
    })
}

/// Base-unit amount of a transfer. Native transfers use the chain's native
/// precision; tokens use their own decimals when the feed knows them.
pub fn derive_currency_amount(
    standard: TokenStandard,
    asset_decimals: Option<u32>,
    quantity: &str,
) -> Result<String, ConversionError> {
    let decimals = match standard {
        TokenStandard::Native => NATIVE_DECIMALS,
        _ => asset_decimals.unwrap_or(NATIVE_DECIMALS),
    };
    parse_units(quantity, decimals)
}

pub fn parse_usd_value(transacted: Option<&TransactedValue>) -> Option<f64> {
    transacted
        .filter(|t| t.currency.as_deref() == Some("USD"))
        .and_then(|t| t.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_whole_and_fractional_amounts() {
        assert_eq!(parse_units("1.5", 6).unwrap(), "1500000");
        assert_eq!(parse_units("42", 0).unwrap(), "42");
        assert_eq!(parse_units("0.000001", 6).unwrap(), "1");
        assert_eq!(parse_units(".25", 2).unwrap(), "25");
        assert_eq!(parse_units("0.0", 18).unwrap(), "0");
        assert_eq!(parse_units("-2.10", 1).unwrap(), "-21");
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!(matches!(parse_units("", 18), Err(ConversionError::InvalidAmount(_))));
        assert!(matches!(parse_units(".", 18), Err(ConversionError::InvalidAmount(_))));
        assert!(matches!(parse_units("1e5", 18), Err(ConversionError::InvalidAmount(_))));
        assert!(matches!(parse_units("1.2.3", 18), Err(ConversionError::InvalidAmount(_))));
        assert_eq!(
            parse_units("1.234", 2),
            Err(ConversionError::TooManyDecimals {
                amount: "1.234".to_string(),
                decimals: 2
            })
        );
    }

    #[test]
    fn native_ignores_asset_decimals() {
        let native = derive_currency_amount(TokenStandard::Native, Some(6), "1").unwrap();
        assert_eq!(native, format!("1{}", "0".repeat(18)));

        let usdc = derive_currency_amount(TokenStandard::Erc20, Some(6), "2.5").unwrap();
        assert_eq!(usdc, "2500000");

        let unknown = derive_currency_amount(TokenStandard::Erc20, None, "1").unwrap();
        assert_eq!(unknown, native);
    }

    #[test]
    fn usd_value_only_for_usd() {
        let usd = TransactedValue {
            currency: Some("USD".to_string()),
            value: Some(12.5),
        };
        let eur = TransactedValue {
            currency: Some("EUR".to_string()),
            value: Some(9.0),
        };
        assert_eq!(parse_usd_value(Some(&usd)), Some(12.5));
        assert_eq!(parse_usd_value(Some(&eur)), None);
        assert_eq!(parse_usd_value(None), None);
    }
}
