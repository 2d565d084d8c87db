//! Last check on form input before a request is built.

use std::fmt;

use rust_decimal::Decimal;
use shared::domain::{AccountName, Username};
use thiserror::Error;

use crate::error::{Operation, ValidationError};

/// A strictly positive amount. Displays exactly as the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositiveAmount {
    value: Decimal,
    entered: String,
}

impl PositiveAmount {
    pub fn value(&self) -> Decimal {
        self.value
    }
}

impl fmt::Display for PositiveAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.entered)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecimalParseError {
    #[error("not a decimal number")]
    Malformed,
    /// Well-formed, but `Decimal` cannot hold it without rounding.
    #[error("decimal cannot be represented exactly")]
    Unrepresentable { negative: bool },
}

/// Parses plain or scientific decimal text without ever rounding.
pub fn parse_decimal(raw: &str) -> Result<Decimal, DecimalParseError> {
    let (negative, unsigned) = split_sign(raw.trim());
    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], parse_exponent(&unsigned[at + 1..])?),
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if (whole.is_empty() && fraction.is_empty())
        || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(DecimalParseError::Malformed);
    }

    let digits = format!("{whole}{fraction}");
    let digits = digits.trim_start_matches('0');
    let significant = digits.trim_end_matches('0');
    if significant.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let exponent = exponent
        .saturating_sub(fraction.len() as i64)
        .saturating_add((digits.len() - significant.len()) as i64);

    let value = exact_decimal(significant, exponent)
        .ok_or(DecimalParseError::Unrepresentable { negative })?;
    Ok(if negative { -value } else { value })
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn parse_exponent(raw: &str) -> Result<i64, DecimalParseError> {
    let (negative, digits) = split_sign(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecimalParseError::Malformed);
    }
    let magnitude = digits.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Ok(if negative { -magnitude } else { magnitude })
}

/// `significant * 10^exponent`, or `None` when it does not fit in 96 bits
/// with a scale of at most 28.
fn exact_decimal(significant: &str, exponent: i64) -> Option<Decimal> {
    if significant.len() > 29 {
        return None;
    }
    let mut mantissa: i128 = significant.parse().ok()?;
    let scale = if exponent < 0 {
        u32::try_from(exponent.checked_neg()?).ok()?
    } else {
        for _ in 0..exponent {
            mantissa = mantissa.checked_mul(10)?;
        }
        0
    };
    Decimal::try_from_i128_with_scale(mantissa, scale).ok()
}

/// Unparseable input is reported the same way as a non-positive value.
pub fn validate_amount(raw: &str, operation: Operation) -> Result<PositiveAmount, ValidationError> {
    match parse_decimal(raw) {
        Ok(value) if value > Decimal::ZERO => Ok(PositiveAmount {
            value,
            entered: raw.trim().to_string(),
        }),
        Err(DecimalParseError::Unrepresentable { negative: false }) => {
            Err(ValidationError::AmountOutOfRange { operation })
        }
        _ => Err(ValidationError::NonPositiveAmount { operation }),
    }
}

pub fn validate_recipient(raw: &str) -> Result<AccountName, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingRecipient);
    }
    Ok(AccountName::new(trimmed))
}

pub fn validate_credentials(
    username: &str,
    pin: &str,
) -> Result<(Username, String), ValidationError> {
    let username = username.trim();
    if username.is_empty() || pin.is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok((Username::new(username), pin.to_string()))
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
