//! Parsing and range checks for user-typed fields.
//!
//! Everything here runs before a producer is built, so a rejected field never
//! disturbs an existing visualization.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Allowed length of generated sort arrays.
pub const ARRAY_SIZE: RangeInclusive<usize> = 5..=30;
pub const DEFAULT_ARRAY_SIZE: usize = 12;
/// Range of generated array values.
pub const VALUE_RANGE: RangeInclusive<i64> = 10..=99;
pub const LINEAR_SEARCH_SIZE: usize = 15;

pub const AMOUNT: RangeInclusive<u64> = 1..=100;
pub const COIN: RangeInclusive<u64> = 1..=100;
pub const MAX_COINS: usize = 10;
pub const CAPACITY: RangeInclusive<u64> = 0..=100;
pub const MAX_ITEMS: usize = 8;
pub const ITEM_WEIGHT: RangeInclusive<u64> = 1..=100;
pub const ITEM_VALUE: RangeInclusive<u64> = 0..=1000;
pub const FIB_N: RangeInclusive<u64> = 0..=20;
pub const FACTORIAL_N: RangeInclusive<u64> = 1..=20;
pub const MAX_WORD_LEN: usize = 16;

/// Parse a trimmed integer field.
pub fn parse_integer(field: &str, raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid(format!("Please enter a value for {field}.")));
    }
    raw.parse()
        .map_err(|_| Error::invalid(format!("{field} must be a whole number, got \"{raw}\".")))
}

/// Parse an unsigned integer and check it against `range`.
pub fn parse_in_range(field: &str, raw: &str, range: RangeInclusive<u64>) -> Result<u64> {
    let value = parse_integer(field, raw)?;
    match u64::try_from(value) {
        Ok(v) if range.contains(&v) => Ok(v),
        _ => Err(Error::invalid(format!(
            "{field} must be between {} and {}.",
            range.start(),
            range.end()
        ))),
    }
}

/// Parse a comma-separated list of integers.
pub fn parse_list(field: &str, raw: &str) -> Result<Vec<i64>> {
    let values = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_integer(field, s))
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        return Err(Error::invalid(format!("{field} needs at least one value.")));
    }
    Ok(values)
}

/// Coin denominations: unique, each within [`COIN`], at most [`MAX_COINS`].
pub fn parse_coins(raw: &str) -> Result<Vec<u64>> {
    let values = parse_list("Coins", raw)?;
    if values.len() > MAX_COINS {
        return Err(Error::invalid(format!("At most {MAX_COINS} coins are supported.")));
    }
    let mut coins = Vec::with_capacity(values.len());
    for value in values {
        let coin = u64::try_from(value)
            .ok()
            .filter(|c| COIN.contains(c))
            .ok_or_else(|| {
                Error::invalid(format!(
                    "Coins must be between {} and {}.",
                    COIN.start(),
                    COIN.end()
                ))
            })?;
        if coins.contains(&coin) {
            return Err(Error::invalid(format!("Coin {coin} is listed twice.")));
        }
        coins.push(coin);
    }
    Ok(coins)
}

/// Check a generated-array length.
pub fn check_array_size(size: usize) -> Result<usize> {
    if ARRAY_SIZE.contains(&size) {
        Ok(size)
    } else {
        Err(Error::invalid(format!(
            "Array size must be between {} and {}.",
            ARRAY_SIZE.start(),
            ARRAY_SIZE.end()
        )))
    }
}

/// A non-empty lowercase word over `a..=z`.
pub fn parse_word(raw: &str) -> Result<String> {
    let word = raw.trim().to_ascii_lowercase();
    if word.is_empty() {
        return Err(Error::invalid("Please enter a word."));
    }
    if word.len() > MAX_WORD_LEN {
        return Err(Error::invalid(format!(
            "Words are limited to {MAX_WORD_LEN} letters."
        )));
    }
    if !word.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(Error::invalid("Words may only contain the letters a-z."));
    }
    Ok(word)
}

/// Like [`parse_word`] but allows the empty prefix, which matches every word.
pub fn parse_prefix(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Ok(String::new());
    }
    parse_word(raw)
}

/// Ascending check for binary search input.
pub fn check_ascending(values: &[i64]) -> Result<()> {
    if values.windows(2).all(|w| w[0] <= w[1]) {
        Ok(())
    } else {
        Err(Error::invalid("Binary search needs an ascending array."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_trimmed() {
        assert_eq!(parse_integer("Target", " 27 "), Ok(27));
        assert_eq!(parse_integer("Target", "-3"), Ok(-3));
    }

    #[test]
    fn non_numeric_is_rejected() {
        let err = parse_integer("Target", "abc").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(parse_integer("Target", "  ").is_err());
        assert!(parse_integer("Target", "2.5").is_err());
    }

    #[test]
    fn ranges_are_inclusive() {
        assert_eq!(parse_in_range("Amount", "1", AMOUNT), Ok(1));
        assert_eq!(parse_in_range("Amount", "100", AMOUNT), Ok(100));
        assert!(parse_in_range("Amount", "0", AMOUNT).is_err());
        assert!(parse_in_range("Amount", "-5", AMOUNT).is_err());
        assert!(parse_in_range("n", "21", FIB_N).is_err());
    }

    #[test]
    fn coins_parse() {
        assert_eq!(parse_coins("1, 2,5"), Ok(vec![1, 2, 5]));
        assert!(parse_coins("1,1").is_err());
        assert!(parse_coins("0,2").is_err());
        assert!(parse_coins("").is_err());
        assert!(parse_coins("1,2,3,4,5,6,7,8,9,10,11").is_err());
    }

    #[test]
    fn words_are_normalized() {
        assert_eq!(parse_word(" Cat "), Ok("cat".to_string()));
        assert!(parse_word("c4t").is_err());
        assert!(parse_word("").is_err());
        assert!(parse_word(&"a".repeat(MAX_WORD_LEN + 1)).is_err());
        assert_eq!(parse_prefix(""), Ok(String::new()));
    }

    #[test]
    fn array_size_bounds() {
        assert!(check_array_size(4).is_err());
        assert_eq!(check_array_size(5), Ok(5));
        assert_eq!(check_array_size(30), Ok(30));
        assert!(check_array_size(31).is_err());
    }

    #[test]
    fn ascending_check() {
        assert!(check_ascending(&[1, 2, 2, 9]).is_ok());
        assert!(check_ascending(&[]).is_ok());
        assert!(check_ascending(&[3, 1]).is_err());
    }
}
