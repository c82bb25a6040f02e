//! Account field validation rules.

use super::error::AccountError;
use super::types::{AccountNature, AccountType};

/// Maximum length of an account code.
pub const MAX_CODE_LEN: usize = 20;

/// Validates an account code: non-empty, at most [`MAX_CODE_LEN`] characters,
/// uppercase alphanumeric plus `.` and `-`.
///
/// # Errors
///
/// Returns an error describing the first violated constraint.
pub fn validate_code(code: &str) -> Result<(), AccountError> {
    if code.is_empty() {
        return Err(AccountError::EmptyCode);
    }
    if code.len() > MAX_CODE_LEN {
        return Err(AccountError::CodeTooLong {
            code: code.to_string(),
            max: MAX_CODE_LEN,
        });
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(AccountError::InvalidCodeFormat(code.to_string()));
    }
    Ok(())
}

/// Validates that `nature` is consistent with `account_type`.
///
/// Assets and expenses default to debit-normal, the rest to credit-normal.
/// A mismatching nature is accepted only when `override_nature` is set
/// (contra accounts such as accumulated depreciation).
///
/// # Errors
///
/// Returns [`AccountError::NatureMismatch`] on an unoverridden mismatch.
pub fn validate_nature(
    account_type: AccountType,
    nature: AccountNature,
    override_nature: bool,
) -> Result<(), AccountError> {
    if nature != account_type.default_nature() && !override_nature {
        return Err(AccountError::NatureMismatch {
            account_type,
            nature,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1001")]
    #[case("CASH")]
    #[case("1001.01")]
    #[case("AR-TRADE")]
    #[case("A")]
    fn test_valid_codes(#[case] code: &str) {
        assert!(validate_code(code).is_ok());
    }

    #[test]
    fn test_empty_code_rejected() {
        assert!(matches!(validate_code(""), Err(AccountError::EmptyCode)));
    }

    #[test]
    fn test_too_long_code_rejected() {
        let code = "1".repeat(MAX_CODE_LEN + 1);
        assert!(matches!(
            validate_code(&code),
            Err(AccountError::CodeTooLong { .. })
        ));
    }

    #[rstest]
    #[case("cash")] // lowercase
    #[case("10 01")] // whitespace
    #[case("10/01")] // path separator must never appear in a code
    #[case("营业收入")]
    fn test_invalid_code_formats(#[case] code: &str) {
        assert!(matches!(
            validate_code(code),
            Err(AccountError::InvalidCodeFormat(_))
        ));
    }

    #[test]
    fn test_nature_consistency() {
        assert!(validate_nature(AccountType::Asset, AccountNature::Debit, false).is_ok());
        assert!(validate_nature(AccountType::Revenue, AccountNature::Credit, false).is_ok());
        assert!(matches!(
            validate_nature(AccountType::Asset, AccountNature::Credit, false),
            Err(AccountError::NatureMismatch { .. })
        ));
    }

    #[test]
    fn test_nature_override_allows_contra_accounts() {
        // Accumulated depreciation: asset type, credit nature.
        assert!(validate_nature(AccountType::Asset, AccountNature::Credit, true).is_ok());
    }
}
