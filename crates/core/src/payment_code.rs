//! One-off payment codes handed to clients for custom work.

use rand::Rng;

use crate::error::CoreError;

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

/// Attempts at drawing an unused code before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 20;

/// Draw a random six-digit code. Uniqueness is checked by the caller against storage.
pub fn generate_code() -> String {
    rand::rng().random_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Exactly six ASCII digits with no leading zero.
pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) && !code.starts_with('0')
}

/// Outcome of looking a code up before verification or checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionCheck {
    NotFound,
    AlreadyUsed,
    Redeemable,
}

impl RedemptionCheck {
    /// Classify a lookup result; `None` means no row matched the code.
    pub fn from_lookup(is_used: Option<bool>) -> Self {
        match is_used {
            None => Self::NotFound,
            Some(true) => Self::AlreadyUsed,
            Some(false) => Self::Redeemable,
        }
    }

    /// Verification distinguishes unknown (404) from already used (400).
    pub fn for_verify(self, code: &str) -> Result<(), CoreError> {
        match self {
            Self::NotFound => Err(CoreError::not_found("PaymentCode", code)),
            Self::AlreadyUsed => Err(CoreError::Validation(
                "Payment code has already been used".into(),
            )),
            Self::Redeemable => Ok(()),
        }
    }

    /// Checkout collapses both failures into a single 400.
    pub fn for_checkout(self) -> Result<(), CoreError> {
        match self {
            Self::Redeemable => Ok(()),
            _ => Err(CoreError::Validation(
                "Payment code is invalid or already used".into(),
            )),
        }
    }
}

/// Checkout description used when the code carries none.
pub fn default_description(code: &str) -> String {
    format!("Pagamento BragaWork - Código {code}")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn generated_codes_are_six_digits_in_range() {
        for _ in 0..200 {
            let code = generate_code();
            assert!(is_valid_code_format(&code), "{code}");
            let n: u32 = code.parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&n));
        }
    }

    #[test]
    fn code_format_rejects_malformed_input() {
        assert!(is_valid_code_format("123456"));
        assert!(!is_valid_code_format("12345"));
        assert!(!is_valid_code_format("1234567"));
        assert!(!is_valid_code_format("12a456"));
        assert!(!is_valid_code_format("012345"));
        assert!(!is_valid_code_format(" 23456"));
    }

    #[test]
    fn verify_distinguishes_missing_from_used() {
        assert_matches!(
            RedemptionCheck::from_lookup(None).for_verify("123456"),
            Err(CoreError::NotFound { entity: "PaymentCode", .. })
        );
        assert_matches!(
            RedemptionCheck::from_lookup(Some(true)).for_verify("123456"),
            Err(CoreError::Validation(_))
        );
        assert!(RedemptionCheck::from_lookup(Some(false)).for_verify("123456").is_ok());
    }

    #[test]
    fn checkout_rejects_missing_and_used_alike() {
        assert_matches!(
            RedemptionCheck::NotFound.for_checkout(),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            RedemptionCheck::AlreadyUsed.for_checkout(),
            Err(CoreError::Validation(_))
        );
        assert!(RedemptionCheck::Redeemable.for_checkout().is_ok());
    }
}
