//! Payout request validation.
//!
//! An instructor may withdraw any positive amount up to their current
//! ledger balance. Validation is pure; the atomic debit-and-record write
//! is the balance store's job.

use rust_decimal::Decimal;

/// Errors that reject a payout request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayoutError {
    /// The requested amount must be strictly positive.
    #[error("payout amount must be greater than zero, got {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: Decimal,
    },

    /// The requested amount exceeds the available balance.
    #[error("cannot pay out {requested}: only {available} available")]
    InsufficientBalance {
        /// The amount that was requested.
        requested: Decimal,
        /// The balance available at the time of the request.
        available: Decimal,
    },
}

/// Validate a payout of `amount` against the current `balance`.
///
/// Returns `Ok(())` when the payout may proceed. The caller must hold
/// the balance row lock so the validated balance cannot move before the
/// debit lands.
pub fn validate(balance: Decimal, amount: Decimal) -> Result<(), PayoutError> {
    if amount <= Decimal::ZERO {
        return Err(PayoutError::InvalidAmount { amount });
    }
    if amount > balance {
        return Err(PayoutError::InsufficientBalance {
            requested: amount,
            available: balance,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_amount_is_invalid() {
        let result = validate(Decimal::new(100, 0), Decimal::ZERO);
        assert_eq!(
            result,
            Err(PayoutError::InvalidAmount {
                amount: Decimal::ZERO
            })
        );
    }

    #[test]
    fn negative_amount_is_invalid() {
        let result = validate(Decimal::new(100, 0), Decimal::new(-40, 0));
        assert!(matches!(result, Err(PayoutError::InvalidAmount { .. })));
    }

    #[test]
    fn overdraw_is_rejected_with_both_figures() {
        let result = validate(Decimal::new(100, 0), Decimal::new(150, 0));
        assert_eq!(
            result,
            Err(PayoutError::InsufficientBalance {
                requested: Decimal::new(150, 0),
                available: Decimal::new(100, 0),
            })
        );
    }

    #[test]
    fn amount_within_balance_passes() {
        assert!(validate(Decimal::new(100, 0), Decimal::new(40, 0)).is_ok());
    }

    #[test]
    fn full_balance_withdrawal_passes() {
        assert!(validate(Decimal::new(100, 0), Decimal::new(100, 0)).is_ok());
    }
}
