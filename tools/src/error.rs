use common::ShareMathError;
use solana_sdk::pubkey::Pubkey;

/// Errors that can occur while planning or building a direct withdrawal
#[derive(Debug, thiserror::Error)]
pub enum WithdrawError {
    /// The strategies together hold less than the requested amount
    #[error(
        "Insufficient liquidity: requested {requested}, available {available}, short by {shortfall}"
    )]
    InsufficientLiquidity {
        requested: u64,
        available: u64,
        shortfall: u64,
    },
    /// A strategy's position value could not be read
    #[error("Position unavailable for strategy {strategy}: {reason}")]
    PositionUnavailable { strategy: Pubkey, reason: String },
    /// An account owned by an external protocol could not be read or decoded
    #[error("External state unavailable for {account}: {reason}")]
    ExternalStateUnavailable { account: Pubkey, reason: String },
    /// A strategy names a protocol with no account resolver
    #[error("Unsupported protocol type: {0}")]
    UnsupportedProtocolType(String),
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    /// Vault bookkeeping is inconsistent
    #[error("Invalid vault state: {0}")]
    InvalidState(String),
    /// The external protocol has nothing deployed that could be withdrawn
    #[error("No eligible sub-market with a nonzero allocation for strategy {strategy}")]
    NoEligibleSubMarket { strategy: Pubkey },
    /// The vault is not configured for direct withdrawal
    #[error("Vault {0} does not support direct withdrawal")]
    DirectWithdrawUnsupported(Pubkey),
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl WithdrawError {
    /// Transient read failures that a caller may retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WithdrawError::PositionUnavailable { .. }
                | WithdrawError::ExternalStateUnavailable { .. }
                | WithdrawError::Rpc(_)
        )
    }

    /// Conditions to show the requesting user as an actionable message.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            WithdrawError::InsufficientLiquidity { .. } | WithdrawError::NoEligibleSubMarket { .. }
        )
    }

    /// Configuration or data-integrity incidents that operators must hear about.
    pub fn requires_operator_alert(&self) -> bool {
        matches!(
            self,
            WithdrawError::UnsupportedProtocolType(_)
                | WithdrawError::InvalidState(_)
                | WithdrawError::ArithmeticOverflow
                | WithdrawError::Config(_)
        )
    }
}

impl From<ShareMathError> for WithdrawError {
    fn from(err: ShareMathError) -> Self {
        match err {
            ShareMathError::ArithmeticOverflow => WithdrawError::ArithmeticOverflow,
            ShareMathError::InvalidState(reason) => WithdrawError::InvalidState(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_is_disjoint() {
        let errors = vec![
            WithdrawError::InsufficientLiquidity {
                requested: 10,
                available: 5,
                shortfall: 5,
            },
            WithdrawError::PositionUnavailable {
                strategy: Pubkey::new_unique(),
                reason: "not found".to_string(),
            },
            WithdrawError::ExternalStateUnavailable {
                account: Pubkey::new_unique(),
                reason: "decode".to_string(),
            },
            WithdrawError::UnsupportedProtocolType("solend".to_string()),
            WithdrawError::ArithmeticOverflow,
            WithdrawError::InvalidState("supply".to_string()),
            WithdrawError::NoEligibleSubMarket {
                strategy: Pubkey::new_unique(),
            },
        ];

        for err in errors {
            let classes = [
                err.is_retryable(),
                err.is_user_facing(),
                err.requires_operator_alert(),
            ];
            assert_eq!(classes.iter().filter(|c| **c).count(), 1, "{err}");
        }
    }

    #[test]
    fn test_share_math_errors_convert() {
        let err: WithdrawError = ShareMathError::InvalidState("zero supply".to_string()).into();
        assert!(matches!(err, WithdrawError::InvalidState(_)));
        let err: WithdrawError = ShareMathError::ArithmeticOverflow.into();
        assert!(matches!(err, WithdrawError::ArithmeticOverflow));
    }

    #[test]
    fn test_shortfall_in_message() {
        let err = WithdrawError::InsufficientLiquidity {
            requested: 1001,
            available: 1000,
            shortfall: 1,
        };
        assert!(err.to_string().contains("short by 1"));
    }
}
