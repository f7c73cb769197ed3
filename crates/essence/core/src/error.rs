//! Common error infrastructure for essence-core.
//!
//! Domain-specific errors (`AbilityError`, `PassiveError`, `PedestalError`,
//! `BalanceError`) live next to the operations that raise them. They share the
//! classification defined here so hosts can pick a handling strategy without
//! matching on every variant.

/// How a failed request should be handled by the host.
///
/// Recoverable and validation errors are answers to the player who issued the
/// request (on cooldown, not enough essence, not the owner). Internal and
/// fatal errors mean a collaborator or the storage layer misbehaved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// The same request may succeed later.
    Recoverable,
    /// The request is invalid as issued.
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    /// Whether the error should be shown to the player rather than logged as
    /// an operator problem.
    pub const fn is_player_facing(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }
}

/// Common trait for all essence-core errors.
///
/// `error_code` values are stable upper-case identifiers, e.g.
/// `ABILITY_ON_COOLDOWN`.
pub trait EssenceError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_request_errors_are_player_facing() {
        assert!(ErrorSeverity::Recoverable.is_player_facing());
        assert!(ErrorSeverity::Validation.is_player_facing());
        assert!(!ErrorSeverity::Internal.is_player_facing());
        assert_eq!(ErrorSeverity::Fatal.to_string(), "fatal");
    }
}
