//! Error infrastructure for boss-core.
//!
//! Every failure of a single action is reported through [`ActionError`]. Errors are
//! grouped by [`ErrorKind`] so callers can decide whether to notify the actor, and
//! carry a stable [`ActionError::reason_code`] for transports that only forward a
//! short string.
//!
//! Cooldown blocks are deliberately not errors; see
//! [`crate::combat::ActionOutcome::CooldownBlocked`].

use crate::env::StoreError;

/// Classification of an [`ActionError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// Malformed input (unknown action, bad amount). Rejected before any mutation.
    Validation,

    /// Input is well formed but the game is not in a state that allows it.
    ///
    /// Examples: charged attack during silence, totem strike with no totem.
    Precondition,

    /// The player store failed. The action was aborted without touching the boss.
    Store,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Precondition => "precondition",
            Self::Store => "store",
        }
    }

    /// Returns true if retrying the same input later could succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Precondition | Self::Store)
    }
}

/// Caller-visible failure of one action. No state was changed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("unknown action `{0}`")]
    UnknownAction(String),

    #[error("invalid amount {0}")]
    InvalidAmount(i64),

    #[error("player `{0}` not found")]
    UnknownPlayer(String),

    #[error("username is required")]
    MissingUsername,

    #[error("game is paused")]
    Paused,

    #[error("charged attacks are disabled while silence is active")]
    Silenced,

    #[error("no totem is active")]
    TotemInactive,

    #[error("`{actor}` is not allowed to run `{command}`")]
    Forbidden {
        actor: String,
        command: &'static str,
    },

    #[error("player store failure: {0}")]
    Store(#[from] StoreError),
}

impl ActionError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownAction(_)
            | Self::InvalidAmount(_)
            | Self::UnknownPlayer(_)
            | Self::MissingUsername => ErrorKind::Validation,
            Self::Paused | Self::Silenced | Self::TotemInactive | Self::Forbidden { .. } => {
                ErrorKind::Precondition
            }
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Short stable identifier forwarded to transports.
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::UnknownAction(_) => "unknown_action",
            Self::InvalidAmount(_) => "invalid_amount",
            Self::UnknownPlayer(_) => "unknown_player",
            Self::MissingUsername => "missing_username",
            Self::Paused => "paused",
            Self::Silenced => "silenced",
            Self::TotemInactive => "totem_inactive",
            Self::Forbidden { .. } => "forbidden",
            Self::Store(_) => "store_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_codes_follow_kind() {
        assert_eq!(ActionError::Silenced.kind(), ErrorKind::Precondition);
        assert_eq!(ActionError::Silenced.reason_code(), "silenced");
        assert_eq!(
            ActionError::UnknownAction("dance".into()).kind(),
            ErrorKind::Validation
        );

        let store = ActionError::from(StoreError::Unavailable("disk full".into()));
        assert_eq!(store.kind(), ErrorKind::Store);
        assert_eq!(store.reason_code(), "store_unavailable");
        assert!(store.kind().is_transient());
    }
}
