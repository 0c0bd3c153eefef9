//! Startup-resolved optional collaborators.
//!
//! Model backends such as ASR or translation may be missing in a given
//! deployment. Each one is resolved exactly once while the service boots and
//! stored as a [`Capability`]. Request handlers match on the variant instead of
//! re-probing the backend.

use std::fmt;

/// An optional collaborator: either a ready handle or the reason it is absent.
#[derive(Clone)]
pub enum Capability<T> {
    /// The collaborator loaded and can serve requests.
    Available(T),
    /// The collaborator is not usable for the lifetime of the process.
    Unavailable {
        /// Human-readable explanation, surfaced in logs and error bodies.
        reason: String,
    },
}

impl<T> Capability<T> {
    /// Build an [`Capability::Unavailable`] with the given reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether the collaborator can serve requests.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// Borrow the handle if available.
    pub fn as_available(&self) -> Option<&T> {
        match self {
            Self::Available(handle) => Some(handle),
            Self::Unavailable { .. } => None,
        }
    }

    /// The reason the collaborator is missing, if it is.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Available(_) => None,
            Self::Unavailable { reason } => Some(reason),
        }
    }
}

impl<T> fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(_) => f.write_str("Available"),
            Self::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}
