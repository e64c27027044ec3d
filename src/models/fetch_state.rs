use crate::error::FetchError;

/// Load state of one index, as seen by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<P> {
    /// The index is outside the hot window.
    NotRequested,
    /// A fetch for the index's identifier is in flight.
    Pending,
    Ready(P),
    Failed(FetchError),
}

impl<P> FetchState<P> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn payload(&self) -> Option<&P> {
        match self {
            Self::Ready(p) => Some(p),
            _ => None,
        }
    }

    /// Short label for logs and the command line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotRequested => "not-requested",
            Self::Pending => "pending",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}
