/// Deadline that freezes while the stream is offline.
///
/// Exactly one representation is live at a time: an absolute deadline while the
/// stream runs, or the remaining duration while it is paused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum Timer {
    Running { ends_at_ms: u64 },
    Paused { remaining_ms: u64 },
}

impl Timer {
    pub fn starting(now_ms: u64, duration_ms: u64) -> Self {
        Self::Running {
            ends_at_ms: now_ms.saturating_add(duration_ms),
        }
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match *self {
            Self::Running { ends_at_ms } => ends_at_ms.saturating_sub(now_ms),
            Self::Paused { remaining_ms } => remaining_ms,
        }
    }

    /// A paused timer never expires.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match *self {
            Self::Running { ends_at_ms } => now_ms >= ends_at_ms,
            Self::Paused { .. } => false,
        }
    }

    pub fn ends_at_ms(&self) -> Option<u64> {
        match *self {
            Self::Running { ends_at_ms } => Some(ends_at_ms),
            Self::Paused { .. } => None,
        }
    }

    #[must_use]
    pub fn paused(self, now_ms: u64) -> Self {
        Self::Paused {
            remaining_ms: self.remaining_ms(now_ms),
        }
    }

    #[must_use]
    pub fn resumed(self, now_ms: u64) -> Self {
        match self {
            Self::Paused { remaining_ms } => Self::starting(now_ms, remaining_ms),
            running => running,
        }
    }
}
