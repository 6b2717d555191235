use serde::{Deserialize, Serialize};

/// Playback state of a player. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// No frames loaded
    #[default]
    Empty,
    /// Frames loaded, playback not running (never started, reset, or stepped)
    Stopped,
    /// Timer is advancing the position
    Playing,
    /// Playback was started and then explicitly paused
    Paused,
    /// Position is on the last frame and playback has stopped
    Complete,
}

impl PlaybackState {
    /// Get the name of this playback state
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Complete => "complete",
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Check if `play` would start the timer from this state
    #[inline]
    pub fn can_play(&self) -> bool {
        matches!(self, Self::Stopped | Self::Paused)
    }

    /// Check if the player can be paused
    #[inline]
    pub fn can_pause(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl From<&str> for PlaybackState {
    fn from(s: &str) -> Self {
        match s {
            "stopped" => Self::Stopped,
            "playing" => Self::Playing,
            "paused" => Self::Paused,
            "complete" => Self::Complete,
            _ => Self::Empty,
        }
    }
}
