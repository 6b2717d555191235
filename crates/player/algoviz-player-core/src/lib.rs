//! Algoviz Player Core
//!
//! Frame-based playback for algorithm visualizations. A generator produces a
//! [`FrameSequence`] up front; a [`Player`] then walks it under transport
//! control (play/pause/step/seek/speed) and hands every frame it lands on to a
//! [`FrameListener`]. Rendering is left entirely to the listener.
//!
//! [`Transport`] is the timer-free state machine underneath [`Player`]; hosts
//! that already run a frame loop can drive it with [`Transport::tick`].

pub mod config;
pub mod error;
pub mod events;
pub mod frame;
pub mod ids;
pub mod listener;
pub mod player;
pub mod state;
pub mod transport;

// Re-exports for consumers (generators, hosts)
pub use config::PlayerConfig;
pub use error::PlayerError;
pub use events::{EventQueue, PlayerEvent};
pub use frame::{Frame, FrameRecorder, FrameSequence};
pub use ids::PlayerId;
pub use listener::{FrameListener, NoopListener};
pub use player::Player;
pub use state::PlaybackState;
pub use transport::Transport;

/// Player result type
pub type Result<T> = core::result::Result<T, PlayerError>;
