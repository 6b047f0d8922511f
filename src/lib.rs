// Library interface for race-replay
// This allows integration tests and benches to access internal modules

pub mod api;
pub mod errors;
pub mod replay;
pub mod session;

// Re-export commonly used types
pub use api::{HttpReplayApi, LoaderEvent, ReplayApi, SessionLoader};
pub use errors::ReplayError;
pub use replay::{PlaybackClock, ReplayState, Standing, ViewLayout, ViewTransform};
pub use session::{Frame, RoundInfo, Session, SessionRequest, SessionType, Track};
