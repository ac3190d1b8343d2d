//! Feature extraction modules
//!
//! The rhythm pipeline stages, in order:
//! - Onset envelope (spectral flux)
//! - Period estimation (tempo)
//! - Beat tracking (dynamic programming)
//! - Downbeat and meter inference (Viterbi)

pub mod beat_tracking;
pub mod downbeat;
pub mod onset;
pub mod period;
