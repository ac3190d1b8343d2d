//! Audio I/O modules
//!
//! Sample containers and (with the `decode` feature) file decoding via Symphonia.

#[cfg(feature = "decode")]
pub mod decoder;
pub mod sample_buffer;
