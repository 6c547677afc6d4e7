//! Synthetic FT8 signal generation for testing and calibration.
//!
//! Not part of the receive/transmit pipeline itself; used to build
//! realistic test signals (band noise, fading, flutter) for exercising
//! the decoder end to end without a real recording.

pub mod noise;
