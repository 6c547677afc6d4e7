//! FT8 message codec, channel codec and DSP front-end.
//!
//! This crate implements the CORE of an FT8 weak-signal receiver/transmitter:
//! packing and unpacking the 77-bit message payload ([`message`]), framing it
//! through CRC-14 and LDPC(174,91) ([`crc`], [`ldpc`]) into 79 Costas-synced
//! 8-FSK symbols ([`symbol`]), and recovering those symbols from a raw audio
//! signal via spectral synchronization and soft demodulation ([`sync`]).
//! [`decoder`] ties the pipeline together end to end.

extern crate alloc;

pub mod crc;
pub mod ldpc;
pub mod message;
pub mod symbol;
pub mod sync;
pub mod decoder;
pub mod tracing_init;
pub mod simulation;

pub use message::{encode, decode};
pub use decoder::{decode_ft8, DecodedMessage, DecoderConfig};
