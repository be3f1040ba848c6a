//! Bit-exact frame codecs and forward error correction for P25/NXDN
//! land-mobile-radio gateways.
//!
//! This crate implements the over-the-air signalling layer that sits between
//! a deframed symbol stream and the trunking logic of a gateway: the Golay
//! and Reed-Solomon codecs that repair corrupted codewords, and the
//! fixed-layout message families (TSBK, TDULC, RCCH, DFSI) that interpret
//! and construct the payloads those codewords protect.
//!
//! All operations are synchronous transforms over caller-owned buffers. The
//! only process-wide state is a handful of immutable lookup tables, so every
//! entry point is safe to call from any number of threads.

pub mod bits;
pub mod coding;
pub mod error;
pub mod nxdn;
pub mod p25;

mod layout;

pub use error::{CodecError, Result};
