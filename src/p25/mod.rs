//! Frame families of the P25 air interface: trunking signalling blocks,
//! terminator link control, voice header codewords, and DFSI V.24 frames.

pub mod dfsi;
pub mod fields;
pub mod tdulc;
pub mod tsbk;
pub mod voice;
