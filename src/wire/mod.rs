//! Bit-exact wire serialization of an SVDAG chunk (§4.9).

pub mod codec;

pub use codec::{decode, encode};
