//! Solution file codecs.

mod sln;

pub use sln::{SlnCodec, SlnError};
