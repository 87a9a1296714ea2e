//! Reading Model and History Buffer
//!
//! Provides the immutable `Reading` value shared by every stage of the
//! pipeline and the bounded `RingBuffer` the detector conditions on.

mod buffer;
mod reading;

pub use buffer::{RingBuffer, DEFAULT_CAPACITY};
pub use reading::{AnnotatedReading, Reading, SensorBlock};
