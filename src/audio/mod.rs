// Audio module - microphone transport, sample history and loudness

pub mod capture;
pub mod level;
pub mod ring_buffer;

// Re-export commonly used types for convenience
pub use capture::{AudioCapture, Microphone};
pub use level::rms;
pub use ring_buffer::RingBuffer;
