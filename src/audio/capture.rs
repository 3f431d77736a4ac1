// Capture - microphone seam and lock-free sample transport
//
// The platform audio callback owns the producer half of an SPSC ring
// (rtrb) and pushes mono f32 samples as they arrive. The scoring pipeline
// owns the consumer half and drains it into its RingBuffer at each poll or
// tick, preserving arrival order. Dropping the AudioCapture abandons the
// queue, which is how sensor implementations learn the round released them.

use async_trait::async_trait;
use rtrb::{Consumer, Producer};

use crate::audio::ring_buffer::RingBuffer;
use crate::error::RoundError;

/// Consumer side of a live microphone stream
pub struct AudioCapture {
    sample_rate: u32,
    consumer: Consumer<f32>,
}

impl AudioCapture {
    /// Create a capture together with the producer a sensor callback feeds
    ///
    /// # Arguments
    /// * `sample_rate` - Rate of the samples the producer will push
    /// * `capacity` - Samples the queue can hold before pushes start failing
    pub fn channel(sample_rate: u32, capacity: usize) -> (Producer<f32>, AudioCapture) {
        let (producer, consumer) = rtrb::RingBuffer::new(capacity.max(1));
        (
            producer,
            AudioCapture {
                sample_rate,
                consumer,
            },
        )
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Samples waiting in the queue
    pub fn pending(&self) -> usize {
        self.consumer.slots()
    }

    /// Move every queued sample into `ring` in arrival order
    ///
    /// # Returns
    /// Number of samples moved
    pub fn drain_into(&mut self, ring: &mut RingBuffer) -> usize {
        let available = self.consumer.slots();
        if available == 0 {
            return 0;
        }

        match self.consumer.read_chunk(available) {
            Ok(chunk) => {
                let (first, second) = chunk.as_slices();
                ring.extend_from_slice(first);
                ring.extend_from_slice(second);
                chunk.commit_all();
                available
            }
            Err(err) => {
                tracing::warn!("[AudioCapture] Failed to read queued samples: {}", err);
                0
            }
        }
    }

    /// Whether the sensor side stopped producing
    pub fn is_source_closed(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

/// Microphone access, implemented by the embedding platform
///
/// `open` must ask for permission when the platform requires it and map a
/// refusal to [`RoundError::PermissionDenied`].
#[async_trait]
pub trait Microphone: Send + Sync {
    async fn open(&self, sample_rate: u32, capacity: usize) -> Result<AudioCapture, RoundError>;
}
