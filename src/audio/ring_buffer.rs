// RingBuffer - fixed-capacity circular sample store
//
// Holds the most recent `capacity` samples. Writes overwrite the oldest
// sample first and advance an explicit write cursor; nothing is reordered
// on write. Chronological order is reconstructed only on read: the samples
// from the cursor to the end (oldest) followed by the samples before the
// cursor (newest).

/// Circular buffer of audio samples with an explicit write cursor
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Vec<f32>,
    cursor: usize,
    written: u64,
}

impl RingBuffer {
    /// Create a zero-filled ring buffer
    ///
    /// # Panics
    /// Panics if capacity is 0
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be greater than 0");
        Self {
            data: vec![0.0; capacity],
            cursor: 0,
            written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Total samples ever written, including overwritten ones
    pub fn total_written(&self) -> u64 {
        self.written
    }

    /// Whether every slot holds captured audio rather than initial silence
    pub fn is_full(&self) -> bool {
        self.written >= self.data.len() as u64
    }

    /// Append samples in arrival order, overwriting the oldest
    pub fn extend_from_slice(&mut self, samples: &[f32]) {
        let capacity = self.data.len();
        // Only the last `capacity` samples can survive this write
        let skip = samples.len().saturating_sub(capacity);
        if skip > 0 {
            self.cursor = (self.cursor + skip) % capacity;
        }
        let mut remaining = &samples[skip..];

        while !remaining.is_empty() {
            let room = capacity - self.cursor;
            let n = room.min(remaining.len());
            self.data[self.cursor..self.cursor + n].copy_from_slice(&remaining[..n]);
            self.cursor = (self.cursor + n) % capacity;
            remaining = &remaining[n..];
        }

        self.written += samples.len() as u64;
    }

    /// Full buffer contents in chronological order (tail then head)
    pub fn snapshot(&self) -> Vec<f32> {
        let mut window = Vec::with_capacity(self.data.len());
        window.extend_from_slice(&self.data[self.cursor..]);
        window.extend_from_slice(&self.data[..self.cursor]);
        window
    }

    /// The most recent `len` samples in chronological order
    ///
    /// `len` is clamped to the buffer capacity.
    pub fn latest(&self, len: usize) -> Vec<f32> {
        let capacity = self.data.len();
        let len = len.min(capacity);
        let start = (self.cursor + capacity - len) % capacity;

        let mut window = Vec::with_capacity(len);
        if start + len <= capacity {
            window.extend_from_slice(&self.data[start..start + len]);
        } else {
            window.extend_from_slice(&self.data[start..]);
            window.extend_from_slice(&self.data[..len - (capacity - start)]);
        }
        window
    }

    /// Zero the buffer and rewind the cursor
    pub fn clear(&mut self) {
        self.data.iter_mut().for_each(|s| *s = 0.0);
        self.cursor = 0;
        self.written = 0;
    }
}
