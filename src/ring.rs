use std::sync::Mutex;

/// Number of retained waveform slots (ten screens of 480 samples).
pub const RING_CAPACITY: usize = 480 * 10;
/// Only every Nth captured sample is kept; the rest are discarded.
pub const DECIMATION_FACTOR: usize = 100;

struct RingState {
    slots: Vec<f32>,
    cursor: usize,
    decimation_counter: usize,
}

/// Fixed-capacity circular buffer of recent amplitude values.
///
/// Written by the capture thread, read by the render thread. Both go through
/// the internal lock, so a snapshot never observes a half-applied batch. The
/// slot values live in the signed-16-bit PCM domain, stored as `f32` for
/// direct use as vertex data.
pub struct SampleRing {
    state: Mutex<RingState>,
    capacity: usize,
    decimation: usize,
}

impl SampleRing {
    pub fn new(capacity: usize, decimation: usize) -> Result<Self, String> {
        if capacity == 0 {
            return Err("ring capacity must be at least 1".to_string());
        }
        if decimation == 0 {
            return Err("decimation factor must be at least 1".to_string());
        }
        Ok(Self {
            state: Mutex::new(RingState {
                slots: vec![0.0; capacity],
                cursor: 0,
                decimation_counter: 0,
            }),
            capacity,
            decimation,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends a batch of raw samples, keeping every Nth one and overwriting
    /// the oldest slot. The lock is held for the whole batch.
    pub fn append(&self, raw: &[f32]) {
        if raw.is_empty() {
            return;
        }
        let mut state = self.state.lock().expect("sample ring poisoned");
        for &sample in raw {
            state.decimation_counter = (state.decimation_counter + 1) % self.decimation;
            if state.decimation_counter == 0 {
                let cursor = state.cursor;
                state.slots[cursor] = sample;
                state.cursor = (cursor + 1) % self.capacity;
            }
        }
    }

    /// Consistent copy of the slots together with the write cursor. The
    /// cursor is the next slot to be overwritten; the slot just before it is
    /// the newest sample, the slot right after it the oldest.
    pub fn snapshot(&self) -> (Vec<f32>, usize) {
        let state = self.state.lock().expect("sample ring poisoned");
        (state.slots.clone(), state.cursor)
    }
}
