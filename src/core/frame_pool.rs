use crate::capture::FrameHandle;
use crate::error::RecorderError;

/// Double-buffered frame-equality engine.
///
/// Holds exactly two equally sized pixel buffers, `last` and `current`.
/// Every sample is loaded into `current` and byte-compared against `last`;
/// when a change is retained the roles are swapped instead of copying a
/// whole frame.
pub struct FramePool {
    last: Vec<u8>,
    current: Vec<u8>,
    frame_len: usize,
}

impl FramePool {
    /// Sizes both buffers from a reference frame.
    pub fn new(reference: &FrameHandle) -> Result<Self, RecorderError> {
        let frame_len = reference.byte_len();
        if frame_len == 0 {
            return Err(RecorderError::Allocation(
                "reference frame is empty".to_string(),
            ));
        }

        Ok(Self {
            last: vec![0; frame_len],
            current: vec![0; frame_len],
            frame_len,
        })
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Loads a frame into the comparison baseline.
    pub fn load_last(&mut self, frame: &FrameHandle) -> Result<(), RecorderError> {
        Self::load(&mut self.last, self.frame_len, frame)
    }

    /// Loads a frame into the current slot.
    pub fn load_current(&mut self, frame: &FrameHandle) -> Result<(), RecorderError> {
        Self::load(&mut self.current, self.frame_len, frame)
    }

    fn load(slot: &mut [u8], frame_len: usize, frame: &FrameHandle) -> Result<(), RecorderError> {
        // Frames are sized by the region at capture time; a mismatch here is
        // a defect, not a runtime condition.
        if frame.byte_len() != frame_len {
            return Err(RecorderError::Internal(format!(
                "frame of {} bytes does not fit pool buffers of {} bytes",
                frame.byte_len(),
                frame_len
            )));
        }
        slot.copy_from_slice(frame.bytes());
        Ok(())
    }

    /// Byte equality of the two slots.
    pub fn matches(&self) -> bool {
        self.last == self.current
    }

    /// Exchanges the buffer roles in O(1), no pixel data is copied.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.last, &mut self.current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(value: u8) -> FrameHandle {
        FrameHandle::from_raw(2, 2, vec![value; 16]).unwrap()
    }

    #[test]
    fn empty_reference_is_an_allocation_error() {
        let empty = FrameHandle::from_raw(0, 0, Vec::new()).unwrap();
        assert!(matches!(
            FramePool::new(&empty),
            Err(RecorderError::Allocation(_))
        ));
    }

    #[test]
    fn matches_compares_bytes() {
        let mut pool = FramePool::new(&frame(0)).unwrap();
        assert_eq!(pool.frame_len(), 16);
        pool.load_last(&frame(1)).unwrap();
        pool.load_current(&frame(1)).unwrap();
        assert!(pool.matches());

        pool.load_current(&frame(2)).unwrap();
        assert!(!pool.matches());
    }

    #[test]
    fn swap_exchanges_roles() {
        let mut pool = FramePool::new(&frame(0)).unwrap();
        pool.load_last(&frame(1)).unwrap();
        pool.load_current(&frame(2)).unwrap();
        pool.swap();

        // the old current is the new baseline
        pool.load_current(&frame(2)).unwrap();
        assert!(pool.matches());
    }

    #[test]
    fn size_mismatch_is_an_internal_error() {
        let mut pool = FramePool::new(&frame(0)).unwrap();
        let small = FrameHandle::from_raw(1, 1, vec![0; 4]).unwrap();
        assert!(matches!(
            pool.load_current(&small),
            Err(RecorderError::Internal(_))
        ));
    }
}
