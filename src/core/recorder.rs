use crate::capture::{FrameSource, Region};
use crate::core::frame_pool::FramePool;
use crate::core::ledger::Ledger;
use crate::error::RecorderError;
use crate::sync::{RunClock, StepPacer};
use crate::utils::logger;

/// Parameters for one recording run.
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    pub max_duration_ms: u64,
    pub step_ms: u64,
}

/// Runs the change-detection loop: sample the region every `step_ms`
/// milliseconds and retain a frame only when it differs byte-for-byte from
/// the previously retained one, until `max_duration_ms` of run time has
/// elapsed. `max_duration_ms = 0` yields a one-frame ledger.
///
/// The first frame is always retained (id 0, timestamped with its own
/// capture latency). On a fatal error the ledger accumulated so far is
/// released before the error propagates.
pub fn record<S: FrameSource>(
    source: &S,
    region: &Region,
    params: RunParams,
) -> Result<Ledger, RecorderError> {
    let mut ledger = Ledger::new();
    match run_loop(source, region, params, &mut ledger) {
        Ok(()) => Ok(ledger),
        Err(e) => {
            ledger.clear();
            Err(e)
        }
    }
}

fn run_loop<S: FrameSource>(
    source: &S,
    region: &Region,
    params: RunParams,
    ledger: &mut Ledger,
) -> Result<(), RecorderError> {
    let run_clock = RunClock::start();
    let mut iter_clock = RunClock::start();

    // The first sample is kept unconditionally; its timestamp is the
    // capture latency itself.
    let first = source.capture(region)?;
    let mut pool = FramePool::new(&first)?;
    ledger.append(first, iter_clock.elapsed_ms());

    // Prime the comparison baseline from a second capture; not retained.
    let baseline = source.capture(region)?;
    pool.load_last(&baseline)?;
    drop(baseline);

    let mut pacer = StepPacer::from_millis(params.step_ms);
    pacer.pace(iter_clock.elapsed());

    while run_clock.elapsed_ms() <= params.max_duration_ms as f64 {
        iter_clock.restart();

        let handle = source.capture(region)?;
        pool.load_current(&handle)?;

        if pool.matches() {
            // Redundant sample: release it on the spot.
            drop(handle);
        } else {
            ledger.append(handle, run_clock.elapsed_ms());
            pool.swap();
        }

        // Whatever comparison and bookkeeping cost, take it out of the step
        // budget before sleeping.
        pacer.pace(iter_clock.elapsed());
    }

    let stats = pacer.stats();
    logger::debug(&format!(
        "run done: kept {} of {} samples over {:.1}ms, {} step overruns",
        ledger.len(),
        stats.iterations,
        run_clock.elapsed_ms(),
        stats.overruns
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FrameHandle;
    use std::cell::RefCell;

    const W: u32 = 4;
    const H: u32 = 2;

    fn solid(value: u8) -> Vec<u8> {
        vec![value; (W * H * 4) as usize]
    }

    fn region() -> Region {
        Region::new(0, 0, W, H)
    }

    /// Replays a fixed script of frames, repeating the last one forever.
    struct ScriptedSource {
        frames: Vec<Vec<u8>>,
        cursor: RefCell<usize>,
    }

    impl ScriptedSource {
        fn new(frames: Vec<Vec<u8>>) -> Self {
            Self {
                frames,
                cursor: RefCell::new(0),
            }
        }
    }

    impl FrameSource for ScriptedSource {
        fn bounds(&self) -> (u32, u32) {
            (W, H)
        }

        fn capture(&self, _region: &Region) -> Result<FrameHandle, RecorderError> {
            let mut cursor = self.cursor.borrow_mut();
            let idx = (*cursor).min(self.frames.len() - 1);
            *cursor += 1;
            FrameHandle::from_raw(W, H, self.frames[idx].clone())
        }
    }

    /// Succeeds `good` times, then reports the display as gone.
    struct FlakySource {
        good: usize,
        cursor: RefCell<usize>,
    }

    impl FrameSource for FlakySource {
        fn bounds(&self) -> (u32, u32) {
            (W, H)
        }

        fn capture(&self, _region: &Region) -> Result<FrameHandle, RecorderError> {
            let mut cursor = self.cursor.borrow_mut();
            if *cursor >= self.good {
                return Err(RecorderError::Capture("display went away".to_string()));
            }
            *cursor += 1;
            FrameHandle::from_raw(W, H, solid(*cursor as u8))
        }
    }

    #[test]
    fn identical_frames_keep_only_the_first() {
        let source = ScriptedSource::new(vec![solid(7)]);
        let params = RunParams {
            max_duration_ms: 100,
            step_ms: 20,
        };

        let ledger = record(&source, &region(), params).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.get(0).unwrap().id(), 0);
        assert!(ledger.get(0).unwrap().timestamp_ms() >= 0.0);
    }

    #[test]
    fn zero_duration_still_keeps_the_initial_frame() {
        let source = ScriptedSource::new(vec![solid(1)]);
        let params = RunParams {
            max_duration_ms: 0,
            step_ms: 50,
        };

        let ledger = record(&source, &region(), params).unwrap();
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn alternating_frames_are_kept_in_time_order() {
        // Captures go: initial A, baseline A, then B A B A ...
        let mut frames = vec![solid(0), solid(0)];
        for i in 0..32 {
            frames.push(solid(if i % 2 == 0 { 255 } else { 0 }));
        }
        let source = ScriptedSource::new(frames);
        let params = RunParams {
            max_duration_ms: 90,
            step_ms: 20,
        };

        let ledger = record(&source, &region(), params).unwrap();
        // every loop sample differs from its predecessor, so each of the
        // ~4 iterations retains; leave slack for scheduler jitter
        assert!(ledger.len() >= 3, "kept {} frames", ledger.len());

        for (k, entry) in ledger.iter().enumerate() {
            assert_eq!(entry.id(), k);
        }

        let stamps: Vec<f64> = ledger.iter().map(|f| f.timestamp_ms()).collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]), "{:?}", stamps);

        // no two consecutive retained frames share content
        let payloads: Vec<Vec<u8>> = ledger
            .iter()
            .map(|f| f.frame().unwrap().bytes().to_vec())
            .collect();
        assert!(payloads.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn a_single_change_is_kept_once() {
        // A A A A ... then a lasting switch to B
        let mut frames = vec![solid(0); 4];
        frames.push(solid(200));
        let source = ScriptedSource::new(frames);
        let params = RunParams {
            max_duration_ms: 120,
            step_ms: 15,
        };

        let ledger = record(&source, &region(), params).unwrap();
        // initial frame plus exactly one retained change
        assert_eq!(ledger.len(), 2);
        assert_ne!(
            ledger.get(0).unwrap().frame().unwrap().bytes(),
            ledger.get(1).unwrap().frame().unwrap().bytes()
        );
    }

    #[test]
    fn capture_failure_aborts_the_run() {
        let source = FlakySource {
            good: 4,
            cursor: RefCell::new(0),
        };
        let params = RunParams {
            max_duration_ms: 500,
            step_ms: 10,
        };

        let err = record(&source, &region(), params).unwrap_err();
        assert!(matches!(err, RecorderError::Capture(_)));
    }

    #[test]
    fn immediate_capture_failure_propagates() {
        let source = FlakySource {
            good: 0,
            cursor: RefCell::new(0),
        };
        let params = RunParams {
            max_duration_ms: 0,
            step_ms: 10,
        };

        assert!(record(&source, &region(), params).is_err());
    }
}
