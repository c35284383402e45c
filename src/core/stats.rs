use crate::core::ledger::Ledger;
use crate::error::RecorderError;

/// Running statistics over operator-selected ledger ranges.
///
/// Each accepted selection keeps the elapsed-time delta between its
/// endpoints; the mean is recomputed on every append and survives across
/// runs until the operator resets it.
#[derive(Default)]
pub struct RunningStats {
    durations: Vec<f64>,
    mean: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self {
            durations: Vec::new(),
            mean: 0.0,
        }
    }

    /// Validates the closed index range `[start, end]` against the ledger,
    /// keeps `t[end] - t[start]` and recomputes the mean. Invalid pairs
    /// leave the kept durations untouched. Returns the delta that was kept.
    pub fn select_range(
        &mut self,
        start: usize,
        end: usize,
        ledger: &Ledger,
    ) -> Result<f64, RecorderError> {
        let len = ledger.len();
        if start > end || end >= len {
            return Err(RecorderError::Range { start, end, len });
        }

        let delta = match (ledger.timestamp_at(start), ledger.timestamp_at(end)) {
            (Some(s), Some(e)) => e - s,
            _ => return Err(RecorderError::Range { start, end, len }),
        };

        self.durations.push(delta);
        self.mean = self.durations.iter().sum::<f64>() / self.durations.len() as f64;
        Ok(delta)
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// Clears all kept durations. Idempotent.
    pub fn reset(&mut self) {
        self.durations.clear();
        self.mean = 0.0;
    }

    /// Report in the original tool's form: the kept times, then the mean.
    pub fn report(&self) -> String {
        let times = self
            .durations
            .iter()
            .map(|d| format!("{:.3}", d))
            .collect::<Vec<_>>()
            .join(" ");
        format!(
            "times[{}]: {}\naverage: {:.3}",
            self.durations.len(),
            times,
            self.mean
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::FrameHandle;

    fn ledger_with_timestamps(stamps: &[f64]) -> Ledger {
        let mut ledger = Ledger::new();
        for (i, t) in stamps.iter().enumerate() {
            let frame = FrameHandle::from_raw(1, 1, vec![i as u8; 4]).unwrap();
            ledger.append(frame, *t);
        }
        ledger
    }

    #[test]
    fn deltas_and_mean_follow_the_selections() {
        let ledger = ledger_with_timestamps(&[0.0, 10.0, 25.0, 40.0, 60.0]);
        let mut stats = RunningStats::new();

        assert_eq!(stats.select_range(1, 3, &ledger).unwrap(), 30.0);
        assert_eq!(stats.mean(), 30.0);

        assert_eq!(stats.select_range(0, 4, &ledger).unwrap(), 60.0);
        assert_eq!(stats.mean(), 45.0);
        assert_eq!(stats.durations(), &[30.0, 60.0]);
    }

    #[test]
    fn mean_is_the_arithmetic_average() {
        let ledger = ledger_with_timestamps(&[0.0, 7.0, 19.0, 23.0]);
        let mut stats = RunningStats::new();
        stats.select_range(0, 1, &ledger).unwrap();
        stats.select_range(1, 2, &ledger).unwrap();
        stats.select_range(0, 3, &ledger).unwrap();

        let expected = (7.0 + 12.0 + 23.0) / 3.0;
        assert!((stats.mean() - expected).abs() < 1e-9);
    }

    #[test]
    fn invalid_selections_do_not_mutate() {
        let ledger = ledger_with_timestamps(&[0.0, 10.0, 25.0]);
        let mut stats = RunningStats::new();
        stats.select_range(0, 2, &ledger).unwrap();

        for (s, e) in [(2, 1), (0, 3), (3, 3), (7, 9)] {
            assert!(matches!(
                stats.select_range(s, e, &ledger),
                Err(RecorderError::Range { .. })
            ));
        }
        assert_eq!(stats.durations(), &[25.0]);
        assert_eq!(stats.mean(), 25.0);
    }

    #[test]
    fn empty_ledger_rejects_everything() {
        let ledger = Ledger::new();
        let mut stats = RunningStats::new();
        assert!(stats.select_range(0, 0, &ledger).is_err());
    }

    #[test]
    fn reset_is_idempotent() {
        let ledger = ledger_with_timestamps(&[0.0, 5.0]);
        let mut stats = RunningStats::new();
        stats.select_range(0, 1, &ledger).unwrap();

        stats.reset();
        stats.reset();
        assert!(stats.is_empty());
        assert_eq!(stats.mean(), 0.0);
    }
}
