//! Progress-record parsing for engine invocations.

/// Turns the engine's `key=value` progress records into percentages.
///
/// Percentages are derived from the output position against the target
/// duration taken from the invocation's `-t` argument. They are monotonic
/// non-decreasing and stay below 100 until the engine signals end-of-stream.
#[derive(Debug)]
pub struct ProgressTracker {
    target_us: Option<u64>,
    last: Option<u8>,
}

impl ProgressTracker {
    /// Tracker with an explicit target duration in seconds.
    pub fn new(target_secs: Option<f64>) -> Self {
        let target_us = target_secs
            .filter(|secs| *secs > 0.0)
            .map(|secs| (secs * 1_000_000.0) as u64);
        Self {
            target_us,
            last: None,
        }
    }

    /// Tracker for an argument vector, reading the target from its `-t` flag.
    pub fn from_argv(argv: &[String]) -> Self {
        let target_secs = argv
            .windows(2)
            .find(|pair| pair[0] == "-t")
            .and_then(|pair| pair[1].parse::<f64>().ok());
        Self::new(target_secs)
    }

    /// Feed one progress line; returns a percentage when it advances.
    pub fn observe_line(&mut self, line: &str) -> Option<u8> {
        let (key, value) = line.trim().split_once('=')?;
        let percent = match key {
            // ffmpeg reports out_time_ms in microseconds as well (historical
            // quirk), so both keys carry the same unit.
            "out_time_us" | "out_time_ms" => {
                let position_us: u64 = value.trim().parse().ok()?;
                let target_us = self.target_us?;
                (position_us.saturating_mul(100) / target_us).min(99) as u8
            }
            "progress" if value.trim() == "end" => 100,
            _ => return None,
        };
        self.advance(percent)
    }

    fn advance(&mut self, percent: u8) -> Option<u8> {
        match self.last {
            Some(prev) if percent <= prev => None,
            _ => {
                self.last = Some(percent);
                Some(percent)
            }
        }
    }
}
