//! Delay sampling for the script stepper

use std::time::Duration;

use rand::Rng;

use call_sim_config::DelayRange;

/// Pick a delay uniformly from an inclusive range
pub fn sample_delay<R: Rng + ?Sized>(range: &DelayRange, rng: &mut R) -> Duration {
    let (lo, hi) = if range.min_ms <= range.max_ms {
        (range.min_ms, range.max_ms)
    } else {
        (range.max_ms, range.min_ms)
    };
    let ms = if lo == hi { lo } else { rng.gen_range(lo..=hi) };
    Duration::from_millis(ms.max(1))
}
