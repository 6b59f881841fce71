/// Sample rate at which every emission is sent and no `|@rate` is written.
pub const FULL_SAMPLE_RATE: f64 = 1.0;

/// Source of uniform random numbers used for sampling decisions.
///
/// Implementations return a value in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    /// Draws the next value.
    fn next_f64(&self) -> f64;
}

/// Default random source backed by the thread-local generator of `rand`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Decides whether an emission at `sample_rate` goes out.
///
/// A full rate never draws. Otherwise a single draw `r` is taken and the
/// emission is kept when `sample_rate >= r`.
pub(crate) fn sampled(sample_rate: f64, random: &dyn RandomSource) -> bool {
    if sample_rate >= FULL_SAMPLE_RATE {
        return true;
    }
    if sample_rate.is_nan() || sample_rate <= 0.0 {
        return false;
    }
    sample_rate >= random.next_f64()
}
