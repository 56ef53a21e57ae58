//! Retry schedule for bounded mesh reads.

use std::time::Duration;

/// Delay before retry attempt `n` (0-based), in milliseconds.
///
/// Doubling schedule matching the read-retry behavior the aggregate readers
/// were tuned with; attempts past the table reuse the last delay.
pub const RETRY_DELAYS_MS: [u64; 4] = [500, 1000, 2000, 4000];

/// The delay to sleep before retry `attempt` (0-based).
pub fn retry_delay(attempt: usize) -> Duration {
    let millis = RETRY_DELAYS_MS
        .get(attempt)
        .copied()
        .unwrap_or(RETRY_DELAYS_MS[RETRY_DELAYS_MS.len() - 1]);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_doubles_then_saturates() {
        assert_eq!(retry_delay(0), Duration::from_millis(500));
        assert_eq!(retry_delay(1), Duration::from_millis(1000));
        assert_eq!(retry_delay(3), Duration::from_millis(4000));
        assert_eq!(retry_delay(9), Duration::from_millis(4000));
    }
}
