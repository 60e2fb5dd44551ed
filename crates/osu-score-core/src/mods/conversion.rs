//! Conversions between difficulty values and their millisecond windows
//!
//! AR maps to the approach preempt time and OD to the 300 hit window. The AR
//! curve changes slope at AR 5 (1200ms), so rate changes must go through
//! milliseconds instead of scaling the value directly.

/// Preempt time at AR 0
const AR_0_MS: f64 = 1800.0;
/// Preempt time at AR 5
const AR_5_MS: f64 = 1200.0;
/// Preempt time at AR 10
const AR_10_MS: f64 = 450.0;

const AR_LOW_SLOPE: f64 = (AR_0_MS - AR_5_MS) / 5.0;
const AR_HIGH_SLOPE: f64 = (AR_5_MS - AR_10_MS) / 5.0;

/// Great (300) hit window at OD 0
const OD_0_MS: f64 = 80.0;
const OD_SLOPE: f64 = 6.0;

/// Convert an approach rate to its preempt time in milliseconds
pub fn approach_rate_to_ms(ar: f64) -> f64 {
    if ar <= 5.0 {
        AR_0_MS - ar * AR_LOW_SLOPE
    } else {
        AR_5_MS - (ar - 5.0) * AR_HIGH_SLOPE
    }
}

/// Convert a preempt time in milliseconds back to an approach rate
pub fn ms_to_approach_rate(ms: f64) -> f64 {
    if ms >= AR_5_MS {
        (AR_0_MS - ms) / AR_LOW_SLOPE
    } else {
        5.0 + (AR_5_MS - ms) / AR_HIGH_SLOPE
    }
}

/// Convert an overall difficulty to its 300 hit window in milliseconds
pub fn overall_difficulty_to_ms(od: f64) -> f64 {
    OD_0_MS - OD_SLOPE * od
}

/// Convert a 300 hit window in milliseconds back to an overall difficulty
pub fn ms_to_overall_difficulty(ms: f64) -> f64 {
    (OD_0_MS - ms) / OD_SLOPE
}
