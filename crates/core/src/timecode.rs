//! Frame-accurate time conversions.
//!
//! Converts between milliseconds on the media timeline, zero-based frame
//! indices, and SMPTE `HH:MM:SS:FF` timecode strings. Frame rates are kept as
//! exact rationals so NTSC rates (29.97 = 30000/1001) never drift.
//!
//! The SMPTE form used here is wall-clock based: `HH:MM:SS` are whole elapsed
//! seconds and `FF` is the frame index within the current second. Downstream
//! review tooling parses this string, so the format is bit-exact.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Highest supported frame rate. Above this a frame is shorter than one
/// millisecond and millisecond addressing can no longer name every frame.
pub const MAX_FRAME_RATE: u32 = 1000;

/// Minimum width of the `FF` field in a SMPTE string.
pub const MIN_SMPTE_FRAME_DIGITS: usize = 2;

const MS_PER_SECOND: i64 = 1000;

// ---------------------------------------------------------------------------
// Frame rate
// ---------------------------------------------------------------------------

/// A frame rate expressed as the rational `num / den` frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FrameRateRepr", into = "FrameRateRepr")]
pub struct FrameRate {
    num: u32,
    den: u32,
}

#[derive(Serialize, Deserialize)]
struct FrameRateRepr {
    num: u32,
    den: u32,
}

impl TryFrom<FrameRateRepr> for FrameRate {
    type Error = CoreError;

    fn try_from(repr: FrameRateRepr) -> Result<Self, Self::Error> {
        FrameRate::new(repr.num, repr.den)
    }
}

impl From<FrameRate> for FrameRateRepr {
    fn from(rate: FrameRate) -> Self {
        Self {
            num: rate.num,
            den: rate.den,
        }
    }
}

impl FrameRate {
    pub const FPS_23_976: FrameRate = FrameRate { num: 24000, den: 1001 };
    pub const FPS_24: FrameRate = FrameRate { num: 24, den: 1 };
    pub const FPS_25: FrameRate = FrameRate { num: 25, den: 1 };
    pub const FPS_29_97: FrameRate = FrameRate { num: 30000, den: 1001 };
    pub const FPS_30: FrameRate = FrameRate { num: 30, den: 1 };
    pub const FPS_50: FrameRate = FrameRate { num: 50, den: 1 };
    pub const FPS_59_94: FrameRate = FrameRate { num: 60000, den: 1001 };
    pub const FPS_60: FrameRate = FrameRate { num: 60, den: 1 };

    /// Create a frame rate from a numerator and denominator.
    ///
    /// Both parts must be positive and the resulting rate must not exceed
    /// [`MAX_FRAME_RATE`]. The fraction is stored in lowest terms.
    pub fn new(num: u32, den: u32) -> Result<Self, CoreError> {
        if num == 0 || den == 0 {
            return Err(CoreError::InvalidFrameRate(format!(
                "{num}/{den} must be greater than zero"
            )));
        }
        if u64::from(num) > u64::from(MAX_FRAME_RATE) * u64::from(den) {
            return Err(CoreError::InvalidFrameRate(format!(
                "{num}/{den} exceeds the maximum of {MAX_FRAME_RATE} fps"
            )));
        }
        let divisor = gcd(num, den);
        Ok(Self {
            num: num / divisor,
            den: den / divisor,
        })
    }

    /// Create a frame rate from a decimal fps value.
    ///
    /// The common NTSC rates (23.976, 29.97, 47.952, 59.94, 119.88) map to
    /// their exact `/1001` rationals; anything else is kept to millifps
    /// precision.
    pub fn from_fps(fps: f64) -> Result<Self, CoreError> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(CoreError::InvalidFrameRate(format!(
                "{fps} must be a finite number greater than zero"
            )));
        }

        for nominal in [24_u32, 30, 48, 60, 120] {
            let ntsc = f64::from(nominal) * 1000.0 / 1001.0;
            if (fps - ntsc).abs() < 0.005 {
                return Self::new(nominal * 1000, 1001);
            }
        }

        if fps > f64::from(MAX_FRAME_RATE) {
            return Err(CoreError::InvalidFrameRate(format!(
                "{fps} exceeds the maximum of {MAX_FRAME_RATE} fps"
            )));
        }

        if fps.fract() == 0.0 {
            return Self::new(fps as u32, 1);
        }
        Self::new((fps * 1000.0).round() as u32, 1000)
    }

    pub fn num(&self) -> u32 {
        self.num
    }

    pub fn den(&self) -> u32 {
        self.den
    }

    /// The rate as a floating-point fps value, for display only.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Whole frames counted per second in timecode (29.97 counts 30).
    pub fn nominal_fps(&self) -> u32 {
        self.num.div_ceil(self.den)
    }

    /// Width of the `FF` field: `ceil(log10(fps))` digits, at least two.
    pub fn smpte_frame_digits(&self) -> usize {
        let mut digits = 0_usize;
        let mut power = 1_u64;
        while power * u64::from(self.den) < u64::from(self.num) {
            power *= 10;
            digits += 1;
        }
        digits.max(MIN_SMPTE_FRAME_DIGITS)
    }

    /// Re-check the invariants. Used on values that crossed a trust boundary.
    pub fn validate(&self) -> Result<(), CoreError> {
        Self::new(self.num, self.den).map(|_| ())
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{:.3}", self.as_f64())
        }
    }
}

/// Parses `"24"`, `"29.97"` or an exact `"30000/1001"`.
impl FromStr for FrameRate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || CoreError::InvalidFrameRate(format!("'{s}' is not a frame rate"));
        match s.split_once('/') {
            Some((num, den)) => {
                let num = num.trim().parse().map_err(|_| invalid())?;
                let den = den.trim().parse().map_err(|_| invalid())?;
                Self::new(num, den)
            }
            None => Self::from_fps(s.parse().map_err(|_| invalid())?),
        }
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn ensure_non_negative(timestamp_ms: i64) -> Result<(), CoreError> {
    if timestamp_ms < 0 {
        return Err(CoreError::InvalidTimestamp(timestamp_ms));
    }
    Ok(())
}

/// Frame index containing `timestamp_ms`: `floor(timestamp_ms / 1000 * fps)`.
///
/// Monotonic non-decreasing in `timestamp_ms`. Timestamps past the end of the
/// media are accepted; callers clamp.
pub fn to_frame_number(timestamp_ms: i64, frame_rate: FrameRate) -> Result<i64, CoreError> {
    ensure_non_negative(timestamp_ms)?;
    frame_rate.validate()?;
    let frames = i128::from(timestamp_ms) * i128::from(frame_rate.num)
        / (i128::from(MS_PER_SECOND) * i128::from(frame_rate.den));
    Ok(frames as i64)
}

/// First millisecond that falls inside `frame`.
///
/// `to_frame_number(frame_start_ms(f)) == f` for every supported rate.
pub fn frame_start_ms(frame: i64, frame_rate: FrameRate) -> Result<i64, CoreError> {
    ensure_non_negative(frame)?;
    frame_rate.validate()?;
    let numerator = i128::from(frame) * i128::from(MS_PER_SECOND) * i128::from(frame_rate.den);
    let denominator = i128::from(frame_rate.num);
    Ok(((numerator + denominator - 1) / denominator) as i64)
}

/// Length of one frame in milliseconds.
pub fn frame_duration_ms(frame_rate: FrameRate) -> f64 {
    1000.0 * f64::from(frame_rate.den) / f64::from(frame_rate.num)
}

/// Format a timestamp as SMPTE `HH:MM:SS:FF`.
///
/// Hours are not wrapped at 24. `FF` is zero-padded to
/// [`FrameRate::smpte_frame_digits`].
pub fn to_smpte(timestamp_ms: i64, frame_rate: FrameRate) -> Result<String, CoreError> {
    ensure_non_negative(timestamp_ms)?;
    frame_rate.validate()?;

    let total_seconds = timestamp_ms / MS_PER_SECOND;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let frames = (timestamp_ms % MS_PER_SECOND) * i64::from(frame_rate.num)
        / (MS_PER_SECOND * i64::from(frame_rate.den));

    let width = frame_rate.smpte_frame_digits();
    Ok(format!(
        "{hours:02}:{minutes:02}:{seconds:02}:{frames:0width$}"
    ))
}

/// Parse a SMPTE `HH:MM:SS:FF` string back to milliseconds.
///
/// Returns the first millisecond of the named frame, so
/// `to_smpte(from_smpte(tc)) == tc` and `from_smpte(to_smpte(t))` lands within
/// one frame interval of `t`.
pub fn from_smpte(timecode: &str, frame_rate: FrameRate) -> Result<i64, CoreError> {
    frame_rate.validate()?;

    let invalid = |reason: String| CoreError::InvalidTimecode {
        timecode: timecode.to_string(),
        reason,
    };

    let parts: Vec<&str> = timecode.split(':').collect();
    if parts.len() != 4 {
        return Err(invalid("expected HH:MM:SS:FF".to_string()));
    }

    let mut fields = [0_i64; 4];
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid(format!("segment {i} must be numeric")));
        }
        fields[i] = part
            .parse()
            .map_err(|_| invalid(format!("segment {i} is out of range")))?;
    }
    let [hours, minutes, seconds, frames] = fields;

    if minutes >= 60 {
        return Err(invalid(format!("minutes must be below 60, got {minutes}")));
    }
    if seconds >= 60 {
        return Err(invalid(format!("seconds must be below 60, got {seconds}")));
    }
    let nominal = i64::from(frame_rate.nominal_fps());
    if frames >= nominal {
        return Err(invalid(format!(
            "frame {frames} does not exist at {frame_rate} fps"
        )));
    }

    let whole_ms = hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .and_then(|s| s.checked_mul(MS_PER_SECOND))
        .ok_or_else(|| invalid("hours out of range".to_string()))?;
    let frame_ms = frame_start_ms(frames, frame_rate)?;
    if frame_ms >= MS_PER_SECOND {
        return Err(invalid(format!(
            "frame {frames} does not exist at {frame_rate} fps"
        )));
    }

    Ok(whole_ms + frame_ms)
}

/// Human-readable `H:MM:SS` duration (not frame accurate).
///
/// Negative durations are shown as zero.
pub fn format_duration(duration_ms: i64) -> String {
    let total_seconds = duration_ms.max(0) / MS_PER_SECOND;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

// ---------------------------------------------------------------------------
// Frame stepping
// ---------------------------------------------------------------------------

/// Direction of a single-frame step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Forward,
    Backward,
}

/// Move the playhead by exactly one frame.
///
/// Lands on the first millisecond of the neighbouring frame, clamped to
/// `[0, duration_ms]`.
pub fn step_frame(
    current_ms: i64,
    direction: StepDirection,
    frame_rate: FrameRate,
    duration_ms: i64,
) -> Result<i64, CoreError> {
    let frame = to_frame_number(current_ms, frame_rate)?;
    let target = match direction {
        StepDirection::Forward => frame + 1,
        StepDirection::Backward => (frame - 1).max(0),
    };
    let target_ms = frame_start_ms(target, frame_rate)?;
    Ok(target_ms.clamp(0, duration_ms.max(0)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const TEST_RATES: &[FrameRate] = &[
        FrameRate::FPS_23_976,
        FrameRate::FPS_24,
        FrameRate::FPS_25,
        FrameRate::FPS_29_97,
        FrameRate::FPS_30,
        FrameRate::FPS_50,
        FrameRate::FPS_59_94,
        FrameRate::FPS_60,
    ];

    // -- FrameRate ----------------------------------------------------------

    #[test]
    fn zero_rate_rejected() {
        assert_matches!(FrameRate::new(0, 1), Err(CoreError::InvalidFrameRate(_)));
        assert_matches!(FrameRate::new(24, 0), Err(CoreError::InvalidFrameRate(_)));
    }

    #[test]
    fn rate_above_maximum_rejected() {
        assert_matches!(FrameRate::new(1001, 1), Err(CoreError::InvalidFrameRate(_)));
    }

    #[test]
    fn rate_reduced_to_lowest_terms() {
        assert_eq!(FrameRate::new(48, 2).unwrap(), FrameRate::FPS_24);
    }

    #[test]
    fn from_fps_maps_ntsc_rates() {
        assert_eq!(FrameRate::from_fps(29.97).unwrap(), FrameRate::FPS_29_97);
        assert_eq!(FrameRate::from_fps(23.976).unwrap(), FrameRate::FPS_23_976);
        assert_eq!(FrameRate::from_fps(59.94).unwrap(), FrameRate::FPS_59_94);
    }

    #[test]
    fn from_fps_integer_and_fractional() {
        assert_eq!(FrameRate::from_fps(25.0).unwrap(), FrameRate::FPS_25);
        let rate = FrameRate::from_fps(12.5).unwrap();
        assert_eq!((rate.num(), rate.den()), (25, 2));
    }

    #[test]
    fn parse_frame_rate_strings() {
        assert_eq!("24".parse::<FrameRate>().unwrap(), FrameRate::FPS_24);
        assert_eq!("29.97".parse::<FrameRate>().unwrap(), FrameRate::FPS_29_97);
        assert_eq!("30000/1001".parse::<FrameRate>().unwrap(), FrameRate::FPS_29_97);
        assert!("fast".parse::<FrameRate>().is_err());
        assert!("24/0".parse::<FrameRate>().is_err());
    }

    #[test]
    fn from_fps_rejects_non_positive() {
        assert!(FrameRate::from_fps(0.0).is_err());
        assert!(FrameRate::from_fps(-24.0).is_err());
        assert!(FrameRate::from_fps(f64::NAN).is_err());
    }

    #[test]
    fn nominal_fps_rounds_up() {
        assert_eq!(FrameRate::FPS_29_97.nominal_fps(), 30);
        assert_eq!(FrameRate::FPS_24.nominal_fps(), 24);
    }

    #[test]
    fn frame_digits() {
        assert_eq!(FrameRate::FPS_24.smpte_frame_digits(), 2);
        assert_eq!(FrameRate::new(100, 1).unwrap().smpte_frame_digits(), 2);
        assert_eq!(FrameRate::new(120, 1).unwrap().smpte_frame_digits(), 3);
        assert_eq!(FrameRate::new(5, 1).unwrap().smpte_frame_digits(), 2);
    }

    #[test]
    fn display_format() {
        assert_eq!(FrameRate::FPS_24.to_string(), "24");
        assert_eq!(FrameRate::FPS_29_97.to_string(), "29.970");
    }

    #[test]
    fn deserialize_rejects_zero_rate() {
        let result: Result<FrameRate, _> = serde_json::from_str(r#"{"num":0,"den":1}"#);
        assert!(result.is_err());
    }

    // -- to_frame_number ----------------------------------------------------

    #[test]
    fn frame_number_at_45_seconds_24fps() {
        assert_eq!(to_frame_number(45_000, FrameRate::FPS_24).unwrap(), 1080);
    }

    #[test]
    fn frame_number_floors() {
        // 41.666.. ms per frame at 24 fps.
        assert_eq!(to_frame_number(41, FrameRate::FPS_24).unwrap(), 0);
        assert_eq!(to_frame_number(42, FrameRate::FPS_24).unwrap(), 1);
    }

    #[test]
    fn frame_number_ntsc() {
        // One hour of 29.97 holds 107892 frames.
        assert_eq!(
            to_frame_number(3_600_000, FrameRate::FPS_29_97).unwrap(),
            107_892
        );
    }

    #[test]
    fn frame_number_rejects_negative() {
        assert_matches!(
            to_frame_number(-1, FrameRate::FPS_24),
            Err(CoreError::InvalidTimestamp(-1))
        );
    }

    #[test]
    fn frame_number_is_monotonic() {
        for rate in TEST_RATES {
            let mut previous = 0;
            for ms in 0..5_000 {
                let frame = to_frame_number(ms, *rate).unwrap();
                assert!(frame >= previous, "{rate} regressed at {ms} ms");
                previous = frame;
            }
        }
    }

    // -- frame_start_ms -----------------------------------------------------

    #[test]
    fn frame_start_inverts_frame_number() {
        for rate in TEST_RATES {
            for frame in 0..500 {
                let start = frame_start_ms(frame, *rate).unwrap();
                assert_eq!(to_frame_number(start, *rate).unwrap(), frame);
                if start > 0 {
                    assert_eq!(to_frame_number(start - 1, *rate).unwrap(), frame - 1);
                }
            }
        }
    }

    // -- to_smpte -----------------------------------------------------------

    #[test]
    fn smpte_at_45_seconds_24fps() {
        assert_eq!(to_smpte(45_000, FrameRate::FPS_24).unwrap(), "00:00:45:00");
    }

    #[test]
    fn smpte_with_frames_and_hours() {
        // 1h 2m 3s + 500 ms -> frame 12 at 24 fps.
        let ms = 3_723_500;
        assert_eq!(to_smpte(ms, FrameRate::FPS_24).unwrap(), "01:02:03:12");
    }

    #[test]
    fn smpte_pads_frames_for_high_rates() {
        let rate = FrameRate::new(120, 1).unwrap();
        assert_eq!(to_smpte(1_050, rate).unwrap(), "00:00:01:006");
    }

    #[test]
    fn smpte_rejects_negative() {
        assert_matches!(
            to_smpte(-5, FrameRate::FPS_24),
            Err(CoreError::InvalidTimestamp(-5))
        );
    }

    #[test]
    fn smpte_hours_do_not_wrap() {
        assert_eq!(
            to_smpte(25 * 3_600_000, FrameRate::FPS_25).unwrap(),
            "25:00:00:00"
        );
    }

    // -- from_smpte ---------------------------------------------------------

    #[test]
    fn parse_smpte() {
        assert_eq!(from_smpte("00:00:45:00", FrameRate::FPS_24).unwrap(), 45_000);
        assert_eq!(from_smpte("00:00:01:12", FrameRate::FPS_24).unwrap(), 1_500);
    }

    #[test]
    fn parse_rejects_malformed() {
        let rate = FrameRate::FPS_24;
        assert_matches!(from_smpte("", rate), Err(CoreError::InvalidTimecode { .. }));
        assert_matches!(from_smpte("00:00:45", rate), Err(CoreError::InvalidTimecode { .. }));
        assert_matches!(from_smpte("aa:bb:cc:dd", rate), Err(CoreError::InvalidTimecode { .. }));
        assert_matches!(from_smpte("00:60:00:00", rate), Err(CoreError::InvalidTimecode { .. }));
        assert_matches!(from_smpte("00:00:60:00", rate), Err(CoreError::InvalidTimecode { .. }));
        assert_matches!(from_smpte("00:00:00:24", rate), Err(CoreError::InvalidTimecode { .. }));
    }

    #[test]
    fn smpte_round_trips_within_one_frame() {
        for rate in TEST_RATES {
            let frame_ms = frame_duration_ms(*rate);
            for ms in (0..7_300_000).step_by(997) {
                let tc = to_smpte(ms, *rate).unwrap();
                let back = from_smpte(&tc, *rate).unwrap();
                assert!(back <= ms, "{tc} parsed past the original at {rate}");
                assert!(((ms - back) as f64) < frame_ms, "{tc} drifted at {rate}");
                assert_eq!(to_smpte(back, *rate).unwrap(), tc);
            }
        }
    }

    // -- format_duration ----------------------------------------------------

    #[test]
    fn duration_format() {
        assert_eq!(format_duration(596_000), "0:09:56");
        assert_eq!(format_duration(3_723_000), "1:02:03");
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(-10), "0:00:00");
    }

    // -- step_frame ---------------------------------------------------------

    #[test]
    fn step_forward_and_back() {
        let rate = FrameRate::FPS_24;
        let next = step_frame(45_000, StepDirection::Forward, rate, 596_000).unwrap();
        assert_eq!(to_frame_number(next, rate).unwrap(), 1081);
        let prev = step_frame(45_000, StepDirection::Backward, rate, 596_000).unwrap();
        assert_eq!(to_frame_number(prev, rate).unwrap(), 1079);
    }

    #[test]
    fn step_clamps_to_media_bounds() {
        let rate = FrameRate::FPS_24;
        assert_eq!(step_frame(0, StepDirection::Backward, rate, 1_000).unwrap(), 0);
        assert_eq!(step_frame(1_000, StepDirection::Forward, rate, 1_000).unwrap(), 1_000);
    }
}
