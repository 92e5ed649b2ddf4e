/*!
    Timestamp and time base types.
*/

use std::time::Duration;

/**
    A rational number, used for time bases and frame rates.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rational {
    pub num: i32,
    pub den: i32,
}

impl Rational {
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /**
        Returns the value as a float, or zero for a zero denominator.
    */
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            0.0
        } else {
            self.num as f64 / self.den as f64
        }
    }

    /**
        Returns the reciprocal (a frame rate turned into a frame time base).
    */
    pub const fn invert(self) -> Self {
        Self {
            num: self.den,
            den: self.num,
        }
    }

    /**
        Returns true if both terms are non-zero.
    */
    pub const fn is_valid(self) -> bool {
        self.num != 0 && self.den != 0
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl std::fmt::Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/**
    Presentation or decode timestamp, in units of a stream time base.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(pub i64);

impl Pts {
    /**
        Convert to wall-clock time. Negative timestamps clamp to zero.
    */
    pub fn to_duration(self, time_base: Rational) -> Duration {
        if self.0 < 0 || !time_base.is_valid() {
            return Duration::ZERO;
        }
        let seconds = self.0 as f64 * time_base.num as f64 / time_base.den as f64;
        Duration::from_secs_f64(seconds.max(0.0))
    }

    /**
        Convert a wall-clock position to a timestamp in `time_base`.
    */
    pub fn from_duration(position: Duration, time_base: Rational) -> Self {
        if !time_base.is_valid() {
            return Self(0);
        }
        let ticks = position.as_secs_f64() * time_base.den as f64 / time_base.num as f64;
        Self(ticks.round() as i64)
    }
}

/**
    Duration of a packet or frame, in units of a stream time base.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MediaDuration(pub i64);
