//! Logical time and the monotonic clock both ledgers carry.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{TokenError, TokenResult};

/// A point in a ledger's logical history.
///
/// Internally a plain generation counter. The `g<N>` form only exists at the
/// serialization boundary: `Display`/`Serialize` emit it and
/// `FromStr`/`Deserialize` require it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogicalTime(u64);

impl LogicalTime {
    pub const PREFIX: char = 'g';

    pub const fn new(generation: u64) -> Self {
        Self(generation)
    }

    pub const fn generation(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LogicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for LogicalTime {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix(Self::PREFIX)
            .or_else(|| trimmed.strip_prefix('G'))
            .ok_or_else(|| TokenError::InvalidLogicalTime(s.to_string()))?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TokenError::InvalidLogicalTime(s.to_string()));
        }
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TokenError::InvalidLogicalTime(s.to_string()))
    }
}

impl Serialize for LogicalTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogicalTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Monotonic generation counter owned by a ledger state.
///
/// The clock only moves forward: [`tick`](Self::tick) advances by exactly
/// one and [`observe`](Self::observe) fast-forwards to an externally
/// supplied time without ever moving backwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalClock(u64);

impl LogicalClock {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }

    /// The time of the most recent generation emitted by this clock.
    pub const fn current(self) -> LogicalTime {
        LogicalTime(self.0)
    }

    /// Advance by one generation and return the new clock with its token.
    pub fn tick(self) -> TokenResult<(Self, LogicalTime)> {
        let next = self
            .0
            .checked_add(1)
            .ok_or(TokenError::ClockExhausted(self.0))?;
        Ok((Self(next), LogicalTime(next)))
    }

    /// Fast-forward to `time` if it lies ahead; never rewinds.
    pub fn observe(self, time: LogicalTime) -> Self {
        Self(self.0.max(time.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_through_display() {
        let t = LogicalTime::new(42);
        assert_eq!(t.to_string(), "g42");
        assert_eq!("g42".parse::<LogicalTime>().unwrap(), t);
    }

    #[test]
    fn token_rejects_garbage() {
        assert!("42".parse::<LogicalTime>().is_err());
        assert!("g".parse::<LogicalTime>().is_err());
        assert!("g-1".parse::<LogicalTime>().is_err());
        assert!("g1x".parse::<LogicalTime>().is_err());
        assert!("g+1".parse::<LogicalTime>().is_err());
    }

    #[test]
    fn token_tolerates_whitespace_and_case() {
        assert_eq!(" G7 ".parse::<LogicalTime>().unwrap(), LogicalTime::new(7));
    }

    #[test]
    fn numeric_not_lexical_ordering() {
        let g2: LogicalTime = "g2".parse().unwrap();
        let g10: LogicalTime = "g10".parse().unwrap();
        assert!(g2 < g10);
    }

    #[test]
    fn tick_advances_by_one() {
        let clock = LogicalClock::default();
        let (clock, t) = clock.tick().unwrap();
        assert_eq!(clock.value(), 1);
        assert_eq!(t.to_string(), "g1");
        let (clock, t) = clock.tick().unwrap();
        assert_eq!(clock.value(), 2);
        assert_eq!(t, clock.current());
    }

    #[test]
    fn tick_refuses_to_wrap() {
        let clock = LogicalClock::new(u64::MAX);
        assert_eq!(clock.tick(), Err(TokenError::ClockExhausted(u64::MAX)));
    }

    #[test]
    fn observe_never_rewinds() {
        let clock = LogicalClock::new(5);
        assert_eq!(clock.observe(LogicalTime::new(3)).value(), 5);
        assert_eq!(clock.observe(LogicalTime::new(9)).value(), 9);
    }

    #[test]
    fn serde_uses_token_form() {
        let json = serde_json::to_string(&LogicalTime::new(3)).unwrap();
        assert_eq!(json, "\"g3\"");
        let back: LogicalTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LogicalTime::new(3));
        assert!(serde_json::from_str::<LogicalTime>("\"tomorrow\"").is_err());

        let clock_json = serde_json::to_string(&LogicalClock::new(8)).unwrap();
        assert_eq!(clock_json, "8");
    }
}
