//! Freshness validators.
//!
//! A [`Validator`] judges whether a record of a given age is still
//! acceptable under a route TTL. Validators are evaluated as a chain by
//! [`is_valid`]: every validator must pass, and the first one that fails
//! decides the [`ValidationReason`] reported in eviction metrics.
//!
//! All validators are monotonic in age: if a record passes at some age it
//! passes at every smaller age. Client directives only ever add validators,
//! so they can tighten the baseline TTL bound but never loosen it.

use std::fmt;

/// Why a cached record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValidationReason {
    /// No validator rejected the record in particular; the chain was empty.
    #[default]
    Unspecified,
    /// The record outlived the route TTL.
    TtlExpired,
    /// The record is older than a `max-age` bound.
    MaxAgeExceeded,
    /// The record has less remaining lifetime than `min-fresh` asks for.
    MinFreshUnmet,
    /// The record was computed after the current time.
    FutureTimestamp,
}

impl ValidationReason {
    /// Returns the reason as a metric label.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ValidationReason::Unspecified => "none",
            ValidationReason::TtlExpired => "ttl_expired",
            ValidationReason::MaxAgeExceeded => "max_age_exceeded",
            ValidationReason::MinFreshUnmet => "min_fresh_unmet",
            ValidationReason::FutureTimestamp => "future_timestamp",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single freshness check over `(age, ttl)`, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// `age <= ttl`.
    Ttl,
    /// `age <= n`.
    MaxAge(i64),
    /// `ttl - age >= n`.
    MinFresh(i64),
}

impl Validator {
    /// The reason reported when this validator rejects a record.
    pub const fn reason(&self) -> ValidationReason {
        match self {
            Validator::Ttl => ValidationReason::TtlExpired,
            Validator::MaxAge(_) => ValidationReason::MaxAgeExceeded,
            Validator::MinFresh(_) => ValidationReason::MinFreshUnmet,
        }
    }

    /// Checks a record of `age` seconds against a `ttl` second lifetime.
    pub fn check(&self, age: i64, ttl: i64) -> Result<(), ValidationReason> {
        let ok = match *self {
            Validator::Ttl => age <= ttl,
            Validator::MaxAge(max_age) => age <= max_age,
            Validator::MinFresh(min_fresh) => ttl.saturating_sub(age) >= min_fresh,
        };
        if ok { Ok(()) } else { Err(self.reason()) }
    }
}

/// Runs `validators` in order against `(age, ttl)`.
///
/// An empty chain is always invalid: with no bounds configured at all the
/// record must be recomputed. So is a negative age, which only a skewed
/// clock can produce.
///
/// ```
/// use cachet::validator::{is_valid, ValidationReason, Validator};
///
/// let chain = [Validator::MaxAge(5), Validator::Ttl];
/// assert_eq!(is_valid(4, 10, &chain), Ok(()));
/// assert_eq!(is_valid(6, 10, &chain), Err(ValidationReason::MaxAgeExceeded));
/// assert_eq!(is_valid(0, 10, &[]), Err(ValidationReason::Unspecified));
/// assert_eq!(is_valid(-3, 10, &chain), Err(ValidationReason::FutureTimestamp));
/// ```
pub fn is_valid(age: i64, ttl: i64, validators: &[Validator]) -> Result<(), ValidationReason> {
    if validators.is_empty() {
        return Err(ValidationReason::Unspecified);
    }
    if age < 0 {
        return Err(ValidationReason::FutureTimestamp);
    }
    validators
        .iter()
        .try_for_each(|validator| validator.check(age, ttl))
}
