//! `Cache-Control` request directive parsing.
//!
//! [`DirectiveSet::parse`] turns the raw request header into the set of
//! validators and flags the handler acts on. Server policy always wins over
//! the client:
//!
//! - `max-age=N` is raised to the route's minimum age when lower,
//! - `min-fresh=N` is lowered to the route's freshness window when higher,
//! - `no-cache` and `no-store` are honored as "nothing older than the
//!   minimum age".
//!
//! Each adjustment leaves a warning that is echoed back in the `Warning`
//! response header on cache hits.
//!
//! ```
//! use cachet::directive::DirectiveSet;
//! use cachet::validator::Validator;
//!
//! let directives = DirectiveSet::parse("max-age=2, only-if-cached", 5, 5);
//! assert!(directives.force_cache_only);
//! assert_eq!(directives.validators, vec![Validator::MaxAge(5)]);
//! assert_eq!(directives.warning(), "max-age=5");
//! ```

use crate::validator::Validator;

/// A recognized `Cache-Control` request directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `max-age=N`.
    MaxAge(i64),
    /// `min-fresh=N`.
    MinFresh(i64),
    /// `no-cache`.
    NoCache,
    /// `no-store`.
    NoStore,
    /// `only-if-cached`.
    OnlyIfCached,
}

impl Directive {
    /// Parses a single comma-separated token, returning `None` for tokens
    /// this cache does not act on.
    pub fn parse(token: &str) -> Option<Directive> {
        let (name, value) = match token.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value)),
            None => (token.trim(), None),
        };
        match name.to_ascii_lowercase().as_str() {
            "max-age" => Some(Directive::MaxAge(seconds(value))),
            "min-fresh" => Some(Directive::MinFresh(seconds(value))),
            "no-cache" => Some(Directive::NoCache),
            "no-store" => Some(Directive::NoStore),
            "only-if-cached" => Some(Directive::OnlyIfCached),
            _ => None,
        }
    }
}

/// Malformed and negative values count as zero.
fn seconds(value: Option<&str>) -> i64 {
    value
        .map(|value| value.trim().trim_matches('"'))
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|seconds| *seconds >= 0)
        .unwrap_or(0)
}

/// Directives of one request, resolved against route policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    /// `no-cache` or `no-store` was sent.
    ///
    /// Only tightens validation. A refreshed record is still written back
    /// unless [`no_store`](Self::no_store) is also set.
    pub no_cache: bool,
    /// `no-store` was sent; the refreshed record is not written back.
    pub no_store: bool,
    /// `only-if-cached` was sent; a stale record beats recomputation.
    pub force_cache_only: bool,
    /// Adjustments made to the client's directives, in order.
    pub warnings: Vec<String>,
    /// Validators contributed by the directives.
    pub validators: Vec<Validator>,
    /// Replaces the baseline TTL validator when set.
    pub expiry_validator: Option<Validator>,
    /// Tokens that were empty or not recognized.
    pub ignored: Vec<String>,
}

impl DirectiveSet {
    /// Parses `header_value` for a route with the given minimum age and
    /// freshness window (`max_age - min_age`).
    pub fn parse(header_value: &str, min_age: i64, max_fresh: i64) -> DirectiveSet {
        let mut set = DirectiveSet::default();
        for token in header_value.split(',') {
            match Directive::parse(token) {
                Some(directive) => set.apply(directive, min_age, max_fresh),
                None => set.ignored.push(token.trim().to_owned()),
            }
        }
        set
    }

    fn apply(&mut self, directive: Directive, min_age: i64, max_fresh: i64) {
        match directive {
            Directive::MaxAge(requested) => {
                if requested < min_age {
                    self.warn(format!("max-age={min_age}"));
                }
                self.validators.push(Validator::MaxAge(requested.max(min_age)));
            }
            Directive::MinFresh(requested) => {
                if requested > max_fresh {
                    self.warn(format!("min-fresh={max_fresh}"));
                }
                self.validators
                    .push(Validator::MinFresh(requested.min(max_fresh)));
            }
            Directive::NoCache | Directive::NoStore => {
                self.no_cache = true;
                self.no_store |= directive == Directive::NoStore;
                self.validators.push(Validator::MaxAge(min_age));
                self.warn(format!("max-age={min_age}"));
            }
            Directive::OnlyIfCached => self.force_cache_only = true,
        }
    }

    fn warn(&mut self, warning: String) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Replaces the baseline TTL validator.
    pub fn with_expiry(mut self, validator: Validator) -> Self {
        self.expiry_validator = Some(validator);
        self
    }

    /// The warnings joined into a single `Warning` header value.
    pub fn warning(&self) -> String {
        self.warnings.join(",")
    }

    /// The full chain: directive validators followed by the expiry validator,
    /// which defaults to [`Validator::Ttl`].
    pub fn chain(&self) -> Vec<Validator> {
        let mut chain = self.validators.clone();
        chain.push(self.expiry_validator.unwrap_or(Validator::Ttl));
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_header_has_no_directives() {
        let set = DirectiveSet::parse("", 1, 9);
        assert!(set.validators.is_empty());
        assert_eq!(set.warning(), "");
        assert_eq!(set.ignored, vec![String::new()]);
        assert_eq!(set.chain(), vec![Validator::Ttl]);
    }

    #[test]
    fn max_age_above_floor_is_kept() {
        let set = DirectiveSet::parse("max-age=7", 1, 9);
        assert_eq!(set.validators, vec![Validator::MaxAge(7)]);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn max_age_below_floor_is_raised_with_warning() {
        let set = DirectiveSet::parse("max-age=2", 5, 5);
        assert_eq!(set.validators, vec![Validator::MaxAge(5)]);
        assert_eq!(set.warning(), "max-age=5");
    }

    #[test]
    fn min_fresh_above_window_is_lowered_with_warning() {
        let set = DirectiveSet::parse("min-fresh=30", 1, 9);
        assert_eq!(set.validators, vec![Validator::MinFresh(9)]);
        assert_eq!(set.warning(), "min-fresh=9");
    }

    #[test]
    fn no_cache_tightens_to_floor() {
        let set = DirectiveSet::parse("no-cache", 3, 7);
        assert!(set.no_cache);
        assert!(!set.no_store);
        assert_eq!(set.validators, vec![Validator::MaxAge(3)]);
        assert_eq!(set.warning(), "max-age=3");
    }

    #[test]
    fn no_store_also_sets_no_cache() {
        let set = DirectiveSet::parse("no-store", 3, 7);
        assert!(set.no_cache);
        assert!(set.no_store);
        assert_eq!(set.validators, vec![Validator::MaxAge(3)]);
    }

    #[test]
    fn warnings_are_joined_in_order_without_repeats() {
        let set = DirectiveSet::parse("max-age=0, min-fresh=100, no-cache", 2, 8);
        assert_eq!(set.warning(), "max-age=2,min-fresh=8");
        assert_eq!(
            set.chain(),
            vec![
                Validator::MaxAge(2),
                Validator::MinFresh(8),
                Validator::MaxAge(2),
                Validator::Ttl,
            ]
        );
    }

    #[test]
    fn malformed_and_negative_values_are_zero() {
        let set = DirectiveSet::parse("max-age=abc, min-fresh=-4", 0, 10);
        assert_eq!(
            set.validators,
            vec![Validator::MaxAge(0), Validator::MinFresh(0)]
        );
        assert!(set.warnings.is_empty());

        let set = DirectiveSet::parse("max-age", 0, 10);
        assert_eq!(set.validators, vec![Validator::MaxAge(0)]);
    }

    #[test]
    fn names_are_case_insensitive_and_values_may_be_quoted() {
        let set = DirectiveSet::parse(" Max-Age=\"6\" ,ONLY-IF-CACHED", 1, 9);
        assert_eq!(set.validators, vec![Validator::MaxAge(6)]);
        assert!(set.force_cache_only);
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let set = DirectiveSet::parse("private, max-age=4, ,stale-if-error=30", 1, 9);
        assert_eq!(set.validators, vec![Validator::MaxAge(4)]);
        assert_eq!(
            set.ignored,
            vec![
                "private".to_owned(),
                String::new(),
                "stale-if-error=30".to_owned()
            ]
        );
    }

    #[test]
    fn expiry_validator_replaces_baseline() {
        let set = DirectiveSet::parse("max-age=4", 1, 9).with_expiry(Validator::MaxAge(8));
        assert_eq!(set.chain(), vec![Validator::MaxAge(4), Validator::MaxAge(8)]);
    }

    #[test]
    fn parsing_is_deterministic() {
        let header = "max-age=1, min-fresh=50, no-store, only-if-cached";
        assert_eq!(
            DirectiveSet::parse(header, 3, 6),
            DirectiveSet::parse(header, 3, 6)
        );
    }
}
