//! Match criteria selecting which actions are forwarded.
//!
//! A [`Criteria`] is a tagged variant covering the three matching behaviors:
//!
//! | Variant | Matches when |
//! |---------|--------------|
//! | [`Criteria::Predicate`] | the function returns `true` for `(type, action)` |
//! | [`Criteria::Prefix`] | the action type starts with the string |
//! | [`Criteria::PrefixSet`] | any element is a prefix of the action type |
//!
//! The default criteria is an empty prefix set, which matches nothing.
//!
//! # Example
//!
//! ```
//! use socket_relay::{Action, Criteria};
//!
//! let cart = Criteria::prefix("CART_");
//! assert!(cart.matches(&Action::new("CART_ADD")));
//! assert!(!cart.matches(&Action::new("USER_LOGIN")));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::action::Action;

// ============================================================================
// Types
// ============================================================================

/// Predicate function over `(action type, action)`.
pub type PredicateFn = Box<dyn Fn(&str, &Action) -> bool + Send + Sync>;

// ============================================================================
// Criteria
// ============================================================================

/// The configurable rule selecting which actions are forwarded.
pub enum Criteria {
    /// Arbitrary predicate over `(type, action)`.
    Predicate(PredicateFn),

    /// Single string prefix tested against the action type.
    Prefix(String),

    /// List of string prefixes, any-match.
    PrefixSet(Vec<String>),
}

// ============================================================================
// Constructors
// ============================================================================

impl Criteria {
    /// Creates a predicate criteria.
    #[inline]
    #[must_use]
    pub fn predicate(test: impl Fn(&str, &Action) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Box::new(test))
    }

    /// Creates a single-prefix criteria.
    #[inline]
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Creates an any-match prefix-set criteria.
    #[inline]
    #[must_use]
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::PrefixSet(prefixes.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// Evaluation
// ============================================================================

impl Criteria {
    /// Evaluates this criteria against an action.
    ///
    /// Actions with an empty type never match, regardless of the variant.
    /// An empty-string prefix matches every typed action.
    #[must_use]
    pub fn matches(&self, action: &Action) -> bool {
        let kind = action.kind();
        if kind.is_empty() {
            return false;
        }

        match self {
            Self::Predicate(test) => test(kind, action),
            Self::Prefix(prefix) => kind.starts_with(prefix.as_str()),
            Self::PrefixSet(prefixes) => {
                prefixes.iter().any(|prefix| kind.starts_with(prefix.as_str()))
            }
        }
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl Default for Criteria {
    /// An empty prefix set; matches nothing.
    fn default() -> Self {
        Self::PrefixSet(Vec::new())
    }
}

impl fmt::Debug for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Predicate(_) => f.write_str("Criteria::Predicate(..)"),
            Self::Prefix(prefix) => f.debug_tuple("Criteria::Prefix").field(prefix).finish(),
            Self::PrefixSet(prefixes) => {
                f.debug_tuple("Criteria::PrefixSet").field(prefixes).finish()
            }
        }
    }
}

impl From<&str> for Criteria {
    fn from(prefix: &str) -> Self {
        Self::Prefix(prefix.to_string())
    }
}

impl From<String> for Criteria {
    fn from(prefix: String) -> Self {
        Self::Prefix(prefix)
    }
}

impl From<Vec<String>> for Criteria {
    fn from(prefixes: Vec<String>) -> Self {
        Self::PrefixSet(prefixes)
    }
}

impl From<&[&str]> for Criteria {
    fn from(prefixes: &[&str]) -> Self {
        Self::prefixes(prefixes.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for Criteria {
    fn from(prefixes: [&str; N]) -> Self {
        Self::prefixes(prefixes)
    }
}

// ============================================================================
// Tests
// ============================================================================
