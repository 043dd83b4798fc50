//! Verification policy.
//!
//! The host accepts a token belonging to the current window or either
//! neighbour. This absorbs clock drift between the two sides and the time a
//! person needs to read and type six digits, at the cost of tripling the
//! acceptance space. The tolerance is exactly one window each way.

use serde::Serialize;
use token_types::{Secret, Token, WindowIndex};

use crate::derive::derive;

/// The three tokens accepted for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Candidates {
    /// The window the candidates were computed for.
    pub window: WindowIndex,
    /// Token of the window itself.
    pub current: Token,
    /// Token of the previous window (window 0 reuses its own token).
    pub previous: Token,
    /// Token of the next window.
    pub next: Token,
}

impl Candidates {
    /// Which candidate `input` equals, checking the current window first.
    pub fn find(&self, input: u32) -> Option<Match> {
        if self.current.matches(input) {
            Some(Match::Current)
        } else if self.previous.matches(input) {
            Some(Match::Previous)
        } else if self.next.matches(input) {
            Some(Match::Next)
        } else {
            None
        }
    }
}

/// Which window an accepted token belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Match {
    /// The current window.
    Current,
    /// One window behind.
    Previous,
    /// One window ahead.
    Next,
}

/// Outcome of checking one user entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The entry matched a candidate.
    Accepted(Match),
    /// No candidate matched. Carries the candidates for reporting.
    Rejected(Candidates),
}

impl Verdict {
    /// Check if the entry was accepted.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Host-side verifier bound to a secret.
#[derive(Debug, Clone)]
pub struct Verifier {
    secret: Secret,
}

impl Verifier {
    /// Create a verifier for the given secret.
    pub fn new(secret: Secret) -> Self {
        Self { secret }
    }

    /// Compute the candidate tokens for a window.
    pub fn candidates(&self, window: WindowIndex) -> Candidates {
        Candidates {
            window,
            current: derive(&self.secret, window),
            previous: derive(&self.secret, window.previous()),
            next: derive(&self.secret, window.next()),
        }
    }

    /// Check a user entry against a window, keeping the candidates.
    pub fn check(&self, input: u32, window: WindowIndex) -> Verdict {
        let candidates = self.candidates(window);
        match candidates.find(input) {
            Some(matched) => Verdict::Accepted(matched),
            None => Verdict::Rejected(candidates),
        }
    }

    /// True iff `input` equals the token of `window` or of an adjacent window.
    pub fn verify(&self, input: u32, window: WindowIndex) -> bool {
        self.check(input, window).is_accepted()
    }
}
