//! Query eligibility: decides whether raw search-box text may be sent at all.

use crate::error::ValidationRejected;

pub const MIN_QUERY_LENGTH: usize = 2;
pub const MAX_QUERY_LENGTH: usize = 100;

/// Inclusive length bounds on the trimmed query, counted in chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryBounds {
    pub min: usize,
    pub max: usize,
}

impl Default for QueryBounds {
    fn default() -> Self {
        Self { min: MIN_QUERY_LENGTH, max: MAX_QUERY_LENGTH }
    }
}

impl QueryBounds {
    /// Trim `raw` and check it against the bounds. `None` is the no-input case.
    pub fn check<'a>(&self, raw: Option<&'a str>) -> Result<&'a str, ValidationRejected> {
        let text = raw.ok_or(ValidationRejected::Missing)?.trim();
        let len = text.chars().count();
        if len == 0 {
            return Err(ValidationRejected::Empty);
        }
        if len < self.min {
            return Err(ValidationRejected::TooShort { len, min: self.min });
        }
        if len > self.max {
            return Err(ValidationRejected::TooLong { len, max: self.max });
        }
        Ok(text)
    }

    pub fn is_eligible(&self, raw: &str) -> bool {
        self.check(Some(raw)).is_ok()
    }
}

/// Eligibility under the default 2..=100 bounds.
pub fn is_eligible(raw: &str) -> bool {
    QueryBounds::default().is_eligible(raw)
}
