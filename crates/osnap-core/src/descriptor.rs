//! Element descriptors and ordered candidate sets.
//!
//! Identity-provider login pages render the same logical control differently
//! per tenant and per page variant, so every lookup in this crate goes
//! through a `CandidateSet`: an ordered list of equivalent descriptors where
//! the first one that resolves wins.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A strategy-tagged way to locate an element in the live document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Descriptor {
    /// Match on the `name` attribute.
    Name(String),
    /// Match on the element id.
    Id(String),
    /// Match a CSS selector expression.
    Css(String),
    /// Match an anchor by a substring of its link text.
    PartialLinkText(String),
    /// Match an XPath expression.
    XPath(String),
}

impl Descriptor {
    pub fn name(value: impl Into<String>) -> Self {
        Descriptor::Name(value.into())
    }

    pub fn id(value: impl Into<String>) -> Self {
        Descriptor::Id(value.into())
    }

    pub fn css(value: impl Into<String>) -> Self {
        Descriptor::Css(value.into())
    }

    pub fn partial_link_text(value: impl Into<String>) -> Self {
        Descriptor::PartialLinkText(value.into())
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Descriptor::XPath(value.into())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::Name(v) => write!(f, "name={v}"),
            Descriptor::Id(v) => write!(f, "id={v}"),
            Descriptor::Css(v) => write!(f, "css={v}"),
            Descriptor::PartialLinkText(v) => write!(f, "link~={v}"),
            Descriptor::XPath(v) => write!(f, "xpath={v}"),
        }
    }
}

/// An ordered sequence of descriptors for one logical control.
///
/// Order encodes preference, not exclusivity: when several descriptors match
/// the live document, the earliest one in the set is the one returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSet {
    candidates: Vec<Descriptor>,
}

impl CandidateSet {
    pub fn new(candidates: Vec<Descriptor>) -> Self {
        Self { candidates }
    }

    pub fn single(descriptor: Descriptor) -> Self {
        Self {
            candidates: vec![descriptor],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Descriptor> {
        self.candidates.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Concatenate two sets, preserving order.
    pub fn chain(mut self, other: CandidateSet) -> Self {
        self.candidates.extend(other.candidates);
        self
    }
}

impl From<Descriptor> for CandidateSet {
    fn from(descriptor: Descriptor) -> Self {
        CandidateSet::single(descriptor)
    }
}

impl fmt::Display for CandidateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.candidates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_strategy() {
        assert_eq!(Descriptor::name("passwd").to_string(), "name=passwd");
        assert_eq!(
            Descriptor::css("input[type='tel']").to_string(),
            "css=input[type='tel']"
        );
    }

    #[test]
    fn chain_preserves_order() {
        let set = CandidateSet::single(Descriptor::id("a"))
            .chain(CandidateSet::single(Descriptor::id("b")));
        let ids: Vec<String> = set.iter().map(|d| d.to_string()).collect();
        assert_eq!(ids, vec!["id=a", "id=b"]);
    }
}
