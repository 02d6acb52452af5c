//! Address pattern matching for table dispatch.
//!
//! The [`AddressMatcher`] is a closed lookup table from segment patterns to
//! opaque numeric codes, built once when the router is constructed. Patterns
//! are slash-separated segments where `#` matches one numeric segment and
//! `*` matches any single segment; everything else matches literally.
//! Earlier routes win ties.

use crate::provider::address::Address;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Number,
    Any,
}

#[derive(Debug, Clone)]
struct Route {
    segments: Vec<Segment>,
    code: u32,
}

/// Closed pattern-to-code dispatch table.
#[derive(Debug, Clone, Default)]
pub struct AddressMatcher {
    routes: Vec<Route>,
}

impl AddressMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pattern for a code. Patterns use `#` for a numeric
    /// segment and `*` for any segment.
    pub fn route(&mut self, pattern: &str, code: u32) {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "#" => Segment::Number,
                "*" => Segment::Any,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();
        self.routes.push(Route { segments, code });
    }

    /// Resolves an address to the code of the first matching route.
    pub fn resolve(&self, address: &Address) -> Option<u32> {
        self.routes.iter().find(|route| matches(route, address)).map(|route| route.code)
    }
}

fn matches(route: &Route, address: &Address) -> bool {
    let segments = address.segments();
    if route.segments.len() != segments.len() {
        return false;
    }
    route.segments.iter().zip(segments).all(|(pattern, segment)| match pattern {
        Segment::Literal(literal) => literal == segment,
        Segment::Number => segment.chars().all(|c| c.is_ascii_digit()) && !segment.is_empty(),
        Segment::Any => true,
    })
}
