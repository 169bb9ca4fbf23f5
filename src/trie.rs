//! Prefix-tree path matcher.
//!
//! One tree per HTTP method, one node per path segment. Three segment kinds:
//! literals (`users`), single-segment parameters (`:id`), and a trailing
//! remainder-of-path wildcard (`*filepath`). Lookup is depth-first with
//! backtracking: when a literal and a parameter could both consume a
//! segment, every branch is explored until one ends at a registered
//! pattern. Route trees are small and built once at startup, so the matcher
//! favors correctness over cleverness.

use crate::error::Error;

/// Splits a pattern (or request path) into its segments.
///
/// Empty segments are dropped, which collapses repeated slashes and strips
/// the leading and trailing one. The segment list is truncated immediately
/// after the first `*` segment: a wildcard consumes the remainder of the
/// path, so nothing after it can ever match.
pub(crate) fn parse_pattern(pattern: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    for part in pattern.split('/') {
        if part.is_empty() {
            continue;
        }
        parts.push(part);
        if part.starts_with('*') {
            break;
        }
    }
    parts
}

/// One node of the tree. Matches exactly one path segment.
pub(crate) struct Node {
    /// The complete route pattern terminating at this node.
    /// `None` means no registered route ends here.
    pattern: Option<String>,
    /// The segment this node matches, e.g. `users`, `:id`, `*filepath`.
    part: String,
    /// Children, owned exclusively, in insertion order.
    children: Vec<Node>,
    /// True iff `part` begins with `:` or `*`.
    is_wild: bool,
}

impl Node {
    fn new(part: &str) -> Self {
        Self {
            pattern: None,
            is_wild: part.starts_with(':') || part.starts_with('*'),
            part: part.to_owned(),
            children: Vec::new(),
        }
    }

    pub(crate) fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Inserts `pattern` (pre-split into `parts`) below this node.
    ///
    /// At each depth the segment is merged into an existing child when one
    /// matches it literally, or when that child is a wildcard: only one
    /// dynamic child is allowed per position, so a wildcard absorbs every
    /// token inserted at its depth. Two different patterns arriving at the
    /// same terminal node are a configuration error, reported rather than
    /// silently shadowed. Re-inserting the identical pattern is a no-op
    /// (the caller replaces the handler).
    pub(crate) fn insert(&mut self, pattern: &str, parts: &[&str], height: usize) -> Result<(), Error> {
        if parts.len() == height {
            if let Some(existing) = &self.pattern {
                if existing != pattern {
                    return Err(Error::DuplicateRoute {
                        pattern: pattern.to_owned(),
                        existing: existing.clone(),
                    });
                }
            }
            self.pattern = Some(pattern.to_owned());
            return Ok(());
        }

        let part = parts[height];
        let index = match self.children.iter().position(|c| c.part == part || c.is_wild) {
            Some(index) => index,
            None => {
                self.children.push(Node::new(part));
                self.children.len() - 1
            }
        };
        self.children[index].insert(pattern, parts, height + 1)
    }

    /// Depth-first match of a request path against the subtree.
    ///
    /// Matching terminates at this node once all request segments are
    /// consumed, or as soon as the node itself is a `*` wildcard (which
    /// swallows the rest of the path). Either way the node is only a match
    /// if a route actually terminates here. Otherwise every child that
    /// matches the current segment, literally or as a wildcard, is tried
    /// in insertion order, and the first subtree that ends at a registered
    /// pattern wins.
    pub(crate) fn search(&self, parts: &[&str], height: usize) -> Option<&Node> {
        if parts.len() == height || self.part.starts_with('*') {
            return if self.pattern.is_some() { Some(self) } else { None };
        }

        let part = parts[height];
        self.children
            .iter()
            .filter(|child| child.part == part || child.is_wild)
            .find_map(|child| child.search(parts, height + 1))
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
