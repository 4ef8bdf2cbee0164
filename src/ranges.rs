/*
MIT License

Copyright (c) 2026 Raja Lehtihet and Wael El Oraiby

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

//! Integer ranges for free variables and their enumeration order.

use crate::IntExpr;
use std::fmt;

/// Half-open integer interval `[min, min + extent)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// Smallest value in the range.
    pub min: i64,
    /// Number of values; must be non-negative when enumerated.
    pub extent: i64,
}

impl Range {
    pub fn new(min: i64, extent: i64) -> Self {
        Self { min, extent }
    }

    /// Builds `[begin, end)`; an empty range when `end <= begin`.
    pub fn from_bounds(begin: i64, end: i64) -> Self {
        Self {
            min: begin,
            extent: end.saturating_sub(begin).max(0),
        }
    }

    /// Exclusive upper bound, or `None` on overflow.
    pub fn end(&self) -> Option<i64> {
        self.min.checked_add(self.extent)
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && self.end().map_or(true, |end| value < end)
    }

    /// Membership as a predicate: `var >= min && var < min + extent`.
    pub fn condition(&self, var: &str) -> IntExpr {
        IntExpr::and(
            IntExpr::ge(IntExpr::var(var), IntExpr::int(self.min)),
            IntExpr::lt(
                IntExpr::var(var),
                IntExpr::add(IntExpr::int(self.min), IntExpr::int(self.extent)),
            ),
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "[{}, {})", self.min, end),
            None => write!(f, "[{}, {} + {})", self.min, self.min, self.extent),
        }
    }
}

/// Insertion-ordered set of variable ranges.
///
/// The first entry varies slowest when a grid is enumerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarRanges {
    entries: Vec<(String, Range)>,
}

impl VarRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name`, replacing an existing entry in place.
    pub fn insert(&mut self, name: impl Into<String>, range: Range) {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = range,
            None => self.entries.push((name, range)),
        }
    }

    /// Builder form of [`VarRanges::insert`].
    pub fn with(mut self, name: impl Into<String>, range: Range) -> Self {
        self.insert(name, range);
        self
    }

    /// Overlays `other`; its ranges win on conflicting names.
    pub fn union_with(&mut self, other: &VarRanges) {
        for (name, range) in &other.entries {
            self.insert(name.clone(), *range);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Range> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, range)| range)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Range)> {
        self.entries.iter().map(|(name, range)| (name.as_str(), range))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first variable with a negative extent.
    pub fn first_negative(&self) -> Option<(&str, &Range)> {
        self.iter().find(|(_, range)| range.extent < 0)
    }

    /// Grid shape (one axis per variable), `None` for negative extents.
    pub fn shape(&self) -> Option<Vec<usize>> {
        self.entries
            .iter()
            .map(|(_, range)| usize::try_from(range.extent).ok())
            .collect()
    }

    /// Number of grid points, `None` for negative extents or overflow.
    pub fn point_count(&self) -> Option<u64> {
        self.entries.iter().try_fold(1u64, |acc, (_, range)| {
            let extent = u64::try_from(range.extent).ok()?;
            acc.checked_mul(extent)
        })
    }
}

impl<S: Into<String>> FromIterator<(S, Range)> for VarRanges {
    fn from_iter<T: IntoIterator<Item = (S, Range)>>(iter: T) -> Self {
        let mut ranges = VarRanges::new();
        for (name, range) in iter {
            ranges.insert(name, range);
        }
        ranges
    }
}

impl fmt::Display for VarRanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, (name, range)) in self.entries.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {range}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_in_place_and_keeps_order() {
        let mut ranges = VarRanges::new()
            .with("y", Range::new(0, 3))
            .with("x", Range::new(0, 4));
        ranges.insert("y", Range::new(5, 2));
        let names: Vec<&str> = ranges.names().collect();
        assert_eq!(names, vec!["y", "x"]);
        assert_eq!(ranges.get("y"), Some(&Range::new(5, 2)));
    }

    #[test]
    fn union_prefers_overlay() {
        let mut global = VarRanges::new().with("n", Range::new(0, 8));
        let local = VarRanges::new()
            .with("n", Range::new(1, 2))
            .with("i", Range::new(0, 3));
        global.union_with(&local);
        assert_eq!(global.len(), 2);
        assert_eq!(global.get("n"), Some(&Range::new(1, 2)));
        assert_eq!(global.to_string(), "{n: [1, 3), i: [0, 3)}");
    }

    #[test]
    fn point_count_and_shape() {
        let ranges = VarRanges::new()
            .with("a", Range::new(-2, 3))
            .with("b", Range::new(0, 4));
        assert_eq!(ranges.point_count(), Some(12));
        assert_eq!(ranges.shape(), Some(vec![3, 4]));
        assert_eq!(VarRanges::new().point_count(), Some(1));

        let bad = ranges.with("c", Range::new(0, -1));
        assert_eq!(bad.point_count(), None);
        assert_eq!(bad.first_negative().map(|(name, _)| name), Some("c"));
    }

    #[test]
    fn from_bounds_clamps_empty_intervals() {
        assert_eq!(Range::from_bounds(3, 7), Range::new(3, 4));
        assert_eq!(Range::from_bounds(7, 3).extent, 0);
        assert!(Range::new(3, 4).contains(6));
        assert!(!Range::new(3, 4).contains(7));
    }
}
