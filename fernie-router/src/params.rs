use smallvec::SmallVec;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use crate::path::Span;

/// The parameters captured while descending a route tree. Each value is
/// stored as a span of the original request path.
///
#[derive(Clone, Default)]
pub struct PathParams {
    data: SmallVec<[(Arc<str>, Span); 4]>,
}

impl PathParams {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the span of the parameter with the provided name.
    ///
    pub fn get(&self, predicate: &str) -> Option<Span> {
        self.data.iter().find_map(|(name, at)| {
            if predicate == &**name {
                Some(*at)
            } else {
                None
            }
        })
    }

    /// Inserts a parameter. If a parameter with the same name was captured at
    /// a shallower level, its span is replaced in place.
    ///
    pub fn insert(&mut self, name: Arc<str>, at: Span) {
        match self.data.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, span)) => *span = at,
            None => self.data.push((name, at)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Span)> {
        self.data.iter().map(|(name, at)| (&**name, *at))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Debug for PathParams {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::PathParams;

    #[test]
    fn test_insert_replaces_existing_name() {
        let mut params = PathParams::new();

        params.insert("id".into(), [1, 2]);
        params.insert("slug".into(), [3, 8]);
        params.insert("id".into(), [9, 11]);

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some([9, 11]));
        assert_eq!(params.get("slug"), Some([3, 8]));
        assert_eq!(params.get("missing"), None);

        let names: Vec<_> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["id", "slug"]);
    }
}
