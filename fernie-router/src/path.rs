use smallvec::SmallVec;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use std::{iter, slice};

use crate::error::PatternError;

/// A half-open byte range `[start, end]` within a path.
///
pub type Span = [usize; 2];

/// A compiled path pattern that matches a prefix of the unconsumed portion of
/// a request path.
///
/// Patterns are made of `/` separated segments:
///
/// - `:name` captures exactly one non-empty path segment.
/// - `*name` captures the rest of the path and must be the last segment.
/// - Anything else is compared byte-for-byte.
///
#[derive(Clone, PartialEq)]
pub struct Pattern {
    source: Box<str>,
    segments: SmallVec<[Segment; 4]>,
}

/// The result of a successful call to [`Pattern::matches`].
///
#[derive(Debug, PartialEq)]
pub struct Match {
    len: usize,
    captures: SmallVec<[(Arc<str>, Span); 2]>,
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Static(Box<str>),
    Dynamic(Arc<str>),
    Wildcard(Arc<str>),
}

struct Split<'a> {
    path: &'a str,
    offset: usize,
    bytes: iter::Enumerate<slice::Iter<'a, u8>>,
}

impl Pattern {
    /// Compiles `source` into a pattern.
    ///
    /// A leading `/` is optional and a single trailing `/` is ignored. The
    /// patterns `""` and `"/"` match any path without consuming it.
    ///
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        let mut segments = SmallVec::new();
        let mut split = Split::new(source).peekable();

        while let Some((segment, _)) = split.next() {
            let is_last = split.peek().is_none();

            segments.push(match segment.chars().next() {
                // An empty segment can only occur between two consecutive
                // slashes. Split skips the leading and trailing slash.
                None => return Err(PatternError::EmptySegment(source.to_owned())),

                // Segments that start with a colon are dynamic. The remaining
                // characters are the name of the parameter.
                Some(':') => match segment.get(1..) {
                    None | Some("") => {
                        return Err(PatternError::UnnamedDynamic(source.to_owned()));
                    }
                    Some(name) => Segment::Dynamic(name.into()),
                },

                // Segments that start with an asterisk capture the rest of the
                // path. They are only valid in the last position.
                Some('*') => match segment.get(1..) {
                    None | Some("") => {
                        return Err(PatternError::UnnamedWildcard(source.to_owned()));
                    }
                    Some(_) if !is_last => {
                        return Err(PatternError::WildcardNotLast(source.to_owned()));
                    }
                    Some(name) => Segment::Wildcard(name.into()),
                },

                _ => Segment::Static(segment.into()),
            });
        }

        Ok(Self {
            source: source.into(),
            segments,
        })
    }

    /// Returns the source string the pattern was compiled from.
    ///
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns an iterator over the names of the parameters declared in the
    /// pattern.
    ///
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Dynamic(name) | Segment::Wildcard(name) => Some(&**name),
            Segment::Static(_) => None,
        })
    }

    /// Attempts to match the pattern against a prefix of `remainder`.
    ///
    /// Matching stops at segment boundaries. `/one` matches `/one`, `/one/`,
    /// and the `/one` prefix of `/one/two`, but not `/onetwo`. A trailing
    /// slash at the very end of `remainder` is consumed along with the final
    /// segment.
    ///
    pub fn matches(&self, remainder: &str) -> Option<Match> {
        let bytes = remainder.as_bytes();
        let mut captures = SmallVec::new();
        let mut offset = 0;

        for segment in &self.segments {
            if let Segment::Wildcard(name) = segment {
                let start = match bytes.get(offset) {
                    Some(b'/') => offset + 1,
                    _ => offset,
                };

                captures.push((Arc::clone(name), [start, bytes.len()]));
                offset = bytes.len();
                break;
            }

            // Every other segment must be preceded by a slash.
            if bytes.get(offset) != Some(&b'/') {
                return None;
            }

            let start = offset + 1;
            let end = bytes
                .get(start..)?
                .iter()
                .position(|b| *b == b'/')
                .map_or(bytes.len(), |len| start + len);

            match segment {
                Segment::Static(label) => {
                    if remainder.get(start..end)? != &**label {
                        return None;
                    }
                }
                Segment::Dynamic(name) => {
                    if start == end {
                        return None;
                    }

                    captures.push((Arc::clone(name), [start, end]));
                }
                Segment::Wildcard(_) => {}
            }

            offset = end;
        }

        if remainder.get(offset..) == Some("/") {
            offset += 1;
        }

        Some(Match {
            len: offset,
            captures,
        })
    }
}

impl Debug for Pattern {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl Match {
    /// Returns the number of bytes of the remainder that were consumed.
    ///
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the match did not consume any part of the path.
    ///
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns an iterator over the captured parameters. Spans are relative
    /// to the remainder that was passed to [`Pattern::matches`].
    ///
    pub fn captures(&self) -> impl Iterator<Item = (&Arc<str>, Span)> {
        self.captures.iter().map(|(name, span)| (name, *span))
    }
}

impl<'a> Split<'a> {
    #[inline]
    fn new(path: &'a str) -> Self {
        Self {
            path,
            offset: 0,
            bytes: path.as_bytes().iter().enumerate(),
        }
    }
}

impl<'a> Iterator for Split<'a> {
    type Item = (&'a str, Span);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let path = &self.path;
        let offset = &mut self.offset;

        for (end, b) in self.bytes.by_ref() {
            if *b == b'/' {
                if end == 0 {
                    *offset += 1;
                } else {
                    let start = *offset;
                    *offset = end + 1;
                    return Some((&path[start..end], [start, end]));
                }
            }
        }

        let end = path.len();
        let start = *offset;

        // Only yield if there's something left between offset and path.len().
        // Prevents slicing past the end on trailing slashes like "/one/".
        if end > start {
            *offset = end;
            Some((&path[start..end], [start, end]))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Pattern, Split};
    use crate::PatternError;

    const PATHS: [&str; 6] = [
        "/home/about",
        "/products/item/123",
        "//home//about",
        "/user/:id/",
        "nested/second",
        "/",
    ];

    fn get_expected_results() -> [Vec<[usize; 2]>; 6] {
        [
            vec![[1, 5], [6, 11]],
            vec![[1, 9], [10, 14], [15, 18]],
            vec![[1, 1], [2, 6], [7, 7], [8, 13]],
            vec![[1, 5], [6, 9]],
            vec![[0, 6], [7, 13]],
            vec![],
        ]
    }

    fn captures(pattern: &str, path: &str) -> Option<(usize, Vec<(String, String)>)> {
        let matched = Pattern::parse(pattern).unwrap().matches(path)?;
        let params = matched
            .captures()
            .map(|(name, [start, end])| (name.to_string(), path[start..end].to_owned()))
            .collect();

        Some((matched.len(), params))
    }

    #[test]
    fn test_split_into() {
        let expected_results = get_expected_results();

        for (i, path) in PATHS.iter().enumerate() {
            assert_eq!(
                Split::new(path).count(),
                expected_results[i].len(),
                "Split produced more or less segments than expected for {}",
                path
            );

            for (j, segment) in Split::new(path).enumerate() {
                let [start, end] = expected_results[i][j];
                let expect = (&path[start..end], [start, end]);

                assert_eq!(segment, expect, "{} ({}, {:?})", path, j, segment);
            }
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Pattern::parse("/users/:"),
            Err(PatternError::UnnamedDynamic("/users/:".to_owned()))
        );
        assert_eq!(
            Pattern::parse("/files/*"),
            Err(PatternError::UnnamedWildcard("/files/*".to_owned()))
        );
        assert_eq!(
            Pattern::parse("/a//b"),
            Err(PatternError::EmptySegment("/a//b".to_owned()))
        );
        assert_eq!(
            Pattern::parse("/files/*path/edit"),
            Err(PatternError::WildcardNotLast("/files/*path/edit".to_owned()))
        );
    }

    #[test]
    fn test_param_names() {
        let pattern = Pattern::parse("/a/:x/b/*rest").unwrap();
        let names: Vec<_> = pattern.params().collect();

        assert_eq!(names, ["x", "rest"]);
        assert_eq!(pattern.as_str(), "/a/:x/b/*rest");
    }

    #[test]
    fn test_static_prefix() {
        assert_eq!(captures("/one", "/one"), Some((4, vec![])));
        assert_eq!(captures("/one", "/one/"), Some((5, vec![])));
        assert_eq!(captures("/one", "/one/two"), Some((4, vec![])));
        assert_eq!(captures("one", "/one/two"), Some((4, vec![])));
        assert_eq!(captures("/one/", "/one/two"), Some((4, vec![])));
        assert_eq!(captures("/nested/test", "/nested/test"), Some((12, vec![])));
    }

    #[test]
    fn test_static_mismatch() {
        assert_eq!(captures("/one", "/onetwo"), None);
        assert_eq!(captures("/one", "/ONE"), None);
        assert_eq!(captures("/one", "one"), None);
        assert_eq!(captures("/one", ""), None);
        assert_eq!(captures("/one/two", "/one"), None);
    }

    #[test]
    fn test_dynamic_segments() {
        assert_eq!(
            captures("/u/:id", "/u/42"),
            Some((5, vec![("id".to_owned(), "42".to_owned())]))
        );
        assert_eq!(
            captures("/a/:x", "/a/1/b/2"),
            Some((4, vec![("x".to_owned(), "1".to_owned())]))
        );

        let expected = vec![
            ("a".to_owned(), "1".to_owned()),
            ("b".to_owned(), "2".to_owned()),
        ];

        assert_eq!(captures("/:a/:b", "/1/2/"), Some((5, expected)));

        // Dynamic segments never capture an empty value.
        assert_eq!(captures("/u/:id", "/u/"), None);
        assert_eq!(captures("/u/:id", "/u//42"), None);
    }

    #[test]
    fn test_wildcard_segments() {
        assert_eq!(
            captures("/echo/*path", "/echo/hello/world"),
            Some((17, vec![("path".to_owned(), "hello/world".to_owned())]))
        );
        assert_eq!(
            captures("/echo/*path", "/echo"),
            Some((5, vec![("path".to_owned(), "".to_owned())]))
        );
        assert_eq!(captures("/echo/*path", "/echoes"), None);
    }

    #[test]
    fn test_empty_pattern() {
        assert_eq!(captures("", "/anything"), Some((0, vec![])));
        assert_eq!(captures("/", "/anything"), Some((0, vec![])));
        assert_eq!(captures("/", "/"), Some((1, vec![])));
        assert_eq!(captures("/", ""), Some((0, vec![])));
    }
}
