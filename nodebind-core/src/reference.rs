//! Type references as written in base lists and field declarations.

use crate::error::{Error, Result};
use std::fmt;

/// One dotted path segment with its generic arity, e.g. `Pool<T>` is
/// `Pool` with arity 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Segment {
    /// Identifier without generic arguments.
    pub name: String,
    /// Number of generic arguments.
    pub arity: usize,
}

impl Segment {
    /// Creates a segment.
    #[must_use]
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }

    /// Creates a segment with no generic arguments.
    #[must_use]
    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, 0)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.arity == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}`{}", self.name, self.arity)
        }
    }
}

/// A reference to a type as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    /// Reference text exactly as written.
    pub text: String,
}

impl TypeReference {
    /// Creates a reference from its source text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Splits the reference into path segments.
    ///
    /// `global::` and other alias qualifiers become ordinary path
    /// separators, nullable and array suffixes are dropped, and generic
    /// arguments are reduced to their count.
    ///
    /// # Errors
    /// Returns an error if the text is empty, its angle brackets do not
    /// balance, or a segment is not an identifier.
    pub fn segments(&self) -> Result<Vec<Segment>> {
        let text = self.text.trim();
        let text = text.strip_prefix("global::").unwrap_or(text);
        let text = text.replace("::", ".");
        let text = text.trim_end_matches(['?', '*']);
        let text = strip_array_suffix(text);
        if text.is_empty() {
            return Err(Error::EmptyReference);
        }

        let mut segments = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (idx, c) in text.char_indices() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth = depth.checked_sub(1).ok_or_else(|| Error::UnbalancedGenerics {
                        text: self.text.clone(),
                    })?;
                }
                '.' if depth == 0 => {
                    segments.push(self.parse_segment(&text[start..idx])?);
                    start = idx + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(Error::UnbalancedGenerics {
                text: self.text.clone(),
            });
        }
        segments.push(self.parse_segment(&text[start..])?);
        Ok(segments)
    }

    /// Returns true if `identifier` occurs as a whole word in the reference.
    #[must_use]
    pub fn mentions(&self, identifier: &str) -> bool {
        self.text
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .any(|word| word == identifier)
    }

    fn parse_segment(&self, raw: &str) -> Result<Segment> {
        let raw = raw.trim();
        let (name, arity) = match raw.find('<') {
            Some(open) => {
                let inner = raw[open + 1..].trim_end().strip_suffix('>').ok_or_else(|| {
                    Error::UnbalancedGenerics {
                        text: self.text.clone(),
                    }
                })?;
                (raw[..open].trim(), count_top_level_arguments(inner))
            }
            None => (raw, 0),
        };
        let name = name.strip_prefix('@').unwrap_or(name);
        let valid = name
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_alphanumeric() || c == '_');
        if !valid {
            return Err(Error::InvalidSegment {
                text: self.text.clone(),
                segment: raw.to_string(),
            });
        }
        Ok(Segment::new(name, arity))
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn strip_array_suffix(text: &str) -> &str {
    let mut text = text.trim_end();
    while let Some(stripped) = text.strip_suffix(']') {
        match stripped.rfind('[') {
            Some(open) => text = stripped[..open].trim_end(),
            None => break,
        }
    }
    text
}

/// Counts comma-separated arguments at nesting depth zero. `<>` and `<,>`
/// (unbound generics) count as one and two.
fn count_top_level_arguments(inner: &str) -> usize {
    let mut depth = 0usize;
    let mut count = 1;
    for c in inner.chars() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_simple() {
        let reference = TypeReference::new("Node2D");
        assert_eq!(reference.segments().unwrap(), vec![Segment::plain("Node2D")]);
    }

    #[test]
    fn test_segments_qualified_generic() {
        let reference = TypeReference::new("global::Game.Pool<Dictionary<string, int>, T>.Slot");
        assert_eq!(
            reference.segments().unwrap(),
            vec![
                Segment::plain("Game"),
                Segment::new("Pool", 2),
                Segment::plain("Slot"),
            ]
        );
    }

    #[test]
    fn test_segments_drop_suffixes() {
        let reference = TypeReference::new("Label?");
        assert_eq!(reference.segments().unwrap(), vec![Segment::plain("Label")]);

        let reference = TypeReference::new("int[,][]");
        assert_eq!(reference.segments().unwrap(), vec![Segment::plain("int")]);
    }

    #[test]
    fn test_segments_unbalanced() {
        let reference = TypeReference::new("Pool<T");
        assert!(matches!(
            reference.segments(),
            Err(Error::UnbalancedGenerics { .. })
        ));
    }

    #[test]
    fn test_segments_empty() {
        assert_eq!(
            TypeReference::new("  ").segments(),
            Err(Error::EmptyReference)
        );
    }

    #[test]
    fn test_segments_invalid() {
        let reference = TypeReference::new("(int, string)");
        assert!(matches!(
            reference.segments(),
            Err(Error::InvalidSegment { .. })
        ));
    }

    #[test]
    fn test_mentions_whole_words_only() {
        let reference = TypeReference::new("List<TItem>");
        assert!(reference.mentions("TItem"));
        assert!(!reference.mentions("T"));
        assert!(reference.mentions("List"));
    }

    #[test]
    fn test_segment_display() {
        assert_eq!(Segment::new("Pool", 2).to_string(), "Pool`2");
        assert_eq!(Segment::plain("Node").to_string(), "Node");
    }
}
