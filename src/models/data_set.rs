//! Ordered items plus the rule that turns each item into an identifier.

use std::fmt;
use std::sync::Arc;

use crate::error::{GalleryError, Result};

type FormatFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// How an item becomes its identifier.
enum IdentifierSource<T> {
    /// Caller-supplied formatter (or `Display`, for [`DataSet::new`]).
    Formatter(FormatFn<T>),
    /// Items that carry no key of their own are named by position.
    Positional { prefix: String },
}

impl<T> Clone for IdentifierSource<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Formatter(f) => Self::Formatter(Arc::clone(f)),
            Self::Positional { prefix } => Self::Positional {
                prefix: prefix.clone(),
            },
        }
    }
}

/// The ordered sequence a gallery session pages through.
///
/// The formatter must be a pure function of the item: the window cache
/// deduplicates fetches by identifier, so a formatter that returns different
/// keys for the same item breaks sharing. This is not checked at runtime.
#[derive(Clone)]
pub struct DataSet<T> {
    items: Vec<T>,
    source: IdentifierSource<T>,
}

impl<T: fmt::Display> DataSet<T> {
    /// Items are identified by their `Display` output.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            source: IdentifierSource::Formatter(Arc::new(|item: &T| item.to_string())),
        }
    }
}

impl<T> DataSet<T> {
    /// Items are identified by a custom formatter, e.g. a URL field of a struct.
    pub fn with_formatter<F>(items: Vec<T>, formatter: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            items,
            source: IdentifierSource::Formatter(Arc::new(formatter)),
        }
    }

    /// Items are identified as `{prefix}{index}`.
    pub fn positional(items: Vec<T>, prefix: impl Into<String>) -> Self {
        Self {
            items,
            source: IdentifierSource::Positional {
                prefix: prefix.into(),
            },
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifier for the item at `index`, or `None` when out of range.
    pub fn format(&self, index: usize) -> Option<String> {
        let item = self.items.get(index)?;
        Some(match &self.source {
            IdentifierSource::Formatter(f) => f(item),
            IdentifierSource::Positional { prefix } => format!("{prefix}{index}"),
        })
    }

    /// Format every item once, rejecting empty identifiers.
    pub fn identifiers(&self) -> Result<Vec<String>> {
        (0..self.items.len())
            .map(|index| {
                let id = self.format(index).unwrap_or_default();
                if id.trim().is_empty() {
                    Err(GalleryError::FormatterError {
                        index,
                        reason: "identifier is empty".to_string(),
                    })
                } else {
                    Ok(id)
                }
            })
            .collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for DataSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            IdentifierSource::Formatter(_) => "<formatter>".to_string(),
            IdentifierSource::Positional { prefix } => format!("positional({prefix:?})"),
        };
        f.debug_struct("DataSet")
            .field("items", &self.items)
            .field("source", &source)
            .finish()
    }
}

impl<T: fmt::Display> From<Vec<T>> for DataSet<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Photo {
        url: String,
    }

    #[test]
    fn test_display_is_default_identifier() {
        let data = DataSet::new(vec!["a.png", "b.png"]);
        assert_eq!(data.format(1).as_deref(), Some("b.png"));
        assert_eq!(data.format(2), None);
    }

    #[test]
    fn test_custom_formatter() {
        let data = DataSet::with_formatter(
            vec![Photo {
                url: "https://img/1".into(),
            }],
            |p: &Photo| p.url.clone(),
        );
        assert_eq!(data.identifiers().unwrap(), vec!["https://img/1"]);
    }

    #[test]
    fn test_positional_identifiers() {
        let data = DataSet::positional(vec![(), ()], "bitmap:");
        assert_eq!(data.identifiers().unwrap(), vec!["bitmap:0", "bitmap:1"]);
    }

    #[test]
    fn test_empty_identifier_is_formatter_error() {
        let data = DataSet::with_formatter(vec![1, 2, 3], |n: &i32| {
            if *n == 2 {
                String::new()
            } else {
                n.to_string()
            }
        });
        match data.identifiers() {
            Err(GalleryError::FormatterError { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected formatter error, got {other:?}"),
        }
    }
}
