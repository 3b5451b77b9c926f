//! Collection locators.
//!
//! A locator names the element collection a buffer proxy reads from. It
//! is resolved against the host on every transfer, because hosts discard
//! and rebuild collections when topology changes.

use std::fmt;
use std::str::FromStr;

use crate::util::{Error, Result};

/// Name of the host's attribute layer registry.
pub const ATTRIBUTES_COLLECTION: &str = "attributes";

/// Where to find a collection on a host object.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollectionLocator {
    /// A collection directly on the object (e.g. "vertices").
    Named(String),
    /// An entry of a keyed sub-collection (e.g. `attributes['UVMap']`).
    Keyed { collection: String, key: String },
}

impl CollectionLocator {
    /// Locator for a collection directly on the object.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Locator for the elements of an attribute layer.
    pub fn attribute(layer: impl Into<String>) -> Self {
        Self::Keyed {
            collection: ATTRIBUTES_COLLECTION.to_string(),
            key: layer.into(),
        }
    }

    /// Parse `name` or `name['key']` (double quotes also accepted).
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(open) = s.find('[') else {
            if is_identifier(s) {
                return Ok(Self::Named(s.to_string()));
            }
            return Err(Error::InvalidLocator(s.to_string()));
        };

        let collection = &s[..open];
        let rest = &s[open + 1..];
        let key = rest
            .strip_suffix(']')
            .and_then(|inner| {
                inner
                    .strip_prefix('\'')
                    .and_then(|k| k.strip_suffix('\''))
                    .or_else(|| inner.strip_prefix('"').and_then(|k| k.strip_suffix('"')))
            })
            .ok_or_else(|| Error::InvalidLocator(s.to_string()))?;

        if !is_identifier(collection) {
            return Err(Error::InvalidLocator(s.to_string()));
        }

        Ok(Self::Keyed {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl FromStr for CollectionLocator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Accepts both spellings: `"vertices"` and `"attributes['UVMap']"`.
/// A string that does not parse is taken as a plain collection name, and
/// the host reports it as missing on the first transfer.
impl From<&str> for CollectionLocator {
    fn from(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|_| Self::Named(s.to_string()))
    }
}

impl fmt::Display for CollectionLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Keyed { collection, key } => write!(f, "{collection}['{key}']"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named() {
        assert_eq!(
            CollectionLocator::parse("vertices").unwrap(),
            CollectionLocator::named("vertices")
        );
    }

    #[test]
    fn test_parse_keyed() {
        let loc = CollectionLocator::parse("attributes['Col']").unwrap();
        assert_eq!(loc, CollectionLocator::attribute("Col"));
        assert_eq!(loc.to_string(), "attributes['Col']");

        // keys may contain anything but the closing quote
        let loc: CollectionLocator = "attributes[\"Can I haz?\"]".parse().unwrap();
        assert_eq!(loc, CollectionLocator::attribute("Can I haz?"));
    }

    #[test]
    fn test_from_str_slice() {
        let loc = CollectionLocator::from("attributes['UVMap']");
        assert_eq!(loc, CollectionLocator::attribute("UVMap"));
        assert_eq!(
            CollectionLocator::from("polygons"),
            CollectionLocator::named("polygons")
        );
        // unparsable text stays a plain name
        assert_eq!(
            CollectionLocator::from("attributes['UVMap'"),
            CollectionLocator::Named("attributes['UVMap'".to_string())
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(CollectionLocator::parse("attributes['Col'").is_err());
        assert!(CollectionLocator::parse("attributes[Col]").is_err());
        assert!(CollectionLocator::parse("2d").is_err());
        assert!(CollectionLocator::parse("").is_err());
    }
}
