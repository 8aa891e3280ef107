//! Shard keys and split keys.
//!
//! A shard key is the ordered field list a collection is distributed on. A
//! split key is the field (or leading fields) a caller wants partition
//! boundaries expressed over; it is expected to be a prefix of the shard key.

use crate::document::Document;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Field(s) partition boundaries are keyed on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SplitKey {
    fields: Vec<String>,
}

impl SplitKey {
    /// A split key over a single field.
    pub fn new(field: impl Into<String>) -> Result<Self> {
        Self::compound([field.into()])
    }

    /// A split key over the given leading fields, in order.
    pub fn compound<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = validate_fields(fields.into_iter().map(Into::into).collect())?;
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The leading field.
    pub fn first(&self) -> &str {
        &self.fields[0]
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn is_compound(&self) -> bool {
        self.fields.len() > 1
    }
}

impl FromStr for SplitKey {
    type Err = Error;

    /// Parses `"a"` or `"a,b"`.
    fn from_str(s: &str) -> Result<Self> {
        Self::compound(s.split(',').map(str::trim))
    }
}

impl fmt::Display for SplitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fields.join(","))
    }
}

/// The full key a collection is sharded on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShardKey {
    fields: Vec<String>,
}

impl ShardKey {
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = validate_fields(fields.into_iter().map(Into::into).collect())?;
        Ok(Self { fields })
    }

    /// Reads a key pattern such as `{"a": 1, "b": "hashed"}`. Only the field
    /// names and their order matter.
    pub fn from_pattern(pattern: &Document) -> Result<Self> {
        Self::new(pattern.keys().cloned())
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// True if `split` names the leading fields of this shard key.
    pub fn is_prefix(&self, split: &SplitKey) -> bool {
        split.len() <= self.fields.len()
            && split
                .fields()
                .iter()
                .zip(self.fields.iter())
                .all(|(s, k)| s == k)
    }
}

impl FromStr for ShardKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.split(',').map(str::trim))
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: 1", field)?;
        }
        write!(f, "}}")
    }
}

fn validate_fields(fields: Vec<String>) -> Result<Vec<String>> {
    if fields.is_empty() {
        return Err(Error::InvalidKey("key has no fields".to_string()));
    }
    for (i, field) in fields.iter().enumerate() {
        if field.is_empty() {
            return Err(Error::InvalidKey(format!("empty field name at position {}", i)));
        }
        if field.starts_with('$') {
            return Err(Error::InvalidKey(format!("field name `{}` starts with '$'", field)));
        }
        if fields[..i].contains(field) {
            return Err(Error::InvalidKey(format!("duplicate field `{}`", field)));
        }
    }
    Ok(fields)
}
