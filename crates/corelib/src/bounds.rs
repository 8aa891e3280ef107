//! Partition boundaries handed to the scan planner.

use crate::document::{as_document, get_field, Document};
use crate::error::{Error, Result};
use crate::key::SplitKey;
use crate::value::BoundValue;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// A lower-inclusive, upper-exclusive range over the split key.
///
/// `min` and `max` hold one value per split-key field, in split-key order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionBoundary {
    key: SplitKey,
    min: Vec<BoundValue>,
    max: Vec<BoundValue>,
}

impl PartitionBoundary {
    /// Builds a boundary. `min` and `max` must have one value per key field.
    pub fn new(key: SplitKey, min: Vec<BoundValue>, max: Vec<BoundValue>) -> Result<Self> {
        if min.len() != key.len() || max.len() != key.len() {
            return Err(Error::InvalidDocument(format!(
                "boundary over `{}` needs {} value(s) per side, got {} / {}",
                key,
                key.len(),
                min.len(),
                max.len()
            )));
        }
        Ok(Self { key, min, max })
    }

    pub fn key(&self) -> &SplitKey {
        &self.key
    }

    pub fn min(&self) -> &[BoundValue] {
        &self.min
    }

    pub fn max(&self) -> &[BoundValue] {
        &self.max
    }

    /// Lower bound of the leading split-key field.
    pub fn lower(&self) -> &BoundValue {
        &self.min[0]
    }

    /// Upper bound of the leading split-key field.
    pub fn upper(&self) -> &BoundValue {
        &self.max[0]
    }

    /// True when the range `[min, max)` is empty. Happens when the split key
    /// is a strict prefix of the shard key and adjacent chunks share a value.
    pub fn is_degenerate(&self) -> bool {
        self.min >= self.max
    }

    /// Lower-inclusive / upper-exclusive membership test for a record.
    ///
    /// Missing fields compare as `null`.
    pub fn contains(&self, record: &Document) -> bool {
        let values: Vec<BoundValue> = self
            .key
            .fields()
            .iter()
            .map(|field| {
                get_field(record, field)
                    .map(BoundValue::from_json)
                    .unwrap_or(BoundValue::Value(Value::Null))
            })
            .collect();
        self.min <= values && values < self.max
    }

    /// `{"min": {<key>: <value>}, "max": {<key>: <value>}}`.
    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("min".to_string(), Value::Object(self.side(&self.min)));
        doc.insert("max".to_string(), Value::Object(self.side(&self.max)));
        doc
    }

    /// A query filter matching exactly the records [`contains`] accepts.
    ///
    /// A single-field boundary gives `{<key>: {"$gte": min, "$lt": max}}`
    /// with sentinel sides left out, so a fully open range yields an empty
    /// filter. Compound boundaries compare lexicographically: each side
    /// becomes an `$or` of "equal on the leading fields, past the bound on
    /// the next one" terms, and the two sides are joined with `$and`. A
    /// boundary no record can fall into yields `{<key>: {"$in": []}}`.
    ///
    /// [`contains`]: PartitionBoundary::contains
    pub fn to_filter(&self) -> Document {
        let mut clauses = Vec::new();
        for lower in [true, false] {
            match self.clause(lower) {
                Clause::Any => {}
                Clause::Terms(terms) if terms.is_empty() => {
                    let nothing = single("$in", Value::Array(Vec::new()));
                    return single(self.key.first(), Value::Object(nothing));
                }
                Clause::Terms(terms) => clauses.push(any_of(terms)),
            }
        }

        let mut clauses = clauses.into_iter();
        match (clauses.next(), clauses.next()) {
            (None, _) => Document::new(),
            (Some(only), None) => only,
            (Some(lower), Some(upper)) => merge(&lower, &upper).unwrap_or_else(|| {
                single(
                    "$and",
                    Value::Array(vec![Value::Object(lower), Value::Object(upper)]),
                )
            }),
        }
    }

    /// Terms whose union is `record >= min` (lower) or `record < max`.
    fn clause(&self, lower: bool) -> Clause {
        let bounds = if lower { &self.min } else { &self.max };
        let fields = self.key.fields();
        let last = fields.len() - 1;

        let mut terms: Vec<Document> = Vec::new();
        let mut prefix = Document::new();
        for (i, (field, bound)) in fields.iter().zip(bounds).enumerate() {
            let open = if lower { bound.is_min_key() } else { bound.is_max_key() };
            if open {
                if i == 0 {
                    return Clause::Any;
                }
                // Every value of this field passes, so the previous field
                // may also equal its bound.
                if let Some(term) = terms.last_mut() {
                    widen(term, &fields[i - 1]);
                }
                break;
            }
            // The opposite sentinel admits nothing at or past this field.
            let Some(value) = bound.as_value() else {
                break;
            };

            let op = match (lower, i == last) {
                (true, true) => "$gte",
                (true, false) => "$gt",
                (false, _) => "$lt",
            };
            let mut term = prefix.clone();
            term.insert(field.clone(), Value::Object(single(op, value.clone())));
            terms.push(term);
            prefix.insert(field.clone(), Value::Object(single("$eq", value.clone())));
        }
        Clause::Terms(terms)
    }

    /// Parses the shape produced by [`PartitionBoundary::to_document`].
    pub fn from_document(doc: &Document) -> Result<Self> {
        let min = as_document(
            doc.get("min").ok_or_else(|| missing("min"))?,
            "boundary min",
        )?;
        let max = as_document(
            doc.get("max").ok_or_else(|| missing("max"))?,
            "boundary max",
        )?;

        let key = SplitKey::compound(min.keys().cloned())?;
        if !max.keys().eq(min.keys()) {
            return Err(Error::InvalidDocument(format!(
                "boundary min/max keys differ: {} vs {}",
                json!(min.keys().collect::<Vec<_>>()),
                json!(max.keys().collect::<Vec<_>>())
            )));
        }

        let min = min.values().map(BoundValue::from_json).collect();
        let max = max.values().map(BoundValue::from_json).collect();
        Self::new(key, min, max)
    }

    fn side(&self, values: &[BoundValue]) -> Document {
        self.key
            .fields()
            .iter()
            .zip(values)
            .map(|(field, value)| (field.clone(), value.to_json()))
            .collect()
    }
}

enum Clause {
    /// No constraint.
    Any,
    /// Any of the terms; no terms means nothing matches.
    Terms(Vec<Document>),
}

fn single(name: &str, value: Value) -> Document {
    let mut doc = Document::new();
    doc.insert(name.to_string(), value);
    doc
}

fn any_of(mut terms: Vec<Document>) -> Document {
    if terms.len() == 1 {
        return terms.pop().unwrap_or_default();
    }
    single("$or", Value::Array(terms.into_iter().map(Value::Object).collect()))
}

/// `$gt` becomes `$gte` and `$lt` becomes `$lte` on `field`.
fn widen(term: &mut Document, field: &str) {
    let Some(Value::Object(ops)) = term.get(field) else {
        return;
    };
    let widened = ops
        .iter()
        .map(|(op, value)| {
            let op = match op.as_str() {
                "$gt" => "$gte",
                "$lt" => "$lte",
                other => other,
            };
            (op.to_string(), value.clone())
        })
        .collect();
    term.insert(field.to_string(), Value::Object(widened));
}

/// Folds two conjuncts into one document when no field repeats an operator.
fn merge(a: &Document, b: &Document) -> Option<Document> {
    if a.contains_key("$or") || b.contains_key("$or") {
        return None;
    }
    let mut merged = a.clone();
    for (field, cond) in b {
        match (merged.get_mut(field), cond) {
            (None, _) => {
                merged.insert(field.clone(), cond.clone());
            }
            (Some(Value::Object(ops)), Value::Object(more)) => {
                for (op, value) in more {
                    if ops.contains_key(op) {
                        return None;
                    }
                    ops.insert(op.clone(), value.clone());
                }
            }
            _ => return None,
        }
    }
    Some(merged)
}

fn missing(field: &str) -> Error {
    Error::InvalidDocument(format!("boundary is missing `{}`", field))
}

impl fmt::Display for PartitionBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [", self.key)?;
        for (i, v) in self.min.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, " .. ")?;
        for (i, v) in self.max.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

impl Serialize for PartitionBoundary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PartitionBoundary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let doc = Document::deserialize(deserializer)?;
        Self::from_document(&doc).map_err(serde::de::Error::custom)
    }
}
