//! Bound values and their cross-type ordering.
//!
//! Chunk boundaries are extended-JSON documents whose values are either real
//! values or one of the two open-ended sentinels, `{"$minKey": 1}` and
//! `{"$maxKey": 1}`. [`BoundValue`] captures the distinction and orders
//! values the way the cluster metadata service does, so a scan planner that
//! compares with the same operators sees the same chunk ordering.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// Extended-JSON field naming the minimum sentinel.
pub const MIN_KEY: &str = "$minKey";

/// Extended-JSON field naming the maximum sentinel.
pub const MAX_KEY: &str = "$maxKey";

/// A single boundary value: a real value or an open-ended sentinel.
#[derive(Clone, Debug)]
pub enum BoundValue {
    /// Sorts before every other value (negative infinity).
    MinKey,
    /// A concrete document value.
    Value(Value),
    /// Sorts after every other value (positive infinity).
    MaxKey,
}

impl BoundValue {
    /// Minimum sentinel.
    pub fn min_key() -> Self {
        BoundValue::MinKey
    }

    /// Maximum sentinel.
    pub fn max_key() -> Self {
        BoundValue::MaxKey
    }

    /// True if this is the minimum sentinel.
    pub fn is_min_key(&self) -> bool {
        matches!(self, BoundValue::MinKey)
    }

    /// True if this is the maximum sentinel.
    pub fn is_max_key(&self) -> bool {
        matches!(self, BoundValue::MaxKey)
    }

    /// True for either sentinel.
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, BoundValue::Value(_))
    }

    /// Interprets an extended-JSON value, recognising the sentinel forms.
    pub fn from_json(value: &Value) -> Self {
        match sentinel_of(value) {
            Some(sentinel) => sentinel,
            None => BoundValue::Value(value.clone()),
        }
    }

    /// Renders back to extended JSON.
    pub fn to_json(&self) -> Value {
        match self {
            BoundValue::MinKey => sentinel_doc(MIN_KEY),
            BoundValue::MaxKey => sentinel_doc(MAX_KEY),
            BoundValue::Value(v) => v.clone(),
        }
    }

    /// Returns the concrete value, if this is not a sentinel.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            BoundValue::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for BoundValue {
    fn from(value: Value) -> Self {
        match sentinel_of(&value) {
            Some(sentinel) => sentinel,
            None => BoundValue::Value(value),
        }
    }
}

impl PartialEq for BoundValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BoundValue {}

impl PartialOrd for BoundValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BoundValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (BoundValue::Value(a), BoundValue::Value(b)) => compare_values(a, b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl BoundValue {
    fn rank(&self) -> u8 {
        match self {
            BoundValue::MinKey => 0,
            BoundValue::Value(v) => classify(v).rank(),
            BoundValue::MaxKey => u8::MAX,
        }
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::MinKey => f.write_str(MIN_KEY),
            BoundValue::MaxKey => f.write_str(MAX_KEY),
            BoundValue::Value(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for BoundValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BoundValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(BoundValue::from)
    }
}

/// Compares two extended-JSON values using the metadata service's
/// cross-type order: minKey, null, numbers, strings, objects, arrays,
/// binary data, object ids, booleans, dates, timestamps, regular
/// expressions, maxKey.
///
/// Canonical extended-JSON wrappers (`$numberLong`, `$oid`, `$date`, ...)
/// compare as the BSON type they encode, so `{"$numberLong": "5"}` equals
/// `5`.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    compare_typed(&classify(a), &classify(b))
}

/// A JSON value seen as the BSON type it encodes.
enum Typed<'a> {
    MinKey,
    Null,
    Number(Num),
    String(&'a str),
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    Binary { subtype: &'a str, data: &'a str },
    ObjectId(&'a str),
    Bool(bool),
    Date(DateValue<'a>),
    Timestamp(u64, u64),
    Regex { pattern: &'a str, options: &'a str },
    MaxKey,
}

impl Typed<'_> {
    fn rank(&self) -> u8 {
        match self {
            Typed::MinKey => 0,
            Typed::Null => 1,
            Typed::Number(_) => 2,
            Typed::String(_) => 3,
            Typed::Object(_) => 4,
            Typed::Array(_) => 5,
            Typed::Binary { .. } => 6,
            Typed::ObjectId(_) => 7,
            Typed::Bool(_) => 8,
            Typed::Date(_) => 9,
            Typed::Timestamp(..) => 10,
            Typed::Regex { .. } => 11,
            Typed::MaxKey => u8::MAX,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Num {
    Int(i128),
    Float(f64),
}

/// Dates parsed to epoch milliseconds sort before unparsable date text.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DateValue<'a> {
    Millis(i64),
    Text(&'a str),
}

fn classify(value: &Value) -> Typed<'_> {
    match value {
        Value::Null => Typed::Null,
        Value::Bool(b) => Typed::Bool(*b),
        Value::Number(n) => Typed::Number(num_of(n)),
        Value::String(s) => Typed::String(s),
        Value::Array(items) => Typed::Array(items),
        Value::Object(map) => classify_object(map),
    }
}

fn classify_object(map: &Map<String, Value>) -> Typed<'_> {
    let mut entries = map.iter();
    let (Some((name, inner)), None) = (entries.next(), entries.next()) else {
        return Typed::Object(map);
    };

    let typed = match name.as_str() {
        MIN_KEY => Some(Typed::MinKey),
        MAX_KEY => Some(Typed::MaxKey),
        "$numberInt" | "$numberLong" | "$numberDouble" | "$numberDecimal" => {
            inner.as_str().and_then(parse_num).map(Typed::Number)
        }
        "$symbol" => inner.as_str().map(Typed::String),
        "$oid" => inner.as_str().map(Typed::ObjectId),
        "$date" => date_of(inner).map(Typed::Date),
        "$timestamp" => inner.as_object().and_then(|ts| {
            Some(Typed::Timestamp(ts.get("t")?.as_u64()?, ts.get("i")?.as_u64()?))
        }),
        "$binary" => inner.as_object().and_then(|bin| {
            Some(Typed::Binary {
                subtype: bin.get("subType")?.as_str()?,
                data: bin.get("base64")?.as_str()?,
            })
        }),
        "$uuid" => inner.as_str().map(|uuid| Typed::Binary {
            subtype: "04",
            data: uuid,
        }),
        "$regularExpression" => inner.as_object().and_then(|re| {
            Some(Typed::Regex {
                pattern: re.get("pattern")?.as_str()?,
                options: re.get("options")?.as_str()?,
            })
        }),
        _ => None,
    };
    typed.unwrap_or(Typed::Object(map))
}

fn num_of(n: &serde_json::Number) -> Num {
    if let Some(i) = n.as_i64() {
        Num::Int(i128::from(i))
    } else if let Some(u) = n.as_u64() {
        Num::Int(i128::from(u))
    } else {
        Num::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Parses the string payload of `$numberInt`, `$numberLong`, `$numberDouble`
/// (including `Infinity`, `-Infinity`, `NaN`) and `$numberDecimal`.
fn parse_num(text: &str) -> Option<Num> {
    match text.parse::<i128>() {
        Ok(i) => Some(Num::Int(i)),
        Err(_) => text.parse::<f64>().ok().map(Num::Float),
    }
}

fn date_of(inner: &Value) -> Option<DateValue<'_>> {
    match inner {
        Value::Number(n) => n.as_i64().map(DateValue::Millis),
        Value::Object(wrapped) => wrapped
            .get("$numberLong")?
            .as_str()?
            .parse()
            .ok()
            .map(DateValue::Millis),
        Value::String(text) => Some(match chrono::DateTime::parse_from_rfc3339(text) {
            Ok(date) => DateValue::Millis(date.timestamp_millis()),
            Err(_) => DateValue::Text(text),
        }),
        _ => None,
    }
}

fn compare_typed(a: &Typed<'_>, b: &Typed<'_>) -> Ordering {
    let (ra, rb) = (a.rank(), b.rank());
    if ra != rb {
        return ra.cmp(&rb);
    }

    match (a, b) {
        (Typed::Number(x), Typed::Number(y)) => compare_numbers(*x, *y),
        (Typed::String(x), Typed::String(y)) => x.cmp(y),
        (Typed::Object(x), Typed::Object(y)) => compare_objects(x, y),
        (Typed::Array(x), Typed::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                match compare_values(l, r) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            x.len().cmp(&y.len())
        }
        // Length first, then subtype, then payload.
        (
            Typed::Binary {
                subtype: sa,
                data: da,
            },
            Typed::Binary {
                subtype: sb,
                data: db,
            },
        ) => da
            .len()
            .cmp(&db.len())
            .then_with(|| sa.cmp(sb))
            .then_with(|| da.cmp(db)),
        (Typed::ObjectId(x), Typed::ObjectId(y)) => x
            .bytes()
            .map(|c| c.to_ascii_lowercase())
            .cmp(y.bytes().map(|c| c.to_ascii_lowercase())),
        (Typed::Bool(x), Typed::Bool(y)) => x.cmp(y),
        (Typed::Date(x), Typed::Date(y)) => x.cmp(y),
        (Typed::Timestamp(ta, ia), Typed::Timestamp(tb, ib)) => (ta, ia).cmp(&(tb, ib)),
        (
            Typed::Regex {
                pattern: pa,
                options: oa,
            },
            Typed::Regex {
                pattern: pb,
                options: ob,
            },
        ) => pa.cmp(pb).then_with(|| oa.cmp(ob)),
        // null, minKey, maxKey
        _ => Ordering::Equal,
    }
}

fn compare_objects(x: &Map<String, Value>, y: &Map<String, Value>) -> Ordering {
    for ((kx, vx), (ky, vy)) in x.iter().zip(y.iter()) {
        match kx.cmp(ky).then_with(|| compare_values(vx, vy)) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    x.len().cmp(&y.len())
}

/// Numeric order across integer and float representations. NaN sorts below
/// every other number. Integers are never rounded through `f64`.
fn compare_numbers(x: Num, y: Num) -> Ordering {
    match (x, y) {
        (Num::Int(a), Num::Int(b)) => a.cmp(&b),
        (Num::Float(a), Num::Float(b)) => match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        },
        (Num::Int(a), Num::Float(b)) => compare_int_float(a, b),
        (Num::Float(a), Num::Int(b)) => compare_int_float(b, a).reverse(),
    }
}

fn compare_int_float(i: i128, f: f64) -> Ordering {
    if f.is_nan() {
        return Ordering::Greater;
    }
    // Beyond the i128 range only the sign of the float matters.
    if f >= 1.7e38 {
        return Ordering::Less;
    }
    if f <= -1.7e38 {
        return Ordering::Greater;
    }

    let floor = f.floor();
    match i.cmp(&(floor as i128)) {
        Ordering::Equal if f > floor => Ordering::Less,
        other => other,
    }
}

fn sentinel_of(value: &Value) -> Option<BoundValue> {
    match value {
        Value::Object(map) => match sentinel_name(map)? {
            MIN_KEY => Some(BoundValue::MinKey),
            _ => Some(BoundValue::MaxKey),
        },
        _ => None,
    }
}

fn sentinel_name(map: &Map<String, Value>) -> Option<&'static str> {
    if map.len() != 1 {
        return None;
    }
    if map.contains_key(MIN_KEY) {
        Some(MIN_KEY)
    } else if map.contains_key(MAX_KEY) {
        Some(MAX_KEY)
    } else {
        None
    }
}

fn sentinel_doc(name: &str) -> Value {
    let mut map = Map::new();
    map.insert(name.to_string(), Value::from(1));
    Value::Object(map)
}
