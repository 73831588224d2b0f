use serde_json::{Map, Value};

use crate::errors::ServiceError;

/// One record: a JSON object expected to carry an `id`.
pub type Resource = Map<String, Value>;

/// Every record, in insertion order.
pub type Collection = Vec<Resource>;

/// Id taken from a request path.
///
/// `NoMatch` stands for a token that did not parse; it never equals any
/// stored id, so lookups with it find nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceId {
    Known(i64),
    NoMatch,
}

impl ResourceId {
    /// Whole token must be an integer.
    pub fn parse_strict(token: &str) -> Result<Self, ServiceError> {
        token
            .parse::<i64>()
            .map(Self::Known)
            .map_err(|_| ServiceError::Validation(format!("invalid resource id {token:?}")))
    }

    /// Leading-integer parse: optional whitespace and sign, then digits.
    /// Trailing garbage is ignored (`"12abc"` is 12) and a `0x` prefix reads
    /// hex (`"0x10"` is 16). No digits means `NoMatch`.
    pub fn parse_lenient(token: &str) -> Self {
        let trimmed = token.trim_start();
        let (negative, rest) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (radix, rest) = match rest.get(..2) {
            Some("0x") | Some("0X") => (16, &rest[2..]),
            _ => (10, rest),
        };
        let digits_len = rest.bytes().take_while(|b| (*b as char).is_digit(radix)).count();
        if digits_len == 0 {
            return Self::NoMatch;
        }
        match i64::from_str_radix(&rest[..digits_len], radix) {
            Ok(n) if negative => Self::Known(-n),
            Ok(n) => Self::Known(n),
            Err(_) => Self::NoMatch,
        }
    }

    pub fn matches(self, record: &Resource) -> bool {
        let Self::Known(id) = self else { return false };
        match record.get("id") {
            Some(Value::Number(n)) => {
                n.as_i64() == Some(id) || (n.is_f64() && n.as_f64() == Some(id as f64))
            }
            _ => false,
        }
    }
}

impl From<i64> for ResourceId {
    fn from(id: i64) -> Self {
        Self::Known(id)
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(id) => write!(f, "{id}"),
            Self::NoMatch => f.write_str("NaN"),
        }
    }
}

/// Decode a request body into a record. Anything but a JSON object is rejected.
pub fn parse_resource(bytes: &[u8]) -> Result<Resource, ServiceError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ServiceError::Parse(format!("expected a JSON object, got {}", kind(&other)))),
        Err(e) => Err(ServiceError::Parse(e.to_string())),
    }
}

/// Decode the persisted document; it must be an array of objects.
pub fn decode_collection(bytes: &[u8]) -> Result<Collection, ServiceError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| ServiceError::Parse(format!("persisted document: {e}")))?;
    let Value::Array(items) = value else {
        return Err(ServiceError::Parse(format!("persisted document is {}, not an array", kind(&value))));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(ServiceError::Parse(format!("element {i} is {}, not an object", kind(&other)))),
        })
        .collect()
}

/// Pretty-printed with two-space indentation.
pub fn encode_collection(collection: &Collection) -> Result<Vec<u8>, ServiceError> {
    serde_json::to_vec_pretty(collection).map_err(|e| ServiceError::Parse(e.to_string()))
}

/// Shallow merge: fields of `patch` overwrite those of `target`, others stay.
pub fn merge(target: &mut Resource, patch: Resource) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
