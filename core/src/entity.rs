//! Immutable records hydrated from JSON objects.
//!
//! # Design
//! An `Entity` is a projection of one JSON object through a `Schema`. Each
//! declared field is stored in schema order as a three-state `Field`:
//! `Absent`, `Empty` or `Present`. Keeping "the key was missing" apart from
//! "the key held `{}`" is what lets `to_json` reproduce the source object
//! exactly. Entities have no setters; they are created once by `hydrate` and
//! dropped with their envelope.

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use crate::error::{MalformedReason, MalformedRecordError};
use crate::schema::{FieldKind, FieldSpec, Schema};

/// A hydrated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Number),
    Boolean(bool),
    Record(Entity),
    List(Vec<FieldValue>),
    Any(Value),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            FieldValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Entity> {
        match self {
            FieldValue::Record(e) => Some(e),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Number(n) => Value::Number(n.clone()),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Record(e) => e.to_json(),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Any(v) => v.clone(),
        }
    }
}

/// Presence state of one declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// The key was missing (or an optional key held `null`).
    Absent,
    /// An optional key held an empty string, array or object.
    Empty,
    Present(FieldValue),
}

impl Field {
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn value(&self) -> Option<&FieldValue> {
        match self {
            Field::Present(v) => Some(v),
            Field::Absent | Field::Empty => None,
        }
    }
}

/// An immutable record hydrated against a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    schema: &'static Schema,
    fields: Vec<Field>,
}

impl Entity {
    /// Build an entity from one JSON object.
    ///
    /// Fails when `value` is not an object, when a required field is missing
    /// or null, or when any field does not match its declared kind. Keys the
    /// schema does not declare are ignored.
    pub fn hydrate(value: &Value, schema: &'static Schema) -> Result<Self, MalformedRecordError> {
        let object = value.as_object().ok_or_else(|| {
            MalformedRecordError::new(
                schema.name,
                "",
                MalformedReason::NotAnObject {
                    found: json_type(value),
                },
            )
        })?;

        let fields = schema
            .fields
            .iter()
            .map(|spec| hydrate_field(schema, spec, object))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { schema, fields })
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// State of a declared field; `None` when the schema has no such key.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.schema.position(name).and_then(|i| self.fields.get(i))
    }

    /// `true` when the field is undeclared or was absent from the source.
    pub fn is_absent(&self, name: &str) -> bool {
        self.field(name).map_or(true, Field::is_absent)
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.field(name).and_then(Field::value)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.field(name)? {
            Field::Present(value) => value.as_text(),
            Field::Empty => Some(""),
            Field::Absent => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.value(name)?.as_number()?.as_f64()
    }

    /// Whole floats such as `12.0` read as integers too.
    pub fn integer(&self, name: &str) -> Option<i64> {
        let n = self.value(name)?.as_number()?;
        n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        })
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.value(name)? {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn record(&self, name: &str) -> Option<&Entity> {
        self.value(name)?.as_record()
    }

    /// Items of a list field; an empty list yields an empty slice.
    pub fn list(&self, name: &str) -> Option<&[FieldValue]> {
        match self.field(name)? {
            Field::Present(FieldValue::List(items)) => Some(items),
            Field::Empty => Some(&[]),
            _ => None,
        }
    }

    /// Serialize back to the canonical wire object.
    ///
    /// Absent fields are omitted, empty fields are re-emitted in their
    /// original shape and present fields verbatim.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        for (spec, field) in self.schema.fields.iter().zip(&self.fields) {
            match field {
                Field::Absent => {}
                Field::Empty => {
                    object.insert(spec.name.to_string(), empty_shape(&spec.kind));
                }
                Field::Present(value) => {
                    object.insert(spec.name.to_string(), value.to_json());
                }
            }
        }
        Value::Object(object)
    }
}

impl Serialize for Entity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

fn hydrate_field(
    schema: &'static Schema,
    spec: &FieldSpec,
    object: &Map<String, Value>,
) -> Result<Field, MalformedRecordError> {
    let raw = match (object.get(spec.name), spec.is_required()) {
        (None, true) => {
            return Err(MalformedRecordError::new(
                schema.name,
                spec.name,
                MalformedReason::MissingField,
            ));
        }
        (Some(Value::Null), true) => {
            return Err(MalformedRecordError::new(
                schema.name,
                spec.name,
                MalformedReason::WrongType {
                    expected: spec.kind.describe(),
                    found: "null",
                },
            ));
        }
        (None | Some(Value::Null), false) => return Ok(Field::Absent),
        (Some(raw), _) => raw,
    };

    if !spec.is_required() && is_empty_shape(&spec.kind, raw) {
        return Ok(Field::Empty);
    }

    hydrate_value(schema, &spec.kind, raw)
        .map(Field::Present)
        .map_err(|e| e.within(spec.name))
}

fn hydrate_value(
    schema: &'static Schema,
    kind: &FieldKind,
    raw: &Value,
) -> Result<FieldValue, MalformedRecordError> {
    let mismatch = || {
        MalformedRecordError::new(
            schema.name,
            "",
            MalformedReason::WrongType {
                expected: kind.describe(),
                found: json_type(raw),
            },
        )
    };

    match (kind, raw) {
        (FieldKind::Text, Value::String(s)) => Ok(FieldValue::Text(s.clone())),
        (FieldKind::Number, Value::Number(n)) => Ok(FieldValue::Number(n.clone())),
        (FieldKind::Integer, Value::Number(n)) if is_whole(n) => Ok(FieldValue::Number(n.clone())),
        (FieldKind::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(*b)),
        (FieldKind::Record(nested), Value::Object(_)) => Entity::hydrate(raw, nested)
            .map(FieldValue::Record)
            .map_err(|e| MalformedRecordError { record: schema.name, ..e }),
        (FieldKind::List(item_kind), Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                hydrate_value(schema, item_kind, item).map_err(|e| e.within(&format!("[{i}]")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::List),
        (FieldKind::Any, _) => Ok(FieldValue::Any(raw.clone())),
        _ => Err(mismatch()),
    }
}

/// Optional `""`, `[]` and `{}` are kept as `Field::Empty`; nested schemas
/// are not applied to an empty object.
fn is_empty_shape(kind: &FieldKind, raw: &Value) -> bool {
    match (kind, raw) {
        (FieldKind::Text, Value::String(s)) => s.is_empty(),
        (FieldKind::List(_), Value::Array(items)) => items.is_empty(),
        (FieldKind::Record(_), Value::Object(map)) => map.is_empty(),
        _ => false,
    }
}

fn empty_shape(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::List(_) => Value::Array(Vec::new()),
        FieldKind::Record(_) => Value::Object(Map::new()),
        _ => Value::String(String::new()),
    }
}

/// An integral JSON number, written either as an integer or as a float with
/// no fractional part (`12.0`), within the i64/u64 range.
fn is_whole(n: &Number) -> bool {
    n.is_i64()
        || n.is_u64()
        || n
            .as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f >= i64::MIN as f64 && f < u64::MAX as f64)
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
