//! The success-response wrapper shared by every resource.
//!
//! # Design
//! The service wraps payloads as `{"status"?, "data", "metadata"?}`.
//! `ResultEnvelope<T>` mirrors that shape for a single entity, a list of
//! entities, or free-form JSON. Construction and `to_json` are inverses:
//! re-hydrating an envelope's own output yields an identical envelope.
//! List payloads are all-or-nothing; one malformed element fails the whole
//! envelope.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::entity::{json_type, Entity};
use crate::error::{MalformedReason, MalformedRecordError};
use crate::pagination::{extract_paging, Metadata, PaginationState, Paging};
use crate::schema::Schema;

pub const STATUS_KEY: &str = "status";
pub const DATA_KEY: &str = "data";
pub const METADATA_KEY: &str = "metadata";

const ENVELOPE: &str = "resultEnvelope";

/// Anything that can sit under an envelope's `data` key.
pub trait Payload {
    fn to_json(&self) -> Value;
}

impl Payload for Entity {
    fn to_json(&self) -> Value {
        Entity::to_json(self)
    }
}

impl Payload for Vec<Entity> {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(Entity::to_json).collect())
    }
}

impl Payload for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }
}

/// Expected payload shape, for callers that pick it at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Single(&'static Schema),
    List(&'static Schema),
    Raw,
}

/// A payload whose shape was chosen at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Single(Entity),
    List(Vec<Entity>),
    Raw(Value),
}

impl Payload for Data {
    fn to_json(&self) -> Value {
        match self {
            Data::Single(entity) => entity.to_json(),
            Data::List(entities) => entities.to_json(),
            Data::Raw(value) => value.clone(),
        }
    }
}

/// A hydrated success response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEnvelope<T> {
    status: Option<u16>,
    data: T,
    metadata: Option<Metadata>,
}

impl<T> ResultEnvelope<T> {
    fn from_body<F>(body: &Value, hydrate_data: F) -> Result<Self, MalformedRecordError>
    where
        F: FnOnce(&Value) -> Result<T, MalformedRecordError>,
    {
        let object = body.as_object().ok_or_else(|| {
            MalformedRecordError::new(
                ENVELOPE,
                "",
                MalformedReason::NotAnObject { found: json_type(body) },
            )
        })?;

        let status = parse_status(object)?;
        let metadata = parse_metadata(object)?;
        let data = object.get(DATA_KEY).ok_or_else(|| {
            MalformedRecordError::new(ENVELOPE, DATA_KEY, MalformedReason::MissingField)
        })?;

        Ok(Self {
            status,
            data: hydrate_data(data)?,
            metadata,
        })
    }

    /// The `status` echoed in the body, if the service sent one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Paging position of this response relative to what was requested.
    pub fn paging(&self, requested: &Paging) -> PaginationState {
        extract_paging(self.metadata.as_ref(), requested)
    }
}

impl<T: Payload> ResultEnvelope<T> {
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        if let Some(status) = self.status {
            object.insert(STATUS_KEY.to_string(), Value::from(status));
        }
        object.insert(DATA_KEY.to_string(), self.data.to_json());
        if let Some(metadata) = &self.metadata {
            object.insert(METADATA_KEY.to_string(), metadata.to_json());
        }
        Value::Object(object)
    }
}

impl<T: Payload> Payload for ResultEnvelope<T> {
    fn to_json(&self) -> Value {
        ResultEnvelope::to_json(self)
    }
}

impl<T: Payload> Serialize for ResultEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl ResultEnvelope<Entity> {
    /// Hydrate a body whose `data` is one record.
    pub fn single(body: &Value, schema: &'static Schema) -> Result<Self, MalformedRecordError> {
        Self::from_body(body, |data| Entity::hydrate(data, schema))
    }
}

impl ResultEnvelope<Vec<Entity>> {
    /// Hydrate a body whose `data` is an array of records.
    pub fn list(body: &Value, schema: &'static Schema) -> Result<Self, MalformedRecordError> {
        Self::from_body(body, |data| hydrate_list(data, schema))
    }
}

impl ResultEnvelope<Value> {
    /// Keep `data` as free-form JSON.
    pub fn raw(body: &Value) -> Result<Self, MalformedRecordError> {
        Self::from_body(body, |data| Ok(data.clone()))
    }
}

/// Hydrate a body into the payload shape chosen at runtime.
pub fn hydrate(body: &Value, shape: PayloadShape) -> Result<ResultEnvelope<Data>, MalformedRecordError> {
    ResultEnvelope::from_body(body, |data| match shape {
        PayloadShape::Single(schema) => Entity::hydrate(data, schema).map(Data::Single),
        PayloadShape::List(schema) => hydrate_list(data, schema).map(Data::List),
        PayloadShape::Raw => Ok(Data::Raw(data.clone())),
    })
}

/// Hydrate every element of a JSON array, failing on the first bad one.
pub fn hydrate_list(data: &Value, schema: &'static Schema) -> Result<Vec<Entity>, MalformedRecordError> {
    let items = data.as_array().ok_or_else(|| {
        MalformedRecordError::new(
            schema.name,
            DATA_KEY,
            MalformedReason::WrongType {
                expected: "array",
                found: json_type(data),
            },
        )
    })?;

    let entities = items
        .iter()
        .enumerate()
        .map(|(index, item)| Entity::hydrate(item, schema).map_err(|e| e.at_index(index)))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(record = schema.name, count = entities.len(), "hydrated list payload");
    Ok(entities)
}

fn parse_status(object: &Map<String, Value>) -> Result<Option<u16>, MalformedRecordError> {
    match object.get(STATUS_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|status| u16::try_from(status).ok())
            .map(Some)
            .ok_or_else(|| {
                MalformedRecordError::new(
                    ENVELOPE,
                    STATUS_KEY,
                    MalformedReason::WrongType {
                        expected: "integer",
                        found: json_type(value),
                    },
                )
            }),
    }
}

fn parse_metadata(object: &Map<String, Value>) -> Result<Option<Metadata>, MalformedRecordError> {
    match object.get(METADATA_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(value) if value.is_object() => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| {
                MalformedRecordError::new(
                    ENVELOPE,
                    METADATA_KEY,
                    MalformedReason::InvalidMetadata(e.to_string()),
                )
            }),
        Some(other) => Err(MalformedRecordError::new(
            ENVELOPE,
            METADATA_KEY,
            MalformedReason::NotAnObject { found: json_type(other) },
        )),
    }
}
