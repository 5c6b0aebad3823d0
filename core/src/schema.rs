//! Declarative field schemas for API records.
//!
//! # Design
//! Every resource kind is described by one `const Schema`: a list of JSON
//! keys, each with a semantic kind and a required/optional marker. A single
//! hydration routine (`Entity::hydrate`) consumes any schema, so adding a
//! resource means declaring its fields, not writing a new parser.

/// Semantic type of a field's JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A JSON string.
    Text,
    /// Any JSON number, integer or floating point.
    Number,
    /// A JSON number representable as `i64` or `u64`.
    Integer,
    /// A JSON boolean.
    Boolean,
    /// A nested JSON object hydrated against its own schema.
    Record(&'static Schema),
    /// A JSON array whose elements all have the given kind.
    List(&'static FieldKind),
    /// Any JSON value, kept verbatim.
    Any,
}

impl FieldKind {
    /// Name used in malformed-record messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Record(_) => "object",
            FieldKind::List(_) => "array",
            FieldKind::Any => "any",
        }
    }
}

/// Whether a field must appear in every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

/// One declared JSON key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub presence: Presence,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Required,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Optional,
        }
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// The field layout of one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Record name reported in errors, e.g. `conversionSkuResult`.
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Position of `name` in the field list, if declared.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|spec| spec.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INNER: Schema = Schema {
        name: "inner",
        fields: &[FieldSpec::optional("label", FieldKind::Text)],
    };

    const OUTER: Schema = Schema {
        name: "outer",
        fields: &[
            FieldSpec::required("id", FieldKind::Integer),
            FieldSpec::optional("inner", FieldKind::Record(&INNER)),
            FieldSpec::optional("tags", FieldKind::List(&FieldKind::Text)),
        ],
    };

    #[test]
    fn lookup_by_name() {
        assert_eq!(OUTER.position("inner"), Some(1));
        assert!(OUTER.position("missing").is_none());
        assert_eq!(OUTER.fields[0].kind, FieldKind::Integer);
    }

    #[test]
    fn nested_kinds_describe_their_json_shape() {
        assert_eq!(OUTER.fields[1].kind.describe(), "object");
        assert_eq!(OUTER.fields[2].kind.describe(), "array");
    }
}
