//! Predicate narrowing model shared by every [`DataStore`](super::store::DataStore).
//!
//! Supported operations: equality, set membership, inclusive numeric and
//! temporal bounds, array overlap, plus a single ordering key.
//!
//! [`SelectQuery::evaluate`] is the in-memory reference semantics. Stores that
//! translate queries (e.g. to SQL) must agree with it.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::entities::{Mission, Publication, Species};
use super::store::StoreError;

/// A named group of records in the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Publications,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Publications => "publications",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publications" => Ok(Collection::Publications),
            other => Err(StoreError::MissingCollection(other.to_string())),
        }
    }
}

/// Storage type of a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Uuid,
    Text,
    TextArray,
    Integer,
    Timestamp,
}

/// Addressable publication columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    AuthorName,
    Summary,
    ResearchLink,
    Species,
    Missions,
    Year,
    CreatedAt,
    UpdatedAt,
}

impl Field {
    /// Column name in the canonical schema.
    pub fn column(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::AuthorName => "author_name",
            Field::Summary => "summary",
            Field::ResearchLink => "research_link",
            Field::Species => "species",
            Field::Missions => "missions",
            Field::Year => "year",
            Field::CreatedAt => "created_at",
            Field::UpdatedAt => "updated_at",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Id => FieldKind::Uuid,
            Field::Title | Field::AuthorName | Field::Summary | Field::ResearchLink => {
                FieldKind::Text
            }
            Field::Species | Field::Missions => FieldKind::TextArray,
            Field::Year => FieldKind::Integer,
            Field::CreatedAt | Field::UpdatedAt => FieldKind::Timestamp,
        }
    }
}

/// A scalar operand.
///
/// Variants compare only against the same variant; mixed comparisons are
/// rejected during validation.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    Text(String),
    Integer(i64),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Species> for Value {
    fn from(v: Species) -> Self {
        Value::Text(v.label().to_string())
    }
}

impl From<Mission> for Value {
    fn from(v: Mission) -> Self {
        Value::Text(v.label().to_string())
    }
}

impl Value {
    /// Converts the operand to the representation used by `kind`.
    fn coerce(self, field: Field) -> Result<Value, StoreError> {
        match (field.kind(), self) {
            (FieldKind::Uuid, Value::Uuid(id)) => Ok(Value::Uuid(id)),
            (FieldKind::Uuid, Value::Text(text)) => Uuid::parse_str(text.trim())
                .map(Value::Uuid)
                .map_err(|_| {
                    StoreError::InvalidQuery(format!(
                        "'{}' is not a valid uuid for column {}",
                        text,
                        field.column()
                    ))
                }),
            (FieldKind::Text, v @ Value::Text(_)) => Ok(v),
            (FieldKind::Integer, v @ Value::Integer(_)) => Ok(v),
            (FieldKind::Timestamp, v @ Value::Timestamp(_)) => Ok(v),
            (kind, value) => Err(StoreError::InvalidQuery(format!(
                "value {:?} does not fit column {} ({:?})",
                value,
                field.column(),
                kind
            ))),
        }
    }
}

/// A single narrowing condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(Field, Value),
    In(Field, Vec<Value>),
    Gte(Field, Value),
    Lte(Field, Value),
    Overlaps(Field, Vec<String>),
}

impl Predicate {
    pub fn field(&self) -> Field {
        match self {
            Predicate::Eq(field, _)
            | Predicate::In(field, _)
            | Predicate::Gte(field, _)
            | Predicate::Lte(field, _)
            | Predicate::Overlaps(field, _) => *field,
        }
    }

    fn validated(self) -> Result<Predicate, StoreError> {
        let field = self.field();
        let kind = field.kind();
        let op_error = |op: &str| {
            Err(StoreError::InvalidQuery(format!(
                "'{}' is not supported on column {} ({:?})",
                op,
                field.column(),
                kind
            )))
        };

        match self {
            Predicate::Eq(_, value) => match kind {
                FieldKind::TextArray => op_error("eq"),
                _ => Ok(Predicate::Eq(field, value.coerce(field)?)),
            },
            Predicate::In(_, values) => match kind {
                FieldKind::TextArray => op_error("in"),
                _ => Ok(Predicate::In(
                    field,
                    values
                        .into_iter()
                        .map(|v| v.coerce(field))
                        .collect::<Result<_, _>>()?,
                )),
            },
            Predicate::Gte(_, value) => match kind {
                FieldKind::Integer | FieldKind::Timestamp => {
                    Ok(Predicate::Gte(field, value.coerce(field)?))
                }
                _ => op_error("gte"),
            },
            Predicate::Lte(_, value) => match kind {
                FieldKind::Integer | FieldKind::Timestamp => {
                    Ok(Predicate::Lte(field, value.coerce(field)?))
                }
                _ => op_error("lte"),
            },
            Predicate::Overlaps(_, values) => match kind {
                FieldKind::TextArray => Ok(Predicate::Overlaps(field, values)),
                _ => op_error("overlaps"),
            },
        }
    }

    /// Evaluates the predicate against a record.
    ///
    /// Null scalars (a missing author) never match.
    pub fn matches(&self, publication: &Publication) -> bool {
        match self {
            Predicate::Eq(field, value) => {
                scalar(publication, *field).is_some_and(|actual| actual == *value)
            }
            Predicate::In(field, values) => {
                scalar(publication, *field).is_some_and(|actual| values.contains(&actual))
            }
            Predicate::Gte(field, value) => scalar(publication, *field).is_some_and(|actual| {
                matches!(
                    actual.partial_cmp(value),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }),
            Predicate::Lte(field, value) => scalar(publication, *field).is_some_and(|actual| {
                matches!(
                    actual.partial_cmp(value),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }),
            Predicate::Overlaps(field, wanted) => tags(publication, *field)
                .is_some_and(|actual| actual.iter().any(|tag| wanted.iter().any(|w| w == tag))),
        }
    }
}

/// Sort direction for [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering step of a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub field: Field,
    pub direction: Direction,
}

/// A select against one collection: all predicates combined with AND.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub collection: Collection,
    pub predicates: Vec<Predicate>,
    pub order: Option<Order>,
}

impl SelectQuery {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            predicates: Vec::new(),
            order: None,
        }
    }

    /// Checks operand kinds and normalizes operands (e.g. text ids to uuids).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] when an operation does not apply
    /// to its column or an operand has the wrong type.
    pub fn validated(self) -> Result<Self, StoreError> {
        if let Some(order) = self.order
            && order.field.kind() == FieldKind::TextArray
        {
            return Err(StoreError::InvalidQuery(format!(
                "cannot order by array column {}",
                order.field.column()
            )));
        }

        Ok(Self {
            collection: self.collection,
            predicates: self
                .predicates
                .into_iter()
                .map(Predicate::validated)
                .collect::<Result<_, _>>()?,
            order: self.order,
        })
    }

    pub fn matches(&self, publication: &Publication) -> bool {
        self.predicates.iter().all(|p| p.matches(publication))
    }

    /// Applies predicates and ordering to an in-memory record set.
    ///
    /// Sorting is stable; records with a null sort key go last.
    pub fn evaluate<'a, I>(&self, records: I) -> Vec<Publication>
    where
        I: IntoIterator<Item = &'a Publication>,
    {
        let mut matched: Vec<Publication> = records
            .into_iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        if let Some(order) = self.order {
            matched.sort_by(|a, b| {
                match (scalar(a, order.field), scalar(b, order.field)) {
                    (Some(x), Some(y)) => {
                        let o = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
                        match order.direction {
                            Direction::Ascending => o,
                            Direction::Descending => o.reverse(),
                        }
                    }
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                }
            });
        }

        matched
    }
}

/// A delete against one collection. At least one predicate is required.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteQuery {
    pub collection: Collection,
    pub predicates: Vec<Predicate>,
}

impl DeleteQuery {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            predicates: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuery`] for an unfiltered delete or an
    /// invalid predicate.
    pub fn validated(self) -> Result<Self, StoreError> {
        if self.predicates.is_empty() {
            return Err(StoreError::InvalidQuery(
                "delete requires at least one filter".to_string(),
            ));
        }

        Ok(Self {
            collection: self.collection,
            predicates: self
                .predicates
                .into_iter()
                .map(Predicate::validated)
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn matches(&self, publication: &Publication) -> bool {
        self.predicates.iter().all(|p| p.matches(publication))
    }
}

fn scalar(publication: &Publication, field: Field) -> Option<Value> {
    match field {
        Field::Id => Some(Value::Uuid(publication.id)),
        Field::Title => Some(Value::Text(publication.title.clone())),
        Field::AuthorName => publication.author_name.clone().map(Value::Text),
        Field::Summary => Some(Value::Text(publication.summary.clone())),
        Field::ResearchLink => Some(Value::Text(publication.research_link.clone())),
        Field::Year => Some(Value::Integer(i64::from(publication.year))),
        Field::CreatedAt => Some(Value::Timestamp(publication.created_at)),
        Field::UpdatedAt => Some(Value::Timestamp(publication.updated_at)),
        Field::Species | Field::Missions => None,
    }
}

fn tags(publication: &Publication, field: Field) -> Option<Vec<&'static str>> {
    match field {
        Field::Species => Some(publication.species.iter().map(|s| s.label()).collect()),
        Field::Missions => Some(publication.missions.iter().map(|m| m.label()).collect()),
        _ => None,
    }
}
