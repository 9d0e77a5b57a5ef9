//! PostgreSQL implementation of the data store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::entities::{Mission, NewPublication, Publication, Species};
use crate::domain::query::{Collection, DeleteQuery, Direction, Predicate, SelectQuery, Value};
use crate::domain::store::{DataStore, StoreError};
use crate::utils::db_error::map_sqlx_error;

const COLUMNS: &str =
    "id, title, author_name, summary, research_link, species, missions, year, created_at, updated_at";

/// Raw row as returned by PostgreSQL.
#[derive(Debug, sqlx::FromRow)]
struct PublicationRow {
    id: Uuid,
    title: String,
    author_name: Option<String>,
    summary: String,
    research_link: String,
    species: Vec<String>,
    missions: Vec<String>,
    year: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PublicationRow> for Publication {
    type Error = StoreError;

    fn try_from(row: PublicationRow) -> Result<Self, Self::Error> {
        let species = row
            .species
            .iter()
            .map(|s| s.parse::<Species>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Malformed(format!("publication {}: {}", row.id, e)))?;
        let missions = row
            .missions
            .iter()
            .map(|m| m.parse::<Mission>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Malformed(format!("publication {}: {}", row.id, e)))?;

        Ok(Publication {
            id: row.id,
            title: row.title,
            author_name: row.author_name,
            summary: row.summary,
            research_link: row.research_link,
            species,
            missions,
            year: row.year,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL store for the publication catalog.
///
/// Predicates are translated into SQL with bound parameters, so narrowing
/// happens in the database. Ids and timestamps come from column defaults.
pub struct PgDataStore {
    pool: Arc<PgPool>,
}

impl PgDataStore {
    /// Creates a new store with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &Value) {
    match value {
        Value::Text(text) => qb.push_bind(text.clone()),
        Value::Integer(int) => qb.push_bind(*int),
        Value::Uuid(id) => qb.push_bind(*id),
        Value::Timestamp(ts) => qb.push_bind(*ts),
    };
}

/// Appends ` WHERE a AND b ...` for the given predicates.
fn push_predicates(qb: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        let column = predicate.field().column();

        match predicate {
            Predicate::Eq(_, value) => {
                qb.push(column).push(" = ");
                push_value(qb, value);
            }
            Predicate::In(_, values) if values.is_empty() => {
                qb.push("FALSE");
            }
            Predicate::In(_, values) => {
                qb.push(column).push(" IN (");
                for (j, value) in values.iter().enumerate() {
                    if j > 0 {
                        qb.push(", ");
                    }
                    push_value(qb, value);
                }
                qb.push(")");
            }
            Predicate::Gte(_, value) => {
                qb.push(column).push(" >= ");
                push_value(qb, value);
            }
            Predicate::Lte(_, value) => {
                qb.push(column).push(" <= ");
                push_value(qb, value);
            }
            Predicate::Overlaps(_, values) => {
                qb.push(column)
                    .push(" && ")
                    .push_bind(values.clone())
                    .push("::text[]");
            }
        }
    }
}

/// Builds the SQL for a select.
fn select_sql(query: &SelectQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM {}",
        COLUMNS,
        query.collection.name()
    ));

    push_predicates(&mut qb, &query.predicates);

    if let Some(order) = query.order {
        qb.push(" ORDER BY ").push(order.field.column()).push(match order.direction {
            Direction::Ascending => " ASC NULLS LAST",
            Direction::Descending => " DESC NULLS LAST",
        });
    }

    qb
}

fn delete_sql(query: &DeleteQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("DELETE FROM {}", query.collection.name()));
    push_predicates(&mut qb, &query.predicates);
    qb
}

#[async_trait]
impl DataStore for PgDataStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert(
        &self,
        collection: Collection,
        records: Vec<NewPublication>,
    ) -> Result<Vec<Publication>, StoreError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} (title, author_name, summary, research_link, species, missions, year) ",
            collection.name()
        ));

        qb.push_values(records, |mut row, record| {
            row.push_bind(record.title)
                .push_bind(record.author_name)
                .push_bind(record.summary)
                .push_bind(record.research_link)
                .push_bind(
                    record
                        .species
                        .iter()
                        .map(|s| s.label().to_string())
                        .collect::<Vec<_>>(),
                )
                .push_bind(
                    record
                        .missions
                        .iter()
                        .map(|m| m.label().to_string())
                        .collect::<Vec<_>>(),
                )
                .push_bind(record.year);
        });
        qb.push(" RETURNING ").push(COLUMNS);

        let rows: Vec<PublicationRow> = qb
            .build_query_as::<PublicationRow>()
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        debug!(collection = %collection, count = rows.len(), "Inserted records");
        rows.into_iter().map(Publication::try_from).collect()
    }

    async fn select(&self, query: SelectQuery) -> Result<Vec<Publication>, StoreError> {
        let mut qb = select_sql(&query);
        debug!(sql = qb.sql(), "Executing select");

        let rows: Vec<PublicationRow> = qb
            .build_query_as::<PublicationRow>()
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(Publication::try_from).collect()
    }

    async fn delete(&self, query: DeleteQuery) -> Result<u64, StoreError> {
        let mut qb = delete_sql(&query);
        debug!(sql = qb.sql(), "Executing delete");

        let result = qb
            .build()
            .execute(self.pool.as_ref())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1 FROM publications LIMIT 1")
            .execute(self.pool.as_ref())
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{Field, Order};

    #[test]
    fn test_select_sql_translation() {
        let query = SelectQuery {
            collection: Collection::Publications,
            predicates: vec![
                Predicate::Overlaps(Field::Species, vec!["Humans".to_string()]),
                Predicate::Gte(Field::Year, Value::Integer(2015)),
                Predicate::Lte(Field::Year, Value::Integer(2025)),
            ],
            order: Some(Order {
                field: Field::CreatedAt,
                direction: Direction::Descending,
            }),
        };

        let qb = select_sql(&query);
        assert_eq!(
            qb.sql(),
            format!(
                "SELECT {} FROM publications WHERE species && $1::text[] AND year >= $2 AND year <= $3 ORDER BY created_at DESC NULLS LAST",
                COLUMNS
            )
        );
    }

    #[test]
    fn test_select_sql_without_predicates() {
        let qb = select_sql(&SelectQuery::new(Collection::Publications));
        assert_eq!(qb.sql(), format!("SELECT {} FROM publications", COLUMNS));
    }

    #[test]
    fn test_in_translation() {
        let query = SelectQuery {
            collection: Collection::Publications,
            predicates: vec![
                Predicate::In(
                    Field::Title,
                    vec![Value::from("a"), Value::from("b")],
                ),
                Predicate::In(Field::Year, Vec::new()),
            ],
            order: None,
        };

        assert_eq!(
            select_sql(&query).sql(),
            format!(
                "SELECT {} FROM publications WHERE title IN ($1, $2) AND FALSE",
                COLUMNS
            )
        );
    }

    #[test]
    fn test_delete_sql_translation() {
        let mut query = DeleteQuery::new(Collection::Publications);
        query
            .predicates
            .push(Predicate::Eq(Field::Id, Value::Uuid(Uuid::nil())));

        assert_eq!(
            delete_sql(&query).sql(),
            "DELETE FROM publications WHERE id = $1"
        );
    }

    #[test]
    fn test_row_with_unknown_species_is_malformed() {
        let now = Utc::now();
        let row = PublicationRow {
            id: Uuid::nil(),
            title: "t".to_string(),
            author_name: None,
            summary: "s".to_string(),
            research_link: "https://example.org".to_string(),
            species: vec!["Fungi".to_string()],
            missions: vec!["ISS".to_string()],
            year: 2020,
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(
            Publication::try_from(row),
            Err(StoreError::Malformed(_))
        ));
    }
}
