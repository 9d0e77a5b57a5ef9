//! Faceted filtering of the publication catalog.
//!
//! A [`FilterState`] combines three independent facets with logical AND:
//!
//! 1. **Species** - matches when the publication shares at least one species
//!    with the selection, or when nothing is selected.
//! 2. **Missions** - same semantics over missions.
//! 3. **Year** - inclusive range, always active. The default range spans the
//!    whole supported period and excludes nothing.
//!
//! Results are ordered newest first by creation time.
//!
//! The facets are always pushed into the store query through
//! [`FilterState::narrow`]; [`FilterState::apply`] evaluates the very same
//! query in memory.

use std::collections::BTreeSet;

use super::entities::{MAX_YEAR, MIN_YEAR, Mission, Publication, Species};
use super::query::{Collection, Direction, Field, Order, Predicate, SelectQuery, Value};
use super::store::SelectBuilder;

/// Inclusive `[min, max]` publication year window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    /// Creates a range, swapping the bounds if they arrive reversed.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, year: i32) -> bool {
        (self.min..=self.max).contains(&year)
    }

    /// True when the range covers the whole supported period.
    pub fn is_full_span(&self) -> bool {
        self.min <= MIN_YEAR && self.max >= MAX_YEAR
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self::new(MIN_YEAR, MAX_YEAR)
    }
}

/// Facet selection held by one dashboard session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub species: BTreeSet<Species>,
    pub missions: BTreeSet<Mission>,
    pub year_range: YearRange,
}

impl FilterState {
    /// Returns true when no facet narrows the catalog.
    pub fn is_unconstrained(&self) -> bool {
        self.species.is_empty() && self.missions.is_empty() && self.year_range.is_full_span()
    }

    /// Predicates for the current selection, in application order.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(4);

        if !self.species.is_empty() {
            predicates.push(Predicate::Overlaps(
                Field::Species,
                self.species.iter().map(|s| s.label().to_string()).collect(),
            ));
        }

        if !self.missions.is_empty() {
            predicates.push(Predicate::Overlaps(
                Field::Missions,
                self.missions.iter().map(|m| m.label().to_string()).collect(),
            ));
        }

        predicates.push(Predicate::Gte(Field::Year, Value::from(self.year_range.min)));
        predicates.push(Predicate::Lte(Field::Year, Value::from(self.year_range.max)));

        predicates
    }

    /// The selection expressed as a store query, newest first.
    pub fn query(&self) -> SelectQuery {
        SelectQuery {
            collection: Collection::Publications,
            predicates: self.predicates(),
            order: Some(Order {
                field: Field::CreatedAt,
                direction: Direction::Descending,
            }),
        }
    }

    /// Pushes the selection into a select builder.
    pub fn narrow<'a>(&self, mut select: SelectBuilder<'a>) -> SelectBuilder<'a> {
        if !self.species.is_empty() {
            select = select.overlaps(Field::Species, self.species.iter().map(|s| s.label()));
        }

        if !self.missions.is_empty() {
            select = select.overlaps(Field::Missions, self.missions.iter().map(|m| m.label()));
        }

        select
            .gte(Field::Year, self.year_range.min)
            .lte(Field::Year, self.year_range.max)
            .order(Field::CreatedAt, Direction::Descending)
    }

    pub fn matches(&self, publication: &Publication) -> bool {
        self.predicates().iter().all(|p| p.matches(publication))
    }

    /// Filters and orders an in-memory publication set.
    pub fn apply(&self, publications: &[Publication]) -> Vec<Publication> {
        self.query().evaluate(publications)
    }
}
