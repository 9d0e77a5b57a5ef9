//! Publication entity and its facet vocabularies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// First publication year the catalog accepts.
pub const MIN_YEAR: i32 = 2015;
/// Last publication year the catalog accepts.
pub const MAX_YEAR: i32 = 2025;

/// Error returned when a facet label is not part of its vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {facet} '{value}'")]
pub struct FacetParseError {
    pub facet: &'static str,
    pub value: String,
}

/// Normalizes a facet token so that `"Cell Lines"`, `"cell-lines"` and
/// `"CELL_LINES"` compare equal.
fn slug(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '_' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Organism group studied by a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    #[serde(alias = "humans")]
    Humans,
    #[serde(alias = "animals")]
    Animals,
    #[serde(rename = "Cell Lines", alias = "cell-lines")]
    CellLines,
    #[serde(alias = "plants")]
    Plants,
}

impl Species {
    pub const ALL: [Species; 4] = [
        Species::Humans,
        Species::Animals,
        Species::CellLines,
        Species::Plants,
    ];

    /// Human-readable label, also used as the stored representation.
    pub fn label(self) -> &'static str {
        match self {
            Species::Humans => "Humans",
            Species::Animals => "Animals",
            Species::CellLines => "Cell Lines",
            Species::Plants => "Plants",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Species {
    type Err = FacetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = slug(s);
        Species::ALL
            .into_iter()
            .find(|species| slug(species.label()) == wanted)
            .ok_or_else(|| FacetParseError {
                facet: "species",
                value: s.to_string(),
            })
    }
}

/// Mission context of a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mission {
    #[serde(rename = "ISS", alias = "iss")]
    Iss,
    #[serde(rename = "Moon Simulations", alias = "moon")]
    MoonSimulations,
    #[serde(rename = "Mars Simulations", alias = "mars")]
    MarsSimulations,
    #[serde(rename = "Radiation Studies", alias = "radiation")]
    RadiationStudies,
    #[serde(rename = "Microgravity Studies", alias = "microgravity")]
    MicrogravityStudies,
}

impl Mission {
    pub const ALL: [Mission; 5] = [
        Mission::Iss,
        Mission::MoonSimulations,
        Mission::MarsSimulations,
        Mission::RadiationStudies,
        Mission::MicrogravityStudies,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mission::Iss => "ISS",
            Mission::MoonSimulations => "Moon Simulations",
            Mission::MarsSimulations => "Mars Simulations",
            Mission::RadiationStudies => "Radiation Studies",
            Mission::MicrogravityStudies => "Microgravity Studies",
        }
    }

    /// Short identifier used by older sidebar builds (`moon`, `mars`, ...).
    fn short_id(self) -> &'static str {
        match self {
            Mission::Iss => "iss",
            Mission::MoonSimulations => "moon",
            Mission::MarsSimulations => "mars",
            Mission::RadiationStudies => "radiation",
            Mission::MicrogravityStudies => "microgravity",
        }
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Mission {
    type Err = FacetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = slug(s);
        Mission::ALL
            .into_iter()
            .find(|mission| slug(mission.label()) == wanted || mission.short_id() == wanted)
            .ok_or_else(|| FacetParseError {
                facet: "mission",
                value: s.to_string(),
            })
    }
}

/// A research publication in the catalog.
///
/// Records are immutable once stored: the catalog supports create and delete
/// only, so `updated_at` always equals `created_at` for records written here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub author_name: Option<String>,
    pub summary: String,
    pub research_link: String,
    pub species: Vec<Species>,
    pub missions: Vec<Mission>,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publication {
    /// Builds a stored publication from a draft, stamping id and timestamps.
    pub fn from_new(new: NewPublication, id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            author_name: new.author_name,
            summary: new.summary,
            research_link: new.research_link,
            species: new.species,
            missions: new.missions,
            year: new.year,
            created_at: now,
            updated_at: now,
        }
    }

    /// First eight characters of the id, as shown on cards.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

/// Input data for creating a new publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPublication {
    pub title: String,
    pub author_name: Option<String>,
    pub summary: String,
    pub research_link: String,
    pub species: Vec<Species>,
    pub missions: Vec<Mission>,
    pub year: i32,
}

impl From<Publication> for NewPublication {
    /// Drops identity and timestamps, e.g. to re-insert an exported record.
    fn from(p: Publication) -> Self {
        Self {
            title: p.title,
            author_name: p.author_name,
            summary: p.summary,
            research_link: p.research_link,
            species: p.species,
            missions: p.missions,
            year: p.year,
        }
    }
}
