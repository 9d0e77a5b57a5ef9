//! Change notifications for catalog mutations.
//!
//! Every successful create or delete produces a [`PublicationEvent`] carrying
//! the new catalog revision. Open dashboards subscribe through
//! `GET /api/events` and re-fetch their grid instead of reloading the page.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A mutation that changed the visible catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PublicationEvent {
    Created {
        id: Uuid,
        title: String,
        revision: u64,
    },
    Deleted {
        id: Uuid,
        revision: u64,
    },
}

impl PublicationEvent {
    pub fn revision(&self) -> u64 {
        match self {
            PublicationEvent::Created { revision, .. } | PublicationEvent::Deleted { revision, .. } => {
                *revision
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let id = Uuid::nil();
        let event = PublicationEvent::Deleted { id, revision: 7 };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "deleted");
        assert_eq!(json["revision"], 7);
        assert_eq!(event.revision(), 7);
    }
}
