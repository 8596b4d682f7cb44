//! The four entity kinds and their naming on the wire and in URLs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use etudiant_rs_core::AppError;

/// One of the record types the admin client manages.
///
/// Each kind has three names: the route segment used by the screens
/// (`/etudiant`), the REST resource (`/api/etudiants`) and the page title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Student,
    Country,
    FieldOfStudy,
    Level,
}

impl EntityKind {
    /// All kinds, in menu order.
    pub const ALL: [Self; 4] = [Self::Student, Self::Country, Self::FieldOfStudy, Self::Level];

    /// The singular entity name, also used as the route segment.
    pub const fn entity_name(self) -> &'static str {
        match self {
            Self::Student => "etudiant",
            Self::Country => "pays",
            Self::FieldOfStudy => "filiere",
            Self::Level => "niveau",
        }
    }

    /// The route segment of the kind's screens.
    pub const fn segment(self) -> &'static str {
        self.entity_name()
    }

    /// The REST collection name under the API prefix.
    pub const fn resource(self) -> &'static str {
        match self {
            Self::Student => "etudiants",
            Self::Country => "pays",
            Self::FieldOfStudy => "filieres",
            Self::Level => "niveaus",
        }
    }

    /// The list screen's title.
    pub const fn page_title(self) -> &'static str {
        match self {
            Self::Student => "Etudiants",
            Self::Country => "Pays",
            Self::FieldOfStudy => "Filieres",
            Self::Level => "Niveaus",
        }
    }

    /// Looks a kind up by route segment.
    pub fn from_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.segment() == segment)
    }

    /// Looks a kind up by REST resource name.
    pub fn from_resource(resource: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.resource() == resource)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entity_name())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    /// Accepts the route segment, the resource name, or the English name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::from_segment(&lower)
            .or_else(|| Self::from_resource(&lower))
            .or(match lower.replace(['-', '_'], "").as_str() {
                "student" | "students" => Some(Self::Student),
                "country" | "countries" => Some(Self::Country),
                "fieldofstudy" | "fieldsofstudy" => Some(Self::FieldOfStudy),
                "level" | "levels" => Some(Self::Level),
                _ => None,
            })
            .ok_or_else(|| AppError::InvalidRoute(format!("unknown entity kind '{s}'")))
    }
}
