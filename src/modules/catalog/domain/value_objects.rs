/// Value objects shared across the catalog domain.
use serde::{Deserialize, Serialize};

/// How a song is used in an anime, matching the `song_use_type` database enum.
#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::SongUseType"]
pub enum SongUseType {
    #[db_rename = "OP"]
    #[serde(rename = "OP")]
    Op,
    #[db_rename = "ED"]
    #[serde(rename = "ED")]
    Ed,
    #[db_rename = "IN"]
    #[serde(rename = "IN")]
    In,
}

impl SongUseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SongUseType::Op => "OP",
            SongUseType::Ed => "ED",
            SongUseType::In => "IN",
        }
    }
}

impl std::fmt::Display for SongUseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a person plays on a song credit, matching the `song_credit_role` enum.
#[derive(
    diesel_derive_enum::DbEnum,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::SongCreditRole"]
#[serde(rename_all = "lowercase")]
pub enum CreditRole {
    Artist,
    Composer,
    Arranger,
}

impl CreditRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditRole::Artist => "artist",
            CreditRole::Composer => "composer",
            CreditRole::Arranger => "arranger",
        }
    }
}

impl std::fmt::Display for CreditRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a people row is an individual or a group. Stored as a checked
/// varchar rather than a database enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeopleKind {
    Person,
    Group,
}

impl PeopleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeopleKind::Person => "person",
            PeopleKind::Group => "group",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "person" => Some(PeopleKind::Person),
            "group" => Some(PeopleKind::Group),
            _ => None,
        }
    }
}

impl std::fmt::Display for PeopleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn people_kind_round_trips() {
        assert_eq!(PeopleKind::parse("person"), Some(PeopleKind::Person));
        assert_eq!(PeopleKind::parse("group"), Some(PeopleKind::Group));
        assert_eq!(PeopleKind::parse("band"), None);
        assert_eq!(PeopleKind::Group.as_str(), "group");
    }

    #[test]
    fn use_type_display_matches_db_values() {
        assert_eq!(SongUseType::Op.to_string(), "OP");
        assert_eq!(SongUseType::Ed.to_string(), "ED");
        assert_eq!(SongUseType::In.to_string(), "IN");
    }
}
