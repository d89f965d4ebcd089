//! Access keys of the people allowed into the rooms.
//!
//! The roster is a fixed table handed out of band: each key maps to a stable
//! member id (the identity the game session sees) and a display name.

use std::collections::HashMap;

use serde::Serialize;

/// A person who may log in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: String,
    pub name: String,
}

impl Member {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Member {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Errors while reading a roster definition.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("malformed roster entry: '{0}' (expected KEY=id:Name)")]
    MalformedEntry(String),

    #[error("duplicate access key: {0}")]
    DuplicateKey(String),

    #[error("duplicate member id: {0}")]
    DuplicateId(String),

    #[error("roster is empty")]
    Empty,
}

/// Access key → member table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    by_key: HashMap<String, Member>,
}

impl Roster {
    /// Parse `KEY=id:Display Name` entries separated by `;`.
    pub fn parse(definition: &str) -> Result<Self, RosterError> {
        let mut by_key: HashMap<String, Member> = HashMap::new();
        for entry in definition.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let malformed = || RosterError::MalformedEntry(entry.to_string());
            let (key, member) = entry.split_once('=').ok_or_else(malformed)?;
            let (id, name) = member.split_once(':').ok_or_else(malformed)?;
            let (key, id, name) = (key.trim(), id.trim(), name.trim());
            if key.is_empty() || id.is_empty() || name.is_empty() {
                return Err(malformed());
            }
            if by_key.contains_key(key) {
                return Err(RosterError::DuplicateKey(key.to_string()));
            }
            if by_key.values().any(|m| m.id == id) {
                return Err(RosterError::DuplicateId(id.to_string()));
            }
            by_key.insert(key.to_string(), Member::new(id, name));
        }
        if by_key.is_empty() {
            return Err(RosterError::Empty);
        }
        Ok(Roster { by_key })
    }

    /// Look up the member holding `key`.
    pub fn authenticate(&self, key: &str) -> Option<&Member> {
        self.by_key.get(key.trim())
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl Default for Roster {
    /// The four demo friends.
    fn default() -> Self {
        let by_key = (1..=4)
            .map(|n| {
                (
                    format!("FRIEND{n}_KEY"),
                    Member::new(format!("friend{n}"), format!("Friend {n}")),
                )
            })
            .collect();
        Roster { by_key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_has_four_friends() {
        let roster = Roster::default();
        assert_eq!(roster.len(), 4);
        let m = roster.authenticate("FRIEND2_KEY").unwrap();
        assert_eq!(m.id, "friend2");
        assert_eq!(m.name, "Friend 2");
    }

    #[test]
    fn unknown_key_is_refused() {
        let roster = Roster::default();
        assert!(roster.authenticate("nope").is_none());
        assert!(roster.authenticate("").is_none());
    }

    #[test]
    fn authenticate_trims_input() {
        let roster = Roster::default();
        assert!(roster.authenticate("  FRIEND1_KEY \n").is_some());
    }

    #[test]
    fn parse_entries() {
        let roster = Roster::parse("k1=ann:Ann Lee; k2=bo:Bo ;").unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.authenticate("k2"), Some(&Member::new("bo", "Bo")));
        assert_eq!(roster.authenticate("k1").map(|m| m.name.as_str()), Some("Ann Lee"));
    }

    #[test]
    fn parse_rejects_bad_entries() {
        assert!(matches!(
            Roster::parse("k1ann"),
            Err(RosterError::MalformedEntry(_))
        ));
        assert!(matches!(
            Roster::parse("k1=ann"),
            Err(RosterError::MalformedEntry(_))
        ));
        assert!(matches!(
            Roster::parse("k1=:Ann"),
            Err(RosterError::MalformedEntry(_))
        ));
        assert!(matches!(
            Roster::parse("k1=ann:Ann;k2=ann:Other"),
            Err(RosterError::DuplicateId(_))
        ));
        assert!(matches!(Roster::parse(" ; "), Err(RosterError::Empty)));
    }

    #[test]
    fn parse_rejects_reused_key() {
        assert!(matches!(
            Roster::parse("k1=ann:Ann;k1=bo:Bo"),
            Err(RosterError::DuplicateKey(k)) if k == "k1"
        ));
        assert!(matches!(
            Roster::parse("k1=ann:Ann; k1 =ann2:Ann"),
            Err(RosterError::DuplicateKey(_))
        ));
    }
}
