use crate::error::{TrackerError, TrackerResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a construction site, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructionStage {
    Acceptance,
    Installation,
    Handover,
}

impl ConstructionStage {
    pub const ALL: [ConstructionStage; 3] = [
        ConstructionStage::Acceptance,
        ConstructionStage::Installation,
        ConstructionStage::Handover,
    ];

    pub fn next(self) -> Option<Self> {
        match self {
            ConstructionStage::Acceptance => Some(ConstructionStage::Installation),
            ConstructionStage::Installation => Some(ConstructionStage::Handover),
            ConstructionStage::Handover => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConstructionStage::Acceptance => "acceptance",
            ConstructionStage::Installation => "installation",
            ConstructionStage::Handover => "handover",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ConstructionStage::Acceptance => "Acceptance of the work front",
            ConstructionStage::Installation => "Installation",
            ConstructionStage::Handover => "Handover and as-built documentation",
        }
    }
}

impl fmt::Display for ConstructionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for ConstructionStage {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s.trim())
            .ok_or_else(|| TrackerError::CorruptRecord(format!("construction stage '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiblePerson {
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: Option<String>,
}

impl ResponsiblePerson {
    /// Parses `Name;Position;Phone[;Email]`.
    pub fn parse(input: &str) -> TrackerResult<Self> {
        let parts: Vec<&str> = input.split(';').map(str::trim).collect();
        if !(3..=4).contains(&parts.len()) {
            return Err(TrackerError::InvalidInput(
                "Use the format Name;Position;Phone;Email (email is optional)".to_string(),
            ));
        }
        if parts[..3].iter().any(|p| p.is_empty()) {
            return Err(TrackerError::InvalidInput(
                "Name, position and phone cannot be empty".to_string(),
            ));
        }
        let email = parts
            .get(3)
            .filter(|e| !e.is_empty())
            .map(|e| e.to_string());
        if let Some(email) = &email {
            if !email.contains('@') {
                return Err(TrackerError::InvalidInput(format!("'{email}' is not an email")));
            }
        }
        Ok(Self {
            name: parts[0].to_string(),
            position: parts[1].to_string(),
            phone: parts[2].to_string(),
            email,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageComment {
    pub stage: ConstructionStage,
    pub text: String,
    pub written_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionObject {
    pub id: i64,
    pub chat_id: i64,
    pub name: String,
    pub address: String,
    pub stage: ConstructionStage,
    pub persons: Vec<ResponsiblePerson>,
    pub comments: Vec<StageComment>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ConstructionObject {
    pub fn new(id: i64, chat_id: i64, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            chat_id,
            name: name.into(),
            address: address.into(),
            stage: ConstructionStage::Acceptance,
            persons: Vec::new(),
            comments: Vec::new(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Moves to the next stage; false when already at the last one.
    pub fn advance_stage(&mut self) -> bool {
        match self.stage.next() {
            Some(next) => {
                self.stage = next;
                true
            }
            None => false,
        }
    }

    /// Comments are tagged with the stage the object is in when written.
    pub fn add_comment(&mut self, text: impl Into<String>, at: DateTime<Utc>) -> &StageComment {
        self.comments.push(StageComment {
            stage: self.stage,
            text: text.into(),
            written_at: at,
        });
        &self.comments[self.comments.len() - 1]
    }

    pub fn add_person(&mut self, person: ResponsiblePerson) {
        self.persons.push(person);
    }

    /// Removes by zero-based index; false when out of range.
    pub fn remove_person(&mut self, index: usize) -> bool {
        if index < self.persons.len() {
            self.persons.remove(index);
            true
        } else {
            false
        }
    }

    pub fn complete(&mut self, at: DateTime<Utc>) {
        self.completed_at = Some(at);
    }

    pub fn comments_for(&self, stage: ConstructionStage) -> Vec<&StageComment> {
        self.comments.iter().filter(|c| c.stage == stage).collect()
    }

    pub fn summary_line(&self) -> String {
        let mark = if self.is_completed() { "🏁" } else { "🏗" };
        format!("{} #{} {}, {} [{}]", mark, self.id, self.name, self.address, self.stage.as_str())
    }

    pub fn details(&self) -> String {
        let mut text = format!(
            "🏗 {} (#{})\n📍 {}\n📌 Stage: {}\n📅 Created {}\n",
            self.name,
            self.id,
            self.address,
            self.stage,
            self.created_at.format("%d.%m.%Y"),
        );
        if let Some(done) = self.completed_at {
            text.push_str(&format!("🏁 Completed {}\n", done.format("%d.%m.%Y")));
        }

        text.push_str("\n👷 Responsible:\n");
        if self.persons.is_empty() {
            text.push_str("  nobody yet\n");
        }
        for (i, person) in self.persons.iter().enumerate() {
            text.push_str(&format!(
                "  {}. {}, {}, {}{}\n",
                i + 1,
                person.name,
                person.position,
                person.phone,
                person
                    .email
                    .as_deref()
                    .map(|e| format!(", {e}"))
                    .unwrap_or_default()
            ));
        }

        for stage in ConstructionStage::ALL {
            let comments = self.comments_for(stage);
            if comments.is_empty() {
                continue;
            }
            text.push_str(&format!("\n💬 {}:\n", stage.title()));
            for comment in comments {
                text.push_str(&format!(
                    "  {}: {}\n",
                    comment.written_at.format("%d.%m.%Y %H:%M"),
                    comment.text
                ));
            }
        }
        text
    }
}

/// Parses `Name;Address`.
pub fn parse_object_input(input: &str) -> TrackerResult<(String, String)> {
    match input.split_once(';') {
        Some((name, address)) if !name.trim().is_empty() && !address.trim().is_empty() => {
            Ok((name.trim().to_string(), address.trim().to_string()))
        }
        _ => Err(TrackerError::InvalidInput(
            "Use the format Name;Address".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_progression_stops_at_handover() {
        let mut object = ConstructionObject::new(1, 5, "Warehouse", "Main st. 1");
        assert_eq!(object.stage, ConstructionStage::Acceptance);
        assert!(object.advance_stage());
        assert!(object.advance_stage());
        assert_eq!(object.stage, ConstructionStage::Handover);
        assert!(!object.advance_stage());
        assert_eq!(object.stage, ConstructionStage::Handover);
    }

    #[test]
    fn test_comments_are_tagged_with_stage() {
        let mut object = ConstructionObject::new(1, 5, "Warehouse", "Main st. 1");
        object.add_comment("Front accepted", Utc::now());
        object.advance_stage();
        object.add_comment("Cables laid", Utc::now());
        assert_eq!(object.comments_for(ConstructionStage::Acceptance).len(), 1);
        assert_eq!(object.comments_for(ConstructionStage::Installation).len(), 1);
        assert!(object.details().contains("Cables laid"));
    }

    #[test]
    fn test_person_management() {
        let mut object = ConstructionObject::new(1, 5, "Warehouse", "Main st. 1");
        let person = ResponsiblePerson::parse("Anna; Engineer; +7 900 000; anna@example.com");
        assert!(person.is_ok());
        if let Ok(person) = person {
            object.add_person(person);
        }
        assert_eq!(object.persons.len(), 1);
        assert!(!object.remove_person(3));
        assert!(object.remove_person(0));
        assert!(object.persons.is_empty());
    }

    #[test]
    fn test_person_parsing() {
        let no_email = ResponsiblePerson::parse("Oleg;Foreman;123");
        assert_eq!(no_email.ok().and_then(|p| p.email), None);
        assert!(ResponsiblePerson::parse("Oleg;Foreman").is_err());
        assert!(ResponsiblePerson::parse("Oleg;;123").is_err());
        assert!(ResponsiblePerson::parse("Oleg;Foreman;123;not-an-email").is_err());
    }

    #[test]
    fn test_parse_object_input() {
        assert_eq!(
            parse_object_input("School; Lenina 5").ok(),
            Some(("School".to_string(), "Lenina 5".to_string()))
        );
        assert!(parse_object_input("School").is_err());
        assert!(parse_object_input("School; ").is_err());
    }

    #[test]
    fn test_stage_storage_codes() {
        for stage in ConstructionStage::ALL {
            assert_eq!(stage.as_str().parse::<ConstructionStage>().ok(), Some(stage));
        }
    }
}
