//! Member domain model.
//!
//! # Responsibility
//! - Define the library member record and its membership tiers.
//! - Provide partial-update patches used by `update_member`.
//!
//! # Invariants
//! - `id` is stable and never reused for another member.
//! - `name` is never empty.
//! - `membership_type` only takes the three tier values.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a library member.
pub type MemberId = Uuid;

/// Membership tier of a member.
///
/// Ordering follows tier rank (`Gold` first) so grouped reports are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MembershipType {
    Gold,
    Silver,
    Bronze,
}

impl MembershipType {
    /// All tiers in rank order.
    pub const ALL: [MembershipType; 3] = [Self::Gold, Self::Silver, Self::Bronze];

    /// Returns the persisted label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
        }
    }
}

impl Display for MembershipType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = ValidationError;

    /// Parses a tier label. Matching is exact on the trimmed input.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Gold" => Ok(Self::Gold),
            "Silver" => Ok(Self::Silver),
            "Bronze" => Ok(Self::Bronze),
            other => Err(ValidationError::UnknownMembershipType(other.to_string())),
        }
    }
}

/// Canonical member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub age: u32,
    pub membership_type: MembershipType,
    pub join_year: i32,
}

impl Member {
    /// Creates a member with a generated stable ID.
    pub fn new(
        name: impl Into<String>,
        age: u32,
        membership_type: MembershipType,
        join_year: i32,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), name, age, membership_type, join_year)
    }

    /// Creates a member with a caller-provided stable ID.
    pub fn with_id(
        id: MemberId,
        name: impl Into<String>,
        age: u32,
        membership_type: MembershipType,
        join_year: i32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            membership_type,
            join_year,
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }
}

/// Partial member update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub membership_type: Option<MembershipType>,
    pub join_year: Option<i32>,
}

impl MemberPatch {
    /// Patch that only changes `age`.
    pub fn age(age: u32) -> Self {
        Self {
            age: Some(age),
            ..Self::default()
        }
    }

    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.membership_type.is_none()
            && self.join_year.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = self.name.as_deref() {
            require_text("name", name)?;
        }
        Ok(())
    }

    /// Applies the patch onto an in-memory record.
    pub fn apply_to(&self, member: &mut Member) {
        if let Some(name) = &self.name {
            member.name = name.clone();
        }
        if let Some(age) = self.age {
            member.age = age;
        }
        if let Some(membership_type) = self.membership_type {
            member.membership_type = membership_type;
        }
        if let Some(join_year) = self.join_year {
            member.join_year = join_year;
        }
    }
}
