//! The fixed entity kinds and operations exposed by the uniform client.

use serde::{Deserialize, Serialize};

/// Entity kinds the uniform client knows how to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Contacts,
    Organisations,
}

impl EntityKind {
    /// Key used in endpoint mappings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Organisations => "organisations",
        }
    }

    /// Placeholder names a vendor may use for this entity's id.
    ///
    /// Every name is supplied on `get`/`update`; substitution ignores the ones
    /// a path template does not contain.
    #[must_use]
    pub const fn id_params(self) -> &'static [&'static str] {
        match self {
            Self::Contacts => &["contactId", "id"],
            Self::Organisations => &["companyId", "organisationId", "id"],
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations the uniform client exposes per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrudAction {
    List,
    Get,
    Create,
    Update,
}

impl CrudAction {
    /// Key used in endpoint mappings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl std::fmt::Display for CrudAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
