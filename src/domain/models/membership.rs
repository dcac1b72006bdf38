use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Membership {
    pub project_member_id: String,
    pub project_id: String,
    pub user_id: String,
    pub role_id: String,
    pub invited_by: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Membership {
    pub fn new(project_id: String, user_id: String, role_id: String, invited_by: Option<String>) -> Self {
        Self {
            project_member_id: Uuid::new_v4().to_string(),
            project_id,
            user_id,
            role_id,
            invited_by,
            joined_at: Utc::now(),
            last_activity: None,
            is_active: true,
        }
    }
}

impl Entity for Membership {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Project member",
        table: "project_members",
        key: "project_member_id",
        order_by: "joined_at",
        columns: &[
            Column::fixed("project_member_id", ColumnKind::Text),
            Column::fixed("project_id", ColumnKind::Text),
            Column::fixed("user_id", ColumnKind::Text),
            Column::editable("role_id", ColumnKind::Text),
            Column::fixed("invited_by", ColumnKind::Text),
            Column::fixed("joined_at", ColumnKind::Timestamp),
            Column::editable("last_activity", ColumnKind::Timestamp),
            Column::fixed("is_active", ColumnKind::Bool),
        ],
    };

    fn key(&self) -> &str {
        &self.project_member_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.project_member_id.clone().into(),
            self.project_id.clone().into(),
            self.user_id.clone().into(),
            self.role_id.clone().into(),
            self.invited_by.clone().into(),
            self.joined_at.into(),
            self.last_activity.into(),
            self.is_active.into(),
        ]
    }
}

/// One row of a project's member listing.
///
/// The owner is resolved from the project at read time and never persisted;
/// every persisted membership row is an `ExplicitMember`.
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "membership", rename_all = "snake_case")]
pub enum ProjectMemberEntry {
    OwnerImplicit {
        project_id: String,
        user_id: String,
        role_id: Option<String>,
        joined_at: DateTime<Utc>,
    },
    ExplicitMember(Membership),
}

impl ProjectMemberEntry {
    pub fn user_id(&self) -> &str {
        match self {
            ProjectMemberEntry::OwnerImplicit { user_id, .. } => user_id,
            ProjectMemberEntry::ExplicitMember(m) => &m.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_entries_serialize_with_kind_tag() {
        let member = Membership::new("p1".into(), "u1".into(), "r1".into(), None);
        let explicit = serde_json::to_value(ProjectMemberEntry::ExplicitMember(member)).unwrap();
        assert_eq!(explicit["membership"], "explicit_member");
        assert_eq!(explicit["user_id"], "u1");
        assert_eq!(explicit["is_active"], true);

        let owner = serde_json::to_value(ProjectMemberEntry::OwnerImplicit {
            project_id: "p1".into(),
            user_id: "owner".into(),
            role_id: None,
            joined_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(owner["membership"], "owner_implicit");
        assert_eq!(owner["user_id"], "owner");
        assert!(owner["role_id"].is_null());
    }
}
