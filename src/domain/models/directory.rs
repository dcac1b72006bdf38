use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::entity::{Column, ColumnKind, Entity, EntityDescriptor, FieldValue};

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Directory {
    pub directory_id: String,
    pub project_id: String,
    pub directory_name: String,
    pub parent_directory_id: Option<String>,
    pub materialized_path: String,
    pub depth_level: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct NewDirectory {
    pub project_id: String,
    pub directory_name: String,
    pub parent_directory_id: Option<String>,
    pub created_by: String,
}

impl Directory {
    /// Places a new directory under `parent`, or at the project root.
    pub fn new(draft: NewDirectory, parent: Option<&Directory>) -> Self {
        let (materialized_path, depth_level) = match parent {
            Some(p) => (format!("{}/{}", p.materialized_path, draft.directory_name), p.depth_level + 1),
            None => (format!("/{}", draft.directory_name), 0),
        };

        Self {
            directory_id: Uuid::new_v4().to_string(),
            project_id: draft.project_id,
            directory_name: draft.directory_name,
            parent_directory_id: draft.parent_directory_id,
            materialized_path,
            depth_level,
            created_by: draft.created_by,
            created_at: Utc::now(),
            modified_at: None,
        }
    }
}

impl Entity for Directory {
    const DESCRIPTOR: &'static EntityDescriptor = &EntityDescriptor {
        label: "Directory",
        table: "directories",
        key: "directory_id",
        order_by: "created_at",
        columns: &[
            Column::fixed("directory_id", ColumnKind::Text),
            Column::fixed("project_id", ColumnKind::Text),
            Column::fixed("directory_name", ColumnKind::Text),
            Column::fixed("parent_directory_id", ColumnKind::Text),
            Column::fixed("materialized_path", ColumnKind::Text),
            Column::fixed("depth_level", ColumnKind::Integer),
            Column::fixed("created_by", ColumnKind::Text),
            Column::fixed("created_at", ColumnKind::Timestamp),
            Column::fixed("modified_at", ColumnKind::Timestamp),
        ],
    };

    fn key(&self) -> &str {
        &self.directory_id
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.directory_id.clone().into(),
            self.project_id.clone().into(),
            self.directory_name.clone().into(),
            self.parent_directory_id.clone().into(),
            self.materialized_path.clone().into(),
            self.depth_level.into(),
            self.created_by.clone().into(),
            self.created_at.into(),
            self.modified_at.into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, parent: Option<&str>) -> NewDirectory {
        NewDirectory {
            project_id: "p1".into(),
            directory_name: name.into(),
            parent_directory_id: parent.map(str::to_string),
            created_by: "u1".into(),
        }
    }

    #[test]
    fn root_directories_sit_at_depth_zero() {
        let root = Directory::new(draft("src", None), None);
        assert_eq!(root.materialized_path, "/src");
        assert_eq!(root.depth_level, 0);
    }

    #[test]
    fn nested_directories_extend_parent_path() {
        let root = Directory::new(draft("src", None), None);
        let child = Directory::new(draft("api", Some(&root.directory_id)), Some(&root));
        let grandchild = Directory::new(draft("handlers", Some(&child.directory_id)), Some(&child));

        assert_eq!(child.materialized_path, "/src/api");
        assert_eq!(grandchild.materialized_path, "/src/api/handlers");
        assert_eq!(grandchild.depth_level, 2);
    }
}
