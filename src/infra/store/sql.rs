//! SQL text generation from entity descriptors.
//!
//! Builders only ever interpolate identifiers taken from static descriptors;
//! every value travels as a bound parameter.

use chrono::{DateTime, Utc};

use crate::domain::entity::{EntityDescriptor, FieldValue, Filter, Patch};
use crate::domain::models::invitation::{Invitation, InvitationStatus};
use crate::domain::entity::Entity;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<FieldValue>,
}

struct Builder {
    dialect: Dialect,
    sql: String,
    values: Vec<FieldValue>,
}

impl Builder {
    fn new(dialect: Dialect, sql: impl Into<String>) -> Self {
        Self { dialect, sql: sql.into(), values: Vec::new() }
    }

    fn push(&mut self, fragment: &str) -> &mut Self {
        self.sql.push_str(fragment);
        self
    }

    fn bind(&mut self, value: FieldValue) -> &mut Self {
        self.values.push(value);
        match self.dialect {
            Dialect::Sqlite => self.sql.push('?'),
            Dialect::Postgres => {
                let n = self.values.len();
                self.sql.push_str(&format!("${}", n));
            }
        }
        self
    }

    fn where_clause(&mut self, descriptor: &EntityDescriptor, filter: &Filter) -> Result<&mut Self, AppError> {
        for (i, (column, value)) in filter.clauses().iter().enumerate() {
            known_column(descriptor, column)?;
            self.push(if i == 0 { " WHERE " } else { " AND " });
            self.push(column).push(" = ").bind(value.clone());
        }
        Ok(self)
    }

    fn finish(self) -> Statement {
        Statement { sql: self.sql, values: self.values }
    }
}

fn known_column(descriptor: &EntityDescriptor, column: &str) -> Result<(), AppError> {
    match descriptor.column(column) {
        Some(_) => Ok(()),
        None => Err(AppError::InternalWithMsg(format!(
            "column '{}' is not declared for table '{}'",
            column, descriptor.table
        ))),
    }
}

pub fn select_by_key(descriptor: &EntityDescriptor, dialect: Dialect, key: &str) -> Statement {
    let mut b = Builder::new(dialect, format!("SELECT * FROM {} WHERE {} = ", descriptor.table, descriptor.key));
    b.bind(key.into());
    b.finish()
}

/// `page` is `(offset, limit)`; `None` returns every matching row.
pub fn select(
    descriptor: &EntityDescriptor,
    dialect: Dialect,
    filter: &Filter,
    page: Option<(i64, i64)>,
) -> Result<Statement, AppError> {
    let mut b = Builder::new(dialect, format!("SELECT * FROM {}", descriptor.table));
    b.where_clause(descriptor, filter)?;
    b.push(&format!(" ORDER BY {}, {}", descriptor.order_by, descriptor.key));
    if let Some((offset, limit)) = page {
        b.push(" LIMIT ").bind(limit.into());
        b.push(" OFFSET ").bind(offset.into());
    }
    Ok(b.finish())
}

pub fn count(descriptor: &EntityDescriptor, dialect: Dialect, filter: &Filter) -> Result<Statement, AppError> {
    let mut b = Builder::new(dialect, format!("SELECT COUNT(*) FROM {}", descriptor.table));
    b.where_clause(descriptor, filter)?;
    Ok(b.finish())
}

pub fn insert(descriptor: &EntityDescriptor, dialect: Dialect, values: Vec<FieldValue>) -> Result<Statement, AppError> {
    if values.len() != descriptor.columns.len() {
        return Err(AppError::InternalWithMsg(format!(
            "{} values supplied for {} columns of '{}'",
            values.len(),
            descriptor.columns.len(),
            descriptor.table
        )));
    }

    let names: Vec<&str> = descriptor.columns.iter().map(|c| c.name).collect();
    let mut b = Builder::new(dialect, format!("INSERT INTO {} ({}) VALUES (", descriptor.table, names.join(", ")));
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            b.push(", ");
        }
        b.bind(value);
    }
    b.push(") RETURNING *");
    Ok(b.finish())
}

pub fn update(descriptor: &EntityDescriptor, dialect: Dialect, key: &str, patch: &Patch) -> Result<Statement, AppError> {
    if patch.is_empty() {
        return Err(AppError::InternalWithMsg("empty update".to_string()));
    }

    let mut b = Builder::new(dialect, format!("UPDATE {} SET ", descriptor.table));
    for (i, (column, value)) in patch.changes().iter().enumerate() {
        known_column(descriptor, column)?;
        if i > 0 {
            b.push(", ");
        }
        b.push(column).push(" = ").bind(value.clone());
    }
    b.push(&format!(" WHERE {} = ", descriptor.key)).bind(key.into());
    b.push(" RETURNING *");
    Ok(b.finish())
}

pub fn delete(descriptor: &EntityDescriptor, dialect: Dialect, key: &str) -> Statement {
    let mut b = Builder::new(dialect, format!("DELETE FROM {} WHERE {} = ", descriptor.table, descriptor.key));
    b.bind(key.into());
    b.push(" RETURNING *");
    b.finish()
}

/// Conditional status change; matches nothing unless the row is still pending.
pub fn advance_invitation(dialect: Dialect, invitation_id: &str, to: InvitationStatus) -> Statement {
    let d = Invitation::DESCRIPTOR;
    let mut b = Builder::new(dialect, format!("UPDATE {} SET status = ", d.table));
    b.bind(to.into());
    b.push(&format!(" WHERE {} = ", d.key)).bind(invitation_id.into());
    b.push(" AND status = ").bind(InvitationStatus::Pending.into());
    b.push(" RETURNING *");
    b.finish()
}

pub fn accept_invitation(
    dialect: Dialect,
    invitation_id: &str,
    user_id: &str,
    accepted_at: DateTime<Utc>,
) -> Statement {
    let d = Invitation::DESCRIPTOR;
    let mut b = Builder::new(dialect, format!("UPDATE {} SET status = ", d.table));
    b.bind(InvitationStatus::Accepted.into());
    b.push(", accepted_at = ").bind(accepted_at.into());
    b.push(", user_id = ").bind(user_id.into());
    b.push(&format!(" WHERE {} = ", d.key)).bind(invitation_id.into());
    b.push(" AND status = ").bind(InvitationStatus::Pending.into());
    b.finish()
}
