//! Transaction template operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{validate_amount, NewTemplate, Template};

impl Database {
    pub fn insert_template(&self, owner: &str, template: &NewTemplate) -> Result<Template> {
        validate_amount(template.amount)?;
        if template.name.trim().is_empty() {
            return Err(Error::InvalidInput("Template name must not be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO templates (owner_id, name, amount, kind, category, description)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                owner,
                template.name.trim(),
                template.amount,
                template.kind.as_str(),
                template.category,
                template.description,
            ],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.list_templates(owner)?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::not_found("Template", id))
    }

    /// The owner's templates, alphabetically by name
    pub fn list_templates(&self, owner: &str) -> Result<Vec<Template>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, owner_id, name, amount, kind, category, description, created_at
             FROM templates WHERE owner_id = ? ORDER BY name COLLATE NOCASE, id",
        )?;
        let rows = stmt
            .query_map(params![owner], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, Option<String>>(7)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, owner_id, name, amount, kind, category, description, created_at)| {
                    Ok(Template {
                        id,
                        owner_id,
                        name,
                        amount,
                        kind: kind.parse()?,
                        category,
                        description,
                        created_at: parse_datetime(created_at.as_deref().unwrap_or_default()),
                    })
                },
            )
            .collect()
    }

    /// Delete a template, returning the number of rows removed
    pub fn delete_template(&self, owner: &str, id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let removed = conn.execute(
            "DELETE FROM templates WHERE id = ? AND owner_id = ?",
            params![id, owner],
        )?;
        Ok(removed)
    }
}
