//! SQLite storage backend.
//!
//! Aggregates are written inside a single transaction: a checklist together
//! with its tasks, an employee checklist together with its checklist links,
//! custom tasks and fulfilment records.

mod row;
mod schema;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Transaction};
use uuid::Uuid;

use crate::error::{OnboardingError, Result};
use crate::storage::traits::StorageEngine;
use crate::storage::types::{
    Checklist, EmployeeChecklist, NewOrganization, NewPhase, OrganizationUnit, Phase, SortOrder,
    Task,
};

use row::{
    parse_date, parse_optional_timestamp, parse_stored, parse_timestamp, parse_uuid,
    ChecklistRow, CustomTaskRow, EmployeeChecklistRow, FulfilmentRow, OrganizationRow, PhaseRow,
    SortOrderRow, TaskRow,
};
use schema::{SCHEMA, SCHEMA_VERSION};

/// SQLite-backed storage engine.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    )
}

/// Map a constraint violation to `Conflict`, everything else to `Storage`.
fn conflict_or_storage(err: rusqlite::Error, message: impl FnOnce() -> String) -> OnboardingError {
    if is_constraint_violation(&err) {
        OnboardingError::Conflict(message())
    } else {
        OnboardingError::from(err)
    }
}

impl SqliteStorage {
    /// Open (or create) a database file and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| {
            OnboardingError::Storage(format!("Cannot open database {}: {}", path.display(), e))
        })?;
        Self::initialize(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?)
    }

    fn initialize(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| OnboardingError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Schema version recorded in the database.
    pub fn schema_version(&self) -> Result<String> {
        let conn = self.lock_conn()?;
        let version = conn.query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    fn load_tasks(conn: &Connection, checklist_id: &str) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE checklist_id = ?1 ORDER BY position",
            TaskRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![checklist_id], TaskRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Task::try_from).collect()
    }

    fn checklist_from_row(conn: &Connection, row: ChecklistRow) -> Result<Checklist> {
        let tasks = Self::load_tasks(conn, &row.id)?;
        Ok(Checklist {
            id: Some(parse_uuid(&row.id, "checklist")?),
            name: row.name,
            display_name: row.display_name,
            version: row.version,
            life_cycle: parse_stored(&row.life_cycle)?,
            municipality_id: row.municipality_id,
            organization_id: row
                .organization_id
                .as_deref()
                .map(|id| parse_uuid(id, "organization"))
                .transpose()?,
            tasks,
            created: parse_optional_timestamp(row.created.as_deref())?,
            updated: parse_optional_timestamp(row.updated.as_deref())?,
            last_saved_by: row.last_saved_by,
        })
    }

    fn query_checklists(
        conn: &Connection,
        filter: &str,
        value: &str,
    ) -> Result<Vec<Checklist>> {
        let sql = format!(
            "SELECT {} FROM checklists WHERE {} = ?1 ORDER BY name, version",
            ChecklistRow::COLUMNS,
            filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![value], ChecklistRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|row| Self::checklist_from_row(conn, row))
            .collect()
    }

    fn employee_checklist_from_row(
        conn: &Connection,
        row: EmployeeChecklistRow,
    ) -> Result<EmployeeChecklist> {
        let employee = row.employee()?;
        let mentor = row.mentor()?;

        let mut stmt = conn.prepare(
            "SELECT checklist_id FROM employee_checklist_checklists
             WHERE employee_checklist_id = ?1 ORDER BY position",
        )?;
        let checklist_ids = stmt
            .query_map(params![row.id], |r| r.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .iter()
            .map(|id| parse_uuid(id, "checklist"))
            .collect::<Result<Vec<_>>>()?;

        let sql = format!(
            "SELECT {} FROM custom_tasks WHERE employee_checklist_id = ?1 ORDER BY rowid",
            CustomTaskRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let custom_tasks = stmt
            .query_map(params![row.id], CustomTaskRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(TryFrom::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT task_id, status, response_text, last_saved_by, updated
             FROM fulfilments WHERE employee_checklist_id = ?1 ORDER BY rowid",
        )?;
        let fulfilments = stmt
            .query_map(params![row.id], FulfilmentRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(TryFrom::try_from)
            .collect::<Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
            "SELECT custom_task_id, status, response_text, last_saved_by, updated
             FROM custom_fulfilments WHERE employee_checklist_id = ?1 ORDER BY rowid",
        )?;
        let custom_fulfilments = stmt
            .query_map(params![row.id], FulfilmentRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .map(TryFrom::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(EmployeeChecklist {
            id: parse_uuid(&row.id, "employee checklist")?,
            municipality_id: row.municipality_id,
            employee,
            checklist_ids,
            start_date: parse_date(&row.start_date)?,
            end_date: parse_date(&row.end_date)?,
            expiration_date: parse_date(&row.expiration_date)?,
            locked: row.locked,
            mentor,
            custom_tasks,
            fulfilments,
            custom_fulfilments,
            created: parse_timestamp(&row.created)?,
            updated: parse_timestamp(&row.updated)?,
        })
    }

    fn query_employee_checklists(
        conn: &Connection,
        sql: &str,
        value: &str,
    ) -> Result<Vec<EmployeeChecklist>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![value], EmployeeChecklistRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|row| Self::employee_checklist_from_row(conn, row))
            .collect()
    }

    fn write_tasks(tx: &Transaction<'_>, checklist_id: &str, tasks: &[Task]) -> Result<()> {
        tx.execute("DELETE FROM tasks WHERE checklist_id = ?1", params![checklist_id])?;
        let mut stmt = tx.prepare(
            "INSERT INTO tasks (id, checklist_id, position, phase_id, heading, heading_reference,
                 text, sort_order, role_type, question_type, permission, created, updated,
                 last_saved_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;
        for (position, task) in tasks.iter().enumerate() {
            let id = task
                .id
                .ok_or_else(|| OnboardingError::Storage("Task id not assigned".to_string()))?;
            stmt.execute(params![
                id.to_string(),
                checklist_id,
                position as i64,
                task.phase_id.map(|phase_id| phase_id.to_string()),
                task.heading,
                task.heading_reference,
                task.text,
                task.sort_order,
                task.role_type.as_str(),
                task.question_type.as_str(),
                task.permission.as_str(),
                task.created.map(|ts| ts.to_rfc3339()),
                task.updated.map(|ts| ts.to_rfc3339()),
                task.last_saved_by,
            ])
            .map_err(|e| conflict_or_storage(e, || format!("Task {} already exists", id)))?;
        }
        Ok(())
    }

    fn write_employee_children(
        tx: &Transaction<'_>,
        employee_checklist: &EmployeeChecklist,
    ) -> Result<()> {
        let id = employee_checklist.id.to_string();
        for table in [
            "employee_checklist_checklists",
            "custom_tasks",
            "fulfilments",
            "custom_fulfilments",
        ] {
            tx.execute(
                &format!("DELETE FROM {} WHERE employee_checklist_id = ?1", table),
                params![id],
            )?;
        }

        for (position, checklist_id) in employee_checklist.checklist_ids.iter().enumerate() {
            tx.execute(
                "INSERT INTO employee_checklist_checklists
                     (employee_checklist_id, checklist_id, position)
                 VALUES (?1, ?2, ?3)",
                params![id, checklist_id.to_string(), position as i64],
            )?;
        }

        for task in &employee_checklist.custom_tasks {
            tx.execute(
                "INSERT INTO custom_tasks (id, employee_checklist_id, phase_id, heading, text,
                     sort_order, role_type, question_type, created, updated, last_saved_by)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    task.id.to_string(),
                    id,
                    task.phase_id.to_string(),
                    task.heading,
                    task.text,
                    task.sort_order,
                    task.role_type.as_str(),
                    task.question_type.as_str(),
                    task.created.to_rfc3339(),
                    task.updated.to_rfc3339(),
                    task.last_saved_by,
                ],
            )?;
        }

        for fulfilment in &employee_checklist.fulfilments {
            tx.execute(
                "INSERT INTO fulfilments (employee_checklist_id, task_id, status, response_text,
                     last_saved_by, updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    fulfilment.task_id.to_string(),
                    fulfilment.status.as_str(),
                    fulfilment.response_text,
                    fulfilment.last_saved_by,
                    fulfilment.updated.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                conflict_or_storage(e, || {
                    format!("Duplicate fulfilment for task {}", fulfilment.task_id)
                })
            })?;
        }

        for fulfilment in &employee_checklist.custom_fulfilments {
            tx.execute(
                "INSERT INTO custom_fulfilments (employee_checklist_id, custom_task_id, status,
                     response_text, last_saved_by, updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    fulfilment.custom_task_id.to_string(),
                    fulfilment.status.as_str(),
                    fulfilment.response_text,
                    fulfilment.last_saved_by,
                    fulfilment.updated.to_rfc3339(),
                ],
            )
            .map_err(|e| {
                conflict_or_storage(e, || {
                    format!(
                        "Duplicate fulfilment for custom task {}",
                        fulfilment.custom_task_id
                    )
                })
            })?;
        }

        Ok(())
    }
}

impl StorageEngine for SqliteStorage {
    fn create_organization(&mut self, organization: &NewOrganization) -> Result<Uuid> {
        let conn = self.lock_conn()?;
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        let channels = organization
            .communication_channels
            .iter()
            .map(|channel| channel.as_str())
            .collect::<Vec<_>>()
            .join(",");

        conn.execute(
            "INSERT INTO organizations (id, municipality_id, organization_number,
                 organization_name, communication_channels, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                id.to_string(),
                organization.municipality_id,
                organization.organization_number,
                organization.organization_name,
                channels,
                now,
            ],
        )
        .map_err(|e| {
            conflict_or_storage(e, || {
                format!(
                    "Organization {} already exists in municipality {}",
                    organization.organization_number, organization.municipality_id
                )
            })
        })?;

        Ok(id)
    }

    fn get_organization(
        &self,
        municipality_id: &str,
        organization_number: i32,
    ) -> Result<Option<OrganizationUnit>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM organizations WHERE municipality_id = ?1 AND organization_number = ?2",
            OrganizationRow::COLUMNS
        );
        conn.query_row(
            &sql,
            params![municipality_id, organization_number],
            OrganizationRow::from_row,
        )
        .optional()?
        .map(OrganizationUnit::try_from)
        .transpose()
    }

    fn get_organization_by_id(&self, id: &Uuid) -> Result<Option<OrganizationUnit>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM organizations WHERE id = ?1",
            OrganizationRow::COLUMNS
        );
        conn.query_row(&sql, params![id.to_string()], OrganizationRow::from_row)
            .optional()?
            .map(OrganizationUnit::try_from)
            .transpose()
    }

    fn list_organizations(&self, municipality_id: &str) -> Result<Vec<OrganizationUnit>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM organizations WHERE municipality_id = ?1 ORDER BY organization_number",
            OrganizationRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![municipality_id], OrganizationRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(OrganizationUnit::try_from).collect()
    }

    fn create_phase(&mut self, phase: &NewPhase) -> Result<Uuid> {
        let conn = self.lock_conn()?;
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO phases (id, municipality_id, name, body_text, time_to_complete,
                 permission, sort_order, created, updated, last_saved_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9)",
            params![
                id.to_string(),
                phase.municipality_id,
                phase.name,
                phase.body_text,
                phase.time_to_complete,
                phase.permission.as_str(),
                phase.sort_order,
                now,
                phase.last_saved_by,
            ],
        )?;
        Ok(id)
    }

    fn get_phase(&self, id: &Uuid) -> Result<Option<Phase>> {
        let conn = self.lock_conn()?;
        let sql = format!("SELECT {} FROM phases WHERE id = ?1", PhaseRow::COLUMNS);
        conn.query_row(&sql, params![id.to_string()], PhaseRow::from_row)
            .optional()?
            .map(Phase::try_from)
            .transpose()
    }

    fn list_phases(&self, municipality_id: &str) -> Result<Vec<Phase>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM phases WHERE municipality_id = ?1 ORDER BY sort_order, name",
            PhaseRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![municipality_id], PhaseRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Phase::try_from).collect()
    }

    fn save_checklist(&mut self, checklist: &Checklist) -> Result<Checklist> {
        let now = Utc::now();
        let mut stored = checklist.clone();
        let id = *stored.id.get_or_insert_with(Uuid::new_v4);
        stored.created.get_or_insert(now);
        stored.updated = Some(now);
        for task in stored.tasks.iter_mut() {
            task.id.get_or_insert_with(Uuid::new_v4);
            task.created.get_or_insert(now);
            task.updated.get_or_insert(now);
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO checklists (id, municipality_id, organization_id, name, display_name,
                 version, life_cycle, created, updated, last_saved_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                 municipality_id = excluded.municipality_id,
                 organization_id = excluded.organization_id,
                 name = excluded.name,
                 display_name = excluded.display_name,
                 version = excluded.version,
                 life_cycle = excluded.life_cycle,
                 updated = excluded.updated,
                 last_saved_by = excluded.last_saved_by",
            params![
                id.to_string(),
                stored.municipality_id,
                stored.organization_id.map(|org| org.to_string()),
                stored.name,
                stored.display_name,
                stored.version,
                stored.life_cycle.as_str(),
                stored.created.map(|ts| ts.to_rfc3339()),
                stored.updated.map(|ts| ts.to_rfc3339()),
                stored.last_saved_by,
            ],
        )
        .map_err(|e| {
            conflict_or_storage(e, || {
                format!(
                    "Checklist '{}' version {} already exists in municipality {}",
                    stored.name, stored.version, stored.municipality_id
                )
            })
        })?;
        Self::write_tasks(&tx, &id.to_string(), &stored.tasks)?;
        tx.commit()?;

        Ok(stored)
    }

    fn get_checklist(&self, id: &Uuid) -> Result<Option<Checklist>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM checklists WHERE id = ?1",
            ChecklistRow::COLUMNS
        );
        let row = conn
            .query_row(&sql, params![id.to_string()], ChecklistRow::from_row)
            .optional()?;
        row.map(|row| Self::checklist_from_row(&conn, row))
            .transpose()
    }

    fn list_checklists(&self, municipality_id: &str) -> Result<Vec<Checklist>> {
        let conn = self.lock_conn()?;
        Self::query_checklists(&conn, "municipality_id", municipality_id)
    }

    fn list_checklists_for_organization(&self, organization_id: &Uuid) -> Result<Vec<Checklist>> {
        let conn = self.lock_conn()?;
        Self::query_checklists(&conn, "organization_id", &organization_id.to_string())
    }

    fn delete_checklist(&mut self, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        let deleted =
            conn.execute("DELETE FROM checklists WHERE id = ?1", params![id.to_string()])?;
        if deleted == 0 {
            return Err(OnboardingError::NotFound(format!("Checklist {}", id)));
        }
        Ok(())
    }

    fn save_employee_checklist(&mut self, employee_checklist: &EmployeeChecklist) -> Result<()> {
        let employee_json = serde_json::to_string(&employee_checklist.employee)?;
        let mentor_json = employee_checklist
            .mentor
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO employee_checklists (id, municipality_id, employee_id, employee_json,
                 start_date, end_date, expiration_date, locked, mentor_json, created, updated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
             ON CONFLICT(id) DO UPDATE SET
                 employee_json = excluded.employee_json,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date,
                 expiration_date = excluded.expiration_date,
                 locked = excluded.locked,
                 mentor_json = excluded.mentor_json,
                 updated = excluded.updated",
            params![
                employee_checklist.id.to_string(),
                employee_checklist.municipality_id,
                employee_checklist.employee.id,
                employee_json,
                employee_checklist.start_date.to_string(),
                employee_checklist.end_date.to_string(),
                employee_checklist.expiration_date.to_string(),
                employee_checklist.locked,
                mentor_json,
                employee_checklist.created.to_rfc3339(),
                employee_checklist.updated.to_rfc3339(),
            ],
        )
        .map_err(|e| {
            conflict_or_storage(e, || {
                format!(
                    "Employee '{}' already has a checklist in municipality {}",
                    employee_checklist.employee.id, employee_checklist.municipality_id
                )
            })
        })?;
        Self::write_employee_children(&tx, employee_checklist)?;
        tx.commit()?;
        Ok(())
    }

    fn get_employee_checklist(&self, id: &Uuid) -> Result<Option<EmployeeChecklist>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM employee_checklists WHERE id = ?1",
            EmployeeChecklistRow::COLUMNS
        );
        Ok(Self::query_employee_checklists(&conn, &sql, &id.to_string())?
            .into_iter()
            .next())
    }

    fn find_employee_checklist(
        &self,
        municipality_id: &str,
        employee_id: &str,
    ) -> Result<Option<EmployeeChecklist>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM employee_checklists WHERE municipality_id = ?1 AND employee_id = ?2",
            EmployeeChecklistRow::COLUMNS
        );
        let row = conn
            .query_row(
                &sql,
                params![municipality_id, employee_id],
                EmployeeChecklistRow::from_row,
            )
            .optional()?;
        row.map(|row| Self::employee_checklist_from_row(&conn, row))
            .transpose()
    }

    fn list_employee_checklists(&self, municipality_id: &str) -> Result<Vec<EmployeeChecklist>> {
        let conn = self.lock_conn()?;
        let sql = format!(
            "SELECT {} FROM employee_checklists WHERE municipality_id = ?1 ORDER BY created",
            EmployeeChecklistRow::COLUMNS
        );
        Self::query_employee_checklists(&conn, &sql, municipality_id)
    }

    fn list_employee_checklists_for_checklist(
        &self,
        checklist_id: &Uuid,
    ) -> Result<Vec<EmployeeChecklist>> {
        let conn = self.lock_conn()?;
        let columns = EmployeeChecklistRow::COLUMNS
            .split(", ")
            .map(|column| format!("ec.{}", column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM employee_checklists ec
             JOIN employee_checklist_checklists link ON link.employee_checklist_id = ec.id
             WHERE link.checklist_id = ?1
             ORDER BY ec.created",
            columns
        );
        Self::query_employee_checklists(&conn, &sql, &checklist_id.to_string())
    }

    fn delete_employee_checklist(&mut self, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute(
            "DELETE FROM employee_checklists WHERE id = ?1",
            params![id.to_string()],
        )?;
        if deleted == 0 {
            return Err(OnboardingError::NotFound(format!("Employee checklist {}", id)));
        }
        Ok(())
    }

    fn save_sort_order(&mut self, sort_order: &SortOrder) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO sort_orders (municipality_id, organization_number, component_id,
                 component_type, position)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(municipality_id, organization_number, component_id) DO UPDATE SET
                 component_type = excluded.component_type,
                 position = excluded.position",
            params![
                sort_order.municipality_id,
                sort_order.organization_number,
                sort_order.component_id.to_string(),
                sort_order.component_type.as_str(),
                sort_order.position,
            ],
        )?;
        Ok(())
    }

    fn list_sort_orders(
        &self,
        municipality_id: &str,
        organization_number: i32,
    ) -> Result<Vec<SortOrder>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT municipality_id, organization_number, component_id, component_type, position
             FROM sort_orders
             WHERE municipality_id = ?1 AND organization_number = ?2
             ORDER BY component_type, position",
        )?;
        let rows = stmt
            .query_map(
                params![municipality_id, organization_number],
                SortOrderRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(SortOrder::try_from).collect()
    }

    fn list_sort_orders_for_component(
        &self,
        municipality_id: &str,
        component_id: &Uuid,
    ) -> Result<Vec<SortOrder>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT municipality_id, organization_number, component_id, component_type, position
             FROM sort_orders
             WHERE municipality_id = ?1 AND component_id = ?2
             ORDER BY organization_number",
        )?;
        let rows = stmt
            .query_map(
                params![municipality_id, component_id.to_string()],
                SortOrderRow::from_row,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(SortOrder::try_from).collect()
    }
}
