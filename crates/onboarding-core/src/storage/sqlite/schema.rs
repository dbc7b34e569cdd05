//! SQLite schema for onboarding storage.

/// Current schema version, stored in `meta`.
pub const SCHEMA_VERSION: &str = "1";

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    id TEXT PRIMARY KEY,
    municipality_id TEXT NOT NULL,
    organization_number INTEGER NOT NULL,
    organization_name TEXT NOT NULL,
    communication_channels TEXT NOT NULL,
    created TEXT NOT NULL,
    updated TEXT NOT NULL,

    UNIQUE(municipality_id, organization_number)
);

CREATE TABLE IF NOT EXISTS phases (
    id TEXT PRIMARY KEY,
    municipality_id TEXT NOT NULL,
    name TEXT NOT NULL,
    body_text TEXT,
    time_to_complete TEXT,
    permission TEXT NOT NULL,
    sort_order INTEGER NOT NULL,
    created TEXT NOT NULL,
    updated TEXT NOT NULL,
    last_saved_by TEXT
);

CREATE TABLE IF NOT EXISTS checklists (
    id TEXT PRIMARY KEY,
    municipality_id TEXT NOT NULL,
    organization_id TEXT,
    name TEXT NOT NULL,
    display_name TEXT NOT NULL,
    version INTEGER NOT NULL,
    life_cycle TEXT NOT NULL,
    created TEXT,
    updated TEXT,
    last_saved_by TEXT,

    UNIQUE(municipality_id, name, version),
    FOREIGN KEY(organization_id) REFERENCES organizations(id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    checklist_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    phase_id TEXT,
    heading TEXT NOT NULL,
    heading_reference TEXT,
    text TEXT,
    sort_order INTEGER NOT NULL,
    role_type TEXT NOT NULL,
    question_type TEXT NOT NULL,
    permission TEXT NOT NULL,
    created TEXT,
    updated TEXT,
    last_saved_by TEXT,

    FOREIGN KEY(checklist_id) REFERENCES checklists(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_tasks_checklist ON tasks(checklist_id);

CREATE TABLE IF NOT EXISTS employee_checklists (
    id TEXT PRIMARY KEY,
    municipality_id TEXT NOT NULL,
    employee_id TEXT NOT NULL,
    employee_json TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    expiration_date TEXT NOT NULL,
    locked INTEGER NOT NULL DEFAULT 0,
    mentor_json TEXT,
    created TEXT NOT NULL,
    updated TEXT NOT NULL,

    UNIQUE(municipality_id, employee_id)
);

CREATE TABLE IF NOT EXISTS employee_checklist_checklists (
    employee_checklist_id TEXT NOT NULL,
    checklist_id TEXT NOT NULL,
    position INTEGER NOT NULL,

    PRIMARY KEY (employee_checklist_id, checklist_id),
    FOREIGN KEY(employee_checklist_id) REFERENCES employee_checklists(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS custom_tasks (
    id TEXT PRIMARY KEY,
    employee_checklist_id TEXT NOT NULL,
    phase_id TEXT NOT NULL,
    heading TEXT NOT NULL,
    text TEXT,
    sort_order INTEGER NOT NULL,
    role_type TEXT NOT NULL,
    question_type TEXT NOT NULL,
    created TEXT NOT NULL,
    updated TEXT NOT NULL,
    last_saved_by TEXT,

    FOREIGN KEY(employee_checklist_id) REFERENCES employee_checklists(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS fulfilments (
    employee_checklist_id TEXT NOT NULL,
    task_id TEXT NOT NULL,
    status TEXT NOT NULL,
    response_text TEXT,
    last_saved_by TEXT NOT NULL,
    updated TEXT NOT NULL,

    PRIMARY KEY (employee_checklist_id, task_id),
    FOREIGN KEY(employee_checklist_id) REFERENCES employee_checklists(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS custom_fulfilments (
    employee_checklist_id TEXT NOT NULL,
    custom_task_id TEXT NOT NULL,
    status TEXT NOT NULL,
    response_text TEXT,
    last_saved_by TEXT NOT NULL,
    updated TEXT NOT NULL,

    PRIMARY KEY (employee_checklist_id, custom_task_id),
    FOREIGN KEY(employee_checklist_id) REFERENCES employee_checklists(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS sort_orders (
    municipality_id TEXT NOT NULL,
    organization_number INTEGER NOT NULL,
    component_id TEXT NOT NULL,
    component_type TEXT NOT NULL,
    position INTEGER NOT NULL,

    PRIMARY KEY (municipality_id, organization_number, component_id)
);
"#;
