use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_onboarding"))
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("c")).expect("create config dir");
        std::fs::create_dir_all(dir.path().join("d")).expect("create data dir");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("c"))
            .env("XDG_DATA_HOME", self.path().join("d"))
            .env("ONBOARDING_USER", "admin01")
            .env_remove("ONBOARDING_CONFIG")
            .env_remove("ONBOARDING_DB")
            .env_remove("ONBOARDING_MUNICIPALITY")
            .env_remove("ONBOARDING_LOG")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run onboarding")
    }

    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn json(&self, args: &[&str]) -> Value {
        let stdout = self.ok(args);
        serde_json::from_str(&stdout).expect("valid json output")
    }

    fn init(&self) {
        self.ok(&["init", "--municipality", "2281"]);
    }

    fn write(&self, name: &str, contents: &str) -> String {
        let path = self.path().join(name);
        std::fs::write(&path, contents).expect("write file");
        path.to_string_lossy().to_string()
    }
}

const DEFINITION: &str = r#"{
  "organization_number": 42,
  "name": "onboarding",
  "display_name": "Onboarding v1",
  "tasks": [
    { "phase": "First day", "heading": "Collect badge", "sort_order": 1 },
    {
      "phase": "First day",
      "heading": "Set up laptop",
      "sort_order": 2,
      "question_type": "YES_OR_NO_WITH_TEXT"
    },
    {
      "phase": "First month",
      "heading": "Introduction meeting",
      "sort_order": 1,
      "role_type": "MANAGER_FOR_NEW_EMPLOYEE"
    }
  ]
}"#;

/// Init, organizations, phases and an active checklist for org 42.
fn seeded() -> (Sandbox, Value) {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.ok(&["org", "add", "7", "IT department"]);
    sandbox.ok(&["org", "add", "42", "Company", "--channel", "EMAIL"]);
    sandbox.ok(&["phase", "add", "First day", "--sort-order", "1", "--time-to-complete", "P1D"]);
    sandbox.ok(&["phase", "add", "First month", "--sort-order", "2"]);

    let file = sandbox.write("checklist.json", DEFINITION);
    let checklist = sandbox.json(&["checklist", "import", &file, "--activate", "--json"]);
    (sandbox, checklist)
}

fn initiate(sandbox: &Sandbox, employee_id: &str, path: &str) -> Output {
    sandbox.run(&[
        "employee",
        "initiate",
        "--employee-id",
        employee_id,
        "--username",
        "ann01doe",
        "--first-name",
        "Ann",
        "--last-name",
        "Doe",
        "--path",
        path,
        "--start",
        "2026-09-01",
        "--json",
    ])
}

fn task_statuses(view: &Value) -> Vec<(String, String)> {
    view["phases"]
        .as_array()
        .expect("phases")
        .iter()
        .flat_map(|phase| phase["tasks"].as_array().expect("tasks").iter())
        .map(|task| {
            (
                task["heading"].as_str().expect("heading").to_string(),
                task["fulfilment_status"].as_str().expect("status").to_string(),
            )
        })
        .collect()
}

#[test]
fn test_cli_init_writes_config() {
    let sandbox = Sandbox::new();
    let stdout = sandbox.ok(&["init", "--municipality", "2281"]);
    assert!(stdout.contains("Initialized onboarding database"));

    let config_path = sandbox.path().join("c").join("onboarding").join("config.toml");
    let config = std::fs::read_to_string(config_path).expect("config written");
    assert!(config.contains("id = \"2281\""));
    assert!(sandbox.path().join("d").join("onboarding").join("onboarding.db").exists());

    let again = sandbox.run(&["init", "--municipality", "2281"]);
    assert_eq!(again.status.code(), Some(5));
    sandbox.ok(&["init", "--municipality", "2281", "--force"]);
}

#[test]
fn test_cli_missing_config_is_not_found() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["org", "list"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No config found"));
    assert!(stderr.contains("onboarding init"));
}

#[test]
fn test_cli_version_upgrade_keeps_fulfilment() {
    let (sandbox, v1) = seeded();
    assert_eq!(v1["life_cycle"], "ACTIVE");
    let v1_id = v1["id"].as_str().expect("v1 id").to_string();
    let badge = v1["tasks"][0]["id"].as_str().expect("task id").to_string();

    let initiated = initiate(&sandbox, "emp-1", "7,42");
    assert!(initiated.status.success(), "{}", String::from_utf8_lossy(&initiated.stderr));
    let employee_checklist: Value = serde_json::from_slice(&initiated.stdout).expect("json");
    let id = employee_checklist["id"].as_str().expect("id").to_string();
    assert_eq!(employee_checklist["checklist_ids"][0], v1_id.as_str());
    assert_eq!(employee_checklist["end_date"], "2027-02-28");

    sandbox.ok(&["employee", "fulfil", &id, &badge, "--status", "true"]);

    let v2 = sandbox.json(&["checklist", "new-version", &v1_id, "--json"]);
    assert_eq!(v2["version"], 2);
    assert_eq!(v2["life_cycle"], "CREATED");
    let v2_id = v2["id"].as_str().expect("v2 id").to_string();

    let activation = sandbox.json(&["checklist", "activate", &v2_id, "--json"]);
    assert_eq!(activation["migrated_employee_checklists"], 1);
    assert_eq!(activation["repointed_fulfilments"], 1);
    assert_eq!(activation["deprecated"]["version"], 1);

    let view = sandbox.json(&["employee", "show", &id, "--json"]);
    assert_eq!(view["checklist_ids"][0], v2_id.as_str());
    assert_eq!(view["completed"], false);
    assert_eq!(
        task_statuses(&view),
        vec![
            ("Collect badge".to_string(), "TRUE".to_string()),
            ("Set up laptop".to_string(), "EMPTY".to_string()),
            ("Introduction meeting".to_string(), "EMPTY".to_string()),
        ]
    );

    let listed = sandbox.json(&["checklist", "list", "--json"]);
    let life_cycles: Vec<_> = listed
        .as_array()
        .expect("array")
        .iter()
        .map(|checklist| checklist["life_cycle"].as_str().expect("life cycle").to_string())
        .collect();
    assert_eq!(life_cycles, vec!["DEPRECATED", "ACTIVE"]);
}

#[test]
fn test_cli_no_matching_checklist() {
    let (sandbox, _) = seeded();
    let output = initiate(&sandbox, "emp-2", "7");
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No matching checklist found for employee 'ann01doe'"));
}

#[test]
fn test_cli_locked_phase_fulfilment_is_refused() {
    let (sandbox, _) = seeded();
    let initiated = initiate(&sandbox, "emp-3", "42");
    assert!(initiated.status.success());
    let employee_checklist: Value = serde_json::from_slice(&initiated.stdout).expect("json");
    let id = employee_checklist["id"].as_str().expect("id").to_string();

    let phases = sandbox.json(&["phase", "list", "--json"]);
    let first_day = phases[0]["id"].as_str().expect("phase id").to_string();

    let stdout = sandbox.ok(&["employee", "lock-expired", "--today", "2030-01-01"]);
    assert!(stdout.contains("Locked 1 employee checklists"));

    let output = sandbox.run(&["employee", "fulfil-phase", &id, &first_day, "--status", "TRUE"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("locked"));
}

#[test]
fn test_cli_sort_order_override() {
    let (sandbox, checklist) = seeded();
    let checklist_id = checklist["id"].as_str().expect("id").to_string();
    let phases = sandbox.json(&["phase", "list", "--json"]);
    let first_month = phases[1]["id"].as_str().expect("phase id").to_string();

    sandbox.ok(&["sort-order", "set", "--org", "42", "--phase", &first_month, "--position", "0"]);

    let view = sandbox.json(&["checklist", "show", &checklist_id, "--json"]);
    assert_eq!(view["phases"][0]["name"], "First month");

    let view = sandbox.json(&["checklist", "show", &checklist_id, "--org", "7", "--json"]);
    assert_eq!(view["phases"][0]["name"], "First day");

    let overrides = sandbox.json(&["sort-order", "list", "--org", "42", "--json"]);
    assert_eq!(overrides.as_array().expect("array").len(), 1);
    assert_eq!(overrides[0]["component_type"], "PHASE");
}

#[test]
fn test_cli_update_draft() {
    let sandbox = Sandbox::new();
    sandbox.init();
    sandbox.ok(&["org", "add", "42", "Company"]);
    sandbox.ok(&["phase", "add", "First day", "--sort-order", "1"]);
    sandbox.ok(&["phase", "add", "First month", "--sort-order", "2"]);
    let file = sandbox.write("checklist.json", DEFINITION);
    let draft = sandbox.json(&["checklist", "import", &file, "--json"]);
    let id = draft["id"].as_str().expect("id").to_string();
    let laptop = draft["tasks"][1]["id"].as_str().expect("task id").to_string();

    let updated = sandbox.json(&[
        "checklist",
        "update",
        &id,
        "--display-name",
        "Welcome aboard",
        "--remove-task",
        &laptop,
        "--json",
    ]);
    assert_eq!(updated["display_name"], "Welcome aboard");
    assert_eq!(updated["life_cycle"], "CREATED");
    assert_eq!(updated["tasks"].as_array().expect("tasks").len(), 2);
    assert_eq!(updated["last_saved_by"], "admin01");

    let missing = sandbox.run(&["checklist", "update", &id, "--remove-task", &laptop]);
    assert_eq!(missing.status.code(), Some(3));

    sandbox.ok(&["checklist", "activate", &id]);
    let output = sandbox.run(&["checklist", "update", &id, "--display-name", "Too late"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("can no longer be changed"));
}
