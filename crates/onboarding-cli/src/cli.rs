use clap::{Args, Parser, Subcommand};

use onboarding_core::VERSION;

/// Onboarding - versioned onboarding checklists for organization units and employees
#[derive(Parser)]
#[command(name = "onboarding")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(long, global = true, env = "ONBOARDING_DB")]
    pub db: Option<String>,

    /// Municipality to operate on
    #[arg(short, long, global = true, env = "ONBOARDING_MUNICIPALITY")]
    pub municipality: Option<String>,

    /// User recorded as last saved by
    #[arg(long, global = true, env = "ONBOARDING_USER", default_value = "admin")]
    pub user: String,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Subcommand)]
pub enum OrgCommand {
    /// Register an organization unit
    Add(OrgAddArgs),

    /// List organization units
    List(ListArgs),
}

#[derive(Args)]
pub struct OrgAddArgs {
    /// Organization number from the HR directory
    #[arg(value_name = "NUMBER")]
    pub number: i32,

    /// Organization name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Communication channel (EMAIL, NO_COMMUNICATION); repeatable
    #[arg(long = "channel", value_name = "CHANNEL")]
    pub channels: Vec<String>,
}

#[derive(Subcommand)]
pub enum PhaseCommand {
    /// Create a phase
    Add(PhaseAddArgs),

    /// List phases
    List(ListArgs),
}

#[derive(Args)]
pub struct PhaseAddArgs {
    /// Phase name
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Structural position
    #[arg(long, default_value_t = 0)]
    pub sort_order: i32,

    #[arg(long)]
    pub body_text: Option<String>,

    /// ISO-8601 duration, e.g. P1M
    #[arg(long)]
    pub time_to_complete: Option<String>,

    /// ADMIN or SUPERADMIN
    #[arg(long)]
    pub permission: Option<String>,
}

#[derive(Subcommand)]
pub enum ChecklistCommand {
    /// Import a checklist definition from a JSON file
    Import(ChecklistImportArgs),

    /// List checklists
    List(ListArgs),

    /// Show a checklist grouped by phase
    Show(ChecklistShowArgs),

    /// Create the next draft version by cloning a checklist
    NewVersion(ChecklistIdArgs),

    /// Edit a draft version
    Update(ChecklistUpdateArgs),

    /// Activate a draft version
    Activate(ChecklistIdArgs),

    /// Delete a draft version
    Delete(ChecklistIdArgs),
}

#[derive(Args)]
pub struct ChecklistImportArgs {
    /// Definition file
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Activate the imported version right away
    #[arg(long)]
    pub activate: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ChecklistIdArgs {
    /// Checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ChecklistUpdateArgs {
    /// Checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// New display name
    #[arg(long)]
    pub display_name: Option<String>,

    /// Remove a task from the draft (repeatable)
    #[arg(long = "remove-task", value_name = "TASK")]
    pub remove_tasks: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ChecklistShowArgs {
    /// Checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Apply the sort order of this organization
    #[arg(long, value_name = "NUMBER")]
    pub org: Option<i32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum EmployeeCommand {
    /// Start onboarding for an employee
    Initiate(InitiateArgs),

    /// List employee checklists
    List(ListArgs),

    /// Show an employee checklist with fulfilment
    Show(EmployeeShowArgs),

    /// Set the fulfilment of one task
    Fulfil(FulfilArgs),

    /// Set the fulfilment of every task in a phase
    FulfilPhase(FulfilPhaseArgs),

    /// Manage custom tasks
    #[command(subcommand)]
    CustomTask(CustomTaskCommand),

    /// Set or clear the mentor
    Mentor(MentorArgs),

    /// Lock employee checklists past their expiration date
    LockExpired(LockExpiredArgs),

    /// Delete an employee checklist
    Delete(EmployeeIdArgs),
}

#[derive(Args)]
pub struct InitiateArgs {
    /// Employee ID from the HR directory
    #[arg(long)]
    pub employee_id: String,

    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub manager: Option<String>,

    /// Organization numbers from the employee's unit up to the root
    #[arg(long, value_delimiter = ',', required = true)]
    pub path: Vec<i32>,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: String,

    /// End date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    #[arg(long, requires = "mentor_name")]
    pub mentor_id: Option<String>,

    #[arg(long, requires = "mentor_id")]
    pub mentor_name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct EmployeeIdArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args)]
pub struct EmployeeShowArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Apply the sort order of this organization
    #[arg(long, value_name = "NUMBER")]
    pub org: Option<i32>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FulfilArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Task or custom task ID
    #[arg(value_name = "TASK")]
    pub task: String,

    /// TRUE, FALSE or EMPTY
    #[arg(long)]
    pub status: String,

    /// Free-text answer
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Args)]
pub struct FulfilPhaseArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Phase ID
    #[arg(value_name = "PHASE")]
    pub phase: String,

    /// TRUE, FALSE or EMPTY
    #[arg(long)]
    pub status: String,

    /// Free-text answer
    #[arg(long)]
    pub text: Option<String>,
}

#[derive(Subcommand)]
pub enum CustomTaskCommand {
    /// Add a custom task
    Add(CustomTaskArgs),

    /// Replace a custom task
    Update(CustomTaskUpdateArgs),

    /// Delete a custom task
    Delete(CustomTaskDeleteArgs),
}

#[derive(Args)]
pub struct CustomTaskFields {
    /// Phase ID
    #[arg(long)]
    pub phase: String,

    #[arg(long)]
    pub heading: String,

    #[arg(long)]
    pub text: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub sort_order: i32,

    /// NEW_EMPLOYEE, NEW_MANAGER, MANAGER_FOR_NEW_EMPLOYEE or MANAGER_FOR_NEW_MANAGER
    #[arg(long)]
    pub role_type: Option<String>,

    /// YES_OR_NO, YES_OR_NO_WITH_TEXT, COMPLETED_OR_NOT_RELEVANT or
    /// COMPLETED_OR_NOT_RELEVANT_WITH_TEXT
    #[arg(long)]
    pub question_type: Option<String>,
}

#[derive(Args)]
pub struct CustomTaskArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    #[command(flatten)]
    pub fields: CustomTaskFields,
}

#[derive(Args)]
pub struct CustomTaskUpdateArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Custom task ID
    #[arg(value_name = "TASK")]
    pub task: String,

    #[command(flatten)]
    pub fields: CustomTaskFields,
}

#[derive(Args)]
pub struct CustomTaskDeleteArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    /// Custom task ID
    #[arg(value_name = "TASK")]
    pub task: String,
}

#[derive(Args)]
pub struct MentorArgs {
    /// Employee checklist ID
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long, requires = "name", conflicts_with = "clear")]
    pub user_id: Option<String>,

    #[arg(long, requires = "user_id")]
    pub name: Option<String>,

    /// Remove the mentor
    #[arg(long)]
    pub clear: bool,
}

#[derive(Args)]
pub struct LockExpiredArgs {
    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub today: Option<String>,
}

#[derive(Subcommand)]
pub enum SortOrderCommand {
    /// Set an organization's position for a phase or task
    Set(SortOrderSetArgs),

    /// List an organization's positions
    List(SortOrderListArgs),
}

#[derive(Args)]
pub struct SortOrderSetArgs {
    /// Organization number
    #[arg(long, value_name = "NUMBER")]
    pub org: i32,

    /// Phase ID
    #[arg(long, conflicts_with = "task", required_unless_present = "task")]
    pub phase: Option<String>,

    /// Task ID
    #[arg(long)]
    pub task: Option<String>,

    #[arg(long)]
    pub position: i32,
}

#[derive(Args)]
pub struct SortOrderListArgs {
    /// Organization number
    #[arg(long, value_name = "NUMBER")]
    pub org: i32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the config file and create the database
    Init(InitArgs),

    /// Organization units
    #[command(subcommand)]
    Org(OrgCommand),

    /// Phases
    #[command(subcommand)]
    Phase(PhaseCommand),

    /// Checklist versions
    #[command(subcommand)]
    Checklist(ChecklistCommand),

    /// Employee checklists
    #[command(subcommand)]
    Employee(EmployeeCommand),

    /// Organization-specific sort order
    #[command(subcommand)]
    SortOrder(SortOrderCommand),
}
