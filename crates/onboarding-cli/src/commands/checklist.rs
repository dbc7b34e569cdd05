use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use onboarding_core::storage::{
    Checklist, NewChecklist, NewTask, Permission, QuestionType, RoleType, StorageEngine,
};
use onboarding_core::Activation;

use crate::app::AppContext;
use crate::cli::{
    ChecklistCommand, ChecklistIdArgs, ChecklistImportArgs, ChecklistShowArgs, ChecklistUpdateArgs,
    ListArgs,
};
use crate::errors::CliError;
use crate::helpers::{parse_id, short_id};
use crate::output::{print_checklist_view, print_json, print_table};

/// Checklist definition file. Tasks name their phase instead of using its ID.
#[derive(Debug, Deserialize)]
struct ChecklistFile {
    organization_number: i32,
    name: String,
    display_name: String,
    #[serde(default)]
    tasks: Vec<TaskFile>,
}

#[derive(Debug, Deserialize)]
struct TaskFile {
    phase: String,
    heading: String,
    #[serde(default)]
    heading_reference: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    sort_order: i32,
    #[serde(default = "default_role_type")]
    role_type: RoleType,
    #[serde(default = "default_question_type")]
    question_type: QuestionType,
    #[serde(default = "default_permission")]
    permission: Permission,
}

fn default_role_type() -> RoleType {
    RoleType::NewEmployee
}

fn default_question_type() -> QuestionType {
    QuestionType::YesOrNo
}

fn default_permission() -> Permission {
    Permission::Admin
}

pub fn handle(ctx: &AppContext, command: &ChecklistCommand) -> anyhow::Result<()> {
    match command {
        ChecklistCommand::Import(args) => handle_import(ctx, args),
        ChecklistCommand::List(args) => handle_list(ctx, args),
        ChecklistCommand::Show(args) => handle_show(ctx, args),
        ChecklistCommand::NewVersion(args) => handle_new_version(ctx, args),
        ChecklistCommand::Update(args) => handle_update(ctx, args),
        ChecklistCommand::Activate(args) => handle_activate(ctx, args),
        ChecklistCommand::Delete(args) => handle_delete(ctx, args),
    }
}

fn read_definition(path: &Path) -> anyhow::Result<ChecklistFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        CliError::not_found(
            format!("Cannot read {}: {}", path.display(), e),
            "Pass the path of a checklist definition file.",
        )
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        CliError::invalid_input(format!("Invalid checklist definition {}: {}", path.display(), e))
            .into()
    })
}

fn handle_import(ctx: &AppContext, args: &ChecklistImportArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let definition = read_definition(Path::new(&args.file))?;
    let mut onboarding = ctx.open()?;

    let phase_ids: HashMap<String, uuid::Uuid> = onboarding
        .storage()
        .list_phases(&municipality)?
        .into_iter()
        .map(|phase| (phase.name, phase.id))
        .collect();

    let mut new_checklist = NewChecklist::new(
        &municipality,
        definition.organization_number,
        &definition.name,
        &definition.display_name,
    )
    .with_last_saved_by(ctx.user());
    for task in definition.tasks {
        let phase_id = *phase_ids.get(&task.phase).ok_or_else(|| {
            CliError::not_found(
                format!("Phase '{}' not found", task.phase),
                "Run:\n  onboarding phase list",
            )
        })?;
        let mut new_task = NewTask::new(phase_id, task.heading, task.sort_order)
            .with_role_type(task.role_type)
            .with_question_type(task.question_type);
        new_task.heading_reference = task.heading_reference;
        new_task.text = task.text;
        new_task.permission = task.permission;
        new_checklist = new_checklist.with_task(new_task);
    }

    let mut checklist = onboarding.import_checklist(&new_checklist)?;
    if args.activate {
        if let Some(id) = checklist.id {
            checklist = onboarding.activate_checklist(&id)?.checklist;
        }
    }

    if args.json {
        return print_json(&checklist);
    }
    if !ctx.quiet() {
        println!(
            "Imported {} v{} with {} tasks ({})",
            checklist.name,
            checklist.version,
            checklist.tasks.len(),
            display_id(&checklist)
        );
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let onboarding = ctx.open()?;
    let mut checklists = onboarding.storage().list_checklists(&municipality)?;
    checklists.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.version.cmp(&b.version)));

    if args.json {
        return print_json(&checklists);
    }
    if checklists.is_empty() {
        if !ctx.quiet() {
            println!("No checklists found.");
        }
        return Ok(());
    }

    let organization_numbers: HashMap<_, _> = onboarding
        .storage()
        .list_organizations(&municipality)?
        .into_iter()
        .map(|organization| (organization.id, organization.organization_number))
        .collect();

    let rows: Vec<Vec<String>> = checklists
        .iter()
        .map(|checklist| {
            let organization = checklist
                .organization_id
                .and_then(|id| organization_numbers.get(&id))
                .map(|number| number.to_string())
                .unwrap_or_default();
            vec![
                checklist.name.clone(),
                checklist.version.to_string(),
                checklist.life_cycle.to_string(),
                organization,
                checklist.tasks.len().to_string(),
                display_id(checklist),
            ]
        })
        .collect();
    print_table(&["Name", "Version", "Life cycle", "Org", "Tasks", "ID"], &rows);
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &ChecklistShowArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "checklist")?;
    let onboarding = ctx.open()?;
    let view = onboarding.checklist_view(&id, args.org)?;

    if args.json {
        return print_json(&view);
    }
    print_checklist_view(&view);
    Ok(())
}

fn handle_new_version(ctx: &AppContext, args: &ChecklistIdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "checklist")?;
    let mut onboarding = ctx.open()?;
    let draft = onboarding.create_new_version(&id, ctx.user())?;

    if args.json {
        return print_json(&draft);
    }
    if !ctx.quiet() {
        println!(
            "Created draft {} v{} ({})",
            draft.name,
            draft.version,
            display_id(&draft)
        );
    }
    Ok(())
}

fn handle_update(ctx: &AppContext, args: &ChecklistUpdateArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "checklist")?;
    let remove = args
        .remove_tasks
        .iter()
        .map(|task| parse_id(task, "task"))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut onboarding = ctx.open()?;
    let mut checklist = onboarding.require_checklist(&id)?;
    if let Some(display_name) = &args.display_name {
        checklist.display_name = display_name.clone();
    }
    for task_id in &remove {
        if checklist.find_task(task_id).is_none() {
            return Err(CliError::not_found(
                format!("Task {} is not in this checklist", short_id(task_id)),
                format!("Run:\n  onboarding checklist show {}", id),
            )
            .into());
        }
    }
    checklist.tasks.retain(|task| !task.id.is_some_and(|task_id| remove.contains(&task_id)));
    checklist.last_saved_by = Some(ctx.user().to_string());

    let updated = onboarding.update_draft(&checklist)?;
    if args.json {
        return print_json(&updated);
    }
    if !ctx.quiet() {
        println!(
            "Updated {} v{} with {} tasks ({})",
            updated.name,
            updated.version,
            updated.tasks.len(),
            display_id(&updated)
        );
    }
    Ok(())
}

fn handle_activate(ctx: &AppContext, args: &ChecklistIdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "checklist")?;
    let mut onboarding = ctx.open()?;
    let activation = onboarding.activate_checklist(&id)?;

    if args.json {
        return print_json(&activation_json(&activation));
    }
    if !ctx.quiet() {
        println!(
            "Activated {} v{}",
            activation.checklist.name, activation.checklist.version
        );
        if let Some(deprecated) = &activation.deprecated {
            println!("Deprecated v{}", deprecated.version);
            println!(
                "Moved {} employee checklists ({} fulfilments re-pointed)",
                activation.migrated_employee_checklists, activation.repointed_fulfilments
            );
        }
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, args: &ChecklistIdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "checklist")?;
    let mut onboarding = ctx.open()?;
    onboarding.delete_checklist(&id)?;

    if args.json {
        return print_json(&serde_json::json!({ "deleted": id }));
    }
    if !ctx.quiet() {
        println!("Deleted checklist {}", short_id(&id));
    }
    Ok(())
}

fn activation_json(activation: &Activation) -> serde_json::Value {
    serde_json::json!({
        "checklist": activation.checklist,
        "deprecated": activation.deprecated,
        "migrated_employee_checklists": activation.migrated_employee_checklists,
        "repointed_fulfilments": activation.repointed_fulfilments,
    })
}

fn display_id(checklist: &Checklist) -> String {
    checklist
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unsaved".to_string())
}
