use chrono::Utc;

use onboarding_core::storage::{
    Employee, FulfilmentStatus, Mentor, NewCustomTask, QuestionType, RoleType, StorageEngine,
};
use onboarding_core::{FulfilmentUpdate, Initiation, OrganizationPath};

use crate::app::AppContext;
use crate::cli::{
    CustomTaskArgs, CustomTaskCommand, CustomTaskDeleteArgs, CustomTaskFields, CustomTaskUpdateArgs,
    EmployeeCommand, EmployeeIdArgs, EmployeeShowArgs, FulfilArgs, FulfilPhaseArgs, InitiateArgs,
    ListArgs, LockExpiredArgs, MentorArgs,
};
use crate::errors::CliError;
use crate::helpers::{parse_date, parse_id, parse_named, parse_named_or, short_id};
use crate::output::{print_employee_checklist_view, print_json, print_table};

pub fn handle(ctx: &AppContext, command: &EmployeeCommand) -> anyhow::Result<()> {
    match command {
        EmployeeCommand::Initiate(args) => handle_initiate(ctx, args),
        EmployeeCommand::List(args) => handle_list(ctx, args),
        EmployeeCommand::Show(args) => handle_show(ctx, args),
        EmployeeCommand::Fulfil(args) => handle_fulfil(ctx, args),
        EmployeeCommand::FulfilPhase(args) => handle_fulfil_phase(ctx, args),
        EmployeeCommand::CustomTask(command) => handle_custom_task(ctx, command),
        EmployeeCommand::Mentor(args) => handle_mentor(ctx, args),
        EmployeeCommand::LockExpired(args) => handle_lock_expired(ctx, args),
        EmployeeCommand::Delete(args) => handle_delete(ctx, args),
    }
}

fn handle_initiate(ctx: &AppContext, args: &InitiateArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let mentor = match (&args.mentor_id, &args.mentor_name) {
        (Some(user_id), Some(name)) => Some(Mentor {
            user_id: user_id.clone(),
            name: name.clone(),
        }),
        _ => None,
    };
    let initiation = Initiation {
        municipality_id: municipality,
        employee: Employee {
            id: args.employee_id.clone(),
            username: args.username.clone(),
            first_name: args.first_name.clone(),
            last_name: args.last_name.clone(),
            email: args.email.clone(),
            manager_username: args.manager.clone(),
        },
        path: OrganizationPath::new(args.path.iter().copied()),
        start_date: parse_date(&args.start)?,
        end_date: args.end.as_deref().map(parse_date).transpose()?,
        mentor,
    };

    let mut onboarding = ctx.open()?;
    let employee_checklist = onboarding.initiate_employee_checklist(&initiation)?;

    if args.json {
        return print_json(&employee_checklist);
    }
    if !ctx.quiet() {
        println!(
            "Initiated onboarding for {} with {} checklists ({})",
            employee_checklist.employee.username,
            employee_checklist.checklist_ids.len(),
            employee_checklist.id
        );
        println!(
            "Period: {} to {} (expires {})",
            employee_checklist.start_date,
            employee_checklist.end_date,
            employee_checklist.expiration_date
        );
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let onboarding = ctx.open()?;
    let employee_checklists = onboarding.storage().list_employee_checklists(&municipality)?;

    if args.json {
        return print_json(&employee_checklists);
    }
    if employee_checklists.is_empty() {
        if !ctx.quiet() {
            println!("No employee checklists found.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = employee_checklists
        .iter()
        .map(|employee_checklist| {
            vec![
                employee_checklist.employee.username.clone(),
                format!(
                    "{} {}",
                    employee_checklist.employee.first_name, employee_checklist.employee.last_name
                ),
                employee_checklist.start_date.to_string(),
                employee_checklist.expiration_date.to_string(),
                if employee_checklist.locked { "yes" } else { "no" }.to_string(),
                employee_checklist.id.to_string(),
            ]
        })
        .collect();
    print_table(&["Username", "Name", "Start", "Expires", "Locked", "ID"], &rows);
    Ok(())
}

fn handle_show(ctx: &AppContext, args: &EmployeeShowArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let onboarding = ctx.open()?;
    let view = onboarding.employee_checklist_view(&id, args.org)?;

    if args.json {
        return print_json(&view);
    }
    print_employee_checklist_view(&view);
    Ok(())
}

fn fulfilment_update(
    ctx: &AppContext,
    status: &str,
    text: Option<&String>,
) -> anyhow::Result<FulfilmentUpdate> {
    let mut update = FulfilmentUpdate::new(parse_named::<FulfilmentStatus>(status)?, ctx.user());
    if let Some(text) = text {
        update = update.with_response_text(text);
    }
    Ok(update)
}

fn handle_fulfil(ctx: &AppContext, args: &FulfilArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let task = parse_id(&args.task, "task")?;
    let update = fulfilment_update(ctx, &args.status, args.text.as_ref())?;

    let mut onboarding = ctx.open()?;
    let status = onboarding.update_task_fulfilment(&id, &task, &update)?;
    if !ctx.quiet() {
        println!("Task {} is now {}", short_id(&task), status);
    }
    Ok(())
}

fn handle_fulfil_phase(ctx: &AppContext, args: &FulfilPhaseArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let phase = parse_id(&args.phase, "phase")?;
    let update = fulfilment_update(ctx, &args.status, args.text.as_ref())?;

    let mut onboarding = ctx.open()?;
    let updated = onboarding.update_phase_fulfilment(&id, &phase, &update)?;
    if !ctx.quiet() {
        println!("Set {} tasks to {}", updated, update.status);
    }
    Ok(())
}

fn custom_task(fields: &CustomTaskFields) -> anyhow::Result<NewCustomTask> {
    let phase = parse_id(&fields.phase, "phase")?;
    let role_type = parse_named_or(fields.role_type.as_deref(), RoleType::NewEmployee)?;
    let question_type = parse_named_or(fields.question_type.as_deref(), QuestionType::YesOrNo)?;
    let mut task = NewCustomTask::new(phase, &fields.heading, fields.sort_order)
        .with_role_type(role_type)
        .with_question_type(question_type);
    if let Some(text) = &fields.text {
        task = task.with_text(text);
    }
    Ok(task)
}

fn handle_custom_task(ctx: &AppContext, command: &CustomTaskCommand) -> anyhow::Result<()> {
    match command {
        CustomTaskCommand::Add(args) => handle_custom_task_add(ctx, args),
        CustomTaskCommand::Update(args) => handle_custom_task_update(ctx, args),
        CustomTaskCommand::Delete(args) => handle_custom_task_delete(ctx, args),
    }
}

fn handle_custom_task_add(ctx: &AppContext, args: &CustomTaskArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let task = custom_task(&args.fields)?;

    let mut onboarding = ctx.open()?;
    let created = onboarding.add_custom_task(&id, &task, ctx.user())?;
    if !ctx.quiet() {
        println!("Added custom task {} ({})", created.heading, created.id);
    }
    Ok(())
}

fn handle_custom_task_update(ctx: &AppContext, args: &CustomTaskUpdateArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let task_id = parse_id(&args.task, "custom task")?;
    let task = custom_task(&args.fields)?;

    let mut onboarding = ctx.open()?;
    let updated = onboarding.update_custom_task(&id, &task_id, &task, ctx.user())?;
    if !ctx.quiet() {
        println!("Updated custom task {} ({})", updated.heading, updated.id);
    }
    Ok(())
}

fn handle_custom_task_delete(ctx: &AppContext, args: &CustomTaskDeleteArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let task_id = parse_id(&args.task, "custom task")?;

    let mut onboarding = ctx.open()?;
    onboarding.delete_custom_task(&id, &task_id)?;
    if !ctx.quiet() {
        println!("Deleted custom task {}", short_id(&task_id));
    }
    Ok(())
}

fn handle_mentor(ctx: &AppContext, args: &MentorArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let mentor = match (&args.user_id, &args.name, args.clear) {
        (_, _, true) => None,
        (Some(user_id), Some(name), false) => Some(Mentor {
            user_id: user_id.clone(),
            name: name.clone(),
        }),
        _ => {
            return Err(CliError::invalid_input("Pass --user-id and --name, or --clear").into());
        }
    };

    let mut onboarding = ctx.open()?;
    onboarding.set_mentor(&id, mentor.clone())?;
    if !ctx.quiet() {
        match mentor {
            Some(mentor) => println!("Mentor set to {}", mentor.name),
            None => println!("Mentor cleared"),
        }
    }
    Ok(())
}

fn handle_lock_expired(ctx: &AppContext, args: &LockExpiredArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let today = match &args.today {
        Some(value) => parse_date(value)?,
        None => Utc::now().date_naive(),
    };

    let mut onboarding = ctx.open()?;
    let locked = onboarding.lock_expired(&municipality, today)?;
    if !ctx.quiet() {
        println!("Locked {} employee checklists", locked);
    }
    Ok(())
}

fn handle_delete(ctx: &AppContext, args: &EmployeeIdArgs) -> anyhow::Result<()> {
    let id = parse_id(&args.id, "employee checklist")?;
    let mut onboarding = ctx.open()?;
    onboarding.delete_employee_checklist(&id)?;
    if !ctx.quiet() {
        println!("Deleted employee checklist {}", short_id(&id));
    }
    Ok(())
}
