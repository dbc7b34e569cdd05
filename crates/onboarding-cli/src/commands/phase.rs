use onboarding_core::storage::{NewPhase, Permission, StorageEngine};

use crate::app::AppContext;
use crate::cli::{ListArgs, PhaseAddArgs, PhaseCommand};
use crate::helpers::parse_named_or;
use crate::output::{print_json, print_table};

pub fn handle(ctx: &AppContext, command: &PhaseCommand) -> anyhow::Result<()> {
    match command {
        PhaseCommand::Add(args) => handle_add(ctx, args),
        PhaseCommand::List(args) => handle_list(ctx, args),
    }
}

fn handle_add(ctx: &AppContext, args: &PhaseAddArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let mut onboarding = ctx.open()?;

    let mut phase = NewPhase::new(&municipality, &args.name, args.sort_order)
        .with_permission(parse_named_or(args.permission.as_deref(), Permission::Admin)?);
    if let Some(body_text) = &args.body_text {
        phase = phase.with_body_text(body_text);
    }
    if let Some(duration) = &args.time_to_complete {
        phase = phase.with_time_to_complete(duration);
    }
    phase.last_saved_by = Some(ctx.user().to_string());

    let id = onboarding.storage_mut().create_phase(&phase)?;
    if !ctx.quiet() {
        println!("Added phase {} ({})", args.name, id);
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let onboarding = ctx.open()?;
    let mut phases = onboarding.storage().list_phases(&municipality)?;
    phases.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));

    if args.json {
        return print_json(&phases);
    }
    if phases.is_empty() {
        if !ctx.quiet() {
            println!("No phases found.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = phases
        .iter()
        .map(|phase| {
            vec![
                phase.sort_order.to_string(),
                phase.name.clone(),
                phase.time_to_complete.clone().unwrap_or_default(),
                phase.permission.to_string(),
                phase.id.to_string(),
            ]
        })
        .collect();
    print_table(&["Order", "Name", "Duration", "Permission", "ID"], &rows);
    Ok(())
}
