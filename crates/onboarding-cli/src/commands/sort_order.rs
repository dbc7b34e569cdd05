use onboarding_core::storage::{ComponentType, SortOrder, StorageEngine};

use crate::app::AppContext;
use crate::cli::{SortOrderCommand, SortOrderListArgs, SortOrderSetArgs};
use crate::errors::CliError;
use crate::helpers::parse_id;
use crate::output::{print_json, print_table};

pub fn handle(ctx: &AppContext, command: &SortOrderCommand) -> anyhow::Result<()> {
    match command {
        SortOrderCommand::Set(args) => handle_set(ctx, args),
        SortOrderCommand::List(args) => handle_list(ctx, args),
    }
}

fn handle_set(ctx: &AppContext, args: &SortOrderSetArgs) -> anyhow::Result<()> {
    let (component_type, component_id) = match (&args.phase, &args.task) {
        (Some(phase), None) => (ComponentType::Phase, parse_id(phase, "phase")?),
        (None, Some(task)) => (ComponentType::Task, parse_id(task, "task")?),
        _ => return Err(CliError::invalid_input("Pass exactly one of --phase or --task").into()),
    };

    let sort_order = SortOrder {
        municipality_id: ctx.municipality()?,
        organization_number: args.org,
        component_id,
        component_type,
        position: args.position,
    };
    let mut onboarding = ctx.open()?;
    onboarding.set_sort_order(&sort_order)?;

    if !ctx.quiet() {
        println!(
            "Organization {} places {} {} at {}",
            args.org, component_type, component_id, args.position
        );
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &SortOrderListArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let onboarding = ctx.open()?;
    let overrides = onboarding.storage().list_sort_orders(&municipality, args.org)?;

    if args.json {
        return print_json(&overrides);
    }
    if overrides.is_empty() {
        if !ctx.quiet() {
            println!("No sort order overrides for organization {}.", args.org);
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = overrides
        .iter()
        .map(|sort_order| {
            vec![
                sort_order.component_type.to_string(),
                sort_order.position.to_string(),
                sort_order.component_id.to_string(),
            ]
        })
        .collect();
    print_table(&["Type", "Position", "Component"], &rows);
    Ok(())
}
