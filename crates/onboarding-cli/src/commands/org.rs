use onboarding_core::storage::{CommunicationChannel, NewOrganization, StorageEngine};

use crate::app::AppContext;
use crate::cli::{ListArgs, OrgAddArgs, OrgCommand};
use crate::helpers::parse_named;
use crate::output::{print_json, print_table};

pub fn handle(ctx: &AppContext, command: &OrgCommand) -> anyhow::Result<()> {
    match command {
        OrgCommand::Add(args) => handle_add(ctx, args),
        OrgCommand::List(args) => handle_list(ctx, args),
    }
}

fn handle_add(ctx: &AppContext, args: &OrgAddArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let mut onboarding = ctx.open()?;

    let mut organization = NewOrganization::new(&municipality, args.number, &args.name);
    if !args.channels.is_empty() {
        let channels = args
            .channels
            .iter()
            .map(|channel| parse_named::<CommunicationChannel>(channel))
            .collect::<anyhow::Result<Vec<_>>>()?;
        organization = organization.with_channels(channels);
    }

    let id = onboarding.storage_mut().create_organization(&organization)?;
    if !ctx.quiet() {
        println!("Added organization {} {} ({})", args.number, args.name, id);
    }
    Ok(())
}

fn handle_list(ctx: &AppContext, args: &ListArgs) -> anyhow::Result<()> {
    let municipality = ctx.municipality()?;
    let onboarding = ctx.open()?;
    let organizations = onboarding.storage().list_organizations(&municipality)?;

    if args.json {
        return print_json(&organizations);
    }
    if organizations.is_empty() {
        if !ctx.quiet() {
            println!("No organizations found.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = organizations
        .iter()
        .map(|organization| {
            vec![
                organization.organization_number.to_string(),
                organization.organization_name.clone(),
                organization
                    .communication_channels
                    .iter()
                    .map(|channel| channel.as_str())
                    .collect::<Vec<_>>()
                    .join(","),
                organization.id.to_string(),
            ]
        })
        .collect();
    print_table(&["Number", "Name", "Channels", "ID"], &rows);
    Ok(())
}
