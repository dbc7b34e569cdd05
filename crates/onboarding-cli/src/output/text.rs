//! Text and table output formatting.

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, ContentArrangement, Table};

use onboarding_core::view::{ChecklistView, EmployeeChecklistView, PhaseView};

/// Print rows under a borderless header.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|header| Cell::new(*header)).collect::<Vec<_>>());

    for i in 0..headers.len() {
        if let Some(column) = table.column_mut(i) {
            column.set_padding((0, 2));
        }
    }

    for row in rows {
        table.add_row(row);
    }
    println!("{}", table);
}

fn print_phases(phases: &[PhaseView], with_status: bool) {
    for phase in phases {
        println!();
        match &phase.time_to_complete {
            Some(duration) => println!("{} ({})  [{}]", phase.name, duration, phase.id),
            None => println!("{}  [{}]", phase.name, phase.id),
        }
        for task in &phase.tasks {
            let marker = if task.custom { "*" } else { " " };
            if with_status {
                println!(
                    "  {}{:<6} {}  [{}]",
                    marker,
                    task.fulfilment_status.as_str(),
                    task.heading,
                    task.id
                );
                if let Some(text) = &task.response_text {
                    println!("          {}", text);
                }
            } else {
                println!("  {} {}  ({})  [{}]", marker, task.heading, task.role_type, task.id);
            }
        }
    }
}

pub fn print_checklist_view(view: &ChecklistView) {
    println!("{} v{} ({})", view.display_name, view.version, view.life_cycle);
    println!("Name: {}", view.name);
    println!("ID: {}", view.id);
    print_phases(&view.phases, false);
}

pub fn print_employee_checklist_view(view: &EmployeeChecklistView) {
    println!(
        "{} {} ({})",
        view.employee.first_name, view.employee.last_name, view.employee.username
    );
    println!("ID: {}", view.id);
    println!(
        "Period: {} to {} (expires {})",
        view.start_date, view.end_date, view.expiration_date
    );
    if let Some(mentor) = &view.mentor {
        println!("Mentor: {} ({})", mentor.name, mentor.user_id);
    }
    if view.locked {
        println!("Locked: yes");
    }
    println!("Completed: {}", if view.completed { "yes" } else { "no" });
    print_phases(&view.phases, true);
}
