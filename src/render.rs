//! Plain-text presentation of store output. Consumes query results and
//! mutation outcomes; never reaches back into the engine.

use crate::datetime;
use crate::model::Task;
use crate::store::FieldChange;

const RULE_WIDTH: usize = 80;

/// Render the list query result as a table, mirroring the query's filter and
/// sort parameters in the header.
pub fn task_table(tasks: &[&Task], filters: &[String], sort: &str) {
    if tasks.is_empty() {
        println!("No tasks to show for the current filter.");
        return;
    }

    let filter_label = if filters.is_empty() {
        "all".to_string()
    } else {
        filters.join(", ")
    };

    println!();
    println!("--- Your Tasks ---");
    println!("Filter: {filter_label} | Sort: {sort}");
    println!("{}", "-".repeat(RULE_WIDTH));
    println!(
        "{:<10}{:<10}{:<12}{:<20}Description",
        "ID", "Status", "Priority", "Due Date/Time"
    );
    println!("{}", "-".repeat(RULE_WIDTH));
    for task in tasks {
        let status = if task.completed { "[X]" } else { "[ ]" };
        println!(
            "{:<10}{:<10}{:<12}{:<20}{}",
            task.short_id(),
            status,
            capitalize(task.priority.name()),
            datetime::display(task.due_date.as_deref()),
            task.description
        );
    }
    println!("{}", "-".repeat(RULE_WIDTH));
    println!("Total tasks shown: {}", tasks.len());
}

pub fn added(task: &Task) {
    println!(
        "Task added: '{}' (ID: {}...)",
        task.description,
        task.short_id()
    );
}

pub fn toggled(task: &Task) {
    let status = if task.completed { "completed" } else { "pending" };
    println!("Task '{}' marked as {status}.", task.description);
}

pub fn deleted(task: &Task) {
    println!("Task '{}' deleted.", task.description);
}

pub fn edited(task: &Task, changes: &[FieldChange]) {
    for change in changes {
        match change {
            FieldChange::Description(value) => {
                println!("Description updated to '{value}' for task {}.", task.short_id());
            }
            FieldChange::Priority(priority) => {
                println!("Priority updated to '{priority}' for task {}.", task.short_id());
            }
            FieldChange::DueSet(stored) => {
                println!(
                    "Due date updated to '{}' for task {}.",
                    datetime::display(Some(stored)),
                    task.short_id()
                );
            }
            FieldChange::DueCleared => {
                println!("Due date removed for task {}.", task.short_id());
            }
        }
    }
}

/// Every candidate is listed so the user can refine the identifier.
pub fn ambiguous<'a>(identifier: &str, matches: impl IntoIterator<Item = &'a Task>) {
    println!("Ambiguous identifier '{identifier}'. Multiple tasks match:");
    for task in matches {
        println!("  - {}... ({})", task.short_id(), task.description);
    }
}

pub fn not_found(identifier: &str, known_prefixes: &[String]) {
    println!("Error: task with identifier '{identifier}' not found.");
    if !known_prefixes.is_empty() {
        println!("Known task ids: {}", known_prefixes.join(", "));
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalizes_priority_names() {
        assert_eq!(capitalize("high"), "High");
        assert_eq!(capitalize("none"), "None");
        assert_eq!(capitalize(""), "");
    }
}
