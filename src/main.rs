use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueHint};
use tracing_subscriber::EnvFilter;

use todo_shell::cli::{ShellCommand, ShellInput};
use todo_shell::completion::CompletionCache;
use todo_shell::datetime;
use todo_shell::render;
use todo_shell::store::{
    EditOutcome, EditRequest, Resolution, TaskStore, ToggleOutcome,
};

/// Interactive personal task tracker.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Backing file for the task list.
    #[arg(long, value_hint = ValueHint::FilePath)]
    file: Option<PathBuf>,
}

enum Flow {
    Continue,
    Exit,
}

fn main() -> Result<()> {
    install_tracing();

    let cli = Cli::parse();
    let path = cli.file.unwrap_or_else(default_data_file);
    let mut store = TaskStore::open(path);
    let mut completion = CompletionCache::new(&store);

    println!("Welcome to the to-do shell. Type 'help' for commands.\n");

    let stdin = io::stdin();
    loop {
        print!("todo> ");
        io::stdout().flush().context("flushing prompt")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("reading input")? == 0 {
            println!("\nExiting.");
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(tokens) = shlex::split(line) else {
            eprintln!("Error: unbalanced quoting in input.");
            continue;
        };
        if tokens.is_empty() {
            continue;
        }

        let input = match ShellInput::try_parse_from(&tokens) {
            Ok(input) => input,
            Err(err) => {
                // Covers unknown commands, bad flags, and the built-in
                // `help` subcommand rendering.
                let _ = err.print();
                continue;
            }
        };

        // One bad command never ends the session.
        match dispatch(input.command, &mut store, &mut completion) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => eprintln!("Error: {err:#}"),
        }
    }

    Ok(())
}

fn dispatch(
    command: ShellCommand,
    store: &mut TaskStore,
    completion: &mut CompletionCache,
) -> Result<Flow> {
    match command {
        ShellCommand::Add { description, priority, due } => {
            let task = store.add(&description, priority.as_deref(), due.as_deref())?;
            render::added(&task);
            completion.refresh(store);
        }

        ShellCommand::List { filters, sort, reverse } => {
            let tasks = store.query(&filters, &sort, reverse, datetime::local_now());
            render::task_table(&tasks, &filters, &sort);
        }

        ShellCommand::Toggle { id } => match store.toggle(&id) {
            ToggleOutcome::Toggled(task) => {
                render::toggled(&task);
                completion.refresh(store);
            }
            ToggleOutcome::Ambiguous(matches) => render::ambiguous(&id, &matches),
            ToggleOutcome::NotFound => render::not_found(&id, &completion.suggestions(&id)),
        },

        ShellCommand::Del { id } => delete_with_confirmation(&id, store, completion)?,

        ShellCommand::Edit { id, desc, priority, due } => {
            if desc.is_none() && priority.is_none() && due.is_none() {
                eprintln!("Error: edit requires --desc, --priority or --due.");
                let _ = ShellInput::command().print_help();
                return Ok(Flow::Continue);
            }
            let request = EditRequest { description: desc, priority, due };
            match store.edit(&id, &request) {
                EditOutcome::Edited { task, changes } => {
                    render::edited(&task, &changes);
                    completion.refresh(store);
                }
                EditOutcome::NoChanges => println!("No valid changes specified for the task."),
                EditOutcome::Ambiguous(matches) => render::ambiguous(&id, &matches),
                EditOutcome::NotFound => render::not_found(&id, &completion.suggestions(&id)),
            }
        }

        ShellCommand::Clear => {
            // ANSI clear-screen plus cursor home.
            print!("\x1B[2J\x1B[H");
            io::stdout().flush().context("flushing clear sequence")?;
        }

        ShellCommand::Exit => {
            println!("Exiting. Goodbye!");
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

/// Resolve, confirm on the prompt, and only then remove. The store persists
/// nothing unless the removal is confirmed.
fn delete_with_confirmation(
    identifier: &str,
    store: &mut TaskStore,
    completion: &mut CompletionCache,
) -> Result<()> {
    let target = match store.resolve(identifier) {
        Resolution::Found(task) => (task.id.clone(), task.short_id().to_string(), task.description.clone()),
        Resolution::Ambiguous(matches) => {
            render::ambiguous(identifier, matches);
            return Ok(());
        }
        Resolution::NotFound => {
            render::not_found(identifier, &completion.suggestions(identifier));
            return Ok(());
        }
    };

    let (full_id, short_id, description) = target;
    print!("Are you sure you want to delete task '{description}' (ID: {short_id})? (y/N): ");
    io::stdout().flush().context("flushing confirmation prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("reading confirmation")?;
    if answer.trim().eq_ignore_ascii_case("y") {
        if let Some(removed) = store.remove(&full_id) {
            render::deleted(&removed);
            completion.refresh(store);
        }
    } else {
        println!("Deletion cancelled.");
    }
    Ok(())
}

fn default_data_file() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("todo_tasks.json"))
        .unwrap_or_else(|| PathBuf::from("todo_tasks.json"))
}

fn install_tracing() {
    // RUST_LOG overrides; default is INFO so engine warnings reach the user.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}
