use clap::{Parser, Subcommand};

/// Grammar for one line of shell input. `multicall` because the tokens come
/// from the prompt, with the command name first and no binary name in front.
#[derive(Parser, Debug)]
#[command(name = "todo", multicall = true)]
pub struct ShellInput {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Subcommand, Debug)]
pub enum ShellCommand {
    /// Add a new task
    Add {
        /// Task description
        description: String,

        /// Task priority (none, low, medium, high)
        #[arg(long)]
        priority: Option<String>,

        /// Due date: YYYY-MM-DD or "YYYY-MM-DD hh:mmAM/PM"
        #[arg(long)]
        due: Option<String>,
    },

    /// List tasks
    List {
        /// Filters: all, pending, completed, priority:<level>, due_today, overdue
        filters: Vec<String>,

        /// Sort key: priority, due_date or description
        #[arg(long, default_value = "priority")]
        sort: String,

        /// Reverse the listing order
        #[arg(short, long)]
        reverse: bool,
    },

    /// Toggle a task between pending and completed
    Toggle {
        /// Task id or unique id prefix
        id: String,
    },

    /// Delete a task (asks for confirmation)
    #[command(alias = "delete")]
    Del {
        /// Task id or unique id prefix
        id: String,
    },

    /// Edit a task
    Edit {
        /// Task id or unique id prefix
        id: String,

        /// New description
        #[arg(long)]
        desc: Option<String>,

        /// New priority (none, low, medium, high)
        #[arg(long)]
        priority: Option<String>,

        /// New due date, or "none" to clear it
        #[arg(long)]
        due: Option<String>,
    },

    /// Clear the screen
    Clear,

    /// Exit the application
    #[command(alias = "quit")]
    Exit,
}
