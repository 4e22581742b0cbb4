use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tasklog_core::Metadata;
use tasklog_sqlite::{MigrationRun, Migrator, StepAction, StepOutcome, StoreError, TodoStore};

mod config;

use config::DbConfig;

#[derive(Debug, Parser)]
#[command(name = "tasklog")]
#[command(about = "SQLite-backed todo list manager")]
struct Cli {
    /// Database file path (overrides the TASKLOG_DB environment variable).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a new todo.
    Add(AddArgs),
    /// List all todos.
    List,
    /// Show one todo in full detail.
    Show(IdArgs),
    /// Mark a todo as complete.
    Complete(IdArgs),
    /// Delete a todo.
    Delete(IdArgs),
    /// Apply or revert schema migrations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Task description.
    task: String,
    /// Comma-separated key:value pairs (e.g. "priority:high,due:tomorrow").
    #[arg(long)]
    metadata: Option<String>,
}

#[derive(Debug, Args)]
struct IdArgs {
    /// Todo id.
    id: i64,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: Option<MigrateOperation>,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Apply every pending migration (the default).
    Latest,
    /// Apply only the next pending migration.
    Up,
    /// Revert the most recently applied migration.
    Down,
    /// Show applied and pending migrations.
    Status,
}

fn main() {
    let cli = Cli::parse();
    let config = DbConfig::resolve(cli.db);

    let result = match cli.command {
        Command::Add(args) => run_add(&config, args),
        Command::List => run_list(&config),
        Command::Show(args) => run_show(&config, args),
        Command::Complete(args) => run_complete(&config, args),
        Command::Delete(args) => run_delete(&config, args),
        Command::Migrate(args) => {
            run_migrate(&config, args.operation.unwrap_or(MigrateOperation::Latest))
        }
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn open_connection(config: &DbConfig) -> Result<rusqlite::Connection, String> {
    rusqlite::Connection::open(&config.path)
        .map_err(|e| format!("failed to open database '{}': {e}", config.path.display()))
}

fn open_store(config: &DbConfig) -> Result<TodoStore, String> {
    Ok(TodoStore::new(open_connection(config)?))
}

fn run_add(config: &DbConfig, args: AddArgs) -> Result<(), String> {
    if args.task.trim().is_empty() {
        return Err("task must not be empty".to_string());
    }
    let metadata = args
        .metadata
        .as_deref()
        .map(Metadata::parse)
        .unwrap_or_default();

    let store = open_store(config)?;
    let todo = store
        .add(&args.task, &metadata)
        .map_err(|e| e.to_string())?;

    println!("Added todo {}: {}", todo.id, todo.task);
    if let Some(metadata) = &todo.metadata {
        println!("with metadata:");
        println!("{}", metadata.format());
    }
    Ok(())
}

fn run_list(config: &DbConfig) -> Result<(), String> {
    let store = open_store(config)?;
    let todos = store.list().map_err(|e| e.to_string())?;

    if todos.is_empty() {
        println!("No todos found.");
        return Ok(());
    }
    for todo in &todos {
        println!("[{}] {}: {}", todo.marker(), todo.id, todo.task);
        if let Some(metadata) = &todo.metadata {
            println!("{}", metadata.format());
        }
    }
    Ok(())
}

fn run_show(config: &DbConfig, args: IdArgs) -> Result<(), String> {
    let store = open_store(config)?;
    let todo = store.get(args.id).map_err(|e| e.to_string())?;

    println!("Todo {}", todo.id);
    println!("  Task: {}", todo.task);
    println!("  Completed: {}", if todo.completed { "yes" } else { "no" });
    println!("  Created: {}", todo.created_at);
    match &todo.metadata {
        Some(metadata) => {
            println!("  Metadata:");
            println!("{}", metadata.format());
        }
        None => println!("  Metadata: (none)"),
    }
    Ok(())
}

fn run_complete(config: &DbConfig, args: IdArgs) -> Result<(), String> {
    let store = open_store(config)?;
    store.complete(args.id).map_err(|e| e.to_string())?;
    println!("Marked todo {} as complete", args.id);
    Ok(())
}

fn run_delete(config: &DbConfig, args: IdArgs) -> Result<(), String> {
    let store = open_store(config)?;
    store.delete(args.id).map_err(|e| e.to_string())?;
    println!("Deleted todo {}", args.id);
    Ok(())
}

fn run_migrate(config: &DbConfig, operation: MigrateOperation) -> Result<(), String> {
    let conn = open_connection(config)?;
    let mut migrator =
        Migrator::new(conn).map_err(|e| format!("failed to initialize migrator: {e}"))?;

    match operation {
        MigrateOperation::Latest => {
            report_run(migrator.latest(), "Nothing pending; schema is up to date.")
        }
        MigrateOperation::Up => {
            report_run(migrator.up(), "Nothing pending; schema is up to date.")
        }
        MigrateOperation::Down => {
            report_run(migrator.down(), "No applied migrations; nothing to revert.")
        }
        MigrateOperation::Status => run_migrate_status(&migrator),
    }
}

/// Prints one line per executed step; on failure, prints the steps that
/// completed before the halt and returns the failure.
fn report_run(
    result: tasklog_sqlite::Result<MigrationRun>,
    noop_message: &str,
) -> Result<(), String> {
    match result {
        Ok(run) => {
            if run.is_noop() {
                println!("{noop_message}");
            }
            for step in &run.steps {
                println!("{}", step_line(step));
            }
            Ok(())
        }
        Err(err) => {
            if let StoreError::Migration { completed, .. } = &err {
                for step in completed {
                    println!("{}", step_line(step));
                }
            }
            Err(err.to_string())
        }
    }
}

fn step_line(step: &StepOutcome) -> String {
    match step.action {
        StepAction::Applied => format!("migration '{}' applied", step.name),
        StepAction::Reverted => format!("migration '{}' reverted", step.name),
    }
}

fn run_migrate_status(migrator: &Migrator) -> Result<(), String> {
    let status = migrator.status().map_err(|e| e.to_string())?;

    println!("Applied migrations: {}", status.applied.len());
    for record in &status.applied {
        println!(
            "  {} {} (applied {})",
            record.sequence, record.name, record.applied_at
        );
    }
    println!("Pending migrations: {}", status.pending.len());
    for name in &status.pending {
        println!("  {name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_migrate_default_operation() {
        let cli = Cli::try_parse_from(["tasklog", "migrate"]).unwrap();
        match cli.command {
            Command::Migrate(args) => assert!(args.operation.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_add_with_metadata() {
        let cli =
            Cli::try_parse_from(["tasklog", "add", "buy milk", "--metadata", "store:corner"])
                .unwrap();
        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.task, "buy milk");
                assert_eq!(args.metadata.as_deref(), Some("store:corner"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_global_db_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["tasklog", "list", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_step_line_wording() {
        let applied = StepOutcome {
            sequence: 1,
            name: "create_todos_table",
            action: StepAction::Applied,
        };
        assert_eq!(step_line(&applied), "migration 'create_todos_table' applied");
    }
}
