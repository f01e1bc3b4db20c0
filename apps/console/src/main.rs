use std::time::Duration;

use anyhow::{anyhow, bail, ensure, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use client_core::{
    config::parse_api_base_url,
    load_settings, DirectorySnapshot, EmployeeDirectory, SubmitOutcome, SubmitRejected,
};
use shared::domain::{Employee, EmployeeId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "employees", about = "Manage employee records over the employees API")]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Overrides the configured request timeout, in milliseconds.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,
    /// Search term applied to the list printed after the command.
    #[arg(long, short, global = true, default_value = "")]
    search: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print employees, optionally filtered with --search.
    List,
    /// Register a new employee.
    Create(CreateArgs),
    /// Edit an existing employee; omitted fields keep their current value.
    Update(UpdateArgs),
}

#[derive(ClapArgs, Debug)]
struct CreateArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    document: String,
    #[arg(long)]
    email: String,
    /// Defaults to today.
    #[arg(long)]
    hire_date: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    document: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    hire_date: Option<String>,
    #[arg(long)]
    active: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(raw) = &args.api_url {
        settings.api_base_url = parse_api_base_url(raw)?;
    }
    if let Some(ms) = args.timeout_ms {
        settings.request_timeout = Duration::from_millis(ms);
    }
    tracing::debug!(
        api = %settings.api_base_url,
        timeout = ?settings.request_timeout,
        "settings resolved"
    );

    let directory = EmployeeDirectory::from_settings(&settings)?;
    if let Err(err) = directory.load().await {
        let snapshot = directory.snapshot().await;
        bail!(
            "{}: {err}",
            snapshot.load_error.as_deref().unwrap_or("load failed")
        );
    }

    match args.command {
        Command::List => {}
        Command::Create(create) => run_create(&directory, create).await?,
        Command::Update(update) => run_update(&directory, update).await?,
    }

    directory.set_search_term(&args.search).await;
    print_table(&directory.snapshot().await);
    Ok(())
}

async fn run_create(directory: &EmployeeDirectory, args: CreateArgs) -> Result<()> {
    directory.open_create().await;
    let mut input = directory.snapshot().await.create.input;
    input.full_name = args.full_name;
    input.document = args.document;
    input.email = args.email;
    input.hire_date = args
        .hire_date
        .unwrap_or_else(|| chrono::Local::now().date_naive().format("%Y-%m-%d").to_string());
    ensure!(
        directory.set_create_input(input).await,
        "create form did not accept the input"
    );

    let outcome = directory.submit_create().await.map_err(describe_rejection)?;
    // One record per invocation, so never continue.
    directory.close_create().await;
    match outcome {
        SubmitOutcome::Created { employee, .. } => {
            println!("Registered {} ({})", employee.full_name, employee.id);
            Ok(())
        }
        SubmitOutcome::Failed { message } => Err(anyhow!(message)),
        SubmitOutcome::Updated { .. } => Err(anyhow!("unexpected update outcome for create")),
    }
}

async fn run_update(directory: &EmployeeDirectory, args: UpdateArgs) -> Result<()> {
    let id = EmployeeId::new(args.id);
    directory
        .open_edit(&id)
        .await
        .with_context(|| format!("cannot edit employee {id}"))?;

    let mut input = directory.snapshot().await.edit.input;
    if let Some(v) = args.full_name {
        input.full_name = v;
    }
    if let Some(v) = args.document {
        input.document = v;
    }
    if let Some(v) = args.email {
        input.email = v;
    }
    if let Some(v) = args.hire_date {
        input.hire_date = v;
    }
    if let Some(v) = args.active {
        input.is_active = v;
    }
    ensure!(
        directory.set_edit_input(input).await,
        "edit form did not accept the input"
    );

    let outcome = directory.submit_edit().await.map_err(describe_rejection)?;
    match outcome {
        SubmitOutcome::Updated { id, .. } => {
            println!("Updated employee {id}");
            Ok(())
        }
        SubmitOutcome::Failed { message } => {
            directory.close_edit().await;
            Err(anyhow!(message))
        }
        SubmitOutcome::Created { .. } => Err(anyhow!("unexpected create outcome for update")),
    }
}

fn describe_rejection(err: SubmitRejected) -> anyhow::Error {
    match err {
        SubmitRejected::Invalid(errors) => anyhow!("invalid input: {errors}"),
        other => anyhow!(other),
    }
}

fn print_table(snapshot: &DirectorySnapshot) {
    if snapshot.search_term.trim().is_empty() {
        println!("{} employee(s)", snapshot.total);
    } else {
        println!(
            "{} of {} employee(s) match '{}'",
            snapshot.displayed.len(),
            snapshot.total,
            snapshot.search_term.trim()
        );
    }
    for employee in &snapshot.displayed {
        println!("{}", format_row(employee));
    }
}

fn format_row(employee: &Employee) -> String {
    format!(
        "{:<38} {:<30} {:<20} {:<32} {:<10} {}",
        employee.id,
        employee.full_name,
        employee.document,
        employee.email,
        shared::domain::normalize_hire_date(&employee.hire_date),
        if employee.is_active { "active" } else { "inactive" }
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
