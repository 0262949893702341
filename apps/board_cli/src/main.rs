use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use board_core::{
    BoardLayout, DropOutcome, HttpTaskApi, StatusBoardController, StatusSettlement, TaskFilter,
};
use clap::{Parser, Subcommand};
use shared::{
    domain::{ColumnId, Priority, TaskId, UserId},
    protocol::NewTask,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(name = "taskboard", about = "Status board for the task API")]
struct Args {
    /// Config file (defaults to ./board.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    organization: Option<String>,
    #[arg(long)]
    user: Option<String>,
    /// Used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the board grouped by column
    Show {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Drag a task onto another column
    Move { task_id: String, column: String },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "not_started")]
        status: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        estimate: Option<f64>,
    },
    Delete { task_id: String },
    /// List configured columns
    Columns,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid --log-level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_url = url;
    }
    if let Some(org) = args.organization {
        settings.organization_id = Some(org);
    }
    if let Some(user) = args.user {
        settings.user_id = Some(user);
    }

    let layout = settings.layout()?;
    if let Command::Columns = args.command {
        println!("{}", render::render_layout(&layout));
        return Ok(());
    }

    let mut api = HttpTaskApi::with_timeout(&settings.api_url, settings.timeout())?;
    if let Some(token) = settings.api_token.clone() {
        api = api.with_token(token);
    }
    let api_url = api.base_url().clone();
    let board = StatusBoardController::new(Arc::new(api), layout)?;
    let count = board
        .switch_context(settings.context())
        .await
        .with_context(|| format!("failed to load tasks from {api_url}"))?;
    info!(count, %api_url, "tasks loaded");

    match args.command {
        Command::Show {
            search,
            priority,
            assignee,
        } => {
            let filter = TaskFilter {
                search,
                priority,
                assignee: assignee.map(UserId::from),
            };
            println!("{}", render::render_board(&board.view(&filter)));
        }
        Command::Move { task_id, column } => {
            move_task(&board, TaskId::from(task_id), ColumnId::from(column)).await?;
        }
        Command::Create {
            title,
            status,
            description,
            priority,
            estimate,
        } => {
            let status = configured_column(board.layout(), status)?;
            let created = board
                .create_task(NewTask {
                    title,
                    status,
                    description,
                    priority,
                    estimated_hours: estimate,
                    assignee_id: None,
                    organization_id: None,
                })
                .await?;
            println!("created {} in {}", created.id, created.status);
        }
        Command::Delete { task_id } => {
            board.delete_task(&TaskId::from(task_id.clone())).await?;
            println!("deleted {task_id}");
        }
        Command::Columns => {}
    }

    Ok(())
}

async fn move_task(board: &StatusBoardController, task_id: TaskId, column: ColumnId) -> Result<()> {
    board.begin_drag(&task_id)?;
    board.enter_column(&column);
    match board.drop_on(&column) {
        DropOutcome::NotDragging => Err(anyhow!("drag for {task_id} was lost before the drop")),
        DropOutcome::OutsideBoard => Err(anyhow!("'{column}' is not a column on this board")),
        DropOutcome::StaleItem => Err(anyhow!("task {task_id} disappeared during the move")),
        DropOutcome::SameColumn => {
            println!("{task_id} is already in {column}");
            Ok(())
        }
        DropOutcome::Dispatched(handle) => {
            let from = column_title(board, handle.previous());
            match handle.settled().await {
                StatusSettlement::Committed => {
                    println!("moved {task_id}: {from} -> {}", column_title(board, &column));
                    Ok(())
                }
                StatusSettlement::RolledBack { reason, .. } => Err(anyhow!(
                    "move of {task_id} to {column} failed and was rolled back: {reason}"
                )),
                StatusSettlement::Abandoned => {
                    Err(anyhow!("move of {task_id} did not complete"))
                }
            }
        }
    }
}

fn column_title(board: &StatusBoardController, column: &ColumnId) -> String {
    board
        .layout()
        .get(column)
        .map(|c| c.title.clone())
        .unwrap_or_else(|| column.to_string())
}

fn configured_column(layout: &BoardLayout, status: String) -> Result<ColumnId> {
    let status = ColumnId::from(status);
    if !layout.contains(&status) {
        bail!("'{status}' is not a column on this board");
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_accepts_only_configured_columns() {
        let layout = BoardLayout::default();
        assert_eq!(
            configured_column(&layout, "on_hold".into()).expect("known column"),
            ColumnId::on_hold()
        );
        let err = configured_column(&layout, "onhold".into()).expect_err("typo");
        assert!(err.to_string().contains("'onhold' is not a column"));
    }
}
