//! Taskboard - command line driver
//!
//! Thin wrapper over the library: loads config, builds the state
//! containers and prints results. Notices go to stderr.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use futures::future::join;
use std::path::PathBuf;
use taskboard::models::{NewTask, Priority};
use taskboard::notify::{Notice, NoticeLevel};
use taskboard::views::{self, TaskFilter, TaskMetrics, TimeRange};
use taskboard::{AppState, Config};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Manage tasks, categories and subtasks")]
struct Cli {
    /// Path to the YAML config file (default: ./taskboard.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List tasks
    Tasks {
        /// Case-insensitive title search
        #[arg(short, long)]
        search: Option<String>,

        /// low, medium or high
        #[arg(short, long)]
        priority: Option<Priority>,

        /// Category id
        #[arg(short, long)]
        category: Option<i64>,
    },

    /// Create a task
    Add {
        title: String,

        #[arg(short, long)]
        priority: Option<Priority>,

        #[arg(short, long)]
        category: Option<i64>,

        /// Due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<NaiveDate>,

        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Toggle a task between completed and pending
    Done { id: i64 },

    /// Delete a task and its subtasks
    Rm { id: i64 },

    /// List categories with live task counts
    Categories,

    /// List the subtasks of a task
    Subtasks { task_id: i64 },

    /// Show productivity metrics
    Stats {
        /// week, month or year
        #[arg(short, long, default_value = "week")]
        range: TimeRange,
    },

    /// Store today's statistics snapshot
    Snapshot,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,taskboard=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_yaml_and_env(cli.config.as_deref())?;
    let app = AppState::new(&config)?;
    let mut notices = app.notices.subscribe();

    let result = run(&app, cli.command).await;
    print_notices(&mut notices);
    result
}

async fn run(app: &AppState, command: Commands) -> Result<()> {
    match command {
        Commands::Tasks {
            search,
            priority,
            category,
        } => {
            let (tasks, categories) = join(app.task_state(), app.category_state()).await;
            let filter = TaskFilter {
                search_query: search.unwrap_or_default(),
                priority,
                category,
                scope: None,
            };
            let categories = categories.items().await;
            let today = Utc::now().date_naive();
            for task in filter.apply(&tasks.items().await) {
                let mark = if task.completed { "x" } else { " " };
                let category = views::category_name(&categories, task.category_id).unwrap_or("-");
                let due = match (task.due_date, views::due_status(&task, today)) {
                    (Some(date), Some(status)) => format!("{} ({:?})", date, status),
                    _ => String::new(),
                };
                println!(
                    "[{}] {:>4}  {:<6} {:<12} {} {}",
                    mark,
                    task.id,
                    task.priority.as_str(),
                    category,
                    task.title,
                    due
                );
            }
        }
        Commands::Add {
            title,
            priority,
            category,
            due,
            notes,
        } => {
            let tasks = app.task_state().await;
            let task = tasks
                .add(&NewTask {
                    title,
                    category_id: category,
                    priority,
                    due_date: due,
                    notes,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        Commands::Done { id } => {
            let tasks = app.task_state().await;
            let task = tasks.toggle_complete(id).await?;
            println!(
                "task {} is now {}",
                task.id,
                if task.completed { "completed" } else { "pending" }
            );
        }
        Commands::Rm { id } => {
            let tasks = app.task_state().await;
            tasks.remove(id).await?;
            println!("task {} deleted", id);
        }
        Commands::Categories => {
            let (categories, tasks) = join(app.category_state(), app.task_state()).await;
            let counts = views::category_task_counts(&tasks.items().await);
            for category in categories.items().await {
                println!(
                    "{:>4}  {}  {:<20} {} tasks",
                    category.id,
                    category.color,
                    category.name,
                    counts.get(&category.id).copied().unwrap_or(0)
                );
            }
        }
        Commands::Subtasks { task_id } => {
            let subtasks = app.subtasks.get_by_task_id(task_id).await;
            if subtasks.is_empty() {
                println!("no subtasks for task {}", task_id);
            }
            for subtask in subtasks {
                let mark = if subtask.completed { "x" } else { " " };
                println!("[{}] {:>4}  {}", mark, subtask.id, subtask.name);
            }
        }
        Commands::Stats { range } => {
            let tasks = app.task_state().await.items().await;
            let now = Utc::now();
            let metrics = TaskMetrics::compute(&tasks, range, now);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            for bucket in views::daily_breakdown(&tasks, range, now) {
                println!(
                    "{:<8} total {:>3}  done {:>3}  pending {:>3}  score {:>3}",
                    bucket.label, bucket.total, bucket.completed, bucket.pending, bucket.score
                );
            }
        }
        Commands::Snapshot => {
            let tasks = app.task_state().await.items().await;
            let statistics = app.statistic_state().await;
            let stat = statistics
                .record_daily(&tasks)
                .await
                .context("could not store daily statistics")?;
            println!("{}", serde_json::to_string_pretty(&stat)?);
        }
    }
    Ok(())
}

fn print_notices(rx: &mut broadcast::Receiver<Notice>) {
    while let Ok(notice) = rx.try_recv() {
        let prefix = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        eprintln!("{}: {}", prefix, notice.message);
    }
}
