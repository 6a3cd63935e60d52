//! Campus Console - Admin CLI
//!
//! Terminal front end for the console core: moderation, dashboard
//! analytics, activity feed, leaderboard and progress views.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_console::analytics::{aggregate_students, average_progress};
use campus_console::backend::{ActivityQuery, ApiError};
use campus_console::filter::{ActivityFilter, StudentFilter};
use campus_console::moderation::SelectionTracker;
use campus_console::records::{ActivityKind, StudentStatus};
use campus_console::{AdminConsole, Config};

#[derive(Parser)]
#[command(name = "campus-console")]
#[command(about = "Admin console for the Campus learning platform")]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "CAMPUS_BACKEND_URL")]
    server: Option<String>,

    /// Admin bearer token
    #[arg(long, env = "CAMPUS_ADMIN_TOKEN")]
    token: Option<String>,

    /// Path to a config file (defaults to ./config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Student overview: counts, approval rate, registration windows
    Dashboard,

    /// Student moderation
    Students {
        #[command(subcommand)]
        action: StudentsAction,
    },

    /// Platform activity feed with stat cards
    Activity {
        /// Only show one activity type (e.g. quiz_completed)
        #[arg(long)]
        kind: Option<ActivityKind>,

        /// Only show one student's activity
        #[arg(long)]
        user: Option<String>,

        /// Page size requested from the backend
        #[arg(long, default_value = "100")]
        limit: u32,

        /// Narrow rows by free text (name, email, title, action)
        #[arg(long)]
        search: Option<String>,
    },

    /// Progress leaderboard
    Leaderboard {
        /// Number of rows requested from the backend
        #[arg(long, default_value = "50")]
        limit: u32,
    },

    /// Per-student progress summaries with the cohort average
    Progress,
}

#[derive(Subcommand)]
enum StudentsAction {
    /// List students
    List {
        /// Only show one status (pending, approved, rejected)
        #[arg(long)]
        status: Option<StudentStatus>,

        /// Narrow rows by free text (name, email, student id)
        #[arg(long)]
        search: Option<String>,
    },

    /// Approve one pending student
    Approve {
        /// Student id
        id: String,
    },

    /// Reject one pending student
    Reject {
        /// Student id
        id: String,

        /// Reason forwarded to the backend and stored with the decision
        #[arg(long)]
        reason: Option<String>,
    },

    /// Approve several pending students in one call
    BulkApprove {
        /// Student ids
        #[arg(required_unless_present = "all_pending", conflicts_with = "all_pending")]
        ids: Vec<String>,

        /// Select every currently pending student
        #[arg(long)]
        all_pending: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,campus_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration; flags beat env vars beat config.yaml
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;
    if let Some(server) = cli.server {
        config.backend_url = server;
    }
    if let Some(token) = cli.token {
        config.admin_token = Some(token);
    }

    let console = AdminConsole::new(config);

    // Ctrl-C cancels in-flight fetches instead of killing mid-render
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let outcome = match cli.command {
        Commands::Dashboard => run_dashboard(&console, &cancel).await,
        Commands::Students { action } => run_students(&console, action, &cancel).await,
        Commands::Activity {
            kind,
            user,
            limit,
            search,
        } => run_activity(&console, kind, user, limit, search, &cancel).await,
        Commands::Leaderboard { limit } => run_leaderboard(&console, limit, &cancel).await,
        Commands::Progress => run_progress(&console, &cancel).await,
    };

    if let Err(err) = outcome {
        // A cancelled run exits quietly; everything else prints its one
        // message and a re-auth hint where that is the fix
        if err.is_cancelled() {
            return Ok(());
        }
        eprintln!("{}", err.display_message());
        if err.requires_reauth() {
            eprintln!("Provide an admin token via --token or CAMPUS_ADMIN_TOKEN.");
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run_dashboard(console: &AdminConsole, cancel: &CancellationToken) -> Result<(), ApiError> {
    let snapshot = console.store.students(cancel).await?;
    let overview = aggregate_students(snapshot.data(), Utc::now());

    println!(
        "Students: {} total ({} pending, {} approved, {} rejected)",
        overview.total, overview.pending, overview.approved, overview.rejected
    );
    println!("Approval rate: {}%", overview.approval_rate);
    println!(
        "New registrations: {} last 7 days, {} last 30 days",
        overview.last_7_days, overview.last_30_days
    );

    if !overview.by_program.is_empty() {
        println!();
        println!("By program:");
        let mut programs: Vec<(&String, &usize)> = overview.by_program.iter().collect();
        programs.sort_by(|a, b| b.1.cmp(a.1));
        for (program, count) in programs {
            println!("  {:<32} {}", program, count);
        }
    }

    if !overview.by_year.is_empty() {
        println!();
        println!("By year of study:");
        for (year, count) in &overview.by_year {
            println!("  {:<32} {}", year, count);
        }
    }

    if !overview.recent_registrations.is_empty() {
        println!();
        println!("Recent registrations:");
        for student in &overview.recent_registrations {
            println!(
                "  {}  {:<9} {:<26} {}",
                student.created_at.format("%Y-%m-%d"),
                student.status,
                student.full_name,
                student.program.as_deref().unwrap_or("Not specified")
            );
        }
    }

    Ok(())
}

async fn run_students(
    console: &AdminConsole,
    action: StudentsAction,
    cancel: &CancellationToken,
) -> Result<(), ApiError> {
    match action {
        StudentsAction::List { status, search } => {
            let snapshot = console.store.students(cancel).await?;

            let mut filter = StudentFilter::new();
            if let Some(status) = status {
                filter = filter.with_status(status);
            }
            if let Some(search) = search {
                filter = filter.with_query(search);
            }
            let rows = filter.apply(snapshot.data());

            println!("{:<26} {:<10} {:<26} {}", "ID", "STATUS", "NAME", "EMAIL");
            println!("{}", "-".repeat(90));
            for student in &rows {
                println!(
                    "{:<26} {:<10} {:<26} {}",
                    student.id, student.status, student.full_name, student.email
                );
            }
            println!("{} of {} students", rows.len(), snapshot.data().len());
        }

        StudentsAction::Approve { id } => {
            console.moderation.approve(&id).await?;

            let snapshot = console.store.refresh_students(cancel).await?;
            match snapshot.data().iter().find(|s| s.id == id) {
                Some(student) => {
                    println!("{} is now {}", student.full_name, student.status)
                }
                None => println!("Approved student {}", id),
            }
        }

        StudentsAction::Reject { id, reason } => {
            console.moderation.reject(&id, reason.as_deref()).await?;

            let snapshot = console.store.refresh_students(cancel).await?;
            match snapshot.data().iter().find(|s| s.id == id) {
                Some(student) => {
                    println!("{} is now {}", student.full_name, student.status)
                }
                None => println!("Rejected student {}", id),
            }
        }

        StudentsAction::BulkApprove { ids, all_pending } => {
            let snapshot = console.store.students(cancel).await?;
            let pending: Vec<String> = snapshot
                .data()
                .iter()
                .filter(|s| s.is_pending())
                .map(|s| s.id.clone())
                .collect();

            let mut selection = SelectionTracker::new();
            if all_pending {
                selection.select_all(&pending);
            } else {
                for id in ids {
                    selection.toggle(id);
                }
                // Ids that are not pending any more drop out here
                selection.retain(&pending);
            }

            let approved = console.moderation.bulk_approve(&mut selection).await?;

            let snapshot = console.store.refresh_students(cancel).await?;
            let still_pending = snapshot.data().iter().filter(|s| s.is_pending()).count();
            println!("Approved {} students, {} still pending", approved, still_pending);
        }
    }

    Ok(())
}

async fn run_activity(
    console: &AdminConsole,
    kind: Option<ActivityKind>,
    user: Option<String>,
    limit: u32,
    search: Option<String>,
    cancel: &CancellationToken,
) -> Result<(), ApiError> {
    let mut query = ActivityQuery::new().with_limit(limit);
    if let Some(kind) = kind {
        query = query.with_kind(kind);
    }
    if let Some(user) = user {
        query = query.with_user(user);
    }

    // The stats summary and the log page are independent fetches
    let (stats, logs) = tokio::try_join!(
        console.store.activity_stats(cancel),
        console.store.activity(&query, cancel),
    )?;

    let stats = stats.data();
    println!(
        "Total activity: {} ({} today, {} this week)",
        stats.total, stats.today, stats.this_week
    );
    for (tag, count) in &stats.by_type {
        println!("  {:<24} {}", ActivityKind::from(tag.clone()).label(), count);
    }

    let mut filter = ActivityFilter::new();
    if let Some(search) = search {
        filter = filter.with_query(search);
    }
    let rows = filter.apply(logs.data());

    let now = Utc::now();
    println!();
    println!(
        "{:<16} {:<20} {:<26} {}",
        "WHEN", "TYPE", "WHO", "ACTION"
    );
    println!("{}", "-".repeat(90));
    for log in &rows {
        println!(
            "{:<16} {:<20} {:<26} {}",
            log.age_label(now),
            log.activity_type.label(),
            log.user.full_name,
            log.action
        );
    }
    println!("{} of {} entries", rows.len(), logs.data().len());

    Ok(())
}

async fn run_leaderboard(
    console: &AdminConsole,
    limit: u32,
    cancel: &CancellationToken,
) -> Result<(), ApiError> {
    let snapshot = console.store.leaderboard(limit, cancel).await?;

    println!("{:<6} {:<26} {:>5}", "RANK", "NAME", "PROG");
    println!("{}", "-".repeat(64));
    for entry in snapshot.data().iter() {
        // 20-char bar over the clamped width
        let bar = "#".repeat((entry.bar_width() / 5.0).round() as usize);
        println!(
            "{:<6} {:<26} {:>4}%  {}",
            entry.rank,
            entry.name,
            entry.display_progress(),
            bar
        );
    }

    Ok(())
}

async fn run_progress(console: &AdminConsole, cancel: &CancellationToken) -> Result<(), ApiError> {
    let snapshot = console.store.progress(cancel).await?;
    println!("Cohort average progress: {}%", average_progress(snapshot.data()));

    for summary in snapshot.data().iter() {
        println!();
        println!("{} ({})", summary.name, summary.email);
        println!(
            "  overall {:>3}%  courses {}  videos {}  quizzes {}  streak {}",
            summary.overall_progress.round() as i64,
            summary.courses_completed,
            summary.videos_watched,
            summary.quizzes_completed,
            summary.current_streak
        );
        for language in &summary.languages {
            let bar = "#".repeat((language.progress.clamp(0.0, 100.0) / 5.0).round() as usize);
            println!(
                "  {:<18} {:>3}%  {}",
                language.name,
                language.progress.round() as i64,
                bar
            );
        }
    }

    Ok(())
}
