mod config;
mod generate_cmd;
mod plan_cmd;
mod serve_cmd;
mod task_cmds;
mod user_cmds;

use clap::{Parser, Subcommand};

use smartplan_db::pool;

use config::SmartplanConfig;

#[derive(Parser)]
#[command(name = "smartplan", about = "Personal task scheduler with daily plan generation")]
struct Cli {
    /// Database URL (overrides SMARTPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a smartplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/smartplan")]
        db_url: String,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the smartplan database (requires config file or env vars)
    DbInit,
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// User management
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Generate daily plans for a user
    Generate {
        /// Username to generate plans for
        #[arg(long)]
        user: String,
        /// First plan date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start_date: Option<String>,
        /// Number of consecutive days to plan
        #[arg(long, default_value_t = 1)]
        days: u32,
    },
    /// Show a generated plan
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a user
    Add {
        username: String,
        /// Password (hashed before storage)
        #[arg(long)]
        password: String,
        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
    /// List all users
    List,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Username the task belongs to
        #[arg(long)]
        user: String,
        title: String,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: String,
        /// Estimated duration in minutes
        #[arg(long)]
        duration: i32,
        /// Priority (higher is more important)
        #[arg(long, default_value_t = 3)]
        priority: i32,
        #[arg(long, default_value = "General")]
        category: String,
    },
    /// List a user's tasks
    List {
        #[arg(long)]
        user: String,
    },
    /// Mark a task completed
    Complete {
        /// Task ID
        task_id: String,
    },
    /// Reopen a completed task
    Uncomplete {
        /// Task ID
        task_id: String,
    },
    /// Delete a task (and any plan entries referencing it)
    Delete {
        /// Task ID
        task_id: String,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show a user's plan for one day
    Show {
        #[arg(long)]
        user: String,
        /// Plan date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show a user's plans over a date range
    Week {
        #[arg(long)]
        user: String,
        /// First date of the range (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start_date: Option<String>,
    },
}

/// Execute the `smartplan init` command: write config file.
fn cmd_init(db_url: &str, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!();
    println!("Next: run `smartplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `smartplan db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = SmartplanConfig::resolve(cli_db_url)?;

    println!("Initializing smartplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;

    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("smartplan db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { db_url, force } => {
            cmd_init(&db_url, force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = SmartplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = serve_cmd::run_serve(db_pool.clone(), &bind, port).await;
            db_pool.close().await;
            result?;
        }
        Commands::User { command } => {
            let resolved = SmartplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = user_cmds::run_user_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Task { command } => {
            let resolved = SmartplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = task_cmds::run_task_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Generate {
            user,
            start_date,
            days,
        } => {
            let resolved = SmartplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result =
                generate_cmd::run_generate(&db_pool, &user, start_date.as_deref(), days).await;
            db_pool.close().await;
            result?;
        }
        Commands::Plan { command } => {
            let resolved = SmartplanConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmd::run_plan_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
