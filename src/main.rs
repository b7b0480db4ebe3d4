mod handlers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use handlers::edit::EditRequest;
use handlers::list::ListRequest;
use handlers::TaskInput;
use std::path::PathBuf;
use taskdeck::config::DeckConfig;
use taskdeck::engine::pipeline::{BucketOrder, SortDirection, SortKey, StatusFilter};
use taskdeck::engine::types::{Language, TaskField};

#[derive(Parser)]
#[command(name = "taskdeck", version, about = "Personal tasks, grouped by when they are due")]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Only log errors
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the taskdeck storage directory
    Init,
    /// Manage profiles
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Add a new task
    Add {
        title: String,
        #[arg(long, short = 'c')]
        category: String,
        #[command(flatten)]
        input: TaskInput,
    },
    /// List tasks grouped by deadline
    List {
        /// all, active or completed
        #[arg(long, short = 'f', default_value_t = StatusFilter::All)]
        filter: StatusFilter,
        /// Case-insensitive match on title or description
        #[arg(long, short = 's')]
        search: Option<String>,
        /// priority, date or category
        #[arg(long)]
        sort: Option<SortKey>,
        /// asc or desc
        #[arg(long)]
        direction: Option<SortDirection>,
        /// encounter or chronological
        #[arg(long)]
        bucket_order: Option<BucketOrder>,
        #[arg(long)]
        json: bool,
    },
    /// Show one task in full
    Show {
        task: String,
        /// Strict mode: require exact ID or title (no fuzzy matching)
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
    /// Change fields of a task
    Edit {
        task: String,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short = 'c')]
        category: Option<String>,
        #[command(flatten)]
        input: TaskInput,
        /// Fields to remove: description, priority, deadline, time, reminder, repeat, color, icon
        #[arg(long, value_delimiter = ',')]
        clear: Vec<TaskField>,
    },
    /// Toggle a task between active and completed
    Done {
        task: String,
        #[arg(long)]
        strict: bool,
    },
    /// Delete a task
    Delete {
        task: String,
        #[arg(long)]
        strict: bool,
    },
    /// List the categories in use
    Categories {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Register a profile and make it active
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// Switch the active profile
    Use { email: String },
    /// List profiles
    List,
    /// Show the active profile
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Rename the active profile
    Rename { name: String },
    /// Set the display language (en, ua, pl, de, ...)
    Language { language: Language },
    /// Set or remove the avatar image (JPEG or PNG, up to 2 MiB)
    Avatar {
        path: Option<PathBuf>,
        #[arg(long, conflicts_with = "path")]
        clear: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;
    let config = DeckConfig::load()?;

    match cli.command {
        Commands::Init
        | Commands::Profile(_)
        | Commands::Add { .. }
        | Commands::Edit { .. }
        | Commands::Done { .. }
        | Commands::Delete { .. } => dispatch_write_ops(&config, cli.command),
        Commands::List { .. } | Commands::Show { .. } | Commands::Categories { .. } => {
            dispatch_read_ops(&config, cli.command)
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("TASKDECK_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn dispatch_write_ops(config: &DeckConfig, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Init => handlers::init::handle(config),
        Commands::Profile(cmd) => dispatch_profile(config, cmd),
        Commands::Add {
            title,
            category,
            input,
        } => handlers::add::handle(config, &title, &category, input),
        Commands::Edit {
            task,
            strict,
            title,
            category,
            input,
            clear,
        } => handlers::edit::handle(
            config,
            &task,
            strict,
            EditRequest {
                title,
                category,
                input,
                clear,
            },
        ),
        Commands::Done { task, strict } => handlers::done::handle(config, &task, strict),
        Commands::Delete { task, strict } => handlers::delete::handle(config, &task, strict),
        _ => unreachable!("Invalid write command dispatch"),
    }
}

fn dispatch_read_ops(config: &DeckConfig, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List {
            filter,
            search,
            sort,
            direction,
            bucket_order,
            json,
        } => handlers::list::handle(
            config,
            ListRequest {
                filter,
                search,
                sort_by: sort,
                direction,
                bucket_order,
                json,
            },
        ),
        Commands::Show { task, strict, json } => handlers::show::handle(config, &task, strict, json),
        Commands::Categories { json } => handlers::categories::handle(config, json),
        _ => unreachable!("Invalid read command dispatch"),
    }
}

fn dispatch_profile(config: &DeckConfig, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Create { name, email, phone } => {
            handlers::profile::create(config, &name, &email, &phone)
        }
        ProfileCommand::Use { email } => handlers::profile::switch(config, &email),
        ProfileCommand::List => handlers::profile::list(config),
        ProfileCommand::Show { json } => handlers::profile::show(config, json),
        ProfileCommand::Rename { name } => handlers::profile::rename(config, &name),
        ProfileCommand::Language { language } => handlers::profile::language(config, language),
        ProfileCommand::Avatar { path, clear } => {
            handlers::profile::avatar(config, path.as_deref(), clear)
        }
    }
}
