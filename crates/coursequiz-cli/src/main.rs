//! coursequiz CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "coursequiz", version, about = "Course evaluation engine")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// User data file (overrides the configured location)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an evaluation interactively
    Take {
        /// Path to the .test exam file
        #[arg(long)]
        exam: PathBuf,

        /// Course root the attempt is recorded under (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Seed for question and answer shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Start without asking for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Validate exam files
    Validate {
        /// Path to an exam file or a course directory
        #[arg(long)]
        exam: PathBuf,
    },

    /// Show the attempt history of an exam
    History {
        /// Path to the .test exam file
        #[arg(long)]
        exam: PathBuf,

        /// Course root the attempts are recorded under (default: current directory)
        #[arg(long)]
        course: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List the exams of a course
    List {
        /// Course root directory
        #[arg(long, default_value = ".")]
        course: PathBuf,
    },

    /// Read, write and export notes
    Notes {
        #[command(subcommand)]
        action: commands::notes::NotesAction,
    },

    /// Track watched media
    Watched {
        #[command(subcommand)]
        action: commands::watched::WatchedAction,
    },

    /// Show or change stored settings
    Settings {
        /// Setting name (omit to list all)
        key: Option<String>,

        /// New value
        value: Option<String>,
    },

    /// Create a starter config and example exam
    Init,

    /// Clear stored user data
    Reset {
        /// Clear exam attempt histories
        #[arg(long)]
        tests: bool,

        /// Clear notes
        #[arg(long)]
        notes: bool,

        /// Clear watched media
        #[arg(long)]
        watched: bool,

        /// Clear everything except the theme
        #[arg(long)]
        all: bool,

        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("coursequiz=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let paths = commands::DataPaths {
        config: cli.config,
        data_file: cli.data_file,
    };

    let result = match cli.command {
        Commands::Take {
            exam,
            course,
            seed,
            yes,
        } => commands::take::execute(&paths, exam, course, seed, yes),
        Commands::Validate { exam } => commands::validate::execute(&paths, exam),
        Commands::History {
            exam,
            course,
            format,
        } => commands::history::execute(&paths, exam, course, format),
        Commands::List { course } => commands::list::execute(&paths, course),
        Commands::Notes { action } => commands::notes::execute(&paths, action),
        Commands::Watched { action } => commands::watched::execute(&paths, action),
        Commands::Settings { key, value } => commands::settings::execute(&paths, key, value),
        Commands::Init => commands::init::execute(),
        Commands::Reset {
            tests,
            notes,
            watched,
            all,
            yes,
        } => commands::reset::execute(
            &paths,
            commands::reset::Scope {
                tests,
                notes,
                watched,
                all,
            },
            yes,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
