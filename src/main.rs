use clap::{Parser, Subcommand};
use colored::Colorize;
use viewbind_migrate::{commands, logging};

#[derive(Parser)]
#[command(name = "viewbind-migrate")]
#[command(about = "Migrate Kotlin Android classes from synthetic view access to view binding", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite activities, fragments and custom views to use view binding
    Migrate {
        /// Path to a .kt file or a source directory (defaults to current directory)
        #[arg(default_value = ".")]
        target: String,
        /// Show what would change without writing any file
        #[arg(long)]
        dry_run: bool,
        /// Path to viewbinding.toml (default: looked up next to the target)
        #[arg(long)]
        config: Option<String>,
    },
    /// List files that still need migrating; exits with 1 if there are any
    Check {
        /// Path to a .kt file or a source directory (defaults to current directory)
        #[arg(default_value = ".")]
        target: String,
        /// Path to viewbinding.toml (default: looked up next to the target)
        #[arg(long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Migrate { target, dry_run, config } => {
            commands::migrate::execute(&target, config.as_deref(), dry_run)
        }
        Commands::Check { target, config } => {
            commands::check::execute(&target, config.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
