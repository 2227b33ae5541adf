use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::eyre;
use commands::{account, config, movies, serve};
use std::path::PathBuf;
use trackflix_config::PathManager;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "trackflix")]
#[command(about = "TrackFlix - search movies, rate them and keep a list of what you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the watchlist server
    #[command(long_about = "Run the watchlist server: accounts, cookie sessions and per-user watched lists stored as JSON documents. Stops on Ctrl-C.")]
    Serve {
        /// Address to listen on (overrides server.bind_address)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,

        /// Also write logs to a daily-rotated file (defaults to the log directory)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        log_file: Option<Option<PathBuf>>,
    },
    /// Create an account on the watchlist server
    Signup {
        /// Display name (prompted if omitted)
        #[arg(long)]
        name: Option<String>,

        /// Email (prompted if omitted)
        #[arg(long)]
        email: Option<String>,
    },
    /// Log in and remember the session
    Login {
        /// Email (prompted if omitted)
        email: Option<String>,
    },
    /// End the session and forget the cached login
    Logout,
    /// Show who is logged in
    Whoami,
    /// Search the movie directory by title
    Search {
        /// Title to search for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show the details of a movie
    Show {
        /// IMDb identifier, e.g. tt1375666
        imdb_id: String,
    },
    /// Rate a movie interactively and add it to the watched list
    Rate {
        imdb_id: String,
    },
    /// Add a movie to the watched list with a rating
    Add {
        imdb_id: String,

        /// Your rating, 1 to 10
        #[arg(long, short)]
        rating: u8,
    },
    /// Remove a movie from the watched list
    Remove {
        imdb_id: String,
    },
    /// List watched movies with summary statistics
    List,
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Create or update the configuration file
    Init {
        /// OMDb API key (prompted if omitted)
        #[arg(long)]
        api_key: Option<String>,

        /// Watchlist server URL (prompted if omitted)
        #[arg(long)]
        backend_url: Option<String>,

        /// Overwrite without asking
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Only the server writes to a log file
    let log_file = match &cli.command {
        Commands::Serve { log_file: Some(path), .. } => Some(
            path.clone()
                .unwrap_or_else(|| PathManager::default().server_log_file()),
        ),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file).map_err(|e| eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    let result = match cli.command {
        Commands::Serve { bind, .. } => serve::run_serve(bind, &output).await,
        Commands::Signup { name, email } => account::run_signup(name, email, &output).await,
        Commands::Login { email } => account::run_login(email, &output).await,
        Commands::Logout => account::run_logout(&output).await,
        Commands::Whoami => account::run_whoami(&output).await,
        Commands::Search { query } => movies::run_search(query.join(" "), &output).await,
        Commands::Show { imdb_id } => movies::run_show(imdb_id, &output).await,
        Commands::Rate { imdb_id } => movies::run_rate(imdb_id, &output).await,
        Commands::Add { imdb_id, rating } => movies::run_add(imdb_id, rating, &output).await,
        Commands::Remove { imdb_id } => movies::run_remove(imdb_id, &output).await,
        Commands::List => movies::run_list(&output).await,
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(cmd, &output).await
        }
    };

    if let Err(e) = &result {
        tracing::debug!("Command failed: {:?}", e);
    }
    result
}
