use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{clear, config, discover, movie, search, watchlist};
use moviewatch_config::{Config, PathManager, StorageBackend};
use moviewatch_models::{MovieCategory, MovieId};

mod commands;
mod context;
mod logging;
mod output;
mod render;

#[derive(Parser)]
#[command(name = "moviewatch")]
#[command(about = "MovieWatch - Discover movies and keep a watchlist")]
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

    /// Write logs to the log directory instead of stderr
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

fn parse_category(s: &str) -> Result<MovieCategory, String> {
    s.parse()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    File,
    Memory,
    Disabled,
}

impl From<BackendArg> for StorageBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::File => StorageBackend::File,
            BackendArg::Memory => StorageBackend::Memory,
            BackendArg::Disabled => StorageBackend::Disabled,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Browse movie listings
    #[command(long_about = "Show TMDB movie listings. Without --category, shows the first page of Popular, Now Playing, Top Rated and Upcoming together. Listings are cached on disk for the configured TTL; use --refresh to bypass the cache.")]
    Discover {
        /// Show a single category: popular, now-playing, top-rated or upcoming
        #[arg(long, value_parser = parse_category)]
        category: Option<MovieCategory>,

        /// Page number (only with --category)
        #[arg(long, default_value_t = 1, requires = "category")]
        page: u32,

        /// Ignore cached listings and fetch fresh ones
        #[arg(long, action = ArgAction::SetTrue)]
        refresh: bool,
    },
    /// Search movies by title
    Search {
        /// Title to search for
        query: String,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show details for a movie
    #[command(long_about = "Show details for a movie: tagline, rating, overview, leading cast, genres, runtime, budget and revenue, production companies, image links and whether it is on your watchlist.")]
    Movie {
        /// TMDB movie id
        id: MovieId,
    },
    /// Manage your watchlist
    #[command(long_about = "View and edit the watchlist stored under the configured storage key. Running without a subcommand lists it.")]
    Watchlist {
        #[command(subcommand)]
        cmd: Option<WatchlistCommands>,
    },
    /// Configure credentials and settings
    #[command(long_about = "Manage configuration and credentials for MovieWatch. Running without a subcommand shows the current configuration.")]
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommands>,
    },
    /// Clear cached data
    #[command(long_about = "Clear cached data, the stored watchlist or stored credentials. Use --cache to clear cached listings, --watchlist to empty the watchlist, --credentials to remove stored credentials, or --all to clear everything.")]
    Clear {
        /// Clear cache, watchlist and credentials
        #[arg(long, action = ArgAction::SetTrue)]
        all: bool,

        /// Clear cached listings
        #[arg(long, action = ArgAction::SetTrue)]
        cache: bool,

        /// Empty the watchlist
        #[arg(long, action = ArgAction::SetTrue)]
        watchlist: bool,

        /// Clear stored credentials
        #[arg(long, action = ArgAction::SetTrue)]
        credentials: bool,

        /// Don't ask before emptying the watchlist
        #[arg(short, long, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum WatchlistCommands {
    /// List watchlist entries in the order they were added
    List,
    /// Add a movie
    #[command(long_about = "Add a movie to the watchlist. Without --title the movie's details are fetched from TMDB first. Adding a movie that is already on the list changes nothing.")]
    Add {
        /// TMDB movie id
        id: MovieId,

        /// Title to store instead of fetching details
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a movie
    Remove {
        /// TMDB movie id
        id: MovieId,
    },
    /// Flip a movie between watched and unwatched
    Toggle {
        /// TMDB movie id
        id: MovieId,
    },
    /// Show whether a movie is on the watchlist and watched
    Status {
        /// TMDB movie id
        id: MovieId,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (masks sensitive data)
    #[command(long_about = "Display the current configuration. The TMDB API key is masked. Use --full to show it.")]
    Show {
        /// Show full configuration including masked secrets
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Configure TMDB access
    #[command(long_about = "Store a TMDB API key in the credentials file. You can create a key at https://www.themoviedb.org/settings/api. The TMDB_API_KEY environment variable takes precedence over the stored key.")]
    Tmdb {
        /// TMDB API key (if not provided, will prompt)
        #[arg(long)]
        api_key: Option<String>,

        /// Response language, e.g. en-US
        #[arg(long)]
        language: Option<String>,
    },

    /// Configure watchlist storage
    Storage {
        /// Storage backend
        #[arg(long, value_enum)]
        backend: Option<BackendArg>,

        /// Storage key the watchlist is kept under
        #[arg(long)]
        key: Option<String>,

        /// Largest value the backend accepts, in bytes (0 for no limit)
        #[arg(long)]
        quota_bytes: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let paths = PathManager::default();
    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;

    // Relative log paths live under the log directory
    let mut logging_config = config.logging.clone();
    logging_config.file = match logging_config.file.take() {
        Some(file) if file.is_relative() => Some(paths.log_dir().join(file)),
        Some(file) => Some(file),
        None if cli.log_to_file => Some(paths.default_log_file()),
        None => None,
    };
    logging::init_logging(cli.verbose, cli.quiet, &logging_config).map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let ctx = context::AppContext::new(paths, config);

    match cli.command {
        Commands::Discover { category, page, refresh } => {
            discover::run_discover(&ctx, category, page, refresh, &output).await
        }
        Commands::Search { query, page } => search::run_search(&ctx, &query, page, &output).await,
        Commands::Movie { id } => movie::run_movie(&ctx, id, &output).await,
        Commands::Watchlist { cmd } => {
            let cmd = cmd.unwrap_or(WatchlistCommands::List);
            watchlist::run_watchlist(&ctx, cmd, &output).await
        }
        Commands::Config { cmd } => {
            let cmd = cmd.unwrap_or(ConfigCommands::Show { full: false });
            config::run_config(ctx, cmd, &output).await
        }
        Commands::Clear { all, cache, watchlist, credentials, yes } => {
            clear::run_clear(&ctx, all, cache, watchlist, credentials, yes, &output).await
        }
    }
}
