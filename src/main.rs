use anyhow::Result;
use clap::Parser;
use plugmart::commands;

/// plugmart - agent-plugin marketplace client
///
/// Browse the marketplace catalog of a management server and install
/// agent plugins against it.
///
/// If the MARKETPLACE_TOKEN environment variable is set, it is sent as a
/// bearer token on every request.
///
/// Examples:
///   plugmart list --search ssh     # Find plugins mentioning "ssh"
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Marketplace server URL (also via MARKETPLACE_URL)
    #[arg(
        long = "server-url",
        short = 's',
        env = "MARKETPLACE_URL",
        value_name = "URL",
        global = true
    )]
    pub server_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List available plugins
    List(FilterArgs),

    /// Install one plugin from the catalog
    Install(InstallArgs),

    /// Install every safe plugin in the visible catalog
    InstallAllSafe(FilterArgs),

    /// Force-refresh the available-plugins catalog
    Refresh,
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// Free-text search over all plugin fields
    #[arg(long, short = 'q', value_name = "QUERY")]
    search: Option<String>,

    /// Only plugins of this type
    #[arg(long = "type", value_name = "TYPE")]
    plugin_type: Option<String>,
}

#[derive(clap::Args, Debug)]
struct InstallArgs {
    /// Plugin name as listed in the catalog
    #[arg(value_name = "NAME")]
    name: String,

    /// Plugin type, required if the name alone is ambiguous
    #[arg(long = "type", value_name = "TYPE")]
    plugin_type: Option<String>,

    /// Plugin version, required if the name alone is ambiguous
    #[arg(long, value_name = "VERSION")]
    version: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::List(args) => {
            commands::list(cli.server_url, args.search, args.plugin_type).await?
        }
        Commands::Install(args) => {
            commands::install(cli.server_url, &args.name, args.plugin_type, args.version).await?
        }
        Commands::InstallAllSafe(args) => {
            commands::install_all_safe(cli.server_url, args.search, args.plugin_type).await?
        }
        Commands::Refresh => commands::refresh(cli.server_url).await?,
    }
    Ok(())
}
