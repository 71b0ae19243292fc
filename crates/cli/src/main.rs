mod cmd;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::parse_package_name;
use crate::output::{OutputFormat, print_error};

/// tinypkg - build and install packages from source
#[derive(Parser)]
#[command(name = "tinypkg")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Create the tinypkg directory layout
  Init,

  /// Sync the package index
  Update,

  /// Download and build a package without installing it
  Build {
    #[arg(value_parser = parse_package_name)]
    package: String,

    /// Use the package index as it is instead of syncing it first
    #[arg(long)]
    offline: bool,
  },

  /// Build and install a package
  Install {
    #[arg(value_parser = parse_package_name)]
    package: String,

    /// Use the package index as it is instead of syncing it first
    #[arg(long)]
    offline: bool,

    /// Install from the existing build directory
    #[arg(long)]
    skip_build: bool,
  },

  /// Remove an installed package
  Remove {
    #[arg(value_parser = parse_package_name)]
    package: String,
  },

  /// List installed packages
  List {
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Search the package index by name or description
  Search {
    term: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Show a package's manifest
  Info {
    #[arg(value_parser = parse_package_name)]
    package: String,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },
}

fn main() {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("tinypkg=debug,tinypkg_lib=debug,warn")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Init => cmd::cmd_init(),
    Commands::Update => cmd::cmd_update(),
    Commands::Build { package, offline } => cmd::cmd_build(&package, offline),
    Commands::Install {
      package,
      offline,
      skip_build,
    } => cmd::cmd_install(&package, offline, skip_build),
    Commands::Remove { package } => cmd::cmd_remove(&package),
    Commands::List { output } => cmd::cmd_list(output),
    Commands::Search { term, output } => cmd::cmd_search(&term, output),
    Commands::Info { package, output } => cmd::cmd_info(&package, output),
  };

  if let Err(err) = result {
    print_error(&err.to_string());
    std::process::exit(1);
  }
}
