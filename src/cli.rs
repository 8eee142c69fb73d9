// Command-line surface. Parsing is handled by clap; the token itself may
// also come from the environment or a .env file (see `config`), so the
// positional argument is optional here.

use clap::Parser;

/// Create configuration files in a GitLab repository.
#[derive(Parser, Debug)]
#[command(name = "configseed-cli")]
pub struct Cli {
    /// GitLab access token (or set GITLAB_TOKEN in the environment or a .env file)
    pub token: Option<String>,

    /// Overwrite existing files (default: skip)
    #[arg(long, short = 'f')]
    pub overwrite: bool,
}

/// Printed when no token could be resolved from any source. Goes to stdout,
/// and the process exits with status 1 afterwards.
pub fn print_usage() {
    println!("Usage: configseed-cli [TOKEN] [--overwrite]");
    println!();
    println!("Options:");
    println!("  TOKEN        GitLab access token (or set GITLAB_TOKEN in .env)");
    println!("  --overwrite  Overwrite existing files (default: skip)");
    println!();
    println!("To get a GitLab token:");
    println!("  1. Go to GitLab -> User Settings -> Access Tokens");
    println!("  2. Create a token with 'api' scope");
}
