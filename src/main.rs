// Entrypoint for the CLI application.
// - Keeps `main` small: resolve settings, create an API client and hand
//   both to the run loop.
// - Returns `anyhow::Result` so run-level failures exit non-zero.

use clap::Parser;
use configseed_cli::{api::GitLabClient, cli, config, config::Settings, sync};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = cli::Cli::parse();

    // Token resolution happens before any network call; without one there
    // is nothing useful to do, so print usage and bail out.
    let settings = match Settings::resolve(&args) {
        Some(settings) => settings,
        None => {
            cli::print_usage();
            std::process::exit(1);
        }
    };

    let client = GitLabClient::new(config::GITLAB_URL, &settings.token)?;
    sync::run(&client, &settings)
}
