// CLI binary entry point for wvtags

mod cli;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use std::io::Write;

use cli::Config;

const DEFAULT_LOG_FILTER: &str = "warn";
const VERBOSE_LOG_FILTER: &str = "info,wvtags=debug";

fn init_logging(verbose: bool, cli_filter: Option<&str>) {
    let default = if verbose { VERBOSE_LOG_FILTER } else { DEFAULT_LOG_FILTER };
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default));
    if let Some(filter) = cli_filter {
        builder.parse_filters(filter);
    }
    builder.format(|buf, record| {
        writeln!(buf, "[{:<5} {}] {}", record.level(), record.target(), record.args())
    });
    builder.init();
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(config.verbose, config.log_filter.as_deref());

    cli::commands::run(&config).context("wvtags failed")?;
    Ok(())
}
