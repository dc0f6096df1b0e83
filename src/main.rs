use anyhow::{anyhow, Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::info;

use tailplot::cli::Args;
use tailplot::config::Source;
use tailplot::source::{FileSource, StreamSource};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => Args::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let result = match config.source.clone() {
        Source::File(path) => {
            let source = FileSource::open(&path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            info!("following {}", path.display());
            tailplot::run_tailplot(config, source)
        }
        Source::Stdin => {
            info!("reading standard input");
            tailplot::run_tailplot(config, StreamSource::stdin())
        }
    };
    result.map_err(|e| anyhow!("{e}"))
}
