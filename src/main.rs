use clap::{CommandFactory, FromArgMatches};

use rrbs::commands;
use rrbs::commands::run::RunArgs;

use git_testament::{git_testament, render_testament};

git_testament!(TESTAMENT);

fn main() -> anyhow::Result<()> {
    let version = render_testament!(TESTAMENT);

    let matches = RunArgs::command().version(version).get_matches();
    let args = RunArgs::from_arg_matches(&matches)?;

    let mut level = tracing::Level::INFO;
    if args.quiet {
        level = tracing::Level::ERROR;
    } else if args.verbose {
        level = tracing::Level::DEBUG;
    }

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    commands::run(args)
}
