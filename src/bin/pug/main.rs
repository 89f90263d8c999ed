//! Pug CLI - drives an EDK II build from Pug.toml

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pug::ops::{dump_config, pug_build, BuildOptions};
use pug::util::config::load_config;
use pug::util::env::Environment;
use pug::util::process::SystemRunner;
use pug::util::shell::{Shell, Verbosity};
use pug::GlobalContext;

mod cli;

use cli::Cli;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    // Set up logging
    let filter = EnvFilter::try_from_env("PUG_LOG").unwrap_or_else(|_| match cli.verbosity {
        0 => EnvFilter::new("pug=error"),
        1 => EnvFilter::new("pug=info"),
        _ => EnvFilter::new("pug=debug"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::new(Verbosity::from_level(cli.verbosity), cli.color);
    let ctx = GlobalContext::new()?
        .with_verbosity(cli.verbosity)
        .with_shell(shell);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| ctx.config_path());
    let config = load_config(&config_path, ctx.cwd(), ctx.host())?;

    if let Some(scope) = &cli.dump_default_config {
        println!("{}", dump_config(&config, scope.as_deref())?);
        return Ok(0);
    }

    let opts = BuildOptions {
        build_args: cli.build_args,
        jobs: None,
    };
    let runner = SystemRunner::new(ctx.host());
    let env = Environment::from_process(ctx.host());
    pug_build(&ctx, &config, &opts, &runner, env)
}
