//! Userpass CLI - credentials kept in one encrypted file per host
//!
//! Every machine writes only its own `userpass.<host>.age` file; reads merge
//! all of them.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod output;

use app::AppContext;
use cli::{Cli, Commands};
use constants::LOG_ENV;
use errors::{exit_code_for, hint_for};

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    if let Err(err) = run(&ctx) {
        eprintln!("Error: {}", err);
        if let Some(hint) = hint_for(&err) {
            eprintln!("{}", hint);
        }
        std::process::exit(exit_code_for(&err));
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(ctx: &AppContext) -> anyhow::Result<()> {
    match &ctx.cli().command {
        Some(Commands::List(args)) => commands::handle_list(ctx, args),
        Some(Commands::Show(args)) => commands::handle_show(ctx, args),
        Some(Commands::Add(args)) => commands::handle_add(ctx, args),
        Some(Commands::Update(args)) => commands::handle_update(ctx, args),
        Some(Commands::Sources) => commands::handle_sources(ctx),
        Some(Commands::Config) => commands::handle_config(ctx),
        Some(Commands::Completions(args)) => commands::handle_completions(args.shell),
        None => {
            print_quickstart();
            Ok(())
        }
    }
}

fn print_quickstart() {
    println!("userpass {}", userpass_core::VERSION);
    println!();
    println!("Quickstart:");
    println!("  userpass add example.com --username alice --generate");
    println!("  userpass show example");
    println!("  userpass update example.com --generate");
    println!("  userpass list");
    println!();
    println!("Run `userpass --help` for all commands.");
}
