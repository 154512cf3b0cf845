// CLI modules
mod cli;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Admin, Collection, Daemon, Health, Version};
use service::http_server::api::v0::auth::login::LoginRequest;
use service::http_server::api::v0::shared::fetch::FetchSharedRequest;

command_enum! {
    (Daemon, Daemon),
    (Login, LoginRequest),
    (Admin, Admin),
    (Collection, Collection),
    (Shared, FetchSharedRequest),
    (Health, Health),
    (Version, Version),
}

async fn run(args: Args) -> anyhow::Result<OpOutput> {
    let ctx = cli::op::OpContext::new(args.remote, args.token)
        .context("failed to create API client")?;
    let output = args.command.execute(&ctx).await?;
    Ok(output)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match run(args).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
