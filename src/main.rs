use std::process::ExitCode;

use clap::Parser;
use log::{ debug, error, info };

use welcome_server::{
  VERSION,
  cofg::{ Cofg, build_config_from_cli, build_config_from_smoke, cli::{ Cli, Command } },
  error::AppResult,
  harness::smoke,
  server::http_server,
};

fn init() {
  env_logger
    ::builder()
    .default_format()
    .format_module_path(true)
    .format_line_number(true)
    .format_timestamp(None)
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
}

async fn serve(c: &Cofg) -> AppResult<()> {
  let (server, _) = http_server(c)?;
  server.await?;
  Ok(())
}

async fn run(cli: &Cli) -> AppResult<()> {
  let s = build_config_from_cli(Cofg::load_from_disk(&cli.args.config)?, &cli.args);
  debug!("cofg: {s:#?}");
  match &cli.command {
    None | Some(Command::Serve) => serve(&s).await,
    Some(Command::Smoke(args)) => {
      smoke(&build_config_from_smoke(s, args), args, &mut std::io::stdout()).await.map(drop)
    }
  }
}

#[actix_web::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  init();
  info!("welcome-server {VERSION}");

  match run(&cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{e}");
      ExitCode::FAILURE
    }
  }
}
