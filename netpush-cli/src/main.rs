mod args;
mod cmd;
mod output;

use std::process::ExitCode;

use clap::Parser;
use log::error;

use crate::cmd::Cli;
use crate::output::Output;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let output = match cli.global.init_logging() {
        Ok(()) => match cmd::run(&cli).await {
            Ok(output) => output,
            Err(e) => {
                error!("{e:?}");
                Output::failed(format!("{e:#}"))
            }
        },
        Err(e) => Output::failed(format!("{e:#}")),
    };

    println!("{}", output.to_json());
    if output.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
