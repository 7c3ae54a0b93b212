use clap::Parser;
use covrelay::cli::{
    Cli, Commands, execute_convert_command, execute_run_command, execute_summary_command,
};
use covrelay::context::PipelineContext;
use covrelay::pipeline::FATAL_EXIT_CODE;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Logs go to stderr; stdout is reserved for the summary
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => {
            let context = PipelineContext::from_env();
            execute_run_command(&args, &context).map(|status| status.exit_code())
        }
        Commands::Summary {
            tracefile,
            exclude,
            json,
        } => execute_summary_command(&tracefile, &exclude, json.as_deref()).map(|_| 0),
        Commands::Convert {
            tracefile,
            output,
            dir,
            exclude,
        } => execute_convert_command(&tracefile, &output, &dir, &exclude).map(|_| 0),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(error = %e, "covrelay failed");
            ExitCode::from(FATAL_EXIT_CODE)
        }
    }
}
