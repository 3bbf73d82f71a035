mod args;

use std::error::Error;
use std::process::ExitCode;

use argh::FromArgs;
use args::{usage, Args};

/// Log warnings by default; verbose runs log timing and progress of the transform.
fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Warn);
    if verbose {
        builder.filter_module("lastrans", log::LevelFilter::Debug);
    }
    builder.parse_default_env().init();
}

/// Format an error followed by its chain of causes.
fn report(err: &dyn Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    msg
}

fn main() -> ExitCode {
    let argv = std::env::args().collect::<Vec<_>>();
    let command_name = argv.first().map(String::as_str).unwrap_or("lastrans");
    let rest = argv.iter().skip(1).map(String::as_str).collect::<Vec<_>>();

    // help and parse errors both end the run with a failure status
    let args = match Args::from_args(&[command_name], &rest) {
        Ok(args) => args,
        Err(early_exit) => {
            eprintln!("{}", early_exit.output);
            return ExitCode::FAILURE;
        }
    };

    init_logger(args.verbose);

    let job = match args.into_job() {
        Ok(job) => job,
        Err(err) => {
            eprintln!("ERROR: {err}");
            eprintln!("{}", usage(command_name));
            return ExitCode::FAILURE;
        }
    };

    match job.run() {
        Ok(summary) => {
            log::info!(
                "transformed {} points in {:.3} sec",
                summary.points,
                summary.elapsed.as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", report(&err));
            ExitCode::FAILURE
        }
    }
}
