// src/main.rs

use monobuild::config::ci_from_env;
use monobuild::{cli, exit_code, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level, ci_from_env()) {
        eprintln!("monobuild error: {err:?}");
        std::process::exit(2);
    }

    let result = run(args).await;
    if let Err(err) = &result {
        eprintln!("monobuild error: {err}");
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
    }
    std::process::exit(exit_code(&result));
}
