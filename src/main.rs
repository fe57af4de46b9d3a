// src/main.rs

use ursm_launch::errors::EXIT_IO;
use ursm_launch::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("ursm-launch error: {err:?}");
        std::process::exit(EXIT_IO);
    }

    // The environment is read once, here; nothing below looks at it.
    let env = std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)));

    match run(args, env).await {
        Ok(_) => {}
        Err(err) => {
            eprintln!("ursm-launch error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}
