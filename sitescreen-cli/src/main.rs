//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    pretty_env_logger::init();
    match sitescreen_cli::run() {
        Ok(()) => {}
        Err(err) if err.is_warning() => eprintln!("sitescreen: warning: {err}"),
        Err(err) => {
            eprintln!("sitescreen: {err}");
            std::process::exit(1);
        }
    }
}
