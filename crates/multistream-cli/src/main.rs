#![forbid(unsafe_code)]

fn main() {
    multistream_cli::logging::init();
    if let Err(error) = multistream_cli::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
