use std::process::ExitCode;

fn main() -> ExitCode {
    rentbot_cli::run()
}
