use std::process::ExitCode;

fn main() -> ExitCode {
    launcher::native::run()
}
