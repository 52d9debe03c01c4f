use std::process::ExitCode;

fn main() -> ExitCode {
    match adquick_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("adquick: {err:#}");
            ExitCode::FAILURE
        }
    }
}
