use choice2asn1_host::driver::run_driver;
use choice2asn1_host::driver_messages::display_messages::print_driver_error;
use choice2asn1_host::settings::DriverConfig;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = DriverConfig::default();

    // Stdout is the output sink, diagnostics go to stderr
    let stdout = io::stdout();
    let mut sink = stdout.lock();

    match run_driver(&config, &mut sink) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            print_driver_error(&e);
            ExitCode::FAILURE
        }
    }
}
