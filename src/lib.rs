pub mod deferred;
pub mod driver;
pub mod runtime;
pub mod settings;

pub mod driver_messages {
    pub mod driver_dev_logging;
    pub mod driver_errors;
    pub mod display_messages;
}

pub use deferred::{IO, bind, fail, of};
pub use driver::{EncoderModule, PipelineStage, run_driver};
pub use driver_messages::driver_errors::{DriverError, ErrorType};
pub use settings::DriverConfig;
