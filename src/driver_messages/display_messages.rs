use crate::driver_messages::driver_errors::{
    DriverError, ErrorMetaDataKey, ErrorType, error_type_to_str,
};
use colour::{e_dark_magenta, e_dark_yellow_ln, e_magenta_ln, e_red_ln, e_red_ln_bold, e_yellow, e_yellow_ln};

/// Prints a failed run to stderr.
/// Stdout is reserved for the encoded bytes, so nothing here may touch it.
pub fn print_driver_error(e: &DriverError) {
    e_red_ln_bold!("\n{}", error_type_to_str(&e.error_type));

    if let Some(stage) = e.stage() {
        e_dark_magenta!("While ");
        e_magenta_ln!("{}", stage);
    }

    match e.error_type {
        ErrorType::File => {
            if let Some(path) = &e.path {
                e_yellow!("Can't find/read module file: ");
                e_yellow_ln!("{}", path.display());
            }
        }

        ErrorType::Contract => {
            if let Some(name) = e.metadata.get(&ErrorMetaDataKey::ExportName) {
                e_yellow!("Export: ");
                e_yellow_ln!("{}", name);
            }
            if let (Some(expected), Some(found)) = (
                e.metadata.get(&ErrorMetaDataKey::ExpectedKind),
                e.metadata.get(&ErrorMetaDataKey::FoundKind),
            ) {
                e_dark_yellow_ln!("expected {}, found {}", expected, found);
            }
        }

        ErrorType::ExportCall => {
            if let Some(name) = e.metadata.get(&ErrorMetaDataKey::ExportName) {
                e_yellow!("Inside export: ");
                e_yellow_ln!("{}", name);
            }
        }

        ErrorType::Validation
        | ErrorType::Instantiation
        | ErrorType::MemoryAccess
        | ErrorType::Output => {}
    }

    e_red_ln!("{}", e.msg);

    if let Some(suggestion) = e.metadata.get(&ErrorMetaDataKey::PrimarySuggestion) {
        e_dark_yellow_ln!("{}", suggestion);
    }
}
