use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
pub enum ErrorMetaDataKey {
    PipelineStage,

    // Export contract details
    ExportName,
    ExpectedKind,
    FoundKind,

    // Optional suggestion for the user
    PrimarySuggestion,
}

/// Every failure in the driver ends up as one of these.
/// There is no recoverable subset, the top level prints it and exits.
#[derive(Debug, Clone)]
pub struct DriverError {
    pub msg: String,
    pub error_type: ErrorType,

    // The module file involved, if the error came from reading or compiling it
    pub path: Option<PathBuf>,

    pub metadata: HashMap<ErrorMetaDataKey, &'static str>,
}

impl DriverError {
    pub fn new(msg: impl Into<String>, error_type: ErrorType) -> DriverError {
        DriverError {
            msg: msg.into(),
            error_type,
            path: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }

    /// Records the pipeline stage that was being attempted.
    /// Keeps the first stage written, so inner steps win over outer wrappers.
    pub fn with_stage(mut self, stage: &'static str) -> Self {
        self.metadata
            .entry(ErrorMetaDataKey::PipelineStage)
            .or_insert(stage);
        self
    }

    pub fn with_metadata(mut self, key: ErrorMetaDataKey, value: &'static str) -> Self {
        self.metadata.insert(key, value);
        self
    }

    pub fn stage(&self) -> Option<&'static str> {
        self.metadata.get(&ErrorMetaDataKey::PipelineStage).copied()
    }

    /// The module file could not be read
    pub fn file_error(path: &Path, msg: impl Into<String>) -> Self {
        DriverError::new(msg, ErrorType::File).with_path(path)
    }

    /// The bytes are not a well-formed module
    pub fn validation_error(msg: impl Into<String>) -> Self {
        DriverError::new(msg, ErrorType::Validation)
    }

    pub fn instantiation_error(msg: impl Into<String>) -> Self {
        DriverError::new(msg, ErrorType::Instantiation)
    }

    /// An expected export is missing, has the wrong kind or the wrong signature
    pub fn contract_error(msg: impl Into<String>, export_name: &'static str) -> Self {
        DriverError::new(msg, ErrorType::Contract)
            .with_metadata(ErrorMetaDataKey::ExportName, export_name)
    }

    /// An export trapped or reported a failure status
    pub fn export_call_error(msg: impl Into<String>, export_name: &'static str) -> Self {
        DriverError::new(msg, ErrorType::ExportCall)
            .with_metadata(ErrorMetaDataKey::ExportName, export_name)
    }

    pub fn memory_access_error(msg: impl Into<String>) -> Self {
        DriverError::new(msg, ErrorType::MemoryAccess)
    }

    pub fn output_error(msg: impl Into<String>) -> Self {
        DriverError::new(msg, ErrorType::Output)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", error_type_to_str(&self.error_type), self.msg)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for DriverError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    File,
    Validation,
    Instantiation,
    Contract,
    ExportCall,
    MemoryAccess,
    Output,
}

pub fn error_type_to_str(e_type: &ErrorType) -> &'static str {
    match e_type {
        ErrorType::File => "File Error",
        ErrorType::Validation => "Invalid Module",
        ErrorType::Instantiation => "Instantiation Failed",
        ErrorType::Contract => "Export Contract Violation",
        ErrorType::ExportCall => "Export Call Failed",
        ErrorType::MemoryAccess => "Memory Access",
        ErrorType::Output => "Output Error",
    }
}

/// Returns a new DriverError for a broken export contract.
///
/// Usage:
/// `return_contract_error!("export 'encode' is missing", "encode", {
///     ExpectedKind => "function",
///     FoundKind => "nothing",
/// })`;
#[macro_export]
macro_rules! return_contract_error {
    ($msg:expr, $export:expr, { $( $key:ident => $value:expr ),* $(,)? }) => {
        return Err({
            let mut error = $crate::driver_messages::driver_errors::DriverError::contract_error(
                $msg, $export,
            );
            $(
                error.metadata.insert(
                    $crate::driver_messages::driver_errors::ErrorMetaDataKey::$key,
                    $value,
                );
            )*
            error
        })
    };
    ($msg:expr, $export:expr) => {
        return Err(
            $crate::driver_messages::driver_errors::DriverError::contract_error($msg, $export),
        )
    };
}

/// Returns a new DriverError for an export that trapped or reported failure.
///
/// Usage:
/// `return_export_call_error!(format!("encode returned {status}"), "encode")`;
#[macro_export]
macro_rules! return_export_call_error {
    ($msg:expr, $export:expr) => {
        return Err(
            $crate::driver_messages::driver_errors::DriverError::export_call_error($msg, $export),
        )
    };
}

#[cfg(test)]
#[path = "tests/driver_errors_tests.rs"]
mod tests;
