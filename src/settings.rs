use std::path::PathBuf;

/// Module loaded from the current working directory
pub const MODULE_PATH: &str = "./rs_choice2asn1.wasm";

// Values written into the module before encoding
pub const INTEGER_FIELD_VALUE: i64 = 42;
pub const REAL_FIELD_VALUE: f64 = 42.0;

// Export surface the module must provide
pub const MEMORY_EXPORT: &str = "memory";
pub const INTEGER_SET_EXPORT: &str = "integer_set";
pub const REAL_SET_EXPORT: &str = "real_set";
pub const BOOL_SET_TRUE_EXPORT: &str = "bool_set_true";
pub const BOOL_SET_FALSE_EXPORT: &str = "bool_set_false";
pub const INTEGER_VALUE_EXPORT: &str = "integer_value";
pub const ENCODE_EXPORT: &str = "encode";
pub const OFFSET_EXPORT: &str = "offset";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldValues {
    pub integer: i64,
    pub real: f64,
}

impl Default for FieldValues {
    fn default() -> Self {
        FieldValues {
            integer: INTEGER_FIELD_VALUE,
            real: REAL_FIELD_VALUE,
        }
    }
}

/// Everything a run needs. The binary only ever uses the default,
/// tests point it at fixture modules.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub module_path: PathBuf,
    pub fields: FieldValues,
}

impl DriverConfig {
    pub fn new(module_path: impl Into<PathBuf>) -> Self {
        DriverConfig {
            module_path: module_path.into(),
            fields: FieldValues::default(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig::new(MODULE_PATH)
    }
}
