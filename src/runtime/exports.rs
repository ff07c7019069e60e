//! Typed access to the module's export surface.
//!
//! Every export the driver relies on is looked up once, right after instantiation,
//! and checked for kind and signature. Anything missing or mistyped fails the run
//! there with a contract error instead of surfacing later at the first call.

use crate::driver::EncoderModule;
use crate::driver_messages::driver_errors::DriverError;
use crate::runtime::loader::ModuleInstance;
use crate::runtime::memory_utils::{EncodedRange, read_encoded_range};
use crate::settings::{
    BOOL_SET_FALSE_EXPORT, BOOL_SET_TRUE_EXPORT, ENCODE_EXPORT, INTEGER_SET_EXPORT,
    INTEGER_VALUE_EXPORT, MEMORY_EXPORT, OFFSET_EXPORT, REAL_SET_EXPORT,
};
use crate::{export_log, return_contract_error, return_export_call_error};
use wasmer::{Extern, Function, FunctionType, Instance, Memory, Store, Type, Value};

pub const RESOLVING_STAGE: &str = "resolving module exports";

/// What an export is allowed to return
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultShape {
    // Setters may return nothing, or an i32 status where negative means failure
    StatusOrNothing,
    Exactly(Type),
}

/// Expected signature of one exported function
#[derive(Debug, Clone, Copy)]
pub struct FunctionContract {
    pub name: &'static str,
    pub params: &'static [Type],
    pub results: ResultShape,

    // Used in error messages
    pub signature: &'static str,
}

impl FunctionContract {
    pub fn accepts(&self, ty: &FunctionType) -> bool {
        if ty.params() != self.params {
            return false;
        }

        match self.results {
            ResultShape::StatusOrNothing => {
                ty.results().is_empty() || ty.results() == [Type::I32]
            }
            ResultShape::Exactly(result) => ty.results() == [result],
        }
    }
}

pub const INTEGER_SET: FunctionContract = FunctionContract {
    name: INTEGER_SET_EXPORT,
    params: &[Type::I64],
    results: ResultShape::StatusOrNothing,
    signature: "function (i64) -> [] or (i64) -> i32",
};

pub const REAL_SET: FunctionContract = FunctionContract {
    name: REAL_SET_EXPORT,
    params: &[Type::F64],
    results: ResultShape::StatusOrNothing,
    signature: "function (f64) -> [] or (f64) -> i32",
};

pub const BOOL_SET_TRUE: FunctionContract = FunctionContract {
    name: BOOL_SET_TRUE_EXPORT,
    params: &[],
    results: ResultShape::StatusOrNothing,
    signature: "function () -> [] or () -> i32",
};

pub const BOOL_SET_FALSE: FunctionContract = FunctionContract {
    name: BOOL_SET_FALSE_EXPORT,
    params: &[],
    results: ResultShape::StatusOrNothing,
    signature: "function () -> [] or () -> i32",
};

pub const INTEGER_VALUE: FunctionContract = FunctionContract {
    name: INTEGER_VALUE_EXPORT,
    params: &[],
    results: ResultShape::Exactly(Type::I64),
    signature: "function () -> i64",
};

pub const ENCODE: FunctionContract = FunctionContract {
    name: ENCODE_EXPORT,
    params: &[],
    results: ResultShape::Exactly(Type::I32),
    signature: "function () -> i32",
};

pub const OFFSET: FunctionContract = FunctionContract {
    name: OFFSET_EXPORT,
    params: &[],
    results: ResultShape::Exactly(Type::I32),
    signature: "function () -> i32",
};

/// A function export that passed its contract check
#[derive(Clone)]
pub struct ExportedFunction {
    pub name: &'static str,
    pub function: Function,
}

impl ExportedFunction {
    fn call(&self, store: &mut Store, args: &[Value]) -> Result<Box<[Value]>, DriverError> {
        export_log!("Calling '{}' with {:?}", self.name, args);

        self.function.call(store, args).map_err(|e| {
            DriverError::export_call_error(format!("'{}' trapped: {e}", self.name), self.name)
        })
    }

    /// Calls a setter. A negative status is a failure inside the module.
    pub fn call_setter(&self, store: &mut Store, args: &[Value]) -> Result<(), DriverError> {
        let results = self.call(store, args)?;

        match results.first() {
            Some(Value::I32(status)) if *status < 0 => return_export_call_error!(
                format!("'{}' reported failure status {}", self.name, status),
                self.name
            ),
            _ => Ok(()),
        }
    }

    /// Calls a no-argument export returning a single i32
    pub fn call_i32(&self, store: &mut Store) -> Result<i32, DriverError> {
        let results = self.call(store, &[])?;

        match results.first() {
            Some(Value::I32(value)) => Ok(*value),
            other => return_export_call_error!(
                format!("'{}' returned {:?} instead of an i32", self.name, other),
                self.name
            ),
        }
    }
}

/// The full export surface, resolved and type checked
#[derive(Clone)]
pub struct ModuleExports {
    pub memory: Memory,
    pub integer_set: ExportedFunction,
    pub real_set: ExportedFunction,
    pub bool_set_true: ExportedFunction,
    pub bool_set_false: ExportedFunction,

    // Resolved so a module without it is rejected, never called
    pub integer_value: ExportedFunction,

    pub encode: ExportedFunction,
    pub offset: ExportedFunction,
}

impl ModuleExports {
    pub fn resolve(store: &Store, instance: &Instance) -> Result<Self, DriverError> {
        let resolve_all = || -> Result<Self, DriverError> {
            Ok(ModuleExports {
                memory: resolve_memory(instance, MEMORY_EXPORT)?,
                integer_set: resolve_function(store, instance, &INTEGER_SET)?,
                real_set: resolve_function(store, instance, &REAL_SET)?,
                bool_set_true: resolve_function(store, instance, &BOOL_SET_TRUE)?,
                bool_set_false: resolve_function(store, instance, &BOOL_SET_FALSE)?,
                integer_value: resolve_function(store, instance, &INTEGER_VALUE)?,
                encode: resolve_function(store, instance, &ENCODE)?,
                offset: resolve_function(store, instance, &OFFSET)?,
            })
        };

        let exports = resolve_all().map_err(|e| e.with_stage(RESOLVING_STAGE))?;
        export_log!("Resolved all exports");
        Ok(exports)
    }
}

fn extern_kind(export: &Extern) -> &'static str {
    match export {
        Extern::Function(_) => "function",
        Extern::Memory(_) => "memory",
        Extern::Global(_) => "global",
        Extern::Table(_) => "table",
        #[allow(unreachable_patterns)]
        _ => "another kind of export",
    }
}

pub fn resolve_memory(instance: &Instance, name: &'static str) -> Result<Memory, DriverError> {
    match instance.exports.get_extern(name) {
        Some(Extern::Memory(memory)) => Ok(memory.clone()),
        Some(other) => return_contract_error!(
            format!("Export '{name}' is not a linear memory"),
            name,
            {
                ExpectedKind => "memory",
                FoundKind => extern_kind(other),
            }
        ),
        None => return_contract_error!(
            format!("Module does not export '{name}'"),
            name,
            {
                ExpectedKind => "memory",
                FoundKind => "nothing",
            }
        ),
    }
}

pub fn resolve_function(
    store: &Store,
    instance: &Instance,
    contract: &FunctionContract,
) -> Result<ExportedFunction, DriverError> {
    let name = contract.name;

    let function = match instance.exports.get_extern(name) {
        Some(Extern::Function(function)) => function,
        Some(other) => return_contract_error!(
            format!("Export '{name}' is not a function"),
            name,
            {
                ExpectedKind => contract.signature,
                FoundKind => extern_kind(other),
            }
        ),
        None => return_contract_error!(
            format!("Module does not export '{name}'"),
            name,
            {
                ExpectedKind => contract.signature,
                FoundKind => "nothing",
            }
        ),
    };

    let ty = function.ty(store);
    if !contract.accepts(&ty) {
        return_contract_error!(
            format!(
                "Export '{name}' has signature {:?} -> {:?}",
                ty.params(),
                ty.results()
            ),
            name,
            {
                ExpectedKind => contract.signature,
                FoundKind => "function with a different signature",
            }
        );
    }

    export_log!("Resolved '{}' as {:?}", name, ty);
    Ok(ExportedFunction {
        name,
        function: function.clone(),
    })
}

/// Wasmer-backed encoder: one instance, its store, and its resolved exports
pub struct WasmEncoder {
    store: Store,
    exports: ModuleExports,
}

impl WasmEncoder {
    /// Resolves the export surface of a freshly created instance
    pub fn new(instance: ModuleInstance) -> Result<Self, DriverError> {
        let ModuleInstance { store, instance } = instance;
        let exports = ModuleExports::resolve(&store, &instance)?;

        Ok(WasmEncoder { store, exports })
    }

    pub fn exports(&self) -> &ModuleExports {
        &self.exports
    }
}

impl EncoderModule for WasmEncoder {
    fn set_integer(&mut self, value: i64) -> Result<(), DriverError> {
        self.exports
            .integer_set
            .call_setter(&mut self.store, &[Value::I64(value)])
    }

    fn set_real(&mut self, value: f64) -> Result<(), DriverError> {
        self.exports
            .real_set
            .call_setter(&mut self.store, &[Value::F64(value)])
    }

    fn set_bool_true(&mut self) -> Result<(), DriverError> {
        self.exports.bool_set_true.call_setter(&mut self.store, &[])
    }

    fn set_bool_false(&mut self) -> Result<(), DriverError> {
        self.exports.bool_set_false.call_setter(&mut self.store, &[])
    }

    fn encode(&mut self) -> Result<u32, DriverError> {
        let length = self.exports.encode.call_i32(&mut self.store)?;
        if length < 0 {
            return_export_call_error!(
                format!("'{ENCODE_EXPORT}' reported failure status {length}"),
                ENCODE_EXPORT
            );
        }

        Ok(length as u32)
    }

    fn offset(&mut self) -> Result<u32, DriverError> {
        // A wasm32 pointer, so reinterpret rather than reject the sign bit
        let offset = self.exports.offset.call_i32(&mut self.store)?;
        Ok(offset as u32)
    }

    fn read_encoded(&self, range: EncodedRange) -> Result<Vec<u8>, DriverError> {
        let view = self.exports.memory.view(&self.store);
        read_encoded_range(&view, range)
    }
}
