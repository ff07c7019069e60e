// Loading a module file into a live instance.
//
// Each step is a function from the previous step's value to a deferred computation,
// so the whole chain can be built up front and started once.

use crate::deferred::{IO, bind};
use crate::driver_messages::driver_errors::{DriverError, ErrorMetaDataKey};
use crate::{pipeline_log, timer_log};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;
use wasmer::{Engine, Instance, Module, Store, imports};

pub const READING_STAGE: &str = "reading the module file";
pub const COMPILING_STAGE: &str = "compiling the module";
pub const INSTANTIATING_STAGE: &str = "instantiating the module";

/// Validated module plus the engine it was compiled with
#[derive(Clone)]
pub struct CompiledModule {
    pub engine: Engine,
    pub module: Module,
}

/// A live instance. The store owns all of its state, including linear memory.
pub struct ModuleInstance {
    pub store: Store,
    pub instance: Instance,
}

/// Reads the whole module file into memory
pub fn filename_to_bytes(path: PathBuf) -> IO<Vec<u8>> {
    IO::new(move || {
        let path = path.clone();
        async move {
            let _time = Instant::now();
            let bytes = std::fs::read(&path).map_err(|e| {
                DriverError::file_error(&path, format!("Failed to read module file: {e}"))
                    .with_stage(READING_STAGE)
            })?;

            pipeline_log!("Read {} bytes from {}", bytes.len(), path.display());
            timer_log!(_time, "Module file read in: ");
            Ok(bytes)
        }
    })
}

/// Validates the bytes, then compiles them
pub fn bytes_to_module(bytes: Vec<u8>) -> IO<CompiledModule> {
    let bytes = Rc::new(bytes);

    IO::new(move || {
        let bytes = Rc::clone(&bytes);
        async move {
            let _time = Instant::now();

            // wasmparser gives a byte offset for malformed input, which the compiler error doesn't
            wasmparser::validate(bytes.as_slice()).map_err(|e| {
                DriverError::validation_error(format!(
                    "Module failed validation at byte {}: {}",
                    e.offset(),
                    e.message()
                ))
                .with_stage(COMPILING_STAGE)
                .with_metadata(
                    ErrorMetaDataKey::PrimarySuggestion,
                    "Check that the file is a WebAssembly binary and was not truncated",
                )
            })?;

            let store = Store::default();
            let module = Module::new(&store, bytes.as_slice()).map_err(|e| {
                DriverError::validation_error(format!("Failed to compile module: {e}"))
                    .with_stage(COMPILING_STAGE)
            })?;

            pipeline_log!("Compiled module ({} exports)", module.exports().count());
            timer_log!(_time, "Module compiled in: ");
            Ok(CompiledModule {
                engine: store.engine().clone(),
                module,
            })
        }
    })
}

/// Instantiates with no imports, so the module has to be self-contained
pub fn module_to_instance(compiled: CompiledModule) -> IO<ModuleInstance> {
    IO::new(move || {
        let CompiledModule { engine, module } = compiled.clone();
        async move {
            let _time = Instant::now();
            let mut store = Store::new(engine);
            let import_object = imports! {};
            let instance = Instance::new(&mut store, &module, &import_object).map_err(|e| {
                DriverError::instantiation_error(format!("Failed to instantiate module: {e}"))
                    .with_stage(INSTANTIATING_STAGE)
            })?;

            pipeline_log!("Instantiated module");
            timer_log!(_time, "Module instantiated in: ");
            Ok(ModuleInstance { store, instance })
        }
    })
}

/// The full load chain: file -> bytes -> compiled module -> instance
pub fn load_instance(module_path: PathBuf) -> IO<ModuleInstance> {
    let compiled = bind(filename_to_bytes(module_path), bytes_to_module);
    bind(compiled, module_to_instance)
}
