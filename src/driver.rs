//! The module driver.
//!
//! Loading (file -> compile -> instantiate) is one deferred computation, started once.
//! Everything after that is plain synchronous calls against the resolved exports:
//! set the fields, encode, read the encoded range back, write it to the sink.

use crate::driver_messages::driver_errors::DriverError;
use crate::runtime::exports::WasmEncoder;
use crate::runtime::loader::{COMPILING_STAGE, INSTANTIATING_STAGE, READING_STAGE, load_instance};
use crate::runtime::memory_utils::EncodedRange;
use crate::settings::{DriverConfig, FieldValues};
use crate::{memory_log, pipeline_log, timer_log};
use std::io::Write;
use std::time::Instant;

pub const SETTING_FIELDS_STAGE: &str = "setting the fields";
pub const ENCODING_STAGE: &str = "encoding";
pub const WRITING_STAGE: &str = "writing the encoded bytes";

/// The operations the driver needs from a module instance.
/// Implemented over wasmer by `WasmEncoder`, and by recording mocks in tests.
pub trait EncoderModule {
    fn set_integer(&mut self, value: i64) -> Result<(), DriverError>;
    fn set_real(&mut self, value: f64) -> Result<(), DriverError>;
    fn set_bool_true(&mut self) -> Result<(), DriverError>;
    fn set_bool_false(&mut self) -> Result<(), DriverError>;

    /// Encodes the current value, returning the length in bytes
    fn encode(&mut self) -> Result<u32, DriverError>;

    /// Where the last encoding starts in linear memory
    fn offset(&mut self) -> Result<u32, DriverError>;

    fn read_encoded(&self, range: EncodedRange) -> Result<Vec<u8>, DriverError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Unstarted,
    FileRead,
    Compiled,
    Instantiated,
    FieldsSet,
    Encoded,
    Written,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn next(self) -> PipelineStage {
        match self {
            PipelineStage::Unstarted => PipelineStage::FileRead,
            PipelineStage::FileRead => PipelineStage::Compiled,
            PipelineStage::Compiled => PipelineStage::Instantiated,
            PipelineStage::Instantiated => PipelineStage::FieldsSet,
            PipelineStage::FieldsSet => PipelineStage::Encoded,
            PipelineStage::Encoded => PipelineStage::Written,
            PipelineStage::Written => PipelineStage::Done,
            PipelineStage::Done => PipelineStage::Done,
            PipelineStage::Failed => PipelineStage::Failed,
        }
    }

    /// What is being attempted while the pipeline sits at this stage
    pub fn attempting(self) -> &'static str {
        match self {
            PipelineStage::Unstarted => READING_STAGE,
            PipelineStage::FileRead => COMPILING_STAGE,
            PipelineStage::Compiled => INSTANTIATING_STAGE,
            PipelineStage::Instantiated => SETTING_FIELDS_STAGE,
            PipelineStage::FieldsSet => ENCODING_STAGE,
            PipelineStage::Encoded => WRITING_STAGE,
            PipelineStage::Written => "finishing",
            PipelineStage::Done => "nothing (already done)",
            PipelineStage::Failed => "nothing (already failed)",
        }
    }
}

/// Tracks where a run is. Any failure moves it to `Failed` for good.
#[derive(Debug)]
pub struct Pipeline {
    stage: PipelineStage,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline::starting_at(PipelineStage::Unstarted)
    }

    pub fn starting_at(stage: PipelineStage) -> Self {
        Pipeline { stage }
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Steps forward through every stage up to and including `target`
    pub fn advance_to(&mut self, target: PipelineStage) {
        while self.stage != target
            && self.stage != PipelineStage::Done
            && self.stage != PipelineStage::Failed
        {
            let next = self.stage.next();
            pipeline_log!("{:?} -> {:?}", self.stage, next);
            self.stage = next;
        }
    }

    /// Marks the run as failed and tags the error with what was being attempted
    pub fn fail(&mut self, error: DriverError) -> DriverError {
        let error = error.with_stage(self.stage.attempting());
        pipeline_log!("{:?} -> Failed", self.stage);
        self.stage = PipelineStage::Failed;
        error
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new()
    }
}

/// Writes the field values in their fixed order.
///
/// `bool_set_false` straight after `bool_set_true` is intentional call order,
/// both calls always happen.
pub fn populate_fields<M: EncoderModule>(
    module: &mut M,
    fields: &FieldValues,
) -> Result<(), DriverError> {
    module.set_integer(fields.integer)?;
    module.set_real(fields.real)?;
    module.set_bool_true()?;
    module.set_bool_false()?;
    Ok(())
}

/// Encodes, then asks where the encoding landed
pub fn encode_fields<M: EncoderModule>(module: &mut M) -> Result<EncodedRange, DriverError> {
    let length = module.encode()?;
    let offset = module.offset()?;

    memory_log!("Encoded {} bytes at offset {}", length, offset);
    Ok(EncodedRange::new(offset, length))
}

/// Writes the bytes verbatim. No framing and no trailing newline.
pub fn write_encoded<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<(), DriverError> {
    sink.write_all(bytes)
        .and_then(|_| sink.flush())
        .map_err(|e| DriverError::output_error(format!("Failed to write encoded bytes: {e}")))
}

/// Everything after instantiation: set, encode, read back, write.
/// The pipeline must already be at `Instantiated`.
pub fn drive<M: EncoderModule, W: Write>(
    pipeline: &mut Pipeline,
    module: &mut M,
    fields: &FieldValues,
    sink: &mut W,
) -> Result<(), DriverError> {
    populate_fields(module, fields).map_err(|e| pipeline.fail(e))?;
    pipeline.advance_to(PipelineStage::FieldsSet);

    let range = encode_fields(module).map_err(|e| pipeline.fail(e))?;
    let bytes = module.read_encoded(range).map_err(|e| pipeline.fail(e))?;
    pipeline.advance_to(PipelineStage::Encoded);

    write_encoded(sink, &bytes).map_err(|e| pipeline.fail(e))?;
    pipeline.advance_to(PipelineStage::Written);

    Ok(())
}

/// One full run. Returns the final stage, which is always `Done` on success.
pub fn run_driver<W: Write>(
    config: &DriverConfig,
    sink: &mut W,
) -> Result<PipelineStage, DriverError> {
    let _time = Instant::now();
    let mut pipeline = Pipeline::new();

    let instance = load_instance(config.module_path.clone())
        .run_blocking()
        .map_err(|e| pipeline.fail(e))?;
    pipeline.advance_to(PipelineStage::Instantiated);
    timer_log!(_time, "Module loaded in: ");

    let mut encoder = WasmEncoder::new(instance).map_err(|e| pipeline.fail(e))?;
    drive(&mut pipeline, &mut encoder, &config.fields, sink)?;

    pipeline.advance_to(PipelineStage::Done);
    timer_log!(_time, "Driver finished in: ");
    Ok(pipeline.stage())
}

#[cfg(test)]
#[path = "tests/driver_tests.rs"]
mod tests;
