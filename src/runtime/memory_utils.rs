// Reading the encoded bytes back out of linear memory.
//
// The range comes from the module itself, so it is bounds checked against the
// current memory size before anything is read.

use crate::driver_messages::driver_errors::DriverError;
use crate::memory_log;
use wasmer::MemoryView;

/// Where the module left its encoding: `[offset, offset + length)`.
/// Only meaningful right after the encode call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedRange {
    pub offset: u32,
    pub length: u32,
}

impl EncodedRange {
    pub fn new(offset: u32, length: u32) -> Self {
        EncodedRange { offset, length }
    }

    /// Exclusive end of the range, or an error if it doesn't fit in 32 bits
    pub fn end(&self) -> Result<u64, DriverError> {
        match self.offset.checked_add(self.length) {
            Some(end) => Ok(end as u64),
            None => Err(DriverError::memory_access_error(format!(
                "Encoded range overflows: offset={}, length={}",
                self.offset, self.length
            ))),
        }
    }
}

/// Checks that the range lies inside a memory of `memory_size` bytes
pub fn validate_memory_range(range: EncodedRange, memory_size: u64) -> Result<(), DriverError> {
    let end = range.end()?;

    if range.length == 0 {
        return Ok(());
    }

    if end > memory_size {
        return Err(DriverError::memory_access_error(format!(
            "Encoded range out of bounds: {}..{}, memory size is {}",
            range.offset, end, memory_size
        )));
    }

    Ok(())
}

/// Copies the encoded range out of the memory view
pub fn read_encoded_range(memory: &MemoryView, range: EncodedRange) -> Result<Vec<u8>, DriverError> {
    let memory_size = memory.data_size();
    validate_memory_range(range, memory_size)?;

    let mut bytes = vec![0u8; range.length as usize];
    if bytes.is_empty() {
        return Ok(bytes);
    }

    memory.read(range.offset as u64, &mut bytes).map_err(|e| {
        DriverError::memory_access_error(format!(
            "Failed to read encoded bytes at {}: {}",
            range.offset, e
        ))
    })?;

    memory_log!(
        "Read {} encoded bytes at offset {} (memory size {})",
        range.length,
        range.offset,
        memory_size
    );

    Ok(bytes)
}

#[cfg(test)]
#[path = "tests/memory_utils_tests.rs"]
mod tests;
