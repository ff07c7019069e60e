// Wasmer-facing side of the driver: loading, export resolution and memory reads

pub mod exports;
pub mod loader;
pub mod memory_utils;
