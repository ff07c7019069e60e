//! Fixture modules for the integration tests, built with wasm-encoder.
//!
//! The default fixture mirrors the real encoder's export surface: i32 status
//! returns from the setters, `encode` returning the length and `offset`
//! returning where a data segment put the encoded bytes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use wasm_encoder::{
    CodeSection, ConstExpr, DataSection, ExportKind, ExportSection, Function, FunctionSection,
    Instruction, MemorySection, MemoryType, Module, StartSection, TypeSection, ValType,
};

// Ten bytes of DER: SEQUENCE { INTEGER 42, BOOLEAN FALSE, NULL }
pub const KNOWN_ENCODING: [u8; 10] = [0x30, 0x08, 0x02, 0x01, 0x2A, 0x01, 0x01, 0x00, 0x05, 0x00];

// Type indices
const SET_I64: u32 = 0;
const SET_F64: u32 = 1;
const NO_ARGS_I32: u32 = 2;
const NO_ARGS_I64: u32 = 3;
const NO_ARGS_VOID: u32 = 4;
const SET_I64_VOID: u32 = 5;
const SET_F64_VOID: u32 = 6;

pub struct FixtureModule {
    pub encoded: Vec<u8>,
    pub offset: u32,
    pub reported_length: Option<i32>,
    pub setter_status: i32,
    pub void_setters: bool,
    pub trapping_start: bool,
    pub omitted: Vec<&'static str>,
    pub aliases: Vec<(&'static str, &'static str)>,
}

impl FixtureModule {
    pub fn new(encoded: &[u8], offset: u32) -> Self {
        FixtureModule {
            encoded: encoded.to_vec(),
            offset,
            reported_length: None,
            setter_status: 0,
            void_setters: false,
            trapping_start: false,
            omitted: Vec::new(),
            aliases: Vec::new(),
        }
    }

    pub fn known() -> Self {
        FixtureModule::new(&KNOWN_ENCODING, 0)
    }

    pub fn without_export(mut self, name: &'static str) -> Self {
        self.omitted.push(name);
        self
    }

    /// Also exports the function `from` under the name `alias`
    pub fn with_alias(mut self, from: &'static str, alias: &'static str) -> Self {
        self.aliases.push((from, alias));
        self
    }

    pub fn reporting_length(mut self, length: i32) -> Self {
        self.reported_length = Some(length);
        self
    }

    pub fn with_setter_status(mut self, status: i32) -> Self {
        self.setter_status = status;
        self
    }

    pub fn with_void_setters(mut self) -> Self {
        self.void_setters = true;
        self
    }

    pub fn with_trapping_start(mut self) -> Self {
        self.trapping_start = true;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut module = Module::new();

        let mut types = TypeSection::new();
        types.ty().function(vec![ValType::I64], vec![ValType::I32]);
        types.ty().function(vec![ValType::F64], vec![ValType::I32]);
        types.ty().function(vec![], vec![ValType::I32]);
        types.ty().function(vec![], vec![ValType::I64]);
        types.ty().function(vec![], vec![]);
        types.ty().function(vec![ValType::I64], vec![]);
        types.ty().function(vec![ValType::F64], vec![]);
        module.section(&types);

        let (int_type, real_type, bool_type) = if self.void_setters {
            (SET_I64_VOID, SET_F64_VOID, NO_ARGS_VOID)
        } else {
            (SET_I64, SET_F64, NO_ARGS_I32)
        };

        // Function indices follow this order
        let signatures = [
            ("integer_set", int_type),
            ("real_set", real_type),
            ("bool_set_true", bool_type),
            ("bool_set_false", bool_type),
            ("integer_value", NO_ARGS_I64),
            ("encode", NO_ARGS_I32),
            ("offset", NO_ARGS_I32),
            ("start", NO_ARGS_VOID),
        ];

        let mut functions = FunctionSection::new();
        for (_, type_index) in signatures {
            functions.function(type_index);
        }
        module.section(&functions);

        let mut memories = MemorySection::new();
        memories.memory(MemoryType {
            minimum: 1,
            maximum: None,
            memory64: false,
            shared: false,
            page_size_log2: None,
        });
        module.section(&memories);

        let mut exports = ExportSection::new();
        if !self.omitted.contains(&"memory") {
            exports.export("memory", ExportKind::Memory, 0);
        }
        for (index, (name, _)) in signatures.iter().enumerate() {
            if *name == "start" || self.omitted.contains(name) {
                continue;
            }
            exports.export(name, ExportKind::Func, index as u32);
        }
        for (from, alias) in &self.aliases {
            if let Some(index) = signatures.iter().position(|(name, _)| name == from) {
                exports.export(alias, ExportKind::Func, index as u32);
            }
        }
        module.section(&exports);

        if self.trapping_start {
            module.section(&StartSection { function_index: 7 });
        }

        let mut codes = CodeSection::new();
        for (name, type_index) in signatures {
            let mut body = Function::new(Vec::new());
            match name {
                "integer_value" => {
                    body.instruction(&Instruction::I64Const(42));
                }
                "encode" => {
                    let length = self
                        .reported_length
                        .unwrap_or(self.encoded.len() as i32);
                    body.instruction(&Instruction::I32Const(length));
                }
                "offset" => {
                    body.instruction(&Instruction::I32Const(self.offset as i32));
                }
                "start" => {
                    if self.trapping_start {
                        body.instruction(&Instruction::Unreachable);
                    }
                }
                _ => {
                    if type_index != NO_ARGS_VOID
                        && type_index != SET_I64_VOID
                        && type_index != SET_F64_VOID
                    {
                        body.instruction(&Instruction::I32Const(self.setter_status));
                    }
                }
            }
            body.instruction(&Instruction::End);
            codes.function(&body);
        }
        module.section(&codes);

        let mut data = DataSection::new();
        data.active(
            0,
            &ConstExpr::i32_const(self.offset as i32),
            self.encoded.iter().copied(),
        );
        module.section(&data);

        module.finish()
    }

    /// Builds the module and writes it into `dir` under `file_name`
    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).expect("fixture module should be writable");
        path
    }
}
