use alloy_json_abi::JsonAbi;
use serde_json::Value;

/// One contract out of a compiled source file.
///
/// `name` is the fully-qualified `<file>:<ContractName>` key solc reports.
/// `functions` mirrors `abi` but preserves the compiler's entry order, which
/// the classifier depends on; `ast` is the source file's syntax tree as
/// emitted by solc.
#[derive(Debug, Clone)]
pub struct CompiledContract {
    pub name: String,
    pub abi: JsonAbi,
    pub functions: Vec<AbiEntry>,
    pub bytecode: Vec<u8>,
    pub runtime_bytecode: Vec<u8>,
    pub ast: Value,
}

/// A callable ABI function: name plus ordered input type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiEntry {
    pub name: String,
    pub inputs: Vec<String>,
}

impl AbiEntry {
    pub fn new(name: impl Into<String>, inputs: &[&str]) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
        }
    }
}
