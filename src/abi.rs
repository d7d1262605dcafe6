use crate::error::LoadError;
use crate::types::AbiEntry;

/// ABI split into fuzz-invariant tests and ordinary transaction targets.
/// Every entry of the input lands in exactly one of the two lists, both in
/// ABI order.
#[derive(Debug, Clone)]
pub struct Classification {
    pub tests: Vec<AbiEntry>,
    pub functions: Vec<AbiEntry>,
}

/// Partition `entries` by the test-name prefix and validate the result.
///
/// An entry is a test iff its name literally starts with `prefix`
/// (case-sensitive). Tests must take no arguments; the first offender in ABI
/// order is reported.
pub fn classify(entries: &[AbiEntry], prefix: &str) -> Result<Classification, LoadError> {
    if entries.is_empty() {
        return Err(LoadError::NoFuncs);
    }

    let (tests, functions): (Vec<AbiEntry>, Vec<AbiEntry>) = entries
        .iter()
        .cloned()
        .partition(|e| e.name.starts_with(prefix));

    if functions.is_empty() {
        return Err(LoadError::OnlyTests);
    }
    if tests.is_empty() {
        return Err(LoadError::NoTests);
    }
    if let Some(bad) = tests.iter().find(|t| !t.inputs.is_empty()) {
        return Err(LoadError::TestArgsFound(bad.name.clone()));
    }

    Ok(Classification { tests, functions })
}
