use alloy_primitives::Address;

/// Everything that can go wrong while preparing a contract for fuzzing.
///
/// Every variant is fatal to the current load: callers get exactly one of
/// these and must not proceed with a partially validated contract.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("no contract code at address {0}")]
    BadAddr(Address),
    #[error("couldn't compile the given file")]
    CompileFailure,
    #[error("compiler output contained no contracts")]
    NoContracts,
    #[error("couldn't find contract {0}")]
    ContractNotFound(String),
    #[error("contract {0} has no creation bytecode")]
    NoBytecode(String),
    #[error("abi is empty, nothing to analyze")]
    NoFuncs,
    #[error("no tests found in abi")]
    NoTests,
    #[error("only tests found in abi, nothing to fuzz")]
    OnlyTests,
    #[error("test {0} declares arguments, tests must take none")]
    TestArgsFound(String),
    #[error("deployment failed: {0}")]
    Deploy(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
