//! Preparation pipeline for property-based fuzzing of Solidity contracts.
//!
//! [`load`] turns a source file into everything the fuzzing engine needs to
//! start: compile, pick a contract, split its ABI into invariant tests and
//! transaction targets, mine integer literals as input seeds, and deploy the
//! contract into an initial EVM state.

pub mod abi;
pub mod compile;
pub mod config;
pub mod constants;
pub mod deploy;
pub mod error;
pub mod types;

pub use abi::Classification;
pub use config::CompilationConfig;
pub use deploy::{EvmState, check_deployed};
pub use error::LoadError;
pub use types::{AbiEntry, CompiledContract};

use alloy_primitives::I256;
use std::path::Path;

/// Everything a load produces. The caller owns all of it; the pipeline keeps
/// nothing.
#[derive(Debug)]
pub struct Loaded {
    /// Post-constructor execution state with the contract installed at the
    /// configured address.
    pub state: EvmState,
    /// The selected contract, with ABI, bytecode and syntax tree.
    pub contract: CompiledContract,
    /// Ordinary transaction targets, in ABI order.
    pub functions: Vec<AbiEntry>,
    /// Names of the prefix-matched, argument-free invariant tests.
    pub tests: Vec<String>,
    /// Integer literals mined from the syntax tree, duplicates preserved.
    pub constants: Vec<I256>,
}

/// Prepare one contract for fuzzing.
///
/// Compiles `path`, selects `target` (or the first contract), classifies the
/// ABI against `cfg.prefix`, mines seed constants, and deploys. Any failure
/// is fatal to this load; nothing is retried and no partial result escapes.
pub fn load(
    path: &Path,
    target: Option<&str>,
    cfg: &CompilationConfig,
) -> Result<Loaded, LoadError> {
    let contracts = compile::compile(path, &cfg.solc_args)?;
    let contract = compile::select_contract(&contracts, target)?.clone();

    let classification = abi::classify(&contract.functions, &cfg.prefix)?;
    let constants = constants::extract_constants(&contract.ast);
    let state = deploy::deploy(&contract, cfg)?;

    Ok(Loaded {
        state,
        tests: classification.tests.into_iter().map(|t| t.name).collect(),
        functions: classification.functions,
        constants,
        contract,
    })
}
