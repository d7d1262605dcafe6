use crate::config::CompilationConfig;
use crate::error::LoadError;
use crate::types::CompiledContract;
use alloy_primitives::{Address, Bytes, TxKind, U256};
use revm::context::TxEnv;
use revm::context_interface::result::{ExecutionResult, Output};
use revm::database::CacheDB;
use revm::database_interface::EmptyDB;
use revm::state::AccountInfo;
use revm::{ExecuteCommitEvm, MainBuilder, MainContext};

/// Post-deployment execution-environment state, handed to the fuzzing engine.
pub type EvmState = CacheDB<EmptyDB>;

// EIP-7825 caps a single transaction at 2^24 gas on the latest mainnet spec;
// anything above is rejected before execution.
const GAS_LIMIT: u64 = 16_777_216;

/// Deploy the selected contract into a fresh state.
///
/// Shapes a single contract-creation transaction (caller = configured
/// deployer, value 0, payload = creation bytecode) and commits it through the
/// execution engine; instruction-level semantics are entirely the engine's.
/// The created account is moved to the configured contract address so
/// downstream transactions target a fixed, known location.
pub fn deploy(contract: &CompiledContract, cfg: &CompilationConfig) -> Result<EvmState, LoadError> {
    if contract.bytecode.is_empty() {
        return Err(LoadError::NoBytecode(contract.name.clone()));
    }

    let db = initial_state(cfg);
    let ctx = revm::Context::mainnet().with_db(db);
    let mut evm = ctx.build_mainnet();

    let tx = TxEnv {
        caller: cfg.deployer,
        gas_limit: GAS_LIMIT,
        gas_price: 0,
        kind: TxKind::Create,
        value: U256::ZERO,
        data: Bytes::copy_from_slice(&contract.bytecode),
        nonce: 0,
        ..Default::default()
    };

    let result = evm
        .transact_commit(tx)
        .map_err(|e| LoadError::Deploy(format!("{e:?}")))?;

    match result {
        ExecutionResult::Success { output, .. } => match output {
            Output::Create(_, Some(created)) => {
                let mut db = evm.ctx.journaled_state.database;
                if created != cfg.contract_addr {
                    if let Some(account) = db.cache.accounts.remove(&created) {
                        db.cache.accounts.insert(cfg.contract_addr, account);
                    }
                }
                Ok(db)
            }
            Output::Create(_, None) => {
                Err(LoadError::Deploy("CREATE returned no address".into()))
            }
            Output::Call(_) => Err(LoadError::Deploy(
                "expected CREATE output, got CALL output".into(),
            )),
        },
        ExecutionResult::Revert { output, .. } => Err(LoadError::Deploy(format!(
            "constructor reverted: 0x{}",
            hex::encode(&output)
        ))),
        ExecutionResult::Halt { reason, .. } => {
            Err(LoadError::Deploy(format!("constructor halted: {reason:?}")))
        }
    }
}

/// Check that contract code actually exists at `addr`. Collaborators call
/// this against the load result before fuzzing the address.
pub fn check_deployed(state: &EvmState, addr: Address) -> Result<(), LoadError> {
    match state.cache.accounts.get(&addr) {
        Some(account) if !account.info.is_empty_code_hash() => Ok(()),
        _ => Err(LoadError::BadAddr(addr)),
    }
}

/// Fresh state with the deployer and every candidate sender funded.
fn initial_state(cfg: &CompilationConfig) -> EvmState {
    let mut db = CacheDB::new(EmptyDB::new());

    // 10,000 ETH each.
    let balance = U256::from(10_000u64) * U256::from(10u64).pow(U256::from(18u64));
    for addr in std::iter::once(&cfg.deployer).chain(cfg.sender.iter()) {
        db.insert_account_info(
            *addr,
            AccountInfo {
                balance,
                nonce: 0,
                ..Default::default()
            },
        );
    }

    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_json_abi::JsonAbi;
    use serde_json::Value;

    // Creation code that installs a 10-byte runtime returning 42.
    const RETURN_42: &str = "600a600c600039600a6000f3602a60005260206000f3";

    fn contract_with_bytecode(bytecode: Vec<u8>) -> CompiledContract {
        CompiledContract {
            name: "t.sol:Target".into(),
            abi: JsonAbi::default(),
            functions: Vec::new(),
            bytecode,
            runtime_bytecode: Vec::new(),
            ast: Value::Null,
        }
    }

    #[test]
    fn deploys_to_the_configured_address() {
        let cfg = CompilationConfig::default();
        let contract = contract_with_bytecode(hex::decode(RETURN_42).unwrap());

        let state = deploy(&contract, &cfg).unwrap();
        check_deployed(&state, cfg.contract_addr).unwrap();
    }

    #[test]
    fn empty_bytecode_is_rejected_before_execution() {
        let cfg = CompilationConfig::default();
        let contract = contract_with_bytecode(Vec::new());

        match deploy(&contract, &cfg) {
            Err(LoadError::NoBytecode(name)) => assert_eq!(name, "t.sol:Target"),
            other => panic!("expected NoBytecode, got {other:?}"),
        }
    }

    #[test]
    fn missing_code_is_bad_addr() {
        let cfg = CompilationConfig::default();
        let state = initial_state(&cfg);

        // The deployer account exists but carries no code.
        match check_deployed(&state, cfg.deployer) {
            Err(LoadError::BadAddr(addr)) => assert_eq!(addr, cfg.deployer),
            other => panic!("expected BadAddr, got {other:?}"),
        }
    }

    #[test]
    fn reverting_constructor_surfaces_as_deploy_error() {
        let cfg = CompilationConfig::default();
        // PUSH1 0 PUSH1 0 REVERT
        let contract = contract_with_bytecode(hex::decode("60006000fd").unwrap());

        assert!(matches!(
            deploy(&contract, &cfg),
            Err(LoadError::Deploy(_))
        ));
    }
}
