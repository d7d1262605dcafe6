use alloy_json_abi::JsonAbi;
use clap::Parser;
use serde::Serialize;
use solfuzz_prep::{AbiEntry, CompilationConfig, Loaded, check_deployed, load};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "solfuzz-prep",
    about = "Compile a Solidity contract, deploy it in-memory, and report the fuzzable surface."
)]
struct Cli {
    /// Path to the .sol file
    sol_file: PathBuf,

    /// Contract to analyze, as `<file>:<Name>` or bare name (default: first)
    #[arg(long)]
    contract: Option<String>,

    /// TOML config file with addresses, prefix and solc flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the test-name prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Extra flags passed verbatim to solc
    #[arg(long)]
    solc_args: Option<String>,
}

/// What gets printed for the fuzzing engine to pick up.
#[derive(Serialize)]
struct PrepReport {
    contract: String,
    address: String,
    tests: Vec<String>,
    functions: Vec<FunctionInfo>,
    constants: Vec<String>,
}

#[derive(Serialize)]
struct FunctionInfo {
    name: String,
    selector: String,
    signature: String,
    inputs: Vec<String>,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if !cli.sol_file.exists() {
        eyre::bail!("File not found: {}", cli.sol_file.display());
    }
    if cli.sol_file.extension().and_then(|e| e.to_str()) != Some("sol") {
        eyre::bail!("Expected a .sol file, got: {}", cli.sol_file.display());
    }

    let mut cfg = match &cli.config {
        Some(path) => CompilationConfig::from_toml(path)?,
        None => CompilationConfig::default(),
    };
    if let Some(prefix) = cli.prefix {
        cfg.prefix = prefix;
    }
    if let Some(solc_args) = cli.solc_args {
        cfg.solc_args = solc_args;
    }

    let loaded = load(&cli.sol_file, cli.contract.as_deref(), &cfg)?;
    check_deployed(&loaded.state, cfg.contract_addr)?;

    let json = serde_json::to_string_pretty(&report(&loaded, &cfg))?;
    println!("{json}");

    Ok(())
}

fn report(loaded: &Loaded, cfg: &CompilationConfig) -> PrepReport {
    let functions = loaded
        .functions
        .iter()
        .map(|entry| {
            let (selector, signature) = function_meta(&loaded.contract.abi, entry);
            FunctionInfo {
                name: entry.name.clone(),
                selector,
                signature,
                inputs: entry.inputs.clone(),
            }
        })
        .collect();

    PrepReport {
        contract: loaded.contract.name.clone(),
        address: cfg.contract_addr.to_string(),
        tests: loaded.tests.clone(),
        functions,
        constants: loaded.constants.iter().map(|c| c.to_string()).collect(),
    }
}

/// Selector and canonical signature from the full parsed ABI. Matching on the
/// input type list too keeps overloads apart.
fn function_meta(abi: &JsonAbi, entry: &AbiEntry) -> (String, String) {
    abi.functions()
        .find(|f| {
            f.name == entry.name
                && f.inputs.len() == entry.inputs.len()
                && f.inputs.iter().zip(&entry.inputs).all(|(p, ty)| p.ty == *ty)
        })
        .map(|f| {
            (
                format!("0x{}", hex::encode(f.selector().as_slice())),
                f.signature(),
            )
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overloads_report_distinct_selectors() {
        let abi: JsonAbi = serde_json::from_str(
            r#"[
                {"type": "function", "name": "push", "inputs": [{"name": "x", "type": "uint256"}], "outputs": [], "stateMutability": "nonpayable"},
                {"type": "function", "name": "push", "inputs": [{"name": "a", "type": "address"}], "outputs": [], "stateMutability": "nonpayable"}
            ]"#,
        )
        .unwrap();

        let (sel_uint, sig_uint) = function_meta(&abi, &AbiEntry::new("push", &["uint256"]));
        let (sel_addr, sig_addr) = function_meta(&abi, &AbiEntry::new("push", &["address"]));

        assert_eq!(sig_uint, "push(uint256)");
        assert_eq!(sig_addr, "push(address)");
        assert_ne!(sel_uint, sel_addr);
    }
}
