use crate::error::LoadError;
use crate::types::{AbiEntry, CompiledContract};
use alloy_json_abi::JsonAbi;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tracing::{error, info};

/// Everything the pipeline needs in one solc pass: creation and runtime
/// bytecode, both source maps, the ABI, and the syntax tree.
const COMBINED_JSON: &str = "bin,bin-runtime,srcmap,srcmap-runtime,abi,ast";

/// Compile a `.sol` file and return all contracts found, in compiler output
/// order.
///
/// solc's stdout is spilled to a scoped temp file and parsed from there; the
/// file is removed on every exit path when it drops. One process spawn, one
/// temp file, no retry: any compiler failure is terminal for the load.
pub fn compile(sol_path: &Path, solc_args: &str) -> Result<Vec<CompiledContract>, LoadError> {
    let output = Command::new("solc")
        .args(["--combined-json", COMBINED_JSON])
        .args(solc_args.split_whitespace())
        .arg(sol_path)
        .output()?;

    if !output.status.success() {
        error!(
            "solc failed on {}:\n{}",
            sol_path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
        return Err(LoadError::CompileFailure);
    }

    let raw = spill_and_read(&output.stdout)?;
    parse_combined_json(&raw)
}

/// Persist solc's stdout to a scoped temp file and read it back. The file is
/// removed when the handle drops, whether or not the read succeeds; output
/// that can't be read as text counts as unusable compiler output.
fn spill_and_read(stdout: &[u8]) -> Result<String, LoadError> {
    spill_and_read_in(&std::env::temp_dir(), stdout)
}

fn spill_and_read_in(dir: &Path, stdout: &[u8]) -> Result<String, LoadError> {
    let mut spill = tempfile::NamedTempFile::new_in(dir)?;
    spill.write_all(stdout)?;
    fs::read_to_string(spill.path()).map_err(|e| {
        error!("unreadable solc output: {e}");
        LoadError::CompileFailure
    })
}

// ---------------------------------------------------------------------------
// Combined-JSON parsing
// ---------------------------------------------------------------------------

/// Parse solc `--combined-json` output.
///
/// Shape: `{"contracts": {"<file>:<Name>": {"abi", "bin", "bin-runtime", ..},
/// ..}, "sources": {"<file>": {"AST": ..}, ..}}`. Older solc embeds `abi` as
/// a JSON string rather than an array; both are accepted.
pub(crate) fn parse_combined_json(raw: &str) -> Result<Vec<CompiledContract>, LoadError> {
    let doc: Value = serde_json::from_str(raw).map_err(|e| {
        error!("unparseable solc output: {e}");
        LoadError::CompileFailure
    })?;

    // Per-file ASTs, attached to each contract compiled from that file.
    let asts: HashMap<&str, &Value> = doc
        .get("sources")
        .and_then(Value::as_object)
        .map(|sources| {
            sources
                .iter()
                .filter_map(|(file, entry)| Some((file.as_str(), entry.get("AST")?)))
                .collect()
        })
        .unwrap_or_default();

    let mut contracts = Vec::new();
    let Some(entries) = doc.get("contracts").and_then(Value::as_object) else {
        return Ok(contracts);
    };

    for (name, entry) in entries {
        let abi_value = match entry.get("abi") {
            Some(Value::String(s)) => serde_json::from_str(s).map_err(|e| {
                error!("unparseable abi for {name}: {e}");
                LoadError::CompileFailure
            })?,
            Some(v) => v.clone(),
            None => Value::Array(vec![]),
        };
        let functions = parse_abi_entries(&abi_value);
        let abi: JsonAbi = serde_json::from_value(abi_value).map_err(|e| {
            error!("unparseable abi for {name}: {e}");
            LoadError::CompileFailure
        })?;

        let source_file = name.rsplit_once(':').map(|(file, _)| file).unwrap_or(name);
        let ast = asts
            .get(source_file)
            .map(|v| (*v).clone())
            .unwrap_or(Value::Null);

        contracts.push(CompiledContract {
            name: name.clone(),
            abi,
            functions,
            bytecode: decode_bytecode(entry.get("bin")),
            runtime_bytecode: decode_bytecode(entry.get("bin-runtime")),
            ast,
        });
    }

    Ok(contracts)
}

/// Callable functions in ABI order. Constructors, events and errors are not
/// callable targets.
fn parse_abi_entries(abi: &Value) -> Vec<AbiEntry> {
    let Some(items) = abi.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("function"))
        .filter_map(|item| {
            let name = item.get("name")?.as_str()?.to_string();
            let inputs = item
                .get("inputs")
                .and_then(Value::as_array)
                .map(|inputs| {
                    inputs
                        .iter()
                        .filter_map(|p| p.get("type").and_then(Value::as_str))
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(AbiEntry { name, inputs })
        })
        .collect()
}

fn decode_bytecode(field: Option<&Value>) -> Vec<u8> {
    let hex_str = field.and_then(Value::as_str).unwrap_or("");
    let linked = zero_link_placeholders(hex_str.trim_start_matches("0x"));
    // Interfaces and abstract contracts legitimately have no bytecode here;
    // the deployer rejects them if one gets selected.
    hex::decode(&linked).unwrap_or_default()
}

/// Replace unlinked library placeholders (`__$<hash>$__` or `__Lib.sol:L__`)
/// with zeroed address slots so the hex decodes. Library calls through them
/// would hit the zero address, which is fine for deployment purposes.
fn zero_link_placeholders(hex_str: &str) -> String {
    let mut result = String::with_capacity(hex_str.len());
    let mut rest = hex_str;

    while let Some(start) = rest.find("__") {
        result.push_str(&rest[..start]);
        let placeholder = &rest[start..];
        // solc pads every placeholder to exactly 40 hex chars (one address).
        let len = placeholder.len().min(40);
        for _ in 0..len {
            result.push('0');
        }
        rest = &placeholder[len..];
    }
    result.push_str(rest);
    result
}

// ---------------------------------------------------------------------------
// Contract selection
// ---------------------------------------------------------------------------

/// Pick the contract to analyze.
///
/// With a target name, match the fully-qualified `<file>:<Name>` or the bare
/// contract name; otherwise take the first contract in compiler output order,
/// with a notice when the file produced more than one.
pub fn select_contract<'a>(
    contracts: &'a [CompiledContract],
    target: Option<&str>,
) -> Result<&'a CompiledContract, LoadError> {
    if contracts.is_empty() {
        return Err(LoadError::NoContracts);
    }

    let selected = match target {
        Some(name) => contracts
            .iter()
            .find(|c| {
                c.name == name || c.name.rsplit_once(':').is_some_and(|(_, bare)| bare == name)
            })
            .ok_or_else(|| LoadError::ContractNotFound(name.to_string()))?,
        None => {
            if contracts.len() > 1 {
                info!(
                    "{} contracts in compiler output, analyzing only the first",
                    contracts.len()
                );
            }
            &contracts[0]
        }
    };

    info!("analyzing contract {}", selected.name);
    Ok(selected)
}
