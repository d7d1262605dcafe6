use crate::error::LoadError;
use alloy_primitives::Address;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default test prefix: any ABI function starting with this is treated as a
/// fuzz-checked invariant rather than an ordinary callable.
pub const DEFAULT_PREFIX: &str = "test_";

/// Settings for one load. Built once (defaults, a TOML file, CLI overrides)
/// and passed by reference into every pipeline step.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilationConfig {
    /// Address the contract under test ends up at.
    pub contract_addr: Address,
    /// Address the deployment transaction is sent from.
    pub deployer: Address,
    /// Candidate senders for downstream transaction generation. Funded at
    /// deploy time, otherwise not validated here.
    pub sender: Vec<Address>,
    /// Literal, case-sensitive test-name prefix.
    pub prefix: String,
    /// Extra flags appended verbatim to the solc invocation.
    pub solc_args: String,
}

impl Default for CompilationConfig {
    fn default() -> Self {
        Self {
            contract_addr: fixed_addr(0x20, 0x01),
            deployer: fixed_addr(0x10, 0x01),
            sender: vec![
                fixed_addr(0x10, 0x01),
                fixed_addr(0x10, 0x02),
                fixed_addr(0x10, 0x03),
            ],
            prefix: DEFAULT_PREFIX.to_string(),
            solc_args: String::new(),
        }
    }
}

impl CompilationConfig {
    /// Read a config from a TOML file; absent fields keep their defaults.
    pub fn from_toml(path: &Path) -> Result<Self, LoadError> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|e| {
            tracing::error!("bad config file {}: {e}", path.display());
            std::io::Error::new(std::io::ErrorKind::InvalidData, e).into()
        })
    }
}

/// Synthetic fixed address: `<tag> 00 .. 00 <last>`.
fn fixed_addr(tag: u8, last: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = tag;
    bytes[19] = last;
    Address::new(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = CompilationConfig::default();
        assert_eq!(cfg.prefix, "test_");
        assert!(!cfg.sender.is_empty());
        assert_ne!(cfg.contract_addr, cfg.deployer);
    }

    #[test]
    fn toml_overrides_keep_defaults_for_absent_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fuzz.toml");
        fs::write(
            &path,
            "prefix = \"invariant_\"\ncontract_addr = \"0x00000000000000000000000000000000000000aa\"\n",
        )
        .unwrap();

        let cfg = CompilationConfig::from_toml(&path).unwrap();
        assert_eq!(cfg.prefix, "invariant_");
        assert_eq!(cfg.contract_addr, Address::with_last_byte(0xaa));
        assert_eq!(cfg.deployer, CompilationConfig::default().deployer);
        assert_eq!(cfg.sender.len(), 3);
    }

    #[test]
    fn unknown_toml_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fuzz.toml");
        fs::write(&path, "prefiks = \"test_\"\n").unwrap();
        assert!(CompilationConfig::from_toml(&path).is_err());
    }
}
