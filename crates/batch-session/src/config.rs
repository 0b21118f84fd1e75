use serde::{Deserialize, Serialize};

/// Default value for `skip_tree_signing` in [`BatchSessionConfig`].
const DEFAULT_SKIP_TREE_SIGNING: bool = false;

/// Default value for `validate_trees` in [`BatchSessionConfig`].
const DEFAULT_VALIDATE_TREES: bool = true;

/// Static settings of a settlement session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSessionConfig {
    /// Do not take part in VTXO tree signing.
    ///
    /// Set when none of the outputs registered for the batch need to be
    /// cosigned by this client, e.g. a wallet that only forfeits.
    #[serde(default = "default_skip_tree_signing")]
    skip_tree_signing: bool,

    /// Run [`TxTree::validate`](ark_tx_tree::TxTree::validate) on every tree
    /// built during the round.
    #[serde(default = "default_validate_trees")]
    validate_trees: bool,
}

fn default_skip_tree_signing() -> bool {
    DEFAULT_SKIP_TREE_SIGNING
}

fn default_validate_trees() -> bool {
    DEFAULT_VALIDATE_TREES
}

impl Default for BatchSessionConfig {
    fn default() -> Self {
        Self {
            skip_tree_signing: DEFAULT_SKIP_TREE_SIGNING,
            validate_trees: DEFAULT_VALIDATE_TREES,
        }
    }
}

impl BatchSessionConfig {
    pub fn with_skip_tree_signing(mut self, skip_tree_signing: bool) -> Self {
        self.skip_tree_signing = skip_tree_signing;
        self
    }

    pub fn with_validate_trees(mut self, validate_trees: bool) -> Self {
        self.validate_trees = validate_trees;
        self
    }

    pub fn skip_tree_signing(&self) -> bool {
        self.skip_tree_signing
    }

    pub fn validate_trees(&self) -> bool {
        self.validate_trees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_load() {
        let config: BatchSessionConfig = toml::from_str(
            r#"
            skip_tree_signing = true
            validate_trees = false
            "#,
        )
        .unwrap();
        assert!(config.skip_tree_signing());
        assert!(!config.validate_trees());
    }

    #[test]
    fn test_config_defaults() {
        let config: BatchSessionConfig = toml::from_str("").unwrap();
        assert_eq!(config, BatchSessionConfig::default());
        assert!(!config.skip_tree_signing());
        assert!(config.validate_trees());

        let config = config.with_skip_tree_signing(true);
        assert!(config.skip_tree_signing());
    }
}
