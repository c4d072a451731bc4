use crate::error::BridgeResult;
use crate::operators::Operator;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "domhook.config.json";

/// How node-placing operators treat a group that resolves to several nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultiTargetPolicy {
    /// First placement uses the caller's node, later ones a deep clone.
    #[default]
    ClonePerTarget,
    /// Refuse to place into groups with more than one node.
    SingletonOnly,
}

/// How operators treat a payload whose shape does not match what they expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MalformedPayloadPolicy {
    #[default]
    Coerce,
    FaultFast,
}

/// Bridge configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Network-relative path the compiled module is fetched from
    #[serde(default = "default_module_path")]
    pub module_path: String,

    /// Import namespace the entry points are provided under
    #[serde(default = "default_import_namespace")]
    pub import_namespace: String,

    #[serde(default)]
    pub multi_target: MultiTargetPolicy,

    #[serde(default)]
    pub malformed_payload: MalformedPayloadPolicy,

    /// Operators the generated glue provides
    #[serde(default = "Operator::all")]
    pub operators: Vec<Operator>,
}

fn default_module_path() -> String {
    "./pkg/bs.wasm".to_string()
}

fn default_import_namespace() -> String {
    "env".to_string()
}

impl BridgeConfig {
    pub fn from_json(json: &str) -> BridgeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> BridgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load config from a directory, falling back to defaults when the file is absent
    pub fn load(dir: &Path) -> BridgeResult<Self> {
        let config_path = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn with_multi_target(mut self, policy: MultiTargetPolicy) -> Self {
        self.multi_target = policy;
        self
    }

    pub fn with_malformed_payload(mut self, policy: MalformedPayloadPolicy) -> Self {
        self.malformed_payload = policy;
        self
    }

    pub fn with_operators(mut self, operators: Vec<Operator>) -> Self {
        self.operators = operators;
        self
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            module_path: default_module_path(),
            import_namespace: default_import_namespace(),
            multi_target: MultiTargetPolicy::default(),
            malformed_payload: MalformedPayloadPolicy::default(),
            operators: Operator::all(),
        }
    }
}
