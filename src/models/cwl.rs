use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// An input or output port of a workflow or step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CwlElement {
    pub label: Option<String>,
    pub doc: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub format: Option<String>,
    pub default_val: Option<String>,
    /// Ports feeding this one: `input` or `step/port`.
    #[serde(default)]
    pub source_ids: Vec<String>,
}

impl CwlElement {
    pub fn with_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            source_ids: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CwlProcess {
    CommandLineTool,
    Workflow,
    ExpressionTool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CwlStep {
    pub label: Option<String>,
    pub doc: Option<String>,
    pub run: Option<String>,
    pub run_type: Option<CwlProcess>,
    #[serde(default)]
    pub inputs: BTreeMap<String, CwlElement>,
    #[serde(default)]
    pub outputs: BTreeMap<String, CwlElement>,
}

impl CwlStep {
    pub fn is_subworkflow(&self) -> bool {
        self.run_type == Some(CwlProcess::Workflow)
    }
}
