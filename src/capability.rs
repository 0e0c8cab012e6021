use std::collections::{HashMap, HashSet};

pub const MULTIBRANCH_PIPELINE: &str = "io.jenkins.blueocean.rest.model.BlueMultiBranchPipeline";
pub const PIPELINE_FOLDER: &str = "io.jenkins.blueocean.rest.model.BluePipelineFolder";

const MULTIBRANCH_IMPL: &str = "io.jenkins.blueocean.rest.impl.pipeline.MultiBranchPipelineImpl";

pub trait CapabilityCheck: Send + Sync {
    fn has_capability(&self, classifier: &str, capability: &str) -> bool;
}

/// Maps backend class names to the capabilities they carry. A class always
/// counts as having itself as a capability.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    classes: HashMap<String, HashSet<String>>,
}

impl CapabilityRegistry {
    /// Registry that knows the multibranch pipeline class.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.insert(MULTIBRANCH_IMPL, [MULTIBRANCH_PIPELINE, PIPELINE_FOLDER]);
        registry
    }

    pub fn insert<I, S>(&mut self, classifier: &str, capabilities: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes
            .entry(classifier.to_string())
            .or_default()
            .extend(capabilities.into_iter().map(Into::into));
    }

    /// Entries from `other` are added on top of this registry's.
    pub fn merge(&mut self, other: CapabilityRegistry) {
        for (classifier, caps) in other.classes {
            self.classes.entry(classifier).or_default().extend(caps);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.classes.len()
    }
}

impl CapabilityCheck for CapabilityRegistry {
    fn has_capability(&self, classifier: &str, capability: &str) -> bool {
        classifier == capability
            || self
                .classes
                .get(classifier)
                .is_some_and(|caps| caps.contains(capability))
    }
}
