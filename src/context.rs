//! Shared collaborators for engine operations.

use crate::file_category::Classifier;
use crate::hidden::{HiddenCheck, platform_hidden_check};
use crate::naming::NameResolver;

/// Default name of the marker file left in custom group folders.
pub const DEFAULT_MARKER_NAME: &str = ".dirsort-ignore";

/// Everything an entry needs to classify itself and move: the classification table,
/// the duplicate-name resolver, the hidden-path capability and the marker file name.
#[derive(Debug)]
pub struct SortContext {
    classifier: Classifier,
    resolver: NameResolver,
    hidden: Box<dyn HiddenCheck>,
    marker_name: String,
}

impl SortContext {
    /// Creates a context for the running platform.
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            resolver: NameResolver::default(),
            hidden: platform_hidden_check(),
            marker_name: DEFAULT_MARKER_NAME.to_string(),
        }
    }

    /// Replaces the duplicate-name resolver.
    pub fn with_resolver(mut self, resolver: NameResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the hidden-path capability.
    pub fn with_hidden_check(mut self, hidden: Box<dyn HiddenCheck>) -> Self {
        self.hidden = hidden;
        self
    }

    /// Replaces the marker file name.
    pub fn with_marker_name(mut self, marker_name: impl Into<String>) -> Self {
        self.marker_name = marker_name.into();
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    pub fn hidden(&self) -> &dyn HiddenCheck {
        self.hidden.as_ref()
    }

    pub fn marker_name(&self) -> &str {
        &self.marker_name
    }
}

impl Default for SortContext {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}
