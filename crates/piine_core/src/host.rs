use std::collections::HashSet;

use shared::domain::{Control, ElementRef, VIEW_ID};

/// Resolves element ids on whatever surface hosts the app.
pub trait HostEnvironment: Send + Sync {
    fn element(&self, id: &str) -> Option<ElementRef>;
}

/// A host whose elements are a fixed set of ids.
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    elements: HashSet<String>,
}

impl StaticHost {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            elements: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// The view host plus every control the app listens to.
    pub fn with_all_controls() -> Self {
        Self::new(
            Control::ALL
                .iter()
                .map(|control| control.element_id())
                .chain(std::iter::once(VIEW_ID)),
        )
    }

    pub fn without(mut self, id: &str) -> Self {
        self.elements.remove(id);
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains(id)
    }
}

impl HostEnvironment for StaticHost {
    fn element(&self, id: &str) -> Option<ElementRef> {
        self.elements.get(id).map(|id| ElementRef::new(id.as_str()))
    }
}
