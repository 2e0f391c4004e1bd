//! Per-widget capability manifest.
//!
//! Some widget families are called through a fuller interface than their raw
//! factory actually exposes: an event-emitter sub-object, a chainable setter,
//! or sibling creation methods for style variants. The normalizer's
//! enhancement pass consults this table and synthesizes exactly the declared
//! capabilities, nothing more. Widgets absent from the table get no
//! synthesized extras.

/// One capability a widget's callers expect the factory to expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedCapability {
    /// Nested event-subscription object with `on`/`off`/`emit`.
    Emitter,
    /// Chainable setter method callers invoke by name (e.g. `setResults`).
    ChainableSetter(&'static str),
    /// Sibling creation method for a style variant (e.g. `createPrimary`).
    VariantCreator(&'static str),
}

/// Declared capability requirements for one widget name.
pub struct CapabilityRequirement {
    /// Exact widget name the requirement applies to.
    pub widget: &'static str,
    /// Capabilities callers expect on this widget's factory.
    pub capabilities: &'static [ExpectedCapability],
}

/// The full capability manifest, one entry per widget family with known gaps.
pub const CAPABILITY_MANIFEST: [CapabilityRequirement; 4] = [
    CapabilityRequirement {
        widget: "Button",
        capabilities: &[
            ExpectedCapability::VariantCreator("createPrimary"),
            ExpectedCapability::VariantCreator("createSecondary"),
            ExpectedCapability::VariantCreator("createGhost"),
        ],
    },
    CapabilityRequirement {
        widget: "Dialog",
        capabilities: &[ExpectedCapability::Emitter],
    },
    CapabilityRequirement {
        widget: "SearchPanel",
        capabilities: &[
            ExpectedCapability::Emitter,
            ExpectedCapability::ChainableSetter("setResults"),
        ],
    },
    CapabilityRequirement {
        widget: "DataGrid",
        capabilities: &[
            ExpectedCapability::Emitter,
            ExpectedCapability::ChainableSetter("setRows"),
        ],
    },
];

/// Returns the declared capabilities for `widget`, empty when unlisted.
pub fn required_capabilities(widget: &str) -> &'static [ExpectedCapability] {
    CAPABILITY_MANIFEST
        .iter()
        .find(|entry| entry.widget == widget)
        .map(|entry| entry.capabilities)
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_widgets_declare_capabilities() {
        assert_eq!(required_capabilities("Button").len(), 3);
        assert!(required_capabilities("SearchPanel")
            .contains(&ExpectedCapability::ChainableSetter("setResults")));
    }

    #[test]
    fn unlisted_widgets_get_nothing() {
        assert!(required_capabilities("Card").is_empty());
        assert!(required_capabilities("FutureWidget").is_empty());
    }
}
