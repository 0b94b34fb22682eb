//! Entity kinds
//!
//! The closed set of entity shapes this crate knows how to materialize.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Concrete entity shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// Release
    Release,
    /// Test run
    Run,
    /// Test set
    TestSet,
    /// Test
    Test,
    /// Sprint (release cycle)
    Sprint,
    /// Test configuration
    TestConfiguration,
    /// Test plan folder
    TestFolder,
}

impl EntityKind {
    /// All known kinds, in registration order
    pub const ALL: [EntityKind; 7] = [
        Self::Release,
        Self::Run,
        Self::TestSet,
        Self::Test,
        Self::Sprint,
        Self::TestConfiguration,
        Self::TestFolder,
    ];

    /// Wire type name carried in the `Type` key of an entity
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Release => "release",
            Self::Run => "run",
            Self::TestSet => "test-set",
            Self::Test => "test",
            Self::Sprint => "release-cycle",
            Self::TestConfiguration => "test-config",
            Self::TestFolder => "test-folder",
        }
    }

    /// REST collection name under the project entities endpoint
    #[must_use]
    pub const fn collection_name(self) -> &'static str {
        match self {
            Self::Release => "releases",
            Self::Run => "runs",
            Self::TestSet => "test-sets",
            Self::Test => "tests",
            Self::Sprint => "release-cycles",
            Self::TestConfiguration => "test-configs",
            Self::TestFolder => "test-folders",
        }
    }

    /// Deep-link template
    ///
    /// Placeholders: `{scheme}`, `{project}`, `{domain}`, `{host}`, `{id}`.
    #[must_use]
    pub const fn reference_template(self) -> &'static str {
        match self {
            Self::Release => {
                "{scheme}://{project}.{domain}.{host}/[AnyModule]?EntityType=IRelease&EntityID={id}"
            }
            Self::Run => "{scheme}://{project}.{domain}.{host}/[AnyModule]?EntityType=IRun&EntityID={id}",
            Self::TestSet => {
                "{scheme}://{project}.{domain}.{host}/[AnyModule]?EntityType=ITestSet&EntityID={id}"
            }
            Self::Test => "{scheme}://{project}.{domain}.{host}/[AnyModule]?EntityType=ITest&EntityID={id}",
            Self::Sprint => {
                "{scheme}://{project}.{domain}.{host}/[AnyModule]?EntityType=ICycle&EntityID={id}"
            }
            Self::TestConfiguration => {
                "{scheme}://{project}.{domain}.{host}/[AnyModule]?EntityType=ITestConfig&EntityID={id}"
            }
            Self::TestFolder => {
                "{scheme}://{project}.{domain}.{host}/[AnyModule]?EntityType=ITestFolder&EntityID={id}"
            }
        }
    }

    /// Look up a kind by its REST collection name
    #[must_use]
    pub fn from_collection_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.collection_name() == name)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn wire_names_are_unique() {
        let names: HashSet<_> = EntityKind::ALL.iter().map(|k| k.wire_name()).collect();
        assert_eq!(names.len(), EntityKind::ALL.len());
    }

    #[test]
    fn collection_names_round_trip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_collection_name(kind.collection_name()), Some(kind));
        }
        assert_eq!(EntityKind::from_collection_name("defects"), None);
    }

    #[test]
    fn templates_carry_every_placeholder() {
        for kind in EntityKind::ALL {
            let template = kind.reference_template();
            for placeholder in ["{scheme}", "{project}", "{domain}", "{host}", "{id}"] {
                assert!(template.contains(placeholder), "{kind} lacks {placeholder}");
            }
        }
    }

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(EntityKind::Sprint.to_string(), "release-cycle");
    }
}
