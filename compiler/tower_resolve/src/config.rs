//! Resolver configuration.

/// When a level stops offering same-named objects as values.
///
/// An object named `foo` and a property named `foo` can both be visible at
/// one level. Once a property answer is decisive, presenting the object as a
/// competing answer only produces spurious ambiguities.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum ObjectShadowing {
    /// Skip objects when the collector already holds a decisive candidate
    /// from this level or an earlier one, unless the level offers
    /// extension-receiver alternatives.
    #[default]
    AfterDecisiveCandidate,
    /// Skip objects as soon as the collector reports any success.
    AfterAnySuccess,
    /// Always enumerate objects.
    Never,
}

/// Configuration for one resolver.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResolveConfig {
    /// Cutover rule between properties and same-named objects.
    pub object_shadowing: ObjectShadowing,
    /// Seed operator-invoke interpretations (`foo(...)` as `foo.invoke(...)`).
    pub invoke_resolution: bool,
    /// Consult enum fallback scopes for receiver-less value access.
    pub unqualified_enum_fallback: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        ResolveConfig {
            object_shadowing: ObjectShadowing::AfterDecisiveCandidate,
            invoke_resolution: true,
            unqualified_enum_fallback: true,
        }
    }
}

impl ResolveConfig {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only direct interpretations; no operator-invoke families.
    pub fn direct_only() -> Self {
        ResolveConfig {
            invoke_resolution: false,
            ..Default::default()
        }
    }

    /// Same configuration with a different object cutover rule.
    #[must_use]
    pub fn with_object_shadowing(self, object_shadowing: ObjectShadowing) -> Self {
        ResolveConfig {
            object_shadowing,
            ..self
        }
    }
}
