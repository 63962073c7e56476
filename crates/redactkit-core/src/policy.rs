use crate::catalog::PiiPattern;

/// Per-call redaction options – defines WHAT the engine runs beyond the catalog
#[derive(Debug, Clone)]
pub struct RedactionOptions {
    /// Run the `NAME` heuristic (default: true)
    pub include_names: bool,

    /// Run the `ADDRESS` heuristic (default: true)
    pub include_addresses: bool,

    /// Extra patterns merged with the catalog for this call only
    pub custom_patterns: Vec<PiiPattern>,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            include_names: true,
            include_addresses: true,
            custom_patterns: Vec::new(),
        }
    }
}

impl RedactionOptions {
    /// Builder pattern for ergonomic configuration
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }
}

/// Builder for RedactionOptions – enables fluent configuration
#[derive(Debug, Default)]
pub struct OptionsBuilder {
    options: RedactionOptions,
}

impl OptionsBuilder {
    pub fn include_names(mut self, enabled: bool) -> Self {
        self.options.include_names = enabled;
        self
    }

    pub fn include_addresses(mut self, enabled: bool) -> Self {
        self.options.include_addresses = enabled;
        self
    }

    pub fn custom_pattern(mut self, pattern: PiiPattern) -> Self {
        self.options.custom_patterns.push(pattern);
        self
    }

    pub fn custom_patterns(mut self, patterns: impl IntoIterator<Item = PiiPattern>) -> Self {
        self.options.custom_patterns.extend(patterns);
        self
    }

    pub fn build(self) -> RedactionOptions {
        self.options
    }
}

/// Decides, per call, whether the AI-assisted remote path is used.
///
/// Implementations are consulted on every call and never cached by the
/// router; how fresh the answer is belongs to the implementation.
pub trait ModePolicy: Send + Sync {
    fn is_remote_mode_enabled(&self, scope_id: Option<&str>) -> bool;
}

/// Configuration-driven policy: one switch plus an optional scope allowlist
#[derive(Debug, Clone, Default)]
pub struct StaticModePolicy {
    remote_enabled: bool,
    /// When non-empty, only these scopes go remote
    scopes: Vec<String>,
}

impl StaticModePolicy {
    pub fn local() -> Self {
        Self::default()
    }

    pub fn remote() -> Self {
        Self {
            remote_enabled: true,
            scopes: Vec::new(),
        }
    }

    /// Remote for the listed scopes only, local for everything else
    pub fn remote_for_scopes<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            remote_enabled: true,
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

impl ModePolicy for StaticModePolicy {
    fn is_remote_mode_enabled(&self, scope_id: Option<&str>) -> bool {
        if !self.remote_enabled {
            return false;
        }
        if self.scopes.is_empty() {
            return true;
        }
        scope_id.is_some_and(|scope| self.scopes.iter().any(|s| s == scope))
    }
}

impl<F> ModePolicy for F
where
    F: Fn(Option<&str>) -> bool + Send + Sync,
{
    fn is_remote_mode_enabled(&self, scope_id: Option<&str>) -> bool {
        self(scope_id)
    }
}
