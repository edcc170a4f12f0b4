//! Lifecycle state and static service identity

use serde::Serialize;

/// Static identity of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ServiceDescriptor {
    /// Short unique name (e.g. `"lua"`, `"console"`).
    pub name: &'static str,
    /// Human-readable description, logged when the service starts.
    pub description: &'static str,
}

impl ServiceDescriptor {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self { name, description }
    }
}

impl std::fmt::Display for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Lifecycle state of a registered service.
///
/// `Started` implies `Loaded`: a service can only be started after a
/// successful load, and stopping returns it to `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum LifecycleState {
    #[default]
    Unloaded,
    Loaded,
    Started,
}

impl LifecycleState {
    /// Whether per-instance state exists (`Loaded` or `Started`).
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Self::Unloaded)
    }

    /// Whether the service accepts procedure calls.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::Started => "started",
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_unloaded() {
        assert_eq!(LifecycleState::default(), LifecycleState::Unloaded);
    }

    #[test]
    fn test_started_implies_loaded() {
        assert!(LifecycleState::Started.is_loaded());
        assert!(LifecycleState::Started.is_started());
        assert!(LifecycleState::Loaded.is_loaded());
        assert!(!LifecycleState::Loaded.is_started());
        assert!(!LifecycleState::Unloaded.is_loaded());
    }

    #[test]
    fn test_descriptor_display_is_name() {
        let descriptor = ServiceDescriptor::new("lua", "hosts the runtime");
        assert_eq!(descriptor.to_string(), "lua");
    }
}
