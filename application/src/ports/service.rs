//! Service port: the contract every pluggable component implements.
//!
//! A service has a static [`ServiceDescriptor`] and, optionally, a
//! [`ServiceInterface`]: lifecycle hooks plus a dispatch function for its
//! closed set of procedure calls. The registry in
//! [`use_cases::service_driver`](crate::use_cases::service_driver) owns the
//! lifecycle state and decides when each hook may run.
//!
//! Services are shared between threads and take `&self` everywhere, so any
//! mutable state they hold must be internally synchronized.

use cozmonaut_domain::{
    ConsoleCall, HookError, HostCall, ProcedureError, ServiceDescriptor,
};

/// Result of a lifecycle hook.
pub type HookResult = Result<(), HookError>;

/// A procedure call enum accepted by a service.
pub trait Procedure: std::fmt::Debug + Send {
    /// Stable number identifying the procedure in log lines.
    fn ordinal(&self) -> u32;

    /// Short procedure name.
    fn name(&self) -> &'static str;
}

impl Procedure for HostCall {
    fn ordinal(&self) -> u32 {
        HostCall::ordinal(self)
    }

    fn name(&self) -> &'static str {
        HostCall::name(self)
    }
}

impl Procedure for ConsoleCall {
    fn ordinal(&self) -> u32 {
        ConsoleCall::ordinal(self)
    }

    fn name(&self) -> &'static str {
        ConsoleCall::name(self)
    }
}

/// Lifecycle hooks and procedure dispatch of a service.
///
/// Every hook defaults to a no-op. Hooks report [`HookError::Degraded`] to
/// log a warning and carry on, or [`HookError::Fatal`] to abort the
/// transition.
pub trait ServiceInterface<C, O>: Send + Sync {
    /// Called when the service first loads.
    fn on_load(&self) -> HookResult {
        Ok(())
    }

    /// Called when the service finally unloads.
    fn on_unload(&self) -> HookResult {
        Ok(())
    }

    /// Called when the service starts up.
    fn on_start(&self) -> HookResult {
        Ok(())
    }

    /// Called when the service shuts down.
    fn on_stop(&self) -> HookResult {
        Ok(())
    }

    /// Run one procedure call. Only invoked while the service is started.
    fn dispatch(&self, call: C) -> Result<O, ProcedureError>;
}

/// A pluggable component managed by the service registry.
pub trait Service: Send + Sync + 'static {
    type Call: Procedure;
    type Output: Default;

    fn descriptor(&self) -> ServiceDescriptor;

    /// The capability interface, or `None` if the service declares none.
    ///
    /// Calls into a service without an interface succeed and do nothing.
    fn interface(&self) -> Option<&dyn ServiceInterface<Self::Call, Self::Output>>;
}
