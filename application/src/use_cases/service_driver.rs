//! Service registry and lifecycle driver.
//!
//! [`ServiceCell`] pairs one service instance with its lifecycle state and
//! enforces the transition rules:
//!
//! | Operation | Fails when | Hook | New state |
//! |-----------|------------|------|-----------|
//! | `load`    | not `Unloaded` | `on_load` | `Loaded` |
//! | `start`   | `Unloaded`, `Started` | `on_start` | `Started` |
//! | `stop`    | `Unloaded`, `Loaded` | `on_stop` | `Loaded` |
//! | `unload`  | `Unloaded` | `on_unload` | `Unloaded` |
//! | `call`    | not `Started` | `dispatch` | unchanged |
//!
//! Transitions hold the state lock exclusively. Calls hold it shared, so
//! several threads can be inside `dispatch` at once while no transition can
//! run underneath them. Services serialize their own internals.
//!
//! [`ServiceRegistry`] owns the cells and drives them in bulk.

use crate::ports::service::{HookResult, Procedure, Service, ServiceInterface};
use cozmonaut_domain::{HookError, LifecycleState, ServiceDescriptor, ServiceError};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, trace, warn};

/// One registered service instance and its lifecycle state.
pub struct ServiceCell<S: Service> {
    service: S,
    state: RwLock<LifecycleState>,
}

impl<S: Service> ServiceCell<S> {
    pub fn new(service: S) -> Self {
        Self {
            service,
            state: RwLock::new(LifecycleState::Unloaded),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn name(&self) -> &'static str {
        self.service.descriptor().name
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        match self.state.read() {
            Ok(state) => *state,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Load the service.
    pub fn load(&self) -> Result<(), ServiceError> {
        let name = self.name();
        trace!("Loading {}", name);

        let mut state = self.write_state()?;
        if state.is_loaded() {
            error!("Already loaded {}", name);
            return Err(ServiceError::AlreadyLoaded(name.to_string()));
        }

        self.run_hook("on_load", |iface| iface.on_load())?;
        *state = LifecycleState::Loaded;

        info!("Loaded {}", name);
        Ok(())
    }

    /// Unload the service.
    ///
    /// A started service should be stopped first. Unloading a started
    /// service is allowed but tears it down while it may still be running.
    pub fn unload(&self) -> Result<(), ServiceError> {
        let name = self.name();
        trace!("Unloading {}", name);

        let mut state = self.write_state()?;
        if !state.is_loaded() {
            error!("Not loaded {}", name);
            return Err(ServiceError::NotLoaded(name.to_string()));
        }
        if state.is_started() {
            warn!("Unloading {} while it is still started", name);
        }

        self.run_hook("on_unload", |iface| iface.on_unload())?;
        *state = LifecycleState::Unloaded;

        info!("Unloaded {}", name);
        Ok(())
    }

    /// Start the service.
    pub fn start(&self) -> Result<(), ServiceError> {
        let name = self.name();
        trace!("Starting {}", name);

        let mut state = self.write_state()?;
        if !state.is_loaded() {
            error!("Not loaded {}", name);
            return Err(ServiceError::NotLoaded(name.to_string()));
        }
        if state.is_started() {
            error!("Already started {}", name);
            return Err(ServiceError::AlreadyStarted(name.to_string()));
        }

        *state = LifecycleState::Started;
        if let Err(e) = self.run_hook("on_start", |iface| iface.on_start()) {
            *state = LifecycleState::Loaded;
            return Err(e);
        }

        info!("Started {}", name);
        info!("{}", self.service.descriptor().description);
        Ok(())
    }

    /// Stop the service.
    pub fn stop(&self) -> Result<(), ServiceError> {
        let name = self.name();
        trace!("Stopping {}", name);

        let mut state = self.write_state()?;
        if !state.is_loaded() {
            error!("Not loaded {}", name);
            return Err(ServiceError::NotLoaded(name.to_string()));
        }
        if !state.is_started() {
            error!("Not started {}", name);
            return Err(ServiceError::NotStarted(name.to_string()));
        }

        self.run_hook("on_stop", |iface| iface.on_stop())?;
        *state = LifecycleState::Loaded;

        info!("Stopped {}", name);
        Ok(())
    }

    /// Call a procedure on the started service.
    pub fn call(&self, call: S::Call) -> Result<S::Output, ServiceError> {
        let name = self.name();

        // Held until dispatch returns
        let state = self.read_state()?;
        if !state.is_loaded() {
            error!("Not loaded {}", name);
            return Err(ServiceError::NotLoaded(name.to_string()));
        }
        if !state.is_started() {
            error!("Not started {}", name);
            return Err(ServiceError::NotStarted(name.to_string()));
        }

        let Some(iface) = self.service.interface() else {
            return Ok(S::Output::default());
        };

        let ordinal = call.ordinal();
        let procedure = call.name();
        trace!("{} proc #{} ({})", name, ordinal, procedure);

        iface.dispatch(call).map_err(|source| {
            warn!("{} proc #{} returned {}", name, ordinal, source);
            ServiceError::Procedure {
                service: name.to_string(),
                ordinal,
                procedure,
                source,
            }
        })
    }

    fn run_hook(
        &self,
        hook: &'static str,
        f: impl FnOnce(&dyn ServiceInterface<S::Call, S::Output>) -> HookResult,
    ) -> Result<(), ServiceError> {
        let Some(iface) = self.service.interface() else {
            return Ok(());
        };

        match f(iface) {
            Ok(()) => Ok(()),
            Err(HookError::Degraded(message)) => {
                warn!("{} {}() returned {}", self.name(), hook, message);
                Ok(())
            }
            Err(HookError::Fatal(message)) => {
                error!("{} {}() failed fatally: {}", self.name(), hook, message);
                Err(ServiceError::Fatal {
                    service: self.name().to_string(),
                    hook,
                    message,
                })
            }
        }
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LifecycleState>, ServiceError> {
        self.state
            .read()
            .map_err(|_| ServiceError::Poisoned(self.name().to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LifecycleState>, ServiceError> {
        self.state
            .write()
            .map_err(|_| ServiceError::Poisoned(self.name().to_string()))
    }
}

/// Type-erased lifecycle view of a [`ServiceCell`].
pub trait Lifecycle: Send + Sync {
    fn descriptor(&self) -> ServiceDescriptor;
    fn state(&self) -> LifecycleState;
    fn load(&self) -> Result<(), ServiceError>;
    fn unload(&self) -> Result<(), ServiceError>;
    fn start(&self) -> Result<(), ServiceError>;
    fn stop(&self) -> Result<(), ServiceError>;
}

impl<S: Service> Lifecycle for ServiceCell<S> {
    fn descriptor(&self) -> ServiceDescriptor {
        self.service.descriptor()
    }

    fn state(&self) -> LifecycleState {
        ServiceCell::state(self)
    }

    fn load(&self) -> Result<(), ServiceError> {
        ServiceCell::load(self)
    }

    fn unload(&self) -> Result<(), ServiceError> {
        ServiceCell::unload(self)
    }

    fn start(&self) -> Result<(), ServiceError> {
        ServiceCell::start(self)
    }

    fn stop(&self) -> Result<(), ServiceError> {
        ServiceCell::stop(self)
    }
}

/// Owner of every service instance, in registration order.
///
/// Each service name may be registered once.
#[derive(Default)]
pub struct ServiceRegistry {
    services: Vec<Arc<dyn Lifecycle>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service and get a typed handle for calling it.
    pub fn register<S: Service>(&mut self, service: S) -> Result<Arc<ServiceCell<S>>, ServiceError> {
        let name = service.descriptor().name;
        if self.get(name).is_some() {
            error!("Service already registered: {}", name);
            return Err(ServiceError::AlreadyRegistered(name.to_string()));
        }

        let cell = Arc::new(ServiceCell::new(service));
        self.services.push(Arc::clone(&cell) as Arc<dyn Lifecycle>);
        Ok(cell)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Lifecycle>> {
        self.services
            .iter()
            .find(|s| s.descriptor().name == name)
            .cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.descriptor().name).collect()
    }

    /// Load every service in registration order, stopping at the first failure.
    pub fn load_all(&self) -> Result<(), ServiceError> {
        self.services.iter().try_for_each(|s| s.load())
    }

    /// Start every service in registration order, stopping at the first failure.
    pub fn start_all(&self) -> Result<(), ServiceError> {
        self.services.iter().try_for_each(|s| s.start())
    }

    /// Stop every started service in reverse registration order.
    ///
    /// Keeps going past failures and returns the first one.
    pub fn stop_all(&self) -> Result<(), ServiceError> {
        Self::each_reversed(&self.services, |s| s.state().is_started(), |s| s.stop())
    }

    /// Unload every loaded service in reverse registration order.
    ///
    /// Keeps going past failures and returns the first one.
    pub fn unload_all(&self) -> Result<(), ServiceError> {
        Self::each_reversed(&self.services, |s| s.state().is_loaded(), |s| s.unload())
    }

    fn each_reversed(
        services: &[Arc<dyn Lifecycle>],
        applies: impl Fn(&dyn Lifecycle) -> bool,
        op: impl Fn(&dyn Lifecycle) -> Result<(), ServiceError>,
    ) -> Result<(), ServiceError> {
        let mut first_error = None;
        for service in services.iter().rev() {
            if !applies(service.as_ref()) {
                continue;
            }
            if let Err(e) = op(service.as_ref()) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
