//! Run Session use case
//!
//! Drives one full session of the runtime host: bring the services up,
//! execute the configured operation, wait for the user to interrupt, and
//! shut everything down again.

use crate::config::SessionConfig;
use crate::ports::service::Service;
use crate::use_cases::service_driver::{ServiceCell, ServiceRegistry};
use cozmonaut_domain::{ConsoleCall, ConsoleReply, HostCall, Operation, ServiceError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during a session
#[derive(Error, Debug)]
pub enum RunSessionError {
    #[error("Failed to bring services up: {0}")]
    Startup(#[source] ServiceError),

    #[error("Operation {operation} failed: {source}")]
    Operation {
        operation: Operation,
        #[source]
        source: ServiceError,
    },

    #[error("Failed to shut services down: {0}")]
    Shutdown(#[source] ServiceError),
}

/// Summary of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub operation: Operation,
    /// Number of interrupt polls that came back negative.
    pub polls: u64,
}

/// Use case for running a host session
pub struct RunSessionUseCase<H, C>
where
    H: Service<Call = HostCall, Output = ()>,
    C: Service<Call = ConsoleCall, Output = ConsoleReply>,
{
    registry: ServiceRegistry,
    host: Arc<ServiceCell<H>>,
    console: Arc<ServiceCell<C>>,
}

impl<H, C> RunSessionUseCase<H, C>
where
    H: Service<Call = HostCall, Output = ()>,
    C: Service<Call = ConsoleCall, Output = ConsoleReply>,
{
    /// Register both services. The console is registered last so that it
    /// stops first and no new input arrives while the host shuts down.
    pub fn new(host: H, console: C) -> Result<Self, ServiceError> {
        let mut registry = ServiceRegistry::new();
        let host = registry.register(host)?;
        let console = registry.register(console)?;
        Ok(Self {
            registry,
            host,
            console,
        })
    }

    pub fn host(&self) -> &Arc<ServiceCell<H>> {
        &self.host
    }

    pub fn console(&self) -> &Arc<ServiceCell<C>> {
        &self.console
    }

    /// Run the session to completion.
    ///
    /// Services are always shut down before returning, including when the
    /// operation fails. An operation failure takes precedence over a
    /// shutdown failure.
    pub fn execute(&self, config: &SessionConfig) -> Result<SessionOutcome, RunSessionError> {
        info!("Starting session ({})", config.operation);

        if let Err(e) = self.registry.load_all().and_then(|()| self.registry.start_all()) {
            if let Err(shutdown) = self.shutdown() {
                warn!("Shutdown after failed startup was incomplete: {}", shutdown);
            }
            return Err(RunSessionError::Startup(e));
        }

        let result = self.run_operation(config);
        let shutdown = self.shutdown();

        let outcome = result?;
        shutdown.map_err(RunSessionError::Shutdown)?;

        info!("Session finished after {} polls", outcome.polls);
        Ok(outcome)
    }

    fn run_operation(&self, config: &SessionConfig) -> Result<SessionOutcome, RunSessionError> {
        self.host
            .call(HostCall::ExecOperation(config.operation))
            .map_err(|source| RunSessionError::Operation {
                operation: config.operation,
                source,
            })?;

        if config.should_auto_enable() {
            if let Err(e) = self.host.call(HostCall::AutoEnable) {
                warn!("Could not enable automatic interaction: {}", e);
            }
        }

        let polls = self.wait_for_interrupt(config);
        Ok(SessionOutcome {
            operation: config.operation,
            polls,
        })
    }

    fn wait_for_interrupt(&self, config: &SessionConfig) -> u64 {
        let mut polls = 0;
        loop {
            match self.console.call(ConsoleCall::TakeInterrupted) {
                Ok(reply) if reply.is_interrupted() => {
                    info!("Interrupted");
                    return polls;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Console is unavailable, ending session: {}", e);
                    return polls;
                }
            }
            polls += 1;
            std::thread::sleep(config.poll_interval);
        }
    }

    fn shutdown(&self) -> Result<(), ServiceError> {
        debug!("Shutting down services");
        let stopped = self.registry.stop_all();
        let unloaded = self.registry.unload_all();
        stopped.and(unloaded)
    }
}
