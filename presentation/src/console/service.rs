//! Console service.
//!
//! Two threads back the console while it is started:
//!
//! - the **reader** blocks on a [`LineSource`] and forwards every event over a
//!   channel. It cannot be cancelled while blocked, so `stop` detaches it;
//!   it exits at its next event once the worker is gone.
//! - the **worker** handles the events and is joined on `stop`.
//!
//! Typing `stop` (or pressing Ctrl-C at the prompt, or sending SIGINT)
//! raises the interrupt flag, which the session drains through
//! [`ConsoleCall::TakeInterrupted`].

use cozmonaut_application::{HookResult, LineEvent, LineSource, Service, ServiceInterface};
use cozmonaut_domain::{ConsoleCall, ConsoleReply, HookError, ProcedureError, ServiceDescriptor};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::line_editor::ReedlineSource;
use super::signal;

/// Descriptor of the console service.
pub const CONSOLE_SERVICE: ServiceDescriptor = ServiceDescriptor::new(
    "console",
    "The console service manages the console user interface (CUI).",
);

/// Builds the line source on the reader thread.
pub type LineSourceFactory = Arc<dyn Fn() -> Result<Box<dyn LineSource>, String> + Send + Sync>;

const STOP_COMMAND: &str = "stop";
const WORKER_TICK: Duration = Duration::from_millis(50);

/// What the worker does with one input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    /// Blank line
    Skip,
    Interrupt,
    /// Unrecognized input
    Ignore(String),
    /// Input ended; the reader is gone
    Close,
}

impl ConsoleAction {
    pub fn classify(event: LineEvent) -> Self {
        match event {
            LineEvent::Line(line) => {
                let line = line.trim();
                if line.is_empty() {
                    Self::Skip
                } else if line == STOP_COMMAND {
                    Self::Interrupt
                } else {
                    Self::Ignore(line.to_string())
                }
            }
            LineEvent::Interrupted => Self::Interrupt,
            LineEvent::Eof => Self::Close,
            LineEvent::Failed(e) => {
                warn!("Console input failed: {}", e);
                Self::Close
            }
        }
    }
}

/// Console user interface service.
pub struct ConsoleService {
    source: Option<LineSourceFactory>,
    watch_signals: bool,
    interrupted: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ConsoleService {
    /// Console reading from `source`, with SIGINT capture.
    pub fn new(source: LineSourceFactory) -> Self {
        Self {
            source: Some(source),
            watch_signals: true,
            interrupted: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Interactive console on the terminal.
    pub fn interactive(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self::new(Arc::new(move || {
            Ok(Box::new(ReedlineSource::new(prompt.clone())) as Box<dyn LineSource>)
        }))
    }

    /// Console that only listens for SIGINT.
    pub fn signals_only() -> Self {
        Self {
            source: None,
            ..Self::new(Arc::new(|| Err("no input".to_string())))
        }
    }

    /// Enable or disable SIGINT capture.
    pub fn with_signal_handler(mut self, enabled: bool) -> Self {
        self.watch_signals = enabled;
        self
    }

    /// Read and clear the interrupt flag. A pending SIGINT also counts.
    pub fn take_interrupted(&self) -> bool {
        let typed = self.interrupted.swap(false, Ordering::SeqCst);
        let signaled = self.watch_signals && signal::take_pending();
        typed || signaled
    }

    fn spawn_reader(factory: LineSourceFactory, tx: Sender<LineEvent>) -> std::io::Result<()> {
        thread::Builder::new()
            .name("console-input".into())
            .spawn(move || {
                let mut source = match factory() {
                    Ok(source) => source,
                    Err(e) => {
                        let _ = tx.send(LineEvent::Failed(e));
                        return;
                    }
                };
                loop {
                    let event = source.read_line();
                    let last = matches!(event, LineEvent::Eof | LineEvent::Failed(_));
                    if tx.send(event).is_err() || last {
                        break;
                    }
                }
            })
            .map(|_detached| ())
    }

    fn spawn_worker(&self, rx: Receiver<LineEvent>) -> std::io::Result<JoinHandle<()>> {
        let interrupted = Arc::clone(&self.interrupted);
        let shutdown = Arc::clone(&self.shutdown);

        thread::Builder::new()
            .name("console".into())
            .spawn(move || {
                while !shutdown.load(Ordering::SeqCst) {
                    let event = match rx.recv_timeout(WORKER_TICK) {
                        Ok(event) => event,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    };

                    match ConsoleAction::classify(event) {
                        ConsoleAction::Skip => {}
                        ConsoleAction::Interrupt => {
                            info!("Stop requested from console");
                            interrupted.store(true, Ordering::SeqCst);
                        }
                        ConsoleAction::Ignore(line) => debug!("Ignoring console input: {}", line),
                        ConsoleAction::Close => {
                            info!("Console input closed");
                            break;
                        }
                    }
                }
            })
    }
}

impl ServiceInterface<ConsoleCall, ConsoleReply> for ConsoleService {
    fn on_load(&self) -> HookResult {
        if self.watch_signals {
            signal::install()
                .map_err(|e| HookError::Degraded(format!("Unable to capture SIGINT: {}", e)))?;
        }
        Ok(())
    }

    fn on_unload(&self) -> HookResult {
        if self.watch_signals {
            signal::restore()
                .map_err(|e| HookError::Degraded(format!("Unable to restore SIGINT: {}", e)))?;
        }
        Ok(())
    }

    fn on_start(&self) -> HookResult {
        let Some(factory) = &self.source else {
            return Ok(());
        };

        self.shutdown.store(false, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();

        let worker = self
            .spawn_worker(rx)
            .map_err(|e| HookError::Fatal(format!("Unable to spawn console thread: {}", e)))?;
        Self::spawn_reader(Arc::clone(factory), tx)
            .map_err(|e| HookError::Fatal(format!("Unable to spawn input thread: {}", e)))?;

        let mut slot = self
            .worker
            .lock()
            .map_err(|_| HookError::Fatal("console worker slot poisoned".into()))?;
        *slot = Some(worker);
        Ok(())
    }

    fn on_stop(&self) -> HookResult {
        self.shutdown.store(true, Ordering::SeqCst);

        let handle = self
            .worker
            .lock()
            .map_err(|_| HookError::Degraded("console worker slot poisoned".into()))?
            .take();

        if let Some(handle) = handle {
            handle
                .join()
                .map_err(|_| HookError::Degraded("console thread panicked".into()))?;
        }
        Ok(())
    }

    fn dispatch(&self, call: ConsoleCall) -> Result<ConsoleReply, ProcedureError> {
        match call {
            ConsoleCall::TakeInterrupted => Ok(ConsoleReply::Interrupted(self.take_interrupted())),
            ConsoleCall::Solicit { prompt } => {
                debug!("Solicit is not supported (prompt: {:?})", prompt);
                Ok(ConsoleReply::Solicited(None))
            }
        }
    }
}

impl Service for ConsoleService {
    type Call = ConsoleCall;
    type Output = ConsoleReply;

    fn descriptor(&self) -> ServiceDescriptor {
        CONSOLE_SERVICE
    }

    fn interface(&self) -> Option<&dyn ServiceInterface<ConsoleCall, ConsoleReply>> {
        Some(self)
    }
}
