//! Lua runtime host service.
//!
//! [`LuaRuntimeHost`] owns one Lua state for the lifetime of the service and
//! runs the fixed snippets of the script catalog against its global table.
//! All access to the state goes through the [`ExecutionContext`], so the
//! control thread and the console thread take turns.

use cozmonaut_application::{HookResult, LogSink, Service, ServiceInterface};
use cozmonaut_domain::{
    HookError, HostCall, Operation, OutputStream, ProcedureError, ServiceDescriptor,
};
use mlua::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, error, info, trace, warn};

use super::execution_context::ExecutionContext;
use super::fault::ScriptFault;
use super::output_sink::{ThreadLineBuffers, preload_sink};
use super::sandbox::{
    STDERR_MODULE, STDOUT_MODULE, apply_sandbox, confine_stdio, extend_package_path,
};
use super::script_catalog::{control_snippet, operation_script};

/// Descriptor of the Lua service.
pub const LUA_SERVICE: ServiceDescriptor = ServiceDescriptor::new(
    "lua",
    "The Lua service hosts the scripting runtime and the operation control scripts.",
);

/// Runtime host service backed by mlua (Lua 5.4).
pub struct LuaRuntimeHost {
    script_dir: PathBuf,
    sink: Arc<dyn LogSink>,
    context: ExecutionContext,
    selected: Mutex<Option<Operation>>,
    stdout: Arc<ThreadLineBuffers>,
    stderr: Arc<ThreadLineBuffers>,
}

impl LuaRuntimeHost {
    /// Create a host that loads control scripts from `script_dir` and
    /// submits captured output and errors to `sink`.
    pub fn new(script_dir: impl Into<PathBuf>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            script_dir: script_dir.into(),
            stdout: Arc::new(ThreadLineBuffers::new(
                OutputStream::Stdout,
                Arc::clone(&sink),
            )),
            stderr: Arc::new(ThreadLineBuffers::new(
                OutputStream::Stderr,
                Arc::clone(&sink),
            )),
            sink,
            context: ExecutionContext::new(),
            selected: Mutex::new(None),
        }
    }

    pub fn script_dir(&self) -> &Path {
        &self.script_dir
    }

    /// Operation currently selected, if any.
    pub fn selected_operation(&self) -> Option<Operation> {
        self.lock_selected().ok().and_then(|selected| *selected)
    }

    pub fn is_runtime_live(&self) -> bool {
        self.context.is_live()
    }

    fn create_state(&self) -> LuaResult<Lua> {
        let lua = Lua::new();
        apply_sandbox(&lua)?;
        preload_sink(&lua, STDOUT_MODULE, Arc::clone(&self.stdout))?;
        preload_sink(&lua, STDERR_MODULE, Arc::clone(&self.stderr))?;
        Ok(lua)
    }

    fn exec_operation(&self, operation: Operation) -> Result<(), ProcedureError> {
        let lua = self.context.acquire()?;

        {
            let mut selected = self.lock_selected()?;
            if let Some(current) = *selected {
                error!("An operation was already selected ({})", current);
                return Err(ProcedureError::OperationAlreadySelected(current));
            }
            *selected = Some(operation);
        }

        info!("Executing operation {}", operation);
        let script = operation_script(operation);

        lua.create_table()
            .and_then(|args| lua.globals().set("args", args))
            .map_err(|e| self.fault(&e))?;

        self.run_snippet(&lua, "op_exec", script.exec)
    }

    fn forward(&self, call: HostCall) -> Result<(), ProcedureError> {
        let Some(snippet) = control_snippet(call) else {
            return Err(ProcedureError::Failed(format!(
                "{} has no control snippet",
                call.name()
            )));
        };

        if self.selected_operation().is_none() {
            debug!("Ignoring {}: no operation selected", call.name());
            return Err(ProcedureError::NoOperation);
        }

        let lua = self.context.acquire()?;
        self.run_snippet(&lua, call.name(), snippet)
    }

    fn run_snippet(&self, lua: &Lua, name: &str, code: &str) -> Result<(), ProcedureError> {
        trace!("Running snippet {}", name);
        lua.load(code)
            .set_name(name)
            .exec()
            .map_err(|e| self.fault(&e))
    }

    fn fault(&self, err: &LuaError) -> ProcedureError {
        let fault = ScriptFault::from_error(err);
        fault.report(self.sink.as_ref());
        fault.into()
    }

    fn lock_selected(&self) -> Result<MutexGuard<'_, Option<Operation>>, ProcedureError> {
        self.selected
            .lock()
            .map_err(|_| ProcedureError::Failed("operation selection lock poisoned".into()))
    }
}

impl ServiceInterface<HostCall, ()> for LuaRuntimeHost {
    fn on_load(&self) -> HookResult {
        let lua = self
            .create_state()
            .map_err(|e| HookError::Fatal(format!("Unable to initialize Lua interpreter: {}", e)))?;
        self.context
            .install(lua)
            .map_err(|e| HookError::Fatal(e.to_string()))
    }

    fn on_unload(&self) -> HookResult {
        let state = self
            .context
            .take()
            .map_err(|e| HookError::Degraded(e.to_string()))?;
        drop(state);

        if let Ok(mut selected) = self.selected.lock() {
            *selected = None;
        }

        self.stdout.flush_all();
        self.stderr.flush_all();
        Ok(())
    }

    fn on_start(&self) -> HookResult {
        let lua = self
            .context
            .acquire()
            .map_err(|e| HookError::Fatal(e.to_string()))?;

        let version: String = lua
            .globals()
            .get("_VERSION")
            .unwrap_or_else(|_| "unknown".to_string());
        info!("Lua library metadata follows");
        info!("{} (mlua, vendored)", version);

        confine_stdio(&lua)
            .map_err(|e| HookError::Fatal(format!("Unable to redirect standard streams: {}", e)))?;

        extend_package_path(&lua, &self.script_dir)
            .map_err(|e| HookError::Degraded(format!("Unable to extend package.path: {}", e)))?;

        if !self.script_dir.is_dir() {
            warn!(
                "Script directory {} does not exist",
                self.script_dir.display()
            );
        }
        Ok(())
    }

    fn on_stop(&self) -> HookResult {
        let Some(operation) = self
            .lock_selected()
            .map_err(|e| HookError::Degraded(e.to_string()))?
            .take()
        else {
            return Ok(());
        };

        info!("Stopping operation {}", operation);
        let lua = self
            .context
            .acquire()
            .map_err(|e| HookError::Degraded(e.to_string()))?;
        self.run_snippet(&lua, "op_stop", operation_script(operation).stop)
            .map_err(|e| HookError::Degraded(format!("Stopping {} raised: {}", operation, e)))
    }

    fn dispatch(&self, call: HostCall) -> Result<(), ProcedureError> {
        match call {
            HostCall::ExecOperation(operation) => self.exec_operation(operation),
            other => self.forward(other),
        }
    }
}

impl Service for LuaRuntimeHost {
    type Call = HostCall;
    type Output = ();

    fn descriptor(&self) -> ServiceDescriptor {
        LUA_SERVICE
    }

    fn interface(&self) -> Option<&dyn ServiceInterface<HostCall, ()>> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cozmonaut_application::{MemoryLogSink, ServiceCell};
    use cozmonaut_domain::{Diversion, LogLevel, ServiceError};
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    const INTERACT: &str = r#"
local Interact = {}
Interact.__index = Interact

function Interact.new(args)
    starts = (starts or 0)
    return setmetatable({ args = args, counter = 0 }, Interact)
end

function Interact:start()
    starts = starts + 1
    print("interact started")
    io.write("partial")
end

function Interact:stop()
    print("")
    print("interact stopped")
end

function Interact:auto_enable()
    auto = true
    io.stderr:write("auto on\n")
end

function Interact:auto_disable()
    auto = false
end

function Interact:manual_advance()
    local v = self.counter
    self.counter = v + 1
end

function Interact:manual_return()
    error("cannot return from here")
end

function Interact:manual_req_diversion_faces()
    diversion = "faces"
end

function Interact:test_low_battery()
    io.read()
end

return Interact
"#;

    const FRIENDS_LIST: &str = r#"
local List = {}
List.__index = List

function List.new(args)
    return setmetatable({}, List)
end

function List:start()
    print("1 friend")
end

function List:stop()
    error("list refuses to stop")
end

return List
"#;

    struct Fixture {
        _dir: TempDir,
        sink: Arc<MemoryLogSink>,
        cell: Arc<ServiceCell<LuaRuntimeHost>>,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let ops = dir.path().join("cozmonaut").join("operation");
        fs::create_dir_all(&ops).unwrap();
        fs::write(ops.join("interact.lua"), INTERACT).unwrap();
        fs::write(ops.join("friends_list.lua"), FRIENDS_LIST).unwrap();

        let sink = Arc::new(MemoryLogSink::new());
        let host = LuaRuntimeHost::new(dir.path(), sink.clone());
        let cell = Arc::new(ServiceCell::new(host));
        cell.load().unwrap();
        cell.start().unwrap();

        Fixture {
            _dir: dir,
            sink,
            cell,
        }
    }

    fn procedure_error(result: Result<(), ServiceError>) -> ProcedureError {
        result.unwrap_err().procedure_error().cloned().unwrap()
    }

    fn global<T: FromLua>(host: &LuaRuntimeHost, name: &str) -> T {
        host.context.acquire().unwrap().globals().get(name).unwrap()
    }

    #[test]
    fn test_descriptor() {
        let host = LuaRuntimeHost::new("scripts", Arc::new(MemoryLogSink::new()));
        assert_eq!(host.descriptor().name, "lua");
        assert!(host.descriptor().description.contains("scripting runtime"));
    }

    #[test]
    fn test_exec_runs_controller_and_captures_output() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();

        assert_eq!(
            f.cell.service().selected_operation(),
            Some(Operation::Interact)
        );
        assert_eq!(
            f.sink.messages_at(LogLevel::Info),
            vec!["(stdout) interact started"]
        );
        let args: LuaTable = global(f.cell.service(), "args");
        assert_eq!(args.len().unwrap(), 0);
    }

    #[test]
    fn test_second_exec_is_rejected_without_touching_namespace() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();

        let err = procedure_error(f.cell.call(HostCall::ExecOperation(Operation::FriendsList)));
        assert_eq!(
            err,
            ProcedureError::OperationAlreadySelected(Operation::Interact)
        );

        let starts: i64 = global(f.cell.service(), "starts");
        assert_eq!(starts, 1);
        assert!(
            !f.sink
                .messages_at(LogLevel::Info)
                .contains(&"(stdout) 1 friend".to_string())
        );
    }

    #[test]
    fn test_forwarding_without_operation_fails() {
        let f = fixture();
        let err = procedure_error(f.cell.call(HostCall::AutoEnable));
        assert_eq!(err, ProcedureError::NoOperation);

        let auto: LuaValue = global(f.cell.service(), "auto");
        assert!(auto.is_nil());
        assert!(f.sink.records().is_empty());
    }

    #[test]
    fn test_forwarding_calls_reach_controller() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();

        f.cell.call(HostCall::AutoEnable).unwrap();
        assert!(global::<bool>(f.cell.service(), "auto"));
        assert_eq!(
            f.sink.messages_at(LogLevel::Error),
            vec!["(stderr) auto on"]
        );

        f.cell.call(HostCall::AutoDisable).unwrap();
        assert!(!global::<bool>(f.cell.service(), "auto"));

        f.cell
            .call(HostCall::RequestDiversion(Diversion::Faces))
            .unwrap();
        let diversion: String = global(f.cell.service(), "diversion");
        assert_eq!(diversion, "faces");
    }

    #[test]
    fn test_stop_runs_stop_snippet_and_clears_selection() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();

        f.cell.stop().unwrap();
        assert_eq!(f.cell.service().selected_operation(), None);
        let op: LuaValue = global(f.cell.service(), "op");
        assert!(op.is_nil());

        let info = f.sink.messages_at(LogLevel::Info);
        assert!(info.contains(&"(stdout) partial".to_string()));
        assert!(info.contains(&"(stdout) interact stopped".to_string()));

        f.cell.start().unwrap();
        let err = procedure_error(f.cell.call(HostCall::ManualAdvance));
        assert_eq!(err, ProcedureError::NoOperation);
    }

    #[test]
    fn test_stop_clears_selection_when_stop_raises() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::FriendsList))
            .unwrap();

        f.cell.stop().unwrap();
        assert_eq!(f.cell.service().selected_operation(), None);
        let op: LuaValue = global(f.cell.service(), "op");
        assert!(op.is_nil());
        assert!(
            f.sink
                .messages_at(LogLevel::Error)
                .iter()
                .any(|m| m.contains("list refuses to stop"))
        );
    }

    #[test]
    fn test_script_exception_is_reported_and_returned() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();

        let err = procedure_error(f.cell.call(HostCall::ManualReturn));
        let ProcedureError::Script { kind, value } = err else {
            panic!("expected a script error, got {:?}", err);
        };
        assert_eq!(kind, "RuntimeError");
        assert!(value.contains("cannot return from here"));

        let errors = f.sink.messages_at(LogLevel::Error);
        assert_eq!(
            errors
                .iter()
                .filter(|m| m.contains("A Lua error has occurred"))
                .count(),
            1
        );
        assert!(errors.iter().any(|m| m.starts_with(" -> Traceback: ")));

        f.cell.call(HostCall::ManualAdvance).unwrap();
    }

    #[test]
    fn test_stdin_is_unavailable_to_scripts() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();

        let err = procedure_error(f.cell.call(HostCall::TestLowBattery));
        assert!(matches!(err, ProcedureError::Script { value, .. } if value.contains("standard input")));
    }

    #[test]
    fn test_missing_method_is_a_script_error() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::FriendsList))
            .unwrap();

        let err = procedure_error(f.cell.call(HostCall::AutoEnable));
        assert!(matches!(err, ProcedureError::Script { .. }));
    }

    #[test]
    fn test_missing_module_keeps_selection() {
        let f = fixture();
        let err = procedure_error(f.cell.call(HostCall::ExecOperation(Operation::FriendsRemove)));
        assert!(
            matches!(err, ProcedureError::Script { value, .. } if value.contains("cozmonaut.operation.friends_remove"))
        );
        assert_eq!(
            f.cell.service().selected_operation(),
            Some(Operation::FriendsRemove)
        );

        f.cell.stop().unwrap();
        assert_eq!(f.cell.service().selected_operation(), None);
    }

    #[test]
    fn test_concurrent_calls_are_serialized() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cell = Arc::clone(&f.cell);
                thread::spawn(move || {
                    for _ in 0..50 {
                        cell.call(HostCall::ManualAdvance).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let counter: i64 = f
            .cell
            .service()
            .context
            .acquire()
            .unwrap()
            .load("return op.counter")
            .eval()
            .unwrap();
        assert_eq!(counter, 400);
    }

    #[test]
    fn test_unload_tears_down_runtime_and_flushes() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();
        assert!(
            !f.sink
                .messages_at(LogLevel::Info)
                .contains(&"(stdout) partial".to_string())
        );

        f.cell.stop().unwrap();
        f.cell.unload().unwrap();

        let host = f.cell.service();
        assert!(!host.is_runtime_live());
        assert!(
            f.sink
                .messages_at(LogLevel::Info)
                .contains(&"(stdout) partial".to_string())
        );
        assert_eq!(
            host.dispatch(HostCall::ExecOperation(Operation::Interact)),
            Err(ProcedureError::RuntimeUnavailable)
        );
        assert_eq!(
            host.dispatch(HostCall::AutoEnable),
            Err(ProcedureError::NoOperation)
        );
    }

    #[test]
    fn test_reload_gives_fresh_namespace() {
        let f = fixture();
        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();
        f.cell.stop().unwrap();
        f.cell.unload().unwrap();

        f.cell.load().unwrap();
        f.cell.start().unwrap();
        let starts: LuaValue = global(f.cell.service(), "starts");
        assert!(starts.is_nil());

        f.cell
            .call(HostCall::ExecOperation(Operation::Interact))
            .unwrap();
        assert_eq!(global::<i64>(f.cell.service(), "starts"), 1);
    }

    #[test]
    fn test_bundled_scripts_run_every_operation() {
        let scripts = Path::new(env!("CARGO_MANIFEST_DIR")).join("../scripts");

        for operation in Operation::ALL {
            let sink = Arc::new(MemoryLogSink::new());
            let cell = ServiceCell::new(LuaRuntimeHost::new(&scripts, sink.clone()));
            cell.load().unwrap();
            cell.start().unwrap();

            cell.call(HostCall::ExecOperation(operation)).unwrap();
            if operation == Operation::Interact {
                cell.call(HostCall::ManualAdvance).unwrap();
                cell.call(HostCall::RequestDiversion(Diversion::Converse))
                    .unwrap();
                cell.call(HostCall::ManualAdvance).unwrap();
                cell.call(HostCall::AutoEnable).unwrap();
                cell.call(HostCall::TestLowBattery).unwrap();
            }
            cell.stop().unwrap();
            cell.unload().unwrap();

            let info = sink.messages_at(LogLevel::Info);
            assert!(info.iter().any(|m| m.starts_with("(stdout) start ")));
            assert!(info.iter().any(|m| m.starts_with("(stdout) stop ")));
            if operation == Operation::Interact {
                assert!(info.contains(&"(stdout) advanced to converse".to_string()));
                assert_eq!(
                    sink.messages_at(LogLevel::Error),
                    vec!["(stderr) battery low, heading home"]
                );
            }
        }
    }

    #[test]
    fn test_package_path_includes_script_dir() {
        let f = fixture();
        let path: String = f
            .cell
            .service()
            .context
            .acquire()
            .unwrap()
            .load("return package.path")
            .eval()
            .unwrap();
        let dir = f.cell.service().script_dir().to_string_lossy().into_owned();
        assert!(path.starts_with(&format!("{dir}/?.lua;{dir}/?/init.lua;")));
    }
}
