//! Capture of the runtime's standard output and error streams.
//!
//! Text written by scripts arrives in arbitrary fragments. Each stream keeps
//! one [`LineBuffer`] per writing thread, so fragments from different threads
//! never end up on the same line. Completed lines become log records tagged
//! `lua`.

use cozmonaut_application::LogSink;
use cozmonaut_domain::{LineBuffer, LogRecord, OutputStream};
use mlua::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

/// Log tag for everything the runtime prints.
pub const OUTPUT_TAG: &str = "lua";

/// Per-thread line buffers for one output stream.
pub struct ThreadLineBuffers {
    stream: OutputStream,
    sink: Arc<dyn LogSink>,
    buffers: Mutex<HashMap<ThreadId, LineBuffer>>,
}

impl ThreadLineBuffers {
    pub fn new(stream: OutputStream, sink: Arc<dyn LogSink>) -> Self {
        Self {
            stream,
            sink,
            buffers: Mutex::new(HashMap::new()),
        }
    }

    pub fn stream(&self) -> OutputStream {
        self.stream
    }

    /// Append bytes written by the current thread.
    ///
    /// A thread's entry only lives while it holds an unterminated line.
    pub fn write(&self, chunk: impl AsRef<[u8]>) {
        let mut lines = Vec::new();
        if let Ok(mut buffers) = self.buffers.lock() {
            let id = thread::current().id();
            let buffer = buffers.entry(id).or_default();
            buffer.write(chunk, |line| lines.push(line));
            if buffer.is_empty() {
                buffers.remove(&id);
            }
        }
        self.submit(lines);
    }

    /// Emit the current thread's partial line, if any.
    pub fn flush_current(&self) {
        let mut lines = Vec::new();
        if let Ok(mut buffers) = self.buffers.lock()
            && let Some(mut buffer) = buffers.remove(&thread::current().id())
        {
            buffer.flush(|line| lines.push(line));
        }
        self.submit(lines);
    }

    /// Number of threads currently holding an unterminated line.
    pub fn pending_threads(&self) -> usize {
        self.buffers.lock().map(|buffers| buffers.len()).unwrap_or(0)
    }

    /// Emit every thread's partial line and forget all buffers.
    pub fn flush_all(&self) {
        let mut lines = Vec::new();
        if let Ok(mut buffers) = self.buffers.lock() {
            for (_, mut buffer) in buffers.drain() {
                buffer.flush(|line| lines.push(line));
            }
        }
        self.submit(lines);
    }

    fn submit(&self, lines: Vec<String>) {
        for line in lines {
            self.sink.submit(LogRecord::new(
                self.stream.level(),
                OUTPUT_TAG,
                format!("({}) {}", self.stream.as_str(), line),
            ));
        }
    }
}

/// File-like Lua object backed by [`ThreadLineBuffers`].
///
/// Supports the subset of the Lua file API that scripts use for output:
/// `write(...)`, `flush()`, `setvbuf(...)` and `close()`.
#[derive(Clone)]
pub struct TextSink {
    buffers: Arc<ThreadLineBuffers>,
}

impl TextSink {
    pub fn new(buffers: Arc<ThreadLineBuffers>) -> Self {
        Self { buffers }
    }
}

impl LuaUserData for TextSink {
    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_function("write", |lua, (ud, args): (LuaAnyUserData, LuaMultiValue)| {
            {
                let this = ud.borrow::<TextSink>()?;
                for arg in args {
                    this.buffers.write(write_arg(lua, arg)?);
                }
            }
            Ok(ud)
        });

        methods.add_method("flush", |_, this, ()| {
            this.buffers.flush_current();
            Ok(true)
        });

        // Buffering is line-based regardless of the requested mode.
        methods.add_method("setvbuf", |_, _, _: LuaMultiValue| Ok(true));

        methods.add_method("close", |_, _, ()| -> LuaResult<(LuaValue, String)> {
            Ok((LuaValue::Nil, "cannot close standard file".to_string()))
        });

        methods.add_meta_method(LuaMetaMethod::ToString, |_, this, ()| {
            Ok(format!("host {} sink", this.buffers.stream().as_str()))
        });
    }
}

/// Raw bytes of one `write` argument. Strings pass through untouched and
/// numbers are converted by the runtime itself.
fn write_arg(lua: &Lua, value: LuaValue) -> LuaResult<Vec<u8>> {
    let type_name = value.type_name();
    match value {
        LuaValue::String(s) => Ok(s.as_bytes().to_vec()),
        number @ (LuaValue::Integer(_) | LuaValue::Number(_)) => match lua.coerce_string(number)? {
            Some(s) => Ok(s.as_bytes().to_vec()),
            None => Err(bad_write_arg(type_name)),
        },
        _ => Err(bad_write_arg(type_name)),
    }
}

fn bad_write_arg(type_name: &str) -> LuaError {
    LuaError::runtime(format!(
        "bad argument to 'write' (string expected, got {})",
        type_name
    ))
}

/// Register `name` in `package.preload` so that `require(name)` yields a
/// [`TextSink`] over `buffers`.
pub fn preload_sink(lua: &Lua, name: &str, buffers: Arc<ThreadLineBuffers>) -> LuaResult<()> {
    let preload: LuaTable = lua
        .globals()
        .get::<LuaTable>("package")?
        .get("preload")?;
    let sink = TextSink::new(buffers);
    let loader = lua.create_function(move |lua, _: LuaMultiValue| lua.create_userdata(sink.clone()))?;
    preload.set(name, loader)
}
