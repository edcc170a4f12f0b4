//! Lua sandbox: C module blocking, standard stream redirection, and the
//! script search path.
//!
//! Control scripts are trusted, so the standard library stays available.
//! Only native extension loading is blocked, and the standard streams are
//! rebound to the host's text sinks.

use mlua::prelude::*;
use std::path::Path;

/// Name of the preloaded module standing in for standard output.
pub const STDOUT_MODULE: &str = "hoststdout";
/// Name of the preloaded module standing in for standard error.
pub const STDERR_MODULE: &str = "hoststderr";

/// Restrict `require` to preloaded modules and Lua source files.
///
/// `package.loadlib` is removed and the two native searchers are dropped
/// from `package.searchers`, so a script that rewrites `package.cpath`
/// still cannot pull in a shared library.
pub fn apply_sandbox(lua: &Lua) -> LuaResult<()> {
    let package: LuaTable = lua.globals().get("package")?;
    package.set("loadlib", LuaValue::Nil)?;
    package.set("cpath", "")?;

    // 1 = preload, 2 = Lua files, 3 and 4 = native libraries
    let searchers: LuaTable = package.get("searchers")?;
    searchers.raw_set(4, LuaValue::Nil)?;
    searchers.raw_set(3, LuaValue::Nil)
}

/// Rebind the standard streams to the host sink modules and disable input.
///
/// Both sink modules must already be registered in `package.preload`.
pub fn confine_stdio(lua: &Lua) -> LuaResult<()> {
    let chunk = format!(
        r##"
        local out = require("{stdout}")
        local err = require("{stderr}")
        local open_lines = io.lines

        io.stdout = out
        io.stderr = err
        io.write = function(...)
            return out:write(...)
        end
        io.output = function()
            return out
        end

        print = function(...)
            local parts = {{}}
            for i = 1, select("#", ...) do
                parts[i] = tostring((select(i, ...)))
            end
            out:write(table.concat(parts, "\t"), "\n")
        end

        io.stdin = nil
        io.read = function()
            error("standard input is not available", 2)
        end
        io.input = function()
            error("standard input is not available", 2)
        end
        io.lines = function(filename, ...)
            if filename == nil then
                error("standard input is not available", 2)
            end
            return open_lines(filename, ...)
        end
    "##,
        stdout = STDOUT_MODULE,
        stderr = STDERR_MODULE,
    );
    lua.load(chunk).set_name("stdio").exec()
}

/// Prepend `<dir>/?.lua;<dir>/?/init.lua` to `package.path`.
pub fn extend_package_path(lua: &Lua, dir: &Path) -> LuaResult<()> {
    let package: LuaTable = lua.globals().get("package")?;
    let current: String = package.get("path")?;
    let dir = dir.to_string_lossy();
    package.set(
        "path",
        format!("{dir}/?.lua;{dir}/?/init.lua;{current}", dir = dir, current = current),
    )
}
