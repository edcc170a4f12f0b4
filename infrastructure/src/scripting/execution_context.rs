//! Exclusive execution context for the Lua state.
//!
//! Every interaction with the runtime goes through [`ExecutionContext::acquire`],
//! which hands out a guard that releases on drop. Only one guard exists at a
//! time, so the control thread and the console thread never run script code
//! concurrently.

use cozmonaut_domain::ProcedureError;
use mlua::Lua;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard};

/// Owner of the Lua state. Empty while the runtime is down.
#[derive(Default)]
pub struct ExecutionContext {
    lua: Mutex<Option<Lua>>,
}

/// Exclusive access to a live Lua state.
pub struct ContextGuard<'a> {
    slot: MutexGuard<'a, Option<Lua>>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Park a freshly created state. Replaces any previous state.
    pub fn install(&self, lua: Lua) -> Result<(), ProcedureError> {
        let mut slot = self.lock()?;
        *slot = Some(lua);
        Ok(())
    }

    /// Remove the state, leaving the context empty.
    pub fn take(&self) -> Result<Option<Lua>, ProcedureError> {
        Ok(self.lock()?.take())
    }

    /// Block until the context is free, then hold it.
    pub fn acquire(&self) -> Result<ContextGuard<'_>, ProcedureError> {
        let slot = self.lock()?;
        if slot.is_none() {
            return Err(ProcedureError::RuntimeUnavailable);
        }
        Ok(ContextGuard { slot })
    }

    pub fn is_live(&self) -> bool {
        self.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Lua>>, ProcedureError> {
        self.lua
            .lock()
            .map_err(|_| ProcedureError::RuntimeUnavailable)
    }
}

impl Deref for ContextGuard<'_> {
    type Target = Lua;

    fn deref(&self) -> &Lua {
        match self.slot.as_ref() {
            Some(lua) => lua,
            None => unreachable!("guard is only created for a live state"),
        }
    }
}
