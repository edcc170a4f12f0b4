//! SIGINT capture.
//!
//! The handler only sets a process-wide flag. The console service drains it
//! through [`take_pending`].

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static SIGINT_PENDING: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn on_sigint(_signum: libc::c_int) {
    SIGINT_PENDING.store(true, Ordering::SeqCst);
}

/// Route SIGINT to the pending flag.
#[cfg(unix)]
pub fn install() -> io::Result<()> {
    let handler = on_sigint as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // SAFETY: the handler only performs an atomic store.
    let previous = unsafe { libc::signal(libc::SIGINT, handler) };
    if previous == libc::SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Put the default SIGINT disposition back.
#[cfg(unix)]
pub fn restore() -> io::Result<()> {
    // SAFETY: SIG_DFL is always a valid disposition.
    let previous = unsafe { libc::signal(libc::SIGINT, libc::SIG_DFL) };
    if previous == libc::SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn install() -> io::Result<()> {
    Ok(())
}

#[cfg(not(unix))]
pub fn restore() -> io::Result<()> {
    Ok(())
}

/// Read and clear the pending flag.
pub fn take_pending() -> bool {
    SIGINT_PENDING.swap(false, Ordering::SeqCst)
}
