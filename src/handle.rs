// Copyright (C) 2022 Yehowshua Immanuel
// This program is distributed under both the GPLV3 license
// and the YEHOWSHUA license, both of which can be found at
// the root of the folder containing the sources for this program.

//! Session registry behind opaque handles.
//!
//! Every operation reports a [`Status`] rather than a [`WaveError`]; the
//! error itself is logged. This is the surface a foreign caller binds to.
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Status, WaveError};
use crate::options::SimOptions;
use crate::vcd::{SimState, Simulation};

/// Opaque reference to a session of an [`Engine`]. Not `Clone`:
/// [`Engine::destroy`] takes it by value.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Handle(u64);

impl Handle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Version of this library as `(major, minor, patch)`.
pub fn lib_version() -> (u8, u8, u8) {
    let part = |text: &str| text.parse::<u8>().unwrap_or(0);
    (
        part(env!("CARGO_PKG_VERSION_MAJOR")),
        part(env!("CARGO_PKG_VERSION_MINOR")),
        part(env!("CARGO_PKG_VERSION_PATCH")),
    )
}

#[derive(Default)]
pub struct Engine {
    options: SimOptions,
    sessions: HashMap<u64, Simulation<File>>,
}

// handle ids are unique across every engine in the process
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

fn report(handle: &Handle, operation: &str, err: &WaveError) -> Status {
    let status = err.status();
    match status {
        Status::IoError | Status::Unknown => {
            tracing::warn!(handle = handle.0, operation, %err, "session operation failed")
        }
        _ => tracing::debug!(handle = handle.0, operation, %err, "session operation failed"),
    }
    status
}

impl Engine {
    pub fn new() -> Engine {
        Engine::default()
    }

    pub fn with_options(options: SimOptions) -> Engine {
        Engine {
            options,
            ..Engine::default()
        }
    }

    /// Opens `path` and registers a new session for it.
    pub fn create(&mut self, path: impl AsRef<Path>) -> Result<Handle, Status> {
        let path = path.as_ref();
        let sim = Simulation::open_with_options(path, self.options.clone()).map_err(|err| {
            tracing::warn!(path = %path.display(), %err, "failed to open dump");
            err.status()
        })?;

        let id = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
        self.sessions.insert(id, sim);
        tracing::debug!(handle = id, path = %path.display(), "created session");
        Ok(Handle(id))
    }

    fn session(&self, handle: &Handle) -> Result<&Simulation<File>, Status> {
        self.sessions.get(&handle.0).ok_or(Status::MissingData)
    }

    fn session_mut(&mut self, handle: &Handle) -> Result<&mut Simulation<File>, Status> {
        self.sessions.get_mut(&handle.0).ok_or(Status::MissingData)
    }

    pub fn load_header(&mut self, handle: &Handle) -> Status {
        let sim = match self.session_mut(handle) {
            Ok(sim) => sim,
            Err(status) => return status,
        };
        match sim.load_header() {
            Ok(_) => Status::Ok,
            Err(err) => report(handle, "load_header", &err),
        }
    }

    /// `restriction` lists variable names to track; `None` or an empty list
    /// tracks every variable.
    pub fn allocate_state(&mut self, handle: &Handle, restriction: Option<&[&str]>) -> Status {
        let sim = match self.session_mut(handle) {
            Ok(sim) => sim,
            Err(status) => return status,
        };
        match sim.allocate_state(restriction) {
            Ok(_) => Status::Ok,
            Err(err) => report(handle, "allocate_state", &err),
        }
    }

    /// The raw state buffer. Valid until the next call that takes the
    /// engine mutably.
    pub fn state_buffer(&self, handle: &Handle) -> Result<&[i8], Status> {
        let sim = self.session(handle)?;
        match sim.sim_state() {
            SimState::Created | SimState::HeaderLoaded => {
                let err = WaveError::InvalidState {
                    operation: "state_buffer",
                    state: sim.sim_state(),
                };
                Err(report(handle, "state_buffer", &err))
            }
            _ => Ok(sim.state().as_raw()),
        }
    }

    /// Advances one cycle. `Err(Status::EndOfInput)` once the dump is
    /// exhausted.
    pub fn next_cycle(&mut self, handle: &Handle) -> Result<(i64, &[i8]), Status> {
        let sim = self.sessions.get_mut(&handle.0).ok_or(Status::MissingData)?;
        match sim.advance() {
            Ok(Some(cycle)) => Ok((cycle.index(), cycle.as_raw())),
            Ok(None) => Err(Status::EndOfInput),
            Err(err) => Err(report(handle, "next_cycle", &err)),
        }
    }

    /// The header description as JSON.
    pub fn header_info(&self, handle: &Handle) -> Result<String, Status> {
        let sim = self.session(handle)?;
        sim.header_info()
            .and_then(|info| info.to_json())
            .map_err(|err| report(handle, "header_info", &err))
    }

    /// Closes the session. The handle cannot be used afterwards.
    pub fn destroy(&mut self, handle: Handle) -> Status {
        match self.sessions.remove(&handle.0) {
            Some(_) => {
                tracing::debug!(handle = handle.0, "destroyed session");
                Status::Ok
            }
            None => Status::MissingData,
        }
    }

    pub fn num_sessions(&self) -> usize {
        self.sessions.len()
    }
}
