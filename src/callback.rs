// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The message callback.
//!
//! One process-wide callback receives every diagnostic llri produces: validation failures
//! from the frontend ([MessageSource::Api]) and messages forwarded from the backend's own
//! validation layers ([MessageSource::Implementation]).  Every message is also written to
//! logwise, whether or not a callback is installed.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::{Arc, LazyLock};

use wasm_safe_mutex::Mutex;

closed_enum! {
    /// How serious a message is.
    pub enum MessageSeverity {
        /// Diagnostic chatter.
        Verbose = 0,
        /// Informational.
        Info = 1,
        /// Likely a mistake, but the operation continued.
        Warning = 2,
        /// Invalid usage.  The operation failed.
        Error = 3,
        /// Backend state may be corrupt.
        Corruption = 4,
    }
}

closed_enum! {
    /// Where a message came from.
    pub enum MessageSource {
        /// The frontend validation layer.
        Api = 0,
        /// The backend or its driver.
        Implementation = 1,
    }
}

type UserCallback = Arc<dyn Fn(MessageSeverity, MessageSource, &str) + Send + Sync>;

static USER_CALLBACK: LazyLock<Mutex<Option<UserCallback>>> = LazyLock::new(|| Mutex::new(None));

thread_local! {
    static IN_CALLBACK: Cell<bool> = const { Cell::new(false) };
}

/// Installs the process-wide message callback, replacing any previous one.
///
/// The callback may run on any thread that calls into llri.  Calls into llri made from inside
/// the callback do not report messages back into it.
pub fn set_user_callback<F>(callback: F)
where
    F: Fn(MessageSeverity, MessageSource, &str) + Send + Sync + 'static,
{
    *USER_CALLBACK.lock_sync() = Some(Arc::new(callback));
}

/// Removes the process-wide message callback.  Later messages only reach the log.
pub fn clear_user_callback() {
    *USER_CALLBACK.lock_sync() = None;
}

fn log(severity: MessageSeverity, source: MessageSource, message: &str) {
    match severity {
        MessageSeverity::Verbose => {
            logwise::trace_sync!(
                "llri {source}: {message}",
                source = logwise::privacy::LogIt(&source),
                message = logwise::privacy::LogIt(&message)
            );
        }
        MessageSeverity::Info => {
            logwise::info_sync!(
                "llri {source}: {message}",
                source = logwise::privacy::LogIt(&source),
                message = logwise::privacy::LogIt(&message)
            );
        }
        MessageSeverity::Warning => {
            logwise::warn_sync!(
                "llri {source}: {message}",
                source = logwise::privacy::LogIt(&source),
                message = logwise::privacy::LogIt(&message)
            );
        }
        MessageSeverity::Error | MessageSeverity::Corruption => {
            logwise::error_sync!(
                "llri {source}: {message}",
                source = logwise::privacy::LogIt(&source),
                message = logwise::privacy::LogIt(&message)
            );
        }
    }
}

/// Delivers a message to the log and the user callback.
pub(crate) fn emit(severity: MessageSeverity, source: MessageSource, message: &str) {
    log(severity, source, message);
    if IN_CALLBACK.with(Cell::get) {
        logwise::trace_sync!("llri: dropped a message raised from inside the user callback");
        return;
    }
    //clone out so the lock is not held while user code runs
    let callback = USER_CALLBACK.lock_sync().clone();
    if let Some(callback) = callback {
        IN_CALLBACK.with(|c| c.set(true));
        let _reset = ResetOnDrop;
        callback(severity, source, message);
    }
}

struct ResetOnDrop;
impl Drop for ResetOnDrop {
    fn drop(&mut self) {
        IN_CALLBACK.with(|c| c.set(false));
    }
}

/// Collects messages from a backend until the frontend forwards them.
///
/// Backends push into a messenger from wherever their diagnostics arrive (device error
/// handlers, queue worker threads).  The frontend drains it after each dispatched call.
pub(crate) struct Messenger {
    pending: Mutex<VecDeque<(MessageSeverity, String)>>,
}

impl Messenger {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Messenger {
            pending: Mutex::new(VecDeque::new()),
        })
    }

    pub(crate) fn push(&self, severity: MessageSeverity, message: impl Into<String>) {
        self.pending.lock_sync().push_back((severity, message.into()));
    }

    /// Forwards every pending message with [MessageSource::Implementation].
    pub(crate) fn poll(&self) {
        let drained: Vec<_> = self.pending.lock_sync().drain(..).collect();
        for (severity, message) in drained {
            emit(severity, MessageSource::Implementation, &message);
        }
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.pending.lock_sync().len()
    }
}

impl std::fmt::Debug for Messenger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Messenger").finish_non_exhaustive()
    }
}
