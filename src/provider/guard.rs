//! Scoped `loading` flag.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use super::auth_provider::Core;

/// Holds `loading = true` for the duration of a sign-in or sign-out.
///
/// Acquisition increments the in-flight counter and raises the flag;
/// dropping the guard decrements it and clears the flag once no other
/// operation is in flight. The counter is only touched inside the watch
/// channel's write lock, so acquire and release never interleave.
///
/// Release happens on every exit path: normal return, early `?`, panic
/// unwinding, and the future being dropped mid-await.
pub(crate) struct LoadingGuard {
    core: Arc<Core>,
}

impl LoadingGuard {
    pub(crate) fn acquire(core: &Arc<Core>) -> Self {
        core.state.send_if_modified(|state| {
            core.in_flight.fetch_add(1, Ordering::SeqCst);
            if !core.is_mounted() {
                return false;
            }
            state.set_loading(true);
            true
        });

        Self {
            core: Arc::clone(core),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let core = &self.core;
        core.state.send_if_modified(|state| {
            let remaining = core.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            if remaining > 0 || !core.is_mounted() {
                return false;
            }
            state.set_loading(false);
            true
        });
    }
}
