//! Scoped access to a dedicated drawing thread.
//!
//! Off-screen surfaces must be created and used on a single thread. A
//! [`RenderContext`] exists only on that thread for the duration of
//! [`RenderContext::run`], and the thread is joined before `run` returns on
//! every path, including errors and panics.
//!
//! Exports are background work, so the worker drops itself to the lowest
//! scheduling priority before running the job.

use std::marker::PhantomData;
use std::thread;

use thread_priority::{set_current_thread_priority, ThreadPriority};

use crate::canvas::Backend;
use crate::error::RenderError;

/// Capability to create drawing surfaces. Not `Send`: it cannot leave the
/// worker thread it was handed to.
pub struct RenderContext {
    thread_name: String,
    _not_send: PhantomData<*const ()>,
}

/// Failure is logged and the export proceeds at normal priority.
fn lower_priority(thread_name: &str) {
    if let Err(e) = set_current_thread_priority(ThreadPriority::Min) {
        log::warn!("Cannot lower priority of '{}': {:?}", thread_name, e);
    }
}

impl RenderContext {
    /// Run `job` on a fresh thread named `thread_name` and block until it ends.
    pub fn run<T, F>(thread_name: &str, job: F) -> Result<T, RenderError>
    where
        F: FnOnce(&RenderContext) -> Result<T, RenderError> + Send,
        T: Send,
    {
        thread::scope(|scope| {
            let handle = thread::Builder::new()
                .name(thread_name.to_string())
                .spawn_scoped(scope, move || {
                    lower_priority(thread_name);
                    let ctx = RenderContext {
                        thread_name: thread_name.to_string(),
                        _not_send: PhantomData,
                    };
                    log::debug!("Render context acquired on '{}'", ctx.thread_name);
                    let result = job(&ctx);
                    log::debug!("Render context released on '{}'", ctx.thread_name);
                    result
                })
                .map_err(RenderError::ContextSpawn)?;

            handle.join().map_err(|_| RenderError::ContextPanicked)?
        })
    }

    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// Allocate an off-screen surface bound to this context's thread.
    pub fn create_surface<B: Backend>(
        &self,
        backend: &B,
        width: u32,
        height: u32,
    ) -> Result<B::Surface, RenderError> {
        backend.create_surface(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runs_on_named_thread() {
        let caller = thread::current().id();
        let (name, id) = RenderContext::run("ctx-test", |ctx| {
            assert_eq!(ctx.thread_name(), "ctx-test");
            let current = thread::current();
            Ok((current.name().map(str::to_string), current.id()))
        })
        .unwrap();
        assert_eq!(name.as_deref(), Some("ctx-test"));
        assert_ne!(id, caller);
    }

    /// Nice value of the calling thread, from field 19 of its stat file.
    #[cfg(target_os = "linux")]
    fn current_nice() -> i64 {
        let stat = std::fs::read_to_string("/proc/thread-self/stat").unwrap();
        let after_comm = &stat[stat.rfind(')').unwrap() + 1..];
        after_comm.split_whitespace().nth(16).unwrap().parse().unwrap()
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_worker_runs_at_lowest_priority() {
        let caller = current_nice();
        let worker = RenderContext::run("ctx-nice", |_| Ok(current_nice())).unwrap();
        assert!(worker > caller, "worker nice {} not above caller nice {}", worker, caller);
        // The caller's own priority is untouched
        assert_eq!(current_nice(), caller);
    }

    #[test]
    fn test_borrows_caller_state() {
        let mut hits = vec![1, 2];
        RenderContext::run("ctx-borrow", |_| {
            hits.push(3);
            Ok(())
        })
        .unwrap();
        assert_eq!(hits, vec![1, 2, 3]);
    }

    #[test]
    fn test_error_is_returned() {
        let result: Result<(), _> = RenderContext::run("ctx-err", |_| {
            Err(RenderError::InvalidConfig("nope".into()))
        });
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn test_panic_is_reported() {
        let result: Result<(), _> = RenderContext::run("ctx-panic", |_| panic!("worker failed"));
        assert!(matches!(result, Err(RenderError::ContextPanicked)));
    }
}
