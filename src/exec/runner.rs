// src/exec/runner.rs

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{error, warn};

use crate::dag::TaskKey;
use crate::engine::TaskOutcome;
use crate::exec::body::TaskBody;

/// Run `body` for `task`, turning errors and panics into [`TaskOutcome`].
///
/// A panicking body must not unwind through the worker loop: the worker would
/// die without reporting the completion and the run could never finish.
pub fn run_guarded<T, B>(body: &B, task: &T) -> TaskOutcome
where
    T: TaskKey,
    B: TaskBody<T> + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| body.run(task))) {
        Ok(Ok(())) => TaskOutcome::Success,
        Ok(Err(err)) => {
            warn!(task = %task, error = %format!("{err:#}"), "task body failed");
            TaskOutcome::Failed(format!("{err:#}"))
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(task = %task, panic = %message, "task body panicked");
            TaskOutcome::Failed(format!("panicked: {message}"))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
