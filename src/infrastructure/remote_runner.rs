//! Strategy execution on a dedicated runner thread.
//!
//! The runner owns its own sandbox context; the scheduler only sends query
//! expressions and waits for the count. Calls stay strictly sequential: the caller
//! blocks on every reply before issuing the next request.

use crate::domain::errors::{ConfigError, RunError};
use crate::domain::ports::QueryStrategy;
use crossbeam_channel::{Sender, bounded, unbounded};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

struct RunRequest {
    expression: String,
    reply: Sender<Result<usize, RunError>>,
}

/// Handle on a runner thread executing one strategy against its own context.
pub struct RemoteRunner {
    requests: Option<Sender<RunRequest>>,
    worker: Option<JoinHandle<()>>,
}

impl RemoteRunner {
    pub fn spawn<C, S>(name: &str, context: C, strategy: S) -> std::io::Result<Self>
    where
        C: Send + 'static,
        S: QueryStrategy<C> + 'static,
    {
        let (tx, rx) = unbounded::<RunRequest>();
        let worker = thread::Builder::new()
            .name(format!("runner-{}", name))
            .spawn(move || {
                for request in rx {
                    let result = strategy.run(&request.expression, &context);
                    if request.reply.send(result).is_err() {
                        debug!("RemoteRunner: caller went away before the reply");
                    }
                }
            })?;

        Ok(Self {
            requests: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn run(&self, expression: &str) -> Result<usize, RunError> {
        let requests = self.requests.as_ref().ok_or_else(|| RunError::Remote {
            message: "runner is shut down".to_string(),
        })?;
        let (reply_tx, reply_rx) = bounded(1);
        requests
            .send(RunRequest {
                expression: expression.to_string(),
                reply: reply_tx,
            })
            .map_err(|_| RunError::Remote {
                message: "runner thread has stopped".to_string(),
            })?;
        reply_rx.recv().map_err(|_| RunError::Remote {
            message: "runner dropped the request".to_string(),
        })?
    }
}

impl Drop for RemoteRunner {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("RemoteRunner: runner thread panicked");
            }
        }
    }
}

/// Strategy proxy whose calls are executed by a `RemoteRunner`.
///
/// The race's execution context is ignored: the runner queries the context it owns.
pub struct RemoteStrategy {
    id: String,
    name: String,
    runner: RemoteRunner,
}

impl RemoteStrategy {
    pub const SCAN_ID: &'static str = "remote_scan";

    pub fn spawn<C, S>(id: &str, context: C, strategy: S) -> Result<Self, ConfigError>
    where
        C: Send + 'static,
        S: QueryStrategy<C> + 'static,
    {
        let name = format!("{} (runner thread)", strategy.display_name());
        let runner = RemoteRunner::spawn(id, context, strategy).map_err(|err| {
            ConfigError::StrategyUnavailable {
                id: id.to_string(),
                reason: err.to_string(),
            }
        })?;
        Ok(Self {
            id: id.to_string(),
            name,
            runner,
        })
    }
}

impl<C: ?Sized> QueryStrategy<C> for RemoteStrategy {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn run(&self, query_expression: &str, _context: &C) -> Result<usize, RunError> {
        self.runner.run(query_expression)
    }
}
