//! Invocation state machine.
//!
//! Handler commands: PARSING → ACQUIRING_BACKEND → RUNNING → COMPLETING →
//! CLEANING_UP → SETTLED. `init`: ACQUIRING_BACKEND → INIT_WAIT → CLEANING_UP →
//! SETTLED.

use std::any::Any;
use std::sync::Arc;

use clap::ArgMatches;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinError;

use super::{CleanupSlot, Completion, ExecutionContext, Harness, Signal};
use crate::backend::{AcquireOptions, Acquired, NodeEvent};
use crate::command::builtin::{DAEMON_COMMAND, SHUTDOWN_COMMAND};
use crate::command::{expand_aliases, split_request, CommandKind, Handler};
use crate::error::{BackendError, ExecError};
use crate::logging::{log_command_complete, log_command_error, log_command_start, log_state};
use crate::sink::{OutputBuffer, OutputSink};

impl Harness {
    /// Runs one command and resolves with everything it wrote, concatenated in order.
    ///
    /// Rejects with the [`ExecError`] kind matching where the run failed.
    pub async fn execute(&self, request: &str) -> Result<String, ExecError> {
        let argv = expand_aliases(split_request(request));
        log_command_start(&argv);
        let command = argv.first().cloned().unwrap_or_default();
        let result = self.dispatch(&argv).await;
        match &result {
            Ok(output) => log_command_complete(&command, output.len()),
            Err(err) => log_command_error(&command, err),
        }
        result
    }

    /// Runs a command that is expected to fail.
    ///
    /// Resolves with the failure's message; rejects with
    /// [`ExecError::UnexpectedSuccess`] when the command succeeds.
    pub async fn fail(&self, request: &str) -> Result<String, ExecError> {
        match self.execute(request).await {
            Ok(output) => Err(ExecError::UnexpectedSuccess {
                command: request.trim().to_string(),
                output,
            }),
            Err(err) => Ok(err.to_string()),
        }
    }

    async fn dispatch(&self, argv: &[String]) -> Result<String, ExecError> {
        let descriptor = self.registry.resolve(argv)?;
        let command = descriptor.name();
        log_state(command, "PARSING");
        match descriptor.kind() {
            CommandKind::Init => self.run_init(command).await,
            CommandKind::Run(handler) => {
                let args = descriptor.parse(argv)?;
                self.run_handler(command, handler.clone(), args).await
            }
        }
    }

    fn acquire_options(&self, command: &str) -> AcquireOptions {
        if command == DAEMON_COMMAND {
            AcquireOptions::with_api(self.config.daemon_api_addr.clone())
        } else {
            AcquireOptions::offline()
        }
    }

    async fn run_init(&self, command: &str) -> Result<String, ExecError> {
        log_state(command, "ACQUIRING_BACKEND");
        let mut slot = CleanupSlot::default();
        let Acquired { node, cleanup } = self
            .accessor
            .acquire(AcquireOptions::offline())
            .await
            .map_err(ExecError::BackendAcquisition)?;
        slot.fill(cleanup);

        log_state(command, "INIT_WAIT");
        let mut events = node.subscribe();
        let initialized = match node.init().await {
            Ok(()) => wait_for_init(&mut events).await,
            Err(err) => Err(err),
        };

        log_state(command, "CLEANING_UP");
        let released = slot.release().await;
        initialized.map_err(ExecError::Init)?;
        released.map_err(ExecError::Cleanup)?;
        log_state(command, "SETTLED");
        Ok(String::new())
    }

    async fn run_handler(
        &self,
        command: &str,
        handler: Arc<dyn Handler>,
        args: ArgMatches,
    ) -> Result<String, ExecError> {
        log_state(command, "ACQUIRING_BACKEND");
        let mut slot = CleanupSlot::default();
        let Acquired { node, cleanup } = self
            .accessor
            .acquire(self.acquire_options(command))
            .await
            .map_err(ExecError::BackendAcquisition)?;
        slot.fill(cleanup);

        log_state(command, "RUNNING");
        let buffer = OutputBuffer::new();
        let (signals_tx, mut signals) = mpsc::unbounded_channel();
        let sink = OutputSink::new(
            buffer.clone(),
            signals_tx.clone(),
            self.config.sentinel_detection,
        );
        let ctx = ExecutionContext::new(node, Completion::new(signals_tx.clone()), sink);
        let mut task = tokio::spawn(async move {
            if let Err(err) = handler.run(args, ctx).await {
                let _ = signals_tx.send(Signal::Fault(err));
            }
        });

        // A handler may keep a context clone alive past its return, so the
        // channel can stay open; the task's exit settles the run instead.
        let outcome = tokio::select! {
            biased;
            Some(signal) = signals.recv() => Outcome::Signalled(signal),
            joined = &mut task => match signals.try_recv() {
                Ok(signal) => Outcome::Signalled(signal),
                Err(_) => Outcome::Exited(joined),
            },
        };
        log_state(command, "COMPLETING");
        match outcome {
            Outcome::Signalled(Signal::Done) | Outcome::Signalled(Signal::Ready) => {
                log_state(command, "CLEANING_UP");
                slot.release().await.map_err(ExecError::Cleanup)?;
                if command == SHUTDOWN_COMMAND {
                    tokio::time::sleep(self.config.shutdown_delay).await;
                }
                log_state(command, "SETTLED");
                Ok(buffer.contents())
            }
            Outcome::Signalled(Signal::Failed(err)) => {
                slot.abandon();
                Err(ExecError::Completion(err))
            }
            Outcome::Signalled(Signal::Fault(err)) => {
                let text = err.to_string();
                release_after_failure(command, slot).await;
                Err(ExecError::HandlerFault(text))
            }
            Outcome::Exited(joined) => {
                release_after_failure(command, slot).await;
                match joined {
                    Err(err) if err.is_panic() => Err(ExecError::HandlerFault(panic_message(
                        err.into_panic(),
                    ))),
                    _ => Err(ExecError::CompletionDropped),
                }
            }
        }
    }
}

/// How the RUNNING state ended.
enum Outcome {
    /// First message on the completion channel.
    Signalled(Signal),
    /// The handler task ended with nothing on the channel.
    Exited(Result<(), JoinError>),
}

/// Runs cleanup on a failure path. Its own error is logged; the original failure wins.
async fn release_after_failure(command: &str, slot: CleanupSlot) {
    log_state(command, "CLEANING_UP");
    if let Err(err) = slot.release().await {
        tracing::warn!(command = command, %err, "cleanup failed after handler failure");
    }
}

async fn wait_for_init(events: &mut broadcast::Receiver<NodeEvent>) -> Result<(), BackendError> {
    loop {
        match events.recv().await {
            Ok(NodeEvent::Init) => return Ok(()),
            Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return Err(BackendError::Stopped),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("handler panicked: {detail}")
}
