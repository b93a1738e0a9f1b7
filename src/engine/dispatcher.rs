// src/engine/dispatcher.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::engine::handler::RestartHandler;
use crate::engine::{CycleOutcome, CycleReport, RouterEvent};
use crate::exec::ProcessLauncher;
use crate::watch::SignalEvent;

/// Single consumer of [`RouterEvent`]s.
///
/// Every watched directory sends into the same channel; this loop awaits
/// each restart cycle to completion before taking the next event.
pub struct RestartDispatcher<L: ProcessLauncher> {
    handler: RestartHandler<L>,
    event_rx: mpsc::UnboundedReceiver<RouterEvent>,
    report_tx: Option<mpsc::UnboundedSender<CycleReport>>,
}

impl<L: ProcessLauncher> fmt::Debug for RestartDispatcher<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestartDispatcher")
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher> RestartDispatcher<L> {
    pub fn new(handler: RestartHandler<L>, event_rx: mpsc::UnboundedReceiver<RouterEvent>) -> Self {
        Self {
            handler,
            event_rx,
            report_tx: None,
        }
    }

    /// Publish a [`CycleReport`] after every cycle.
    pub fn with_reports(mut self, report_tx: mpsc::UnboundedSender<CycleReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    /// Main loop. Returns the handler (and with it the supervisor and any
    /// still-current process) once shutdown is requested or every sender is
    /// gone.
    pub async fn run(mut self) -> RestartHandler<L> {
        info!("restart dispatcher started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("router event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "dispatcher received event");

            match event {
                RouterEvent::SignalCreated(signal) => self.dispatch(signal).await,
                RouterEvent::ShutdownRequested => {
                    info!("shutdown requested; stopping dispatcher");
                    break;
                }
            }
        }

        self.handler
    }

    async fn dispatch(&mut self, signal: SignalEvent) {
        let outcome = match self.handler.handle(&signal).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(signal = ?signal.path, error = %err, "restart cycle failed");
                CycleOutcome::Failed(err.to_string())
            }
        };

        if let Some(tx) = &self.report_tx {
            // Nobody listening any more is fine.
            let _ = tx.send(CycleReport {
                signal: signal.path,
                outcome,
            });
        }
    }
}
