// This is free and unencumbered software released into the public domain.

use crate::shared::{DroneError, DroneResult};
use core::ops::ControlFlow;
use std::{
    sync::mpsc::{RecvTimeoutError, SyncSender, sync_channel},
    thread::JoinHandle,
    time::Duration,
};

/// A background thread running `tick` every `interval` until it breaks or is stopped.
#[derive(Debug)]
pub(crate) struct Worker {
    stop_tx: SyncSender<()>,
    join: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn<F>(name: &str, interval: Duration, mut tick: F) -> DroneResult<Self>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let (stop_tx, stop_rx) = sync_channel::<()>(1);
        let join = std::thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if tick().is_break() {
                                break;
                            }
                        },
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| DroneError::driver("spawning worker thread", e))?;

        Ok(Self {
            stop_tx,
            join: Some(join),
        })
    }

    /// Returns once the thread has exited. Calling it from the worker itself
    /// only signals the stop.
    pub(crate) fn stop(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(j) = self.join.take() {
            if j.thread().id() == std::thread::current().id() {
                return;
            }
            let _ = j.join();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.stop();
    }
}
