//! Background idle check for a shared session.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::debug;

use crate::session::Session;

/// How often the ticker asks the session whether it has been idle too long.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(60);

/// Periodically calls [`Session::auto_lock_if_idle`] until dropped.
#[derive(Debug)]
pub struct AutoLockTimer {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl AutoLockTimer {
    pub fn start(session: Arc<Mutex<Session>>) -> io::Result<Self> {
        Self::with_interval(session, CHECK_INTERVAL)
    }

    pub fn with_interval(session: Arc<Mutex<Session>>, interval: Duration) -> io::Result<Self> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("sankrypt-autolock".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let mut session = session.lock().unwrap_or_else(|p| p.into_inner());
                        if session.auto_lock_if_idle() {
                            debug!("auto-lock fired");
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    /// Stop the ticker and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AutoLockTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}
