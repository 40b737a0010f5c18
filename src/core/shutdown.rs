//! # OS stop signals.
//!
//! [`wait_for_stop`] completes when any of the requested signals arrives.
//! Listeners are installed per call and dropped when it returns.
//!
//! On non-unix targets only [`StopSignal::CtrlC`] is observable; the other
//! variants are accepted and ignored.

use std::fmt;
use std::future::pending;

#[cfg(unix)]
use futures::future::select_all;

/// A termination signal that triggers the shutdown sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopSignal {
    /// `SIGINT`.
    Interrupt,
    /// `SIGTERM`.
    Terminate,
    /// `SIGQUIT`.
    Quit,
    /// `SIGHUP`.
    Hangup,
    /// Portable Ctrl-C.
    CtrlC,
}

impl StopSignal {
    /// `SIGTERM` and `SIGINT`, what service managers and terminals send.
    pub const DEFAULT: &'static [StopSignal] = &[StopSignal::Terminate, StopSignal::Interrupt];
}

impl fmt::Display for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopSignal::Interrupt => "SIGINT",
            StopSignal::Terminate => "SIGTERM",
            StopSignal::Quit => "SIGQUIT",
            StopSignal::Hangup => "SIGHUP",
            StopSignal::CtrlC => "ctrl-c",
        })
    }
}

/// Waits until one of `signals` is delivered and returns it.
///
/// An empty slice never completes. Fails if a listener cannot be installed.
#[cfg(unix)]
pub async fn wait_for_stop(signals: &[StopSignal]) -> std::io::Result<StopSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut listeners = Vec::with_capacity(signals.len());
    let mut ctrl_c = false;
    for &sig in signals {
        let kind = match sig {
            StopSignal::Interrupt => SignalKind::interrupt(),
            StopSignal::Terminate => SignalKind::terminate(),
            StopSignal::Quit => SignalKind::quit(),
            StopSignal::Hangup => SignalKind::hangup(),
            StopSignal::CtrlC => {
                ctrl_c = true;
                continue;
            }
        };
        listeners.push((sig, signal(kind)?));
    }

    let any_unix = async {
        if listeners.is_empty() {
            return pending::<StopSignal>().await;
        }
        let waits: Vec<_> = listeners
            .iter_mut()
            .map(|(sig, stream)| {
                let sig = *sig;
                Box::pin(async move {
                    stream.recv().await;
                    sig
                })
            })
            .collect();
        let (sig, _, _) = select_all(waits).await;
        sig
    };

    tokio::select! {
        sig = any_unix => Ok(sig),
        res = ctrl_c_or_pending(ctrl_c) => res.map(|()| StopSignal::CtrlC),
    }
}

/// Waits until one of `signals` is delivered and returns it.
#[cfg(not(unix))]
pub async fn wait_for_stop(signals: &[StopSignal]) -> std::io::Result<StopSignal> {
    ctrl_c_or_pending(signals.contains(&StopSignal::CtrlC)).await?;
    Ok(StopSignal::CtrlC)
}

async fn ctrl_c_or_pending(enabled: bool) -> std::io::Result<()> {
    if enabled {
        tokio::signal::ctrl_c().await
    } else {
        pending().await
    }
}
