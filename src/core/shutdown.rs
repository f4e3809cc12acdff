//! # Shutdown signal plumbing.
//!
//! The panel runs headless under an init system, so "stop" arrives as a
//! process signal rather than user input. [`recv_shutdown_signal`] resolves
//! once a termination signal lands and reports which one, letting the event
//! stream record why the runtime went down.

/// Resolves when the process is asked to terminate, naming the signal.
///
/// Listens for `SIGINT`, `SIGTERM`, and `SIGQUIT`. Fails only if the
/// listeners cannot be registered.
#[cfg(unix)]
pub async fn recv_shutdown_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Resolves when the process is asked to terminate, naming the signal.
///
/// Ctrl-C is the only portable termination signal off Unix.
#[cfg(not(unix))]
pub async fn recv_shutdown_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl-c")
}
