use crate::tui::{TuiActor, TuiMsg};
use crossterm::event;
use std::time::Duration;
use tokio::time;
use tracing::debug;
use woodchat_actors::actor::Addr;
use woodchat_actors::system::ShutdownHandle;

/// Frame interval; also paces redraws while a bubble is being typed.
pub const TICK: Duration = Duration::from_millis(40);

/// Longest time the input thread blocks before re-checking for shutdown.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Forward terminal input and a redraw tick into the TUI actor until shutdown.
pub fn spawn_tui_feeders(tui: Addr<TuiActor>, shutdown: ShutdownHandle) {
    spawn_input_reader(tui.clone(), shutdown.clone());

    tokio::spawn(async move {
        let mut interval = time::interval(TICK);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.wait() => break,
                _ = interval.tick() => {
                    // A full mailbox already has a redraw queued.
                    let _ = tui.try_send(TuiMsg::Tick);
                }
            }
        }
    });
}

// Polls instead of blocking in `read` so the thread ends with the session.
fn spawn_input_reader(tui: Addr<TuiActor>, shutdown: ShutdownHandle) {
    let rt = tokio::runtime::Handle::current();
    tokio::task::spawn_blocking(move || {
        while !shutdown.is_signalled() {
            let (msg, fatal) = match event::poll(INPUT_POLL) {
                Ok(false) => continue,
                Ok(true) => match event::read() {
                    Ok(ev) => (TuiMsg::InputEvent(ev), false),
                    Err(e) => (TuiMsg::OpError(format!("input: {e}")), false),
                },
                Err(e) => (TuiMsg::OpError(format!("input unavailable: {e}")), true),
            };
            if rt.block_on(tui.send(msg)).is_err() || fatal {
                break;
            }
        }
        debug!("tui.input.stopped");
    });
}
