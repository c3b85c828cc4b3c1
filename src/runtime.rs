use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// Everything the control loop reacts to: a key press, a terminal resize,
/// or the countdown heartbeat.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Where events come from. The binary plugs in the crossterm reader; headless
/// tests plug in a plain channel and feed the session by hand.
pub trait EventSource: Send + 'static {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Bridges crossterm's blocking `event::read` onto a channel. Key releases
/// are dropped so terminals that report them don't double-fire transitions.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                    tx.send(AppEvent::Key(key))
                }
                Ok(CtEvent::Resize(_, _)) => tx.send(AppEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-backed source for driving the loop without a terminal. Dropping
/// the sender leaves the pump ticking, which is exactly what a countdown
/// test wants.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

/// Paired sender + source, the headless stand-in for a terminal.
pub fn channel() -> (Sender<AppEvent>, ChannelEventSource) {
    let (tx, rx) = mpsc::channel();
    (tx, ChannelEventSource { rx })
}

impl EventSource for ChannelEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Turns a source plus a fixed interval into a steady stream: real events
/// pass through, and every quiet interval becomes a [`AppEvent::Tick`].
pub struct EventPump<E: EventSource> {
    source: E,
    tick_interval: Duration,
}

impl<E: EventSource> EventPump<E> {
    pub fn new(source: E, tick_interval: Duration) -> Self {
        Self {
            source,
            tick_interval,
        }
    }

    pub fn step(&self) -> AppEvent {
        match self.source.recv_timeout(self.tick_interval) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}
