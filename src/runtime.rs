use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::warn;

use crate::session::KeyInput;

/// Unified event type consumed by the host loop
#[derive(Clone, Debug)]
pub enum TypeEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// The event source hung up; nothing will ever arrive again.
    Closed,
}

/// Source of terminal events (keyboard, resize, etc.)
pub trait TypeEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<TypeEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    rx: Receiver<TypeEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(TypeEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(TypeEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "terminal event reader stopped");
                    break;
                }
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

impl TypeEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<TypeEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<TypeEvent>) -> Self {
        Self { rx }
    }
}

impl TypeEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<TypeEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the host loop one event/tick at a time
pub struct Runner<E: TypeEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: TypeEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, Tick on timeout,
    /// or Closed once the source is gone
    pub fn step(&self) -> TypeEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => TypeEvent::Tick,
            Err(RecvTimeoutError::Disconnected) => TypeEvent::Closed,
        }
    }
}

/// Translate a raw key press into session input
pub fn key_input(key: KeyEvent) -> KeyInput {
    if key.kind == KeyEventKind::Release {
        return KeyInput::Idle;
    }

    match key.code {
        KeyCode::Esc => KeyInput::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyInput::Quit,
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Char(c) => KeyInput::Char(c),
        // never matches a passage character, so it counts as a miss
        KeyCode::Enter => KeyInput::Char('\n'),
        KeyCode::Tab => KeyInput::Char('\t'),
        _ => KeyInput::Idle,
    }
}

/// Translate whatever the runner produced into session input
pub fn event_input(event: &TypeEvent) -> KeyInput {
    match event {
        TypeEvent::Key(key) => key_input(*key),
        TypeEvent::Resize | TypeEvent::Tick => KeyInput::Idle,
        // no more input can arrive, so the session cannot go on
        TypeEvent::Closed => KeyInput::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use std::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        let ev = runner.step();
        match ev {
            TypeEvent::Tick => {}
            _ => panic!("expected Tick on timeout"),
        }
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(TypeEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        match runner.step() {
            TypeEvent::Resize => {}
            _ => panic!("expected Resize event"),
        }
    }

    #[test]
    fn step_reports_closed_after_sender_dropped() {
        let (tx, rx) = mpsc::channel::<TypeEvent>();
        drop(tx);
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );

        assert!(matches!(runner.step(), TypeEvent::Closed));
        // and keeps saying so rather than pretending to tick
        assert!(matches!(runner.step(), TypeEvent::Closed));
    }

    #[test]
    fn step_drains_queued_events_before_closed() {
        let (tx, rx) = mpsc::channel();
        tx.send(TypeEvent::Resize).unwrap();
        drop(tx);
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );

        assert!(matches!(runner.step(), TypeEvent::Resize));
        assert!(matches!(runner.step(), TypeEvent::Closed));
    }

    #[test]
    fn printable_keys_map_to_chars() {
        assert_eq!(key_input(key(KeyCode::Char('a'))), KeyInput::Char('a'));
        assert_eq!(
            key_input(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            KeyInput::Char('A')
        );
        assert_eq!(key_input(key(KeyCode::Char(' '))), KeyInput::Char(' '));
        assert_eq!(key_input(key(KeyCode::Enter)), KeyInput::Char('\n'));
        assert_eq!(key_input(key(KeyCode::Tab)), KeyInput::Char('\t'));
    }

    #[test]
    fn control_keys_map_to_actions() {
        assert_eq!(key_input(key(KeyCode::Backspace)), KeyInput::Backspace);
        assert_eq!(key_input(key(KeyCode::Esc)), KeyInput::Quit);
        assert_eq!(
            key_input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyInput::Quit
        );
    }

    #[test]
    fn other_keys_are_idle() {
        assert_eq!(key_input(key(KeyCode::Left)), KeyInput::Idle);
        assert_eq!(key_input(key(KeyCode::F(1))), KeyInput::Idle);

        let release = KeyEvent::new_with_kind_and_state(
            KeyCode::Char('a'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        );
        assert_eq!(key_input(release), KeyInput::Idle);
    }

    #[test]
    fn non_key_events_are_idle() {
        assert_eq!(event_input(&TypeEvent::Tick), KeyInput::Idle);
        assert_eq!(event_input(&TypeEvent::Resize), KeyInput::Idle);
        assert_eq!(event_input(&TypeEvent::Closed), KeyInput::Quit);
        assert_eq!(
            event_input(&TypeEvent::Key(key(KeyCode::Char('z')))),
            KeyInput::Char('z')
        );
    }
}
