use std::io;
use std::sync::Once;

use crossterm::{cursor::Show, execute, terminal::disable_raw_mode, terminal::LeaveAlternateScreen};
use ratatui::{backend::Backend, Frame, Terminal};
use tracing::{debug, warn};

use crate::runtime::{event_input, Runner, Ticker, TypeEvent, TypeEventSource};
use crate::session::{KeyInput, TypingSession};
use crate::window::Window;

/// Drive `session` from `runner` until it is complete or cancelled,
/// redrawing after every accepted event.
pub fn run_session<B, E, T>(
    terminal: &mut Terminal<B>,
    session: &mut TypingSession,
    runner: &Runner<E, T>,
    rows: usize,
    cols: usize,
) -> io::Result<()>
where
    B: Backend,
    E: TypeEventSource,
    T: Ticker,
{
    terminal.draw(|f| draw(f, session, rows, cols))?;

    while !session.has_finished() {
        let event = runner.step();
        let input = event_input(&event);

        match (input, event) {
            (KeyInput::Idle, TypeEvent::Resize) => {}
            (KeyInput::Idle, _) => continue,
            (input, TypeEvent::Closed) => {
                warn!("event source closed, ending session");
                session.apply(input);
            }
            (input, _) => {
                session.apply(input);
            }
        }

        terminal.draw(|f| draw(f, session, rows, cols))?;
    }

    Ok(())
}

pub fn draw(f: &mut Frame, session: &TypingSession, rows: usize, cols: usize) {
    let window = Window::compute(session.passage(), rows, cols);
    f.render_widget(&window, f.area());
}

/// The first failure among restore steps that have all already run.
pub fn first_error<I>(steps: I) -> io::Result<()>
where
    I: IntoIterator<Item = io::Result<()>>,
{
    steps.into_iter().fold(Ok(()), |acc, step| acc.and(step))
}

/// Put the terminal back the way the shell expects it.
pub fn restore_terminal<B: Backend + io::Write>(terminal: &mut Terminal<B>) -> io::Result<()> {
    first_error([
        disable_raw_mode(),
        execute!(terminal.backend_mut(), LeaveAlternateScreen),
        terminal.show_cursor(),
    ])
}

/// Restore the terminal before the default hook prints a panic message.
pub fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
            tracing::error!(?info, "panic");
            default_panic(info);
        }));
        debug!("panic hook installed");
    });
}
