use std::collections::HashSet;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use crate::config::GameConfig;
use crate::render::{Color, FrameBuffer};
use crate::session::Session;
use crate::term::TermManager;

const MESSAGE_FG: Color = Color::rgb(255, 255, 255);
const MESSAGE_BG: Color = Color::rgb(40, 40, 40);

/// Keys pressed during one frame, plus whether the player asked to quit.
#[derive(Debug, Default, PartialEq)]
pub struct FrameInput {
    pub keys: HashSet<KeyCode>,
    pub quit: bool,
}

impl FrameInput {
    pub fn from_events(events: &[KeyEvent]) -> Self {
        let mut input = FrameInput::default();
        for ev in events {
            if is_quit(ev) {
                input.quit = true;
            }
            input.keys.insert(normalize(ev.code));
        }
        input
    }
}

/// Terminal front end: owns the terminal and drives a [`Session`] once per frame.
pub struct SnakeGame {
    term: TermManager,
    config: GameConfig,
}

impl SnakeGame {
    pub fn new(config: GameConfig) -> Self {
        SnakeGame { term: TermManager::new(), config }
    }

    /// Shrinks the configured screen to fit the terminal.
    pub fn fit_to_terminal(&mut self) -> Result<()> {
        let (w, h) = self.term.get_terminal_size().context("Failed to read terminal size")?;
        if w < self.config.screen_width || h < self.config.screen_height {
            warn!(
                "terminal is {}x{}, shrinking screen from {}x{}",
                w, h, self.config.screen_width, self.config.screen_height
            );
            self.config.screen_width = self.config.screen_width.min(w);
            self.config.screen_height = self.config.screen_height.min(h);
        }
        Ok(())
    }

    /// Runs until the player quits. The terminal is restored on every exit path.
    pub fn run(&mut self) -> Result<()> {
        self.fit_to_terminal()?;
        let session = Session::new(self.config.clone()).context("Invalid game configuration")?;

        self.term.setup().context("Failed to set up terminal")?;
        let result = self.play(session);
        self.term.restore().context("Failed to restore terminal")?;

        result
    }

    fn play(&mut self, mut session: Session) -> Result<()> {
        let frame_time = Duration::from_secs_f64(1.0 / self.config.fps);
        let mut frame = FrameBuffer::new(self.config.screen_width, self.config.screen_height, self.config.background);
        let mut last = Instant::now();

        info!("running at up to {} fps", self.config.fps);

        loop {
            let events = self.term.read_key_events_queue().context("Failed to read input")?;
            let input = FrameInput::from_events(&events);
            if input.quit {
                info!("quit requested");
                return Ok(());
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;

            session.frame(dt, &input.keys)?;

            frame.fill(self.config.background);
            session.render(&mut frame);
            if let Some(lines) = session.banner() {
                frame.show_message(&lines, MESSAGE_FG, MESSAGE_BG);
            }
            self.term.present(&frame).context("Failed to draw frame")?;

            sleep(frame_time.saturating_sub(now.elapsed()));
        }
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char('w') | KeyCode::Char('W') => KeyCode::Up,
        KeyCode::Char('a') | KeyCode::Char('A') => KeyCode::Left,
        KeyCode::Char('s') | KeyCode::Char('S') => KeyCode::Down,
        KeyCode::Char('d') | KeyCode::Char('D') => KeyCode::Right,
        other => other,
    }
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
        || matches!(ev.code, KeyCode::Char('q') | KeyCode::Char('Q'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent { code, modifiers }
    }

    #[test]
    fn test_wasd_maps_to_arrows() {
        let input = FrameInput::from_events(&[
            key(KeyCode::Char('w'), KeyModifiers::NONE),
            key(KeyCode::Char('A'), KeyModifiers::SHIFT),
            key(KeyCode::Right, KeyModifiers::NONE),
        ]);

        assert!(!input.quit);
        assert_eq!(input.keys, [KeyCode::Up, KeyCode::Left, KeyCode::Right].iter().copied().collect::<HashSet<_>>());
    }

    #[test]
    fn test_quit_keys() {
        assert!(FrameInput::from_events(&[key(KeyCode::Char('c'), KeyModifiers::CONTROL)]).quit);
        assert!(FrameInput::from_events(&[key(KeyCode::Char('q'), KeyModifiers::NONE)]).quit);
        assert!(!FrameInput::from_events(&[key(KeyCode::Char('c'), KeyModifiers::NONE)]).quit);
        assert!(!FrameInput::from_events(&[key(KeyCode::Esc, KeyModifiers::NONE)]).quit);
    }

    #[test]
    fn test_no_events_no_keys() {
        assert_eq!(FrameInput::from_events(&[]), FrameInput::default());
    }
}
