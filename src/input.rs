//! Terminal input: key mapping, mouse-drag swipes and a small
//! subscribe/unsubscribe router the shell hangs its handlers on.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use log::trace;

use crate::engine::Direction;

/// Minimum drag distance, in terminal cells, for a mouse drag to count as a swipe.
pub const MIN_SWIPE_DISTANCE: u16 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move(Direction),
    Restart,
    Quit,
}

// ============================================================================
// Key Mapping
// ============================================================================

/// Only key presses count; repeats and releases are dropped so one physical
/// press yields one move.
pub fn map_key(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    let command = match key.code {
        KeyCode::Up | KeyCode::Char('w' | 'W' | 'k' | 'K') => Command::Move(Direction::Up),
        KeyCode::Down | KeyCode::Char('s' | 'S' | 'j' | 'J') => Command::Move(Direction::Down),
        KeyCode::Left | KeyCode::Char('a' | 'A' | 'h' | 'H') => Command::Move(Direction::Left),
        KeyCode::Right | KeyCode::Char('d' | 'D' | 'l' | 'L') => Command::Move(Direction::Right),
        KeyCode::Char('r' | 'R' | 'n' | 'N') => Command::Restart,
        KeyCode::Esc | KeyCode::Char('q' | 'Q') => Command::Quit,
        _ => return None,
    };
    Some(command)
}

// ============================================================================
// Swipes
// ============================================================================

/// The dominant axis decides the direction; drags shorter than
/// `min_distance` along it are ignored.
pub fn classify_swipe(dx: i32, dy: i32, min_distance: u16) -> Option<Direction> {
    let min = i32::from(min_distance);
    if dx.abs() > dy.abs() {
        if dx.abs() < min {
            None
        } else if dx > 0 {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    } else if dy.abs() < min {
        None
    } else if dy > 0 {
        Some(Direction::Down)
    } else {
        Some(Direction::Up)
    }
}

#[derive(Debug)]
pub struct SwipeTracker {
    start: Option<(u16, u16)>,
    min_distance: u16,
}

impl SwipeTracker {
    pub fn new(min_distance: u16) -> Self {
        Self {
            start: None,
            min_distance,
        }
    }

    pub fn begin(&mut self, column: u16, row: u16) {
        self.start = Some((column, row));
    }

    /// Finishes a drag. Returns `None` if no drag was in progress.
    pub fn end(&mut self, column: u16, row: u16) -> Option<Direction> {
        let (start_col, start_row) = self.start.take()?;
        let dx = i32::from(column) - i32::from(start_col);
        let dy = i32::from(row) - i32::from(start_row);
        classify_swipe(dx, dy, self.min_distance)
    }

    pub fn handle_mouse(&mut self, mouse: &MouseEvent) -> Option<Direction> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.begin(mouse.column, mouse.row);
                None
            }
            MouseEventKind::Up(MouseButton::Left) => self.end(mouse.column, mouse.row),
            _ => None,
        }
    }
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(MIN_SWIPE_DISTANCE)
    }
}

// ============================================================================
// Router
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Command)>;

/// Turns raw terminal events into [`Command`]s and fans them out to listeners.
#[derive(Default)]
pub struct InputRouter {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
    swipe: SwipeTracker,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(Command) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn dispatch(&mut self, command: Command) {
        trace!("dispatching {command:?} to {} listener(s)", self.listeners.len());
        for (_, listener) in &mut self.listeners {
            listener(command);
        }
    }

    /// Translates `event` and dispatches the resulting command, if any.
    pub fn handle_event(&mut self, event: &Event) -> Option<Command> {
        let command = match event {
            Event::Key(key) => map_key(key),
            Event::Mouse(mouse) => self.swipe.handle_mouse(mouse).map(Command::Move),
            _ => None,
        }?;
        self.dispatch(command);
        Some(command)
    }
}
