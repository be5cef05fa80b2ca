use std::{
    cell::RefCell,
    collections::VecDeque,
    io::{self, stdout, Stdout},
    path::PathBuf,
    rc::Rc,
};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use env_logger::Env;
use log::{debug, info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use tiles4096::best_score::{BestScoreStore, DEFAULT_BEST_SCORE_FILE};
use tiles4096::engine::{Position, DEFAULT_TARGET_TILE, GRID_SIZE};
use tiles4096::game::{Game, GameConfig, GameEvent, GameStatus, Turn};
use tiles4096::input::{Command, InputRouter};
use tiles4096::spawn::{RandomSpawner, SpawnPolicy, TileSpawner};

// ============================================================================
// Command Line
// ============================================================================

#[derive(Debug, Parser)]
#[command(author, version, about = "Slide and merge tiles until you reach 4096")]
struct Cli {
    /// Seed for tile spawning (random if omitted)
    #[arg(long, value_name = "N")]
    seed: Option<u64>,

    /// Tile value that counts as reaching the goal
    #[arg(long, value_name = "VALUE", default_value_t = DEFAULT_TARGET_TILE)]
    target: u32,

    /// New tile distribution: classic (2/4 at 90/10) or extended (2/4/8 at 70/20/10)
    #[arg(long, value_name = "POLICY", default_value_t = SpawnPolicy::Classic)]
    spawn: SpawnPolicy,

    /// File holding the best score
    #[arg(long, value_name = "PATH", default_value = DEFAULT_BEST_SCORE_FILE)]
    best_score_file: PathBuf,

    /// Neither read nor write the best score file
    #[arg(long)]
    no_persist: bool,
}

// ============================================================================
// Visual Constants
// ============================================================================

const TILE_WIDTH: u16 = 8;
const TILE_HEIGHT: u16 = 3;

fn tile_colors(value: u32) -> (Color, Color) {
    let background = match value {
        0 => Color::Rgb(205, 193, 180),
        2 => Color::Rgb(238, 228, 218),
        4 => Color::Rgb(237, 224, 200),
        8 => Color::Rgb(242, 177, 121),
        16 => Color::Rgb(245, 149, 99),
        32 => Color::Rgb(246, 124, 95),
        64 => Color::Rgb(246, 94, 59),
        128 => Color::Rgb(237, 207, 114),
        256 => Color::Rgb(237, 204, 97),
        512 => Color::Rgb(237, 200, 80),
        1024 => Color::Rgb(237, 197, 63),
        2048 => Color::Rgb(237, 194, 46),
        _ => Color::Rgb(60, 58, 50),
    };
    let foreground = if value <= 4 {
        Color::Rgb(119, 110, 101)
    } else {
        Color::Rgb(249, 246, 242)
    };
    (foreground, background)
}

// ============================================================================
// Rendering
// ============================================================================

/// What the last committed move changed, for highlighting.
#[derive(Default)]
struct Highlights {
    merged: Vec<Position>,
    spawned: Option<Position>,
}

impl From<Turn> for Highlights {
    fn from(turn: Turn) -> Self {
        Self {
            merged: turn.merged,
            spawned: turn.spawned,
        }
    }
}

fn render(frame: &mut Frame, game: &Game, highlights: &Highlights) {
    let area = frame.size();
    render_game(frame, game, highlights, area);

    if game.status() == GameStatus::GameOver {
        render_game_over(frame, game, area);
    }
}

fn render_game(frame: &mut Frame, game: &Game, highlights: &Highlights, area: Rect) {
    let board_width = GRID_SIZE as u16 * TILE_WIDTH + 2;
    let board_height = GRID_SIZE as u16 * TILE_HEIGHT + 2;
    let info_width = 14;
    let main_area = centered_rect(board_width + info_width, board_height + 3, area);

    let vertical = Layout::vertical([
        Constraint::Length(board_height),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .split(main_area);

    let horizontal = Layout::horizontal([
        Constraint::Length(board_width),
        Constraint::Length(info_width),
    ])
    .split(vertical[0]);

    render_board(frame, game, highlights, horizontal[0]);
    render_info(frame, game, horizontal[1]);

    if game.target_reached() {
        let banner = Paragraph::new(format!(
            "You made {}! Keep going.",
            game.config().target_tile
        ))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
        frame.render_widget(banner, vertical[1]);
    }

    let controls = Paragraph::new(vec![Line::from(
        "Arrows/WASD/HJKL or drag: Move | R: New Game | Q/ESC: Quit",
    )])
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(controls, vertical[2]);
}

fn render_board(frame: &mut Frame, game: &Game, highlights: &Highlights, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 4096 ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::vertical([Constraint::Length(TILE_HEIGHT); GRID_SIZE]).split(inner);
    for (row, row_area) in rows.iter().enumerate() {
        let cols = Layout::horizontal([Constraint::Length(TILE_WIDTH); GRID_SIZE]).split(*row_area);
        for (col, cell_area) in cols.iter().enumerate() {
            let pos = Position::new(row, col);
            render_tile(frame, game.grid().get(pos), highlights, pos, *cell_area);
        }
    }
}

fn render_tile(frame: &mut Frame, value: u32, highlights: &Highlights, pos: Position, area: Rect) {
    let (fg, bg) = tile_colors(value);
    let mut style = Style::default().fg(fg).bg(bg);
    if highlights.merged.contains(&pos) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if highlights.spawned == Some(pos) {
        style = style.add_modifier(Modifier::ITALIC);
    }

    let label = if value == 0 { String::new() } else { value.to_string() };
    let lines = vec![Line::from(""), Line::from(label), Line::from("")];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(style);
    frame.render_widget(paragraph, area);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(""),
        Line::from(Span::styled("Best", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.best_score())),
        Line::from(""),
        Line::from(Span::styled("Max tile", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.grid().max_tile())),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_game_over(frame: &mut Frame, game: &Game, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(format!("Best: {}", game.best_score())),
        Line::from(""),
        Line::from(Span::styled(
            "Press R to try again",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Press ESC to quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Game Over ")
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(26, 11, area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Main Loop
// ============================================================================

fn persist_best_score(store: Option<&BestScoreStore>, events: &[GameEvent]) {
    let Some(store) = store else { return };
    for event in events {
        if let GameEvent::NewBestScore(score) = event {
            match store.record(*score) {
                Ok(best) if best > *score => debug!("kept stored best score {best}"),
                Ok(_) => {}
                Err(err) => warn!("could not save best score: {err}"),
            }
        }
    }
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    game: &mut Game,
    store: Option<&BestScoreStore>,
) -> Result<()> {
    let mut router = InputRouter::new();
    let pending = Rc::new(RefCell::new(VecDeque::new()));
    let queue = Rc::clone(&pending);
    let subscription = router.subscribe(move |command| queue.borrow_mut().push_back(command));

    let mut highlights = Highlights::default();

    'outer: loop {
        terminal.draw(|frame| render(frame, game, &highlights))?;

        // Blocks until the next input; nothing changes between inputs.
        let event = event::read()?;
        router.handle_event(&event);

        let commands: Vec<Command> = pending.borrow_mut().drain(..).collect();
        for command in commands {
            match command {
                Command::Quit => break 'outer,
                Command::Restart => {
                    game.restart();
                    highlights = Highlights::default();
                }
                Command::Move(direction) => {
                    let turn = game.make_move(direction);
                    if turn.moved {
                        highlights = Highlights::from(turn);
                    }
                }
            }
            persist_best_score(store, &game.take_events());
        }
    }

    router.unsubscribe(subscription);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = GameConfig::new(cli.target, cli.spawn)?;
    let store = (!cli.no_persist).then(|| BestScoreStore::new(cli.best_score_file));
    let best_score = match store.as_ref().map(BestScoreStore::load) {
        Some(Ok(score)) => score,
        Some(Err(err)) => {
            warn!("ignoring best score file: {err}");
            0
        }
        None => 0,
    };

    let spawner: Box<dyn TileSpawner> = match cli.seed {
        Some(seed) => {
            info!("seeding tile spawner with {seed}");
            Box::new(RandomSpawner::seeded(seed, config.spawn_policy))
        }
        None => Box::new(RandomSpawner::new(config.spawn_policy)),
    };
    let mut game = Game::new(config, spawner).with_best_score(best_score);
    game.start();

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game, store.as_ref());

    // Restore terminal
    restore_terminal()?;
    result
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    stdout().execute(DisableMouseCapture)?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
