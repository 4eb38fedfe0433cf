use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use crate::calendar::WeekMode;
use crate::error::{Error, Result};
use crate::grid::{Cell, GridGeometry};
use crate::session::{self, SessionOptions, Snapshot};

use super::view;

const EVENT_POLL_MS: u64 = 120;

enum LoadRequest {
    Reload,
}

enum UiMsg {
    Loaded(Box<Snapshot>),
    LoadError(String),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

/// Where the grid was last drawn; used to hit-test the mouse.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GridLayout {
    pub(crate) geometry: GridGeometry,
    /// Oldest column that fit on screen.
    pub(crate) left_column: i64,
    pub(crate) area: Rect,
}

impl GridLayout {
    pub(crate) fn cell_at<'a>(&self, cells: &'a [Cell], column: u16, row: u16) -> Option<&'a Cell> {
        let inside = column >= self.area.x
            && column < self.area.right()
            && row >= self.area.y
            && row < self.area.bottom();
        if !inside {
            return None;
        }
        // Terminal positions name whole character cells; hit-test their centers.
        let x = f64::from(column) + 0.5;
        let y = f64::from(row) + 0.5;
        self.geometry
            .hit_test(cells, x, y)
            .filter(|cell| cell.column <= self.left_column)
    }
}

pub struct AppState {
    pub(crate) snapshot: Option<Snapshot>,
    pub(crate) selected: Option<usize>,
    pub(crate) hovered: Option<usize>,
    pub(crate) pointer: Option<(u16, u16)>,
    pub(crate) show_help: bool,
    pub(crate) loading: bool,
    pub(crate) layout: Option<GridLayout>,
    status_message: Option<String>,
    info_message: Option<String>,
}

impl AppState {
    pub(crate) fn new() -> Self {
        Self {
            snapshot: None,
            selected: None,
            hovered: None,
            pointer: None,
            show_help: false,
            loading: true,
            layout: None,
            status_message: None,
            info_message: None,
        }
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.cells.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn selected_cell(&self) -> Option<&Cell> {
        self.selected.and_then(|idx| self.cells().get(idx))
    }

    pub(crate) fn hovered_cell(&self) -> Option<&Cell> {
        self.hovered.and_then(|idx| self.cells().get(idx))
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        if self.loading {
            return Some(("loading history...".to_string(), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.show_help {
            return "? close help  esc/q quit".to_string();
        }
        "h/l week  j/k day  t today  click select  r reload  ? help  esc/q quit".to_string()
    }

    pub(crate) fn summary_line(&self) -> String {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return String::new();
        };
        let summary = &snapshot.summary;
        let mut line = format!(
            "active days: {}/{}  tasks: {}  weeks: {}  mode: {}",
            summary.active_days, summary.days, summary.occurrences, snapshot.weeks, snapshot.week_mode
        );
        if snapshot.week_mode == WeekMode::IsoWeekDelta
            && snapshot.cells.iter().any(|cell| cell.column < 0)
        {
            line.push_str(" (week numbers restart in January; the current week may be off screen)");
        }
        line
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: Snapshot) {
        let previous = self.selected_cell().map(|cell| cell.date);
        self.info_message = snapshot.warnings.first().cloned();
        self.status_message = None;
        self.loading = false;
        self.hovered = None;
        self.selected = previous
            .and_then(|date| snapshot.cells.iter().position(|cell| cell.date == date))
            .or(if snapshot.cells.is_empty() { None } else { Some(0) });
        self.snapshot = Some(snapshot);
    }

    fn select_position(&mut self, column: i64, row: i64) {
        if !(0..7).contains(&row) {
            return;
        }
        if let Some(idx) = self
            .cells()
            .iter()
            .position(|cell| cell.column == column && i64::from(cell.row) == row)
        {
            self.selected = Some(idx);
        }
    }

    /// Move the selection by whole weeks (positive = older) and days.
    fn move_selection(&mut self, weeks: i64, days: i64) {
        let Some(cell) = self.selected_cell() else {
            self.selected = if self.cells().is_empty() { None } else { Some(0) };
            return;
        };
        let (column, row) = (cell.column + weeks, i64::from(cell.row) + days);
        self.select_position(column, row);
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let hit = self.layout.and_then(|layout| {
            let cell = layout.cell_at(self.cells(), mouse.column, mouse.row)?;
            self.cells().iter().position(|candidate| candidate == cell)
        });
        match mouse.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                self.hovered = hit;
                self.pointer = hit.map(|_| (mouse.column, mouse.row));
            }
            MouseEventKind::Down(_) => {
                if hit.is_some() {
                    self.selected = hit;
                }
                self.hovered = hit;
                self.pointer = hit.map(|_| (mouse.column, mouse.row));
            }
            _ => {}
        }
    }
}

pub fn run(options: SessionOptions) -> Result<()> {
    let (ui_tx, ui_rx) = mpsc::channel();
    let (req_tx, req_rx) = mpsc::channel();

    spawn_loader(options, req_rx, ui_tx);

    if req_tx.send(LoadRequest::Reload).is_err() {
        return Err(Error::OperationFailed(
            "failed to start history loader".to_string(),
        ));
    }

    let mut app = AppState::new();
    run_terminal(&mut app, ui_rx, req_tx)
}

fn run_terminal(
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_rx, req_tx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
    req_tx: Sender<LoadRequest>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key, &req_tx) {
                        break;
                    }
                    dirty = true;
                }
                Event::Mouse(mouse) => {
                    app.handle_mouse(mouse);
                    dirty = true;
                }
                Event::Resize(_, _) => {
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg) {
    match msg {
        UiMsg::Loaded(snapshot) => app.apply_snapshot(*snapshot),
        UiMsg::LoadError(err) => {
            app.loading = false;
            app.status_message = Some(format!("load error: {err}"));
        }
    }
}

fn handle_key(app: &mut AppState, key: KeyEvent, req_tx: &Sender<LoadRequest>) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.show_help {
        match key.code {
            KeyCode::Char('?') => app.show_help = false,
            KeyCode::Esc | KeyCode::Char('q') => return true,
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('h') | KeyCode::Left => app.move_selection(1, 0),
        KeyCode::Char('l') | KeyCode::Right => app.move_selection(-1, 0),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(0, -1),
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(0, 1),
        KeyCode::Char('t') | KeyCode::Home => {
            if !app.cells().is_empty() {
                app.selected = Some(0);
            }
        }
        KeyCode::Char('r') => {
            if req_tx.send(LoadRequest::Reload).is_ok() {
                app.loading = true;
                app.info_message = None;
            }
        }
        _ => {}
    }
    false
}

fn spawn_loader(options: SessionOptions, req_rx: Receiver<LoadRequest>, ui_tx: Sender<UiMsg>) {
    thread::spawn(move || {
        while let Ok(req) = req_rx.recv() {
            match req {
                LoadRequest::Reload => match session::load(&options) {
                    Ok(snapshot) => {
                        let _ = ui_tx.send(UiMsg::Loaded(Box::new(snapshot)));
                    }
                    Err(err) => {
                        let _ = ui_tx.send(UiMsg::LoadError(err.to_string()));
                    }
                },
            }
        }
    });
}
