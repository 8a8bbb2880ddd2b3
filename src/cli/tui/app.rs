//! TUI application state and key handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use super::event::{Event, EventHandler};
use super::terminal::Terminal;
use super::views;
use crate::domain::{drop_slots, BoardEngine, CardId, DragOutcome, Lane, LaneId, Slot};

const HELP: &str = "h/l:lane j/k:card n:new d:done space:drag q:quit";

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    NewTask(String),
    Confirm(ConfirmAction),
    Dragging(Gesture),
}

/// Confirmation actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    CompleteCard { lane: LaneId, card: CardId },
}

/// A card being carried by the keyboard drag gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gesture {
    pub source: Slot,
    /// Lane under the drop cursor (display index)
    pub target_lane: usize,
    /// Drop index within the target lane
    pub target_index: usize,
}

/// Application state
pub struct App {
    engine: BoardEngine,

    /// Focused lane (display index)
    lane_index: usize,

    /// Selected card within the focused lane
    card_index: usize,

    input_mode: InputMode,

    status_message: Option<String>,

    should_quit: bool,

    verbose: bool,
}

impl App {
    pub fn new(engine: BoardEngine, verbose: bool) -> Self {
        Self {
            engine,
            lane_index: 0,
            card_index: 0,
            input_mode: InputMode::Normal,
            status_message: None,
            should_quit: false,
            verbose,
        }
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;

            let event = events.next()?;
            self.handle_event(event);
        }

        self.engine.shutdown();
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        views::board::draw(frame, self);
    }

    /// Dispatches one event, then fires due timers. Steady key input delays
    /// `Tick` events, so timers are checked after every event.
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize | Event::Tick => {}
        }
        self.on_tick();
    }

    fn on_tick(&mut self) {
        let fired = self.engine.tick();
        if self.verbose && fired > 0 {
            self.status_message = Some(format!("[verbose:timers] {} timer(s) fired", fired));
        }
    }

    /// Handle key events
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        match &self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::NewTask(_) => self.handle_new_task_key(key),
            InputMode::Confirm(_) => self.handle_confirm_key(key),
            InputMode::Dragging(_) => self.handle_drag_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit(),

            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.focus_lane(-1),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.focus_lane(1),
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),

            KeyCode::Char('n') => {
                self.input_mode = InputMode::NewTask(String::new());
            }
            KeyCode::Char('d') => {
                if let Some(card) = self.selected_card_id() {
                    let lane = self.focused_lane().id.clone();
                    self.input_mode = InputMode::Confirm(ConfirmAction::CompleteCard { lane, card });
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('m') => self.start_drag(),

            KeyCode::Char('?') => {
                self.status_message = Some(HELP.to_string());
            }

            _ => {}
        }
    }

    fn handle_new_task_key(&mut self, key: KeyEvent) {
        let InputMode::NewTask(text) = &self.input_mode else {
            return;
        };
        let mut text = text.clone();

        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                self.create_task(&text);
            }
            KeyCode::Backspace => {
                text.pop();
                self.input_mode = InputMode::NewTask(text);
            }
            KeyCode::Char(c) => {
                text.push(c);
                self.input_mode = InputMode::NewTask(text);
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let mode = std::mem::take(&mut self.input_mode);
                if let InputMode::Confirm(ConfirmAction::CompleteCard { lane, card }) = mode {
                    self.complete_card(&lane, &card);
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn handle_drag_key(&mut self, key: KeyEvent) {
        let InputMode::Dragging(gesture) = &self.input_mode else {
            return;
        };
        let mut gesture = gesture.clone();

        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                gesture.target_lane = gesture.target_lane.saturating_sub(1);
                gesture.target_index = gesture.target_index.min(self.max_drop_index(&gesture));
            }
            KeyCode::Char('l') | KeyCode::Right => {
                let last = self.engine.board().lanes().len() - 1;
                gesture.target_lane = (gesture.target_lane + 1).min(last);
                gesture.target_index = gesture.target_index.min(self.max_drop_index(&gesture));
            }
            KeyCode::Char('k') | KeyCode::Up => {
                gesture.target_index = gesture.target_index.saturating_sub(1);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                gesture.target_index = (gesture.target_index + 1).min(self.max_drop_index(&gesture));
            }
            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('m') => {
                self.input_mode = InputMode::Normal;
                self.drop_card(gesture);
                return;
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.cancel_drag(gesture);
                return;
            }
            _ => {}
        }

        self.input_mode = InputMode::Dragging(gesture);
    }

    fn quit(&mut self) {
        self.should_quit = true;
        self.engine.shutdown();
    }

    fn focus_lane(&mut self, delta: isize) {
        let count = self.engine.board().lanes().len() as isize;
        self.lane_index = (self.lane_index as isize + delta).rem_euclid(count) as usize;
        self.card_index = 0;
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.focused_lane().len();
        if len == 0 {
            return;
        }
        self.card_index = (self.card_index as isize + delta).rem_euclid(len as isize) as usize;
    }

    fn start_drag(&mut self) {
        if self.selected_card_id().is_none() {
            return;
        }
        let source = Slot::new(self.focused_lane().id.clone(), self.card_index);
        self.input_mode = InputMode::Dragging(Gesture {
            source,
            target_lane: self.lane_index,
            target_index: self.card_index,
        });
        self.status_message = Some("Dragging: h/l lane, j/k position, enter drop, esc cancel".into());
    }

    /// Highest drop index the gesture may point at
    fn max_drop_index(&self, gesture: &Gesture) -> usize {
        let target = &self.engine.board().lanes()[gesture.target_lane].id;
        drop_slots(self.engine.board(), &gesture.source.lane, target)
            .map(|slots| slots.saturating_sub(1))
            .unwrap_or(0)
    }

    fn drop_card(&mut self, gesture: Gesture) {
        let target = self.engine.board().lanes()[gesture.target_lane].id.clone();
        let outcome =
            DragOutcome::dropped(gesture.source, Slot::new(target, gesture.target_index));

        match self.engine.drag(&outcome) {
            Ok(changed) => {
                self.lane_index = gesture.target_lane;
                self.card_index = gesture.target_index;
                if changed {
                    self.status_message = Some("Card moved".into());
                }
            }
            Err(e) => self.status_message = Some(format!("Error: {}", e)),
        }
    }

    fn cancel_drag(&mut self, gesture: Gesture) {
        match self.engine.drag(&DragOutcome::cancelled(gesture.source)) {
            Ok(_) => self.status_message = Some("Drag cancelled".into()),
            Err(e) => self.status_message = Some(format!("Error: {}", e)),
        }
    }

    fn create_task(&mut self, text: &str) {
        let lane = self.focused_lane().id.clone();
        match self.engine.add_task(&lane, text) {
            Ok(Some(card)) => {
                self.card_index = self.focused_lane().len() - 1;
                self.status_message = Some(format!("Added {}: {}", card.id, card.content));
            }
            Ok(None) => self.status_message = Some("Empty task ignored".into()),
            Err(e) => self.status_message = Some(format!("Error: {}", e)),
        }
    }

    fn complete_card(&mut self, lane: &LaneId, card: &CardId) {
        match self.engine.mark_done(lane, card) {
            Ok(card) => {
                self.status_message = Some(format!("Completed: {}", card.content));
                let len = self.focused_lane().len();
                self.card_index = self.card_index.min(len.saturating_sub(1));
            }
            Err(e) => self.status_message = Some(format!("Error: {}", e)),
        }
    }

    fn selected_card_id(&self) -> Option<CardId> {
        self.focused_lane()
            .cards
            .get(self.card_index)
            .map(|c| c.id.clone())
    }

    fn focused_lane(&self) -> &Lane {
        &self.engine.board().lanes()[self.lane_index]
    }

    // Public accessors for views

    pub fn engine(&self) -> &BoardEngine {
        &self.engine
    }

    pub fn lane_index(&self) -> usize {
        self.lane_index
    }

    pub fn card_index(&self) -> usize {
        self.card_index
    }

    pub fn input_mode(&self) -> &InputMode {
        &self.input_mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}
