use ratatui::widgets::TableState;

use crate::manager::TaskManager;
use crate::models::TaskId;
use crate::storage::TaskStore;

#[derive(PartialEq, Debug)]
pub enum InputMode {
    Normal,
    Adding,
    Logging,
    ConfirmDelete,
}

/// State for the two-step "Add Goal" wizard.
#[derive(Default)]
pub struct AddState {
    pub name: String,
    pub step: usize, // 0: Name, 1: Target minutes
}

pub struct App<S: TaskStore> {
    pub manager: TaskManager<S>,
    pub state: TableState,
    pub input_mode: InputMode,
    pub input_buffer: String,
    pub target_id: Option<TaskId>,
    pub add_state: AddState,
    /// Inline feedback, e.g. a rejected input.
    pub status: Option<String>,
}

impl<S: TaskStore> App<S> {
    pub fn new(manager: TaskManager<S>) -> App<S> {
        let mut state = TableState::default();
        if !manager.repository().is_empty() {
            state.select(Some(0));
        }
        App {
            manager,
            state,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            target_id: None,
            add_state: AddState::default(),
            status: None,
        }
    }

    /// Id of the highlighted task.
    pub fn selected_id(&self) -> Option<TaskId> {
        let i = self.state.selected()?;
        self.manager.repository().list_tasks().get(i).map(|t| t.id)
    }

    pub fn next(&mut self) {
        let len = self.manager.repository().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.manager.repository().len();
        if len == 0 { return; }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Picks up finished coach requests. Returns true if anything changed.
    pub fn tick(&mut self) -> bool {
        self.manager.poll_messages() > 0
    }

    pub fn start_add(&mut self) {
        self.input_mode = InputMode::Adding;
        self.add_state = AddState::default();
        self.input_buffer.clear();
        self.status = None;
    }

    /// Opens the log entry for the selected task, pre-filled with today's minutes.
    pub fn start_log(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let today = self.manager.today();
        let current = self
            .manager
            .repository()
            .get(id)
            .and_then(|t| t.log_for(today))
            .unwrap_or(0);
        self.target_id = Some(id);
        self.input_mode = InputMode::Logging;
        self.input_buffer = current.to_string();
        self.status = None;
    }

    pub fn start_delete(&mut self) {
        let Some(id) = self.selected_id() else { return };
        self.target_id = Some(id);
        self.input_mode = InputMode::ConfirmDelete;
        self.status = None;
    }

    pub fn cancel(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.target_id = None;
    }

    /// Answers the delete confirmation.
    pub fn confirm_delete(&mut self, yes: bool) {
        if let Some(id) = self.target_id.take() {
            match self.manager.delete_task(id, |_| yes) {
                Ok(true) => self.status = Some("Goal deleted.".into()),
                Ok(false) => {}
                Err(e) => self.status = Some(e.to_string()),
            }
        }
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    /// Handles Enter in the input box.
    pub fn handle_input(&mut self) {
        match self.input_mode {
            InputMode::Adding => self.handle_adding_input(),
            InputMode::Logging => self.handle_logging_input(),
            _ => {}
        }
    }

    fn handle_adding_input(&mut self) {
        match self.add_state.step {
            0 => { // Name
                if self.input_buffer.trim().is_empty() {
                    self.status = Some("Please enter a goal name.".into());
                    return;
                }
                self.add_state.name = self.input_buffer.trim().to_string();
                self.add_state.step += 1;
                self.input_buffer = "60".into();
                self.status = None;
            }
            1 => { // Target
                let target = match self.input_buffer.trim().parse::<i64>() {
                    Ok(t) => t,
                    Err(_) => {
                        self.status = Some("Target must be a whole number of minutes.".into());
                        return;
                    }
                };
                match self.manager.add_task(&self.add_state.name, target) {
                    Ok(_) => {
                        self.input_mode = InputMode::Normal;
                        self.input_buffer.clear();
                        self.status = None;
                        // New goals sort last.
                        let len = self.manager.repository().len();
                        self.state.select(Some(len.saturating_sub(1)));
                    }
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
            _ => {}
        }
    }

    fn handle_logging_input(&mut self) {
        let Some(id) = self.target_id else {
            self.cancel();
            return;
        };
        let input = self.input_buffer.trim();
        let minutes = if input.is_empty() {
            0
        } else {
            match input.parse::<i64>() {
                Ok(m) => m,
                Err(_) => {
                    self.status = Some("Minutes must be a whole number.".into());
                    return;
                }
            }
        };
        match self.manager.record_time_today(id, minutes) {
            Ok(_) => {
                self.status = None;
                self.cancel();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.manager.repository().len();
        if len == 0 {
            self.state.select(None);
        } else if let Some(i) = self.state.selected() {
            if i >= len {
                self.state.select(Some(len - 1));
            }
        } else {
            self.state.select(Some(0));
        }
    }
}
