//! Task form handling for the terminal user interface.
//!
//! This module provides the `TaskForm` structure: the title/description
//! buffer the user types into, shared between create and edit mode.

use crate::client::TaskInput;
use crate::task::Task;
use crate::tui::input::InputField;

/// Global order constants for form fields.
pub const TITLE_GLOBAL_ORDER: usize = 0;
pub const DESCRIPTION_GLOBAL_ORDER: usize = 1;

const FIELD_COUNT: usize = 2;

/// Task form for editing fields
#[derive(Clone, Debug)]
pub struct TaskForm {
    pub title: InputField,
    pub description: InputField,
    pub current_field: usize,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    /// Create an empty form with the title focused.
    pub fn new() -> Self {
        let mut form = Self {
            title: InputField::new(),
            description: InputField::new(),
            current_field: TITLE_GLOBAL_ORDER,
        };
        form.update_active_field();
        form
    }

    /// Create a task form populated from an existing task.
    pub fn from_task(task: &Task) -> Self {
        let mut form = Self::new();
        form.title = InputField::with_value(&task.title);
        form.description = InputField::with_value(task.description.as_deref().unwrap_or_default());
        form.update_active_field();
        form
    }

    /// Empty both fields and focus the title.
    pub fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
        self.current_field = TITLE_GLOBAL_ORDER;
        self.update_active_field();
    }

    /// Request body for the current buffer. Both keys are always sent.
    pub fn to_input(&self) -> TaskInput {
        TaskInput {
            title: self.title.value.clone(),
            description: Some(self.description.value.clone()),
            completed: None,
        }
    }

    /// Move to the next field in the form.
    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
        self.update_active_field();
    }

    /// Move to the previous field in the form.
    pub fn prev_field(&mut self) {
        self.current_field = if self.current_field == 0 {
            FIELD_COUNT - 1
        } else {
            self.current_field - 1
        };
        self.update_active_field();
    }

    /// Update which field is currently active for editing.
    pub fn update_active_field(&mut self) {
        self.title.active = self.current_field == TITLE_GLOBAL_ORDER;
        self.description.active = self.current_field == DESCRIPTION_GLOBAL_ORDER;
    }

    /// The field that receives key presses.
    pub fn active_field_mut(&mut self) -> &mut InputField {
        match self.current_field {
            DESCRIPTION_GLOBAL_ORDER => &mut self.description,
            _ => &mut self.title,
        }
    }

    pub fn active_field(&self) -> &InputField {
        match self.current_field {
            DESCRIPTION_GLOBAL_ORDER => &self.description,
            _ => &self.title,
        }
    }

    /// Handle character input for the currently active field.
    pub fn handle_char(&mut self, c: char) {
        self.active_field_mut().handle_char(c);
    }

    /// Handle backspace input for the currently active field.
    pub fn handle_backspace(&mut self) {
        self.active_field_mut().handle_backspace();
    }

    /// Handle left/right arrow keys for cursor movement.
    pub fn handle_left_right(&mut self, right: bool) {
        let field = self.active_field_mut();
        if right {
            field.move_cursor_right()
        } else {
            field.move_cursor_left()
        }
    }

    /// True when the title holds nothing but whitespace.
    pub fn title_is_blank(&self) -> bool {
        self.title.value.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn from_task_fills_buffer_and_maps_missing_description() {
        let now = Utc::now();
        let task = Task {
            id: 4,
            title: "Buy milk".into(),
            description: None,
            completed: true,
            created_at: now,
            updated_at: now,
        };
        let form = TaskForm::from_task(&task);
        assert_eq!(form.title.value, "Buy milk");
        assert_eq!(form.description.value, "");
        assert!(form.title.active);
        assert!(!form.description.active);
    }

    #[test]
    fn typing_goes_to_the_focused_field() {
        let mut form = TaskForm::new();
        "Buy".chars().for_each(|c| form.handle_char(c));
        form.next_field();
        "2%".chars().for_each(|c| form.handle_char(c));
        form.handle_backspace();
        assert_eq!(form.title.value, "Buy");
        assert_eq!(form.description.value, "2");
        assert!(form.description.active);
        form.next_field();
        assert_eq!(form.current_field, TITLE_GLOBAL_ORDER);
        form.prev_field();
        assert_eq!(form.current_field, DESCRIPTION_GLOBAL_ORDER);
    }

    #[test]
    fn to_input_always_sends_description() {
        let mut form = TaskForm::new();
        form.handle_char('x');
        let input = form.to_input();
        assert_eq!(input.title, "x");
        assert_eq!(input.description.as_deref(), Some(""));
        assert_eq!(input.completed, None);
    }

    #[test]
    fn clear_resets_everything() {
        let mut form = TaskForm::new();
        form.handle_char('x');
        form.next_field();
        form.handle_char('y');
        form.clear();
        assert!(form.title_is_blank());
        assert_eq!(form.description.value, "");
        assert_eq!(form.current_field, TITLE_GLOBAL_ORDER);
    }
}
