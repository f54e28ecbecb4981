// The add-product form as a key-driven state machine.
//
// The form knows nothing about the terminal: it consumes key events and
// either keeps editing or finishes with a `FormOutcome`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::api::NewProduct;
use crate::error::CliError;

pub const HINT: &str = "Press Ctrl+Q to change category";

pub const REQUIRED: &str = "All fields are required";
pub const RRP_NOT_A_NUMBER: &str = "RRP should be a number";

/// How a form run ended.
#[derive(Debug)]
pub enum FormOutcome {
    Submitted(NewProduct),
    /// Ctrl+Q: go back to category selection.
    Cancelled,
    Failed(CliError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
}

impl Field {
    fn new(key: &'static str, label: &'static str) -> Self {
        Field {
            key,
            label,
            value: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProductForm {
    fields: [Field; 3],
    focus: usize,
    error: Option<String>,
}

impl Default for ProductForm {
    fn default() -> Self {
        ProductForm {
            fields: [
                Field::new("name", "Name"),
                Field::new("rrp", "RRP"),
                Field::new("info", "Info"),
            ],
            focus: 0,
            error: None,
        }
    }
}

impl ProductForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    /// The validation message from the last rejected submit, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// Applies one key. Returns `Some` once the form is finished.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormOutcome> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let len = self.fields.len();
        match key.code {
            KeyCode::Char('q') if ctrl => return Some(FormOutcome::Cancelled),
            KeyCode::Char('c') if ctrl => return Some(FormOutcome::Failed(CliError::Interrupted)),
            KeyCode::Enter => match self.submit() {
                Ok(product) => return Some(FormOutcome::Submitted(product)),
                Err(message) => self.error = Some(message.to_string()),
            },
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % len,
            KeyCode::BackTab | KeyCode::Up => self.focus = (self.focus + len - 1) % len,
            KeyCode::Backspace => {
                self.fields[self.focus].value.pop();
            }
            KeyCode::Char(c) if !ctrl => self.fields[self.focus].value.push(c),
            _ => {}
        }
        None
    }

    fn submit(&self) -> Result<NewProduct, &'static str> {
        let [name, rrp, info] = &self.fields;
        validate(&name.value, &rrp.value, &info.value)
    }
}

/// All three fields must be filled in and the rrp must be a finite number.
pub fn validate(name: &str, rrp: &str, info: &str) -> Result<NewProduct, &'static str> {
    if [name, rrp, info].iter().any(|v| v.trim().is_empty()) {
        return Err(REQUIRED);
    }
    match rrp.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(NewProduct {
            name: name.to_string(),
            rrp: n,
            info: info.to_string(),
        }),
        _ => Err(RRP_NOT_A_NUMBER),
    }
}
