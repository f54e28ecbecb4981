// Interactive session: pick a category, browse its products, add products
// in a loop. Ctrl+Q in the form goes back to category selection.
//
// The loop only talks to the terminal through `Prompter`, so the flow can be
// driven by a scripted prompter in tests. `TerminalPrompter` is the real one:
// `dialoguer` for the category choice and a `crossterm` raw-mode form.

use std::convert::Infallible;
use std::io::{self, Write};

use crossterm::cursor;
use crossterm::event::{self, Event};
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::{execute, queue};
use dialoguer::FuzzySelect;
use log::info;

use crate::api::{scalar_text, ApiClient, Product, Transport};
use crate::error::{CliError, CliResult};
use crate::form::{FormOutcome, ProductForm, HINT};

/// Everything the session asks of the user.
pub trait Prompter {
    fn select_category(&mut self, categories: &[String]) -> CliResult<String>;

    /// Runs the add-product form for `category` until it is submitted,
    /// cancelled or fails.
    fn add_product(&mut self, category: &str) -> FormOutcome;

    fn clear_screen(&mut self) -> CliResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    SelectingCategory,
    Browsing {
        category: String,
        products: Vec<Product>,
    },
    AddingProduct {
        category: String,
    },
}

pub struct Session<'s, 't, T: Transport + ?Sized, P: Prompter> {
    api: &'s ApiClient<'t, T>,
    categories: &'s [String],
    prompter: &'s mut P,
    out: &'s mut dyn Write,
    state: SessionState,
}

impl<'s, 't, T: Transport + ?Sized, P: Prompter> Session<'s, 't, T, P> {
    pub fn new(
        api: &'s ApiClient<'t, T>,
        categories: &'s [String],
        prompter: &'s mut P,
        out: &'s mut dyn Write,
    ) -> Self {
        Session {
            api,
            categories,
            prompter,
            out,
            state: SessionState::SelectingCategory,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Loops until something fails; there is no other way out.
    pub fn run(mut self) -> CliResult<Infallible> {
        loop {
            self.step()?;
        }
    }

    /// Performs one state transition.
    pub fn step(&mut self) -> CliResult<()> {
        let state = std::mem::replace(&mut self.state, SessionState::SelectingCategory);
        self.state = match state {
            SessionState::SelectingCategory => {
                let category = self.prompter.select_category(self.categories)?;
                info!("category selected: {category}");
                let products = self.api.products(&category)?;
                SessionState::Browsing { category, products }
            }
            SessionState::Browsing { category, products } => {
                render_products(self.out, &products)?;
                SessionState::AddingProduct { category }
            }
            SessionState::AddingProduct { category } => match self.prompter.add_product(&category) {
                FormOutcome::Submitted(product) => {
                    let products = self.api.add_product(&category, &product)?;
                    info!("added {} to {category}", product.name);
                    self.prompter.clear_screen()?;
                    writeln!(
                        self.out,
                        "{} {} {} {}",
                        "✔".green(),
                        "Category".bold(),
                        "·".dim(),
                        category.as_str().cyan()
                    )?;
                    SessionState::Browsing { category, products }
                }
                FormOutcome::Cancelled => {
                    info!("form cancelled, back to category selection");
                    self.prompter.clear_screen()?;
                    SessionState::SelectingCategory
                }
                FormOutcome::Failed(err) => return Err(err),
            },
        };
        Ok(())
    }
}

/// Name and price on one line, info below.
pub fn render_products(out: &mut dyn Write, products: &[Product]) -> io::Result<()> {
    for product in products {
        let rrp = scalar_text(&product.rrp).unwrap_or_default();
        writeln!(out)?;
        writeln!(out, "  {} - {}", product.name.as_str().bold(), rrp.italic())?;
        writeln!(out, "  {}", product.info)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Prompts on the real terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter
    }

    fn run_form(&mut self) -> CliResult<FormOutcome> {
        let mut form = ProductForm::new();
        let mut stdout = io::stdout();
        let _raw = RawMode::enable()?;
        let mut drawn = 0;
        loop {
            drawn = draw_form(&mut stdout, &form, drawn)?;
            if let Event::Key(key) = event::read()? {
                if let Some(outcome) = form.handle_key(key) {
                    return Ok(outcome);
                }
            }
        }
    }
}

impl Prompter for TerminalPrompter {
    fn select_category(&mut self, categories: &[String]) -> CliResult<String> {
        let idx = FuzzySelect::new()
            .with_prompt("Category")
            .items(categories)
            .default(0)
            .interact()?;
        categories
            .get(idx)
            .cloned()
            .ok_or_else(|| CliError::usage("Error: no categories configured"))
    }

    fn add_product(&mut self, _category: &str) -> FormOutcome {
        match self.run_form() {
            Ok(outcome) => outcome,
            Err(err) => FormOutcome::Failed(err),
        }
    }

    fn clear_screen(&mut self) -> CliResult<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        Ok(())
    }
}

/// Raw mode for as long as the guard lives.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Redraws the form over the `previous` lines drawn last time and returns
/// how many lines it drew.
fn draw_form(out: &mut impl Write, form: &ProductForm, previous: u16) -> io::Result<u16> {
    if previous > 0 {
        queue!(out, cursor::MoveUp(previous))?;
    }
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::FromCursorDown))?;

    let mut lines = vec![format!("{} {} {}", "?".cyan(), "Add".bold(), HINT.dim())];
    for (i, field) in form.fields().iter().enumerate() {
        let marker = if i == form.focus() { "❯".cyan().to_string() } else { " ".to_string() };
        lines.push(format!("{marker} {}: {}", field.label, field.value));
    }
    if let Some(error) = form.error() {
        lines.push(format!("{} {}", "✖".red(), error.red()));
    }
    for line in &lines {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush()?;
    Ok(lines.len() as u16)
}
