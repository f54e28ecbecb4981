// Library root
// -----------
// The binary (`main.rs`) is a thin shell over these modules.
//
// Module responsibilities:
// - `config`: API base URL and category list, passed explicitly.
// - `args`: per-handler option parsing and positional filtering.
// - `router`: maps leading command words to a handler.
// - `api`: HTTP calls against the back-office service.
// - `commands`: the scripted commands and top-level dispatch.
// - `form`: the add-product form, independent of the terminal.
// - `ui`: the interactive session and its terminal prompter.
// - `usage`: help text.
// - `error`: the error type every command returns.
pub mod api;
pub mod args;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod router;
pub mod ui;
pub mod usage;
