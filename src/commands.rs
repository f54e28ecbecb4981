// Scripted commands and the top-level dispatch.
//
// `dispatch` routes the argument vector to one handler. When no command
// prefix matches it parses the interactive-mode options instead and tells
// the caller to start the session.

use std::io::{self, Write};

use log::debug;

use crate::api::{scalar_text, ApiClient, Transport};
use crate::args::{filter_positionals, ArgSpec, ArgValue};
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::router::Router;
use crate::usage::{legacy_usage, usage};

/// What a handler needs from the outside world.
pub struct Context<'a, T: Transport + ?Sized> {
    pub config: &'a Config,
    pub transport: &'a T,
    pub out: &'a mut dyn Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    AddOrder,
    ListCats,
    ListIds,
    /// `<id> <amount>`
    LegacyOrder,
}

impl Command {
    pub fn run<T: Transport + ?Sized>(self, ctx: &mut Context<'_, T>, argv: &[String]) -> CliResult<()> {
        debug!("running {self:?} with {argv:?}");
        match self {
            Command::AddOrder => add_order(ctx, argv),
            Command::ListCats => list_cats(ctx),
            Command::ListIds => list_ids(ctx, argv),
            Command::LegacyOrder => legacy_order(ctx, argv),
        }
    }
}

pub fn router() -> Router<Command> {
    Router::new()
        .register("add order", Command::AddOrder)
        .register("list cats", Command::ListCats)
        .register("list ids", Command::ListIds)
        .register_positionals(2, Command::LegacyOrder)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Done,
    Interactive { api_url: String },
}

pub fn dispatch<T: Transport + ?Sized>(argv: &[String], ctx: &mut Context<'_, T>) -> CliResult<Dispatch> {
    let router = router();
    if let Some(m) = router.resolve(argv) {
        m.handler.run(ctx, m.rest)?;
        return Ok(Dispatch::Done);
    }

    let args = ArgSpec::new()
        .boolean("help")
        .alias("help", "h")
        .string("api")
        .default_value("api", ctx.config.api_url.clone())
        .parse(argv)?;
    if args.flag("help") {
        usage(ctx.out, None)?;
        return Ok(Dispatch::Done);
    }
    Ok(Dispatch::Interactive {
        api_url: api_url(args.text("api"), ctx.config),
    })
}

fn api_url(flag: Option<&str>, config: &Config) -> String {
    flag.filter(|url| !url.is_empty())
        .unwrap_or(&config.api_url)
        .to_string()
}

/// `add order <id> --amount=<int> [--api=<url>]`
pub fn add_order<T: Transport + ?Sized>(ctx: &mut Context<'_, T>, argv: &[String]) -> CliResult<()> {
    let args = ArgSpec::new()
        .value("amount")
        .alias("amount", "n")
        .string("api")
        .default_value("api", ctx.config.api_url.clone())
        .parse(argv)?;

    if args.positionals().is_empty() {
        return Err(CliError::Usage(None));
    }
    let amount = args.get("amount").and_then(ArgValue::as_integer);
    let api = api_url(args.text("api"), ctx.config);
    let positionals = filter_positionals(args.into_positionals());

    let Some(id) = positionals.first() else {
        return Err(CliError::Usage(None));
    };
    let Some(amount) = amount else {
        return Err(CliError::usage(
            "Error: --amount flag is required and must be an integer",
        ));
    };

    ApiClient::new(ctx.transport, api).add_order(&id.to_string(), amount)?;
    writeln!(ctx.out, "{amount} has been added to {id}")?;
    Ok(())
}

/// `list cats`
pub fn list_cats<T: Transport + ?Sized>(ctx: &mut Context<'_, T>) -> CliResult<()> {
    writeln!(ctx.out, "\nCategories:\n")?;
    for cat in &ctx.config.categories {
        writeln!(ctx.out, "{cat}")?;
    }
    writeln!(ctx.out)?;
    Ok(())
}

/// `list ids --cat=<name> [--api=<url>]`
pub fn list_ids<T: Transport + ?Sized>(ctx: &mut Context<'_, T>, argv: &[String]) -> CliResult<()> {
    let args = ArgSpec::new()
        .string("cat")
        .string("api")
        .alias("cat", "c")
        .default_value("api", ctx.config.api_url.clone())
        .parse(argv)?;

    let cat = args
        .text("cat")
        .filter(|cat| !cat.is_empty())
        .ok_or_else(|| CliError::usage("Error: --cat flag is required"))?;
    let api = api_url(args.text("api"), ctx.config);

    writeln!(ctx.out, "\nCategory: {cat}\n  IDs:\n")?;
    let products = ApiClient::new(ctx.transport, api).products(cat)?;
    for product in &products {
        let id = product.id.as_ref().and_then(scalar_text);
        writeln!(ctx.out, "     {}", id.as_deref().unwrap_or("-"))?;
    }
    writeln!(ctx.out)?;
    Ok(())
}

/// `<id> <amount>` against the configured base URL.
pub fn legacy_order<T: Transport + ?Sized>(ctx: &mut Context<'_, T>, argv: &[String]) -> CliResult<()> {
    let [id, amount, ..] = argv else {
        return Err(CliError::LegacyUsage(None));
    };
    let amount = ArgValue::infer(amount.trim()).as_integer().ok_or_else(|| {
        CliError::LegacyUsage(Some("Error: amount must be an integer".into()))
    })?;

    ApiClient::new(ctx.transport, ctx.config.api_url.as_str()).add_order(id, amount)?;
    writeln!(ctx.out, "{amount} has been added to {id}")?;
    Ok(())
}

/// Prints an error the way the user should see it: usage errors as the
/// usage block on `out`, everything else as a message on `err_out`.
pub fn report(err: &CliError, out: &mut dyn Write, err_out: &mut dyn Write) -> io::Result<()> {
    match err {
        CliError::Usage(message) => usage(out, message.as_deref()),
        CliError::LegacyUsage(message) => legacy_usage(out, message.as_deref()),
        other => writeln!(err_out, "{other}"),
    }
}
