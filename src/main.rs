// Entrypoint for the CLI application.
// - Keeps `main` small: build the config and HTTP transport, dispatch the
//   arguments, and start the interactive session when no command matched.
// - Setup failures go through `anyhow`; command failures are reported by
//   `commands::report` and exit with status 1.

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use backoffice_cli::api::{ApiClient, HttpTransport};
use backoffice_cli::commands::{dispatch, report, Context, Dispatch};
use backoffice_cli::config::Config;
use backoffice_cli::error::CliResult;
use backoffice_cli::ui::{Session, TerminalPrompter};

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::default().filter_or("BACKOFFICE_LOG", "warn"));

    match try_main() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> Result<ExitCode> {
    // Base URL from `BACKOFFICE_API_URL` or http://localhost:3000; `--api`
    // overrides it per invocation.
    let config = Config::from_env();
    let transport = HttpTransport::new()?;
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let mut out = io::stdout().lock();

    let dispatched = dispatch(
        &argv,
        &mut Context {
            config: &config,
            transport: &transport,
            out: &mut out,
        },
    );
    let result: CliResult<()> = match dispatched {
        Ok(Dispatch::Done) => Ok(()),
        Ok(Dispatch::Interactive { api_url }) => {
            let transport = transport.with_spinner(true);
            let api = ApiClient::new(&transport, api_url);
            let mut prompter = TerminalPrompter::new();
            match Session::new(&api, &config.categories, &mut prompter, &mut out).run() {
                Ok(never) => match never {},
                Err(err) => Err(err),
            }
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            report(&err, &mut out, &mut io::stderr())?;
            Ok(ExitCode::from(err.exit_code() as u8))
        }
    }
}
