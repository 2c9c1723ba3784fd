use clap::Parser;
use clap::error::ErrorKind;
use log::warn;
use onetwodo_cli::cli::{Cli, collect_overrides};
use onetwodo_cli::render::{render_error_json, render_json, render_table};
use onetwodo_core::config::{
    load_config_with_fallback, merge_overrides, resolve_log_dir, resolve_log_level,
    resolve_store_path,
};
use onetwodo_core::error::AppError;
use onetwodo_core::logging::init_logging;
use onetwodo_core::logic::{CommandResult, Logic};
use onetwodo_core::storage::json_store;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const PROMPT: &str = "> ";

struct Session {
    logic: Logic,
    store_path: PathBuf,
    json: bool,
}

impl Session {
    /// Runs one command line and saves when the list changed.
    fn run(&mut self, line: &str) -> Result<CommandResult, AppError> {
        let result = self.logic.execute(line)?;
        if result.changed {
            json_store::save(&self.store_path, self.logic.to_do_list())?;
        }
        Ok(result)
    }

    fn print_result(&self, result: &CommandResult, with_view: bool) -> Result<(), AppError> {
        if self.json {
            let shown = if with_view {
                self.logic.displayed_tasks()
            } else {
                Vec::new()
            };
            println!(
                "{}",
                render_json(Some(&result.feedback), &shown, self.logic.filter())?
            );
            return Ok(());
        }

        println!("{}", result.feedback);
        if with_view {
            self.print_view()?;
        }
        Ok(())
    }

    fn print_view(&self) -> Result<(), AppError> {
        let shown = self.logic.displayed_tasks();
        let rendered = if self.json {
            render_json(None, &shown, self.logic.filter())?
        } else {
            render_table(&shown, self.logic.filter())?
        };
        println!("{rendered}");
        Ok(())
    }

    fn print_error(&self, err: &AppError) {
        if self.json {
            eprintln!("{}", render_error_json(err));
        } else {
            eprintln!("ERROR: {}", err);
        }
    }
}

fn run_interactive(session: &mut Session) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    session.print_view()?;

    loop {
        if !session.json {
            print!("{PROMPT}");
            io::stdout()
                .flush()
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        let line = if line == "?" { "help" } else { line };

        match session.run(line) {
            Ok(result) => session.print_result(&result, true)?,
            Err(err) => session.print_error(&err),
        }
    }

    Ok(())
}

fn run_once(session: &mut Session, line: &str) -> Result<(), AppError> {
    let result = session.run(line)?;
    session.print_result(&result, result.view_changed)
}

fn build_session(cli: &Cli) -> Result<Session, AppError> {
    let overrides = collect_overrides(&cli.config_override).map_err(AppError::validation)?;
    let loaded = load_config_with_fallback();
    let config = merge_overrides(&loaded.config, &overrides);

    let log_level = resolve_log_level(&config);
    let logging = resolve_log_dir(&config).and_then(|dir| init_logging(&log_level, &dir));
    if let Err(err) = logging {
        eprintln!("WARNING: logging disabled: {err}");
    }
    if let Some(err) = loaded.error {
        warn!("event=config_load status=fallback code={}", err.code());
        eprintln!("WARNING: using default configuration: {err}");
    }

    let store_path = resolve_store_path(cli.store.as_deref(), &config)?;
    let list = json_store::load_or_sample(&store_path)?;
    let logic = Logic::new(list).with_aliases(config.aliases);

    Ok(Session {
        logic,
        store_path,
        json: cli.json,
    })
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("ERROR: {}", AppError::parse(err.to_string().trim()));
            std::process::exit(1);
        }
    };

    let mut session = match build_session(&cli) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let outcome = match cli.command_line() {
        Some(line) => run_once(&mut session, &line),
        None => run_interactive(&mut session),
    };

    if let Err(err) = outcome {
        session.print_error(&err);
        std::process::exit(1);
    }
}
