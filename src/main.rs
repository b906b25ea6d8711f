//! RemitDesk CLI Entry Point
//!
//! Runs the onboarding wizards and renders queue tables from JSON exports.
//!
//! # Usage
//!
//! ```bash
//! # Walk the agent onboarding wizard interactively
//! remitdesk wizard agent
//!
//! # Check a set of answers against a custom form
//! remitdesk wizard branch-form.yaml --answers answers.json
//!
//! # Render page 2 of a disbursement queue
//! remitdesk table records.json --agents agents.json --page 2
//!
//! # Only pending records from March
//! remitdesk table records.json --filter status=Pending --filter fromDate=2024-03-01
//! ```

use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use log::{error, info, log, Level};
use serde_json::{Map, Value};

use remitdesk::config::CONFIG_PATH;
use remitdesk::forms::builtin_form;
use remitdesk::notify::ConsoleNotifier;
use remitdesk::source::{JsonFileSource, LoadOutcome, LoadState};
use remitdesk::wizard::{load_form_definition, FormDefinition};
use remitdesk::{
    build_wizard, AgentDirectory, AppConfig, Form, Navigation, PageRequest, QueueView, StepIcon, Wizard,
    APP_NAME, VERSION,
};

/// Subcommand selected on the command line.
#[derive(Debug, PartialEq)]
enum Command {
    Wizard {
        form: String,
        answers: Option<PathBuf>,
    },
    Table {
        records: PathBuf,
        agents: Option<PathBuf>,
        page: usize,
        page_size: Option<usize>,
        filters: Vec<(String, String)>,
    },
}

/// Command-line configuration parsed from arguments.
#[derive(Debug)]
struct Config {
    command: Command,
    config_path: Option<PathBuf>,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| match record.level() {
            log::Level::Warn | log::Level::Error => {
                writeln!(buf, "[{}] {}", record.level(), record.args())
            }
            _ => writeln!(buf, "{}", record.args()),
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Remittance Back-Office Console");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: remitdesk [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  wizard <FORM>          Walk a multi-step form (agent, agent-branch, or a YAML file)");
    println!("  table <RECORDS.json>   Render one page of a queue export");
    println!();
    println!("Wizard options:");
    println!("  --answers FILE         Validate answers from a JSON object instead of prompting");
    println!();
    println!("Table options:");
    println!("  --agents FILE          Agent directory export used to resolve names");
    println!("  --page N               Page number, starting at 1 (default: 1)");
    println!("  --page-size N          Rows per page (default from config)");
    println!("  --filter KEY=VALUE     Filter records (status, agentId, search, fromDate, toDate)");
    println!();
    println!("Options:");
    println!("  --config PATH          Config file (default: $REMITDESK_CONFIG or remitdesk.yaml)");
    println!("  --verbose              Enable debug logging");
    println!("  --help                 Show this help message");
    println!("  --version              Show version information");
    println!();
    println!("Examples:");
    println!("  remitdesk wizard agent");
    println!("  remitdesk wizard agent-branch --answers branch.json");
    println!("  remitdesk table records.json --agents agents.json --page 2");
}

fn next_value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires {} argument", flag, what))
}

fn parse_number(flag: &str, text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Invalid {} value: {}", flag, text)),
    }
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut positional: Vec<String> = Vec::new();
    let mut config_path = None;
    let mut verbose = false;
    let mut answers = None;
    let mut agents = None;
    let mut page = 1;
    let mut page_size = None;
    let mut filters = Vec::new();
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                verbose = true;
            }
            "--config" => {
                config_path = Some(PathBuf::from(next_value(args, &mut i, "--config", "a path")?));
            }
            "--answers" => {
                answers = Some(PathBuf::from(next_value(args, &mut i, "--answers", "a path")?));
            }
            "--agents" => {
                agents = Some(PathBuf::from(next_value(args, &mut i, "--agents", "a path")?));
            }
            "--page" => {
                page = parse_number("--page", next_value(args, &mut i, "--page", "a number")?)?;
            }
            "--page-size" => {
                let text = next_value(args, &mut i, "--page-size", "a number")?;
                page_size = Some(parse_number("--page-size", text)?);
            }
            "--filter" => {
                let text = next_value(args, &mut i, "--filter", "a KEY=VALUE")?;
                let (key, value) = text
                    .split_once('=')
                    .ok_or_else(|| format!("Filter must be KEY=VALUE, got '{}'", text))?;
                filters.push((key.trim().to_string(), value.to_string()));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => positional.push(arg.clone()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("wizard") => {
            let form = positional.next().ok_or("wizard requires a form name or YAML file")?;
            Command::Wizard { form, answers }
        }
        Some("table") => {
            let records = positional.next().ok_or("table requires a records file")?;
            Command::Table {
                records: PathBuf::from(records),
                agents,
                page,
                page_size,
                filters,
            }
        }
        Some(other) => return Err(format!("Unknown command: {}", other)),
        None => return Err("No command given".to_string()),
    };

    if let Some(extra) = positional.next() {
        return Err(format!("Unexpected argument: {}", extra));
    }

    Ok(Config {
        command,
        config_path,
        verbose,
    })
}

/// Resolves a form argument to a built-in form or a YAML definition file.
fn resolve_form(name: &str) -> Result<FormDefinition, Box<dyn Error>> {
    if let Some(definition) = builtin_form(name) {
        return Ok(definition);
    }

    if Path::new(name).exists() {
        return Ok(load_form_definition(name)?);
    }

    Err(format!("'{}' is neither a built-in form (agent, agent-branch) nor a file", name).into())
}

/// Reads a typed answer: JSON scalars where they parse, otherwise text.
fn parse_answer(text: &str) -> Value {
    match serde_json::from_str::<Value>(text) {
        Ok(value) if !value.is_object() && !value.is_array() => value,
        _ => Value::String(text.to_string()),
    }
}

fn print_steps(wizard: &Wizard<Form, ConsoleNotifier>) {
    for (index, icon) in wizard.step_icons().into_iter().enumerate() {
        let badge = match icon {
            StepIcon::Valid => "✔".green(),
            StepIcon::Invalid => "✖".red(),
            StepIcon::Neutral => "○".dimmed(),
        };
        let title = wizard.step(index).map(|s| s.title()).unwrap_or_default();
        let label = format!("{}. {}", index + 1, title);

        if index == wizard.current_step() {
            println!("  {} {}", badge, label.bold());
        } else {
            println!("  {} {}", badge, label);
        }
    }
    println!();
}

fn print_values(form: &Form) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(&form.values())?);
    Ok(())
}

/// Validates answers from a file, walking the steps in order.
fn run_wizard_batch(mut wizard: Wizard<Form, ConsoleNotifier>, answers: &Path) -> Result<(), Box<dyn Error>> {
    let content = fs::read_to_string(answers)
        .map_err(|e| format!("Could not read answers from '{}': {}", answers.display(), e))?;
    let values: Map<String, Value> = serde_json::from_str(&content)?;

    let accepted = wizard.form_mut().fill(&values);
    info!("Applied {} of {} answers", accepted, values.len());

    loop {
        match wizard.advance() {
            Navigation::Moved { to, .. } => {
                info!("Step {} passed", to);
            }
            Navigation::Blocked { step } => {
                print_steps(&wizard);
                return Err(format!("Answers stop at step {} of {}", step + 1, wizard.step_count()).into());
            }
            Navigation::Unchanged => break,
        }
    }

    let last = wizard.step_count() - 1;
    if !wizard.is_step_valid(last) {
        // The final step has no "next" to trigger its warning.
        wizard.jump_to(last);
        print_steps(&wizard);
        return Err(format!("Answers stop at step {} of {}", last + 1, wizard.step_count()).into());
    }

    print_steps(&wizard);
    info!("{}", "All steps complete".green());
    print_values(wizard.form())
}

fn print_commands() {
    println!("Commands: set FIELD VALUE | clear FIELD | next | back | goto N | show | done | quit");
}

/// Interactive loop over stdin.
fn run_wizard_interactive(mut wizard: Wizard<Form, ConsoleNotifier>) -> Result<(), Box<dyn Error>> {
    print_commands();
    println!();
    print_steps(&wizard);

    let stdin = io::stdin();
    loop {
        let title = wizard.step(wizard.current_step()).map(|s| s.title().to_string()).unwrap_or_default();
        print!("{}> ", title);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Err("Input closed before the wizard was finished".into());
        }

        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => continue,
            "set" => {
                let (field, value) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
                if !wizard.form_mut().set(field, parse_answer(value.trim())) {
                    continue;
                }
                for problem in wizard.form().errors(field) {
                    println!("  {} {}", "!".yellow(), problem);
                }
            }
            "clear" => wizard.form_mut().clear(rest.trim()),
            "next" => {
                if wizard.is_last_step() {
                    println!("Already on the last step; use 'done' to finish");
                    continue;
                }
                wizard.advance();
                print_steps(&wizard);
            }
            "back" => {
                wizard.retreat();
                print_steps(&wizard);
            }
            "goto" => match rest.trim().parse::<usize>() {
                Ok(n) if n >= 1 => {
                    wizard.jump_to(n - 1);
                    print_steps(&wizard);
                }
                _ => println!("goto needs a step number from 1 to {}", wizard.step_count()),
            },
            "show" => {
                print_steps(&wizard);
                print_values(wizard.form())?;
            }
            "done" => {
                let last = wizard.step_count() - 1;
                if !wizard.is_last_step() {
                    println!("Finish the remaining steps first");
                } else if wizard.jump_to(last) == Navigation::Unchanged {
                    info!("{}", "All steps complete".green());
                    return print_values(wizard.form());
                }
            }
            "quit" | "exit" => {
                info!("Wizard abandoned");
                return Ok(());
            }
            "help" => print_commands(),
            other => println!("Unknown command '{}'; type 'help'", other),
        }
    }
}

fn run_wizard(form: &str, answers: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let definition = resolve_form(form)?;
    info!(
        "Form '{}': {} fields, {} steps",
        definition.name,
        definition.fields.len(),
        definition.step_count()
    );

    let wizard = build_wizard(&definition, ConsoleNotifier)?;

    match answers {
        Some(path) => run_wizard_batch(wizard, path),
        None => run_wizard_interactive(wizard),
    }
}

fn run_table(
    app: &AppConfig,
    records: PathBuf,
    agents: Option<PathBuf>,
    page: usize,
    page_size: Option<usize>,
    filters: Vec<(String, String)>,
) -> Result<(), Box<dyn Error>> {
    let page_size = page_size.unwrap_or(app.page_size);
    let request = filters
        .into_iter()
        .fold(PageRequest::new(page, page_size), |request, (key, value)| {
            request.with_filter(key, value)
        });

    let mut source = JsonFileSource::new().with_records(records);
    let has_agents = agents.is_some();
    if let Some(path) = agents {
        source = source.with_agents(path);
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let view = QueueView::new(app.configure_directory(AgentDirectory::new()));

    let outcome = runtime.block_on(async {
        if has_agents {
            let directory = AgentDirectory::load_all(&source, app.page_size).await?;
            info!("Agent directory: {} agents", directory.len());
            view.set_directory(app.configure_directory(directory));
        }
        Ok::<_, Box<dyn Error>>(view.load(&source, request).await)
    })?;

    if let LoadOutcome::Failed(message) = outcome {
        error!("Could not load records: {}", message);
        return Err(message.into());
    }

    let table = view.table();
    println!("{}", table.render());
    println!();

    let total = view.total_count();
    match view.state() {
        LoadState::Empty if total > 0 => {
            println!("Page {} is past the end ({} records)", page, total);
        }
        LoadState::Empty => println!("No records match"),
        _ => println!(
            "Page {} of {} ({} records, {} columns)",
            page,
            total.div_ceil(page_size).max(1),
            total,
            table.columns.len()
        ),
    }

    Ok(())
}

/// Describes where settings came from, for logging once the logger is up.
fn config_report(path: &Path, app: &AppConfig) -> (Level, String) {
    if path.exists() {
        (
            Level::Info,
            format!("Loaded config from {} (page size {})", path.display(), app.page_size),
        )
    } else {
        (Level::Debug, format!("No config at {}, using defaults", path.display()))
    }
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // Config is read before logging starts since it can switch on debug output.
    let config_path = config.config_path.unwrap_or_else(|| CONFIG_PATH.clone());
    let app = AppConfig::load(&config_path)?;

    setup_logging(config.verbose || app.verbose);
    print_banner();

    let (level, message) = config_report(&config_path, &app);
    log!(level, "{}", message);

    match config.command {
        Command::Wizard { form, answers } => run_wizard(&form, answers.as_deref()),
        Command::Table {
            records,
            agents,
            page,
            page_size,
            filters,
        } => run_table(&app, records, agents, page, page_size, filters),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("remitdesk")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_wizard() {
        let config = parse_arguments(&args(&["wizard", "agent", "--answers", "a.json"])).unwrap();
        assert_eq!(
            config.command,
            Command::Wizard {
                form: "agent".to_string(),
                answers: Some(PathBuf::from("a.json")),
            }
        );
        assert!(!config.verbose);
    }

    #[test]
    fn test_parse_table() {
        let config = parse_arguments(&args(&[
            "--verbose",
            "table",
            "records.json",
            "--page",
            "3",
            "--filter",
            "status=Pending",
        ]))
        .unwrap();

        assert!(config.verbose);
        match config.command {
            Command::Table {
                records, page, filters, ..
            } => {
                assert_eq!(records, PathBuf::from("records.json"));
                assert_eq!(page, 3);
                assert_eq!(filters, vec![("status".to_string(), "Pending".to_string())]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_arguments(&args(&[])).is_err());
        assert!(parse_arguments(&args(&["launch"])).is_err());
        assert!(parse_arguments(&args(&["wizard"])).is_err());
        assert!(parse_arguments(&args(&["table", "r.json", "--page", "0"])).is_err());
        assert!(parse_arguments(&args(&["table", "r.json", "--filter", "status"])).is_err());
        assert!(parse_arguments(&args(&["table", "r.json", "--bogus"])).is_err());
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("1200"), Value::from(1200));
        assert_eq!(parse_answer("true"), Value::Bool(true));
        assert_eq!(parse_answer("09:00"), Value::from("09:00"));
        assert_eq!(parse_answer("[1]"), Value::from("[1]"));
    }

    #[test]
    fn test_config_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remitdesk.yaml");

        let (level, message) = config_report(&path, &AppConfig::default());
        assert_eq!(level, Level::Debug);
        assert!(message.contains("using defaults"));

        fs::write(&path, "page_size: 25\n").unwrap();
        let app = AppConfig::load(&path).unwrap();
        let (level, message) = config_report(&path, &app);
        assert_eq!(level, Level::Info);
        assert!(message.starts_with("Loaded config from"));
        assert!(message.contains("page size 25"));
    }

    #[test]
    fn test_resolve_form() {
        assert_eq!(resolve_form("agent").unwrap().name, "agent");
        assert!(resolve_form("no-such-form").is_err());
    }
}
