// src/bin/regform.rs
//! Interactive terminal front-end for the two-step registration form.
//!
//! Reads one command per line from stdin. Country lookups run as background
//! tasks and report back over a channel, so typing ahead never waits on the
//! network.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use regform::render::{render_errors, render_table};
use regform::{
    CountryLookup, Field, FormController, FormError, LookupConfig, LookupTicket,
    RestCountriesClient, StaticCountries, SubmissionStore,
};

const HELP: &str = "\
Commands:
  set <field> <value>   fill in a field (name, dob, sex, mobile, govIDType, govID,
                        address, state, city, pinCode)
  country <text>        type into the country box and fetch suggestions
  pick <n>              use suggestion number n as the country
  next                  check personal details and continue
  submit                check everything and save the registration
  show                  show the current step
  list                  show saved registrations
  help                  show this text
  quit                  exit";

#[derive(Parser, Debug)]
#[command(author, version, about = "Two-step personal details registration form")]
struct Args {
    /// Root URL of the country lookup service
    #[arg(long, env = "REGFORM_COUNTRY_API")]
    api_url: Option<String>,

    /// Country lookup timeout in seconds
    #[arg(long, env = "REGFORM_LOOKUP_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Suggest countries from a built-in list instead of the network
    #[arg(long)]
    offline: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Set(Field, String),
    Country(String),
    Pick(usize),
    Next,
    Submit,
    Show,
    List,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "set" => {
            let (name, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = Field::from_name(name).ok_or_else(|| format!("unknown field {:?}", name))?;
            if field == Field::Country {
                return Err("use `country <text>` to fill in the country".to_string());
            }
            Ok(Command::Set(field, value.trim().to_string()))
        }
        "country" => Ok(Command::Country(rest.to_string())),
        "pick" => rest
            .parse::<usize>()
            .ok()
            .filter(|&n| n > 0)
            .map(|n| Command::Pick(n - 1))
            .ok_or_else(|| format!("expected a suggestion number, got {:?}", rest)),
        "next" => Ok(Command::Next),
        "submit" => Ok(Command::Submit),
        "show" => Ok(Command::Show),
        "list" => Ok(Command::List),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command {:?}", other)),
    }
}

fn build_lookup(args: &Args) -> Result<Arc<dyn CountryLookup>> {
    if args.offline {
        info!("Using built-in country list");
        return Ok(Arc::new(StaticCountries::builtin()));
    }

    let mut config = LookupConfig::from_env();
    if let Some(api_url) = &args.api_url {
        config.base_url = api_url.clone();
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    info!("Country suggestions from {}", config.base_url);
    Ok(Arc::new(RestCountriesClient::new(config)?))
}

fn show(form: &FormController) {
    let step = form.step();
    println!("== {} ==", step.title());
    for &field in step.fields() {
        let value = form.draft().get(field).unwrap_or("");
        match form.errors().message(field) {
            Some(message) => println!("  {:<14} {:<24} ! {}", field.label(), value, message),
            None => println!("  {:<14} {}", field.label(), value),
        }
    }
    if !form.suggestions().is_empty() {
        print_suggestions(form.suggestions());
    }
}

fn print_suggestions(names: &[String]) {
    if names.is_empty() {
        println!("No matching countries");
        return;
    }
    for (i, name) in names.iter().enumerate() {
        println!("  [{}] {}", i + 1, name);
    }
}

fn report(result: Result<(), FormError>) {
    match result {
        Ok(()) => {}
        Err(FormError::Invalid(errors)) => print!("{}", render_errors(&errors)),
        Err(e) => println!("{}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    );

    let args = Args::parse();
    let lookup = build_lookup(&args)?;
    let store = SubmissionStore::shared();
    let mut form = FormController::new(store.clone(), lookup);

    let (tx, mut rx) = mpsc::unbounded_channel::<(LookupTicket, Vec<String>)>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", HELP);
    show(&form);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };

                match command {
                    Command::Set(field, value) => form.set_field(field, value),
                    Command::Country(text) => {
                        let ticket = form.begin_country_query(text);
                        let lookup = form.lookup();
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let names = lookup.suggest(ticket.query()).await;
                            let _ = tx.send((ticket, names));
                        });
                    }
                    Command::Pick(index) => match form.select_suggestion(index) {
                        Some(name) => println!("Country set to {}", name),
                        None => println!("No suggestion number {}", index + 1),
                    },
                    Command::Next => {
                        let result = form.advance();
                        let advanced = result.is_ok();
                        report(result);
                        if advanced {
                            show(&form);
                        }
                    }
                    Command::Submit => match form.submit() {
                        Ok(submission) => {
                            println!("Saved registration {}", submission.id);
                            print!("{}", render_table(&store.list()));
                            show(&form);
                        }
                        Err(e) => report(Err(e)),
                    },
                    Command::Show => show(&form),
                    Command::List => print!("{}", render_table(&store.list())),
                    Command::Help => println!("{}", HELP),
                    Command::Quit => break,
                }
            }
            Some((ticket, names)) = rx.recv() => {
                if form.apply_suggestions(&ticket, names) {
                    print_suggestions(form.suggestions());
                }
            }
        }
    }

    info!("Exiting with {} saved registration(s)", store.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_keeps_spaces_in_value() {
        assert_eq!(
            parse_command("set address 12 MG Road"),
            Ok(Command::Set(Field::Address, "12 MG Road".to_string()))
        );
        assert_eq!(
            parse_command("set govIDType pan"),
            Ok(Command::Set(Field::GovIdType, "pan".to_string()))
        );
        assert_eq!(parse_command("set mobile"), Ok(Command::Set(Field::Mobile, String::new())));
        assert!(parse_command("set email a@b.c").is_err());
        assert!(parse_command("set country India").is_err());
    }

    #[test]
    fn test_parse_pick_is_one_based() {
        assert_eq!(parse_command("pick 1"), Ok(Command::Pick(0)));
        assert!(parse_command("pick 0").is_err());
        assert!(parse_command("pick x").is_err());
    }

    #[test]
    fn test_parse_simple_verbs() {
        assert_eq!(parse_command("  NEXT "), Ok(Command::Next));
        assert_eq!(parse_command("country united k"), Ok(Command::Country("united k".into())));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert!(parse_command("").is_err());
        assert!(parse_command("dance").is_err());
    }
}
