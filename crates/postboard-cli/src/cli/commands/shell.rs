//! Interactive session.
//!
//! The shell keeps a current page. Opening a privileged page always runs a
//! fresh session guard first, and navigation requested by a flow is followed
//! before the next prompt.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use postboard_core::config::Config;
use postboard_core::surface::Page;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::{CliApp, app, prompt_hidden};

const HELP: &str = "\
Commands:
  login <email>             log in (asks for the password)
  register <email> <name>   create an account (asks for the password)
  logout                    end the session
  posts                     open the posts page
  new                       write a post (on the posts page)
  profile                   open your profile
  reload                    load the current page again
  help                      show this help
  quit                      leave the shell";

const ENTRY_HINT: &str = "Log in with `login <email>` or create an account with `register <email> <name>`.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Login { email: String },
    Register { email: String, name: String },
    Logout,
    Posts,
    New,
    Profile,
    Reload,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines parse to `None`.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "login" => match words.next() {
                Some(email) => Command::Login {
                    email: email.to_string(),
                },
                None => return Err("Usage: login <email>".to_string()),
            },
            "register" => {
                let email = words.next();
                let name = words.collect::<Vec<_>>().join(" ");
                match email {
                    Some(email) if !name.is_empty() => Command::Register {
                        email: email.to_string(),
                        name,
                    },
                    _ => return Err("Usage: register <email> <name>".to_string()),
                }
            }
            "logout" => Command::Logout,
            "posts" | "dashboard" => Command::Posts,
            "new" => Command::New,
            "profile" => Command::Profile,
            "reload" => Command::Reload,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command: {other} (try `help`)")),
        };
        Ok(Some(command))
    }
}

type Input = Lines<BufReader<Stdin>>;

pub async fn run(config: &Config) -> Result<()> {
    let mut app = app(config, config.timings())?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let start = if app.session().logged_in {
        Page::Posts
    } else {
        Page::Entry
    };
    let mut page = go_to(&mut app, start).await;
    app.surface_mut().line("Type `help` for commands.");

    loop {
        app.surface_mut().prompt(&format!("{page}> "));
        let Some(line) = input.next_line().await.context("read command")? else {
            break;
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                app.surface_mut().line(&usage);
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => app.surface_mut().line(HELP),
            Command::Posts => page = go_to(&mut app, Page::Posts).await,
            Command::Profile => page = go_to(&mut app, Page::Profile).await,
            Command::Reload => page = go_to(&mut app, page).await,
            Command::Logout => {
                app.logout().await;
            }
            Command::Login { email } => {
                let Some(password) = ask_password(&mut app, &mut input).await? else {
                    break;
                };
                app.login(&email, &password).await;
            }
            Command::Register { email, name } => {
                let Some(password) = ask_password(&mut app, &mut input).await? else {
                    break;
                };
                app.register(&name, &email, &password).await;
            }
            Command::New => {
                if page != Page::Posts {
                    app.surface_mut()
                        .line("Open the posts page with `posts` to write a post.");
                    continue;
                }
                let Some(title) = ask(&mut app, &mut input, "Title").await? else {
                    break;
                };
                let Some(content) = ask(&mut app, &mut input, "Content").await? else {
                    break;
                };
                app.create_post(&title, &content).await;
            }
        }

        if let Some(next) = app.surface_mut().take_navigation() {
            page = go_to(&mut app, next).await;
        }
    }

    Ok(())
}

/// Loads `page`, following any redirect the load itself requests.
async fn go_to(app: &mut CliApp, mut page: Page) -> Page {
    loop {
        app.open_page(page).await;
        match app.surface_mut().take_navigation() {
            Some(next) if next != page => page = next,
            _ => break,
        }
    }
    if page == Page::Entry {
        app.surface_mut().line(ENTRY_HINT);
    }
    page
}

/// Prompts for one line of input. `None` when input has ended.
async fn ask(app: &mut CliApp, input: &mut Input, label: &str) -> Result<Option<String>> {
    app.surface_mut().prompt(&format!("{label}: "));
    let line = input.next_line().await.context("read input")?;
    Ok(line.map(|l| l.trim_end_matches('\r').to_string()))
}

/// Prompts for a password. Echo is off on a terminal; piped input is read
/// like any other line.
async fn ask_password(app: &mut CliApp, input: &mut Input) -> Result<Option<String>> {
    if io::stdin().is_terminal() {
        return prompt_hidden("Password").map(Some);
    }
    ask(app, input, "Password").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_login_requires_email() {
        assert_eq!(
            Command::parse("login ada@example.com"),
            Ok(Some(Command::Login {
                email: "ada@example.com".to_string()
            }))
        );
        assert_eq!(
            Command::parse("login"),
            Err("Usage: login <email>".to_string())
        );
    }

    #[test]
    fn test_parse_register_joins_name() {
        assert_eq!(
            Command::parse("register ada@example.com Ada  Lovelace"),
            Ok(Some(Command::Register {
                email: "ada@example.com".to_string(),
                name: "Ada Lovelace".to_string(),
            }))
        );
        assert!(Command::parse("register ada@example.com").is_err());
    }

    #[test]
    fn test_parse_aliases_and_blank_lines() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("DASHBOARD"), Ok(Some(Command::Posts)));
        assert_eq!(Command::parse("exit"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse("?"), Ok(Some(Command::Help)));
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = Command::parse("delete everything").unwrap_err();
        assert!(err.contains("Unknown command: delete"));
    }
}
