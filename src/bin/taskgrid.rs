//! A terminal front end for the task calendar.
//!
//! Type `help` for the list of commands. Set the `RUST_LOG` environment variable to see what happens under the hood.

use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use taskgrid::app::{App, AuthForm, Notice, NoticeKind, Screen};
use taskgrid::client::Client;
use taskgrid::date::{parse_date_key, to_local_date_key, today};
use taskgrid::session::SessionStore;
use taskgrid::TaskId;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the task service
    #[arg(long, env = "TASKGRID_API_URL")]
    url: Option<String>,
    /// Where to keep the session between runs
    #[arg(long, env = "TASKGRID_SESSION_FILE")]
    session_file: Option<PathBuf>,
}

const HELP: &str = "\
Commands:
  login <username> <password>
  register <username> <email> <password>
  logout
  cal | day                  switch between the month grid and the day view
  next | prev                move the month grid
  focus <YYYY-MM-DD|today>   pick the day shown by the day view
  add <YYYY-MM-DD|today> <text>   add a task (or a ##Group header)
  toggle <id>                check or uncheck a task
  edit <id> [text]           change a task text (no text deletes it)
  digest [YYYY-MM-DD]        pending tasks of a day
  refresh
  help
  quit";

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let url = cli.url.unwrap_or_else(taskgrid::config::api_url);
    let client = match Client::new(&url) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("Invalid service URL {}: {}", url, err);
            std::process::exit(2);
        },
    };
    let sessions = match cli.session_file {
        Some(path) => SessionStore::new(&path),
        None => SessionStore::from_config(),
    };
    log::debug!("Using {} and session file {:?}", client.base_url(), sessions.path());

    let mut app = App::new(client, sessions, today());
    app.start().await;
    print_screen(&app);

    let stdin = stdin();
    loop {
        print!("> ");
        let _ = stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {},
            Err(err) => {
                eprintln!("Unable to read input: {}", err);
                break;
            },
        }

        app.set_today(today());
        match run_command(&mut app, line.trim()).await {
            Flow::Quit => break,
            Flow::Redraw => print_screen(&app),
            Flow::Stay => {},
        }
    }
}

enum Flow {
    Redraw,
    Stay,
    Quit,
}

async fn run_command(app: &mut App<Client>, line: &str) -> Flow {
    let (command, rest) = match line.split_once(' ') {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    // Errors are already recorded in the app state, and printed with the screen
    match (command, args.as_slice()) {
        ("", _) => return Flow::Stay,
        ("help", _) => {
            println!("{}", HELP);
            return Flow::Stay;
        },
        ("quit", _) | ("exit", _) => return Flow::Quit,

        ("login", [username, password]) => {
            app.show_login_form();
            let _ = app.login(username, password).await;
        },
        ("register", [username, email, password]) => {
            app.show_register_form();
            let _ = app.register(username, password, email).await;
        },
        ("logout", _) => app.logout().await,

        ("cal", _) => app.switch_to_calendar(),
        ("day", _) => app.switch_to_day(),
        ("next", _) => { let _ = app.next_month().await; },
        ("prev", _) => { let _ = app.prev_month().await; },
        ("refresh", _) => { let _ = app.refresh().await; },
        ("focus", [date]) => match parse_day(app, date) {
            Some(day) => app.focus_day(day),
            None => return invalid_date(date),
        },

        ("add", [date, ..]) => {
            let date_key = match parse_day(app, date) {
                Some(day) => to_local_date_key(&day),
                None => return invalid_date(date),
            };
            let text = rest.split_once(' ').map(|(_, text)| text).unwrap_or("");
            let _ = app.submit_new_task(&date_key, text).await;
        },
        ("toggle", [id]) => match parse_id(id) {
            Some(id) => { let _ = app.toggle_task(id).await; },
            None => return invalid_id(id),
        },
        ("edit", [id, ..]) => match parse_id(id) {
            Some(id) => {
                let text = rest.split_once(' ').map(|(_, text)| text).unwrap_or("");
                let _ = app.commit_edit(id, text).await;
            },
            None => return invalid_id(id),
        },
        ("digest", dates) => {
            let day = match dates.first() {
                None => app.view().focused_day(),
                Some(date) => match parse_day(app, date) {
                    Some(day) => day,
                    None => return invalid_date(date),
                },
            };
            let date_key = to_local_date_key(&day);
            match app.pending_digest(&date_key) {
                Some(digest) => println!("{}", digest),
                None => println!("No pending tasks on {}.", date_key),
            }
            return Flow::Stay;
        },

        _ => {
            println!("Unknown command or wrong arguments. Type `help` for the list of commands.");
            return Flow::Stay;
        },
    }
    Flow::Redraw
}

fn parse_day(app: &App<Client>, text: &str) -> Option<chrono::NaiveDate> {
    match text {
        "today" => Some(app.today()),
        other => parse_date_key(other),
    }
}

fn parse_id(text: &str) -> Option<TaskId> {
    text.trim_start_matches('#').parse().ok()
}

fn invalid_date(text: &str) -> Flow {
    println!("Invalid date {:?}, expected YYYY-MM-DD or `today`", text);
    Flow::Stay
}

fn invalid_id(text: &str) -> Flow {
    println!("Invalid task ID {:?}", text);
    Flow::Stay
}

fn print_notice(notice: Option<&Notice>) {
    if let Some(notice) = notice {
        match notice.kind {
            NoticeKind::Info => println!("  {}", notice.text),
            NoticeKind::Error => println!("  !! {}", notice.text),
        }
    }
}

fn print_screen(app: &App<Client>) {
    println!();
    match app.render() {
        Screen::Auth(auth) => {
            match auth.form {
                AuthForm::Login => {
                    println!("Log in with `login <username> <password>` (or create an account with `register`)");
                    print_notice(auth.login_message.as_ref());
                },
                AuthForm::Register => {
                    println!("Create an account with `register <username> <email> <password>` (or `login`)");
                    print_notice(auth.register_message.as_ref());
                },
            }
        },
        Screen::Calendar(grid) => {
            print_notice(app.banner());
            print!("{}", grid);
        },
        Screen::Day(page) => {
            print_notice(app.banner());
            println!("  {}", page.header);
            print!("{}", page.tasks);
        },
    }
}
