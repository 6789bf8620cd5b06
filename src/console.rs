use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};
use tokio::io::AsyncBufReadExt;
use uuid::Uuid;

use tracklist::app::App;
use tracklist::config::TrackConfig;
use tracklist::core::task::Priority;
use tracklist::notify::{Notification, NotificationSink};
use tracklist::storage::Storage;
use tracklist::store::TaskPatch;
use tracklist::view::{Filter, SortKey};

const OVERDUE_CHECK_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Prints notifications straight to the terminal. Auto-dismiss durations
/// mean nothing in scrollback, so they are dropped here.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn push(&mut self, notification: Notification) {
        println!(
            "[{}] {}",
            notification.severity.as_keyword(),
            notification.message
        );
    }
}

/// The interactive loop: console input, the reminder timer and the periodic
/// overdue check multiplexed on one task.
pub async fn run(config: TrackConfig) -> std::io::Result<()> {
    let mut sink = ConsoleSink;
    let storage = Storage::new(config.tasks_path());
    let mut app = App::open(storage, &mut sink);
    app.check_overdue(&mut sink);

    let mut visible = render(&app);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut overdue_timer = tokio::time::interval(OVERDUE_CHECK_INTERVAL);
    overdue_timer.tick().await; // immediate first tick; startup already checked

    prompt()?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match Command::parse(&line) {
                    Ok(Some(command)) => {
                        if apply(command, &mut app, &mut sink, &mut visible) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                }
                prompt()?;
            }
            _ = sleep_until_deadline(app.next_reminder_deadline()) => {
                app.fire_due_reminders(&mut sink);
            }
            _ = overdue_timer.tick() => {
                app.check_overdue(&mut sink);
            }
        }
    }
    Ok(())
}

/// Sleep until the next reminder deadline, or forever when none is pending.
async fn sleep_until_deadline(deadline: Option<NaiveDateTime>) {
    match deadline {
        Some(at) => {
            let now = Local::now().naive_local();
            let wait = (at - now).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write as _;
    let mut out = std::io::stdout();
    write!(out, "> ")?;
    out.flush()
}

/// Print the active projection and return the ids backing the displayed
/// numbers, which index commands refer to.
fn render(app: &App) -> Vec<Uuid> {
    let stats = app.stats();
    let tasks = app.visible_tasks();

    println!();
    println!(
        "Track-List — {} total, {} pending, {} completed  [filter: {}, sort: {}]",
        stats.total,
        stats.pending,
        stats.completed,
        app.filter().as_keyword(),
        app.sort().as_keyword()
    );

    if tasks.is_empty() {
        println!("  (no tasks to show)");
        return Vec::new();
    }

    let today = Local::now().date_naive();
    for (i, task) in tasks.iter().enumerate() {
        let check = if task.completed { "x" } else { " " };
        let mut line = format!(
            "{:>3}. [{}] ({}) {}",
            i + 1,
            check,
            task.priority.as_keyword(),
            task.text
        );
        if let Some(due) = task.due_date {
            line.push_str(&format!("  due {}", format_due(due, today)));
            if task.is_overdue(today) {
                line.push_str(" (overdue)");
            }
        }
        if let Some(reminder) = task.reminder {
            line.push_str(&format!("  remind {}", reminder.format("%Y-%m-%d %H:%M")));
        }
        println!("{line}");
    }

    tasks.iter().map(|t| t.id).collect()
}

fn format_due(due: NaiveDate, today: NaiveDate) -> String {
    if due == today {
        "Today".to_string()
    } else if Some(due) == today.succ_opt() {
        "Tomorrow".to_string()
    } else {
        due.format("%Y-%m-%d").to_string()
    }
}

/// Run one command against the app. Returns true when the loop should end.
fn apply(command: Command, app: &mut App, sink: &mut ConsoleSink, visible: &mut Vec<Uuid>) -> bool {
    match command {
        Command::Quit => return true,
        Command::Help => print_help(),
        Command::List => *visible = render(app),
        Command::Add {
            text,
            priority,
            due,
            reminder,
        } => {
            if app.add_task(&text, priority, due, reminder, sink).is_some() {
                *visible = render(app);
            }
        }
        Command::Edit { index, patch } => match task_at(visible, index) {
            Some(id) => {
                if app.edit_task(id, patch, sink) {
                    *visible = render(app);
                }
            }
            None => println!("No task numbered {index}."),
        },
        Command::Done { index } => match task_at(visible, index) {
            Some(id) => {
                if app.toggle_done(id, sink) {
                    *visible = render(app);
                }
            }
            None => println!("No task numbered {index}."),
        },
        Command::Remove { index } => match task_at(visible, index) {
            Some(id) => {
                if app.delete_task(id, sink) {
                    *visible = render(app);
                }
            }
            None => println!("No task numbered {index}."),
        },
        Command::SetFilter(filter) => {
            app.set_filter(filter);
            *visible = render(app);
        }
        Command::SetSort(sort) => {
            app.set_sort(sort);
            *visible = render(app);
        }
        Command::Clear => {
            app.clear_all(sink);
            *visible = render(app);
        }
        Command::Export { dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            if let Some(path) = app.export_tasks(&dir, sink) {
                println!("Wrote {}", path.display());
            }
        }
        Command::Import { path } => {
            if app.import_tasks(&path, sink) {
                *visible = render(app);
            }
        }
    }
    false
}

fn task_at(visible: &[Uuid], index: usize) -> Option<Uuid> {
    index.checked_sub(1).and_then(|i| visible.get(i)).copied()
}

fn print_help() {
    println!("Commands:");
    println!("  add <text> [--priority low|medium|high] [--due YYYY-MM-DD] [--remind YYYY-MM-DDTHH:MM]");
    println!("  edit <n> [--text <text>] [--priority <p>] [--due <date>|none] [--remind <when>|none]");
    println!("  done <n>           toggle completion");
    println!("  rm <n>             delete");
    println!("  list               redraw the list");
    println!("  filter all|pending|completed");
    println!("  sort created|priority|due|alpha");
    println!("  clear              delete all tasks");
    println!("  export [dir]       write a backup snapshot");
    println!("  import <file>      replace tasks from a snapshot");
    println!("  quit");
}

#[derive(Debug, PartialEq)]
enum Command {
    Add {
        text: String,
        priority: Priority,
        due: Option<NaiveDate>,
        reminder: Option<NaiveDateTime>,
    },
    List,
    Edit {
        index: usize,
        patch: TaskPatch,
    },
    Done {
        index: usize,
    },
    Remove {
        index: usize,
    },
    SetFilter(Filter),
    SetSort(SortKey),
    Clear,
    Export {
        dir: Option<PathBuf>,
    },
    Import {
        path: PathBuf,
    },
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. `Ok(None)` for a blank line; `Err` carries the
    /// message to show the user.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match verb {
            "add" => parse_add(rest)?,
            "edit" => parse_edit(rest)?,
            "done" | "toggle" => Self::Done {
                index: parse_index(rest)?,
            },
            "rm" | "delete" => Self::Remove {
                index: parse_index(rest)?,
            },
            "list" | "ls" => Self::List,
            "filter" => Self::SetFilter(
                Filter::from_keyword(rest)
                    .ok_or_else(|| format!("Unknown filter: {rest} (all, pending, completed)"))?,
            ),
            "sort" => Self::SetSort(
                SortKey::from_keyword(rest)
                    .ok_or_else(|| format!("Unknown sort: {rest} (created, priority, due, alpha)"))?,
            ),
            "clear" => Self::Clear,
            "export" => Self::Export {
                dir: (!rest.is_empty()).then(|| PathBuf::from(rest)),
            },
            "import" => {
                if rest.is_empty() {
                    return Err("Usage: import <file>".to_string());
                }
                Self::Import {
                    path: PathBuf::from(rest),
                }
            }
            "help" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("Unknown command: {other} (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn parse_index(arg: &str) -> Result<usize, String> {
    arg.parse()
        .map_err(|_| format!("Expected a task number, got `{arg}`"))
}

fn parse_add(rest: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let split = tokens
        .iter()
        .position(|t| t.starts_with("--"))
        .unwrap_or(tokens.len());
    let text = tokens[..split].join(" ");

    let mut priority = Priority::default();
    let mut due = None;
    let mut reminder = None;
    for (flag, values) in parse_flags(&tokens[split..])? {
        match flag {
            "--priority" => priority = parse_priority(&values)?,
            "--due" => due = Some(parse_date(&values)?),
            "--remind" => reminder = Some(parse_datetime(&values)?),
            other => return Err(format!("Unknown flag: {other}")),
        }
    }

    Ok(Command::Add {
        text,
        priority,
        due,
        reminder,
    })
}

fn parse_edit(rest: &str) -> Result<Command, String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    let Some((index_tok, flag_tokens)) = tokens.split_first() else {
        return Err("Usage: edit <n> [--text ...] [--priority ...] [--due ...] [--remind ...]"
            .to_string());
    };
    let index = parse_index(index_tok)?;

    let mut patch = TaskPatch::default();
    for (flag, values) in parse_flags(flag_tokens)? {
        match flag {
            "--text" => patch.text = Some(values.join(" ")),
            "--priority" => patch.priority = Some(parse_priority(&values)?),
            "--due" => {
                patch.due_date = Some(if values == ["none"] {
                    None
                } else {
                    Some(parse_date(&values)?)
                })
            }
            "--remind" => {
                patch.reminder = Some(if values == ["none"] {
                    None
                } else {
                    Some(parse_datetime(&values)?)
                })
            }
            other => return Err(format!("Unknown flag: {other}")),
        }
    }
    if patch.is_empty() {
        return Err("Nothing to change; pass at least one flag.".to_string());
    }

    Ok(Command::Edit { index, patch })
}

/// Split `--flag value value --flag2 ...` into (flag, values) pairs.
fn parse_flags<'a>(tokens: &[&'a str]) -> Result<Vec<(&'a str, Vec<&'a str>)>, String> {
    let mut flags = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let flag = tokens[i];
        if !flag.starts_with("--") {
            return Err(format!("Unexpected argument: {flag}"));
        }
        i += 1;
        let mut values = Vec::new();
        while i < tokens.len() && !tokens[i].starts_with("--") {
            values.push(tokens[i]);
            i += 1;
        }
        flags.push((flag, values));
    }
    Ok(flags)
}

fn parse_priority(values: &[&str]) -> Result<Priority, String> {
    match values {
        [value] => Priority::from_keyword(value)
            .ok_or_else(|| format!("Unknown priority: {value} (low, medium, high)")),
        _ => Err("Expected one priority value".to_string()),
    }
}

fn parse_date(values: &[&str]) -> Result<NaiveDate, String> {
    match values {
        [value] => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| format!("Expected a date like 2026-08-31, got `{value}`")),
        _ => Err("Expected one date value".to_string()),
    }
}

fn parse_datetime(values: &[&str]) -> Result<NaiveDateTime, String> {
    // Accept the single-token form and a date plus time pair.
    let joined = values.join("T");
    NaiveDateTime::parse_from_str(&joined, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(&joined, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| format!("Expected a time like 2026-08-31T09:00, got `{}`", values.join(" ")))
}
