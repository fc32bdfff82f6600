//! Terminal front-end
//!
//! Line commands in, live display frames out. This is the view host: it
//! decides which of the three views is visible and renders them, but all
//! timer behavior lives in the engine and the per-timer loop.

use std::io::Write as _;
use std::time::Duration;

use anyhow::Result;
use futures::stream::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use tokio::io::AsyncBufReadExt;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::client::{SessionClient, SessionContext, TimerContext};
use crate::config::Config;
use crate::engine::{format_time, time_from_fields};
use crate::state::Direction;
use crate::store::{MemoryStore, StoreError, TimerEntry};
use crate::tasks::{TimerCommand, TimerFrame};
use crate::view::{View, ViewState};

enum Outcome {
    Continue,
    /// The selected timer or joined session changed; resubscribe
    SelectionChanged,
    Quit,
}

/// Run the interactive client until quit, EOF, or a shutdown signal
pub async fn run(config: &Config, store: MemoryStore) -> Result<()> {
    let mut app = App::new(config, store)?;
    app.startup_join(config);
    app.print_help();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    let mut frames = app.frame_watch();
    let mut timers = app.list_watch();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match app.handle_line(line.trim()).await? {
                    Outcome::Continue => {}
                    Outcome::SelectionChanged => {
                        frames = app.frame_watch();
                        timers = app.list_watch();
                    }
                    Outcome::Quit => break,
                }
            }

            signal = signals.next() => {
                if let Some(signal) = signal {
                    info!("Received signal: {}", signal);
                }
                break;
            }

            frame = next_frame(frames.as_mut()), if frames.is_some() => {
                match frame {
                    Ok(Some(frame)) => render_frame(&frame),
                    Ok(None) => {
                        println!();
                        println!("This timer was deleted.");
                        app.back_to_list();
                        frames = None;
                    }
                    Err(_) => frames = None,
                }
            }

            list = next_list(timers.as_mut()), if timers.is_some() => {
                match list {
                    Ok(entries) => {
                        if app.views.current() == View::List {
                            print_timer_list(&entries);
                        }
                    }
                    Err(_) => timers = None,
                }
            }
        }
    }

    info!("Client shutting down");
    Ok(())
}

async fn next_frame(
    frames: Option<&mut watch::Receiver<Option<TimerFrame>>>,
) -> Result<Option<TimerFrame>, watch::error::RecvError> {
    let rx = frames.expect("branch guarded by is_some");
    rx.changed().await?;
    let frame = rx.borrow_and_update().clone();
    Ok(frame)
}

async fn next_list(
    timers: Option<&mut watch::Receiver<Vec<TimerEntry>>>,
) -> Result<Vec<TimerEntry>, watch::error::RecvError> {
    let rx = timers.expect("branch guarded by is_some");
    rx.changed().await?;
    let entries = rx.borrow_and_update().clone();
    Ok(entries)
}

struct App {
    client: SessionClient,
    views: ViewState,
    tick_interval: Duration,
    session: Option<SessionContext>,
    timer: Option<TimerContext>,
}

impl App {
    fn new(config: &Config, store: MemoryStore) -> Result<Self> {
        let client = SessionClient::new(store, &config.prefs)?;
        Ok(Self {
            client,
            views: ViewState::new(),
            tick_interval: config.tick_interval(),
            session: None,
            timer: None,
        })
    }

    /// Re-join the session given on the command line or remembered from the
    /// previous run
    fn startup_join(&mut self, config: &Config) {
        let candidate = config
            .session
            .clone()
            .or_else(|| self.client.remembered_session());
        let Some(session_id) = candidate else { return };
        match self.client.join_session(&session_id.to_uppercase()) {
            Ok(context) => self.enter_session(context),
            Err(StoreError::SessionNotFound(_)) => {
                println!("Session {} not found.", session_id)
            }
            Err(e) => warn!("Failed to join session {}: {}", session_id, e),
        }
    }

    fn frame_watch(&self) -> Option<watch::Receiver<Option<TimerFrame>>> {
        self.timer.as_ref().map(TimerContext::frames)
    }

    fn list_watch(&self) -> Option<watch::Receiver<Vec<TimerEntry>>> {
        self.session.as_ref().map(SessionContext::watch_timers)
    }

    async fn handle_line(&mut self, line: &str) -> Result<Outcome> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(Outcome::Continue);
        };
        let args: Vec<&str> = words.collect();

        match command {
            "quit" | "q" => return Ok(Outcome::Quit),
            "help" | "?" => {
                self.print_help();
                return Ok(Outcome::Continue);
            }
            _ => {}
        }

        match self.views.current() {
            View::Session => Ok(self.handle_session_command(command, &args)),
            View::List => Ok(self.handle_list_command(command, &args)),
            View::Timer => self.handle_timer_command(command, &args).await,
        }
    }

    fn handle_session_command(&mut self, command: &str, args: &[&str]) -> Outcome {
        match command {
            "new" => match self.client.create_session() {
                Ok(context) => {
                    self.enter_session(context);
                    Outcome::SelectionChanged
                }
                Err(e) => {
                    println!("Failed to create session: {}", e);
                    Outcome::Continue
                }
            },
            "join" => {
                let Some(session_id) = args.first() else {
                    println!("Usage: join <SESSION-ID>");
                    return Outcome::Continue;
                };
                match self.client.join_session(&session_id.to_uppercase()) {
                    Ok(context) => {
                        self.enter_session(context);
                        Outcome::SelectionChanged
                    }
                    Err(StoreError::SessionNotFound(_)) => {
                        println!("Session not found.");
                        Outcome::Continue
                    }
                    Err(e) => {
                        println!("Failed to join session: {}", e);
                        Outcome::Continue
                    }
                }
            }
            _ => {
                println!("Unknown command. Try: new, join <ID>, quit");
                Outcome::Continue
            }
        }
    }

    fn handle_list_command(&mut self, command: &str, args: &[&str]) -> Outcome {
        match command {
            "add" => {
                let Some(session) = &self.session else {
                    return Outcome::Continue;
                };
                let name = args.join(" ");
                if let Err(e) = self.client.create_timer(session, &name) {
                    println!("Failed to create timer: {}", e);
                }
                Outcome::Continue
            }
            "ls" => {
                if let Some(session) = &self.session {
                    print_timer_list(&session.timers());
                }
                Outcome::Continue
            }
            "open" => {
                let Some(arg) = args.first() else {
                    println!("Usage: open <number|id>");
                    return Outcome::Continue;
                };
                self.open_timer(arg)
            }
            "leave" => {
                self.close_timer();
                if let Some(session) = self.session.take() {
                    self.client.leave_session(session);
                }
                self.views.show(View::Session);
                println!("Left the session.");
                Outcome::SelectionChanged
            }
            _ => {
                println!("Unknown command. Try: add <name>, open <number>, ls, leave, quit");
                Outcome::Continue
            }
        }
    }

    async fn handle_timer_command(&mut self, command: &str, args: &[&str]) -> Result<Outcome> {
        match command {
            "back" | "b" => {
                self.back_to_list();
                return Ok(Outcome::SelectionChanged);
            }
            "del" => {
                if let Some(timer) = &self.timer {
                    timer.send(TimerCommand::Delete).await;
                }
                // The loop reports the deletion back as an absent frame.
                return Ok(Outcome::Continue);
            }
            _ => {}
        }

        let Some(timer) = &self.timer else {
            return Ok(Outcome::Continue);
        };
        match command {
            "go" | "g" => {
                timer.send(TimerCommand::StartPause).await;
            }
            "lap" | "l" => {
                timer.send(TimerCommand::LapOrReset).await;
            }
            "rev" | "r" => {
                timer.send(TimerCommand::Reverse).await;
            }
            "speed" | "x" => match args.first().and_then(|a| a.parse::<f64>().ok()) {
                Some(speed) if speed > 0.0 => {
                    timer.send(TimerCommand::SetSpeed(speed)).await;
                }
                _ => println!("Usage: speed <positive multiplier>"),
            },
            "set" => match parse_time_args(args) {
                Some(seconds) => {
                    timer.send(TimerCommand::SetTime(seconds)).await;
                }
                None => println!("Usage: set [hours] [minutes] seconds"),
            },
            "alarm" => match parse_time_args(args) {
                Some(seconds) => {
                    timer.send(TimerCommand::SetAlarm(seconds)).await;
                }
                None => println!("Usage: alarm [hours] [minutes] seconds"),
            },
            "noalarm" => {
                timer.send(TimerCommand::ClearAlarm).await;
            }
            "laps" => {
                if let Some(frame) = timer.frames().borrow().clone() {
                    if frame.laps.is_empty() {
                        println!("No laps.");
                    }
                    // Newest first, like the original list
                    for lap in frame.laps.iter().rev() {
                        println!("  {}  {}", lap.text, lap.time);
                    }
                }
            }
            _ => {
                println!(
                    "Unknown command. Try: go, lap, rev, speed <n>, set h m s, alarm h m s, noalarm, laps, del, back, quit"
                );
            }
        }
        Ok(Outcome::Continue)
    }

    fn enter_session(&mut self, context: SessionContext) {
        println!("Session {}  (share this id to sync)", context.session_id());
        print_timer_list(&context.timers());
        self.session = Some(context);
        self.views.show(View::List);
    }

    fn open_timer(&mut self, arg: &str) -> Outcome {
        let entries = match &self.session {
            Some(session) => session.timers(),
            None => return Outcome::Continue,
        };
        let timer_id = match arg.parse::<usize>() {
            Ok(n) if n >= 1 && n <= entries.len() => entries[n - 1].id.clone(),
            _ => arg.to_string(),
        };

        // The previous selection must be disposed before the new
        // subscription and tick loop start.
        self.close_timer();
        let Some(session) = &self.session else {
            return Outcome::Continue;
        };
        match self.client.select_timer(session, &timer_id, self.tick_interval) {
            Ok(context) => {
                self.timer = Some(context);
                self.views.show(View::Timer);
                Outcome::SelectionChanged
            }
            Err(e) => {
                println!("Could not open timer: {}", e);
                Outcome::Continue
            }
        }
    }

    fn close_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.close();
        }
    }

    fn back_to_list(&mut self) {
        self.close_timer();
        if let Some(session) = &self.session {
            self.views.show(View::List);
            print_timer_list(&session.timers());
        } else {
            self.views.show(View::Session);
        }
    }

    fn print_help(&self) {
        match self.views.current() {
            View::Session => {
                println!("Commands: new (create session), join <ID>, quit");
            }
            View::List => {
                println!("Commands: add <name>, open <number|id>, ls, leave, quit");
            }
            View::Timer => {
                println!(
                    "Commands: go (start/pause), lap (lap/reset), rev, speed <n>, set [h] [m] s, alarm [h] [m] s, noalarm, laps, del, back, quit"
                );
            }
        }
    }
}

/// Parse 1-3 whitespace-separated fields as seconds / minutes+seconds /
/// hours+minutes+seconds, clamped the way the original input fields were
fn parse_time_args(args: &[&str]) -> Option<f64> {
    let mut fields = [0u32; 3];
    if args.is_empty() || args.len() > 3 {
        return None;
    }
    let offset = 3 - args.len();
    for (slot, arg) in fields[offset..].iter_mut().zip(args) {
        *slot = arg.parse().ok()?;
    }
    let hours = fields[0].min(99);
    let minutes = fields[1].min(59);
    let seconds = fields[2].min(59);
    Some(time_from_fields(hours, minutes, seconds))
}

fn print_timer_list(entries: &[TimerEntry]) {
    if entries.is_empty() {
        println!("No timers yet. Create one with: add <name>");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!("  {}. {}", index + 1, entry.name);
    }
}

fn render_frame(frame: &TimerFrame) {
    let status = if frame.running {
        let direction = match frame.direction {
            Direction::Up => "Counting Up",
            Direction::Down => "Counting Down",
        };
        format!("{} @ {}x", direction, frame.speed)
    } else {
        "Paused".to_string()
    };
    let alarm = if frame.alarm_active {
        "  << ALARM >>".to_string()
    } else if let Some(threshold) = frame.alarm_time {
        format!("  [alarm {}]", format_time(threshold))
    } else {
        String::new()
    };
    print!("\r  {}  {}  {}{}          ", frame.name, frame.display, status, alarm);
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_args_accept_one_to_three_fields() {
        assert_eq!(parse_time_args(&["5"]), Some(5.0));
        assert_eq!(parse_time_args(&["2", "30"]), Some(150.0));
        assert_eq!(parse_time_args(&["1", "2", "3"]), Some(3_723.0));
        assert_eq!(parse_time_args(&[]), None);
        assert_eq!(parse_time_args(&["1", "2", "3", "4"]), None);
        assert_eq!(parse_time_args(&["abc"]), None);
    }

    #[test]
    fn time_args_clamp_like_the_input_fields() {
        // 99h / 59m / 59s ceilings
        assert_eq!(parse_time_args(&["100", "61", "75"]), Some(99.0 * 3600.0 + 59.0 * 60.0 + 59.0));
    }
}
