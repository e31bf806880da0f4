//! # parley
//!
//! Line-oriented terminal front end for the Parley chat client.
//!
//! Lines starting with `/` are commands (see `/help`); anything else is sent
//! as a message to the open room.  Client events are printed as they arrive,
//! so assistant replies show up on their own after the response delay.

use std::path::Path;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use parley_client::{Client, ClientConfig, ClientEvent, LoginStep, NoticeLevel};
use parley_shared::constants::APP_NAME;
use parley_shared::{RoomId, Sender};

const HELP: &str = "\
Commands:
  /login <dial> <phone>    request a code, e.g. /login +91 9876543210
  /otp <code>              enter the 6-digit code
  /back                    back to phone entry
  /logout                  sign out (rooms are kept)
  /new <title>             create and open a room
  /rooms [query]           list rooms, optionally filtered by title
  /open <n>                open room n from the last listing
  /delete <n>              delete room n from the last listing
  /more                    load older messages in the open room
  /image <path> [caption]  send an image
  /countries               list dial codes
  /quit                    exit
Anything else is sent as a message.";

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Login { dial: &'a str, phone: &'a str },
    Otp(&'a str),
    Back,
    Logout,
    New(&'a str),
    Rooms(&'a str),
    Open(usize),
    Delete(usize),
    More,
    Image { path: &'a str, caption: &'a str },
    Countries,
    Help,
    Quit,
    Say(&'a str),
}

fn parse(line: &str) -> Result<Command<'_>, String> {
    let line = line.trim();
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Say(line));
    };
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };

    let index = |args: &str| -> Result<usize, String> {
        match args.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(format!("/{name} needs a room number from /rooms")),
        }
    };

    match name {
        "login" => match args.split_once(char::is_whitespace) {
            Some((dial, phone)) => Ok(Command::Login {
                dial,
                phone: phone.trim(),
            }),
            None => Err("usage: /login <dial> <phone>".into()),
        },
        "otp" => Ok(Command::Otp(args)),
        "back" => Ok(Command::Back),
        "logout" => Ok(Command::Logout),
        "new" => Ok(Command::New(args)),
        "rooms" => Ok(Command::Rooms(args)),
        "open" => index(args).map(Command::Open),
        "delete" => index(args).map(Command::Delete),
        "more" => Ok(Command::More),
        "image" => {
            if args.is_empty() {
                return Err("usage: /image <path> [caption]".into());
            }
            let (path, caption) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            Ok(Command::Image {
                path,
                caption: caption.trim(),
            })
        }
        "countries" => Ok(Command::Countries),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command /{other}, try /help")),
    }
}

fn render(event: &ClientEvent) -> Option<String> {
    match event {
        ClientEvent::MessageAdded { room_id, message } if message.sender == Sender::Assistant => {
            Some(format!(
                "[{}] {}: {}",
                room_id.short(),
                message.sender.label(),
                message.content
            ))
        }
        ClientEvent::RespondingChanged {
            room_id,
            responding: true,
        } => Some(format!("[{}] assistant is typing...", room_id.short())),
        ClientEvent::HistoryLoaded {
            room_id,
            count,
            has_more,
        } => Some(format!(
            "[{}] loaded {count} older messages{}",
            room_id.short(),
            if *has_more { "" } else { " (start of history)" }
        )),
        ClientEvent::Notice(notice) => {
            let tag = match notice.level {
                NoticeLevel::Info => "info",
                NoticeLevel::Success => "ok",
                NoticeLevel::Warning => "warn",
                NoticeLevel::Error => "error",
            };
            Some(format!("({tag}) {}: {}", notice.title, notice.message))
        }
        _ => None,
    }
}

struct Shell {
    client: Client,
    /// Room ids in the order of the last `/rooms` listing.
    listing: Vec<RoomId>,
}

impl Shell {
    fn new(client: Client) -> Self {
        Self {
            client,
            listing: Vec::new(),
        }
    }

    fn room_at(&self, n: usize) -> Option<RoomId> {
        self.listing.get(n - 1).cloned()
    }

    /// Run one command. Returns `false` when the shell should exit.
    async fn handle(&mut self, line: &str) -> anyhow::Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }
        let command = match parse(line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{usage}");
                return Ok(true);
            }
        };

        let result = match command {
            Command::Login { dial, phone } => self.client.request_otp(dial, phone).await,
            Command::Otp(code) => self.client.verify_otp(code).await.map(|_| ()),
            Command::Back => self.client.back_to_phone().map(|_| ()),
            Command::Logout => self.client.logout().map(|_| ()),
            Command::New(title) => self.client.create_room(title).map(|_| ()),
            Command::Rooms(query) => self.list_rooms(query),
            Command::Open(n) => match self.room_at(n) {
                Some(id) => self.client.open_room(&id).and_then(|_| self.show_active()),
                None => {
                    println!("no room {n}, run /rooms first");
                    Ok(())
                }
            },
            Command::Delete(n) => match self.room_at(n) {
                Some(id) => self.client.delete_room(&id).map(|_| ()),
                None => {
                    println!("no room {n}, run /rooms first");
                    Ok(())
                }
            },
            Command::More => self.client.load_older_messages().await.map(|_| ()),
            Command::Image { path, caption } => {
                self.client.send_image(Path::new(path), caption).await.map(|_| ())
            }
            Command::Countries => {
                for option in self.client.countries().await {
                    println!("  {}", option.label());
                }
                Ok(())
            }
            Command::Help => {
                println!("{HELP}");
                Ok(())
            }
            Command::Quit => return Ok(false),
            Command::Say(text) => self.client.send_message(text, None).map(|_| ()),
        };

        // Validation failures were already reported as notices.
        if let Err(e) = result {
            if !e.is_validation() {
                println!("{e}");
            }
        }
        Ok(true)
    }

    fn list_rooms(&mut self, query: &str) -> parley_client::Result<()> {
        let rooms = self.client.list_rooms(query)?;
        if rooms.is_empty() {
            println!("no rooms, create one with /new <title>");
        }
        for (i, room) in rooms.iter().enumerate() {
            let marker = if room.is_active { '*' } else { ' ' };
            let typing = if room.is_responding { " (typing)" } else { "" };
            println!(
                "{marker}{:>3}. {} [{} messages]{typing}",
                i + 1,
                room.title,
                room.message_count
            );
            if let Some(last) = &room.last_message {
                println!("       {last}");
            }
        }
        self.listing = rooms.into_iter().map(|r| r.id).collect();
        Ok(())
    }

    fn show_active(&self) -> parley_client::Result<()> {
        let Some(room) = self.client.active_room()? else {
            return Ok(());
        };
        println!("== {} ==", room.title);
        for message in &room.messages {
            let image = if message.image.is_some() { " [image]" } else { "" };
            println!(
                "{} {}: {}{image}",
                message.timestamp.format("%H:%M"),
                message.sender.label(),
                message.content
            );
        }
        Ok(())
    }

    fn prompt(&self) {
        match self.client.login_step() {
            Ok(LoginStep::EnterPhone) => println!("Sign in with /login <dial> <phone>"),
            Ok(LoginStep::OtpSent { .. }) => println!("Enter the code with /otp <code>"),
            Ok(LoginStep::Authenticated) => {
                if let Ok(Some(user)) = self.client.current_user() {
                    println!("Signed in as {}", user.display_number());
                }
            }
            Err(e) => warn!(error = %e, "could not read login state"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parley_client::init_tracing();

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let client = Client::open(config).context("failed to open client storage")?;
    let mut events = client.subscribe();
    let mut shell = Shell::new(client);

    println!("{APP_NAME} v{}, /help for commands", env!("CARGO_PKG_VERSION"));
    shell.prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if !shell.handle(&line).await? {
                    break;
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(text) = render(&event) {
                        println!("{text}");
                    }
                    if matches!(event, ClientEvent::LoginStepChanged { .. }) {
                        shell.prompt();
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    info!("Shutting down");
    Ok(())
}
