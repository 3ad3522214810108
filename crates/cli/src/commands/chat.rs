//! `parley chat`: Interactive tutoring or single-message mode.

use parley_agent::{AgentMode, TutorSession};
use parley_config::AppConfig;
use std::error::Error;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{build_session, load_config};
use super::models::print_model_info;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub mode: Option<String>,
    pub tier: Option<String>,
    pub level: Option<String>,
}

impl Overrides {
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), Box<dyn Error>> {
        if let Some(mode) = &self.mode {
            config.tutor.mode = mode.parse()?;
        }
        if let Some(tier) = &self.tier {
            config.default_tier = tier.parse()?;
        }
        if let Some(level) = &self.level {
            config.tutor.level = level.parse()?;
        }
        Ok(())
    }
}

/// One line of interactive input.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Quit,
    Info,
    Analyze(&'a str),
    Level(&'a str),
    Model(&'a str),
    Say(&'a str),
}

fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| line[prefix.len()..].trim())
}

/// Classify a line. Anything that is not a reserved command is said to the tutor.
pub fn parse_command(line: &str) -> ReplCommand<'_> {
    let line = line.trim();
    if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        return ReplCommand::Quit;
    }
    if line.eq_ignore_ascii_case("info") {
        return ReplCommand::Info;
    }
    if let Some(text) = strip_prefix_ci(line, "analyze:") {
        return ReplCommand::Analyze(text);
    }
    if let Some(level) = strip_prefix_ci(line, "level:") {
        return ReplCommand::Level(level);
    }
    if let Some(tier) = strip_prefix_ci(line, "model:") {
        return ReplCommand::Model(tier);
    }
    ReplCommand::Say(line)
}

fn print_reply(prefix: &str, reply: &str) {
    println!();
    for line in reply.lines() {
        println!("  {prefix} > {line}");
    }
    println!();
}

/// Handle one line. Returns `false` when the learner wants to leave.
pub async fn handle_line(session: &mut TutorSession, line: &str) -> bool {
    match parse_command(line) {
        ReplCommand::Quit => return false,
        ReplCommand::Info => print_model_info(&session.model_info()),
        ReplCommand::Analyze(text) => {
            eprint!("  ...");
            let analysis = session.analyze_text(text).await;
            eprint!("\r     \r");
            print_reply("Analysis", &analysis);
        }
        ReplCommand::Level(level) => match session.set_level(level) {
            Ok(level) => println!("  {}", session.locale().level_updated(level.as_str())),
            Err(e) => eprintln!("  [Error] {e}"),
        },
        ReplCommand::Model(tier) => match session.switch_model(tier) {
            Ok(selection) => println!(
                "  {}",
                session
                    .locale()
                    .model_switched(selection.tier.as_str(), &selection.model_name)
            ),
            Err(e) => eprintln!("  [Error] {e}"),
        },
        ReplCommand::Say(message) => {
            eprint!("  ...");
            let reply = session.converse(message).await;
            eprint!("\r     \r");
            print_reply("Tutor", &reply);
        }
    }
    true
}

/// Sent on the learner's behalf so the tutor speaks first.
pub const OPENING_LINE: &str = "Hello! Let's start our English conversation.";

/// Let the tutor open an interactive session.
pub async fn open_conversation(session: &mut TutorSession) -> String {
    session.converse(OPENING_LINE).await
}

fn print_banner(session: &TutorSession) {
    let profile = session.profile();
    let mode = match session.mode() {
        AgentMode::Direct => "direct",
        AgentMode::ToolAugmented => "agent",
    };

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Parley — Your English Tutor            ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {} ({})", session.selection().model_name, session.selection().tier);
    println!("  Level:     {}", profile.level);
    println!("  Mode:      {mode}");
    println!("  Tools:     {}", session.tools().names().join(", "));
    println!();
    println!("  Commands:");
    println!("    analyze: <text>   Get feedback on a piece of writing");
    println!("    level: <level>    beginner, intermediate or advanced");
    println!("    model: <tier>     fast, balanced, smart or coding");
    println!("    info              Show available models");
    println!("    quit              Leave the session");
    println!();
}

pub async fn run(message: Option<String>, overrides: Overrides) -> Result<(), Box<dyn Error>> {
    let mut config = load_config()?;
    overrides.apply(&mut config)?;
    let mut session = build_session(&config).await?;

    if let Some(message) = message {
        eprint!("  Thinking...");
        let reply = session.converse(&message).await;
        eprint!("\r              \r");
        println!("{reply}");
        return Ok(());
    }

    print_banner(&session);

    eprint!("  ...");
    let greeting = open_conversation(&mut session).await;
    eprint!("\r     \r");
    print_reply("Tutor", &greeting);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        if !handle_line(&mut session, &line).await {
            break;
        }
    }

    println!();
    println!("  Goodbye! Keep practicing!");
    println!();
    Ok(())
}
