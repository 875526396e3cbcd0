//! Terminal GeoGenie: plays one pass of a level on stdin/stdout.
//!
//! Usage: `geogenie [level]` (default `solar-system`). Type an answer and
//! press enter; an empty line asks for help after the timeout window; `quit`
//! ends the game. Mastery is kept in `GEOGENIE_DATA_DIR`.

use std::io::{self, BufRead, Write};

use geogenie_scaffold::logging::init_tracing;
use geogenie_scaffold::{
    Announcer, CliConfig, FileStore, GameMode, GeoTutor, HintResolver, KeyValueStore,
    KnowledgeBase, MemoryStore, ScaffoldingEngine, VisualCommand,
};

struct ConsoleAnnouncer;

impl Announcer for ConsoleAnnouncer {
    fn announce(&mut self, text: &str) {
        println!("GeoGenie: {text}");
    }
}

enum TurnEnd {
    Found,
    Quit,
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn main() {
    let config = CliConfig::from_env();
    let _log_guard = init_tracing(&config.log_level);

    let level = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "solar-system".to_string());

    let knowledge = match KnowledgeBase::bundled() {
        Ok(knowledge) => knowledge,
        Err(err) => {
            tracing::error!(error = %err, "bundled knowledge base is invalid");
            std::process::exit(1);
        }
    };

    let items: Vec<String> = knowledge.items(&level).to_vec();
    if items.is_empty() {
        tracing::error!(level = %level, available = ?knowledge.level_names(), "unknown level");
        std::process::exit(2);
    }

    let store: Box<dyn KeyValueStore> = match FileStore::open(&config.data_dir) {
        Ok(store) => Box::new(store),
        Err(err) => {
            tracing::warn!(
                error = %err,
                dir = %config.data_dir.display(),
                "cannot open data dir, progress will not be saved"
            );
            Box::new(MemoryStore::new())
        }
    };

    let resolver = config
        .hint_seed
        .map(HintResolver::with_seed)
        .unwrap_or_default();
    let engine = ScaffoldingEngine::new(store, config.scaffolding.clone());
    let mut tutor = GeoTutor::new(engine, knowledge, resolver, ConsoleAnnouncer);

    // Weakest items first, then the rest in level order
    let mut order = tutor
        .engine()
        .entities_needing_practice(&level, items.iter().map(String::as_str));
    let rest: Vec<String> = items
        .iter()
        .filter(|i| !order.contains(*i))
        .cloned()
        .collect();
    order.extend(rest);

    tracing::info!(level = %level, items = order.len(), "starting game");
    tutor.reset_session();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut completed = true;

    'game: for target in &order {
        tutor.start_turn(target, &level);
        tutor.announce_target(target, &level, GameMode::Quiz, None);

        let end = loop {
            prompt();
            let Some(Ok(line)) = lines.next() else {
                break TurnEnd::Quit;
            };
            let answer = line.trim();

            if answer.eq_ignore_ascii_case("quit") {
                break TurnEnd::Quit;
            }

            if answer.is_empty() {
                match tutor.handle_timeout(target, &level) {
                    Some(feedback) => {
                        if let Some(VisualCommand::Highlight { target }) = feedback.visual_command {
                            println!("  * {target} is glowing *");
                        }
                    }
                    None => println!("  (take your time)"),
                }
                continue;
            }

            if answer.eq_ignore_ascii_case(target) {
                let feedback = tutor.handle_correct(target, &level, GameMode::Quiz);
                if feedback.was_quick == Some(true) {
                    println!("  (quick!)");
                }
                break TurnEnd::Found;
            }

            let clicked = items
                .iter()
                .find(|i| i.eq_ignore_ascii_case(answer))
                .map(String::as_str)
                .unwrap_or(answer);
            let feedback = tutor.handle_incorrect(target, Some(clicked), &level);
            if let Some(VisualCommand::Highlight { target }) = feedback.visual_command {
                println!("  * {target} is glowing *");
            }
        };

        if let TurnEnd::Quit = end {
            completed = false;
            break 'game;
        }
    }

    if completed {
        tutor.announce_level_complete(&level);
    }

    let info = tutor.level_mastery_info(&level, items.iter().map(String::as_str));
    println!(
        "Mastered {}/{} in {level}{}",
        info.mastered_count,
        info.total_count,
        if info.is_fully_mastered { " - level mastered!" } else { "" }
    );
    if !info.needs_practice.is_empty() {
        println!("Keep practising: {}", info.needs_practice.join(", "));
    }
}
