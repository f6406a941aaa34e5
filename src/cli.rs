// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::cmd::Context;
use crate::cmd::add::AddCard;
use crate::cmd::add::add_card;
use crate::cmd::add::add_question;
use crate::cmd::check::check_config;
use crate::cmd::queue::QueueKind;
use crate::cmd::queue::print_queue;
use crate::cmd::queue::print_session;
use crate::cmd::queue::print_weak;
use crate::cmd::review::Outcome;
use crate::cmd::review::answer;
use crate::cmd::review::review;
use crate::cmd::sessions::finish_session;
use crate::cmd::sessions::print_sessions;
use crate::cmd::sessions::start_session;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;
use crate::types::card_kind::CardKind;
use crate::types::item_id::ItemId;
use crate::types::rating::Rating;
use crate::types::session_record::SessionId;
use crate::types::timestamp::Timestamp;
use crate::types::user::UserId;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the review database.
    #[arg(long, global = true, default_value = "certdrill.db")]
    db: PathBuf,
    /// Optional path to a TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Whose items to work with.
    #[arg(long, global = true, default_value = "default")]
    user: UserId,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a flashcard.
    AddCard {
        #[arg(long)]
        front: String,
        #[arg(long)]
        back: String,
        #[arg(long)]
        hint: Option<String>,
        #[arg(long)]
        explanation: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        /// May be given more than once.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// The study module the card belongs to.
        #[arg(long)]
        module: Option<String>,
        #[arg(long, default_value = "basic")]
        kind: CardKind,
    },
    /// Track a question that was answered wrong.
    AddQuestion {
        /// The question's id in the question bank.
        question_id: String,
        #[arg(long)]
        domain: Option<String>,
    },
    /// Rate a review of an item.
    Review {
        item: ItemId,
        /// again, hard, good, easy, or 1 to 4.
        rating: Rating,
        /// Seconds spent on the item.
        #[arg(long, default_value_t = 0)]
        time: u32,
    },
    /// Record an attempt at a tracked question.
    Answer {
        item: ItemId,
        #[arg(value_enum)]
        outcome: Outcome,
        #[arg(long, default_value_t = 0)]
        time: u32,
    },
    /// Print the due items, most urgent first.
    Queue {
        #[arg(long, value_enum, default_value = "mixed")]
        kind: QueueKind,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Plan a review session.
    Session {
        /// Defaults to the configured session size.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List tracked questions below a mastery threshold, weakest first.
    Weak {
        /// Fraction of correct attempts, 0 to 1.
        #[arg(long, default_value_t = 0.7)]
        threshold: f64,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Open a review session record.
    StartSession {
        #[arg(long, value_enum, default_value = "mixed")]
        kind: QueueKind,
        /// Planned length of the session.
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Close a session, counting the reviews made since it started.
    FinishSession { id: SessionId },
    /// List review sessions, most recent first.
    Sessions {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print progress statistics.
    Stats {
        #[arg(long, value_enum, default_value = "json")]
        format: StatsFormat,
    },
    /// Validate the configuration file.
    CheckConfig,
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let now = Timestamp::now();
    if let Command::CheckConfig = cli.command {
        return check_config(cli.config.as_deref());
    }
    let ctx = Context::open(&cli.db, cli.config.as_deref(), cli.user)?;
    match cli.command {
        Command::AddCard {
            front,
            back,
            hint,
            explanation,
            image_url,
            tags,
            module,
            kind,
        } => add_card(
            &ctx,
            AddCard {
                front,
                back,
                hint,
                explanation,
                image_url,
                tags,
                module,
                kind,
            },
            now,
        ),
        Command::AddQuestion {
            question_id,
            domain,
        } => add_question(&ctx, question_id, domain, now),
        Command::Review { item, rating, time } => review(&ctx, item, rating, time, now),
        Command::Answer {
            item,
            outcome,
            time,
        } => answer(&ctx, item, outcome, time, now),
        Command::Queue { kind, limit } => print_queue(&ctx, kind, limit, now),
        Command::Session { limit } => print_session(&ctx, limit, now),
        Command::Weak { threshold, limit } => print_weak(&ctx, threshold, limit),
        Command::StartSession { kind, minutes } => start_session(&ctx, kind, minutes, now),
        Command::FinishSession { id } => finish_session(&ctx, id, now),
        Command::Sessions { limit } => print_sessions(&ctx, limit),
        Command::Stats { format } => print_stats(&ctx, format, now),
        Command::CheckConfig => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_defaults() {
        let cli = Cli::parse_from(["certdrill", "stats"]);
        assert_eq!(cli.db, PathBuf::from("certdrill.db"));
        assert_eq!(cli.user.as_str(), "default");
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_review_args() {
        let id = ItemId::question("q-3");
        let text = id.to_string();
        let cli = Cli::parse_from(["certdrill", "--user", "bob", "review", text.as_str(), "3"]);
        assert_eq!(cli.user.as_str(), "bob");
        match cli.command {
            Command::Review { item, rating, time } => {
                assert_eq!(item, id);
                assert_eq!(rating, Rating::Good);
                assert_eq!(time, 0);
            }
            _ => panic!("Expected review"),
        }
    }

    #[test]
    fn test_bad_rating_rejected() {
        let text = ItemId::question("q-3").to_string();
        assert!(Cli::try_parse_from(["certdrill", "review", text.as_str(), "perfect"]).is_err());
    }

    #[test]
    fn test_session_args() {
        let cli = Cli::parse_from(["certdrill", "start-session", "--kind", "question"]);
        match cli.command {
            Command::StartSession { kind, minutes } => {
                assert_eq!(kind, QueueKind::Question);
                assert!(minutes.is_none());
            }
            _ => panic!("Expected start-session"),
        }
        let cli = Cli::parse_from(["certdrill", "finish-session", "7"]);
        match cli.command {
            Command::FinishSession { id } => assert_eq!(id, SessionId::new(7)),
            _ => panic!("Expected finish-session"),
        }
        assert!(Cli::try_parse_from(["certdrill", "finish-session", "seven"]).is_err());
    }

    #[test]
    fn test_weak_defaults() {
        let cli = Cli::parse_from(["certdrill", "weak"]);
        match cli.command {
            Command::Weak { threshold, limit } => {
                assert_eq!(threshold, 0.7);
                assert_eq!(limit, 20);
            }
            _ => panic!("Expected weak"),
        }
    }

    #[test]
    fn test_empty_user_rejected() {
        assert!(Cli::try_parse_from(["certdrill", "--user", "", "stats"]).is_err());
    }
}
