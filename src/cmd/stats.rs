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

use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;

use crate::cmd::Context;
use crate::cmd::print_json;
use crate::error::Fallible;
use crate::stats::Stats;
use crate::types::timestamp::Timestamp;

#[derive(ValueEnum, Clone)]
pub enum StatsFormat {
    /// JSON output.
    Json,
    /// Plain text output.
    Text,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Json => write!(f, "json"),
            StatsFormat::Text => write!(f, "text"),
        }
    }
}

pub fn print_stats(ctx: &Context, format: StatsFormat, now: Timestamp) -> Fallible<()> {
    let stats = ctx.service.stats(&ctx.user, now)?;
    match format {
        StatsFormat::Json => print_json(&stats),
        StatsFormat::Text => {
            print!("{}", render_text(&stats));
            Ok(())
        }
    }
}

fn render_text(stats: &Stats) -> String {
    let rows = [
        ("Items", stats.total.to_string()),
        (
            "Due today",
            format!(
                "{} ({} flashcards, {} questions)",
                stats.due_today, stats.flashcards_due, stats.questions_due
            ),
        ),
        ("New", stats.new_count.to_string()),
        ("Learning", stats.learning_count.to_string()),
        ("Mature", stats.mature_count.to_string()),
        (
            "Retention",
            format!("{:.1}%", stats.avg_retention_rate * 100.0),
        ),
        ("Mastery", format!("{:.1}%", stats.avg_mastery * 100.0)),
        ("Reviews today", stats.reviews_today.to_string()),
        ("Reviews this week", stats.reviews_this_week.to_string()),
        (
            "Streak",
            format!(
                "{} days (longest {})",
                stats.current_streak, stats.longest_streak
            ),
        ),
    ];
    let mut out = String::new();
    for (label, value) in rows {
        out.push_str(&format!("{label:<18} {value}\n"));
    }
    if !stats.questions_by_domain.is_empty() {
        out.push_str(&format!(
            "{:<18} {}\n",
            "Mastered questions", stats.mastered_questions
        ));
    }
    for (domain, d) in &stats.questions_by_domain {
        out.push_str(&format!(
            "  {domain:<16} {} questions, {} due, {:.1}% mastery\n",
            d.total,
            d.due,
            d.avg_mastery * 100.0
        ));
    }
    out
}
