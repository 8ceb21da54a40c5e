use std::fs;

use chrono::{DateTime, TimeZone, Utc};

use lingodrill::config::Config;
use lingodrill::session::module::ModuleKind;
use lingodrill::session::result::SessionRecord;
use lingodrill::store::schema::{
    EXPORT_VERSION, ExportData, HISTORY_LIMIT, ProfileData, SessionHistoryData,
};

const SCHEMA_VERSION: u32 = 1;

// ── Helpers ──────────────────────────────────────────────────────────────

/// Item counts of the bundled datasets, keyed by module id.
const MODULES: &[(&str, ModuleKind, usize)] = &[
    ("greetings-cards", ModuleKind::Flashcard, 5),
    ("colors-quiz", ModuleKind::Quiz, 4),
    ("ser-estar", ModuleKind::Completion, 4),
    ("word-order", ModuleKind::Sorting, 3),
    ("animals-pairs", ModuleKind::Matching, 5),
];

fn base_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap()
}

fn fixed_export_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
}

/// Monotonic timestamps: one practice day per `per_day` sessions, 5 minutes apart.
fn session_timestamp(index: usize, per_day: usize) -> DateTime<Utc> {
    let day = (index / per_day) as i64;
    let slot = (index % per_day) as i64;
    base_date() + chrono::Duration::days(day) + chrono::Duration::minutes(slot * 5)
}

/// Deterministic run: accuracy drifts upward with practice. Matching runs
/// always finish every pair; wrong picks only add to `incorrect`.
fn make_record(index: usize, per_day: usize, skill: f64) -> SessionRecord {
    let (module_id, mode, items) = MODULES[index % MODULES.len()];
    let ratio = (skill + index as f64 * 0.002).min(1.0);
    let (correct, incorrect) = match mode {
        ModuleKind::Matching => (items as u32, ((1.0 - ratio) * 4.0).round() as u32),
        _ => {
            let correct = (ratio * items as f64).round() as u32;
            (correct, items as u32 - correct)
        }
    };
    SessionRecord {
        module_id: module_id.to_string(),
        mode,
        correct,
        incorrect,
        item_count: items,
        matched_pairs: if mode == ModuleKind::Matching { items } else { 0 },
        timestamp: session_timestamp(index, per_day),
    }
}

fn canonical_config(username: Option<&str>, language: &str) -> Config {
    Config {
        language: language.to_string(),
        username: username.map(str::to_string),
        ..Config::default()
    }
}

/// Profile totals derived from the kept history. `total_sessions` may exceed
/// the history length once the history cap drops old runs.
fn make_export(
    username: Option<&str>,
    language: &str,
    total_sessions: usize,
    per_day: usize,
    skill: f64,
) -> ExportData {
    let all: Vec<SessionRecord> = (0..total_sessions)
        .map(|i| make_record(i, per_day, skill))
        .collect();

    let profile = ProfileData {
        schema_version: SCHEMA_VERSION,
        username: username.map(str::to_string),
        global_correct: all.iter().map(|r| r.correct).sum(),
        global_incorrect: all.iter().map(|r| r.incorrect).sum(),
        sessions_completed: total_sessions as u32,
        last_practice_date: all
            .last()
            .map(|r| r.timestamp.format("%Y-%m-%d").to_string()),
    };

    let mut history = SessionHistoryData {
        schema_version: SCHEMA_VERSION,
        sessions: Vec::new(),
    };
    for record in all {
        history.push(record);
    }

    ExportData {
        lingodrill_export_version: EXPORT_VERSION,
        exported_at: fixed_export_timestamp(),
        config: canonical_config(username, language),
        profile,
        session_history: history,
    }
}

fn main() {
    fs::create_dir_all("test-profiles").unwrap();

    let profiles: Vec<(&str, ExportData)> = vec![
        ("01-brand-new.json", make_export(None, "en", 0, 1, 0.5)),
        ("02-casual.json", make_export(Some("ana"), "es", 12, 3, 0.6)),
        ("03-daily-learner.json", make_export(Some("sam"), "en", 150, 5, 0.7)),
        (
            "04-history-capped.json",
            make_export(Some("lee"), "es", HISTORY_LIMIT + 40, 8, 0.8),
        ),
    ];

    for (name, export) in &profiles {
        let json = serde_json::to_string_pretty(export).unwrap();
        fs::write(format!("test-profiles/{name}"), json).unwrap();
        println!(
            "wrote test-profiles/{name} ({} sessions kept)",
            export.session_history.sessions.len()
        );
    }
}
