//! Livestock Weigh Station
//!
//! Terminal front end for weigh-in (T-Start) and weigh-out (T-End) sessions:
//! - Tattoo lookup against the registry with live suggestions
//! - Deceased-animal warnings
//! - Local record log with CSV reports
//! - Optional AI notes

use anyhow::Result;
use std::io::{self, Write};

use weighin::export::{ExportOutcome, ReportKind};
use weighin::lookup::{LookupState, ResolutionKind};
use weighin::registry::RegistryAnimal;
use weighin::store::{StoredEntry, TestPhase};
use weighin::{StationConfig, StationParts, SubmitOutcome, WeighStation};

// ──────────────────────────────────────────────────────────────────────────────
// INPUT HELPERS
// ──────────────────────────────────────────────────────────────────────────────

fn prompt(label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}

fn confirm(question: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{} [y/N]: ", question))?.unwrap_or_default();
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí"))
}

fn phase_from_args() -> TestPhase {
    match std::env::args().nth(1).as_deref() {
        Some("end") | Some("t-end") => TestPhase::End,
        _ => TestPhase::Start,
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// RENDERING
// ──────────────────────────────────────────────────────────────────────────────

fn print_help() {
    println!("\n💡 Commands:");
    println!("   config <prefix> <shed> <pen>   set the session location");
    println!("   n <number>                     type the tattoo number (shows suggestions)");
    println!("   pick <k>                       take suggestion k");
    println!("   breed <text> | w <kg> | date <yyyy-mm-dd> | note <text>");
    println!("   diag | improve                 AI diagnostic / rewrite notes");
    println!("   show | save | list | export <full|start|end> | clear | quit\n");
}

fn print_suggestions(suggestions: &[RegistryAnimal]) {
    if suggestions.is_empty() {
        return;
    }
    println!("🔎 Suggestions:");
    for (i, animal) in suggestions.iter().enumerate() {
        let flag = if animal.is_deceased { "  ⚠️ BAJA" } else { "" };
        println!("   {}. {} ({}){}", i + 1, animal.id, animal.breed, flag);
    }
}

fn describe_lookup(state: &LookupState) -> String {
    match state {
        LookupState::Idle => "—".to_string(),
        LookupState::Pending { full_id, .. } => format!("looking up {}...", full_id),
        LookupState::Resolved(resolution) => match resolution.kind {
            ResolutionKind::Found => format!("{} found in registry", resolution.full_id),
            ResolutionKind::FoundDeceased => format!("⚠️  {} is registered as DECEASED", resolution.full_id),
            ResolutionKind::NotFound => format!("{} not in registry (new animal)", resolution.full_id),
        },
    }
}

async fn print_form(station: &WeighStation) {
    let form = station.form().await;
    println!("\n📋 {} — {}", station.phase(), form.date);
    println!("   ID:      {}{}", form.tattoo_prefix, form.animal_number);
    println!("   Lookup:  {}", describe_lookup(&station.lookup_state()));
    println!("   Breed:   {}", if form.breed.is_empty() { "-" } else { form.breed.as_str() });
    println!("   Weight:  {} kg", if form.weight.is_empty() { "-" } else { form.weight.as_str() });
    println!("   Shed/Pen: {} / {}", form.shed, form.pen);
    println!("   Mother: {}  Father: {}  Born: {}", form.mother, form.father, form.birth_date);
    if !form.notes.is_empty() {
        println!("   Notes:   {}", form.notes);
    }
    println!();
}

fn print_records(records: &[StoredEntry]) {
    if records.is_empty() {
        println!("\n📭 No records saved yet.\n");
        return;
    }
    println!("\n📜 {} records (newest first):", records.len());
    println!("{}", "─".repeat(60));
    for stored in records {
        let e = &stored.entry;
        println!(
            "{:<12} {:<10} {:>7.1} kg  G:{} C:{}  {}",
            e.animal_id, e.status, e.weight, e.shed, e.pen, e.notes
        );
    }
    println!("{}\n", "─".repeat(60));
}

// ──────────────────────────────────────────────────────────────────────────────
// MAIN ENTRY POINT
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();
    weighin::telemetry::init_tracing()?;

    let config = StationConfig::from_env()?;
    let phase = phase_from_args();

    println!("\n{}", "═".repeat(60));
    println!("🐄 Weigh Station v{} — {}", env!("CARGO_PKG_VERSION"), phase);
    println!("{}", "═".repeat(60));

    let parts = StationParts::from_config(&config).await?;
    let sync_enabled = parts.sync.is_enabled();
    let assist_enabled = parts.assistant.is_enabled();
    let station = WeighStation::open(parts, phase).await?;

    println!("💾 Records: {} stored in '{}'", station.records().len().await, config.data_dir.display());
    println!("🔄 Remote sync: {}", if sync_enabled { "on" } else { "off" });
    println!("🤖 AI assist: {}", if assist_enabled { "on" } else { "off" });
    print_help();

    let form = station.form().await;
    if form.tattoo_prefix.is_empty() || form.shed.is_empty() || form.pen.is_empty() {
        println!("⚙️  No session location yet: run `config <prefix> <shed> <pen>` first.\n");
    } else {
        println!("⚙️  Session: prefix {} | shed {} | pen {}\n", form.tattoo_prefix, form.shed, form.pen);
    }

    let mut suggestions: Vec<RegistryAnimal> = Vec::new();

    loop {
        let Some(line) = prompt("⚖️  > ")? else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match command.as_str() {
            "quit" | "exit" | "q" => break,
            "help" | "?" => print_help(),
            "config" => {
                let args: Vec<&str> = rest.split_whitespace().collect();
                let [prefix, shed, pen] = args.as_slice() else {
                    println!("Usage: config <prefix> <shed> <pen>");
                    continue;
                };
                match station.configure(prefix, shed, pen).await {
                    Ok(()) => println!("✅ Session set: prefix {} | shed {} | pen {}", prefix, shed, pen),
                    Err(e) => println!("❌ {}", e),
                }
            }
            "n" | "num" => {
                suggestions = station.set_animal_number(rest).await;
                print_suggestions(&suggestions);
            }
            "pick" => match rest.parse::<usize>().ok().and_then(|k| suggestions.get(k.wrapping_sub(1))) {
                Some(animal) => {
                    station.select_suggestion(animal).await;
                    suggestions.clear();
                    print_form(&station).await;
                }
                None => println!("No suggestion with that number."),
            },
            "b" | "breed" => station.set_breed(rest).await,
            "w" | "weight" => station.set_weight(rest).await,
            "date" => station.set_date(rest).await,
            "note" | "notes" => station.set_notes(rest).await,
            "diag" => match station.diagnose().await {
                Ok(text) => println!("🤖 {}", text),
                Err(e) => println!("⚠️  {}", e),
            },
            "improve" => println!("🤖 {}", station.improve_notes().await),
            "show" => {
                station.settle_lookup().await;
                print_form(&station).await;
            }
            "save" => {
                let mut outcome = station.submit(false).await;
                if let Ok(SubmitOutcome::NeedsConfirmation { animal_id }) = &outcome {
                    println!("⚠️  {} is registered as DECEASED (baja).", animal_id);
                    if !confirm("Store it anyway?")? {
                        println!("Not saved.");
                        continue;
                    }
                    outcome = station.submit(true).await;
                }
                match outcome {
                    Ok(SubmitOutcome::Saved(stored)) => {
                        println!("✅ Saved {} — {} kg ({})", stored.entry.animal_id, stored.entry.weight, stored.entry.status)
                    }
                    Ok(SubmitOutcome::NeedsConfirmation { .. }) => println!("Not saved."),
                    Err(e) => println!("❌ {}", e),
                }
            }
            "list" => print_records(&station.list_records().await),
            "export" => {
                let kind = match if rest.is_empty() { Ok(ReportKind::Full) } else { rest.parse::<ReportKind>() } {
                    Ok(kind) => kind,
                    Err(e) => {
                        println!("❌ {}", e);
                        continue;
                    }
                };
                match station.export(kind).await {
                    Ok(ExportOutcome::Written(path)) => println!("📄 Report written to {}", path.display()),
                    Ok(ExportOutcome::NothingToExport) => println!("📭 Nothing to export for {}.", kind.base_name()),
                    Err(e) => println!("❌ Export failed: {}", e),
                }
            }
            "clear" => {
                if confirm("Delete ALL local records?")? {
                    match station.clear_records().await {
                        Ok(()) => println!("🗑️  Local records cleared."),
                        Err(e) => println!("❌ {}", e),
                    }
                }
            }
            _ => println!("Unknown command '{}'. Type 'help'.", command),
        }
    }

    println!("\n👋 Goodbye!\n");
    Ok(())
}
