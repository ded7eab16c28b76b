use std::time::{Duration, Instant};

use anyhow::Result;
use dossier_client::{PersonRecord, SearchSession, SearchState};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Rotating status lines shown while a search runs. Purely decorative; the
/// rotation runs on its own clock and never touches search state.
const SEARCH_QUOTES: [&str; 6] = [
    "Information is the currency of the digital age.",
    "In data we trust, in ethics we must.",
    "Intelligence gathering with moral boundaries.",
    "Knowledge is power, responsibility is wisdom.",
    "The art of finding needles in digital haystacks.",
    "Privacy and transparency in perfect balance.",
];

const QUOTE_ROTATION: Duration = Duration::from_secs(2);
/// The ticker retires itself after this long even if the search is still going.
const QUOTE_CAP: Duration = Duration::from_secs(30);

/// Render progress until the session leaves the running state, then return
/// whatever it settled on.
pub async fn watch_search(session: &SearchSession) -> Result<SearchState> {
    let frame = MultiProgress::new();

    let bar = frame.add(ProgressBar::new(100));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos:>3}% {msg}")?
            .progress_chars("=>-"),
    );

    let quotes = frame.add(ProgressBar::new_spinner());
    quotes.enable_steady_tick(Duration::from_millis(120));
    let ticker = tokio::spawn(rotate_quotes(quotes.clone()));

    let mut rx = session.subscribe();
    let outcome = loop {
        let state = rx.borrow_and_update().clone();
        if let SearchState::Running {
            percentage, stage, ..
        } = &state
        {
            bar.set_position(u64::from(*percentage));
            bar.set_message(stage.clone());
        } else {
            break state;
        }
        if rx.changed().await.is_err() {
            break session.state();
        }
    };

    ticker.abort();
    quotes.finish_and_clear();
    match &outcome {
        SearchState::Completed { .. } => bar.finish_with_message("done"),
        SearchState::Failed { .. } => bar.abandon_with_message("failed"),
        _ => bar.finish_and_clear(),
    }

    Ok(outcome)
}

async fn rotate_quotes(spinner: ProgressBar) {
    let started = Instant::now();
    for quote in SEARCH_QUOTES.iter().cycle() {
        if started.elapsed() >= QUOTE_CAP {
            spinner.finish_and_clear();
            return;
        }
        spinner.set_message(*quote);
        tokio::time::sleep(QUOTE_ROTATION).await;
    }
}

pub fn print_record(record: &PersonRecord, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!();
    println!("Name        {}", record.name);
    if let Some(location) = &record.location {
        println!("Location    {location}");
    }
    println!("Confidence  {}", record.confidence);
    println!("Updated     {}", record.last_updated);
    println!("Summary     {}", record.summary);
    Ok(())
}
