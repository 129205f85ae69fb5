use std::collections::HashSet;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::gemini::TextGenerator;
use crate::service;
use crate::state::{Delta, ProviderCommand, RequestKey};

type Inflight = Arc<Mutex<HashSet<RequestKey>>>;

/// Spawns the worker that answers `ProviderCommand`s with `Delta`s. It exits
/// once every command sender is gone.
pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    generator: Arc<dyn TextGenerator>,
    threads: usize,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let pool = build_fetch_pool(threads);
        let inflight: Inflight = Arc::new(Mutex::new(HashSet::new()));

        while let Ok(cmd) = cmd_rx.recv() {
            let key = cmd.key();
            if !claim(&inflight, &key) {
                debug!(?key, "request already in flight");
                continue;
            }

            let tx = tx.clone();
            let generator = generator.clone();
            let inflight = inflight.clone();
            let job = move || {
                let delta = run_command(generator.as_ref(), cmd);
                release(&inflight, &key);
                if let Some(line) = warn_line(&delta) {
                    let _ = tx.send(Delta::Log(line));
                }
                let _ = tx.send(delta);
            };

            match pool.as_ref() {
                Some(pool) => pool.spawn(job),
                None => {
                    thread::spawn(job);
                }
            }
        }
        info!("provider stopped: command channel closed");
    })
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|idx| format!("footy-fetch-{idx}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(error = %err, "fetch pool unavailable, using one thread per request");
            None
        }
    }
}

fn claim(inflight: &Inflight, key: &RequestKey) -> bool {
    inflight
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key.clone())
}

fn release(inflight: &Inflight, key: &RequestKey) {
    inflight
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(key);
}

/// Runs one command to completion. Errors are folded into the delta.
pub fn run_command(generator: &dyn TextGenerator, cmd: ProviderCommand) -> Delta {
    debug!(?cmd, "running provider command");
    match cmd {
        ProviderCommand::FetchTab { entity, tab } => Delta::TabLoaded {
            entity_id: entity.id(),
            tab,
            result: stringify(service::fetch_tab(generator, tab, &entity)),
        },
        ProviderCommand::FetchMatchCenter { entity } => Delta::MatchCenterLoaded {
            entity_id: entity.id(),
            result: stringify(service::fetch_match_center(
                generator,
                entity.prompt_focus(),
            )),
        },
        ProviderCommand::FetchAnalysis { info, kind } => {
            let result = stringify(service::fetch_analysis(generator, kind, &info));
            Delta::AnalysisLoaded { info, kind, result }
        }
        ProviderCommand::FetchPlayerProfile { player, context } => {
            let result = stringify(service::fetch_player_profile(generator, &player, &context));
            Delta::ProfileLoaded { player, result }
        }
        ProviderCommand::FetchComparison { players, context } => {
            let result = stringify(service::fetch_player_comparison(
                generator, &players, &context,
            ));
            Delta::ComparisonLoaded { players, result }
        }
        ProviderCommand::FetchSuggestions { query } => {
            let result = stringify(service::fetch_player_suggestions(generator, &query));
            Delta::SuggestionsLoaded { query, result }
        }
    }
}

/// Keeps the top-level message for display; the full chain goes to the log.
fn stringify<T>(result: anyhow::Result<T>) -> Result<T, String> {
    result.map_err(|err| {
        warn!(error = %format!("{err:#}"), "provider request failed");
        err.to_string()
    })
}

fn warn_line(delta: &Delta) -> Option<String> {
    let (what, err) = match delta {
        Delta::TabLoaded {
            result: Err(err), ..
        } => ("Tab fetch", err),
        Delta::MatchCenterLoaded {
            result: Err(err), ..
        } => ("Match center", err),
        Delta::AnalysisLoaded {
            result: Err(err), ..
        } => ("Analysis", err),
        Delta::ProfileLoaded {
            result: Err(err), ..
        } => ("Player profile", err),
        Delta::ComparisonLoaded {
            result: Err(err), ..
        } => ("Comparison", err),
        Delta::SuggestionsLoaded {
            result: Err(err), ..
        } => ("Suggestions", err),
        _ => return None,
    };
    Some(format!("[WARN] {what} error: {err}"))
}
