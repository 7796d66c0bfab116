use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::model::Member;
use crate::predict::Predictor;
use crate::state::{Delta, ProviderCommand, RequestKey};

pub fn spawn_prediction_worker<P>(
    predictor: P,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    P: Predictor + Send + 'static,
{
    thread::spawn(move || {
        while let Ok(first) = cmd_rx.recv() {
            let mut pending = vec![first];
            while let Ok(cmd) = cmd_rx.try_recv() {
                pending.push(cmd);
            }

            let burst = next_job(pending);
            for note in burst.dropped {
                if tx.send(Delta::Log(note)).is_err() {
                    return;
                }
            }
            let Some((key, member)) = burst.job else {
                continue;
            };

            let result = predictor.predict(&member).map_err(|err| err.to_string());
            match &result {
                Ok(p) => info!(
                    member = %key.member_id,
                    seq = key.seq,
                    role = p.recommended_role.key(),
                    "prediction finished"
                ),
                Err(err) => {
                    debug!(member = %key.member_id, seq = key.seq, error = %err, "prediction errored")
                }
            }
            if tx.send(Delta::PredictionReady { key, result }).is_err() {
                break;
            }
        }
    })
}

/// What one drained burst of commands comes down to.
#[derive(Debug, Default)]
pub struct Burst {
    pub job: Option<(RequestKey, Member)>,
    /// Console lines for requests skipped without reaching the predictor.
    pub dropped: Vec<String>,
}

/// Collapses a burst of commands into the one request worth running: the
/// newest `Predict` not cancelled later in the same burst.
pub fn next_job(commands: Vec<ProviderCommand>) -> Burst {
    let mut burst = Burst::default();
    for cmd in commands {
        match cmd {
            ProviderCommand::Predict { key, member } => {
                if let Some((old, _)) = burst.job.take() {
                    debug!(member = %old.member_id, seq = old.seq, "prediction superseded");
                    burst.dropped.push(format!(
                        "[INFO] Skipped queued prediction #{} for {} (superseded)",
                        old.seq, old.member_id
                    ));
                }
                burst.job = Some((key, member));
            }
            ProviderCommand::Cancel { key } => {
                if burst.job.as_ref().is_some_and(|(k, _)| *k == key) {
                    debug!(member = %key.member_id, seq = key.seq, "prediction cancelled");
                    burst.dropped.push(format!(
                        "[INFO] Skipped queued prediction #{} for {} (cancelled)",
                        key.seq, key.member_id
                    ));
                    burst.job = None;
                }
            }
        }
    }
    burst
}
