use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use staffing_terminal::model::{AIPrediction, Member, Role};
use staffing_terminal::predict::{PredictError, Predictor};
use staffing_terminal::seed::seed_members;
use staffing_terminal::state::{AppState, Delta, ProviderCommand, RequestKey, apply_delta};
use staffing_terminal::worker::{next_job, spawn_prediction_worker};

#[derive(Clone, Default)]
struct RecordingPredictor {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Predictor for RecordingPredictor {
    fn predict(&self, member: &Member) -> Result<AIPrediction, PredictError> {
        self.seen.lock().unwrap().push(member.id.clone());
        if member.history.is_empty() {
            return Err(PredictError::Schema("no history".to_string()));
        }
        Ok(AIPrediction {
            recommended_role: member.history[0].role,
            confidence: 0.7,
            reasoning: "seeded".to_string(),
            alternative_role: Role::Security,
            suggested_improvement: "keep going".to_string(),
        })
    }
}

fn key(member_id: &str, seq: u64) -> RequestKey {
    RequestKey {
        member_id: member_id.to_string(),
        seq,
    }
}

fn predict(member: &Member, seq: u64) -> ProviderCommand {
    ProviderCommand::Predict {
        key: key(&member.id, seq),
        member: member.clone(),
    }
}

#[test]
fn next_job_keeps_newest_request() {
    let members = seed_members();
    let burst = next_job(vec![predict(&members[0], 1), predict(&members[2], 2)]);
    let (k, member) = burst.job.expect("one job");
    assert_eq!(k, key("3", 2));
    assert_eq!(member.id, "3");
    assert_eq!(
        burst.dropped,
        vec!["[INFO] Skipped queued prediction #1 for 1 (superseded)".to_string()]
    );
}

#[test]
fn next_job_honours_cancel_of_latest_only() {
    let members = seed_members();
    let burst = next_job(vec![
        predict(&members[0], 1),
        ProviderCommand::Cancel { key: key("1", 1) },
    ]);
    assert!(burst.job.is_none());
    assert_eq!(burst.dropped.len(), 1);
    assert!(burst.dropped[0].ends_with("(cancelled)"));

    // Cancelling an older key does not drop the newer request.
    let burst = next_job(vec![
        predict(&members[0], 1),
        predict(&members[1], 2),
        ProviderCommand::Cancel { key: key("1", 1) },
    ]);
    assert_eq!(burst.job.map(|(k, _)| k), Some(key("2", 2)));
    assert_eq!(burst.dropped.len(), 1);
}

#[test]
fn worker_answers_each_request_with_its_key() {
    let members = seed_members();
    let predictor = RecordingPredictor::default();
    let seen = predictor.seen.clone();
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_prediction_worker(predictor, tx, cmd_rx);

    cmd_tx.send(predict(&members[2], 7)).unwrap();
    match rx.recv_timeout(Duration::from_secs(5)).expect("answer") {
        Delta::PredictionReady { key: k, result } => {
            assert_eq!(k, key("3", 7));
            assert_eq!(result.unwrap().recommended_role, Role::Host);
        }
        other => panic!("unexpected delta {other:?}"),
    }

    let mut newcomer = members[0].clone();
    newcomer.id = "n1".to_string();
    newcomer.history.clear();
    cmd_tx.send(predict(&newcomer, 8)).unwrap();
    match rx.recv_timeout(Duration::from_secs(5)).expect("answer") {
        Delta::PredictionReady { key: k, result } => {
            assert_eq!(k, key("n1", 8));
            let err = result.unwrap_err();
            assert!(err.contains("no history"), "{err}");
        }
        other => panic!("unexpected delta {other:?}"),
    }

    drop(cmd_tx);
    handle.join().expect("worker exits when commands close");
    assert_eq!(*seen.lock().unwrap(), vec!["3".to_string(), "n1".to_string()]);
}

#[test]
fn cancelled_request_never_reaches_predictor() {
    let members = seed_members();
    let predictor = RecordingPredictor::default();
    let seen = predictor.seen.clone();
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();

    // Queue everything before the worker starts so it sees one burst.
    cmd_tx.send(predict(&members[0], 1)).unwrap();
    cmd_tx.send(ProviderCommand::Cancel { key: key("1", 1) }).unwrap();
    drop(cmd_tx);

    let handle = spawn_prediction_worker(predictor, tx, cmd_rx);
    handle.join().unwrap();
    assert!(seen.lock().unwrap().is_empty());

    // The console hears about the skipped request; no answer is produced.
    let deltas: Vec<Delta> = rx.try_iter().collect();
    assert_eq!(deltas.len(), 1, "{deltas:?}");
    match &deltas[0] {
        Delta::Log(line) => {
            assert_eq!(line, "[INFO] Skipped queued prediction #1 for 1 (cancelled)")
        }
        other => panic!("unexpected delta {other:?}"),
    }

    let mut state = AppState::new();
    let before = state.logs.len();
    for delta in deltas {
        apply_delta(&mut state, delta);
    }
    assert_eq!(state.logs.len(), before + 1);
    assert!(state.logs.iter().any(|l| l.contains("(cancelled)")));
}
