use std::collections::{BTreeSet, VecDeque};

use chrono::Local;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DEFAULT_MODEL;
use crate::form::{AddMemberForm, FieldError, MemberDraft};
use crate::model::{AIPrediction, Member, Role, avatar_url, parse_label_list};
use crate::seed::seed_members;

pub const WORKER_UNAVAILABLE: &str = "prediction worker unavailable";

/// Identity of one prediction request. Answers carrying any other key are stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub member_id: String,
    pub seq: u64,
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Predict { key: RequestKey, member: Member },
    Cancel { key: RequestKey },
}

#[derive(Debug, Clone)]
pub enum Delta {
    PredictionReady {
        key: RequestKey,
        result: Result<AIPrediction, String>,
    },
    Log(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PredictionView<'a> {
    Hidden,
    Loading,
    Ready(&'a AIPrediction),
    Failed(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceDatum {
    pub short_name: String,
    pub average_rating: f64,
    pub history_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trend {
    pub text: String,
    pub up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
    pub trend: Option<Trend>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub members: Vec<Member>,
    pub search: String,
    pub search_active: bool,
    pub selected: usize,
    pub selected_member_id: Option<String>,
    pub prediction: Option<AIPrediction>,
    pub predicting: bool,
    pub prediction_error: Option<String>,
    pub active_request: Option<RequestKey>,
    pub request_seq: u64,
    pub show_prediction: bool,
    pub add_form: Option<AddMemberForm>,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub predictions_requested: usize,
    pub members_added: usize,
    pub model_name: String,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_members(seed_members())
    }

    pub fn with_members(members: Vec<Member>) -> Self {
        Self {
            members,
            search: String::new(),
            search_active: false,
            selected: 0,
            selected_member_id: None,
            prediction: None,
            predicting: false,
            prediction_error: None,
            active_request: None,
            request_seq: 0,
            show_prediction: false,
            add_form: None,
            help_overlay: false,
            logs: VecDeque::with_capacity(200),
            predictions_requested: 0,
            members_added: 0,
            model_name: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.clamp_selection();
    }

    pub fn push_search_char(&mut self, ch: char) {
        self.search.push(ch);
        self.clamp_selection();
    }

    pub fn pop_search_char(&mut self) {
        self.search.pop();
        self.clamp_selection();
    }

    pub fn clear_search(&mut self) {
        self.set_search(String::new());
    }

    pub fn filtered_members(&self) -> Vec<&Member> {
        self.members
            .iter()
            .filter(|m| m.matches_query(&self.search))
            .collect()
    }

    pub fn selected_member(&self) -> Option<&Member> {
        self.filtered_members().get(self.selected).copied()
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// The member the prediction modal is about.
    pub fn prediction_member(&self) -> Option<&Member> {
        self.selected_member_id.as_deref().and_then(|id| self.member(id))
    }

    pub fn select_next(&mut self) {
        let total = self.filtered_members().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.filtered_members().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_members().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    /// Opens the prediction modal in its loading state and returns the
    /// command the worker must run.
    pub fn request_prediction(&mut self, member_id: &str) -> Option<ProviderCommand> {
        let Some(member) = self.member(member_id).cloned() else {
            self.push_log(format!("[WARN] Unknown member {member_id}"));
            return None;
        };

        self.request_seq += 1;
        let key = RequestKey {
            member_id: member.id.clone(),
            seq: self.request_seq,
        };
        self.selected_member_id = Some(member.id.clone());
        self.show_prediction = true;
        self.prediction = None;
        self.prediction_error = None;
        self.predicting = true;
        self.active_request = Some(key.clone());
        self.predictions_requested += 1;
        self.push_log(format!("[INFO] Predicting role for {}", member.name));
        info!(member = %member.id, seq = key.seq, "prediction requested");

        Some(ProviderCommand::Predict { key, member })
    }

    pub fn request_prediction_for_selected(&mut self) -> Option<ProviderCommand> {
        let Some(id) = self.selected_member().map(|m| m.id.clone()) else {
            self.push_log("[INFO] No member selected");
            return None;
        };
        self.request_prediction(&id)
    }

    pub fn retry_prediction(&mut self) -> Option<ProviderCommand> {
        if !matches!(self.prediction_view(), PredictionView::Failed(_)) {
            return None;
        }
        let id = self.selected_member_id.clone()?;
        self.request_prediction(&id)
    }

    /// Hides the modal. A request still in flight is cancelled and its
    /// answer will be dropped.
    pub fn close_prediction(&mut self) -> Option<ProviderCommand> {
        self.show_prediction = false;
        self.prediction = None;
        self.prediction_error = None;
        let in_flight = self.predicting;
        self.predicting = false;
        let key = self.active_request.take()?;
        in_flight.then_some(ProviderCommand::Cancel { key })
    }

    /// Settles a command the worker could not receive. A `Predict` fails in
    /// place so the loading view clears; a lost `Cancel` needs nothing.
    pub fn settle_undeliverable(&mut self, cmd: ProviderCommand) {
        if let ProviderCommand::Predict { key, .. } = cmd {
            apply_delta(
                self,
                Delta::PredictionReady {
                    key,
                    result: Err(WORKER_UNAVAILABLE.to_string()),
                },
            );
        }
    }

    pub fn prediction_view(&self) -> PredictionView<'_> {
        if !self.show_prediction {
            return PredictionView::Hidden;
        }
        if self.predicting {
            return PredictionView::Loading;
        }
        match (&self.prediction, &self.prediction_error) {
            (Some(prediction), _) => PredictionView::Ready(prediction),
            (None, Some(err)) => PredictionView::Failed(err),
            (None, None) => PredictionView::Failed("no prediction available"),
        }
    }

    pub fn open_add_form(&mut self) {
        if self.add_form.is_none() {
            self.add_form = Some(AddMemberForm::new());
        }
    }

    pub fn close_add_form(&mut self) {
        self.add_form = None;
    }

    /// Validates the open form; keeps it open with field errors on failure.
    pub fn submit_add_form(&mut self) -> bool {
        let Some(form) = self.add_form.as_mut() else {
            return false;
        };
        let draft = form.draft();
        if let Err(errors) = draft.validate() {
            form.reject(errors);
            return false;
        }
        let added = self.add_member(draft).map(|m| m.id.clone());
        match added {
            Ok(_) => true,
            Err(errors) => {
                if let Some(form) = self.add_form.as_mut() {
                    form.reject(errors);
                }
                false
            }
        }
    }

    pub fn add_member(&mut self, draft: MemberDraft) -> Result<&Member, Vec<FieldError>> {
        draft.validate()?;

        let id = Uuid::new_v4().to_string();
        let avatar_seed = id.split('-').next().unwrap_or(&id).to_string();
        let member = Member {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            avatar: avatar_url(&avatar_seed),
            skills: parse_label_list(&draft.skills),
            strengths: parse_label_list(&draft.strengths),
            history: Vec::new(),
            joined_date: Local::now().date_naive(),
        };
        self.push_log(format!("[INFO] Added member {}", member.name));
        info!(member = %member.id, "member added");

        self.members.insert(0, member);
        self.members_added += 1;
        self.add_form = None;
        self.clamp_selection();
        Ok(&self.members[0])
    }

    pub fn performance_data(&self) -> Vec<PerformanceDatum> {
        self.members
            .iter()
            .map(|m| PerformanceDatum {
                short_name: m.short_name().to_string(),
                average_rating: m.average_rating(),
                history_count: m.history.len(),
            })
            .collect()
    }

    /// Mean over every performance record of every member.
    pub fn team_average_rating(&self) -> f64 {
        let (sum, count) = self
            .members
            .iter()
            .flat_map(|m| m.history.iter())
            .fold((0u32, 0usize), |(sum, count), h| {
                (sum + u32::from(h.rating), count + 1)
            });
        if count == 0 {
            0.0
        } else {
            f64::from(sum) / count as f64
        }
    }

    pub fn roles_covered(&self) -> BTreeSet<Role> {
        self.members
            .iter()
            .flat_map(|m| m.history.iter().map(|h| h.role))
            .collect()
    }

    pub fn stats_cards(&self) -> [StatCard; 4] {
        let members_trend = (self.members_added > 0).then(|| Trend {
            text: format!("+{} new", self.members_added),
            up: true,
        });
        [
            StatCard {
                label: "Members",
                value: self.members.len().to_string(),
                trend: members_trend,
            },
            StatCard {
                label: "Avg rating",
                value: format!("{:.1}", self.team_average_rating()),
                trend: None,
            },
            StatCard {
                label: "Roles covered",
                value: format!("{}/{}", self.roles_covered().len(), Role::ALL.len()),
                trend: None,
            },
            StatCard {
                label: "AI predictions",
                value: self.predictions_requested.to_string(),
                trend: None,
            },
        ]
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::PredictionReady { key, result } => {
            if state.active_request.as_ref() != Some(&key) {
                state.push_log(format!(
                    "[INFO] Dropped stale prediction #{} for {}",
                    key.seq, key.member_id
                ));
                return;
            }
            state.active_request = None;
            state.predicting = false;
            match result {
                Ok(prediction) => {
                    state.push_log(format!(
                        "[INFO] Prediction ready: {}",
                        prediction.recommended_role.label()
                    ));
                    state.prediction = Some(prediction);
                }
                Err(err) => {
                    warn!(member = %key.member_id, seq = key.seq, error = %err, "prediction failed");
                    state.push_log(format!("[WARN] Prediction failed: {err}"));
                    state.prediction_error = Some(err);
                }
            }
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
