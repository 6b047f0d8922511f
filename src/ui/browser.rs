use log::{error, info, warn};
use rfd::MessageLevel;

use race_replay::api::LoaderEvent;
use race_replay::replay::{PlaybackClock, ReplayState, ViewLayout};
use race_replay::session::{RoundInfo, Session, SessionRequest, SessionType};

use super::config::AppConfig;

/// A message that must be acknowledged before the UI continues
pub(crate) struct Alert {
    pub(crate) level: MessageLevel,
    pub(crate) title: &'static str,
    pub(crate) description: String,
}

/// Selector lists, the current selection and the replayed session.
///
/// Owns everything the loader results feed into, so the window only has to
/// forward events and issue the follow-up requests.
pub(crate) struct SessionBrowser {
    pub(crate) replay: ReplayState,
    pub(crate) app_config: AppConfig,
    pub(crate) years: Vec<i32>,
    pub(crate) rounds: Vec<RoundInfo>,
    pub(crate) selected_year: Option<i32>,
    pub(crate) selected_round: Option<u32>,
    pub(crate) session_type: SessionType,
    pub(crate) session_title: String,
    pub(crate) pending_alert: Option<Alert>,
}

impl SessionBrowser {
    pub(crate) fn new(app_config: AppConfig) -> Self {
        let layout = ViewLayout {
            right_margin: app_config.right_margin,
            ..Default::default()
        };
        let replay = ReplayState::new(layout, PlaybackClock::with_speed_index(app_config.speed_index));

        Self {
            replay,
            session_type: app_config.last_session_type,
            app_config,
            years: Vec::new(),
            rounds: Vec::new(),
            selected_year: None,
            selected_round: None,
            session_title: String::new(),
            pending_alert: None,
        }
    }

    /// Applies a loader result. Returns the season whose rounds should be
    /// requested next, if any.
    pub(crate) fn apply(&mut self, event: LoaderEvent, current_year: i32) -> Option<i32> {
        match event {
            LoaderEvent::Years(Ok(years)) => {
                self.selected_year = self
                    .selected_year
                    .filter(|y| years.contains(y))
                    .or_else(|| preselect_year(&years, current_year, self.app_config.last_year));
                self.years = years;
                self.rounds.clear();
                return self.selected_year;
            }
            LoaderEvent::Years(Err(e)) => {
                warn!("Could not load the season list: {}", e);
                self.years.clear();
                self.selected_year = None;
                self.rounds.clear();
                self.selected_round = None;
            }
            LoaderEvent::Rounds {
                year,
                result: Ok(rounds),
            } => {
                let remembered = self
                    .selected_round
                    .or(self.app_config.last_round.filter(|_| self.app_config.last_year == Some(year)));
                self.selected_round = preselect_round(&rounds, remembered);
                self.rounds = rounds;
            }
            LoaderEvent::Rounds {
                year,
                result: Err(e),
            } => {
                warn!("Could not load rounds for {}: {}", year, e);
                self.rounds.clear();
                self.selected_round = None;
            }
            LoaderEvent::Session {
                request,
                result: Ok(session),
            } => {
                self.app_config.last_year = Some(request.year);
                self.app_config.last_round = Some(request.round_number);
                self.app_config.last_session_type = request.session_type;
                self.show_session(*session, Some(request.session_type));
            }
            LoaderEvent::Session { request, result: Err(e) } => {
                error!(
                    "Could not load {} round {} ({}): {}",
                    request.year, request.round_number, request.session_type, e
                );
                self.alert_load_failure(&e.to_string());
            }
        }
        None
    }

    pub(crate) fn show_session(&mut self, session: Session, session_type: Option<SessionType>) {
        self.session_title = session_title(&session, session_type);
        info!("Showing {}", self.session_title);
        self.replay.load_session(session);
    }

    /// Selects the session a request points at before it is sent.
    pub(crate) fn select(&mut self, request: &SessionRequest) {
        self.selected_year = Some(request.year);
        self.selected_round = Some(request.round_number);
        self.session_type = request.session_type;
    }

    /// Drops the rounds of the previous season. Returns the season to fetch.
    pub(crate) fn year_changed(&mut self) -> Option<i32> {
        self.rounds.clear();
        self.selected_round = None;
        self.selected_year
    }

    /// The request for the current selection, or a warning when incomplete.
    pub(crate) fn selected_request(&mut self) -> Option<SessionRequest> {
        match SessionRequest::from_selection(self.selected_year, self.selected_round, self.session_type) {
            Ok(request) => Some(request),
            Err(e) => {
                self.pending_alert = Some(Alert {
                    level: MessageLevel::Warning,
                    title: "Race replay",
                    description: e.to_string(),
                });
                None
            }
        }
    }

    pub(crate) fn alert_load_failure(&mut self, detail: &str) {
        self.pending_alert = Some(Alert {
            level: MessageLevel::Error,
            title: "Failed to load session",
            description: format!("Failed to load session: {detail}"),
        });
    }

    pub(crate) fn alert_save_failure(&mut self, detail: &str) {
        self.pending_alert = Some(Alert {
            level: MessageLevel::Error,
            title: "Failed to save session",
            description: detail.to_string(),
        });
    }
}

/// Year selected when the season list arrives: the current calendar year,
/// then the last year used, then the first entry.
pub(crate) fn preselect_year(years: &[i32], current_year: i32, last_year: Option<i32>) -> Option<i32> {
    if years.contains(&current_year) {
        return Some(current_year);
    }
    last_year
        .filter(|y| years.contains(y))
        .or_else(|| years.first().copied())
}

pub(crate) fn preselect_round(rounds: &[RoundInfo], remembered: Option<u32>) -> Option<u32> {
    remembered
        .filter(|r| rounds.iter().any(|round| round.round_number == *r))
        .or_else(|| rounds.first().map(|round| round.round_number))
}

/// `"<event> – Race"` or `"<event> – Sprint"`, just the event for files.
pub(crate) fn session_title(session: &Session, session_type: Option<SessionType>) -> String {
    let event = &session.session_info.event_name;
    match session_type {
        Some(session_type) => format!("{} – {}", event, session_type.label()),
        None => event.clone(),
    }
}
