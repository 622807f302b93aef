use std::sync::Arc;

use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::config::Config;
use crate::directory::Directory;
use crate::location::{GeoClient, GeoFix};
use crate::predict::{self, PredictClient, Prediction, Predictor};
use crate::stats::StatCounter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Chat,
    Doctors,
    Medicines,
    Hospitals,
    About,
}

impl Section {
    pub fn all() -> [Section; 5] {
        [
            Section::Chat,
            Section::Doctors,
            Section::Medicines,
            Section::Hospitals,
            Section::About,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Chat => "AI Assistant",
            Section::Doctors => "Find Doctors",
            Section::Medicines => "Medicines",
            Section::Hospitals => "Hospitals",
            Section::About => "About",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Focusable panes inside the Chat section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFocus {
    Input,
    QuickActions,
    Transcript,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Bot,
}

/// Preset symptom descriptions offered as one-key shortcuts.
pub const QUICK_ACTIONS: [&str; 4] = [
    "I have a fever and headache",
    "I have a cough and sore throat",
    "I have stomach pain and nausea",
    "I feel tired and dizzy",
];

pub const GREETING: &str =
    "Hello! I'm your AI health assistant. Describe your symptoms and I'll try to help.";

pub struct App {
    // Core state
    pub should_quit: bool,
    pub section: Section,
    pub input_mode: InputMode,

    // Chat state
    pub chat_focus: ChatFocus,
    pub chat_input: String,
    pub chat_cursor: usize, // cursor position in chat_input, in chars
    pub messages: Vec<ChatMessage>,
    pub awaiting_reply: bool,
    pub chat_scroll: u16,
    pub chat_height: u16, // chat area height for scroll calculations
    pub chat_width: u16,  // chat area width for wrap calculations
    pub quick_selected: usize,
    pub animation_frame: u8, // 0-2 for ellipsis animation
    tick_count: u64,
    pub prediction_task: Option<JoinHandle<anyhow::Result<Prediction>>>,

    // Doctors state
    pub doctor_query: String,
    pub visible_doctors: Vec<usize>,
    pub doctor_state: ListState,

    // Medicines state
    pub medicine_state: ListState,

    // Hospitals state
    pub location: Option<GeoFix>,
    pub location_task: Option<JoinHandle<anyhow::Result<GeoFix>>>,
    pub hospital_state: ListState,

    // About state
    pub stats: Vec<StatCounter>,
    pub stats_started: bool,

    // Data
    pub directory: Directory,
    predictor: Arc<dyn Predictor>,
}

impl App {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let directory = Directory::load_builtin()?;
        let predictor = Arc::new(PredictClient::new(&config.server_url()));

        let mut app = Self::with_predictor(directory, predictor);
        app.request_location(GeoClient::new(&config.geo_url()));
        Ok(app)
    }

    /// Build an app around an arbitrary predictor. Used by `new` and by
    /// tests that stub the transport.
    pub fn with_predictor(directory: Directory, predictor: Arc<dyn Predictor>) -> Self {
        let mut doctor_state = ListState::default();
        doctor_state.select(Some(0));
        let mut medicine_state = ListState::default();
        medicine_state.select(Some(0));
        let mut hospital_state = ListState::default();
        hospital_state.select(Some(0));

        let visible_doctors = (0..directory.doctors.len()).collect();

        Self {
            should_quit: false,
            section: Section::Chat,
            input_mode: InputMode::Normal,

            chat_focus: ChatFocus::Input,
            chat_input: String::new(),
            chat_cursor: 0,
            messages: vec![ChatMessage {
                role: ChatRole::Bot,
                content: GREETING.to_string(),
            }],
            awaiting_reply: false,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            quick_selected: 0,
            animation_frame: 0,
            tick_count: 0,
            prediction_task: None,

            doctor_query: String::new(),
            visible_doctors,
            doctor_state,

            medicine_state,

            location: None,
            location_task: None,
            hospital_state,

            stats: default_stats(),
            stats_started: false,

            directory,
            predictor,
        }
    }

    // Section navigation: a single enum value is the whole selection
    // state, so exactly one section and menu entry is active at a time.
    pub fn set_section(&mut self, section: Section) {
        self.section = section;
        self.input_mode = InputMode::Normal;
        if section == Section::About {
            // Counters start ramping once the section is first shown
            self.stats_started = true;
        }
    }

    pub fn next_section(&mut self) {
        let sections = Section::all();
        let idx = sections.iter().position(|s| *s == self.section).unwrap_or(0);
        self.set_section(sections[(idx + 1) % sections.len()]);
    }

    pub fn prev_section(&mut self) {
        let sections = Section::all();
        let idx = sections.iter().position(|s| *s == self.section).unwrap_or(0);
        self.set_section(sections[(idx + sections.len() - 1) % sections.len()]);
    }

    /// Send the current input to the prediction service.
    ///
    /// Empty or whitespace-only input is silently ignored. Submissions
    /// are serialized: while a request is outstanding further submits
    /// are ignored, so replies always render in request order.
    pub fn submit(&mut self) {
        let message = self.chat_input.trim().to_string();
        if message.is_empty() || self.prediction_task.is_some() {
            return;
        }

        self.messages.push(ChatMessage {
            role: ChatRole::User,
            content: message.clone(),
        });
        self.chat_input.clear();
        self.chat_cursor = 0;
        self.awaiting_reply = true;
        self.scroll_chat_to_bottom();

        let predictor = Arc::clone(&self.predictor);
        self.prediction_task = Some(tokio::spawn(async move {
            predictor.predict(&message).await
        }));
    }

    /// Pre-fill the input with a preset and submit it immediately.
    pub fn quick_send(&mut self, preset: &str) {
        self.chat_input = preset.to_string();
        self.chat_cursor = self.chat_input.chars().count();
        self.submit();
    }

    /// Settle the outstanding request if it has completed.
    pub async fn poll_prediction(&mut self) {
        let finished = self
            .prediction_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if finished {
            self.finish_prediction().await;
        }
    }

    /// Await the outstanding request and render the bot reply. Failures
    /// become the fixed apology message; detail goes to the log only.
    pub async fn finish_prediction(&mut self) {
        let Some(task) = self.prediction_task.take() else {
            return;
        };

        let content = match task.await {
            Ok(Ok(prediction)) => predict::format_reply(&prediction),
            Ok(Err(err)) => {
                warn!("prediction request failed: {err:#}");
                predict::ERROR_REPLY.to_string()
            }
            Err(err) => {
                warn!("prediction task failed to join: {err}");
                predict::ERROR_REPLY.to_string()
            }
        };

        self.awaiting_reply = false;
        self.messages.push(ChatMessage {
            role: ChatRole::Bot,
            content,
        });
        self.scroll_chat_to_bottom();
    }

    pub fn request_location(&mut self, client: GeoClient) {
        self.location_task = Some(tokio::spawn(async move { client.locate().await }));
    }

    /// One-shot geolocation settlement. On failure the previous display
    /// is left untouched.
    pub async fn poll_location(&mut self) {
        let finished = self
            .location_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.location_task.take() {
            match task.await {
                Ok(Ok(fix)) => self.location = Some(fix),
                Ok(Err(err)) => warn!("geolocation lookup failed: {err:#}"),
                Err(err) => warn!("geolocation task failed to join: {err}"),
            }
        }
    }

    /// Tick animation frame (called by Tick event). The ellipsis only
    /// advances every third tick so it stays readable at the tick rate
    /// the stat counters need.
    pub fn tick_animation(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
        if self.awaiting_reply && self.tick_count % 3 == 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if self.stats_started {
            for stat in &mut self.stats {
                stat.step();
            }
        }
    }

    // Doctor filtering: recomputed on every keystroke, entries are
    // hidden rather than removed.
    pub fn filter_doctors(&mut self) {
        self.visible_doctors = self
            .directory
            .doctors
            .iter()
            .enumerate()
            .filter(|(_, doctor)| doctor.matches(&self.doctor_query))
            .map(|(i, _)| i)
            .collect();

        if self.visible_doctors.is_empty() {
            self.doctor_state.select(None);
        } else {
            self.doctor_state.select(Some(0));
        }
    }

    pub fn doctors_nav_down(&mut self) {
        let len = self.visible_doctors.len();
        if len > 0 {
            let i = self.doctor_state.selected().unwrap_or(0);
            self.doctor_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn doctors_nav_up(&mut self) {
        let i = self.doctor_state.selected().unwrap_or(0);
        self.doctor_state.select(Some(i.saturating_sub(1)));
    }

    pub fn medicines_nav_down(&mut self) {
        let len = self.directory.medicines.len();
        if len > 0 {
            let i = self.medicine_state.selected().unwrap_or(0);
            self.medicine_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn medicines_nav_up(&mut self) {
        let i = self.medicine_state.selected().unwrap_or(0);
        self.medicine_state.select(Some(i.saturating_sub(1)));
    }

    pub fn hospitals_nav_down(&mut self) {
        let len = self.directory.hospitals.len();
        if len > 0 {
            let i = self.hospital_state.selected().unwrap_or(0);
            self.hospital_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn hospitals_nav_up(&mut self) {
        let i = self.hospital_state.selected().unwrap_or(0);
        self.hospital_state.select(Some(i.saturating_sub(1)));
    }

    pub fn quick_next(&mut self) {
        self.quick_selected = (self.quick_selected + 1).min(QUICK_ACTIONS.len() - 1);
    }

    pub fn quick_prev(&mut self) {
        self.quick_selected = self.quick_selected.saturating_sub(1);
    }

    /// Keep the latest message (and the typing indicator) visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.messages {
            total_lines += 1; // Role line ("You:" or "Assistant:")
            for line in msg.content.lines() {
                // Character count, not byte length, for UTF-8 content
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.awaiting_reply {
            total_lines += 2; // "Assistant:" + "Typing..."
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }

    pub fn chat_scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn chat_scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }
}

fn default_stats() -> Vec<StatCounter> {
    vec![
        StatCounter::new("Active Users", "10000+"),
        StatCounter::new("Verified Doctors", "500+"),
        StatCounter::new("Prediction Accuracy", "92%"),
        StatCounter::new("Symptoms Analyzed", "1500000"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::{ERROR_REPLY, FALLBACK_REPLY};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubPredictor {
        prediction: Option<Prediction>, // None means the request fails
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Predictor for StubPredictor {
        async fn predict(&self, _symptoms: &str) -> anyhow::Result<Prediction> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.prediction {
                Some(prediction) => Ok(prediction.clone()),
                None => Err(anyhow!("connection refused")),
            }
        }
    }

    fn test_app(prediction: Option<Prediction>) -> (App, Arc<StubPredictor>) {
        let predictor = Arc::new(StubPredictor {
            prediction,
            calls: AtomicUsize::new(0),
        });
        let app = App::with_predictor(
            Directory::load_builtin().unwrap(),
            Arc::clone(&predictor) as Arc<dyn Predictor>,
        );
        (app, predictor)
    }

    #[tokio::test]
    async fn test_submit_appends_trimmed_user_message_and_clears_input() {
        let (mut app, _) = test_app(Some(Prediction::default()));
        app.chat_input = "  I have a headache  ".to_string();

        app.submit();

        let last = app.messages.last().unwrap();
        assert_eq!(last.role, ChatRole::User);
        assert_eq!(last.content, "I have a headache");
        assert!(app.chat_input.is_empty());
        assert!(app.awaiting_reply);

        app.finish_prediction().await;
    }

    #[tokio::test]
    async fn test_whitespace_submit_is_ignored() {
        let (mut app, predictor) = test_app(Some(Prediction::default()));
        app.chat_input = "   ".to_string();

        app.submit();

        assert_eq!(app.messages.len(), 1); // only the greeting
        assert!(app.prediction_task.is_none());
        assert!(!app.awaiting_reply);
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_reply_renders_and_hides_typing() {
        let prediction = Prediction {
            disease: Some("Flu".to_string()),
            treatment: Some("Rest".to_string()),
            severity: Some("mild".to_string()),
            message: None,
        };
        let (mut app, _) = test_app(Some(prediction));
        app.chat_input = "fever".to_string();

        app.submit();
        assert!(app.awaiting_reply);
        app.finish_prediction().await;

        assert!(!app.awaiting_reply);
        let last = app.messages.last().unwrap();
        assert_eq!(last.role, ChatRole::Bot);
        assert!(last.content.contains("**Flu**"));
        assert!(last.content.contains("Rest"));
        assert!(last.content.contains("Medicines"));
        assert!(!last.content.contains("Critical Condition"));
    }

    #[tokio::test]
    async fn test_empty_prediction_yields_fallback_reply() {
        let (mut app, _) = test_app(Some(Prediction::default()));
        app.chat_input = "hmm".to_string();

        app.submit();
        app.finish_prediction().await;

        assert_eq!(app.messages.last().unwrap().content, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_transport_failure_yields_apology() {
        let (mut app, _) = test_app(None);
        app.chat_input = "fever".to_string();

        app.submit();
        app.finish_prediction().await;

        assert!(!app.awaiting_reply);
        let last = app.messages.last().unwrap();
        assert_eq!(last.role, ChatRole::Bot);
        assert_eq!(last.content, ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_submissions_are_serialized() {
        let (mut app, predictor) = test_app(Some(Prediction::default()));
        app.chat_input = "first".to_string();
        app.submit();

        // A second submit while the first is outstanding is ignored
        app.chat_input = "second".to_string();
        app.submit();
        assert_eq!(app.chat_input, "second");
        assert_eq!(
            app.messages
                .iter()
                .filter(|m| m.role == ChatRole::User)
                .count(),
            1
        );

        app.finish_prediction().await;
        assert_eq!(predictor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_quick_send_submits_preset() {
        let (mut app, _) = test_app(Some(Prediction::default()));

        app.quick_send(QUICK_ACTIONS[0]);

        let user: Vec<_> = app
            .messages
            .iter()
            .filter(|m| m.role == ChatRole::User)
            .collect();
        assert_eq!(user.len(), 1);
        assert_eq!(user[0].content, QUICK_ACTIONS[0]);
        assert!(app.awaiting_reply);

        app.finish_prediction().await;
        assert_eq!(app.messages.last().unwrap().role, ChatRole::Bot);
    }

    #[test]
    fn test_doctor_filter_hides_non_matching_entries() {
        let (mut app, _) = test_app(Some(Prediction::default()));

        app.doctor_query = "cardio".to_string();
        app.filter_doctors();

        assert!(!app.visible_doctors.is_empty());
        for (i, doctor) in app.directory.doctors.iter().enumerate() {
            assert_eq!(app.visible_doctors.contains(&i), doctor.matches("cardio"));
        }

        app.doctor_query.clear();
        app.filter_doctors();
        assert_eq!(app.visible_doctors.len(), app.directory.doctors.len());
    }

    #[test]
    fn test_filter_with_no_matches_clears_selection() {
        let (mut app, _) = test_app(Some(Prediction::default()));

        app.doctor_query = "zzzz".to_string();
        app.filter_doctors();

        assert!(app.visible_doctors.is_empty());
        assert_eq!(app.doctor_state.selected(), None);
    }

    #[test]
    fn test_section_switching_wraps() {
        let (mut app, _) = test_app(Some(Prediction::default()));
        assert_eq!(app.section, Section::Chat);

        app.prev_section();
        assert_eq!(app.section, Section::About);
        app.next_section();
        assert_eq!(app.section, Section::Chat);
    }

    #[test]
    fn test_stats_animate_after_visiting_about() {
        let (mut app, _) = test_app(Some(Prediction::default()));
        assert!(!app.stats_started);

        app.set_section(Section::About);
        assert!(app.stats_started);

        let before = app.stats[0].display();
        app.tick_animation();
        assert_ne!(app.stats[0].display(), before);
    }
}
