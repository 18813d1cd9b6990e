use howdy_core::error::FALLBACK_REPLY;
use howdy_core::{ChatMessage, ChatSession, OrchestratorClient, OrchestratorError, UserRole};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Chat,
    Input,
    Sidebar,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Conversation
    pub session: ChatSession,
    pub client: OrchestratorClient,
    pub query_task: Option<JoinHandle<Result<String, OrchestratorError>>>,
    pub last_error: Option<String>,

    // Query input
    pub query_input: String,
    pub query_cursor: usize, // cursor position in query_input, in chars

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of the chat block
    pub chat_width: u16,  // inner width of the chat block
    pub animation_frame: u8,

    // Sidebar role selector
    pub role_state: ListState,

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub sidebar_area: Option<Rect>,
}

impl App {
    pub fn new(client: OrchestratorClient) -> Self {
        let session = ChatSession::new();
        let mut role_state = ListState::default();
        role_state.select(role_index(session.role()));

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,
            session,
            client,
            query_task: None,
            last_error: None,
            query_input: String::new(),
            query_cursor: 0,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            animation_frame: 0,
            role_state,
            chat_area: None,
            sidebar_area: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.query_task.is_some()
    }

    /// Send the current input. Refused when the input is blank or a request is
    /// already in flight; returns whether a request was started.
    pub fn submit_query(&mut self) -> bool {
        if self.query_input.trim().is_empty() || self.is_loading() {
            return false;
        }

        let query = std::mem::take(&mut self.query_input);
        self.query_cursor = 0;
        self.last_error = None;
        self.session.append(ChatMessage::user(query.clone()));

        let role = self.session.role();
        let client = self.client.clone();
        info!(role = role.as_str(), chars = query.chars().count(), "submitting query");
        self.query_task = Some(tokio::spawn(async move { client.query(&query, role).await }));

        // Scroll to bottom so "Thinking..." is visible
        self.scroll_chat_to_bottom();
        true
    }

    /// Collect the reply if the in-flight request has finished.
    pub async fn poll_query_task(&mut self) {
        let finished = self
            .query_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.query_task.take() {
            let reply = match task.await {
                Ok(result) => self.reply_from(result),
                Err(e) => {
                    error!(error = %e, "query task did not complete");
                    FALLBACK_REPLY.to_string()
                }
            };
            self.session.append(ChatMessage::assistant(reply));
            self.scroll_chat_to_bottom();
        }
    }

    fn reply_from(&mut self, result: Result<String, OrchestratorError>) -> String {
        match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "orchestrator call failed");
                self.last_error = e.notice();
                e.user_message()
            }
        }
    }

    /// Drop the whole conversation, including any reply still in flight.
    pub fn clear_history(&mut self) {
        info!(turns = self.session.len(), "clearing chat history");
        if let Some(task) = self.query_task.take() {
            info!("abandoning pending query");
            task.abort();
        }
        self.session.clear();
        self.chat_scroll = 0;
        self.last_error = None;
    }

    pub fn set_role(&mut self, role: UserRole) {
        if role != self.session.role() {
            info!(role = role.as_str(), "user role changed");
        }
        self.session.set_role(role);
        self.role_state.select(role_index(role));
    }

    pub fn toggle_role(&mut self) {
        self.set_role(self.session.role().toggled());
    }

    // Sidebar navigation only moves the highlight; Enter applies it
    pub fn role_nav_down(&mut self) {
        let len = UserRole::all().len();
        let i = self.role_state.selected().map(|i| (i + 1) % len).unwrap_or(0);
        self.role_state.select(Some(i));
    }

    pub fn role_nav_up(&mut self) {
        let len = UserRole::all().len();
        let i = self
            .role_state
            .selected()
            .map(|i| (i + len - 1) % len)
            .unwrap_or(0);
        self.role_state.select(Some(i));
    }

    pub fn apply_highlighted_role(&mut self) {
        if let Some(role) = self
            .role_state
            .selected()
            .and_then(|i| UserRole::all().get(i).copied())
        {
            self.set_role(role);
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    /// Estimate how many wrapped lines the conversation occupies and scroll so
    /// the last of them sits at the bottom of the chat block.
    pub fn scroll_chat_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 { self.chat_width as usize } else { 50 };

        let mut total_lines: u16 = 0;
        for msg in self.session.turns() {
            total_lines = total_lines.saturating_add(1); // role label
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                let wrapped = u16::try_from(char_count / wrap_width + 1).unwrap_or(u16::MAX);
                total_lines = total_lines.saturating_add(wrapped);
            }
            total_lines = total_lines.saturating_add(1); // blank separator
        }
        if self.is_loading() {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 { self.chat_height } else { 20 };
        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }
}

fn role_index(role: UserRole) -> Option<usize> {
    UserRole::all().iter().position(|r| *r == role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use howdy_core::ChatRole;
    use std::time::Duration;

    // Nothing listens on the local discard port, so every call fails fast.
    fn test_app() -> App {
        App::new(OrchestratorClient::new("http://127.0.0.1:9/orchestrator"))
    }

    async fn wait_for_reply(app: &mut App) {
        for _ in 0..200 {
            app.poll_query_task().await;
            if !app.is_loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(25)).await;
        }
        panic!("query task never finished");
    }

    #[test]
    fn test_new_app_defaults() {
        let app = test_app();
        assert_eq!(app.session.role(), UserRole::Normal);
        assert_eq!(app.role_state.selected(), Some(0));
        assert!(app.session.is_empty());
        assert!(!app.is_loading());
    }

    #[test]
    fn test_blank_input_is_not_submitted() {
        let mut app = test_app();
        assert!(!app.submit_query());
        app.query_input = "   ".to_string();
        assert!(!app.submit_query());
        assert!(app.session.is_empty());
    }

    #[tokio::test]
    async fn test_second_submit_refused_while_pending() {
        let mut app = test_app();
        app.query_input = "first".to_string();
        assert!(app.submit_query());
        assert!(app.query_input.is_empty());
        assert_eq!(app.session.len(), 1);

        app.query_input = "second".to_string();
        assert!(!app.submit_query());
        assert_eq!(app.query_input, "second");
        assert_eq!(app.session.len(), 1);

        wait_for_reply(&mut app).await;
        assert_eq!(app.session.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_call_appends_apology_and_notice() {
        let mut app = test_app();
        app.query_input = "What is the travel policy?".to_string();
        app.submit_query();
        wait_for_reply(&mut app).await;

        let turns = app.session.turns();
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[1].role, ChatRole::Assistant);
        assert!(turns[1].content.starts_with("Sorry, I'm having trouble connecting"));
        assert!(app.last_error.is_some());
    }

    #[test]
    fn test_clear_history_resets_view() {
        let mut app = test_app();
        app.session.append(ChatMessage::user("q"));
        app.session.append(ChatMessage::assistant("a"));
        app.chat_scroll = 7;
        app.last_error = Some("boom".to_string());

        app.clear_history();
        assert!(app.session.is_empty());
        assert_eq!(app.chat_scroll, 0);
        assert!(app.last_error.is_none());
    }

    #[tokio::test]
    async fn test_clear_while_pending_drops_the_reply() {
        let mut app = test_app();
        app.query_input = "secret question".to_string();
        assert!(app.submit_query());
        assert!(app.is_loading());

        app.clear_history();
        assert!(app.session.is_empty());
        assert!(!app.is_loading());

        tokio::time::sleep(Duration::from_millis(200)).await;
        app.poll_query_task().await;
        assert!(app.session.is_empty());
        assert!(app.last_error.is_none());

        app.query_input = "next question".to_string();
        assert!(app.submit_query());
        wait_for_reply(&mut app).await;
        let turns = app.session.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "next question");
        assert_eq!(turns[1].role, ChatRole::Assistant);
    }

    #[test]
    fn test_role_selector_navigation() {
        let mut app = test_app();
        app.role_nav_down();
        assert_eq!(app.session.role(), UserRole::Normal);
        app.apply_highlighted_role();
        assert_eq!(app.session.role(), UserRole::Super);

        app.role_nav_down();
        assert_eq!(app.role_state.selected(), Some(0));
        app.toggle_role();
        assert_eq!(app.session.role(), UserRole::Normal);
        assert_eq!(app.role_state.selected(), Some(0));
    }

    #[test]
    fn test_scroll_to_bottom_with_small_view() {
        let mut app = test_app();
        app.chat_height = 4;
        app.chat_width = 40;
        for i in 0..3 {
            app.session.append(ChatMessage::user(format!("question {}", i)));
        }
        // 3 turns * (label + 1 line + blank) = 9 lines
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, 5);
    }

    #[test]
    fn test_scroll_to_bottom_saturates_on_huge_reply() {
        let mut app = test_app();
        app.chat_height = 10;
        app.chat_width = 1;
        app.session.append(ChatMessage::assistant("x".repeat(70_000)));
        app.scroll_chat_to_bottom();
        assert_eq!(app.chat_scroll, u16::MAX - 10);
    }
}
