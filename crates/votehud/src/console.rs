//! Terminal host
//!
//! Stands in for a game client: stdin lines drive input and connection
//! changes, and each frame's overlay text is printed when it changes.

use votehud_core::compass_rect;
use votehud_host_api::{
    Argb, CursorPos, HostCapabilities, HostResult, HostServices, InputActions, InputProbe, Rect,
    Surface, Viewport,
};

/// Scaled GUI size of a typical 1280x720 window at GUI scale 3
pub const CONSOLE_VIEWPORT: Viewport = Viewport::new(427, 240);

const CHAR_WIDTH: i32 = 6;
const FONT_HEIGHT: i32 = 9;

/// One parsed stdin line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Overlay shortcuts, e.g. `style anchor` or `+`
    Actions(InputActions),
    Join {
        address: String,
        username: Option<String>,
    },
    Leave,
    /// Open or close the chat input
    Chat,
    /// Click the compass
    Click,
    Refresh,
    Help,
    Quit,
}

impl ConsoleInput {
    /// Parse a line outside the configuration view
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let first = words.next()?;

        let input = match first.to_ascii_lowercase().as_str() {
            "join" => ConsoleInput::Join {
                address: words.next()?.to_string(),
                username: words.next().map(str::to_string),
            },
            "leave" => ConsoleInput::Leave,
            "chat" => ConsoleInput::Chat,
            "click" => ConsoleInput::Click,
            "refresh" => ConsoleInput::Refresh,
            "help" | "?" => ConsoleInput::Help,
            "quit" | "exit" => ConsoleInput::Quit,
            _ => {
                let actions = line
                    .split_whitespace()
                    .map(InputActions::parse_action)
                    .try_fold(InputActions::empty(), |acc, a| a.map(|a| acc | a))?;
                ConsoleInput::Actions(actions)
            }
        };
        Some(input)
    }
}

pub const HELP_TEXT: &[&str] = &[
    "join <address> [username]  connect to a server",
    "leave                      disconnect",
    "toggle | + | - | style | anchor | config | shortcuts | screenshot",
    "chat                       open or close the chat input",
    "click                      click the compass",
    "refresh                    fetch votes now",
    "quit",
];

/// Host backed by the terminal
#[derive(Debug)]
pub struct ConsoleHost {
    address: Option<String>,
    chat_open: bool,
    config_open: bool,
    pending: InputActions,
    click_pending: bool,
    button_down: bool,
    frame_text: Vec<String>,
    last_shown: Vec<String>,
    outbox: Vec<String>,
}

impl ConsoleHost {
    pub fn new() -> Self {
        Self {
            address: None,
            chat_open: false,
            config_open: false,
            pending: InputActions::empty(),
            click_pending: false,
            button_down: false,
            frame_text: Vec::new(),
            last_shown: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn set_address(&mut self, address: Option<String>) {
        self.address = address;
    }

    pub fn toggle_chat(&mut self) -> bool {
        self.chat_open = !self.chat_open;
        self.chat_open
    }

    pub fn queue_actions(&mut self, actions: InputActions) {
        self.pending |= actions;
    }

    /// Press the primary button over the compass on the next frame
    pub fn queue_click(&mut self) {
        self.click_pending = true;
    }

    pub fn config_open(&self) -> bool {
        self.config_open
    }

    pub fn close_config(&mut self) {
        self.config_open = false;
    }

    pub fn say(&mut self, line: impl Into<String>) {
        self.outbox.push(line.into());
    }

    /// Prepare input state for the next frame
    pub fn begin_frame(&mut self) {
        self.button_down = std::mem::take(&mut self.click_pending);
        self.frame_text.clear();
    }

    /// Queue the overlay text if it changed since it was last shown
    pub fn end_frame(&mut self) {
        if self.frame_text != self.last_shown {
            if !self.frame_text.is_empty() {
                self.outbox.push(format!("[hud] {}", self.frame_text.join(" | ")));
            }
            self.last_shown = std::mem::take(&mut self.frame_text);
        }
    }

    /// Lines waiting to be printed
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }

    fn compass_center(&self) -> CursorPos {
        let rect = compass_rect(CONSOLE_VIEWPORT, FONT_HEIGHT, self.chat_open);
        CursorPos::new(rect.x + rect.width / 2, rect.y + rect.height / 2)
    }
}

impl Default for ConsoleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for ConsoleHost {
    fn viewport(&self) -> Viewport {
        CONSOLE_VIEWPORT
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * CHAR_WIDTH
    }

    fn font_height(&self) -> i32 {
        FONT_HEIGHT
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Argb) {}

    fn draw_border(&mut self, _rect: Rect, _color: Argb) {}

    fn draw_text(&mut self, text: &str, _x: i32, _y: i32, _color: Argb, _shadow: bool) {
        self.frame_text.push(text.to_string());
    }

    fn draw_item(&mut self, _item: &str, _x: i32, _y: i32) {}

    fn push_scale(&mut self, _scale: f32) {}

    fn pop_scale(&mut self) {}
}

impl InputProbe for ConsoleHost {
    fn pressed_actions(&mut self) -> InputActions {
        std::mem::take(&mut self.pending)
    }

    fn cursor(&self) -> CursorPos {
        if self.button_down {
            self.compass_center()
        } else {
            CursorPos::new(-1, -1)
        }
    }

    fn primary_button_down(&self) -> bool {
        self.button_down
    }
}

impl HostServices for ConsoleHost {
    fn capabilities(&self) -> HostCapabilities {
        HostCapabilities {
            can_play_cue: true,
            can_show_title: true,
            can_draw_items: false,
            can_send_chat: true,
            can_open_config_view: true,
        }
    }

    fn current_address(&self) -> Option<String> {
        self.address.clone()
    }

    fn in_world(&self) -> bool {
        self.address.is_some()
    }

    fn chat_open(&self) -> bool {
        self.chat_open
    }

    fn play_cue(&mut self) {
        self.outbox.push("\u{7}".to_string());
    }

    fn show_title(&mut self, title: &str, subtitle: &str) {
        self.outbox.push(format!("== {} ==  {}", title, subtitle));
    }

    fn open_config_view(&mut self, view: &str) -> HostResult<()> {
        self.config_open = true;
        self.outbox
            .push(format!("Editing {} settings, type `done` to close", view));
        Ok(())
    }

    fn send_chat_message(&mut self, message: &str) -> HostResult<()> {
        self.outbox.push(format!("<chat> {}", message));
        Ok(())
    }
}
