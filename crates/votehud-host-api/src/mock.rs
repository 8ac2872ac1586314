//! Mock host for testing

use crate::{
    Argb, CursorPos, HostCapabilities, HostError, HostResult, HostServices, InputActions,
    InputProbe, Rect, Surface, Viewport,
};

/// Advance of one character in the mock font
pub const MOCK_CHAR_WIDTH: i32 = 6;

/// Height of the mock font
pub const MOCK_FONT_HEIGHT: i32 = 9;

/// One recorded draw call, with the scale in effect when it was made
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill {
        rect: Rect,
        color: Argb,
        scale: f32,
    },
    Border {
        rect: Rect,
        color: Argb,
        scale: f32,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        color: Argb,
        shadow: bool,
        scale: f32,
    },
    Item {
        item: String,
        x: i32,
        y: i32,
        scale: f32,
    },
}

/// One recorded side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Cue,
    Title { title: String, subtitle: String },
    ConfigView(String),
    Chat(String),
}

/// Scriptable host that records everything the engine does to it
#[derive(Debug, Clone)]
pub struct MockHost {
    pub viewport: Viewport,
    pub capabilities: HostCapabilities,
    pub address: Option<String>,
    pub in_world: bool,
    pub chat_open: bool,
    pub cursor: CursorPos,
    pub button_down: bool,

    /// Make `send_chat_message` fail
    pub fail_chat: bool,

    pending: InputActions,
    commands: Vec<DrawCommand>,
    effects: Vec<SideEffect>,
    scale_stack: Vec<f32>,
}

impl MockHost {
    /// In a world on a recognized server, 800x600, every capability
    pub fn new() -> Self {
        Self {
            viewport: Viewport::new(800, 600),
            capabilities: HostCapabilities::full(),
            address: Some("play.excalia.fr:25565".into()),
            in_world: true,
            chat_open: false,
            cursor: CursorPos::default(),
            button_down: false,
            fail_chat: false,
            pending: InputActions::empty(),
            commands: Vec::new(),
            effects: Vec::new(),
            scale_stack: Vec::new(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Queue actions for the next `pressed_actions` call
    pub fn press(&mut self, actions: InputActions) {
        self.pending |= actions;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn effects(&self) -> &[SideEffect] {
        &self.effects
    }

    /// Text of every recorded text draw, in order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Recorded draw for the first text containing `needle`
    pub fn find_text(&self, needle: &str) -> Option<&DrawCommand> {
        self.commands
            .iter()
            .find(|c| matches!(c, DrawCommand::Text { text, .. } if text.contains(needle)))
    }

    /// Forget recorded draw calls, keeping side effects
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn clear_effects(&mut self) {
        self.effects.clear();
    }

    /// Depth of unbalanced `push_scale` calls
    pub fn scale_depth(&self) -> usize {
        self.scale_stack.len()
    }

    fn current_scale(&self) -> f32 {
        self.scale_stack.iter().product()
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for MockHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn text_width(&self, text: &str) -> i32 {
        text.chars().count() as i32 * MOCK_CHAR_WIDTH
    }

    fn font_height(&self) -> i32 {
        MOCK_FONT_HEIGHT
    }

    fn fill_rect(&mut self, rect: Rect, color: Argb) {
        let scale = self.current_scale();
        self.commands.push(DrawCommand::Fill { rect, color, scale });
    }

    fn draw_border(&mut self, rect: Rect, color: Argb) {
        let scale = self.current_scale();
        self.commands.push(DrawCommand::Border { rect, color, scale });
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Argb, shadow: bool) {
        let scale = self.current_scale();
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            x,
            y,
            color,
            shadow,
            scale,
        });
    }

    fn draw_item(&mut self, item: &str, x: i32, y: i32) {
        let scale = self.current_scale();
        self.commands.push(DrawCommand::Item {
            item: item.to_string(),
            x,
            y,
            scale,
        });
    }

    fn push_scale(&mut self, scale: f32) {
        self.scale_stack.push(scale);
    }

    fn pop_scale(&mut self) {
        self.scale_stack.pop();
    }
}

impl InputProbe for MockHost {
    fn pressed_actions(&mut self) -> InputActions {
        std::mem::take(&mut self.pending)
    }

    fn cursor(&self) -> CursorPos {
        self.cursor
    }

    fn primary_button_down(&self) -> bool {
        self.button_down
    }
}

impl HostServices for MockHost {
    fn capabilities(&self) -> HostCapabilities {
        self.capabilities
    }

    fn current_address(&self) -> Option<String> {
        self.address.clone()
    }

    fn in_world(&self) -> bool {
        self.in_world
    }

    fn chat_open(&self) -> bool {
        self.chat_open
    }

    fn play_cue(&mut self) {
        self.effects.push(SideEffect::Cue);
    }

    fn show_title(&mut self, title: &str, subtitle: &str) {
        self.effects.push(SideEffect::Title {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        });
    }

    fn open_config_view(&mut self, view: &str) -> HostResult<()> {
        if !self.capabilities.can_open_config_view {
            return Err(HostError::Unsupported("configuration view"));
        }
        self.effects.push(SideEffect::ConfigView(view.to_string()));
        Ok(())
    }

    fn send_chat_message(&mut self, message: &str) -> HostResult<()> {
        if self.fail_chat {
            return Err(HostError::Failed("chat unavailable".into()));
        }
        self.effects.push(SideEffect::Chat(message.to_string()));
        Ok(())
    }
}
