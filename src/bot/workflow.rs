use std::str::FromStr;

use super::{numerals::parse_score, storage::SloganTable};

/* Workflow is the admin's slogan configuration conversation.
 * It is a closed set of states and one transition function.
 * The transition is pure apart from the slogan table it is handed:
 * the Processor decides where that table lives and persists it afterwards.
 */

/* Admin session state, kept in the dialogue storage.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Idle,
    AddSloganText,
    AddSloganScore {
        slogan: String,
    },
    RemoveSlogan,
}

/* Admin panel buttons. The callback data strings are what Telegram sends back.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuButton {
    AddSlogan,
    RemoveSlogan,
    ListSlogans,
    Back,
}

impl MenuButton {
    pub const ALL: [MenuButton; 4] = [
        MenuButton::AddSlogan,
        MenuButton::RemoveSlogan,
        MenuButton::ListSlogans,
        MenuButton::Back,
    ];

    pub fn callback_data(&self) -> &'static str {
        match self {
            MenuButton::AddSlogan => "add_slogan",
            MenuButton::RemoveSlogan => "remove_slogan",
            MenuButton::ListSlogans => "list_slogan",
            MenuButton::Back => "back_main",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuButton::AddSlogan => "➕ Add slogan",
            MenuButton::RemoveSlogan => "❌ Remove slogan",
            MenuButton::ListSlogans => "📄 List slogans",
            MenuButton::Back => "🔙 Back",
        }
    }
}

impl FromStr for MenuButton {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, <Self as FromStr>::Err> {
        MenuButton::ALL
            .into_iter()
            .find(|button| button.callback_data() == s)
            .ok_or_else(|| format!("Unknown menu button: {s}"))
    }
}

/* Which keyboard goes under a reply.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Menu {
    Admin,
    Back,
}

impl Menu {
    pub fn buttons(&self) -> Vec<MenuButton> {
        match self {
            Menu::Admin => MenuButton::ALL.to_vec(),
            Menu::Back => vec![MenuButton::Back],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub menu: Option<Menu>,
}

impl Reply {
    fn new(text: impl Into<String>, menu: Option<Menu>) -> Self {
        Reply {
            text: text.into(),
            menu,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdminInput {
    Start,
    Button(MenuButton),
    // None when the admin sent something that is not text
    Text(Option<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub state: State,
    pub reply: Option<Reply>,
    // True when the slogan table was modified and must be persisted
    pub changed: bool,
}

impl Step {
    fn to(state: State, reply: Reply) -> Self {
        Step {
            state,
            reply: Some(reply),
            changed: false,
        }
    }

    fn committed(reply: Reply) -> Self {
        Step {
            state: State::Idle,
            reply: Some(reply),
            changed: true,
        }
    }
}

pub const PANEL_MESSAGE: &str = "🛠 Admin panel:";
pub const BACK_MESSAGE: &str = "🔙 Back to the admin panel.";
pub const ASK_SLOGAN_MESSAGE: &str = "✍️ Send me the slogan text:";
pub const EMPTY_SLOGAN_MESSAGE: &str = "The slogan can't be empty! ✍️ Send me the slogan text:";
pub const ASK_SCORE_MESSAGE: &str = "🔢 Send me the score for this slogan:";
pub const INVALID_SCORE_MESSAGE: &str = "❌ That's not a valid number. Send the score again:";
pub const SLOGAN_SAVED_MESSAGE: &str = "✅ Slogan saved!";
pub const ASK_REMOVE_MESSAGE: &str = "🗑 Send me the slogan text to remove:";
pub const SLOGAN_REMOVED_MESSAGE: &str = "✅ Slogan removed.";
pub const SLOGAN_NOT_FOUND_MESSAGE: &str = "🔍 Slogan not found.";
pub const NO_SLOGANS_MESSAGE: &str = "No slogans registered yet.";
pub const SLOGAN_LIST_HEADER: &str = "📄 Slogans:\n\n";

// Telegram rejects messages longer than this, counted in UTF-16 code units.
pub const MAX_MESSAGE_LENGTH: usize = 4096;
// Room kept free for the "and N more" line.
const OVERFLOW_NOTE_RESERVE: usize = 64;

fn message_length(text: &str) -> usize {
    text.encode_utf16().count()
}

/* Renders the slogan table, one "• slogan → score" line each.
 * A list too long for one message is cut short with a count of what was left out.
 */
pub fn display_slogans(slogans: &SloganTable) -> String {
    if slogans.is_empty() {
        return NO_SLOGANS_MESSAGE.to_string();
    }

    let mut text = SLOGAN_LIST_HEADER.to_string();
    let mut length = message_length(&text);
    let mut shown = 0;
    for (slogan, score) in slogans.iter() {
        let line = format!("• {slogan} → {score}\n");
        let line_length = message_length(&line);
        if length + line_length + OVERFLOW_NOTE_RESERVE > MAX_MESSAGE_LENGTH {
            break;
        }
        text.push_str(&line);
        length += line_length;
        shown += 1;
    }

    if shown < slogans.len() {
        text.push_str(&format!("… and {} more", slogans.len() - shown));
    }
    text
}

/* The single transition function of the admin workflow.
 * Buttons and /start are honoured in every state; text is interpreted by the current state.
 * Callers must have already checked that the sender is the admin.
 */
pub fn transition(state: State, input: AdminInput, slogans: &mut SloganTable) -> Step {
    match (state, input) {
        (_, AdminInput::Start) => Step::to(
            State::Idle,
            Reply::new(PANEL_MESSAGE, Some(Menu::Admin)),
        ),
        (_, AdminInput::Button(MenuButton::AddSlogan)) => Step::to(
            State::AddSloganText,
            Reply::new(ASK_SLOGAN_MESSAGE, Some(Menu::Back)),
        ),
        (_, AdminInput::Button(MenuButton::RemoveSlogan)) => Step::to(
            State::RemoveSlogan,
            Reply::new(ASK_REMOVE_MESSAGE, Some(Menu::Back)),
        ),
        (_, AdminInput::Button(MenuButton::ListSlogans)) => Step::to(
            State::Idle,
            Reply::new(display_slogans(slogans), Some(Menu::Admin)),
        ),
        (_, AdminInput::Button(MenuButton::Back)) => Step::to(
            State::Idle,
            Reply::new(BACK_MESSAGE, Some(Menu::Admin)),
        ),
        (State::Idle, AdminInput::Text(_)) => Step {
            state: State::Idle,
            reply: None,
            changed: false,
        },
        (State::AddSloganText, AdminInput::Text(text)) => {
            match text.as_deref().map(str::trim).filter(|text| !text.is_empty()) {
                Some(slogan) => Step::to(
                    State::AddSloganScore {
                        slogan: slogan.to_string(),
                    },
                    Reply::new(
                        format!("Slogan: {slogan}\n\n{ASK_SCORE_MESSAGE}"),
                        Some(Menu::Back),
                    ),
                ),
                None => Step::to(
                    State::AddSloganText,
                    Reply::new(EMPTY_SLOGAN_MESSAGE, Some(Menu::Back)),
                ),
            }
        }
        (State::AddSloganScore { slogan }, AdminInput::Text(text)) => {
            match parse_score(text.as_deref().unwrap_or_default()) {
                Ok(score) => {
                    slogans.insert(&slogan, score);
                    Step::committed(Reply::new(
                        format!("{SLOGAN_SAVED_MESSAGE}\n\n• {slogan} → {score}"),
                        Some(Menu::Admin),
                    ))
                }
                Err(_) => Step::to(
                    State::AddSloganScore { slogan },
                    Reply::new(INVALID_SCORE_MESSAGE, Some(Menu::Back)),
                ),
            }
        }
        (State::RemoveSlogan, AdminInput::Text(text)) => {
            let removed = text
                .as_deref()
                .and_then(|slogan| slogans.remove(slogan.trim()));
            match removed {
                Some(_) => {
                    Step::committed(Reply::new(SLOGAN_REMOVED_MESSAGE, Some(Menu::Admin)))
                }
                None => Step::to(
                    State::Idle,
                    Reply::new(SLOGAN_NOT_FOUND_MESSAGE, Some(Menu::Admin)),
                ),
            }
        }
    }
}
