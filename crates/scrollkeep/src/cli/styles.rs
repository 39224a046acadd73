use console::Style;
use once_cell::sync::Lazy;

/// Named styles shared by every renderer.
pub struct Styles {
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub section: Style,
    pub done: Style,
    pub file: Style,
    pub muted: Style,
}

pub static STYLES: Lazy<Styles> = Lazy::new(|| Styles {
    info: Style::new().dim(),
    success: Style::new().green(),
    warning: Style::new().yellow(),
    error: Style::new().red().bold(),
    section: Style::new().bold(),
    done: Style::new().dim().strikethrough(),
    file: Style::new().cyan(),
    muted: Style::new().color256(246),
});

pub const CHECK_DONE: &str = "[x]";
pub const CHECK_OPEN: &str = "[ ]";
pub const FILE_BULLET: &str = " - ";
pub const INDENT: &str = "  ";
