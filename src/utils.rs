use chrono::{NaiveDate, NaiveDateTime};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Accepted spellings for a local timestamp, most specific first
const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(&self) -> &'static str {
        match self {
            Profile::Dev => "dayboard-dev",
            Profile::Prod => "dayboard",
        }
    }
}

/// Get the configuration directory path.
/// The dev profile uses "dayboard-dev" instead of "dayboard".
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "dayboard", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (database, logs)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "dayboard", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a local timestamp: "YYYY-MM-DD HH:MM[:SS]", a `T` separator is also accepted
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let input = input.trim();
    let mut last_error = None;
    for format in DATETIME_INPUT_FORMATS {
        match NaiveDateTime::parse_from_str(input, format) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => last_error = Some(e),
        }
    }
    match last_error {
        Some(e) => Err(e),
        None => NaiveDateTime::parse_from_str(input, DATETIME_FORMAT),
    }
}

pub fn format_datetime(instant: NaiveDateTime) -> String {
    instant.format(DATETIME_FORMAT).to_string()
}

/// Today's date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Current local wall-clock time
pub fn now_local() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Format a currency amount with two decimals, e.g. `$12.50`.
/// Amounts that round to zero cents never carry a minus sign.
pub fn format_money(symbol: &str, amount: f64) -> String {
    let cents = (amount * 100.0).round();
    if cents < 0.0 {
        format!("-{}{:.2}", symbol, -cents / 100.0)
    } else {
        format!("{}{:.2}", symbol, cents.abs() / 100.0)
    }
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

impl ParsedKeyBinding {
    pub fn matches(&self, key: &crossterm::event::KeyEvent) -> bool {
        key.code == self.key_code && has_primary_modifier(key.modifiers) == self.requires_ctrl
    }
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display.
/// On macOS, "Ctrl+" is replaced with "Opt+".
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "n", "["), special keys ("Enter", "Left", "F1"),
/// and the Ctrl modifier ("Ctrl+s")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;

    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(number) = key_str.strip_prefix('F') {
                if let Ok(n) = number.parse::<u8>() {
                    if (1..=12).contains(&n) {
                        return Ok(KeyCode::F(n));
                    }
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn datetime_accepts_form_and_storage_spellings() {
        let expected = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap().and_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_datetime("2024-04-02 14:30").unwrap(), expected);
        assert_eq!(parse_datetime("2024-04-02 14:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-04-02T14:30").unwrap(), expected);
        assert!(parse_datetime("14:30").is_err());
    }

    #[test]
    fn money_uses_two_decimals() {
        assert_eq!(format_money("$", 35.0), "$35.00");
        assert_eq!(format_money("€", 0.1 + 0.2), "€0.30");
        assert_eq!(format_money("$", -2.5), "-$2.50");
        assert_eq!(format_money("$", -0.0), "$0.00");
        assert_eq!(format_money("$", -0.001), "$0.00");
    }

    #[test]
    fn key_bindings_parse_modifiers_and_function_keys() {
        let save = parse_key_binding("Ctrl+s").unwrap();
        assert!(save.requires_ctrl);
        assert_eq!(save.key_code, KeyCode::Char('s'));

        assert_eq!(parse_key_binding("F1").unwrap().key_code, KeyCode::F(1));
        assert_eq!(parse_key_binding("[").unwrap().key_code, KeyCode::Char('['));
        assert!(parse_key_binding("Hyper+x").is_err());
    }

    #[test]
    fn binding_without_ctrl_rejects_ctrl_press() {
        let quit = parse_key_binding("q").unwrap();
        assert!(quit.matches(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!quit.matches(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)));
    }
}
