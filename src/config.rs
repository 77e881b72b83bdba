//! User configuration: key bindings and inspector session defaults.
//!
//! Stored as a plain `key = value` file at
//! `$XDG_CONFIG_HOME/debug-inspector/config.toml`
//! (default `~/.config/debug-inspector/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::core::{ChildKeying, SessionSettings};

// ───────────────────────────────────────── actions ───────────

/// Everything a key can be bound to in the inspector view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    Toggle,
    Expand,
    Collapse,
    Edit,
    Increment,
    Decrement,
    TogglePlaying,
    Help,
    Quit,
}

impl Action {
    /// Display order for the help popup.
    pub const ALL: &[Action] = &[
        Action::MoveUp,
        Action::MoveDown,
        Action::Toggle,
        Action::Expand,
        Action::Collapse,
        Action::Edit,
        Action::Increment,
        Action::Decrement,
        Action::TogglePlaying,
        Action::Help,
        Action::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::MoveUp => "Move Up",
            Action::MoveDown => "Move Down",
            Action::Toggle => "Toggle / Cycle",
            Action::Expand => "Expand",
            Action::Collapse => "Collapse / Parent",
            Action::Edit => "Edit Value",
            Action::Increment => "Increment",
            Action::Decrement => "Decrement",
            Action::TogglePlaying => "Play / Pause World",
            Action::Help => "Show Controls",
            Action::Quit => "Quit",
        }
    }

    fn config_key(self) -> &'static str {
        match self {
            Action::MoveUp => "move_up",
            Action::MoveDown => "move_down",
            Action::Toggle => "toggle",
            Action::Expand => "expand",
            Action::Collapse => "collapse",
            Action::Edit => "edit",
            Action::Increment => "increment",
            Action::Decrement => "decrement",
            Action::TogglePlaying => "toggle_playing",
            Action::Help => "help",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// Key code plus modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Compares CTRL/ALT/SHIFT only. Shifted punctuation (`+`, `?`) is
    /// reported with SHIFT by some terminals and without by others, so
    /// SHIFT is ignored for character keys bound without it.
    pub fn matches(&self, event: KeyEvent) -> bool {
        if self.code != event.code {
            return false;
        }
        let mut theirs = event.modifiers & MODIFIER_MASK;
        if matches!(self.code, KeyCode::Char(_)) && !self.modifiers.contains(KeyModifiers::SHIFT) {
            theirs.remove(KeyModifiers::SHIFT);
        }
        (self.modifiers & MODIFIER_MASK) == theirs
    }

    /// Short form for the status bar and help popup (`"Ctrl+c"`, `"↑"`).
    pub fn display(&self) -> String {
        self.render(true)
    }

    /// Form written to the config file (`"Ctrl+c"`, `"Up"`).
    fn to_config_string(&self) -> String {
        self.render(false)
    }

    fn render(&self, pretty: bool) -> String {
        let mut s = String::new();
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl+"),
            (KeyModifiers::ALT, "Alt+"),
            (KeyModifiers::SHIFT, "Shift+"),
        ] {
            if self.modifiers.contains(flag) {
                s.push_str(name);
            }
        }
        let key = match (self.code, pretty) {
            (KeyCode::Char(' '), _) => "Space".into(),
            (KeyCode::Char(c), _) => c.to_string(),
            (KeyCode::Up, true) => "↑".into(),
            (KeyCode::Down, true) => "↓".into(),
            (KeyCode::Left, true) => "←".into(),
            (KeyCode::Right, true) => "→".into(),
            (KeyCode::Backspace, true) => "Bksp".into(),
            (KeyCode::PageUp, true) => "PgUp".into(),
            (KeyCode::PageDown, true) => "PgDn".into(),
            (KeyCode::F(n), _) => format!("F{n}"),
            (other, _) => format!("{other:?}"),
        };
        s.push_str(&key);
        s
    }

    /// Parse `"Ctrl+c"`, `"Alt+Up"`, `"q"`, `"Enter"`, `"F5"`.
    fn parse(s: &str) -> Option<Self> {
        let (mods, key) = match s.rsplit_once('+') {
            // a bare "+" or "Ctrl++" binds the plus key itself
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let lower = key.to_ascii_lowercase();
        let code = match lower.as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            "backspace" | "bksp" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            f if f.len() > 1 && f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
            _ => {
                let mut chars = key.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(c)
            }
        };

        Some(KeyBind { code, modifiers })
    }
}

// ───────────────────────────────────────── config ────────────

/// Key bindings plus the inspector session defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Key foldout children by member name instead of arrival order.
    pub structural_keys: bool,
    /// Forget foldout state of roots not drawn for this many frames.
    pub evict_after: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            structural_keys: false,
            evict_after: None,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use Action::*;
        use KeyCode::*;
        let n = KeyModifiers::NONE;

        HashMap::from([
            (MoveUp, vec![KeyBind::new(Up, n), KeyBind::new(Char('k'), n)]),
            (MoveDown, vec![KeyBind::new(Down, n), KeyBind::new(Char('j'), n)]),
            (Toggle, vec![KeyBind::new(Char(' '), n)]),
            (Expand, vec![KeyBind::new(Right, n), KeyBind::new(Char('l'), n)]),
            (Collapse, vec![KeyBind::new(Left, n), KeyBind::new(Char('h'), n)]),
            (Edit, vec![KeyBind::new(Enter, n), KeyBind::new(Char('e'), n)]),
            (Increment, vec![KeyBind::new(Char('+'), n), KeyBind::new(Char('='), n)]),
            (Decrement, vec![KeyBind::new(Char('-'), n)]),
            (TogglePlaying, vec![KeyBind::new(Char('p'), n)]),
            (Help, vec![KeyBind::new(Char('?'), n)]),
            (Quit, vec![KeyBind::new(Char('q'), n)]),
        ])
    }

    /// Action bound to a key event. The binding with the most modifiers
    /// wins when several match.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    /// All bindings of an action, e.g. `"↑/k"`.
    pub fn display_bindings(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => {
                binds.iter().map(KeyBind::display).collect::<Vec<_>>().join("/")
            }
            _ => "unbound".into(),
        }
    }

    fn short_binding(&self, action: Action) -> String {
        self.bindings
            .get(&action)
            .and_then(|binds| binds.first())
            .map(KeyBind::display)
            .unwrap_or_else(|| "?".into())
    }

    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}: fold | {}: edit | {}: play/pause | {}: help",
            self.short_binding(Action::Toggle),
            self.short_binding(Action::Edit),
            self.short_binding(Action::TogglePlaying),
            self.short_binding(Action::Help),
        )
    }

    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            keying: if self.structural_keys {
                ChildKeying::Structural
            } else {
                ChildKeying::Positional
            },
            evict_after: self.evict_after,
        }
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load the config file, falling back to defaults when it is missing
    /// or unreadable.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                debug!(path = %path.display(), "loaded config");
                Self::parse_config(&contents)
            }
            Err(err) => {
                debug!(path = %path.display(), %err, "no config file, using defaults");
                Self::default()
            }
        }
    }

    /// Write the config to its default location and return that path.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        std::fs::write(path, self.serialise()).with_context(|| format!("cannot write {}", path.display()))?;
        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    fn parse_config(s: &str) -> Self {
        let mut config = Self::default();

        for (lineno, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!(line = lineno + 1, "config line without '='");
                continue;
            };
            let (key, value) = (key.trim(), value.trim().trim_matches('"'));

            match key {
                "structural_keys" => config.structural_keys = value == "true",
                "evict_after" => {
                    config.evict_after = match value {
                        "off" | "never" | "0" => None,
                        n => match n.parse::<u64>() {
                            Ok(frames) => Some(frames),
                            Err(_) => {
                                warn!(line = lineno + 1, value, "evict_after is not a frame count");
                                None
                            }
                        },
                    }
                }
                _ => match Action::from_config_key(key) {
                    Some(action) => {
                        let parsed: Vec<KeyBind> = value
                            .split(',')
                            .map(|p| p.trim().trim_matches('"'))
                            .filter_map(KeyBind::parse)
                            .collect();
                        if !parsed.is_empty() {
                            config.bindings.insert(action, parsed);
                        }
                    }
                    None => warn!(line = lineno + 1, key, "unknown config key"),
                },
            }
        }

        config
    }

    fn serialise(&self) -> String {
        let mut out = String::from("# debug-inspector configuration\n\n# Inspector\n");
        out.push_str(&format!("structural_keys = {}\n", self.structural_keys));
        match self.evict_after {
            Some(frames) => out.push_str(&format!("evict_after = {frames}\n")),
            None => out.push_str("evict_after = off\n"),
        }
        out.push_str(
            "\n# Key bindings: action = Key1, Key2\n\
             # Modifiers: Ctrl+, Alt+, Shift+\n\
             # Special keys: Up, Down, Left, Right, Enter, Esc, Tab, Space,\n\
             #   Backspace, Delete, Home, End, PageUp, PageDown, F1-F12\n",
        );
        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(KeyBind::to_config_string).collect();
                out.push_str(&format!("{} = {}\n", action.config_key(), keys.join(", ")));
            }
        }
        out
    }
}

/// `$XDG_CONFIG_HOME/debug-inspector/config.toml`.
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("debug-inspector").join("config.toml")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[rstest]
    #[case("q", KeyCode::Char('q'), KeyModifiers::NONE)]
    #[case("Ctrl+c", KeyCode::Char('c'), KeyModifiers::CONTROL)]
    #[case("alt+UP", KeyCode::Up, KeyModifiers::ALT)]
    #[case("Space", KeyCode::Char(' '), KeyModifiers::NONE)]
    #[case("+", KeyCode::Char('+'), KeyModifiers::NONE)]
    #[case("Ctrl++", KeyCode::Char('+'), KeyModifiers::CONTROL)]
    #[case("F5", KeyCode::F(5), KeyModifiers::NONE)]
    fn parses_key_strings(#[case] text: &str, #[case] code: KeyCode, #[case] modifiers: KeyModifiers) {
        assert_eq!(KeyBind::parse(text), Some(KeyBind::new(code, modifiers)));
    }

    #[rstest]
    #[case("Hyper+x")]
    #[case("xy")]
    #[case("")]
    fn rejects_garbage(#[case] text: &str) {
        assert_eq!(KeyBind::parse(text), None);
    }

    #[test]
    fn display_and_config_forms_differ_for_arrows() {
        let bind = KeyBind::new(KeyCode::Up, KeyModifiers::ALT);
        assert_eq!(bind.display(), "Alt+↑");
        assert_eq!(bind.to_config_string(), "Alt+Up");
    }

    #[test]
    fn shifted_punctuation_still_matches() {
        let config = AppConfig::default();
        assert_eq!(
            config.match_key(key(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Action::Increment)
        );
        assert_eq!(
            config.match_key(key(KeyCode::Char('?'), KeyModifiers::NONE)),
            Some(Action::Help)
        );
    }

    #[test]
    fn parse_overrides_and_keeps_defaults() {
        let config = AppConfig::parse_config(
            "# comment\n\
             structural_keys = true\n\
             evict_after = 120\n\
             quit = Ctrl+q, Esc\n\
             bogus = x\n",
        );
        assert!(config.structural_keys);
        assert_eq!(config.evict_after, Some(120));
        assert_eq!(
            config.match_key(key(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(config.match_key(key(KeyCode::Char('q'), KeyModifiers::NONE)), None);
        assert_eq!(
            config.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::MoveDown)
        );

        let settings = config.session_settings();
        assert_eq!(settings.keying, ChildKeying::Structural);
        assert_eq!(settings.evict_after, Some(120));
    }

    #[test]
    fn serialised_config_parses_back() {
        let mut config = AppConfig::default();
        config.evict_after = Some(30);
        config
            .bindings
            .entry(Action::Toggle)
            .or_default()
            .push(KeyBind::new(KeyCode::Tab, KeyModifiers::NONE));

        let reparsed = AppConfig::parse_config(&config.serialise());
        assert_eq!(reparsed.evict_after, Some(30));
        assert!(!reparsed.structural_keys);
        assert_eq!(reparsed.display_bindings(Action::Toggle), "Space/Tab");
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = std::env::temp_dir().join(format!("debug-inspector-config-{}", std::process::id()));
        let path = dir.join("nested").join("config.toml");
        let mut config = AppConfig::default();
        config.structural_keys = true;

        config.save_to(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let reparsed = AppConfig::parse_config(&contents);
        assert!(reparsed.structural_keys);
        assert_eq!(reparsed.evict_after, None);
    }
}
