/// Commands the running pipeline responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Save,
    Clear,
    ToggleEdges,
    ToggleBlur,
    ToggleMotion,
}

/// Key bindings, in the order they are listed to the user
pub const CONTROLS: [(char, Command, &str); 6] = [
    ('q', Command::Quit, "Quit Application"),
    ('s', Command::Save, "Save Current Frame"),
    ('0', Command::Clear, "Clear processors"),
    ('1', Command::ToggleEdges, "Edge Detection"),
    ('2', Command::ToggleBlur, "Blur Filter"),
    ('3', Command::ToggleMotion, "Motion Detection"),
];

/// Escape quits as well, the way window viewers usually close
pub const ESCAPE: char = '\u{1b}';

impl Command {
    /// Map a pressed key to its command. Unbound keys yield `None`.
    pub fn from_key(key: char) -> Option<Self> {
        if key == ESCAPE {
            return Some(Command::Quit);
        }
        let key = key.to_ascii_lowercase();
        CONTROLS
            .iter()
            .find(|(bound, _, _)| *bound == key)
            .map(|(_, command, _)| *command)
    }
}

/// Multi-line help text listing every binding
pub fn controls_help() -> String {
    let mut help = String::from("Controls:\n");
    for (key, _, label) in CONTROLS {
        help.push_str(&format!("  {} - {}\n", key, label));
    }
    help
}
