//! Player registration flow: a text-entry state machine that collects the
//! player count (1-4) and one non-empty name per slot. Pure Rust; the browser
//! layer feeds it [`Key`] events and renders whatever prompt/buffer it holds.

use crate::game::sim::{MAX_PLAYERS, Roster};

/// Discrete keypress as seen by the setup / instruction screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Enter,
    Backspace,
    Char(char),
    /// Anything else (arrows, modifiers); only meaningful as "any key".
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Stage {
    Count,
    Name { slot: usize, total: usize },
}

/// In-progress registration. `prompt` and `buffer` are what the screen shows;
/// invalid entries are recovered locally by swapping the prompt text.
#[derive(Clone, Debug)]
pub struct Setup {
    stage: Stage,
    prompt: String,
    buffer: String,
    names: Vec<String>,
}

impl Setup {
    pub fn new() -> Self {
        Self {
            stage: Stage::Count,
            prompt: "Enter number of players (1-4):".to_string(),
            buffer: String::new(),
            names: Vec::new(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Echo of the in-progress text entry.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Feed one keypress. Returns the completed roster once the last name is
    /// confirmed; until then registration is still in progress.
    pub fn handle_key(&mut self, key: Key) -> Option<Roster> {
        match key {
            Key::Backspace => {
                self.buffer.pop();
                None
            }
            Key::Char(c) => {
                self.buffer.push(c);
                None
            }
            Key::Enter => self.confirm(),
            Key::Other => None,
        }
    }

    fn confirm(&mut self) -> Option<Roster> {
        match self.stage {
            Stage::Count => {
                // Parse signed so "-1" counts as out of range, not gibberish.
                match self.buffer.trim().parse::<i64>() {
                    Ok(n) if (1..=MAX_PLAYERS as i64).contains(&n) => {
                        self.stage = Stage::Name { slot: 0, total: n as usize };
                        self.prompt = "Enter name for Player 1:".to_string();
                    }
                    Ok(_) => {
                        self.prompt = "Please enter a valid number between 1 and 4:".to_string();
                    }
                    Err(_) => {
                        self.prompt = "Invalid input. Enter a number (1-4):".to_string();
                    }
                }
                self.buffer.clear();
                None
            }
            Stage::Name { slot, total } => {
                // A name must be non-empty to confirm.
                if self.buffer.is_empty() {
                    return None;
                }
                self.names.push(std::mem::take(&mut self.buffer));
                if slot + 1 == total {
                    Some(Roster::new(std::mem::take(&mut self.names)))
                } else {
                    self.stage = Stage::Name { slot: slot + 1, total };
                    self.prompt = format!("Enter name for Player {}:", slot + 2);
                    None
                }
            }
        }
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(setup: &mut Setup, s: &str) -> Option<Roster> {
        let mut done = None;
        for c in s.chars() {
            done = setup.handle_key(Key::Char(c));
        }
        done.or_else(|| setup.handle_key(Key::Enter))
    }

    #[test]
    fn registers_n_players_in_entry_order_with_zero_scores() {
        for n in 1..=MAX_PLAYERS {
            let mut setup = Setup::new();
            assert!(type_str(&mut setup, &n.to_string()).is_none());
            let mut roster = None;
            for i in 0..n {
                roster = type_str(&mut setup, &format!("P{i}"));
            }
            let roster = roster.expect("roster after last name");
            let players = roster.players();
            assert_eq!(players.len(), n);
            for (i, p) in players.iter().enumerate() {
                assert_eq!(p.name, format!("P{i}"));
                assert_eq!(p.score, 0);
            }
            assert_eq!(roster.active_index(), 0);
        }
    }

    #[test]
    fn out_of_range_count_reprompts() {
        let mut setup = Setup::new();
        assert!(type_str(&mut setup, "9").is_none());
        assert_eq!(setup.prompt(), "Please enter a valid number between 1 and 4:");
        assert_eq!(setup.buffer(), "");
        assert!(type_str(&mut setup, "0").is_none());
        assert_eq!(setup.prompt(), "Please enter a valid number between 1 and 4:");
        // Negative entries parse as numbers and are out of range, not invalid.
        assert!(type_str(&mut setup, "-1").is_none());
        assert_eq!(setup.prompt(), "Please enter a valid number between 1 and 4:");
        // Recovery: a valid count moves on to names.
        assert!(type_str(&mut setup, "2").is_none());
        assert_eq!(setup.prompt(), "Enter name for Player 1:");
    }

    #[test]
    fn non_numeric_count_reprompts() {
        let mut setup = Setup::new();
        assert!(type_str(&mut setup, "abc").is_none());
        assert_eq!(setup.prompt(), "Invalid input. Enter a number (1-4):");
        assert_eq!(setup.buffer(), "");
    }

    #[test]
    fn empty_name_is_not_confirmed() {
        let mut setup = Setup::new();
        type_str(&mut setup, "1");
        assert!(setup.handle_key(Key::Enter).is_none());
        assert_eq!(setup.prompt(), "Enter name for Player 1:");
        assert!(type_str(&mut setup, "Alice").is_some());
    }

    #[test]
    fn backspace_edits_the_buffer() {
        let mut setup = Setup::new();
        setup.handle_key(Key::Char('4'));
        setup.handle_key(Key::Char('2'));
        setup.handle_key(Key::Backspace);
        assert_eq!(setup.buffer(), "4");
        assert!(setup.handle_key(Key::Enter).is_none());
        assert_eq!(setup.prompt(), "Enter name for Player 1:");
    }

    #[test]
    fn arrow_keys_are_ignored_during_setup() {
        let mut setup = Setup::new();
        setup.handle_key(Key::Other);
        assert_eq!(setup.buffer(), "");
        assert_eq!(setup.prompt(), "Enter number of players (1-4):");
    }

    #[test]
    fn second_player_prompt_names_the_slot() {
        let mut setup = Setup::new();
        type_str(&mut setup, "2");
        assert!(type_str(&mut setup, "Alice").is_none());
        assert_eq!(setup.prompt(), "Enter name for Player 2:");
        let roster = type_str(&mut setup, "Bob").expect("roster complete");
        assert_eq!(roster.players()[1].name, "Bob");
    }
}
