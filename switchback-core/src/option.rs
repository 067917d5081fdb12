//! The six fixed menu options.

use std::fmt;
use std::str::FromStr;

use crate::error::SwitchbackError;

/// One entry of the interactive menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuOption {
    /// Apply every pending migration.
    Up,
    /// Revert every applied migration.
    Down,
    /// Drop all tables and indexes in the managed schema.
    Drop,
    /// Set the version marker to a user-supplied version.
    Force,
    /// Force version 0, then drop everything.
    FullReset,
    /// Leave without touching the database.
    Exit,
}

impl MenuOption {
    /// All options in menu order.
    pub const ALL: [MenuOption; 6] = [
        MenuOption::Up,
        MenuOption::Down,
        MenuOption::Drop,
        MenuOption::Force,
        MenuOption::FullReset,
        MenuOption::Exit,
    ];

    /// Label shown in the menu.
    pub fn label(self) -> &'static str {
        match self {
            MenuOption::Up => "Up - all versions",
            MenuOption::Down => "Down - all versions",
            MenuOption::Drop => "Drop - all tables/indexes",
            MenuOption::Force => "Force - specific version",
            MenuOption::FullReset => "Reset - force first version & drop all tables/indexes",
            MenuOption::Exit => "Do nothing - exit",
        }
    }

    /// Whether the option reads a version number before running.
    pub fn needs_version(self) -> bool {
        matches!(self, MenuOption::Force)
    }
}

impl fmt::Display for MenuOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MenuOption {
    type Err = SwitchbackError;

    /// Accepts the 1-based menu number, a keyword, or the exact label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let choice = s.trim();
        if let Ok(n) = choice.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| MenuOption::ALL.get(i).copied())
                .ok_or_else(|| SwitchbackError::UnknownOption(choice.to_string()));
        }
        match choice.to_lowercase().as_str() {
            "up" => Ok(MenuOption::Up),
            "down" => Ok(MenuOption::Down),
            "drop" => Ok(MenuOption::Drop),
            "force" => Ok(MenuOption::Force),
            "reset" | "full-reset" => Ok(MenuOption::FullReset),
            "exit" | "quit" | "nothing" => Ok(MenuOption::Exit),
            _ => MenuOption::ALL
                .into_iter()
                .find(|o| o.label() == choice)
                .ok_or_else(|| SwitchbackError::UnknownOption(choice.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_numbers_follow_menu_order() {
        for (i, option) in MenuOption::ALL.iter().enumerate() {
            assert_eq!((i + 1).to_string().parse::<MenuOption>().unwrap(), *option);
        }
    }

    #[test]
    fn test_out_of_range_numbers_are_rejected() {
        assert!(matches!(
            "0".parse::<MenuOption>(),
            Err(SwitchbackError::UnknownOption(_))
        ));
        assert!("7".parse::<MenuOption>().is_err());
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert_eq!(" UP ".parse::<MenuOption>().unwrap(), MenuOption::Up);
        assert_eq!("Reset".parse::<MenuOption>().unwrap(), MenuOption::FullReset);
        assert_eq!("quit".parse::<MenuOption>().unwrap(), MenuOption::Exit);
    }

    #[test]
    fn test_labels_round_trip() {
        for option in MenuOption::ALL {
            assert_eq!(option.label().parse::<MenuOption>().unwrap(), option);
        }
    }

    #[test]
    fn test_unknown_word() {
        let err = "sideways".parse::<MenuOption>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown option 'sideways'");
    }

    #[test]
    fn test_only_force_needs_version() {
        let needing: Vec<_> = MenuOption::ALL
            .into_iter()
            .filter(|o| o.needs_version())
            .collect();
        assert_eq!(needing, vec![MenuOption::Force]);
    }
}
