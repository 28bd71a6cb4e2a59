use std::fmt;
use std::str::FromStr;

use super::error::RegistryError;

/*
    Helpers are addressed by free-form strings supplied by whoever drives the
    user. Two spellings that differ only in case name the same helper, so the
    key is case-folded once, here, and every lookup goes through it.
*/

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct HelperId(String);

impl HelperId {
    pub fn parse(raw: &str) -> Result<Self, RegistryError> {
        if raw.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        Ok(HelperId(raw.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for HelperId {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HelperId::parse(s)
    }
}

impl fmt::Display for HelperId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HelperId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folds_case() {
        let upper = HelperId::parse("Alice").unwrap();
        let lower = HelperId::parse("alice").unwrap();

        assert_eq!(upper, lower);
        assert_eq!(upper.as_str(), "alice");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(HelperId::parse(""), Err(RegistryError::EmptyId));
        assert_eq!("".parse::<HelperId>(), Err(RegistryError::EmptyId));
    }

    #[test]
    fn test_parse_keeps_whitespace() {
        let id = HelperId::parse(" Bob ").unwrap();
        assert_eq!(id.to_string(), " bob ");
    }
}
