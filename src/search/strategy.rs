//! The fixed roster of strategies
//!
//! Each strategy pairs a backward (packing) search type with a forward one.
//! The roster order is also the order in which a single worker tries them.

use crate::search::config::SearchType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Strategy {
    pub const ROSTER: [Strategy; 8] = [
        Strategy::A,
        Strategy::B,
        Strategy::C,
        Strategy::D,
        Strategy::E,
        Strategy::F,
        Strategy::G,
        Strategy::H,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Strategy> {
        Self::ROSTER.get(index).copied()
    }

    pub fn letter(self) -> char {
        (b'A' + self as u8) as char
    }

    pub fn backward(self) -> SearchType {
        match self {
            Strategy::A => SearchType::Base,
            Strategy::B => SearchType::MaxDist2,
            Strategy::C => SearchType::Girl,
            Strategy::D => SearchType::Hf,
            Strategy::E => SearchType::Bicon,
            Strategy::F => SearchType::MaxDist,
            Strategy::G => SearchType::Rev,
            Strategy::H => SearchType::Dragonfly,
        }
    }

    pub fn forward(self) -> SearchType {
        match self {
            Strategy::A => SearchType::ForwardWithBases,
            Strategy::B | Strategy::D | Strategy::E | Strategy::F => SearchType::Hf,
            Strategy::C => SearchType::Girl,
            Strategy::G => SearchType::Rev,
            Strategy::H => SearchType::Naive,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let parsed = match (chars.next(), chars.next()) {
            (Some(c @ 'A'..='H'), None) => Strategy::from_index((c as u8 - b'A') as usize),
            (Some(c @ 'a'..='h'), None) => Strategy::from_index((c as u8 - b'a') as usize),
            (Some(c @ '0'..='7'), None) => Strategy::from_index((c as u8 - b'0') as usize),
            _ => None,
        };
        parsed.ok_or_else(|| {
            format!(
                "Unknown strategy: '{}'. Valid options: A-H or 0-7",
                s
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_order_and_letters() {
        let letters: String = Strategy::ROSTER.iter().map(|s| s.letter()).collect();
        assert_eq!(letters, "ABCDEFGH");
        for (i, s) in Strategy::ROSTER.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn test_strategy_table() {
        assert_eq!(Strategy::A.backward(), SearchType::Base);
        assert_eq!(Strategy::A.forward(), SearchType::ForwardWithBases);
        assert_eq!(Strategy::C.forward(), SearchType::Girl);
        assert_eq!(Strategy::E.backward(), SearchType::Bicon);
        assert_eq!(Strategy::G.forward(), SearchType::Rev);
        assert_eq!(Strategy::H.backward(), SearchType::Dragonfly);
        assert_eq!(Strategy::H.forward(), SearchType::Naive);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("c".parse::<Strategy>().unwrap(), Strategy::C);
        assert_eq!("G".parse::<Strategy>().unwrap(), Strategy::G);
        assert_eq!("7".parse::<Strategy>().unwrap(), Strategy::H);
        assert!("I".parse::<Strategy>().is_err());
        assert!("AB".parse::<Strategy>().is_err());
    }
}
