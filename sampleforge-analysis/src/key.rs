//! Musical key data model: pitch-class root with enharmonic spelling, mode,
//! and the scored-candidate types the chroma correlator (see `chroma.rs`)
//! returns.

use std::fmt;

/// The seven natural letter names, independent of accidental.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteLetter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteLetter {
    /// Pitch class (0=C) of the natural letter, before any accidental.
    fn natural_pitch_class(self) -> i32 {
        match self {
            NoteLetter::C => 0,
            NoteLetter::D => 2,
            NoteLetter::E => 4,
            NoteLetter::F => 5,
            NoteLetter::G => 7,
            NoteLetter::A => 9,
            NoteLetter::B => 11,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            NoteLetter::C => "C",
            NoteLetter::D => "D",
            NoteLetter::E => "E",
            NoteLetter::F => "F",
            NoteLetter::G => "G",
            NoteLetter::A => "A",
            NoteLetter::B => "B",
        }
    }
}

/// Accidental modifying a `NoteLetter`, which determines its spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

/// A chromatic pitch class with an adjacent-accidental spelling.
///
/// Two `Root`s with the same `pitch_class()` but different spelling are not
/// equal (`D#` is not `Eb` for display purposes), matching spec.md's note
/// that "Root is a chromatic pitch class with an adjacent-accidental symbol
/// that determines the spelling".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Root {
    pub letter: NoteLetter,
    pub accidental: Accidental,
}

impl Root {
    pub fn new(letter: NoteLetter, accidental: Accidental) -> Self {
        Self { letter, accidental }
    }

    pub fn natural(letter: NoteLetter) -> Self {
        Self::new(letter, Accidental::Natural)
    }

    /// Pitch class in [0, 11], 0 = C, wrapping sharps/flats at the octave.
    pub fn pitch_class(&self) -> u8 {
        let pc = match self.accidental {
            Accidental::Natural => self.letter.natural_pitch_class(),
            Accidental::Sharp => self.letter.natural_pitch_class() + 1,
            Accidental::Flat => self.letter.natural_pitch_class() - 1,
        };
        pc.rem_euclid(12) as u8
    }

    /// Build a root from a raw pitch class (0=C), spelled with sharps.
    pub fn from_pitch_class_sharp(pc: u8) -> Self {
        const SHARP_SPELLING: [(NoteLetter, Accidental); 12] = [
            (NoteLetter::C, Accidental::Natural),
            (NoteLetter::C, Accidental::Sharp),
            (NoteLetter::D, Accidental::Natural),
            (NoteLetter::D, Accidental::Sharp),
            (NoteLetter::E, Accidental::Natural),
            (NoteLetter::F, Accidental::Natural),
            (NoteLetter::F, Accidental::Sharp),
            (NoteLetter::G, Accidental::Natural),
            (NoteLetter::G, Accidental::Sharp),
            (NoteLetter::A, Accidental::Natural),
            (NoteLetter::A, Accidental::Sharp),
            (NoteLetter::B, Accidental::Natural),
        ];
        let (letter, accidental) = SHARP_SPELLING[(pc % 12) as usize];
        Self::new(letter, accidental)
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self.accidental {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
        };
        write!(f, "{}{}", self.letter.as_str(), symbol)
    }
}

/// Mode of a `Key`. `Unknown` participates in the "zero key" sentinel
/// alongside `Key::root == None` (see spec.md §3 and §9's sentinel note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    Major,
    Minor,
    #[default]
    Unknown,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Major => write!(f, "major"),
            Mode::Minor => write!(f, "minor"),
            Mode::Unknown => write!(f, "unknown"),
        }
    }
}

/// A musical key: root + mode. `root: None` means "unknown" (spec.md §3's
/// "zero key"), an explicit optional rather than a reinterpreted sentinel
/// pitch class (see SPEC_FULL.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Key {
    pub root: Option<Root>,
    pub mode: Mode,
}

impl Key {
    pub fn new(root: Root, mode: Mode) -> Self {
        Self {
            root: Some(root),
            mode,
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_unknown(&self) -> bool {
        self.root.is_none()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root {
            Some(root) => write!(f, "{} {}", root, self.mode),
            None => write!(f, "unknown"),
        }
    }
}

/// A single key hypothesis with its correlation score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyGuess {
    pub key: Key,
    pub score: f32,
}

/// Best key guess plus the top-N (N=3) candidates, sorted descending by
/// score.
#[derive(Debug, Clone)]
pub struct KeyCandidates {
    pub best: KeyGuess,
    pub candidates: Vec<KeyGuess>,
}

impl KeyCandidates {
    /// Build from a full, unsorted list of 24 guesses (12 roots x 2 modes),
    /// keeping only the top 3 by descending score.
    pub(crate) fn from_guesses(mut guesses: Vec<KeyGuess>) -> Self {
        guesses.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        guesses.truncate(3);
        let best = guesses[0];
        Self {
            best,
            candidates: guesses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_class_wraps_at_octave() {
        let root = Root::new(NoteLetter::C, Accidental::Flat);
        assert_eq!(root.pitch_class(), 11); // Cb == B
        let root = Root::new(NoteLetter::B, Accidental::Sharp);
        assert_eq!(root.pitch_class(), 0); // B# == C
    }

    #[test]
    fn display_uses_spelling() {
        let sharp = Root::new(NoteLetter::D, Accidental::Sharp);
        let flat = Root::new(NoteLetter::E, Accidental::Flat);
        assert_eq!(sharp.to_string(), "D#");
        assert_eq!(flat.to_string(), "Eb");
        assert_eq!(sharp.pitch_class(), flat.pitch_class());
    }

    #[test]
    fn unknown_key_has_no_root() {
        let key = Key::unknown();
        assert!(key.is_unknown());
        assert_eq!(key.mode, Mode::Unknown);
    }

    #[test]
    fn candidates_sorted_descending_top_three() {
        let guesses = vec![
            KeyGuess {
                key: Key::new(Root::natural(NoteLetter::C), Mode::Major),
                score: 0.1,
            },
            KeyGuess {
                key: Key::new(Root::natural(NoteLetter::G), Mode::Major),
                score: 0.9,
            },
            KeyGuess {
                key: Key::new(Root::natural(NoteLetter::D), Mode::Major),
                score: 0.5,
            },
            KeyGuess {
                key: Key::new(Root::natural(NoteLetter::A), Mode::Major),
                score: 0.3,
            },
        ];
        let candidates = KeyCandidates::from_guesses(guesses);
        assert_eq!(candidates.candidates.len(), 3);
        assert_eq!(candidates.best.score, 0.9);
        assert!(candidates.candidates[0].score >= candidates.candidates[1].score);
        assert!(candidates.candidates[1].score >= candidates.candidates[2].score);
    }
}
