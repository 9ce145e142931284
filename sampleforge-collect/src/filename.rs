//! Filename tokenizer (C5): parent-directory drum hints, melodic keyword
//! scan, and basename tokenization for tempo/key extraction.

use crate::sample::{DrumType, SampleType};
use regex::Regex;
use sampleforge_analysis::{Accidental, Key, Mode, NoteLetter, Root};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Evidence the tokenizer can contribute before any audio or MIDI bytes
/// are touched (spec.md §4.5).
#[derive(Debug, Clone, Default)]
pub struct FilenameHints {
    pub types: HashSet<SampleType>,
    pub drum_type: Option<DrumType>,
    /// 0 = unset.
    pub tempo: u32,
    pub key: Key,
}

fn drum_dir_lookup(segment: &str) -> Option<DrumType> {
    match segment {
        "snare" | "snares" => Some(DrumType::Snare),
        "kick" | "kicks" => Some(DrumType::Kick),
        "hat" | "hats" | "hihat" | "hi-hat" | "hihats" => Some(DrumType::HiHat),
        "closed_hihats" => Some(DrumType::HatClosed),
        "open_hihats" => Some(DrumType::HatOpen),
        "808" | "808s" => Some(DrumType::Drum808),
        "toms" => Some(DrumType::Tom),
        _ => None,
    }
}

const MELODIC_KEYWORDS: [&str; 22] = [
    "chord", "synth", "pad", "arp", "piano", "organ", "guitar", "bass", "lead", "key", "string",
    "brass", "woodwind", "flute", "trumpet", "sax", "horn", "violin", "cello", "harp", "vocal",
    "marimba",
];

/// The last path segment before the basename, lowercased, spaces folded to
/// underscores. Empty if the path has fewer than two segments.
fn parent_dir_segment(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() < 2 {
        return String::new();
    }
    segments[segments.len() - 2]
        .trim()
        .to_lowercase()
        .replace(' ', "_")
}

/// Split `name` on the first separator found, in priority `-`, `_`, `" - "`,
/// falling back to a plain space.
fn guess_separator_split(name: &str) -> Vec<String> {
    let seps = ["-", "_", " - "];
    let mut sep = " ";
    for s in seps {
        if name.contains(s) {
            sep = s;
        }
    }
    name.split(sep).map(|s| s.to_string()).collect()
}

/// `guessBPM`: returns the token parsed as an integer only when the *whole*
/// token is purely ASCII digits. A token like `"140bpm"` fails `Atoi` in the
/// original and so returns 0 rather than scanning out the leading digits —
/// a quirk spec.md's design notes call out to preserve rather than fix.
fn parse_bpm_token(token: &str) -> u32 {
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        token.parse().unwrap_or(0)
    } else {
        0
    }
}

struct KeySignalRegexes {
    flat_in: Regex,
    flat_begin: Regex,
    sharp_begin: Regex,
    sharp_in: Regex,
    flattish_in: Regex,
    sharpish_in: Regex,
}

fn key_signal_regexes() -> &'static KeySignalRegexes {
    static REGEXES: OnceLock<KeySignalRegexes> = OnceLock::new();
    REGEXES.get_or_init(|| KeySignalRegexes {
        flat_in: Regex::new("^F|[\u{266D}b]").unwrap(),
        flat_begin: Regex::new("^[\u{266D}b]").unwrap(),
        sharp_begin: Regex::new("^[\u{266F}#]").unwrap(),
        sharp_in: Regex::new("[\u{266F}#]|major").unwrap(),
        flattish_in: Regex::new("([^a-z]|^)(m|min|minor|dim)").unwrap(),
        sharpish_in: Regex::new("(maj|major|aug)").unwrap(),
    })
}

/// A token's first character must be a bare root letter, and the full
/// token (original case) must match at least one accidental/mode signal.
fn has_key_signal(first_char: char, opiece: &str) -> bool {
    if !matches!(first_char, 'C' | 'D' | 'E' | 'F' | 'G' | 'A' | 'B') {
        return false;
    }
    let rgx = key_signal_regexes();
    rgx.flat_in.is_match(opiece)
        || rgx.flat_begin.is_match(opiece)
        || rgx.sharp_begin.is_match(opiece)
        || rgx.sharp_in.is_match(opiece)
        || rgx.flattish_in.is_match(opiece)
        || rgx.sharpish_in.is_match(opiece)
}

/// Parse a key expression like `"Amin"`, `"C#maj"`, `"Bb"`, `"Gdim"`. The
/// root must be a bare uppercase letter; an optional accidental (`#`/`b`)
/// follows, then an optional mode suffix. No mode suffix, or an explicit
/// `maj`/`major`/`aug`, means Major; `m`/`min`/`minor`/`dim` means Minor.
fn parse_key_expression(token: &str) -> Option<Key> {
    let mut chars = token.chars();
    let letter = match chars.next()? {
        'C' => NoteLetter::C,
        'D' => NoteLetter::D,
        'E' => NoteLetter::E,
        'F' => NoteLetter::F,
        'G' => NoteLetter::G,
        'A' => NoteLetter::A,
        'B' => NoteLetter::B,
        _ => return None,
    };
    let rest = chars.as_str();
    let mut rest_chars = rest.chars();
    let (accidental, remainder) = match rest_chars.next() {
        Some('#') | Some('\u{266F}') => (Accidental::Sharp, rest_chars.as_str()),
        Some('b') | Some('\u{266D}') => (Accidental::Flat, rest_chars.as_str()),
        _ => (Accidental::Natural, rest),
    };
    let remainder_lower = remainder.to_lowercase();
    let mode = if remainder_lower.contains("min") || remainder_lower.contains("dim") || remainder_lower == "m" {
        Mode::Minor
    } else {
        Mode::Major
    };
    Some(Key::new(Root::new(letter, accidental), mode))
}

/// Tokenize `path`/`name` into filename-derived evidence (spec.md §4.5).
/// `name` keeps its original case and extension so key-expression matching
/// and separator detection see what the file was actually named; `path`
/// supplies the parent-directory hint.
pub fn parse_filename(path: &str, name: &str) -> FilenameHints {
    let mut hints = FilenameHints::default();

    let parent_dir = parent_dir_segment(path);
    let candidates: Vec<&str> = if parent_dir.contains('_') {
        parent_dir.split('_').collect()
    } else {
        vec![parent_dir.as_str()]
    };
    for candidate in candidates {
        if let Some(drum) = drum_dir_lookup(candidate) {
            hints.types.insert(SampleType::Drum);
            hints.drum_type = Some(drum);
            break;
        }
    }
    if parent_dir.contains("melod") {
        hints.types.insert(SampleType::Melodic);
    }

    let fname_lower = name.to_lowercase();
    if parent_dir.contains("loop") || fname_lower.contains("bpm") {
        hints.types.insert(SampleType::Loop);
    }
    for keyword in MELODIC_KEYWORDS {
        if fname_lower.contains(keyword) {
            hints.types.insert(SampleType::Melodic);
            break;
        }
    }

    let opieces = guess_separator_split(name);

    let mut fallback: Option<&str> = None;
    for opiece in &opieces {
        let trimmed = opiece.strip_suffix(".wav").unwrap_or(opiece);
        if matches!(trimmed.trim(), "C" | "D" | "E" | "F" | "G" | "A" | "B") {
            fallback = Some(trimmed.trim());
        }
    }

    let mut key_found = false;
    for opiece in &opieces {
        let trimmed = opiece.strip_suffix(".wav").unwrap_or(opiece);
        let piece_lower = trimmed.to_lowercase();

        if piece_lower.chars().all(|c| c.is_ascii_digit()) && !piece_lower.is_empty() {
            if let Ok(num) = piece_lower.parse::<u32>() {
                if num > 50 && num != 808 {
                    hints.tempo = num;
                }
            }
        }
        if piece_lower.contains("bpm") {
            hints.tempo = parse_bpm_token(&piece_lower);
        }

        if trimmed.chars().count() > 6 || trimmed.is_empty() {
            continue;
        }
        let first_char = match trimmed.chars().next() {
            Some(c) => c,
            None => continue,
        };
        if !has_key_signal(first_char, trimmed) {
            continue;
        }

        if !hints.key.is_unknown() {
            key_found = true;
            continue;
        }
        if let Some(parsed) = parse_key_expression(trimmed) {
            hints.key = parsed;
            key_found = true;
        }
    }

    if !key_found {
        if let Some(letter) = fallback {
            if let Some(parsed) = parse_key_expression(letter) {
                hints.key = parsed;
            }
        }
    }

    hints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_dir_808_bass() {
        assert_eq!(
            parent_dir_segment("/home/user/808_Bass/OS_BB_808_E_RARRI.wav"),
            "808_bass"
        );
    }

    #[test]
    fn parent_dir_snares() {
        assert_eq!(parent_dir_segment("/samples/Snares/snare_crack_01.wav"), "snares");
    }

    #[test]
    fn parent_dir_kicks() {
        assert_eq!(parent_dir_segment("/samples/Kicks/kick_sub_808.wav"), "kicks");
    }

    #[test]
    fn guess_bpm_table() {
        assert_eq!(parse_bpm_token("140bpm"), 0);
        assert_eq!(parse_bpm_token("os_140_loop"), 0);
        assert_eq!(parse_bpm_token("90bpm_kick"), 0);
        assert_eq!(parse_bpm_token("notanumber"), 0);
        assert_eq!(parse_bpm_token("120"), 120);
    }

    #[test]
    fn tempo_bpm_token_resets_to_zero() {
        let hints = parse_filename("/samples/loop_140bpm_Amin.wav", "loop_140bpm_Amin.wav");
        assert_eq!(hints.tempo, 0);
        assert_eq!(hints.key.root.unwrap().letter, NoteLetter::A);
        assert_eq!(hints.key.mode, Mode::Minor);
    }

    #[test]
    fn tempo_plain_numeric_token() {
        let hints = parse_filename("/samples/hat_120_open.wav", "hat_120_open.wav");
        assert_eq!(hints.tempo, 120);
    }

    #[test]
    fn tempo_absent_stays_zero() {
        let hints = parse_filename("/samples/sample_no_tempo.wav", "sample_no_tempo.wav");
        assert_eq!(hints.tempo, 0);
    }

    #[test]
    fn drum_type_from_parent_dir() {
        let hints = parse_filename("/samples/HiHats/hat_open.wav", "hat_open.wav");
        assert!(hints.types.contains(&SampleType::Drum));
        assert_eq!(hints.drum_type, Some(DrumType::HiHat));
    }

    #[test]
    fn token_808_is_never_tempo() {
        let hints = parse_filename("/samples/Kicks/kick_sub_808.wav", "kick_sub_808.wav");
        assert_eq!(hints.drum_type, Some(DrumType::Kick));
        assert_eq!(hints.tempo, 0);
    }

    #[test]
    fn melodic_keyword_without_drum_dir() {
        let hints = parse_filename("/samples/Melodic/pad_Cmaj.wav", "pad_Cmaj.wav");
        assert!(!hints.types.contains(&SampleType::Drum));
        assert!(hints.types.contains(&SampleType::Melodic));
    }

    #[test]
    fn bare_letter_fallback_key() {
        let hints = parse_filename("/samples/loop - A - 120.wav", "loop - A - 120.wav");
        assert_eq!(hints.key.root.unwrap().letter, NoteLetter::A);
        assert_eq!(hints.key.mode, Mode::Major);
    }
}
