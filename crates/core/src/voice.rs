//! Fixed catalog of synthesizer voices offered in the voice picker.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceOption {
    pub name: &'static str,
    pub voice_id: &'static str,
}

// Rachel and Bella share an identifier upstream. Kept as-is; the service warns
// about it at startup via `duplicate_voice_ids`.
pub static VOICE_CATALOG: [VoiceOption; 5] = [
    VoiceOption {
        name: "Rachel (Default)",
        voice_id: "EXAVITQu4vr4xnSDxMaL",
    },
    VoiceOption {
        name: "Domi",
        voice_id: "AZnzlk1XvdvUeBnXmlld",
    },
    VoiceOption {
        name: "Bella",
        voice_id: "EXAVITQu4vr4xnSDxMaL",
    },
    VoiceOption {
        name: "Antoni",
        voice_id: "ErXwobaYiN019PkySvjV",
    },
    VoiceOption {
        name: "Elli",
        voice_id: "MF3mGyEYCl7XYWbV9V6O",
    },
];

pub fn default_voice() -> &'static VoiceOption {
    &VOICE_CATALOG[0]
}

pub fn voice_at(index: usize) -> Option<&'static VoiceOption> {
    VOICE_CATALOG.get(index)
}

/// Case-insensitive lookup by display name.
pub fn find_voice(name: &str) -> Option<&'static VoiceOption> {
    let name = name.trim();
    VOICE_CATALOG
        .iter()
        .find(|voice| voice.name.eq_ignore_ascii_case(name))
}

/// Identifiers used by more than one catalog entry, with the names sharing them.
pub fn duplicate_voice_ids() -> Vec<(&'static str, Vec<&'static str>)> {
    let mut by_id: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
    for voice in &VOICE_CATALOG {
        by_id.entry(voice.voice_id).or_default().push(voice.name);
    }
    by_id.into_iter().filter(|(_, names)| names.len() > 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_five_voices_with_rachel_first() {
        assert_eq!(VOICE_CATALOG.len(), 5);
        assert_eq!(default_voice().name, "Rachel (Default)");
        assert_eq!(default_voice().voice_id, "EXAVITQu4vr4xnSDxMaL");
    }

    #[test]
    fn test_find_voice_ignores_case() {
        assert_eq!(find_voice("antoni").unwrap().voice_id, "ErXwobaYiN019PkySvjV");
        assert_eq!(find_voice(" ELLI ").unwrap().name, "Elli");
        assert!(find_voice("Nobody").is_none());
    }

    #[test]
    fn test_voice_at_bounds() {
        assert_eq!(voice_at(1).unwrap().name, "Domi");
        assert!(voice_at(5).is_none());
    }

    #[test]
    fn test_duplicate_ids_are_reported_not_removed() {
        let duplicates = duplicate_voice_ids();
        assert_eq!(
            duplicates,
            vec![("EXAVITQu4vr4xnSDxMaL", vec!["Rachel (Default)", "Bella"])]
        );
    }
}
