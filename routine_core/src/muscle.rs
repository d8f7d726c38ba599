//! Muscle-group naming and text normalisation.
//!
//! Catalogs arrive in Spanish or English ("Pecho", "Chest", "Glúteos"...).
//! Everything is folded to one canonical English name before comparison.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const CHEST: &str = "Chest";
pub const BACK: &str = "Back";
pub const LEGS: &str = "Legs";
pub const SHOULDERS: &str = "Shoulders";
pub const BICEPS: &str = "Biceps";
pub const TRICEPS: &str = "Triceps";
pub const GLUTES: &str = "Glutes";
pub const CORE: &str = "Core";
pub const ABS: &str = "Abs";
pub const CALVES: &str = "Calves";
pub const ARMS: &str = "Arms";
pub const FOREARMS: &str = "Forearms";
pub const FULL_BODY: &str = "Full Body";

/// normalized alias -> canonical group
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let table: &[(&str, &[&str])] = &[
        (CHEST, &["chest", "pecho", "pectorales", "pectoral"]),
        (BACK, &["back", "espalda", "dorsales", "lats"]),
        (
            LEGS,
            &[
                "legs",
                "leg",
                "piernas",
                "pierna",
                "quadriceps",
                "quads",
                "cuadriceps",
                "hamstrings",
                "isquiotibiales",
            ],
        ),
        (SHOULDERS, &["shoulders", "shoulder", "hombros", "hombro", "deltoides"]),
        (BICEPS, &["biceps", "bicep"]),
        (TRICEPS, &["triceps", "tricep"]),
        (GLUTES, &["glutes", "glute", "gluteos", "gluteo"]),
        (CORE, &["core", "nucleo"]),
        (ABS, &["abs", "abdomen", "abdominales"]),
        (CALVES, &["calves", "calf", "pantorrillas", "gemelos"]),
        (ARMS, &["arms", "brazos"]),
        (FOREARMS, &["forearms", "antebrazos"]),
        (FULL_BODY, &["full body", "fullbody", "cuerpo completo"]),
    ];

    table
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |a| (*a, *canonical)))
        .collect()
});

/// Lowercase, trim and strip Spanish diacritics.
pub fn normalize(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            other => other,
        })
        .collect()
}

/// Canonical English name of a muscle group; unknown names pass through trimmed.
pub fn canonical_group(name: &str) -> String {
    ALIASES
        .get(normalize(name).as_str())
        .map(|c| (*c).to_string())
        .unwrap_or_else(|| name.trim().to_string())
}

/// Whether two group labels denote the same muscle group.
pub fn same_group(a: &str, b: &str) -> bool {
    normalize(&canonical_group(a)) == normalize(&canonical_group(b))
}

/// Case- and accent-insensitive containment in either direction.
pub fn contains_either_way(a: &str, b: &str) -> bool {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}
