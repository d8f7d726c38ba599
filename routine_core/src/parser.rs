//! Model response parsing.
//!
//! Two independent passes:
//! - [`parse_tagged`] is a tolerant line state machine over the tagged grammar
//!   requested by the prompt, accepting the English and Spanish tag names and
//!   the malformed shapes models are known to emit.
//! - [`parse_by_vocabulary`] is the low-confidence fallback: it looks for known
//!   catalog names anywhere in the text.
//!
//! Neither pass fails or invents sets/reps. Bad input yields an empty list.

use crate::catalog::candidates_for;
use crate::muscle::{contains_either_way, normalize};
use crate::{CandidatesByGroup, GeneratedExercise};
use once_cell::sync::Lazy;
use regex::Regex;

/// End-of-entry delimiter in either language
static END_TAG: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?i)\[\s*(?:end|fin)\s*\]").ok());

/// Any short bracketed token on a line
static BRACKET: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\[([^\[\]\n]{1,40})\]").ok());

/// "3 x 10", "4x8-10", "3 × 12"
static SETS_REPS: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)\s*[x×]\s*(\d.*)$").ok());

/// Lines the fallback pass never treats as exercises (echoed prompt headers)
const HEADER_PREFIXES: &[&str] = &[
    "you are",
    "client",
    "muscle groups",
    "goals",
    "available exercises",
    "exact exercise distribution",
    "sets and reps",
    "strict order",
    "mandatory",
    "generate the",
    "eres ",
    "cliente",
    "grupos",
    "ejercicios",
    "reglas",
    "instrucciones",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Field {
    Name,
    Sets,
    Instructions,
}

fn classify(token: &str) -> Option<Field> {
    let key = normalize(token);
    let head = key.trim_end_matches(|c: char| c.is_ascii_digit() || c == '#' || c.is_whitespace());
    match head {
        "exercise" | "ejercicio" | "ejercio" | "exercice" | "name" | "nombre" => Some(Field::Name),
        "sets" | "set" | "series" | "serie" | "sets/reps" => Some(Field::Sets),
        "instructions" | "instruction" | "instrucciones" | "instruccion" | "notes" | "notas" => {
            Some(Field::Instructions)
        }
        _ => None,
    }
}

/// Split a line into `(tag, value)` pairs; empty when the line carries no tags.
///
/// The first tag must open the line, after list markup at most. Later tags on
/// the same line must name a field further along (name, sets, instructions)
/// and carry no number, so "[Notes]" or "[Set 1]" inside a value stay text.
fn split_tags(line: &str) -> Vec<(Field, &str)> {
    let Some(re) = BRACKET.as_ref() else {
        return Vec::new();
    };

    let mut known: Vec<(Field, usize, usize)> = Vec::new();
    for caps in re.captures_iter(line) {
        let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Some(field) = classify(token.as_str()) else {
            continue;
        };
        let accepted = match known.last() {
            None => !line[..whole.start()].chars().any(char::is_alphabetic),
            Some(&(previous, _, _)) => {
                field > previous && !token.as_str().chars().any(|c| c.is_ascii_digit())
            }
        };
        if accepted {
            known.push((field, whole.start(), whole.end()));
        } else if known.is_empty() {
            return Vec::new();
        }
    }

    known
        .iter()
        .enumerate()
        .map(|(i, &(field, _, value_start))| {
            let value_end = known.get(i + 1).map(|next| next.1).unwrap_or(line.len());
            (field, line[value_start..value_end].trim())
        })
        .collect()
}

/// Canonical "N x M" spacing; anything else is kept as written.
fn format_sets(raw: &str) -> String {
    let mut value = raw.trim();
    // "[SERIE]S 3 x 12" typo
    if let Some(rest) = value.strip_prefix(|c: char| c == 'S' || c == 's') {
        if rest.trim_start().starts_with(|c: char| c.is_ascii_digit()) {
            value = rest.trim_start();
        }
    }

    match SETS_REPS.as_ref().and_then(|re| re.captures(value)) {
        Some(caps) => format!("{} x {}", &caps[1], collapse_spaces(&caps[2])),
        None => collapse_spaces(value),
    }
}

fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn looks_like_sets(text: &str) -> bool {
    SETS_REPS.as_ref().is_some_and(|re| re.is_match(text.trim()))
}

fn clean_name(raw: &str) -> &str {
    raw.trim_matches(|c: char| c == '*' || c == '"' || c == ':' || c.is_whitespace())
}

#[derive(Debug, Default)]
struct BlockState {
    name: String,
    sets: String,
    instructions: String,
    pending: Option<Field>,
    last: Option<Field>,
}

impl BlockState {
    fn set(&mut self, field: Field, value: &str) {
        match field {
            Field::Name => self.name = clean_name(value).to_string(),
            Field::Sets => self.sets = format_sets(value),
            Field::Instructions => self.instructions = value.trim().to_string(),
        }
        self.last = Some(field);
    }

    fn feed(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }

        let tagged = split_tags(line);
        if tagged.is_empty() {
            self.feed_untagged(line);
            return;
        }

        self.pending = None;
        for (field, value) in tagged {
            if value.is_empty() {
                self.pending = Some(field);
            } else {
                self.set(field, value);
            }
        }
    }

    fn feed_untagged(&mut self, text: &str) {
        if let Some(field) = self.pending.take() {
            self.set(field, text);
            return;
        }

        // "[Bench Press]3 x 10" with no field tags at all
        if self.name.is_empty() {
            if let Some(inner) = text.strip_prefix('[') {
                if let Some((name, rest)) = inner.split_once(']') {
                    self.set(Field::Name, name);
                    if !rest.trim().is_empty() && self.sets.is_empty() {
                        self.set(Field::Sets, rest);
                    }
                    return;
                }
            }
        }

        if !self.name.is_empty() && self.sets.is_empty() && looks_like_sets(text) {
            self.set(Field::Sets, text);
            return;
        }

        if self.last == Some(Field::Instructions) {
            self.instructions.push(' ');
            self.instructions.push_str(text);
        }
    }

    fn finish(self) -> Option<GeneratedExercise> {
        if self.name.is_empty() {
            return None;
        }
        Some(GeneratedExercise::new(self.name, self.sets, self.instructions))
    }
}

fn strip_fences(raw: &str) -> String {
    raw.replace("```", "")
}

/// Strict pass over the tagged grammar
///
/// Text after the last end-of-entry tag is an unterminated block and is
/// dropped, as are blocks without a usable name.
pub fn parse_tagged(raw: &str) -> Vec<GeneratedExercise> {
    let text = strip_fences(raw);
    if text.trim().is_empty() {
        return Vec::new();
    }
    let Some(end_tag) = END_TAG.as_ref() else {
        return Vec::new();
    };

    let mut exercises = Vec::new();
    let mut start = 0;
    for end in end_tag.find_iter(&text) {
        let block = &text[start..end.start()];
        start = end.end();

        let mut state = BlockState::default();
        for line in block.lines() {
            state.feed(line.trim());
        }
        match state.finish() {
            Some(exercise) => exercises.push(exercise),
            None => tracing::debug!(block = %block.trim(), "parser.block_without_name"),
        }
    }

    let trailing = text[start..].trim();
    if !trailing.is_empty() {
        tracing::debug!(chars = trailing.len(), "parser.unterminated_block_dropped");
    }

    exercises
}

fn is_header(line: &str) -> bool {
    if line.contains("===") || line.contains("━━━") {
        return true;
    }
    let key = normalize(line);
    HEADER_PREFIXES.iter().any(|prefix| key.starts_with(prefix))
}

/// Fallback pass: find known catalog names line by line
///
/// Only this day's groups are searched. One exercise per line, no duplicates,
/// at most `expected` results. Sets/reps are left empty.
pub fn parse_by_vocabulary(
    raw: &str,
    day_groups: &[String],
    candidates: &CandidatesByGroup,
    expected: usize,
) -> Vec<GeneratedExercise> {
    let mut found: Vec<GeneratedExercise> = Vec::new();
    if expected == 0 {
        return found;
    }

    for line in strip_fences(raw).lines() {
        let trimmed = line.trim();
        if trimmed.chars().count() < 5 || is_header(trimmed) {
            continue;
        }
        let cleaned = trimmed.trim_start_matches(|c: char| {
            c == '-' || c == '*' || c == '.' || c == ')' || c.is_ascii_digit() || c.is_whitespace()
        });
        if cleaned.is_empty() {
            continue;
        }

        let hit = day_groups
            .iter()
            .flat_map(|group| candidates_for(candidates, group))
            .find(|candidate| candidate.names().any(|n| contains_either_way(n, cleaned)));

        let Some(hit) = hit else { continue };
        let key = normalize(&hit.name);
        if found.iter().any(|e| normalize(&e.name) == key) {
            continue;
        }

        tracing::debug!(line = cleaned, matched = %hit.name, "parser.vocabulary_match");
        found.push(GeneratedExercise::new(hit.name.clone(), "", ""));
        if found.len() >= expected {
            break;
        }
    }

    found
}

/// Strict pass, then the vocabulary fallback if the strict pass found nothing
pub fn parse_response(
    raw: &str,
    expected: usize,
    day_groups: &[String],
    candidates: &CandidatesByGroup,
) -> Vec<GeneratedExercise> {
    let strict = parse_tagged(raw);
    if !strict.is_empty() {
        tracing::debug!(count = strict.len(), "parser.strict");
        return strict;
    }

    let loose = parse_by_vocabulary(raw, day_groups, candidates, expected);
    tracing::debug!(count = loose.len(), "parser.vocabulary");
    loose
}
