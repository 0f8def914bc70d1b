//! Type and tag naming: naming policy, destination namespace, and per-run counters.

use std::collections::{HashMap, HashSet};

use crate::types::{GenerateOptions, EMPTY_TAG};

/// Character policy for generated identifiers.
pub trait NamingPolicy {
    /// Replace characters that cannot appear in an identifier.
    fn sanitize(&self, name: &str) -> String;

    /// Wrap a type name with the configured prefix and suffix.
    fn apply_prefix_suffix(&self, name: &str) -> String;

    /// Full type name for a raw schema name: sanitized, UpperCamel, affixed.
    fn type_name(&self, raw: &str) -> String {
        let camel = upper_camel(&self.sanitize(raw));
        let name = self.apply_prefix_suffix(&camel);
        match name.chars().next() {
            None => "Anonymous".to_string(),
            Some(c) if c.is_ascii_digit() => format!("_{}", name),
            Some(_) => name,
        }
    }
}

/// Replaces anything outside `[A-Za-z0-9_]` with `_` and applies the options' affixes.
#[derive(Debug, Clone, Default)]
pub struct DefaultNamingPolicy {
    prefix: Option<String>,
    suffix: Option<String>,
}

impl DefaultNamingPolicy {
    pub fn new(options: &GenerateOptions) -> Self {
        Self {
            prefix: options.class_name_prefix.clone(),
            suffix: options.class_name_suffix.clone(),
        }
    }
}

impl NamingPolicy for DefaultNamingPolicy {
    fn sanitize(&self, name: &str) -> String {
        name.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect()
    }

    fn apply_prefix_suffix(&self, name: &str) -> String {
        format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            name,
            self.suffix.as_deref().unwrap_or("")
        )
    }
}

/// `pet_name` -> `PetName`, `dog` -> `Dog`. Underscores act as word breaks.
fn upper_camel(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Type names declared in one destination, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    declared: Vec<String>,
    folded: HashSet<String>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.folded.contains(&name.to_lowercase())
    }

    /// Declare `name`. Returns `false` (and changes nothing) if it is taken.
    pub fn declare(&mut self, name: &str) -> bool {
        if !self.folded.insert(name.to_lowercase()) {
            return false;
        }
        self.declared.push(name.to_string());
        true
    }

    /// Declared names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.declared
    }

    /// `candidate`, or `candidate` with trailing `_` appended until it is free.
    pub fn make_unique(&self, candidate: &str) -> String {
        let mut name = candidate.to_string();
        while self.contains(&name) {
            name.push('_');
        }
        name
    }
}

/// Counters for anonymous `oneOf` branches, keyed by the parent field name.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    indices: HashMap<String, u32>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next 1-based index for `field`.
    pub fn next_index(&mut self, field: &str) -> u32 {
        let index = self.indices.entry(field.to_string()).or_insert(0);
        *index += 1;
        *index
    }
}

/// Enum tag for a variant type name: `PetDog` -> `PET_DOG`, `Animal1` -> `ANIMAL_1`.
///
/// Tokens that sanitize to nothing but underscores are dropped, so `Dog_` and
/// `Dog` share the tag `DOG`.
pub fn tag_name(type_name: &str, policy: &dyn NamingPolicy) -> String {
    let tokens: Vec<String> = split_camel_case(type_name)
        .into_iter()
        .filter(|token| !policy.sanitize(token).chars().all(|c| c == '_'))
        .collect();

    let tag = tokens.join("_").to_uppercase();
    match tag.chars().next() {
        None => EMPTY_TAG.to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", tag),
        Some(_) => tag,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Upper,
    Lower,
    Digit,
    Connector,
    Dash,
    Space,
    Other,
}

fn char_class(c: char) -> CharClass {
    match c {
        c if c.is_uppercase() => CharClass::Upper,
        c if c.is_lowercase() => CharClass::Lower,
        c if c.is_numeric() => CharClass::Digit,
        '_' => CharClass::Connector,
        '-' => CharClass::Dash,
        c if c.is_whitespace() => CharClass::Space,
        _ => CharClass::Other,
    }
}

/// Split on character-class changes; an uppercase letter followed by lowercase
/// starts a new token (`ABCDef` -> `ABC`, `Def`).
fn split_camel_case(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let Some(&first) = chars.first() else {
        return Vec::new();
    };

    let mut tokens = Vec::new();
    let mut start = 0;
    let mut current = char_class(first);
    for (pos, &c) in chars.iter().enumerate().skip(1) {
        let class = char_class(c);
        if class == current {
            continue;
        }
        if class == CharClass::Lower && current == CharClass::Upper {
            let new_start = pos - 1;
            if new_start != start {
                tokens.push(chars[start..new_start].iter().collect());
                start = new_start;
            }
        } else {
            tokens.push(chars[start..pos].iter().collect());
            start = pos;
        }
        current = class;
    }
    tokens.push(chars[start..].iter().collect());
    tokens
}
