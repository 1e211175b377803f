//! Named pipeline functions usable inside template expressions.
//!
//! A pipeline function is a pure `&str -> String` transform, registered under
//! a short identifier and invoked by name from template expressions
//! (`{{ entity | sPascal }}`). The registry is an explicit object injected
//! into the engine — there is deliberately no process-global function table,
//! so two engines in the same process can carry different registries.
//!
//! ## Registration semantics
//!
//! `register` is last-wins: re-registering a name silently replaces the
//! previous function. Callers own uniqueness. Rendering an expression that
//! names an unregistered pipeline is a hard error (see `render`).
//!
//! ## Built-in collection
//!
//! [`PipelineRegistry::with_builtin`] ships the standard set:
//!
//! | Name          | Example                    |
//! |---------------|----------------------------|
//! | `sPascal`     | "user_roles" → "UserRole"  |
//! | `pPascal`     | "user_role" → "UserRoles"  |
//! | `sCamel`      | "UserRoles" → "userRole"   |
//! | `pCamel`      | "UserRole" → "userRoles"   |
//! | `sSnake`      | "UserRoles" → "user_role"  |
//! | `pSnake`      | "UserRole" → "user_roles"  |
//! | `sKebab`      | "UserRoles" → "user-role"  |
//! | `pKebab`      | "UserRole" → "user-roles"  |
//! | `lower`       | "WidgetS" → "widgets"      |
//! | `upper`       | "widget" → "WIDGET"        |
//! | `modpath`     | "UserRoles" → "userrole"   |
//! | `lslash`      | "cms" → "/cms"             |
//! | `routeParams` | "/{id}/x" → "/:id/x"       |
//! | `mkAttr`      | "derive(Debug)" → "#[derive(Debug)]" |

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::domain::error::DomainError;

/// A registered pipeline transform.
///
/// `Arc<dyn Fn>` rather than a plain `fn` pointer so built-ins can close
/// over a configured [`Pluralizer`].
pub type PipelineFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Registry of pipeline functions, keyed by template-facing name.
#[derive(Clone, Default)]
pub struct PipelineRegistry {
    fns: HashMap<String, PipelineFn>,
}

impl PipelineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-loaded with the built-in collection, using a
    /// default [`Pluralizer`].
    pub fn with_builtin() -> Self {
        Self::with_builtin_rules(Pluralizer::new())
    }

    /// Create a registry pre-loaded with the built-in collection, using a
    /// caller-configured pluralizer (extra irregular/uncountable rules).
    pub fn with_builtin_rules(pluralizer: Pluralizer) -> Self {
        let mut reg = Self::new();
        let pl = Arc::new(pluralizer);

        for (name, number, case) in [
            ("sPascal", Number::Singular, Case::Pascal),
            ("pPascal", Number::Plural, Case::Pascal),
            ("sCamel", Number::Singular, Case::Camel),
            ("pCamel", Number::Plural, Case::Camel),
            ("sSnake", Number::Singular, Case::Snake),
            ("pSnake", Number::Plural, Case::Snake),
            ("sKebab", Number::Singular, Case::Kebab),
            ("pKebab", Number::Plural, Case::Kebab),
        ] {
            let pl = Arc::clone(&pl);
            reg.register(name, move |s| recase(s, number, case, &pl));
        }

        reg.register("lower", |s| s.to_lowercase());
        reg.register("upper", |s| s.to_uppercase());

        // Module-path-safe identifier: singular, lowercase, separators dropped.
        {
            let pl = Arc::clone(&pl);
            reg.register("modpath", move |s| {
                recase(s, Number::Singular, Case::Snake, &pl).replace('_', "")
            });
        }

        reg.register("lslash", |s| {
            if s.is_empty() || s.starts_with('/') {
                s.to_string()
            } else {
                format!("/{s}")
            }
        });

        reg.register("routeParams", rewrite_route_params);

        reg.register("mkAttr", |s| format!("#[{s}]"));

        reg
    }

    /// Register a pipeline function. Last registration wins.
    pub fn register(&mut self, name: impl Into<String>, f: impl Fn(&str) -> String + Send + Sync + 'static) {
        self.fns.insert(name.into(), Arc::new(f));
    }

    /// Look up a pipeline by name.
    pub fn get(&self, name: &str) -> Option<&PipelineFn> {
        self.fns.get(name)
    }

    /// Apply a named pipeline to an input.
    ///
    /// # Errors
    ///
    /// `UnknownPipeline` if the name was never registered — surfaced to the
    /// template author as a render-time failure.
    pub fn apply(&self, name: &str, input: &str) -> Result<String, DomainError> {
        let f = self
            .fns
            .get(name)
            .ok_or_else(|| DomainError::UnknownPipeline { name: name.to_string() })?;
        Ok(f(input))
    }

    /// Registered names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fns.is_empty()
    }
}

impl std::fmt::Debug for PipelineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.fns.keys().collect();
        names.sort();
        f.debug_struct("PipelineRegistry").field("fns", &names).finish()
    }
}

// ============================================================================
// Casing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Number {
    Singular,
    Plural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Case {
    Pascal,
    Camel,
    Snake,
    Kebab,
}

/// Re-case an identifier, adjusting the grammatical number of its last word.
///
/// `"user_roles"` with (`Singular`, `Pascal`) becomes `"UserRole"`; only the
/// final word carries number, matching how entity identifiers are written.
fn recase(input: &str, number: Number, case: Case, pl: &Pluralizer) -> String {
    let mut words = split_words(input);
    if let Some(last) = words.last_mut() {
        *last = match number {
            Number::Singular => pl.singular(last),
            Number::Plural => pl.plural(last),
        };
    }

    match case {
        Case::Snake => words.join("_"),
        Case::Kebab => words.join("-"),
        Case::Pascal => words.iter().map(|w| capitalize(w)).collect(),
        Case::Camel => words
            .iter()
            .enumerate()
            .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
            .collect(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::new();
            // to_uppercase handles Unicode correctly (e.g., "ß" -> "SS")
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
            out
        }
        None => String::new(),
    }
}

/// Split a string into lowercase words based on casing and separators.
///
/// ## Word boundary detection
///
/// 1. **Explicit separators:** `_`, `-`, whitespace → always split
/// 2. **Case transition (camelCase):** `aB` → split between `a` and `B`
/// 3. **Acronym boundary:** `HTTPRequest` → split between `P` and `R`
///    (detected by `Upper Upper Lower` pattern)
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        // Rule 1: Explicit separators always end the current word
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(next) = chars.peek() {
            // Rule 2: camelCase transition (lowercase -> uppercase)
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            // Rule 3: Acronym boundary ("HTTPServer" → "HTTP" + "Server")
            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

/// Rewrite brace-style route parameters to colon style: `/{id}` → `/:id`.
fn rewrite_route_params(route: &str) -> String {
    let mut out = String::with_capacity(route.len());
    let mut rest = route;
    while let Some(open) = rest.find('{') {
        match rest[open..].find('}') {
            Some(close_rel) => {
                out.push_str(&rest[..open]);
                out.push(':');
                out.push_str(&rest[open + 1..open + close_rel]);
                rest = &rest[open + close_rel + 1..];
            }
            // Unterminated brace: keep the remainder verbatim.
            None => break,
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// Pluralization
// ============================================================================

/// Rule-based English pluralizer with irregular and uncountable overrides.
///
/// The defaults cover the identifier vocabulary this tool actually meets;
/// domain-specific words are added at startup via [`add_irregular`] and
/// [`add_uncountable`], the same way route prefixes or product nouns get
/// configured in the CLI.
///
/// [`add_irregular`]: Self::add_irregular
/// [`add_uncountable`]: Self::add_uncountable
#[derive(Debug, Clone, Default)]
pub struct Pluralizer {
    irregular: HashMap<String, String>,
    irregular_rev: HashMap<String, String>,
    uncountable: HashSet<String>,
}

impl Pluralizer {
    pub fn new() -> Self {
        let mut pl = Self::default();
        for (s, p) in [
            ("person", "people"),
            ("child", "children"),
            ("datum", "data"),
            ("index", "indices"),
            ("status", "statuses"),
        ] {
            pl.add_irregular(s, p);
        }
        for w in ["info", "metadata", "media", "series"] {
            pl.add_uncountable(w);
        }
        pl
    }

    /// Register a singular/plural pair that does not follow suffix rules.
    pub fn add_irregular(&mut self, singular: impl Into<String>, plural: impl Into<String>) {
        let s = singular.into();
        let p = plural.into();
        self.irregular.insert(s.clone(), p.clone());
        self.irregular_rev.insert(p, s);
    }

    /// Register a word whose singular and plural forms are identical.
    pub fn add_uncountable(&mut self, word: impl Into<String>) {
        self.uncountable.insert(word.into());
    }

    /// Plural form of a (lowercase) word.
    pub fn plural(&self, word: &str) -> String {
        if self.uncountable.contains(word) || word.is_empty() {
            return word.to_string();
        }
        if let Some(p) = self.irregular.get(word) {
            return p.clone();
        }
        if self.irregular_rev.contains_key(word) {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix('y') {
            if !stem.is_empty() && !ends_with_vowel(stem) {
                return format!("{stem}ies");
            }
        }
        if ["s", "x", "z", "ch", "sh"].iter().any(|suf| word.ends_with(suf)) {
            return format!("{word}es");
        }
        format!("{word}s")
    }

    /// Singular form of a (lowercase) word.
    pub fn singular(&self, word: &str) -> String {
        if self.uncountable.contains(word) || word.is_empty() {
            return word.to_string();
        }
        if let Some(s) = self.irregular_rev.get(word) {
            return s.clone();
        }
        if self.irregular.contains_key(word) {
            return word.to_string();
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{stem}y");
            }
        }
        for suf in ["ses", "xes", "zes", "ches", "shes"] {
            if let Some(stem) = word.strip_suffix("es") {
                if word.ends_with(suf) {
                    return stem.to_string();
                }
            }
        }
        if word.ends_with('s') && !word.ends_with("ss") {
            return word[..word.len() - 1].to_string();
        }
        word.to_string()
    }
}

fn ends_with_vowel(s: &str) -> bool {
    s.chars()
        .next_back()
        .is_some_and(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u'))
}
