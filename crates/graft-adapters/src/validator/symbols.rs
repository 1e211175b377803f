//! Structural duplicate-symbol validator.
//!
//! The engine hands this validator the *merged* prospective file body
//! (existing content plus the candidate block) before any mutation is
//! committed. The scan walks the source once, tracking brace depth and item
//! scopes, and rejects the content if it declares the same symbol twice in
//! the same scope — the generated-code failure mode this tool actually
//! produces when a handler or type is generated a second time under a
//! different name key.
//!
//! Scope rules:
//!
//! - the file root, `mod` bodies, `impl` bodies, and `trait` bodies are
//!   *item scopes*: declarations inside them are collected;
//! - every other brace (fn bodies, struct fields, match arms, macro bodies)
//!   opens an *opaque* scope whose contents are ignored — local items may
//!   legitimately shadow;
//! - both `impl Widget` and `impl WidgetService for Widget` scope their
//!   methods under `Widget`, so methods from separate impl blocks collide
//!   the way the compiler would report them.
//!
//! This is deliberately not a parser. It understands exactly enough
//! structure (comments, strings, braces, declaration keywords) to catch
//! redeclarations and unbalanced delimiters; everything else passes.

use std::collections::HashSet;

use graft_core::{
    application::ports::ContentValidator,
    error::{GraftResult, ValidationError},
};

/// Duplicate-declaration scan over Rust-shaped source text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolValidator;

impl SymbolValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ContentValidator for SymbolValidator {
    fn validate(&self, source: &str) -> GraftResult<()> {
        scan(source).map_err(Into::into)
    }
}

/// What a `{` opens.
#[derive(Debug, Clone)]
enum Scope {
    /// Declarations are collected, qualified by this name ("" = file root).
    Items(String),
    Opaque,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Open,
    Close,
    Other(char),
}

fn scan(source: &str) -> Result<(), ValidationError> {
    let tokens = tokenize(source)?;

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut stack: Vec<Scope> = vec![Scope::Items(String::new())];
    // Scope the next `{` will open, decided by the declaration before it.
    let mut next_scope: Option<Scope> = None;

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            Token::Open => {
                stack.push(next_scope.take().unwrap_or(Scope::Opaque));
                i += 1;
            }
            Token::Close => {
                if stack.len() == 1 {
                    return Err(ValidationError::Parse {
                        detail: "unbalanced '}'".into(),
                    });
                }
                stack.pop();
                next_scope = None;
                i += 1;
            }
            Token::Ident(word) => {
                let in_items = matches!(stack.last(), Some(Scope::Items(_)));
                if in_items {
                    match word {
                        "fn" | "struct" | "enum" | "type" | "const" | "static" => {
                            if let Some(name) = next_ident(&tokens, i + 1) {
                                declare(&mut seen, &stack, name)?;
                            }
                            // Whatever brace follows (body, fields) is opaque.
                            next_scope = Some(Scope::Opaque);
                        }
                        "trait" | "mod" => {
                            if let Some(name) = next_ident(&tokens, i + 1) {
                                declare(&mut seen, &stack, name)?;
                                next_scope = Some(Scope::Items(name.to_string()));
                            }
                        }
                        "impl" => {
                            // `impl Widget {` and `impl Service for Widget {`
                            // both scope methods under the last path segment
                            // before the brace.
                            let target = impl_target(&tokens, i + 1);
                            next_scope = Some(match target {
                                Some(name) => Scope::Items(name.to_string()),
                                None => Scope::Opaque,
                            });
                        }
                        _ => {}
                    }
                }
                i += 1;
            }
            Token::Other(_) => {
                i += 1;
            }
        }
    }

    if stack.len() != 1 {
        return Err(ValidationError::Parse {
            detail: "unbalanced '{'".into(),
        });
    }

    Ok(())
}

fn declare(
    seen: &mut HashSet<(String, String)>,
    stack: &[Scope],
    name: &str,
) -> Result<(), ValidationError> {
    let scope = match stack.last() {
        Some(Scope::Items(s)) => s.clone(),
        _ => String::new(),
    };
    if !seen.insert((scope.clone(), name.to_string())) {
        let scope_display = if scope.is_empty() {
            "this scope".to_string()
        } else {
            format!("'{scope}'")
        };
        return Err(ValidationError::DuplicateSymbol {
            symbol: name.to_string(),
            scope: scope_display,
        });
    }
    Ok(())
}

/// The first identifier token at or after `from`, skipping nothing else.
fn next_ident<'a>(tokens: &[Token<'a>], from: usize) -> Option<&'a str> {
    match tokens.get(from) {
        Some(Token::Ident(w)) if !is_keyword(w) => Some(w),
        _ => None,
    }
}

/// Last path-segment identifier between an `impl` keyword and its `{`.
fn impl_target<'a>(tokens: &[Token<'a>], from: usize) -> Option<&'a str> {
    let mut target = None;
    for tok in &tokens[from..] {
        match tok {
            Token::Open => break,
            Token::Ident(w) if !is_keyword(w) => target = Some(*w),
            _ => {}
        }
    }
    target
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "pub" | "fn" | "struct" | "enum" | "trait" | "impl" | "mod" | "type" | "const"
            | "static" | "for" | "where" | "async" | "unsafe" | "dyn" | "mut" | "ref"
    )
}

/// Split source into identifiers, braces, and single characters, skipping
/// whitespace, comments, and string literals.
fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ValidationError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;

        // Line comment
        if c == '/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // Block comment (nesting supported, as in Rust)
        if c == '/' && bytes.get(i + 1) == Some(&b'*') {
            let mut depth = 1;
            i += 2;
            while i < bytes.len() && depth > 0 {
                if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
                    depth += 1;
                    i += 2;
                } else if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    depth -= 1;
                    i += 2;
                } else {
                    i += 1;
                }
            }
            if depth > 0 {
                return Err(ValidationError::Parse {
                    detail: "unterminated block comment".into(),
                });
            }
            continue;
        }

        // String literal with escapes
        if c == '"' {
            i += 1;
            loop {
                match bytes.get(i) {
                    Some(b'\\') => i += 2,
                    Some(b'"') => {
                        i += 1;
                        break;
                    }
                    Some(_) => i += 1,
                    None => {
                        return Err(ValidationError::Parse {
                            detail: "unterminated string literal".into(),
                        });
                    }
                }
            }
            continue;
        }

        // Lifetime (`'a`) or the opening of a char literal: consume the
        // quote and the identifier so `impl Foo<'a>` does not surface a
        // spurious `a` identifier.
        if c == '\'' && bytes.get(i + 1).is_some_and(|b| (*b as char).is_alphabetic() || *b == b'_') {
            i += 2;
            while i < bytes.len() && {
                let b = bytes[i] as char;
                b.is_alphanumeric() || b == '_'
            } {
                i += 1;
            }
            // Closing quote of a char literal, if present.
            if bytes.get(i) == Some(&b'\'') {
                i += 1;
            }
            continue;
        }

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < bytes.len() && {
                let b = bytes[i] as char;
                b.is_alphanumeric() || b == '_'
            } {
                i += 1;
            }
            tokens.push(Token::Ident(&source[start..i]));
            continue;
        }

        tokens.push(match c {
            '{' => Token::Open,
            '}' => Token::Close,
            other => Token::Other(other),
        });
        i += 1;
    }

    Ok(tokens)
}
