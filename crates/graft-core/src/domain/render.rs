//! The template expression renderer.
//!
//! Templates are literal text with embedded expressions of the form
//! `{{ head | pipeline | pipeline }}`, where `head` is either an argument
//! name resolved against the [`ArgMap`] or a double-quoted string literal
//! (literals exist so attribute/tag synthesis pipelines can be fed constant
//! input). Pipelines apply left to right.
//!
//! This is intentionally *not* a template language: no conditionals, no
//! loops, no sub-templates. Anything beyond variable substitution and named
//! transforms belongs in a pipeline function or in the authored template
//! bodies themselves.
//!
//! ## Failure modes (all hard errors)
//!
//! - `{{` without a closing `}}` → [`DomainError::TemplateSyntax`]
//! - empty expression, bad literal, stray tokens → [`DomainError::TemplateSyntax`]
//! - head names an argument absent from the map → [`DomainError::UnresolvedVariable`]
//! - a pipe names an unregistered function → [`DomainError::UnknownPipeline`]

use crate::domain::args::ArgMap;
use crate::domain::error::DomainError;
use crate::domain::pipeline::PipelineRegistry;

/// Render a template string against an argument map and pipeline registry.
///
/// ```rust
/// use graft_core::domain::{render, ArgMap, PipelineRegistry};
///
/// let args = ArgMap::from_pairs([("entity", "user_roles")]);
/// let reg = PipelineRegistry::with_builtin();
/// let out = render("pub struct {{ entity | sPascal }};", &args, &reg).unwrap();
/// assert_eq!(out, "pub struct UserRole;");
/// ```
pub fn render(template: &str, args: &ArgMap, pipelines: &PipelineRegistry) -> Result<String, DomainError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let close = after_open.find("}}").ok_or_else(|| DomainError::TemplateSyntax {
            detail: format!("unterminated expression near `{}`", excerpt(&rest[open..])),
        })?;

        let expr = &after_open[..close];
        out.push_str(&eval_expr(expr, args, pipelines)?);
        rest = &after_open[close + 2..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Evaluate one `head | fn | fn` expression body (text between the braces).
fn eval_expr(expr: &str, args: &ArgMap, pipelines: &PipelineRegistry) -> Result<String, DomainError> {
    let (head, mut rest) = parse_head(expr)?;

    let mut value = match head {
        Head::Literal(s) => s,
        Head::Variable(name) => args
            .get(name)
            .ok_or_else(|| DomainError::UnresolvedVariable { name: name.to_string() })?
            .to_string(),
    };

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let Some(after_pipe) = rest.strip_prefix('|') else {
            return Err(DomainError::TemplateSyntax {
                detail: format!("expected `|` before `{}`", excerpt(rest)),
            });
        };
        let after_pipe = after_pipe.trim_start();
        let name_end = after_pipe
            .find(|c: char| !is_ident_char(c))
            .unwrap_or(after_pipe.len());
        let name = &after_pipe[..name_end];
        if name.is_empty() {
            return Err(DomainError::TemplateSyntax {
                detail: "empty pipeline name".to_string(),
            });
        }
        value = pipelines.apply(name, &value)?;
        rest = &after_pipe[name_end..];
    }

    Ok(value)
}

enum Head<'a> {
    Variable(&'a str),
    Literal(String),
}

/// Parse the expression head: a quoted literal or an argument identifier.
/// Returns the head and the unconsumed remainder (pipes, if any).
fn parse_head(expr: &str) -> Result<(Head<'_>, &str), DomainError> {
    let trimmed = expr.trim_start();

    if let Some(body) = trimmed.strip_prefix('"') {
        // Double-quoted literal with `\"` and `\\` escapes.
        let mut value = String::new();
        let mut chars = body.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => return Ok((Head::Literal(value), &body[i + 1..])),
                '\\' => match chars.next() {
                    Some((_, escaped @ ('"' | '\\'))) => value.push(escaped),
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                _ => value.push(c),
            }
        }
        return Err(DomainError::TemplateSyntax {
            detail: format!("unterminated string literal in `{}`", excerpt(expr)),
        });
    }

    let name_end = trimmed
        .find(|c: char| !is_ident_char(c))
        .unwrap_or(trimmed.len());
    let name = &trimmed[..name_end];
    if name.is_empty() {
        return Err(DomainError::TemplateSyntax {
            detail: format!("expected argument name or string literal in `{{{{ {} }}}}`", expr.trim()),
        });
    }
    Ok((Head::Variable(name), &trimmed[name_end..]))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// First few characters of `s`, for error messages.
fn excerpt(s: &str) -> &str {
    let end = s
        .char_indices()
        .take(24)
        .last()
        .map_or(0, |(i, c)| i + c.len_utf8());
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reg() -> PipelineRegistry {
        PipelineRegistry::with_builtin()
    }

    fn args() -> ArgMap {
        ArgMap::from_pairs([("entity", "user_roles"), ("route", "{id}")])
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(render("no expressions", &args(), &reg()).unwrap(), "no expressions");
    }

    #[test]
    fn variable_substitution() {
        assert_eq!(render("{{ entity }}", &args(), &reg()).unwrap(), "user_roles");
    }

    #[test]
    fn pipes_apply_left_to_right() {
        assert_eq!(
            render("{{ entity | sPascal | upper }}", &args(), &reg()).unwrap(),
            "USERROLE"
        );
    }

    #[test]
    fn multiple_expressions_in_one_template() {
        let out = render("{{ entity | sPascal }}:{{ route | routeParams }}", &args(), &reg()).unwrap();
        assert_eq!(out, "UserRole::id");
    }

    #[test]
    fn quoted_literal_head() {
        let out = render(r#"{{ "derive(Debug)" | mkAttr }}"#, &args(), &reg()).unwrap();
        assert_eq!(out, "#[derive(Debug)]");
    }

    #[test]
    fn quoted_literal_with_escapes() {
        let out = render(r#"{{ "serde(rename = \"id\")" | mkAttr }}"#, &args(), &reg()).unwrap();
        assert_eq!(out, r##"#[serde(rename = "id")]"##);
    }

    #[test]
    fn unresolved_variable_is_error() {
        let err = render("{{ missing }}", &args(), &reg()).unwrap_err();
        assert!(matches!(err, DomainError::UnresolvedVariable { ref name } if name == "missing"));
    }

    #[test]
    fn unknown_pipeline_is_error() {
        let err = render("{{ entity | nope }}", &args(), &reg()).unwrap_err();
        assert!(matches!(err, DomainError::UnknownPipeline { ref name } if name == "nope"));
    }

    #[test]
    fn unterminated_expression_is_error() {
        let err = render("{{ entity ", &args(), &reg()).unwrap_err();
        assert!(matches!(err, DomainError::TemplateSyntax { .. }));
    }

    #[test]
    fn empty_expression_is_error() {
        let err = render("{{ }}", &args(), &reg()).unwrap_err();
        assert!(matches!(err, DomainError::TemplateSyntax { .. }));
    }

    #[test]
    fn stray_token_after_head_is_error() {
        let err = render("{{ entity entity }}", &args(), &reg()).unwrap_err();
        assert!(matches!(err, DomainError::TemplateSyntax { .. }));
    }
}
