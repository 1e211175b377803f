//! Template definitions, secondary outputs, and named groups.
//!
//! A [`TemplateDefinition`] is the atomic unit of generation: one named,
//! path-bound, rule-governed content template, optionally carrying
//! [`SecondaryOutput`]s that mutate *other* files as a side effect of the
//! definition being applied. Definitions are bundled into ordered
//! [`GroupTemplate`]s sharing a required-argument contract, and groups are
//! held in a [`GroupRegistry`] built once at startup.
//!
//! All of these types are plain data. The engine interprets them; nothing
//! here renders or touches a filesystem.

use std::collections::BTreeMap;

use crate::domain::error::DomainError;
use crate::domain::rule::Rule;

/// One named, path-bound, rule-governed content template.
#[derive(Debug, Clone, Default)]
pub struct TemplateDefinition {
    /// Unique within the owning group.
    pub name: String,
    /// Optional block-name *template*; when set, it is rendered with the
    /// step's arguments and replaces `name` as the ledger identity. Needed
    /// when one definition legitimately applies many times to one file with
    /// different arguments (per-action handler stubs).
    pub name_template: Option<String>,
    pub description: String,
    /// Target-path template, rendered with the step's arguments.
    pub path: String,
    /// Content-body template.
    pub content: String,
    pub rule: Rule,
    /// Side-effect mutations to other files, applied in authored order
    /// immediately after the primary content.
    pub outputs: Vec<SecondaryOutput>,
}

impl TemplateDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name_template(mut self, t: impl Into<String>) -> Self {
        self.name_template = Some(t.into());
        self
    }

    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = d.into();
        self
    }

    pub fn path(mut self, p: impl Into<String>) -> Self {
        self.path = p.into();
        self
    }

    pub fn content(mut self, c: impl Into<String>) -> Self {
        self.content = c.into();
        self
    }

    pub fn rule(mut self, r: Rule) -> Self {
        self.rule = r;
        self
    }

    pub fn output(mut self, o: SecondaryOutput) -> Self {
        self.outputs.push(o);
        self
    }
}

/// A side-effect mutation targeting a file other than the definition's
/// primary target.
#[derive(Debug, Clone, Default)]
pub struct SecondaryOutput {
    /// Block name used for ledger identity and logging.
    pub name: String,
    /// Optional name *template*; when set, it is rendered with the step's
    /// arguments and replaces `name` (per-entity block names).
    pub name_template: Option<String>,
    pub path: String,
    pub content: String,
    pub rule: Rule,
}

impl SecondaryOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name_template(mut self, t: impl Into<String>) -> Self {
        self.name_template = Some(t.into());
        self
    }

    pub fn path(mut self, p: impl Into<String>) -> Self {
        self.path = p.into();
        self
    }

    pub fn content(mut self, c: impl Into<String>) -> Self {
        self.content = c.into();
        self
    }

    pub fn rule(mut self, r: Rule) -> Self {
        self.rule = r;
        self
    }
}

/// A named, ordered bundle of template definitions describing one logical
/// artifact (e.g. the API layer for an entity).
#[derive(Debug, Clone, Default)]
pub struct GroupTemplate {
    pub name: String,
    pub description: String,
    /// Shared base path template; informational for listing, definitions
    /// carry their own concrete path templates.
    pub base_path: String,
    /// Arguments that must be present before any of this group's
    /// definitions render. Checked at plan time, not mid-apply.
    pub required_args: Vec<String>,
    pub templates: Vec<TemplateDefinition>,
}

impl GroupTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = d.into();
        self
    }

    pub fn base_path(mut self, p: impl Into<String>) -> Self {
        self.base_path = p.into();
        self
    }

    pub fn require_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn template(mut self, t: TemplateDefinition) -> Self {
        self.templates.push(t);
        self
    }

    /// Find a definition by name.
    pub fn definition(&self, name: &str) -> Option<&TemplateDefinition> {
        self.templates.iter().find(|t| t.name == name)
    }
}

/// Registry of groups, keyed by group name.
///
/// Registration fails fast on a duplicate name — a clash is a programming
/// error in the group set, and discovering it mid-sequence would leave a
/// half-applied run behind.
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: BTreeMap<String, GroupTemplate>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one group.
    ///
    /// # Errors
    ///
    /// [`DomainError::DuplicateGroup`] if a group with the same name is
    /// already registered.
    pub fn register(&mut self, group: GroupTemplate) -> Result<(), DomainError> {
        if self.groups.contains_key(&group.name) {
            return Err(DomainError::DuplicateGroup {
                name: group.name.clone(),
            });
        }
        self.groups.insert(group.name.clone(), group);
        Ok(())
    }

    /// Register several groups, stopping at the first duplicate.
    pub fn register_all(&mut self, groups: impl IntoIterator<Item = GroupTemplate>) -> Result<(), DomainError> {
        for g in groups {
            self.register(g)?;
        }
        Ok(())
    }

    /// Look up a group by name.
    pub fn get(&self, name: &str) -> Option<&GroupTemplate> {
        self.groups.get(name)
    }

    /// Look up a (group, definition) pair, with descriptive errors.
    pub fn resolve(&self, group: &str, definition: &str) -> Result<(&GroupTemplate, &TemplateDefinition), DomainError> {
        let g = self.get(group).ok_or_else(|| DomainError::UnknownGroup {
            name: group.to_string(),
        })?;
        let d = g.definition(definition).ok_or_else(|| DomainError::UnknownDefinition {
            group: group.to_string(),
            name: definition.to_string(),
        })?;
        Ok((g, d))
    }

    /// Iterate groups in name order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupTemplate> {
        self.groups.values()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
