//! The sequence engine - main application orchestrator.
//!
//! One generation run is three calls:
//! 1. `set_args` establishes the argument map,
//! 2. `build_seq` validates the sequence and produces a flattened render plan,
//! 3. `apply` executes the plan against the filesystem.
//!
//! The engine owns the group and pipeline registries (built once at startup
//! and injected — no process-global state) and the driven ports behind boxed
//! trait objects.
//!
//! A run is single-threaded and synchronous. The ledger and pending edits
//! carry no locking; two concurrent invocations against the same target
//! tree are a documented misuse (the caller serializes runs per tree).

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::application::ports::{ContentValidator, Filesystem, StateStore};
use crate::application::services::mutator::{ApplyRequest, FileMutator, Outcome};
use crate::domain::{
    ArgMap, DomainError, GroupRegistry, GroupTemplate, PipelineRegistry, Rule, SeqNode, Sequence,
    StateKeyMode, TemplateDefinition, render,
};
use crate::error::GraftResult;

pub use crate::application::services::mutator::Hook;

/// Engine construction-time configuration.
///
/// Fluent setters mirror how a CLI wires the engine up once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root of the target source tree; resolved paths are joined onto this.
    pub root: PathBuf,
    /// Where the applied-content ledger lives (consumed by the state store
    /// adapter; recorded here so callers can display it).
    pub state_dir: PathBuf,
    /// Ledger block-identity mode.
    pub key_mode: StateKeyMode,
    /// Applied to each rendered block before validation and splicing.
    /// A hook that cannot process its input should return it unchanged.
    pub after_render: Option<Hook>,
    /// Applied to the full file body just before it is written. Same
    /// contract: return the input unchanged on failure.
    pub before_save: Option<Hook>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            state_dir: PathBuf::from(".graft/state"),
            key_mode: StateKeyMode::default(),
            after_render: None,
            before_save: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn key_mode(mut self, mode: StateKeyMode) -> Self {
        self.key_mode = mode;
        self
    }

    pub fn after_render_hook(mut self, hook: Hook) -> Self {
        self.after_render = Some(hook);
        self
    }

    pub fn before_save_hook(mut self, hook: Hook) -> Self {
        self.before_save = Some(hook);
        self
    }
}

/// One flattened plan entry: a definition's primary content or one of its
/// secondary outputs, with the step's derived arguments attached.
#[derive(Debug, Clone)]
struct PlanEntry {
    /// `Group::Definition` label for logging.
    label: String,
    /// Literal block name; replaced by `block_template` when present.
    block: String,
    /// Optional block-name template (per-entity block names).
    block_template: Option<String>,
    path_template: String,
    content_template: String,
    rule: Rule,
    args: ArgMap,
}

/// The sequence engine.
pub struct Engine {
    config: EngineConfig,
    groups: GroupRegistry,
    pipelines: PipelineRegistry,
    filesystem: Box<dyn Filesystem>,
    state: Box<dyn StateStore>,
    validator: Box<dyn ContentValidator>,
    args: ArgMap,
    plan: Vec<PlanEntry>,
}

impl Engine {
    /// Create an engine with the given adapters and a built-in pipeline set.
    pub fn new(
        config: EngineConfig,
        filesystem: Box<dyn Filesystem>,
        state: Box<dyn StateStore>,
        validator: Box<dyn ContentValidator>,
    ) -> Self {
        Self {
            config,
            groups: GroupRegistry::new(),
            pipelines: PipelineRegistry::with_builtin(),
            filesystem,
            state,
            validator,
            args: ArgMap::new(),
            plan: Vec::new(),
        }
    }

    /// Replace the pipeline registry wholesale (startup wiring).
    pub fn use_pipelines(&mut self, pipelines: PipelineRegistry) {
        self.pipelines = pipelines;
    }

    /// Register one additional pipeline function. Last registration wins.
    pub fn register_pipeline(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        self.pipelines.register(name, f);
    }

    /// Register template groups. Duplicate group names fail fast here, not
    /// mid-sequence.
    pub fn register_templates(
        &mut self,
        groups: impl IntoIterator<Item = GroupTemplate>,
    ) -> GraftResult<()> {
        self.groups.register_all(groups)?;
        Ok(())
    }

    /// Registered groups, for listing.
    pub fn groups(&self) -> impl Iterator<Item = &GroupTemplate> {
        self.groups.iter()
    }

    /// Establish the argument map for this invocation.
    pub fn set_args(&mut self, args: ArgMap) {
        self.args = args;
    }

    /// Validate a sequence and produce the flattened render plan.
    ///
    /// Walks elements in declaration order, expands each select node to the
    /// single branch named by its discriminator argument, and inlines every
    /// definition's secondary outputs immediately after their parent entry.
    /// Nothing renders and nothing is written here; a failure leaves no side
    /// effects.
    #[instrument(skip_all, fields(sequence = %seq.name))]
    pub fn build_seq(&mut self, seq: &Sequence) -> GraftResult<()> {
        let mut plan = Vec::new();
        self.walk(&seq.nodes, &mut plan)?;
        debug!(entries = plan.len(), "render plan built");
        self.plan = plan;
        Ok(())
    }

    fn walk(&self, nodes: &[SeqNode], plan: &mut Vec<PlanEntry>) -> GraftResult<()> {
        for node in nodes {
            match node {
                SeqNode::Element(elem) => {
                    let (group, def) = self.groups.resolve(&elem.group, &elem.definition)?;

                    let step_args = match elem.forward {
                        Some(f) => f(&self.args),
                        None => self.args.clone(),
                    };

                    for required in &group.required_args {
                        if !step_args.contains(required) {
                            return Err(DomainError::MissingRequiredArg {
                                group: group.name.clone(),
                                arg: required.clone(),
                            }
                            .into());
                        }
                    }

                    push_entries(plan, group, def, step_args);
                }
                SeqNode::Select { key, branches } => {
                    let value = self.args.get(key).ok_or_else(|| {
                        DomainError::MissingDiscriminator { key: key.clone() }
                    })?;
                    let branch = branches
                        .iter()
                        .find(|b| b.name == value)
                        .ok_or_else(|| DomainError::NoMatchingBranch {
                            key: key.clone(),
                            value: value.to_string(),
                        })?;
                    self.walk(&branch.nodes, plan)?;
                }
            }
        }
        Ok(())
    }

    /// Execute the render plan.
    ///
    /// Entries run strictly in plan order: render, validate, mutate. The
    /// first failure aborts the run — earlier auto-applied entries stay
    /// committed, pending-held entries are dropped unwritten, and the plan
    /// is left in place so the caller can inspect it.
    #[instrument(skip_all, fields(entries = self.plan.len()))]
    pub fn apply(&mut self) -> GraftResult<()> {
        let mut mutator = FileMutator::new(
            self.filesystem.as_ref(),
            self.state.as_ref(),
            self.validator.as_ref(),
            self.config.key_mode,
            self.config.before_save,
        );

        for entry in &self.plan {
            let outcome = Self::apply_entry(&self.config, &self.pipelines, &mut mutator, entry)?;
            debug!(entry = %entry.label, block = %entry.block, ?outcome, "plan entry processed");
        }

        mutator.flush()?;
        self.plan.clear();
        info!("sequence applied");
        Ok(())
    }

    fn apply_entry(
        config: &EngineConfig,
        pipelines: &PipelineRegistry,
        mutator: &mut FileMutator<'_>,
        entry: &PlanEntry,
    ) -> GraftResult<Outcome> {
        let mut content = render(&entry.content_template, &entry.args, pipelines)?;
        if let Some(hook) = config.after_render {
            content = hook(&content);
        }

        let rel_path = render(&entry.path_template, &entry.args, pipelines)?;
        let path = config.root.join(rel_path);

        let block = match &entry.block_template {
            Some(t) => render(t, &entry.args, pipelines)?,
            None => entry.block.clone(),
        };

        let anchor = match &entry.rule.anchor {
            Some(t) => Some(render(t, &entry.args, pipelines)?),
            None => None,
        };

        mutator.apply(ApplyRequest {
            path,
            block,
            content,
            anchor,
            rule: &entry.rule,
        })
    }
}

/// Append the plan entries for one resolved element: the definition's
/// primary content, then its secondary outputs in authored order.
fn push_entries(plan: &mut Vec<PlanEntry>, group: &GroupTemplate, def: &TemplateDefinition, args: ArgMap) {
    let label = format!("{}::{}", group.name, def.name);

    plan.push(PlanEntry {
        label: label.clone(),
        block: def.name.clone(),
        block_template: def.name_template.clone(),
        path_template: def.path.clone(),
        content_template: def.content.clone(),
        rule: def.rule.clone(),
        args: args.clone(),
    });

    for output in &def.outputs {
        plan.push(PlanEntry {
            label: format!("{label}>{}", output.name),
            block: output.name.clone(),
            block_template: output.name_template.clone(),
            path_template: output.path.clone(),
            content_template: output.content.clone(),
            rule: output.rule.clone(),
            args: args.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    //! Plan-construction tests. End-to-end apply behavior is covered by the
    //! adapter-backed suite in `graft-adapters/tests/engine_tests.rs`.

    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::application::ports::{ContentValidator, Filesystem, StateStore};
    use crate::domain::{AppliedRecord, SequenceElement};

    // Minimal inline doubles; the real test doubles live in graft-adapters.
    struct NullFs;
    impl Filesystem for NullFs {
        fn read_file(&self, _: &Path) -> GraftResult<String> {
            Ok(String::new())
        }
        fn write_file(&self, _: &Path, _: &str) -> GraftResult<()> {
            Ok(())
        }
        fn create_dir_all(&self, _: &Path) -> GraftResult<()> {
            Ok(())
        }
        fn exists(&self, _: &Path) -> bool {
            false
        }
    }

    #[derive(Default)]
    struct NullState(Arc<Mutex<Vec<AppliedRecord>>>);
    impl StateStore for NullState {
        fn contains(&self, _: &Path, _: &str) -> GraftResult<bool> {
            Ok(false)
        }
        fn insert(&self, record: AppliedRecord) -> GraftResult<()> {
            self.0.lock().unwrap().push(record);
            Ok(())
        }
        fn records(&self) -> GraftResult<Vec<AppliedRecord>> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    struct AcceptAll;
    impl ContentValidator for AcceptAll {
        fn validate(&self, _: &str) -> GraftResult<()> {
            Ok(())
        }
    }

    fn engine() -> Engine {
        let mut e = Engine::new(
            EngineConfig::default(),
            Box::new(NullFs),
            Box::new(NullState::default()),
            Box::new(AcceptAll),
        );
        e.register_templates([
            GroupTemplate::new("Model")
                .require_args(["entity"])
                .template(
                    crate::domain::TemplateDefinition::new("Init")
                        .path("src/model/{{ entity | sSnake }}.rs")
                        .content("pub struct {{ entity | sPascal }};"),
                ),
            GroupTemplate::new("Api").require_args(["entity"]).template(
                crate::domain::TemplateDefinition::new("Handler_POST")
                    .path("src/api.rs")
                    .content("post"),
            ),
        ])
        .unwrap();
        e
    }

    #[test]
    fn build_seq_flattens_in_declaration_order() {
        let mut e = engine();
        e.set_args(ArgMap::from_pairs([("entity", "Widget")]));

        let seq = Sequence::new("run")
            .add_elem(SequenceElement::new("Model", "Init"))
            .add_elem(SequenceElement::new("Api", "Handler_POST"));
        e.build_seq(&seq).unwrap();

        let labels: Vec<_> = e.plan.iter().map(|p| p.label.clone()).collect();
        assert_eq!(labels, ["Model::Init", "Api::Handler_POST"]);
    }

    #[test]
    fn missing_required_arg_aborts_plan() {
        let mut e = engine();
        e.set_args(ArgMap::new());

        let seq = Sequence::new("run").add_elem(SequenceElement::new("Model", "Init"));
        let err = e.build_seq(&seq).unwrap_err();
        assert!(matches!(
            err,
            crate::error::GraftError::Domain(DomainError::MissingRequiredArg { .. })
        ));
        assert!(e.plan.is_empty());
    }

    #[test]
    fn unknown_reference_aborts_plan() {
        let mut e = engine();
        e.set_args(ArgMap::from_pairs([("entity", "Widget")]));

        let seq = Sequence::new("run").add_elem(SequenceElement::new("Nope", "Init"));
        assert!(e.build_seq(&seq).is_err());
    }

    #[test]
    fn select_expands_exactly_one_branch() {
        let mut e = engine();
        e.set_args(ArgMap::from_pairs([("entity", "Widget"), ("method", "POST")]));

        let seq = Sequence::new("run").select(
            "method",
            vec![
                Sequence::new("GET").add_elem(SequenceElement::new("Model", "Init")),
                Sequence::new("POST").add_elem(SequenceElement::new("Api", "Handler_POST")),
            ],
        );
        e.build_seq(&seq).unwrap();

        let labels: Vec<_> = e.plan.iter().map(|p| p.label.clone()).collect();
        assert_eq!(labels, ["Api::Handler_POST"]);
    }

    #[test]
    fn select_without_discriminator_is_error() {
        let mut e = engine();
        e.set_args(ArgMap::from_pairs([("entity", "Widget")]));

        let seq = Sequence::new("run").select("method", vec![Sequence::new("GET")]);
        let err = e.build_seq(&seq).unwrap_err();
        assert!(matches!(
            err,
            crate::error::GraftError::Domain(DomainError::MissingDiscriminator { .. })
        ));
    }

    #[test]
    fn select_with_unmatched_value_is_error() {
        let mut e = engine();
        e.set_args(ArgMap::from_pairs([("entity", "Widget"), ("method", "PUT")]));

        let seq = Sequence::new("run").select("method", vec![Sequence::new("GET")]);
        let err = e.build_seq(&seq).unwrap_err();
        assert!(matches!(
            err,
            crate::error::GraftError::Domain(DomainError::NoMatchingBranch { .. })
        ));
    }

    #[test]
    fn forwarding_derives_step_arguments() {
        fn drop_entity(_: &ArgMap) -> ArgMap {
            ArgMap::new()
        }

        let mut e = engine();
        e.set_args(ArgMap::from_pairs([("entity", "Widget")]));

        let seq = Sequence::new("run")
            .add_elem(SequenceElement::new("Model", "Init").forward(drop_entity));
        // Forwarding empties the map, so the required-arg gate fires.
        assert!(e.build_seq(&seq).is_err());
    }
}
