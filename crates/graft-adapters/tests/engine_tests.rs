//! End-to-end engine tests against the in-memory adapters.
//!
//! These cover the observable contract of a generation run: idempotent
//! re-application, declaration-order output, anchor reusability, conflict
//! rejection, argument gating, and select-branch exclusivity.

use std::path::Path;

use graft_adapters::builtin_groups;
use graft_adapters::{MemoryFilesystem, MemoryStateStore, SymbolValidator};
use graft_core::application::{Engine, EngineConfig};
use graft_core::application::ports::StateStore;
use graft_core::domain::{
    ArgMap, GroupTemplate, OnExistingFile, OnMissingFile, Rule, Sequence, SequenceElement,
    SpliceAt, TemplateDefinition, forward_all,
};
use graft_core::error::GraftError;

/// Engine over fresh in-memory adapters, with the built-in groups loaded.
/// Returns the filesystem and ledger handles so tests can inspect them.
fn engine() -> (Engine, MemoryFilesystem, MemoryStateStore) {
    let fs = MemoryFilesystem::new();
    let state = MemoryStateStore::new();

    let mut engine = Engine::new(
        EngineConfig::new().root(""),
        Box::new(fs.clone()),
        Box::new(state.clone()),
        Box::new(SymbolValidator::new()),
    );
    engine.register_templates(builtin_groups::all_groups()).unwrap();

    (engine, fs, state)
}

fn module_args(entity: &str) -> ArgMap {
    ArgMap::from_pairs([("subdomain", "cms"), ("entity", entity)])
}

fn handler_args(entity: &str, method: &str, action: &str, route: &str) -> ArgMap {
    module_args(entity)
        .with("method", method)
        .with("action", action)
        .with("route", route)
}

/// The full module sequence: model, repo, API contract + controller, dto,
/// service.
fn module_sequence() -> Sequence {
    Sequence::new("NewApiModule")
        .add_elem(SequenceElement::new("Model", "InitModelFile").forward(forward_all))
        .add_elem(SequenceElement::new("Repo", "InitRepoFile").forward(forward_all))
        .add_elems([
            SequenceElement::new("Api", "InitServiceTraitFile").forward(forward_all),
            SequenceElement::new("Api", "InitApiFile").forward(forward_all),
        ])
        .add_elem(SequenceElement::new("Dto", "InitDtoFile").forward(forward_all))
        .add_elem(SequenceElement::new("Service", "InitServiceFile"))
}

/// The verb-handler sequence with its method select.
fn handler_sequence() -> Sequence {
    let branches = ["GET", "LIST", "POST", "PATCH", "DELETE"]
        .into_iter()
        .map(|method| {
            Sequence::new(method).add_elem(
                SequenceElement::new("Api", format!("Handler_{method}")).forward(forward_all),
            )
        })
        .collect();

    Sequence::new("NewApiHandler")
        .add_elems([
            SequenceElement::new("Dto", "InitDtoFile").forward(forward_all),
            SequenceElement::new("Dto", "InitReqRes").forward(forward_all),
        ])
        .select("method", branches)
        .add_elem(SequenceElement::new("Service", "InitServiceHandler"))
}

fn run(engine: &mut Engine, args: ArgMap, seq: &Sequence) {
    engine.set_args(args);
    engine.build_seq(seq).unwrap();
    engine.apply().unwrap();
}

// ── scenario: seeding an empty tree ──────────────────────────────────────────

#[test]
fn init_seeds_model_file_with_exactly_the_rendered_content() {
    let (mut engine, fs, _) = engine();
    engine.set_args(ArgMap::from_pairs([("entity", "Widget"), ("subdomain", "cms")]));
    engine
        .build_seq(&Sequence::new("seed").add_elem(SequenceElement::new("Model", "InitModelFile")))
        .unwrap();
    engine.apply().unwrap();

    let body = fs.file(Path::new("src/model/widget.rs")).unwrap();
    assert!(body.starts_with("//! Widget model."));
    assert!(body.contains("pub struct Widget {"));
    assert!(body.contains("//+graft=WidgetFields"));

    // The mod.rs secondary output landed too.
    let index = fs.file(Path::new("src/model/mod.rs")).unwrap();
    assert_eq!(index.trim(), "pub mod widget;");
}

#[test]
fn full_module_sequence_creates_the_whole_layer() {
    let (mut engine, fs, _) = engine();
    run(&mut engine, module_args("Article"), &module_sequence());

    for path in [
        "src/model/article.rs",
        "src/model/mod.rs",
        "src/repo/article_repo.rs",
        "src/api/cms/interface.rs",
        "src/api/cms/article.rs",
        "src/api/cms/mod.rs",
        "src/dto/cms.rs",
        "src/service/article_service.rs",
    ] {
        assert!(fs.file(Path::new(path)).is_some(), "missing {path}");
    }

    let iface = fs.file(Path::new("src/api/cms/interface.rs")).unwrap();
    assert!(iface.contains("pub trait ArticleService {"));
    assert!(iface.contains("//+graft=ArticleServiceMethods"));
}

// ── idempotence ──────────────────────────────────────────────────────────────

#[test]
fn applying_the_same_sequence_twice_is_byte_identical() {
    let (mut engine, fs, _) = engine();
    run(&mut engine, module_args("Article"), &module_sequence());

    let first: Vec<_> = fs
        .list_files()
        .into_iter()
        .map(|p| (p.clone(), fs.file(&p).unwrap()))
        .collect();

    run(&mut engine, module_args("Article"), &module_sequence());

    for (path, content) in first {
        assert_eq!(
            fs.file(&path).unwrap(),
            content,
            "second run changed {}",
            path.display()
        );
    }
}

#[test]
fn handler_reapply_does_not_duplicate_blocks() {
    let (mut engine, fs, _) = engine();
    run(&mut engine, module_args("Article"), &module_sequence());

    let args = handler_args("Article", "POST", "Create", "");
    run(&mut engine, args.clone(), &handler_sequence());
    let once = fs.file(Path::new("src/api/cms/article.rs")).unwrap();

    run(&mut engine, args, &handler_sequence());
    let twice = fs.file(Path::new("src/api/cms/article.rs")).unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.matches("pub async fn create").count(), 1);
}

// ── ordering ─────────────────────────────────────────────────────────────────

#[test]
fn end_appends_preserve_declaration_order() {
    let group = GroupTemplate::new("Notes").require_args(["entity"]).template(
        TemplateDefinition::new("A").path("notes.rs").content("// A {{ entity }}"),
    )
    .template(TemplateDefinition::new("B").path("notes.rs").content("// B {{ entity }}"))
    .template(TemplateDefinition::new("C").path("notes.rs").content("// C {{ entity }}"));

    let (mut engine, fs, _) = engine();
    engine.register_templates([group]).unwrap();

    engine.set_args(ArgMap::from_pairs([("entity", "Widget")]));
    engine
        .build_seq(&Sequence::new("ordered").add_elems([
            SequenceElement::new("Notes", "A"),
            SequenceElement::new("Notes", "B"),
            SequenceElement::new("Notes", "C"),
        ]))
        .unwrap();
    engine.apply().unwrap();

    let body = fs.file(Path::new("notes.rs")).unwrap();
    let a = body.find("// A Widget").unwrap();
    let b = body.find("// B Widget").unwrap();
    let c = body.find("// C Widget").unwrap();
    assert!(a < b && b < c, "out of order: {body}");
}

#[test]
fn end_append_lands_strictly_after_existing_content() {
    let (mut engine, fs, _) = engine();
    fs.seed("src/dto/cms.rs", "//! Payloads.\n\npub struct Existing {}\n");

    engine.set_args(handler_args("Widget", "POST", "Create", ""));
    engine
        .build_seq(&Sequence::new("append").add_elem(SequenceElement::new("Dto", "InitReqRes")))
        .unwrap();
    engine.apply().unwrap();

    let body = fs.file(Path::new("src/dto/cms.rs")).unwrap();
    let old = body.find("pub struct Existing {}").unwrap();
    let new = body.find("pub struct CreateWidgetReq {}").unwrap();
    assert!(old < new);
    assert!(body.starts_with("//! Payloads.\n"));
}

// ── anchors ──────────────────────────────────────────────────────────────────

#[test]
fn anchor_accepts_repeated_insertions_and_survives() {
    let (mut engine, fs, _) = engine();
    run(&mut engine, module_args("Article"), &module_sequence());

    run(
        &mut engine,
        handler_args("Article", "POST", "Create", ""),
        &handler_sequence(),
    );
    run(
        &mut engine,
        handler_args("Article", "GET", "Get", "/{id}"),
        &handler_sequence(),
    );

    let iface = fs.file(Path::new("src/api/cms/interface.rs")).unwrap();
    let create = iface.find("async fn create(").unwrap();
    let get = iface.find("async fn get(").unwrap();
    let marker = iface.find("//+graft=ArticleServiceMethods").unwrap();

    // Both insertions precede the marker, and the marker is still there for
    // a third future insertion.
    assert!(create < marker && get < marker);
    assert!(create < get, "insertions keep arrival order");

    let controller = fs.file(Path::new("src/api/cms/article.rs")).unwrap();
    assert!(controller.contains(".route(\"\", axum::routing::post(Self::create))"));
    assert!(controller.contains(".route(\"/:id\", axum::routing::get(Self::get))"));
}

#[test]
fn missing_anchor_is_a_hard_error_naming_anchor_and_file() {
    let (mut engine, fs, _) = engine();
    run(&mut engine, module_args("Article"), &module_sequence());

    // Destroy the anchor line in the interface file.
    let iface = fs.file(Path::new("src/api/cms/interface.rs")).unwrap();
    fs.seed(
        "src/api/cms/interface.rs",
        iface.replace("//+graft=ArticleServiceMethods", ""),
    );

    engine.set_args(handler_args("Article", "POST", "Create", ""));
    engine.build_seq(&handler_sequence()).unwrap();
    let err = engine.apply().unwrap_err();

    let message = err.to_string();
    assert!(message.contains("ArticleServiceMethods"), "{message}");
    assert!(message.contains("interface.rs"), "{message}");
}

#[test]
fn duplicated_anchor_is_rejected_not_guessed() {
    let (mut engine, fs, _) = engine();
    run(&mut engine, module_args("Article"), &module_sequence());

    let iface = fs.file(Path::new("src/api/cms/interface.rs")).unwrap();
    fs.seed(
        "src/api/cms/interface.rs",
        format!("{iface}\n//+graft=ArticleServiceMethods\n"),
    );

    engine.set_args(handler_args("Article", "POST", "Create", ""));
    engine.build_seq(&handler_sequence()).unwrap();
    let err = engine.apply().unwrap_err();
    assert!(err.to_string().contains("expected exactly one"), "{err}");
}

// ── validation ───────────────────────────────────────────────────────────────

#[test]
fn conflicting_symbol_rejected_and_file_untouched() {
    let (mut engine, fs, _) = engine();
    fs.seed(
        "src/dto/cms.rs",
        "pub struct CreateWidgetReq {}\n",
    );
    let before = fs.file(Path::new("src/dto/cms.rs")).unwrap();

    engine.set_args(handler_args("Widget", "POST", "Create", ""));
    engine
        .build_seq(&Sequence::new("conflict").add_elem(SequenceElement::new("Dto", "InitReqRes")))
        .unwrap();

    let err = engine.apply().unwrap_err();
    assert!(matches!(err, GraftError::Validation(_)), "{err}");
    assert_eq!(fs.file(Path::new("src/dto/cms.rs")).unwrap(), before);
}

// ── argument gating ──────────────────────────────────────────────────────────

#[test]
fn missing_required_argument_fails_before_any_file_changes() {
    let (mut engine, fs, _) = engine();
    engine.set_args(ArgMap::from_pairs([("subdomain", "cms")])); // no entity

    let err = engine.build_seq(&module_sequence()).unwrap_err();
    assert!(err.to_string().contains("entity"), "{err}");
    assert!(fs.list_files().is_empty());
}

// ── select ───────────────────────────────────────────────────────────────────

#[test]
fn select_runs_exactly_the_discriminated_branch() {
    let (mut engine, fs, _) = engine();
    run(&mut engine, module_args("Widget"), &module_sequence());
    run(
        &mut engine,
        handler_args("Widget", "POST", "Create", ""),
        &handler_sequence(),
    );

    let controller = fs.file(Path::new("src/api/cms/widget.rs")).unwrap();
    assert!(controller.contains("pub async fn create"));
    assert_eq!(controller.matches("pub async fn").count(), 1, "{controller}");
    assert!(controller.contains("axum::routing::post"));
    for other in ["axum::routing::get", "axum::routing::patch", "axum::routing::delete"] {
        assert!(!controller.contains(other), "unexpected {other}");
    }
}

#[test]
fn select_with_unknown_method_is_an_error() {
    let (mut engine, _, _) = engine();
    engine.set_args(handler_args("Widget", "PUT", "Replace", ""));
    let err = engine.build_seq(&handler_sequence()).unwrap_err();
    assert!(err.to_string().contains("PUT"), "{err}");
}

// ── partial failure and resume ───────────────────────────────────────────────

#[test]
fn failed_run_keeps_prior_entries_and_resumes_cleanly() {
    let (mut engine, fs, state) = engine();
    run(&mut engine, module_args("Article"), &module_sequence());

    // Sabotage the route anchor so the handler sequence fails at its last
    // anchor insertion; earlier auto-applied entries must stay committed.
    let controller = fs.file(Path::new("src/api/cms/article.rs")).unwrap();
    fs.seed(
        "src/api/cms/article.rs",
        controller.replace("//+graft=BindArticleRoutes", ""),
    );

    engine.set_args(handler_args("Article", "POST", "Create", ""));
    engine.build_seq(&handler_sequence()).unwrap();
    assert!(engine.apply().is_err());

    // The trait method (applied before the failing route bind) is committed.
    let iface = fs.file(Path::new("src/api/cms/interface.rs")).unwrap();
    assert!(iface.contains("async fn create("));
    let records_after_failure = state.len();

    // Restore the anchor and re-run: applied entries are skipped, the run
    // completes, and nothing is duplicated.
    let broken = fs.file(Path::new("src/api/cms/article.rs")).unwrap();
    fs.seed(
        "src/api/cms/article.rs",
        format!("{}\n            //+graft=BindArticleRoutes\n", broken.trim_end()),
    );

    engine.set_args(handler_args("Article", "POST", "Create", ""));
    engine.build_seq(&handler_sequence()).unwrap();
    engine.apply().unwrap();

    assert!(state.len() > records_after_failure);
    let iface = fs.file(Path::new("src/api/cms/interface.rs")).unwrap();
    assert_eq!(iface.matches("async fn create(").count(), 1);
}

// ── pending coalescing ───────────────────────────────────────────────────────

#[test]
fn held_edits_to_one_file_coalesce_into_a_single_flush() {
    let held = Rule::new()
        .on_missing(OnMissingFile::Create)
        .on_existing(OnExistingFile::Splice)
        .splice_at(SpliceAt::End)
        .auto_apply(false);

    let group = GroupTemplate::new("Held")
        .require_args(["entity"])
        .template(
            TemplateDefinition::new("One")
                .path("held.rs")
                .content("// one")
                .rule(held.clone()),
        )
        .template(
            TemplateDefinition::new("Two")
                .path("held.rs")
                .content("// two")
                .rule(held),
        );

    let (mut engine, fs, state) = engine();
    engine.register_templates([group]).unwrap();

    engine.set_args(ArgMap::from_pairs([("entity", "Widget")]));
    engine
        .build_seq(&Sequence::new("held").add_elems([
            SequenceElement::new("Held", "One"),
            SequenceElement::new("Held", "Two"),
        ]))
        .unwrap();
    engine.apply().unwrap();

    assert_eq!(fs.file(Path::new("held.rs")).unwrap(), "// one\n\n// two");
    // Both blocks recorded once the coalesced body flushed.
    assert_eq!(
        state
            .records()
            .unwrap()
            .iter()
            .filter(|r| r.path == Path::new("held.rs"))
            .count(),
        2
    );
}
