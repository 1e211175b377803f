//! Built-in template groups.
//!
//! This module provides [`all_groups`], the group set graft registers at
//! startup: the Model / Repo / Dto / Api / Service layers for one entity in
//! an axum-flavored service tree. Groups are defined in code — templates are
//! short, rule-heavy, and version with the binary.
//!
//! The group set exercises every rule combination the engine supports:
//! Init-seeded files, End-appended blocks, anchor insertions with per-entity
//! anchor names, secondary outputs wiring `mod.rs` declarations, and
//! missing-file policies for patch-only definitions.

use graft_core::domain::{
    GroupTemplate, OnExistingFile, OnMissingFile, Rule, SecondaryOutput, SpliceAt,
    TemplateDefinition,
};

/// All built-in groups, ready for `Engine::register_templates`.
pub fn all_groups() -> Vec<GroupTemplate> {
    vec![model_group(), repo_group(), dto_group(), api_group(), service_group()]
}

/// Seed rule shared by every file-creating definition: create when absent,
/// leave an existing file alone, write immediately.
fn seed_rule() -> Rule {
    Rule::new()
        .on_missing(OnMissingFile::Create)
        .on_existing(OnExistingFile::Ignore)
        .splice_at(SpliceAt::Init)
        .auto_apply(true)
}

/// Patch rule for blocks that require their target to already exist.
fn patch_rule() -> Rule {
    Rule::new()
        .on_missing(OnMissingFile::Error)
        .missing_file_error(|path| format!("file not exists: {}", path.display()))
        .on_existing(OnExistingFile::Splice)
        .splice_at(SpliceAt::End)
        .auto_apply(true)
}

/// Secondary output appending a `pub mod` declaration to a module index.
fn mod_wire(index_path: &str, module_expr: &str) -> SecondaryOutput {
    SecondaryOutput::new("WireMod")
        .name_template(format!("WireMod_{module_expr}"))
        .path(index_path)
        .content(format!("pub mod {module_expr};"))
        .rule(
            Rule::new()
                .on_missing(OnMissingFile::Create)
                .on_existing(OnExistingFile::Splice)
                .splice_at(SpliceAt::End),
        )
}

fn model_group() -> GroupTemplate {
    GroupTemplate::new("Model")
        .description("Entity model definitions")
        .base_path("src/model")
        .require_args(["entity"])
        .template(
            TemplateDefinition::new("InitModelFile")
                .description("New model file")
                .path("src/model/{{ entity | sSnake }}.rs")
                .rule(seed_rule())
                .content(
                    r#"//! {{ entity | sPascal }} model.

use serde::{Deserialize, Serialize};

{{ "derive(Debug, Clone, Serialize, Deserialize)" | mkAttr }}
pub struct {{ entity | sPascal }} {
    pub id: i64,
    //+graft={{ entity | sPascal }}Fields
}
"#,
                )
                .output(mod_wire("src/model/mod.rs", "{{ entity | sSnake }}")),
        )
}

fn repo_group() -> GroupTemplate {
    GroupTemplate::new("Repo")
        .description("Persistence layer for entity records")
        .base_path("src/repo")
        .require_args(["entity"])
        .template(
            TemplateDefinition::new("InitRepoFile")
                .description("New repository file")
                .path("src/repo/{{ entity | sSnake }}_repo.rs")
                .rule(seed_rule())
                .content(
                    r#"//! Persistence for {{ entity | sPascal }} records.

use crate::model::{{ entity | sSnake }}::{{ entity | sPascal }};

pub struct {{ entity | sPascal }}Repo;

impl {{ entity | sPascal }}Repo {
    pub async fn by_id(&self, id: i64) -> Option<{{ entity | sPascal }}> {
        //+graft={{ entity | sPascal }}RepoQueries
        None
    }
}
"#,
                )
                .output(mod_wire("src/repo/mod.rs", "{{ entity | sSnake }}_repo")),
        )
}

fn dto_group() -> GroupTemplate {
    GroupTemplate::new("Dto")
        .description("Request/response payload definitions")
        .base_path("src/dto")
        .require_args(["entity", "subdomain"])
        .template(
            TemplateDefinition::new("InitDtoFile")
                .description("New payload module for a subdomain")
                .path("src/dto/{{ subdomain | modpath }}.rs")
                .rule(seed_rule())
                .content(
                    r#"//! Payloads for the {{ subdomain | modpath }} API.

use serde::{Deserialize, Serialize};
"#,
                )
                .output(mod_wire("src/dto/mod.rs", "{{ subdomain | modpath }}")),
        )
        .template(
            TemplateDefinition::new("InitReqRes")
                .name_template("ReqRes_{{ action | sPascal }}{{ entity | sPascal }}")
                .description("Request and response pair for one action")
                .path("src/dto/{{ subdomain | modpath }}.rs")
                .rule(patch_rule())
                .content(
                    r#"/// Request payload of {{ entity | sPascal }}::{{ action | sSnake }}.
{{ "derive(Debug, Deserialize)" | mkAttr }}
pub struct {{ action | sPascal }}{{ entity | sPascal }}Req {}

/// Response payload of {{ entity | sPascal }}::{{ action | sSnake }}.
{{ "derive(Debug, Serialize)" | mkAttr }}
pub struct {{ action | sPascal }}{{ entity | sPascal }}Res {}
"#,
                ),
        )
}

fn api_group() -> GroupTemplate {
    let mut group = GroupTemplate::new("Api")
        .description("HTTP controllers and service contracts")
        .base_path("src/api/{{ subdomain | modpath }}")
        .require_args(["entity", "subdomain"])
        .template(
            TemplateDefinition::new("InitServiceTraitFile")
                .description("New service-contract file for a subdomain")
                .path("src/api/{{ subdomain | modpath }}/interface.rs")
                .rule(seed_rule())
                .content(
                    r#"//! Service contracts for the {{ subdomain | modpath }} API.

use crate::dto::{{ subdomain | modpath }} as dto;
"#,
                )
                .output(mod_wire("src/api/{{ subdomain | modpath }}/mod.rs", "interface")),
        )
        .template(
            TemplateDefinition::new("InitApiFile")
                .description("New HTTP controller")
                .path("src/api/{{ subdomain | modpath }}/{{ entity | sSnake }}.rs")
                .rule(seed_rule())
                .content(
                    r#"//! HTTP controller for {{ entity | sPascal }}.

use axum::Router;

use super::interface::{{ entity | sPascal }}Service;
use crate::dto::{{ subdomain | modpath }} as dto;

pub struct {{ entity | sPascal }}Api<S> {
    svc: S,
}

impl<S: {{ entity | sPascal }}Service> {{ entity | sPascal }}Api<S> {
    pub fn new(svc: S) -> Self {
        Self { svc }
    }

    pub fn routes(self) -> Router {
        Router::new()
            //+graft=Bind{{ entity | sPascal }}Routes
    }
}
"#,
                )
                .output(
                    SecondaryOutput::new("ServiceTrait")
                        .name_template("{{ entity | sPascal }}ServiceTrait")
                        .path("src/api/{{ subdomain | modpath }}/interface.rs")
                        .rule(patch_rule())
                        .content(
                            r#"/// Service handler contract for {{ entity | sPascal }}.
pub trait {{ entity | sPascal }}Service {
    //+graft={{ entity | sPascal }}ServiceMethods
}
"#,
                        ),
                )
                .output(mod_wire(
                    "src/api/{{ subdomain | modpath }}/mod.rs",
                    "{{ entity | sSnake }}",
                )),
        );

    for (method, routing_fn) in [
        ("GET", "get"),
        ("LIST", "get"),
        ("POST", "post"),
        ("PATCH", "patch"),
        ("DELETE", "delete"),
    ] {
        group = group.template(handler_definition(method, routing_fn));
    }

    group
}

/// One verb-handler definition: the controller method, plus anchor outputs
/// wiring the service contract and the route table.
fn handler_definition(method: &str, routing_fn: &str) -> TemplateDefinition {
    TemplateDefinition::new(format!("Handler_{method}"))
        .name_template(format!("Handler_{method}_{{{{ action | sSnake }}}}"))
        .description(format!("New {method} handler"))
        .path("src/api/{{ subdomain | modpath }}/{{ entity | sSnake }}.rs")
        .rule(patch_rule())
        .content(
            r#"impl<S: {{ entity | sPascal }}Service> {{ entity | sPascal }}Api<S> {
    /// {{ method | upper }} {{ route | lslash | routeParams }}
    pub async fn {{ action | sSnake }}(&self, req: dto::{{ action | sPascal }}{{ entity | sPascal }}Req) -> dto::{{ action | sPascal }}{{ entity | sPascal }}Res {
        self.svc.{{ action | sSnake }}(req).await
    }
}
"#,
        )
        .output(
            SecondaryOutput::new("ServiceMethod")
                .name_template("{{ entity | sPascal }}ServiceMethod_{{ action | sSnake }}")
                .path("src/api/{{ subdomain | modpath }}/interface.rs")
                .rule(
                    Rule::new()
                        .on_missing(OnMissingFile::Error)
                        .missing_file_error(|path| format!("file not exists: {}", path.display()))
                        .on_existing(OnExistingFile::Splice)
                        .anchor("{{ entity | sPascal }}ServiceMethods")
                        .auto_apply(true),
                )
                .content(
                    "async fn {{ action | sSnake }}(&self, req: dto::{{ action | sPascal }}{{ entity | sPascal }}Req) -> dto::{{ action | sPascal }}{{ entity | sPascal }}Res;",
                ),
        )
        .output(
            SecondaryOutput::new("BindRoute")
                .name_template("Bind{{ entity | sPascal }}Route_{{ action | sSnake }}")
                .path("src/api/{{ subdomain | modpath }}/{{ entity | sSnake }}.rs")
                .rule(
                    Rule::new()
                        .on_missing(OnMissingFile::Error)
                        .missing_file_error(|path| format!("file not exists: {}", path.display()))
                        .on_existing(OnExistingFile::Splice)
                        .anchor("Bind{{ entity | sPascal }}Routes"),
                )
                .content(format!(
                    ".route(\"{{{{ route | lslash | routeParams }}}}\", axum::routing::{routing_fn}(Self::{{{{ action | sSnake }}}}))"
                )),
        )
}

fn service_group() -> GroupTemplate {
    GroupTemplate::new("Service")
        .description("Application services implementing API contracts")
        .base_path("src/service")
        .require_args(["entity"])
        .template(
            TemplateDefinition::new("InitServiceFile")
                .description("New application service")
                .path("src/service/{{ entity | sSnake }}_service.rs")
                .rule(seed_rule())
                .content(
                    r#"//! Application service for {{ entity | sPascal }}.

use crate::repo::{{ entity | sSnake }}_repo::{{ entity | sPascal }}Repo;

pub struct {{ entity | sPascal }}Svc {
    repo: {{ entity | sPascal }}Repo,
}

impl {{ entity | sPascal }}Svc {
    pub fn new(repo: {{ entity | sPascal }}Repo) -> Self {
        Self { repo }
    }
}
"#,
                )
                .output(mod_wire("src/service/mod.rs", "{{ entity | sSnake }}_service")),
        )
        .template(
            TemplateDefinition::new("InitServiceHandler")
                .name_template("ServiceHandler_{{ action | sSnake }}")
                .description("Service method stub for one action")
                .path("src/service/{{ entity | sSnake }}_service.rs")
                .rule(patch_rule())
                .content(
                    r#"impl {{ entity | sPascal }}Svc {
    pub async fn {{ action | sSnake }}(
        &self,
        req: crate::dto::{{ subdomain | modpath }}::{{ action | sPascal }}{{ entity | sPascal }}Req,
    ) -> crate::dto::{{ subdomain | modpath }}::{{ action | sPascal }}{{ entity | sPascal }}Res {
        todo!("implement {{ entity | sSnake }} {{ action | sSnake }}")
    }
}
"#,
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::domain::{ArgMap, PipelineRegistry, render};

    #[test]
    fn five_groups_registered() {
        let names: Vec<_> = all_groups().into_iter().map(|g| g.name).collect();
        assert_eq!(names, ["Model", "Repo", "Dto", "Api", "Service"]);
    }

    #[test]
    fn api_group_has_all_verb_handlers() {
        let api = api_group();
        for method in ["GET", "LIST", "POST", "PATCH", "DELETE"] {
            assert!(
                api.definition(&format!("Handler_{method}")).is_some(),
                "missing Handler_{method}"
            );
        }
    }

    #[test]
    fn model_template_renders_clean() {
        let def = model_group();
        let def = def.definition("InitModelFile").unwrap();
        let args = ArgMap::from_pairs([("entity", "user_role")]);
        let reg = PipelineRegistry::with_builtin();

        let body = render(&def.content, &args, &reg).unwrap();
        assert!(body.contains("pub struct UserRole {"));
        assert!(body.contains("//+graft=UserRoleFields"));

        let path = render(&def.path, &args, &reg).unwrap();
        assert_eq!(path, "src/model/user_role.rs");
    }

    #[test]
    fn handler_route_binding_renders_axum_route() {
        let api = api_group();
        let def = api.definition("Handler_POST").unwrap();
        let bind = &def.outputs[1];
        let args = ArgMap::from_pairs([
            ("entity", "widget"),
            ("subdomain", "cms"),
            ("action", "create"),
            ("route", ""),
        ]);
        let reg = PipelineRegistry::with_builtin();

        let line = render(&bind.content, &args, &reg).unwrap();
        assert_eq!(line, ".route(\"\", axum::routing::post(Self::create))");
    }

    #[test]
    fn seed_definitions_create_and_ignore() {
        for group in all_groups() {
            for def in &group.templates {
                if def.name.starts_with("Init") && def.rule.splice_at == SpliceAt::Init {
                    assert_eq!(def.rule.on_missing, OnMissingFile::Create, "{}", def.name);
                    assert_eq!(def.rule.on_existing, OnExistingFile::Ignore, "{}", def.name);
                }
            }
        }
    }
}
