//! The sequences each command executes.
//!
//! A sequence is an ordered composition of (group, definition) references;
//! the engine expands it into a render plan. Authors are responsible for
//! ordering: file-creating steps come before the steps that patch those
//! files.

use graft_core::domain::{Sequence, SequenceElement, forward_all};

/// Full API module for an entity: model, repo, API contract + controller,
/// payloads, service.
pub fn api_module() -> Sequence {
    Sequence::new("NewApiModule")
        .add_elems([SequenceElement::new("Model", "InitModelFile").forward(forward_all)])
        .add_elems([SequenceElement::new("Repo", "InitRepoFile").forward(forward_all)])
        .add_elems([
            SequenceElement::new("Api", "InitServiceTraitFile").forward(forward_all),
            SequenceElement::new("Api", "InitApiFile").forward(forward_all),
        ])
        .add_elems([SequenceElement::new("Dto", "InitDtoFile").forward(forward_all)])
        .add_elems([SequenceElement::new("Service", "InitServiceFile")])
}

/// One verb handler: payload pair, the selected verb's controller method and
/// wiring, then the service stub.
pub fn api_handler() -> Sequence {
    let branches = ["GET", "LIST", "POST", "PATCH", "DELETE"]
        .into_iter()
        .map(|method| {
            Sequence::new(method).add_elems([
                SequenceElement::new("Api", format!("Handler_{method}")).forward(forward_all),
            ])
        })
        .collect();

    Sequence::new("NewApiHandler")
        .add_elems([
            SequenceElement::new("Dto", "InitDtoFile").forward(forward_all),
            SequenceElement::new("Dto", "InitReqRes").forward(forward_all),
        ])
        .select("method", branches)
        .add_elems([SequenceElement::new("Service", "InitServiceHandler")])
}

/// Internal (non-HTTP) module: payloads and service only.
pub fn internal_module() -> Sequence {
    Sequence::new("NewInternalModule")
        .add_elems([SequenceElement::new("Dto", "InitDtoFile").forward(forward_all)])
        .add_elems([SequenceElement::new("Service", "InitServiceFile")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::domain::SeqNode;

    #[test]
    fn api_handler_selects_on_method() {
        let seq = api_handler();
        let select = seq
            .nodes
            .iter()
            .find_map(|n| match n {
                SeqNode::Select { key, branches } => Some((key, branches)),
                SeqNode::Element(_) => None,
            })
            .expect("handler sequence has a select node");

        assert_eq!(select.0, "method");
        let names: Vec<_> = select.1.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["GET", "LIST", "POST", "PATCH", "DELETE"]);
    }

    #[test]
    fn module_seeds_before_service() {
        let seq = api_module();
        assert!(!seq.is_empty());
        match &seq.nodes[0] {
            SeqNode::Element(e) => assert_eq!(e.group, "Model"),
            SeqNode::Select { .. } => panic!("module sequence has no select"),
        }
    }
}
