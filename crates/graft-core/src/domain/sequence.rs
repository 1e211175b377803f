//! Sequences: ordered compositions of (group, definition) references.
//!
//! A [`Sequence`] is what a caller hands to the engine for one generation
//! run. Elements execute strictly in declaration order; there is no
//! dependency inference. A [`SeqNode::Select`] node holds named branches of
//! which exactly one — chosen by a discriminator argument — executes in
//! place of the node.

use crate::domain::args::ForwardArgs;

/// A reference to one definition inside one group, with optional argument
/// forwarding applied before the step renders.
#[derive(Debug, Clone)]
pub struct SequenceElement {
    pub group: String,
    pub definition: String,
    /// Derives this step's arguments from the running map.
    /// `None` means identity.
    pub forward: Option<ForwardArgs>,
}

impl SequenceElement {
    pub fn new(group: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            definition: definition.into(),
            forward: None,
        }
    }

    pub fn forward(mut self, f: ForwardArgs) -> Self {
        self.forward = Some(f);
        self
    }
}

/// One node in a sequence: a concrete element or a branch point.
#[derive(Debug, Clone)]
pub enum SeqNode {
    Element(SequenceElement),
    /// One-of-many branch. The engine reads the argument named by `key`
    /// and executes the single branch whose sequence name equals its value.
    Select { key: String, branches: Vec<Sequence> },
}

/// A named, ordered generation run.
#[derive(Debug, Clone)]
pub struct Sequence {
    pub name: String,
    pub nodes: Vec<SeqNode>,
}

impl Sequence {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Append one element.
    pub fn add_elem(mut self, elem: SequenceElement) -> Self {
        self.nodes.push(SeqNode::Element(elem));
        self
    }

    /// Append several elements, preserving order.
    pub fn add_elems(mut self, elems: impl IntoIterator<Item = SequenceElement>) -> Self {
        self.nodes
            .extend(elems.into_iter().map(SeqNode::Element));
        self
    }

    /// Append a select node. At plan time the engine matches the argument
    /// named `key` against each branch's name and expands exactly that
    /// branch; no match is a configuration error.
    pub fn select(mut self, key: impl Into<String>, branches: Vec<Sequence>) -> Self {
        self.nodes.push(SeqNode::Select {
            key: key.into(),
            branches,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_keep_declaration_order() {
        let seq = Sequence::new("run")
            .add_elem(SequenceElement::new("Model", "Init"))
            .add_elems([
                SequenceElement::new("Repo", "Init"),
                SequenceElement::new("Api", "Init"),
            ]);

        let names: Vec<_> = seq
            .nodes
            .iter()
            .map(|n| match n {
                SeqNode::Element(e) => e.group.as_str(),
                SeqNode::Select { .. } => "select",
            })
            .collect();
        assert_eq!(names, ["Model", "Repo", "Api"]);
    }

    #[test]
    fn select_holds_named_branches() {
        let seq = Sequence::new("run").select(
            "method",
            vec![Sequence::new("GET"), Sequence::new("POST")],
        );

        match &seq.nodes[0] {
            SeqNode::Select { key, branches } => {
                assert_eq!(key, "method");
                assert_eq!(branches.len(), 2);
                assert_eq!(branches[0].name, "GET");
            }
            SeqNode::Element(_) => panic!("expected select node"),
        }
    }
}
