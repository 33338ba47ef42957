//! Backward dependency lookups over the workflow graph.
//!
//! Both lookups are pure functions of the current graph and are recomputed
//! on demand; graphs stay small (tens of steps), so there is no cache.

use std::collections::HashSet;

use uuid::Uuid;

use crate::catalog::BlockKind;
use crate::workflow::graph::FlowGraph;
use crate::workflow::types::StepParams;

/// Immediate predecessor of `id`: the source of its first incoming edge in
/// connection order. Fan-in beyond the first edge is ignored; graphs are
/// expected to be edge-sparse per node for these checks.
fn predecessor(graph: &FlowGraph, id: Uuid) -> Option<Uuid> {
    graph.incoming(id).next().map(|e| e.source)
}

/// Is `id` fed by an upstream `generator` step?
///
/// Walks backward from `id`, skipping pass-through kinds (wait,
/// image generation), until a terminal producer is found or the walk
/// exhausts. Used to lock a step's text/image fields when upstream AI
/// content generation will populate them.
pub fn fed_by_generator(graph: &FlowGraph, id: Uuid, generator: BlockKind) -> bool {
    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut current = predecessor(graph, id);

    while let Some(pid) = current {
        // cyclic graphs terminate the walk instead of looping
        if !visited.insert(pid) {
            return false;
        }
        let Some(node) = graph.node(pid) else {
            return false;
        };
        if node.kind() == generator {
            return true;
        }
        if !node.kind().is_pass_through() {
            return false;
        }
        current = predecessor(graph, pid);
    }
    false
}

/// Message variables available to `id` from an immediately preceding
/// form trigger.
///
/// Returns one `{{field}}` placeholder per captured field, in the order the
/// trigger selected them; empty when there is no form-trigger predecessor
/// or field capture is disabled.
pub fn form_variables(graph: &FlowGraph, id: Uuid) -> Vec<String> {
    let Some(pid) = predecessor(graph, id) else {
        return Vec::new();
    };
    let Some(node) = graph.node(pid) else {
        return Vec::new();
    };
    match &node.params {
        StepParams::FormTrigger(params) if params.capture_enabled => params
            .capture_fields
            .iter()
            .map(|field| format!("{{{{{field}}}}}"))
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::FormTriggerParams;

    #[test]
    fn generator_resolves_through_wait_pass_through() {
        // gen → wait → email: the email step is fed by the generator
        let mut graph = FlowGraph::new();
        let generate = graph.add_node(BlockKind::TextGenerator).unwrap();
        let wait = graph.add_node(BlockKind::Wait).unwrap();
        let email = graph.add_node(BlockKind::Email).unwrap();
        graph.connect(generate.id, wait.id).unwrap();
        graph.connect(wait.id, email.id).unwrap();

        assert!(fed_by_generator(&graph, email.id, BlockKind::TextGenerator));
        assert!(fed_by_generator(&graph, wait.id, BlockKind::TextGenerator));
    }

    #[test]
    fn generator_resolves_through_image_generation_pass_through() {
        let mut graph = FlowGraph::new();
        let text = graph.add_node(BlockKind::TextGenerator).unwrap();
        let image = graph.add_node(BlockKind::ImageGenerator).unwrap();
        let post = graph.add_node(BlockKind::Instagram).unwrap();
        graph.connect(text.id, image.id).unwrap();
        graph.connect(image.id, post.id).unwrap();

        assert!(fed_by_generator(&graph, post.id, BlockKind::TextGenerator));
        // the image generator itself is also a terminal producer
        assert!(fed_by_generator(&graph, post.id, BlockKind::ImageGenerator));
    }

    #[test]
    fn non_generator_predecessor_resolves_false() {
        let mut graph = FlowGraph::new();
        let first = graph.add_node(BlockKind::Email).unwrap();
        let second = graph.add_node(BlockKind::Email).unwrap();
        graph.connect(first.id, second.id).unwrap();

        assert!(!fed_by_generator(&graph, second.id, BlockKind::TextGenerator));
        assert!(!fed_by_generator(&graph, first.id, BlockKind::TextGenerator));
    }

    #[test]
    fn cyclic_pass_through_chain_terminates() {
        let mut graph = FlowGraph::new();
        let a = graph.add_node(BlockKind::Wait).unwrap();
        let b = graph.add_node(BlockKind::Wait).unwrap();
        graph.connect(a.id, b.id).unwrap();
        graph.connect(b.id, a.id).unwrap();

        assert!(!fed_by_generator(&graph, a.id, BlockKind::TextGenerator));
    }

    #[test]
    fn form_variables_follow_selection_order() {
        let mut graph = FlowGraph::new();
        let trigger = graph.add_node(BlockKind::FormTrigger).unwrap();
        let post = graph.add_node(BlockKind::Whatsapp).unwrap();
        graph.connect(trigger.id, post.id).unwrap();
        graph
            .update_params(
                trigger.id,
                StepParams::FormTrigger(FormTriggerParams {
                    page: Some("landing-1".to_string()),
                    capture_enabled: true,
                    capture_fields: vec!["email".to_string(), "name".to_string()],
                }),
            )
            .unwrap();

        assert_eq!(
            form_variables(&graph, post.id),
            vec!["{{email}}".to_string(), "{{name}}".to_string()]
        );
    }

    #[test]
    fn form_variables_empty_without_capture_or_trigger() {
        let mut graph = FlowGraph::new();
        let trigger = graph.add_node(BlockKind::FormTrigger).unwrap();
        let post = graph.add_node(BlockKind::Whatsapp).unwrap();
        let loose = graph.add_node(BlockKind::Email).unwrap();
        graph.connect(trigger.id, post.id).unwrap();
        graph
            .update_params(
                trigger.id,
                StepParams::FormTrigger(FormTriggerParams {
                    page: None,
                    capture_enabled: false,
                    capture_fields: vec!["email".to_string()],
                }),
            )
            .unwrap();

        assert!(form_variables(&graph, post.id).is_empty());
        assert!(form_variables(&graph, loose.id).is_empty());
    }
}
