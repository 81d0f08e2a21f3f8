use std::collections::HashMap;

use crate::adaptive::error::AdaptiveError;
use crate::adaptive::types::{ConceptNode, KnowledgeGraph};

/// Read-only concept graph for a session. Ingestion order is preserved and
/// serves as the stable order for lock lists and candidate fallback.
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    concepts: Vec<ConceptNode>,
    index: HashMap<String, usize>,
    source_document_id: Option<String>,
}

impl ConceptGraph {
    pub fn new(concepts: Vec<ConceptNode>) -> Result<Self, AdaptiveError> {
        let mut index = HashMap::with_capacity(concepts.len());
        for (i, concept) in concepts.iter().enumerate() {
            if index.insert(concept.concept_id.clone(), i).is_some() {
                return Err(AdaptiveError::DuplicateConcept(concept.concept_id.clone()));
            }
        }

        let mut graph = Self {
            concepts,
            index,
            source_document_id: None,
        };
        for concept in &mut graph.concepts {
            dedup_in_place(&mut concept.prerequisites);
        }
        Ok(graph)
    }

    /// Builds a graph from an ingestion payload, folding each edge into the
    /// target concept's prerequisite list.
    pub fn from_knowledge_graph(knowledge: KnowledgeGraph) -> Result<Self, AdaptiveError> {
        let KnowledgeGraph {
            concepts,
            edges,
            source_document_id,
            ..
        } = knowledge;

        let mut graph = Self::new(concepts)?;
        for edge in edges {
            let (Some(_), Some(&target)) = (graph.index.get(&edge.from), graph.index.get(&edge.to))
            else {
                return Err(AdaptiveError::UnknownEdgeEndpoint {
                    from: edge.from,
                    to: edge.to,
                });
            };
            let prerequisites = &mut graph.concepts[target].prerequisites;
            if !prerequisites.contains(&edge.from) {
                prerequisites.push(edge.from);
            }
        }
        graph.source_document_id = source_document_id;

        tracing::debug!(
            concepts = graph.concepts.len(),
            source = graph.source_document_id.as_deref().unwrap_or("-"),
            "concept graph built"
        );
        Ok(graph)
    }

    pub fn concepts(&self) -> &[ConceptNode] {
        &self.concepts
    }

    pub fn get(&self, concept_id: &str) -> Option<&ConceptNode> {
        self.index.get(concept_id).map(|&i| &self.concepts[i])
    }

    pub fn contains(&self, concept_id: &str) -> bool {
        self.index.contains_key(concept_id)
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn source_document_id(&self) -> Option<&str> {
        self.source_document_id.as_deref()
    }
}

fn dedup_in_place(ids: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.retain(|id| seen.insert(id.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::types::PrerequisiteEdge;

    fn edge(from: &str, to: &str) -> PrerequisiteEdge {
        PrerequisiteEdge {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn test_edges_merge_into_prerequisites() {
        let knowledge = KnowledgeGraph {
            concepts: vec![
                ConceptNode::new("a", "Sets"),
                ConceptNode::new("b", "Functions").with_prerequisites(["a"]),
                ConceptNode::new("c", "Limits"),
            ],
            edges: vec![edge("a", "b"), edge("b", "c")],
            source_document_id: Some("doc-1".to_string()),
            extracted_at: None,
        };
        let graph = ConceptGraph::from_knowledge_graph(knowledge).unwrap();

        assert_eq!(graph.get("b").unwrap().prerequisites, vec!["a".to_string()]);
        assert_eq!(graph.get("c").unwrap().prerequisites, vec!["b".to_string()]);
        assert_eq!(graph.source_document_id(), Some("doc-1"));
    }

    #[test]
    fn test_duplicate_concept_rejected() {
        let err = ConceptGraph::new(vec![ConceptNode::new("a", "A"), ConceptNode::new("a", "A2")])
            .unwrap_err();
        assert_eq!(err, AdaptiveError::DuplicateConcept("a".to_string()));
    }

    #[test]
    fn test_unknown_edge_endpoint_rejected() {
        let knowledge = KnowledgeGraph {
            concepts: vec![ConceptNode::new("a", "A")],
            edges: vec![edge("a", "zzz")],
            ..Default::default()
        };
        let err = ConceptGraph::from_knowledge_graph(knowledge).unwrap_err();
        assert!(matches!(err, AdaptiveError::UnknownEdgeEndpoint { .. }));
    }

    #[test]
    fn test_empty_graph_is_valid() {
        let graph = ConceptGraph::new(Vec::new()).unwrap();
        assert!(graph.is_empty());
        assert!(graph.get("a").is_none());
    }
}
