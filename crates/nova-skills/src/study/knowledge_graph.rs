//! A private concept map built from "link A to B" statements.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use regex::Regex;

use crate::error::SkillResult;
use crate::skill::{ConsentFlags, Skill, SkillContext, lock_state};

const TRIGGERS: &[&str] = &["concept map", "knowledge graph", "mind map", "link "];

/// Undirected concept graph, keyed by lowercase concept.
#[derive(Debug, Default)]
pub struct ConceptGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl ConceptGraph {
    /// Connect `a` and `b`. Returns `false` if they were already linked.
    pub fn link(&mut self, a: &str, b: &str) -> bool {
        let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
        let added = self.edges.entry(a.clone()).or_default().insert(b.clone());
        self.edges.entry(b).or_default().insert(a);
        added
    }

    pub fn neighbours(&self, concept: &str) -> Vec<&str> {
        self.edges
            .get(&concept.trim().to_lowercase())
            .map(|n| n.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn concept_count(&self) -> usize {
        self.edges.len()
    }

    pub fn link_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    fn render(&self) -> String {
        if self.edges.is_empty() {
            return "🕸️ Your concept map is empty. Try `link photosynthesis to chlorophyll`."
                .into();
        }
        let mut out = format!(
            "🕸️ Concept Map ({} concepts, {} links)\n",
            self.concept_count(),
            self.link_count()
        );
        for (concept, links) in &self.edges {
            let list: Vec<&str> = links.iter().map(String::as_str).collect();
            out.push_str(&format!("\n{concept} → {}", list.join(", ")));
        }
        out
    }
}

pub struct KnowledgeGraph {
    graph: Mutex<ConceptGraph>,
    link_re: Regex,
}

impl KnowledgeGraph {
    pub fn new(_ctx: &SkillContext) -> SkillResult<Self> {
        Ok(Self {
            graph: Mutex::new(ConceptGraph::default()),
            link_re: Regex::new(r"(?i)\blink\s+(.+?)\s+(?:to|with|and)\s+(.+?)[.!?]?$")?,
        })
    }
}

#[async_trait]
impl Skill for KnowledgeGraph {
    fn name(&self) -> &'static str {
        "knowledge_graph"
    }

    fn triggers(&self) -> &[&'static str] {
        TRIGGERS
    }

    async fn route(&self, text: &str, _consent: &ConsentFlags) -> SkillResult<Option<String>> {
        let mut graph = lock_state(&self.graph)?;

        if let Some(caps) = self.link_re.captures(text.trim()) {
            let (a, b) = (caps[1].trim(), caps[2].trim());
            let reply = if graph.link(a, b) {
                format!("🔗 Linked {a} ↔ {b}.")
            } else {
                format!("🔗 {a} and {b} were already linked.")
            };
            let related = graph.neighbours(a);
            return Ok(Some(format!("{reply} {a} now connects to: {}.", related.join(", "))));
        }

        // A bare "link" with no "to" clause is not ours.
        if text.to_ascii_lowercase().contains("link ")
            && !text.to_ascii_lowercase().contains("map")
            && !text.to_ascii_lowercase().contains("graph")
        {
            return Ok(None);
        }
        Ok(Some(graph.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_store::MemoryStore;

    #[test]
    fn links_are_undirected_and_deduplicated() {
        let mut graph = ConceptGraph::default();
        assert!(graph.link("Cells", "DNA"));
        assert!(!graph.link("dna", "cells"));
        graph.link("DNA", "RNA");
        assert_eq!(graph.neighbours("dna"), vec!["cells", "rna"]);
        assert_eq!(graph.concept_count(), 3);
        assert_eq!(graph.link_count(), 2);
    }

    #[tokio::test]
    async fn routes_links_and_map() {
        let ctx = SkillContext::new(MemoryStore::in_memory().await.unwrap(), "s");
        let skill = KnowledgeGraph::new(&ctx).unwrap();
        let consent = ConsentFlags::default();

        let reply = skill.route("link gravity to orbits", &consent).await.unwrap().unwrap();
        assert!(reply.starts_with("🔗 Linked gravity ↔ orbits."));

        let map = skill.route("show my concept map", &consent).await.unwrap().unwrap();
        assert!(map.contains("gravity → orbits"));

        assert!(skill.route("send me the link please", &consent).await.unwrap().is_none());
    }
}
