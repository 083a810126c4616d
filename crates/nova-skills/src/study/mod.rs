//! Learning and research skills.

pub mod autopilot;
pub mod collab;
pub mod companion;
pub mod deep_research;
pub mod exam_prep;
pub mod knowledge_graph;
pub mod language_guardian;
pub mod lecture;
pub mod skill_builder;
