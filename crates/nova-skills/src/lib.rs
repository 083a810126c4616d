//! Nova's skills: the [`Skill`] handler contract and the built-in catalogue.
//!
//! Skills are grouped into four categories that also fix their dispatch
//! priority:
//!
//! ```text
//!   Device ─► Security ─► Advanced ─► Study
//! ```
//!
//! Each skill is built from a [`SkillFactory`] with a shared
//! [`SkillContext`] (memory store, optional knowledge backend, launcher).
//! Routing, consent enforcement and toggles live in `nova-core`.

pub mod advanced;
pub mod catalogue;
pub mod device;
pub mod error;
pub mod security;
pub mod skill;
pub mod study;
pub mod text;

pub use catalogue::{BUILTIN_SKILLS, builtin_catalogue};
pub use device::launcher::{AppSpec, Launcher, Platform, SystemLauncher, resolve_app};
pub use error::{SkillError, SkillResult};
pub use skill::{
    ConsentFlags, ConsentKind, Skill, SkillCategory, SkillContext, SkillFactory, SkillSettings,
    consent_refusal,
};
