//! The ordered skill registry.
//!
//! Built once from a list of [`SkillFactory`]s and the `[features]`
//! toggles, then immutable. Registration order is dispatch priority: the
//! factories are stable-sorted by [`SkillCategory`], so within a category
//! the catalogue order decides.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use aho_corasick::{AhoCorasick, MatchKind};
use nova_skills::{ConsentKind, Skill, SkillCategory, SkillContext, SkillFactory};
use tracing::{debug, info, warn};

use crate::config::FeatureToggles;
use crate::error::{NovaError, NovaResult};

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// One enabled, successfully constructed skill.
pub struct SkillRegistration {
    pub name: &'static str,
    pub category: SkillCategory,
    pub triggers: Vec<&'static str>,
    pub consent: Option<ConsentKind>,
    matcher: AhoCorasick,
    skill: Arc<dyn Skill>,
}

impl fmt::Debug for SkillRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillRegistration")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("triggers", &self.triggers)
            .field("consent", &self.consent)
            .finish_non_exhaustive()
    }
}

impl SkillRegistration {
    pub fn new(category: SkillCategory, skill: Arc<dyn Skill>) -> NovaResult<Self> {
        let name = skill.name();
        let triggers: Vec<&'static str> = skill.triggers().to_vec();
        if triggers.is_empty() {
            return Err(NovaError::Triggers {
                skill: name.to_string(),
                reason: "no trigger phrases".into(),
            });
        }
        let matcher = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostFirst)
            .build(&triggers)
            .map_err(|e| NovaError::Triggers {
                skill: name.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            name,
            category,
            triggers,
            consent: skill.required_consent(),
            matcher,
            skill,
        })
    }

    /// Whether any trigger occurs in `lowered`.
    pub fn matches(&self, lowered: &str) -> bool {
        self.matcher.is_match(lowered)
    }

    pub fn requires_consent(&self) -> bool {
        self.consent.is_some()
    }

    pub fn skill(&self) -> &Arc<dyn Skill> {
        &self.skill
    }
}

/// A skill that was enabled but could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitError {
    pub skill: String,
    pub reason: String,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.skill, self.reason)
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct SkillRegistry {
    registrations: Vec<SkillRegistration>,
    errors: Vec<InitError>,
    catalogue_size: usize,
}

impl SkillRegistry {
    /// Build the registry. Never fails: every construction problem becomes
    /// an [`InitError`] and the skill is left out.
    ///
    /// Factories whose name has no `[features]` toggle are enabled.
    pub fn build(
        mut factories: Vec<SkillFactory>,
        toggles: &FeatureToggles,
        ctx: &SkillContext,
    ) -> Self {
        factories.sort_by_key(|f| f.category);
        let mut registry = Self {
            catalogue_size: factories.len(),
            ..Self::default()
        };

        for factory in factories {
            let (name, category) = (factory.name, factory.category);
            if !toggles.enabled(name).unwrap_or(true) {
                debug!(skill = name, "skill disabled");
                continue;
            }

            let built = catch_unwind(AssertUnwindSafe(|| factory.build(ctx)));
            let outcome = match built {
                Ok(Ok(skill)) => SkillRegistration::new(category, skill),
                Ok(Err(e)) => Err(e.into()),
                Err(panic) => Err(NovaError::Config {
                    reason: format!("constructor panicked: {}", panic_message(&panic)),
                }),
            };

            match outcome {
                Ok(registration) => registry.registrations.push(registration),
                Err(e) => {
                    warn!(skill = name, error = %e, "skill failed to initialise");
                    registry.errors.push(InitError {
                        skill: name.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            active = registry.registrations.len(),
            catalogue = registry.catalogue_size,
            errors = registry.errors.len(),
            "skill registry built"
        );
        registry
    }

    /// Record an initialisation problem outside skill construction.
    pub fn push_error(&mut self, error: InitError) {
        self.errors.push(error);
    }

    /// Enabled registrations whose triggers occur in `lowered`, in priority
    /// order.
    pub fn candidates<'a>(
        &'a self,
        lowered: &'a str,
    ) -> impl Iterator<Item = &'a SkillRegistration> + 'a {
        self.registrations.iter().filter(move |r| r.matches(lowered))
    }

    pub fn get(&self, name: &str) -> Option<&SkillRegistration> {
        self.registrations.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillRegistration> {
        self.registrations.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.registrations.iter().map(|r| r.name).collect()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Number of factories offered, enabled or not.
    pub fn catalogue_size(&self) -> usize {
        self.catalogue_size
    }

    pub fn errors(&self) -> &[InitError] {
        &self.errors
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
