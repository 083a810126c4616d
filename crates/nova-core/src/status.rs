//! The system status report answered for "status", "health" and
//! "diagnostic".

use std::fmt;

use nova_store::MemoryStats;

/// Initialisation errors listed in full; the rest are counted.
const LISTED_ERRORS: usize = 3;

/// Snapshot of the assistant's health.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub assistant_name: String,
    /// `false` when running on the in-memory fallback store.
    pub store_durable: bool,
    /// Description of the knowledge backend, if one is configured.
    pub backend: Option<String>,
    /// Description of the speech engine, if speech is enabled.
    pub speech: Option<String>,
    pub active_skills: usize,
    pub catalogue_size: usize,
    pub init_errors: Vec<String>,
    /// `None` when the store could not be queried.
    pub memory: Option<MemoryStats>,
}

impl StatusReport {
    /// Fully operational: durable storage and no initialisation errors.
    pub fn operational(&self) -> bool {
        self.store_durable && self.init_errors.is_empty()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(40);
        writeln!(f, "🤖 {} System Status Report", self.assistant_name)?;
        writeln!(f, "{rule}")?;

        if self.store_durable {
            writeln!(f, "💾 Memory Store: ✅ Active")?;
        } else {
            writeln!(f, "💾 Memory Store: ⚠️ In-memory fallback (history will not persist)")?;
        }
        match &self.backend {
            Some(backend) => writeln!(f, "🧠 Knowledge Backend: ✅ {backend}")?,
            None => writeln!(f, "🧠 Knowledge Backend: ❌ Not configured")?,
        }
        match &self.speech {
            Some(speech) => writeln!(f, "🔊 Speech: ✅ {speech}")?,
            None => writeln!(f, "🔊 Speech: ❌ Off")?,
        }
        writeln!(
            f,
            "🛠️  Active Skills: {}/{}",
            self.active_skills, self.catalogue_size
        )?;

        if !self.init_errors.is_empty() {
            writeln!(f, "⚠️  Initialization Errors: {}", self.init_errors.len())?;
            for error in self.init_errors.iter().take(LISTED_ERRORS) {
                writeln!(f, "   • {error}")?;
            }
        }

        match &self.memory {
            Some(stats) => {
                writeln!(f, "💬 Total Conversations: {}", stats.total_turns)?;
                writeln!(f, "📊 Memory Usage: {:.1} MB", stats.size_mb())?;
            }
            None => writeln!(f, "📊 Memory stats unavailable")?,
        }

        writeln!(f, "{rule}")?;
        if self.operational() {
            write!(f, "Status: 🟢 Operational")
        } else {
            write!(f, "Status: 🟡 Limited")
        }
    }
}
