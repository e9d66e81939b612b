//! Prompt templates for the tree search and the baselines.
//!
//! Default text lives in `ramify/prompts/*.yaml` and is embedded at compile time. A
//! directory of the same files (see [`load`]) replaces individual fields; anything
//! missing falls back to the embedded default. Templates use `{name}` placeholders
//! filled by [`render`].

mod load;

pub use load::{default_from_embedded, load, load_or_default, LoadError};

use serde::Deserialize;

/// Contents of `tot.yaml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TotPromptsFile {
    /// Instruction sent with every propose / value call.
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub game24: Game24PromptsFile,
}

/// `game24` section of `tot.yaml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Game24PromptsFile {
    /// Task framing; `{input}` is the raw problem.
    pub framing: Option<String>,
    /// Proposal request; `{state}` and `{k}`.
    pub propose: Option<String>,
    /// Value request; `{state}`.
    pub value: Option<String>,
}

/// Contents of `baseline.yaml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BaselinePromptsFile {
    /// Chain-of-thought prompt; `{input}`.
    pub cot_prompt: Option<String>,
    #[serde(default)]
    pub debate: DebatePromptsFile,
}

/// `debate` section of `baseline.yaml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DebatePromptsFile {
    pub system_prompt: Option<String>,
    /// First user turn of every agent; `{input}`.
    pub opening: Option<String>,
    /// User turn before each later round; `{blackboard}`.
    pub update: Option<String>,
}

/// Resolved prompt set. Accessors fall back to the embedded defaults.
#[derive(Clone, Debug, Default)]
pub struct Prompts {
    pub tot: TotPromptsFile,
    pub baseline: BaselinePromptsFile,
}

fn pick<'a>(value: &'a Option<String>, fallback: &'a Option<String>) -> &'a str {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(fallback.as_deref())
        .unwrap_or("")
}

impl Prompts {
    pub fn tot_system_prompt(&self) -> &str {
        pick(&self.tot.system_prompt, &load::embedded().tot.system_prompt)
    }

    pub fn game24_framing(&self) -> &str {
        pick(&self.tot.game24.framing, &load::embedded().tot.game24.framing)
    }

    pub fn game24_propose(&self) -> &str {
        pick(&self.tot.game24.propose, &load::embedded().tot.game24.propose)
    }

    pub fn game24_value(&self) -> &str {
        pick(&self.tot.game24.value, &load::embedded().tot.game24.value)
    }

    pub fn cot_prompt(&self) -> &str {
        pick(&self.baseline.cot_prompt, &load::embedded().baseline.cot_prompt)
    }

    pub fn debate_system_prompt(&self) -> &str {
        pick(
            &self.baseline.debate.system_prompt,
            &load::embedded().baseline.debate.system_prompt,
        )
    }

    pub fn debate_opening(&self) -> &str {
        pick(
            &self.baseline.debate.opening,
            &load::embedded().baseline.debate.opening,
        )
    }

    pub fn debate_update(&self) -> &str {
        pick(
            &self.baseline.debate.update,
            &load::embedded().baseline.debate.update,
        )
    }
}

/// Replaces each `{name}` in `template` with its value. Unknown placeholders are left as is.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}
