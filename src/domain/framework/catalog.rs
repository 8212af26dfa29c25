//! Storytelling framework catalog.
//!
//! The built-in catalog is static configuration. Deployments may replace it
//! with a YAML file; the loaded catalog is validated before use.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::foundation::ValidationError;
use crate::domain::presentation::{Audience, SlideType};

/// Identifier of a storytelling framework, e.g. `scqa`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkId(String);

impl FrameworkId {
    pub const PYRAMID: &'static str = "pyramid";
    pub const SCQA: &'static str = "scqa";
    pub const PROBLEM_SOLUTION_BENEFIT: &'static str = "problem_solution_benefit";
    pub const COMPARISON: &'static str = "comparison";
    pub const STAR: &'static str = "star";
    pub const BEFORE_AFTER_BRIDGE: &'static str = "before_after_bridge";

    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into().trim().to_lowercase();
        if id.is_empty() {
            return Err(ValidationError::empty_field("framework_id"));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn builtin(id: &'static str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for FrameworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One step of a framework's narrative arc.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkStep {
    pub name: String,
    pub description: String,
    /// Lower-case keywords whose presence signals the step is covered.
    #[serde(default)]
    pub indicators: Vec<String>,
    /// Slide types that realize the step.
    #[serde(default)]
    pub slide_types: Vec<SlideType>,
}

/// Inclusive slide-count range a framework works best with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRange {
    pub min: usize,
    pub max: usize,
}

impl SlideRange {
    pub fn contains(&self, count: usize) -> bool {
        (self.min..=self.max).contains(&count)
    }

    /// Slides outside the range, zero when inside.
    pub fn distance(&self, count: usize) -> usize {
        if count < self.min {
            self.min - count
        } else {
            count.saturating_sub(self.max)
        }
    }
}

/// A named storytelling structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    pub id: FrameworkId,
    pub name: String,
    pub description: String,
    pub steps: Vec<FrameworkStep>,
    #[serde(default)]
    pub best_for: Vec<String>,
    #[serde(default)]
    pub audiences: Vec<Audience>,
    pub slide_range: SlideRange,
    #[serde(default)]
    pub slide_sequence: Vec<SlideType>,
}

impl Framework {
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn suits_audience(&self, audience: Audience) -> bool {
        self.audiences.contains(&audience)
    }
}

/// Ordered set of frameworks. Order is the tie-break priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkCatalog {
    frameworks: Vec<Framework>,
}

static BUILTIN: Lazy<FrameworkCatalog> = Lazy::new(|| FrameworkCatalog {
    frameworks: builtin_frameworks(),
});

impl FrameworkCatalog {
    /// The built-in catalog.
    pub fn builtin() -> &'static FrameworkCatalog {
        &BUILTIN
    }

    /// Builds a catalog from frameworks listed in priority order.
    pub fn new(frameworks: Vec<Framework>) -> Result<Self, ValidationError> {
        let catalog = Self { frameworks };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parses a YAML catalog: a top-level `frameworks` list.
    pub fn from_yaml(yaml: &str) -> Result<Self, ValidationError> {
        let catalog: FrameworkCatalog = serde_yaml::from_str(yaml)
            .map_err(|e| ValidationError::invalid_format("framework_catalog", e.to_string()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.frameworks.is_empty() {
            return Err(ValidationError::empty_field("frameworks"));
        }
        let mut seen = HashSet::new();
        for framework in &self.frameworks {
            if !seen.insert(framework.id.as_str()) {
                return Err(ValidationError::duplicate("framework_id", framework.id.as_str()));
            }
            if framework.steps.is_empty() {
                return Err(ValidationError::empty_field(format!(
                    "frameworks.{}.steps",
                    framework.id
                )));
            }
            if framework.slide_range.min > framework.slide_range.max {
                return Err(ValidationError::invalid_format(
                    format!("frameworks.{}.slide_range", framework.id),
                    "min must not exceed max",
                ));
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &FrameworkId) -> Option<&Framework> {
        self.frameworks.iter().find(|f| &f.id == id)
    }

    pub fn contains(&self, id: &FrameworkId) -> bool {
        self.get(id).is_some()
    }

    /// Frameworks in priority order.
    pub fn frameworks(&self) -> &[Framework] {
        &self.frameworks
    }

    /// Position in the priority order; lower wins ties.
    pub fn priority_of(&self, id: &FrameworkId) -> Option<usize> {
        self.frameworks.iter().position(|f| &f.id == id)
    }

    /// The highest-priority framework.
    pub fn first(&self) -> &Framework {
        // validate() guarantees at least one entry
        &self.frameworks[0]
    }
}

fn step(name: &str, description: &str, indicators: &[&str], slide_types: &[SlideType]) -> FrameworkStep {
    FrameworkStep {
        name: name.to_string(),
        description: description.to_string(),
        indicators: indicators.iter().map(|s| s.to_string()).collect(),
        slide_types: slide_types.to_vec(),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn builtin_frameworks() -> Vec<Framework> {
    use SlideType::*;
    vec![
        Framework {
            id: FrameworkId::builtin(FrameworkId::PYRAMID),
            name: "Pyramid Principle".into(),
            description: "Lead with the answer, then group supporting arguments and evidence".into(),
            steps: vec![
                step(
                    "governing_thought",
                    "State the main recommendation up front",
                    &["recommend", "we should", "answer", "key message", "bottom line"],
                    &[Summary],
                ),
                step(
                    "key_arguments",
                    "Group the reasons supporting the recommendation",
                    &["because", "reason", "driver", "pillar"],
                    &[Benefits, Solution],
                ),
                step(
                    "supporting_evidence",
                    "Back every argument with data",
                    &["data", "evidence", "%", "analysis", "benchmark"],
                    &[Evidence, Financials],
                ),
                step(
                    "next_steps",
                    "Close with the decision or actions requested",
                    &["next step", "decision", "approve", "action"],
                    &[CallToAction],
                ),
            ],
            best_for: strings(&["executive briefing", "recommendation", "board update"]),
            audiences: vec![Audience::Executive, Audience::Investor],
            slide_range: SlideRange { min: 5, max: 12 },
            slide_sequence: vec![Title, Summary, Benefits, Evidence, CallToAction],
        },
        Framework {
            id: FrameworkId::builtin(FrameworkId::SCQA),
            name: "Situation-Complication-Question-Answer".into(),
            description: "Establish context, introduce tension, then resolve it".into(),
            steps: vec![
                step(
                    "situation",
                    "Describe the current context the audience agrees with",
                    &["today", "currently", "situation", "context", "background"],
                    &[Situation],
                ),
                step(
                    "complication",
                    "Introduce what changed or what is at risk",
                    &["however", "but", "challenge", "risk", "complication"],
                    &[Problem],
                ),
                step(
                    "question",
                    "Frame the question the complication raises",
                    &["how can", "how do", "what should", "question", "?"],
                    &[Agenda],
                ),
                step(
                    "answer",
                    "Answer the question with the proposal",
                    &["answer", "solution", "propose", "recommend"],
                    &[Solution, Summary],
                ),
            ],
            best_for: strings(&["strategy", "general business update", "proposal"]),
            audiences: vec![Audience::General, Audience::Internal, Audience::Executive],
            slide_range: SlideRange { min: 4, max: 15 },
            slide_sequence: vec![Title, Situation, Problem, Solution, CallToAction],
        },
        Framework {
            id: FrameworkId::builtin(FrameworkId::PROBLEM_SOLUTION_BENEFIT),
            name: "Problem-Solution-Benefit".into(),
            description: "Name the pain, present the fix, quantify the payoff".into(),
            steps: vec![
                step(
                    "problem",
                    "Describe the pain the audience feels",
                    &["problem", "pain", "struggle", "cost of", "inefficien"],
                    &[Problem],
                ),
                step(
                    "solution",
                    "Present the solution and how it works",
                    &["solution", "platform", "approach", "how it works", "introduce"],
                    &[Solution],
                ),
                step(
                    "benefit",
                    "Quantify the benefits and outcomes",
                    &["benefit", "save", "increase", "reduce", "roi", "%"],
                    &[Benefits, Evidence, Financials],
                ),
                step(
                    "call_to_action",
                    "Ask for the next step",
                    &["next step", "get started", "contact", "pilot", "sign"],
                    &[CallToAction],
                ),
            ],
            best_for: strings(&["sales pitch", "product launch", "investment ask"]),
            audiences: vec![Audience::Customer, Audience::Investor],
            slide_range: SlideRange { min: 4, max: 12 },
            slide_sequence: vec![Title, Problem, Solution, Benefits, CallToAction],
        },
        Framework {
            id: FrameworkId::builtin(FrameworkId::COMPARISON),
            name: "Options Comparison".into(),
            description: "Lay out alternatives against shared criteria and recommend one".into(),
            steps: vec![
                step(
                    "criteria",
                    "Define the evaluation criteria",
                    &["criteria", "requirement", "evaluate", "must have"],
                    &[Agenda, Situation],
                ),
                step(
                    "options",
                    "Present each option fairly",
                    &["option", "alternative", "vendor", "versus", "vs"],
                    &[Comparison],
                ),
                step(
                    "tradeoffs",
                    "Contrast the options on each criterion",
                    &["tradeoff", "pros", "cons", "compared", "advantage"],
                    &[Comparison, Evidence],
                ),
                step(
                    "recommendation",
                    "Recommend one option and say why",
                    &["recommend", "preferred", "choose", "select"],
                    &[Summary, CallToAction],
                ),
            ],
            best_for: strings(&["vendor selection", "options analysis", "make or buy"]),
            audiences: vec![Audience::Executive, Audience::Technical, Audience::Internal],
            slide_range: SlideRange { min: 4, max: 10 },
            slide_sequence: vec![Title, Situation, Comparison, Summary, CallToAction],
        },
        Framework {
            id: FrameworkId::builtin(FrameworkId::STAR),
            name: "Situation-Task-Action-Result".into(),
            description: "Tell a case study from context to measured outcome".into(),
            steps: vec![
                step(
                    "situation",
                    "Set the scene of the case",
                    &["client", "customer", "situation", "background"],
                    &[Situation],
                ),
                step(
                    "task",
                    "State the goal or challenge",
                    &["goal", "task", "objective", "challenge"],
                    &[Problem],
                ),
                step(
                    "action",
                    "Describe what was done",
                    &["implemented", "deployed", "built", "action", "approach"],
                    &[Solution, Timeline],
                ),
                step(
                    "result",
                    "Show the measured results",
                    &["result", "outcome", "achieved", "%", "improved"],
                    &[Evidence, Benefits],
                ),
            ],
            best_for: strings(&["case study", "success story", "customer reference"]),
            audiences: vec![Audience::Customer, Audience::General],
            slide_range: SlideRange { min: 4, max: 8 },
            slide_sequence: vec![Title, Situation, Problem, Solution, Evidence],
        },
        Framework {
            id: FrameworkId::builtin(FrameworkId::BEFORE_AFTER_BRIDGE),
            name: "Before-After-Bridge".into(),
            description: "Contrast today with a better future and show the path between".into(),
            steps: vec![
                step(
                    "before",
                    "Describe the current state",
                    &["today", "current state", "before", "as-is"],
                    &[Situation, Problem],
                ),
                step(
                    "after",
                    "Paint the future state",
                    &["imagine", "future", "after", "to-be", "vision"],
                    &[Benefits],
                ),
                step(
                    "bridge",
                    "Show how to get from before to after",
                    &["roadmap", "bridge", "plan", "phase", "milestone"],
                    &[Solution, Timeline],
                ),
            ],
            best_for: strings(&["transformation", "change program", "vision"]),
            audiences: vec![Audience::Internal, Audience::Executive],
            slide_range: SlideRange { min: 3, max: 10 },
            slide_sequence: vec![Title, Situation, Benefits, Timeline, CallToAction],
        },
    ]
}
