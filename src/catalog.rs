//! Strategy catalog loading
//!
//! Reads research modules from disk and flattens their strategies into the
//! list the coordinator scores. A module file looks like
//! `{ "id": ..., "title": ..., "actionable_strategies": [ ... ] }`; each
//! strategy is stamped with its module as `source`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::types::{Difficulty, Strategy, StrategySource};

#[derive(Debug, Deserialize)]
struct ResearchModule {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    actionable_strategies: Vec<Strategy>,
}

impl ResearchModule {
    fn into_strategies(self) -> Vec<Strategy> {
        let source = StrategySource {
            id: self.id,
            title: self.title,
        };
        self.actionable_strategies
            .into_iter()
            .map(|mut s| {
                s.source = Some(source.clone());
                s
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    Module(ResearchModule),
    Strategies(Vec<Strategy>),
}

/// Load a catalog from a directory of module files or from a single file.
///
/// In a directory, unreadable or malformed modules are skipped with a
/// warning. A single file must parse, either as one module or as a bare
/// array of strategies.
pub fn load_catalog(path: &Path) -> Result<Vec<Strategy>> {
    if path.is_dir() {
        load_dir(path)
    } else {
        load_file(path)
    }
}

fn load_file(path: &Path) -> Result<Vec<Strategy>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    let file: CatalogFile = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
    Ok(match file {
        CatalogFile::Module(module) => module.into_strategies(),
        CatalogFile::Strategies(strategies) => strategies,
    })
}

fn load_dir(dir: &Path) -> Result<Vec<Strategy>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read catalog directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut strategies = Vec::new();
    let mut modules = 0;
    for path in paths {
        match load_file(&path) {
            Ok(loaded) => {
                modules += 1;
                strategies.extend(loaded);
            }
            Err(e) => warn!("Skipping catalog file {}: {:#}", path.display(), e),
        }
    }

    info!(
        "Loaded {} strategies from {} modules in {}",
        strategies.len(),
        modules,
        dir.display()
    );
    Ok(strategies)
}

/// Strategies carrying `tag`, case-insensitively
pub fn by_tag<'a>(catalog: &'a [Strategy], tag: &str) -> Vec<&'a Strategy> {
    catalog.iter().filter(|s| s.has_any_tag(&[tag])).collect()
}

/// Strategies at exactly `difficulty`
pub fn by_difficulty<'a>(catalog: &'a [Strategy], difficulty: &Difficulty) -> Vec<&'a Strategy> {
    catalog.iter().filter(|s| &s.difficulty == difficulty).collect()
}

/// One phase of a composite plan and the strategy filling it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStep {
    pub phase: &'static str,
    pub strategy: String,
    pub logic: String,
    pub source: Option<String>,
}

/// Trigger, action and retention strategies drawn from different modules
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositePlan {
    pub name: String,
    pub rationale: String,
    pub steps: Vec<PlanStep>,
}

/// Plan phases in order, with the tag that fills each
const PLAN_PHASES: [(&str, &str); 3] = [
    ("Trigger", "trigger"),
    ("Action", "ability"),
    ("Retention", "retention"),
];

/// Combine the first `trigger`, `ability` and `retention` strategies of the
/// catalog into one plan. Phases with no matching strategy are left out.
pub fn composite_plan(catalog: &[Strategy]) -> CompositePlan {
    let steps = PLAN_PHASES
        .iter()
        .filter_map(|&(phase, tag)| {
            let strategy = by_tag(catalog, tag).into_iter().next()?;
            Some(PlanStep {
                phase,
                strategy: strategy.name.clone(),
                logic: strategy.logic.clone(),
                source: strategy.source.as_ref().and_then(|s| s.title.clone()),
            })
        })
        .collect::<Vec<_>>();

    if steps.len() < PLAN_PHASES.len() {
        warn!(
            "Composite plan has {} of {} phases; catalog lacks matching tags",
            steps.len(),
            PLAN_PHASES.len()
        );
    }

    CompositePlan {
        name: "Composite Intervention Plan".to_string(),
        rationale: "Implementation intentions to start, a tiny action to lower the bar, \
                    and self-compassion to keep going after a miss."
            .to_string(),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HABITS_MODULE: &str = r#"{
        "id": "lally-2010",
        "title": "How are habits formed",
        "actionable_strategies": [
            {"name": "Same Time Daily", "tags": ["trigger"], "difficulty": "Low", "logic": "Anchor to a cue"},
            {"name": "Tiny Start", "tags": ["ability"], "difficulty": "Very Low"}
        ]
    }"#;

    const STRESS_MODULE: &str = r#"{
        "id": "sirois-2014",
        "title": "Procrastination and stress",
        "actionable_strategies": [
            {"name": "Neutral Reflection", "tags": ["retention", "emotion"], "difficulty": "Low"}
        ]
    }"#;

    #[test]
    fn test_load_directory_stamps_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_habits.json"), HABITS_MODULE).unwrap();
        std::fs::write(dir.path().join("b_stress.json"), STRESS_MODULE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = load_catalog(dir.path()).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[0].name, "Same Time Daily");
        assert_eq!(catalog[0].logic, "Anchor to a cue");
        let source = catalog[2].source.as_ref().unwrap();
        assert_eq!(source.id.as_deref(), Some("sirois-2014"));
        assert_eq!(source.title.as_deref(), Some("Procrastination and stress"));
    }

    #[test]
    fn test_malformed_module_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.json"), STRESS_MODULE).unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ broken").unwrap();

        let catalog = load_catalog(dir.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_load_bare_array_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"name": "Visual Timer", "tags": ["scaffolding"], "difficulty": "Low"}]"#,
        )
        .unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog[0].source.is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_catalog(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_filters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("habits.json");
        std::fs::write(&path, HABITS_MODULE).unwrap();
        let catalog = load_catalog(&path).unwrap();

        let triggers = by_tag(&catalog, "TRIGGER");
        assert_eq!(triggers.len(), 1);
        assert_eq!(triggers[0].name, "Same Time Daily");

        let easy = by_difficulty(&catalog, &Difficulty::VeryLow);
        assert_eq!(easy.len(), 1);
        assert_eq!(easy[0].name, "Tiny Start");
    }

    #[test]
    fn test_composite_plan_orders_phases() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a_habits.json"), HABITS_MODULE).unwrap();
        std::fs::write(dir.path().join("b_stress.json"), STRESS_MODULE).unwrap();
        let catalog = load_catalog(dir.path()).unwrap();

        let plan = composite_plan(&catalog);
        let phases: Vec<&str> = plan.steps.iter().map(|s| s.phase).collect();
        assert_eq!(phases, vec!["Trigger", "Action", "Retention"]);
        assert_eq!(plan.steps[0].strategy, "Same Time Daily");
        assert_eq!(plan.steps[0].logic, "Anchor to a cue");
        assert_eq!(plan.steps[1].strategy, "Tiny Start");
        assert_eq!(plan.steps[2].strategy, "Neutral Reflection");
        assert_eq!(plan.steps[2].source.as_deref(), Some("Procrastination and stress"));
    }

    #[test]
    fn test_composite_plan_skips_missing_phases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stress.json");
        std::fs::write(&path, STRESS_MODULE).unwrap();
        let catalog = load_catalog(&path).unwrap();

        let plan = composite_plan(&catalog);
        assert_eq!(plan.steps.len(), 1);
        assert_eq!(plan.steps[0].phase, "Retention");

        assert!(composite_plan(&[]).steps.is_empty());
    }
}
