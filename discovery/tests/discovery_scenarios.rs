//! Run-level tests for the scenario explorer.
//!
//! These drive `run_discovery` with scripted collaborators and check both the
//! persisted results file and the exact sequence of lifecycle calls.

use std::path::Path;

use voice_discovery::core::budget::ExplorationLimits;
use voice_discovery::core::types::{ScenarioOutcome, SkipReason, Stage};
use voice_discovery::explore::{ExploreConfig, Explorer};
use voice_discovery::io::results::load_results;
use voice_discovery::test_support::{Interaction, Script, ScriptedWorld, analysis_suggesting};
use webhook::store::CallId;

fn config_in(dir: &Path) -> ExploreConfig {
    ExploreConfig {
        results_path: dir.join("results/discovered_scenarios.json"),
        ..ExploreConfig::default()
    }
}

fn seeds(prompts: &[&str]) -> Vec<String> {
    prompts.iter().map(|p| p.to_string()).collect()
}

/// One seed, immediate recording, no suggestions.
#[tokio::test]
async fn single_seed_produces_exactly_one_entry() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new();
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    let summary = explorer
        .run_discovery(&seeds(&["What are your business hours?"]))
        .await
        .expect("run");

    let results = load_results(&results_path).expect("results");
    assert_eq!(results.len(), 1);
    assert_eq!(
        results["What are your business hours?"],
        analysis_suggesting(&[])
    );
    assert_eq!(summary.calls_placed, 1);
    assert_eq!(summary.discovered, 1);
    assert_eq!(summary.failed, 0);

    assert_eq!(
        world.interactions(),
        vec![
            Interaction::Start("What are your business hours?".to_string()),
            Interaction::Wait(CallId::from("call-1")),
            Interaction::Fetch(CallId::from("call-1")),
            Interaction::Transcribe("recordings/call-1.wav".into()),
            Interaction::Analyze("transcript for: What are your business hours?".to_string()),
        ]
    );
}

/// X suggests Y and Y suggests X; the cycle ends after one pass.
#[tokio::test]
async fn suggestion_cycle_visits_each_prompt_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new()
        .with_script("X", Script::suggesting(&["Y"]))
        .with_script("Y", Script::suggesting(&["X"]));
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    explorer.run_discovery(&seeds(&["X"])).await.expect("run");

    let results = load_results(&results_path).expect("results");
    let prompts: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(prompts, vec!["X", "Y"]);
    assert_eq!(world.started_prompts(), vec!["X", "Y"]);
}

/// Start fails, nothing after start runs and nothing is recorded.
#[tokio::test]
async fn failed_start_skips_remaining_lifecycle() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new().with_script(
        "I have a question about my last bill",
        Script {
            start_fails: true,
            ..Script::default()
        },
    );
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    let summary = explorer
        .run_discovery(&seeds(&["I have a question about my last bill"]))
        .await
        .expect("run");

    assert!(load_results(&results_path).expect("results").is_empty());
    assert_eq!(world.started_prompts().len(), 1);
    assert_eq!(world.post_start_interactions(), 0);
    assert_eq!(summary.failed, 1);
    assert!(matches!(
        explorer.ledger().outcome("I have a question about my last bill"),
        Some(ScenarioOutcome::Failed {
            stage: Stage::Start,
            ..
        })
    ));
}

/// The wait times out, so fetch/transcribe/analyze never run.
#[tokio::test]
async fn recording_timeout_skips_fetch_and_adapters() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new().with_script(
        "Do you offer emergency services?",
        Script {
            times_out: true,
            ..Script::suggesting(&["never reached"])
        },
    );
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    explorer
        .run_discovery(&seeds(&["Do you offer emergency services?"]))
        .await
        .expect("run");

    assert!(load_results(&results_path).expect("results").is_empty());
    assert_eq!(
        world.interactions(),
        vec![
            Interaction::Start("Do you offer emergency services?".to_string()),
            Interaction::Wait(CallId::from("call-1")),
        ]
    );
    assert!(matches!(
        explorer.ledger().outcome("Do you offer emergency services?"),
        Some(ScenarioOutcome::Failed {
            stage: Stage::Wait,
            ..
        })
    ));
}

#[tokio::test]
async fn processing_a_discovered_prompt_starts_no_call() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new();
    let mut explorer = Explorer::new(&world, &world, &world, config_in(temp.path()));

    explorer.process_scenario("hours").await;
    assert_eq!(world.started_prompts(), vec!["hours"]);

    explorer.process_scenario("hours").await;
    assert_eq!(world.started_prompts(), vec!["hours"]);
    assert_eq!(explorer.ledger().calls_placed(), 1);
}

#[tokio::test]
async fn duplicate_seeds_and_suggestions_are_processed_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new()
        .with_script("A", Script::suggesting(&["shared", "A"]))
        .with_script("B", Script::suggesting(&["shared"]));
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    explorer
        .run_discovery(&seeds(&["A", "B", "A"]))
        .await
        .expect("run");

    assert_eq!(world.started_prompts(), vec!["A", "shared", "B"]);
    assert_eq!(load_results(&results_path).expect("results").len(), 3);
}

#[tokio::test]
async fn suggestions_are_explored_depth_first_before_next_seed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new()
        .with_script("seed-1", Script::suggesting(&["a", "b"]))
        .with_script("a", Script::suggesting(&["a1"]))
        .with_script("b", Script::suggesting(&["b1"]));

    let mut explorer = Explorer::new(&world, &world, &world, config_in(temp.path()));
    explorer
        .run_discovery(&seeds(&["seed-1", "seed-2"]))
        .await
        .expect("run");

    assert_eq!(
        world.started_prompts(),
        vec!["seed-1", "a", "a1", "b", "b1", "seed-2"]
    );
}

#[tokio::test]
async fn failing_branch_does_not_stop_siblings_or_later_seeds() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new()
        .with_script("root", Script::suggesting(&["broken", "fine"]))
        .with_script(
            "broken",
            Script {
                analysis: None,
                ..Script::default()
            },
        )
        .with_script(
            "garbled",
            Script {
                transcribe_fails: true,
                ..Script::default()
            },
        );
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    let summary = explorer
        .run_discovery(&seeds(&["root", "garbled", "last"]))
        .await
        .expect("run");

    let results = load_results(&results_path).expect("results");
    let prompts: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(prompts, vec!["fine", "last", "root"]);
    assert_eq!(summary.failed, 2);
    assert!(matches!(
        explorer.ledger().outcome("broken"),
        Some(ScenarioOutcome::Failed {
            stage: Stage::Analyze,
            ..
        })
    ));
    assert!(matches!(
        explorer.ledger().outcome("garbled"),
        Some(ScenarioOutcome::Failed {
            stage: Stage::Transcribe,
            ..
        })
    ));
}

#[tokio::test]
async fn blank_suggestions_are_ignored() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new().with_script(
        "Are you open on holidays?",
        Script::suggesting(&["", "   ", "Ask about holidays"]),
    );
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    let summary = explorer
        .run_discovery(&seeds(&["Are you open on holidays?"]))
        .await
        .expect("run");

    assert_eq!(
        world.started_prompts(),
        vec!["Are you open on holidays?", "Ask about holidays"]
    );
    assert_eq!(summary.calls_placed, 2);
    let results = load_results(&results_path).expect("results");
    assert!(results.contains_key("Are you open on holidays?"));
    assert!(!results.contains_key(""));
    assert!(explorer.ledger().outcome("   ").is_none());
}

#[tokio::test]
async fn failed_prompt_is_not_retried_when_suggested_again() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new()
        .with_script(
            "flaky",
            Script {
                fetch_fails: true,
                ..Script::default()
            },
        )
        .with_script("later", Script::suggesting(&["flaky"]));

    let mut explorer = Explorer::new(&world, &world, &world, config_in(temp.path()));
    explorer
        .run_discovery(&seeds(&["flaky", "later"]))
        .await
        .expect("run");

    assert_eq!(world.started_prompts(), vec!["flaky", "later"]);
}

#[tokio::test]
async fn depth_limit_stops_following_suggestions() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new()
        .with_script("level-0", Script::suggesting(&["level-1"]))
        .with_script("level-1", Script::suggesting(&["level-2"]));
    let config = ExploreConfig {
        limits: ExplorationLimits {
            max_depth: Some(1),
            max_calls: None,
        },
        ..config_in(temp.path())
    };

    let mut explorer = Explorer::new(&world, &world, &world, config);
    let summary = explorer
        .run_discovery(&seeds(&["level-0"]))
        .await
        .expect("run");

    assert_eq!(world.started_prompts(), vec!["level-0", "level-1"]);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        explorer.ledger().outcome("level-2"),
        Some(&ScenarioOutcome::Skipped {
            reason: SkipReason::DepthLimit {
                depth: 2,
                max_depth: 1
            }
        })
    );
}

#[tokio::test]
async fn call_budget_caps_total_calls() {
    let temp = tempfile::tempdir().expect("tempdir");
    let world = ScriptedWorld::new().with_script("fan", Script::suggesting(&["s1", "s2", "s3"]));
    let config = ExploreConfig {
        limits: ExplorationLimits {
            max_depth: None,
            max_calls: Some(2),
        },
        ..config_in(temp.path())
    };
    let results_path = config.results_path.clone();

    let mut explorer = Explorer::new(&world, &world, &world, config);
    let summary = explorer
        .run_discovery(&seeds(&["fan", "other seed"]))
        .await
        .expect("run");

    assert_eq!(world.started_prompts(), vec!["fan", "s1"]);
    assert_eq!(summary.calls_placed, 2);
    assert_eq!(summary.skipped, 3);
    assert_eq!(load_results(&results_path).expect("results").len(), 2);
}

#[tokio::test]
async fn run_overwrites_previous_results_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = config_in(temp.path());
    let results_path = config.results_path.clone();

    let first = ScriptedWorld::new();
    Explorer::new(&first, &first, &first, config.clone())
        .run_discovery(&seeds(&["first run"]))
        .await
        .expect("first run");

    let second = ScriptedWorld::new();
    Explorer::new(&second, &second, &second, config)
        .run_discovery(&seeds(&["second run"]))
        .await
        .expect("second run");

    let results = load_results(&results_path).expect("results");
    let prompts: Vec<&str> = results.keys().map(String::as_str).collect();
    assert_eq!(prompts, vec!["second run"]);
}
