use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use provider_bridge::moderation::{
    FieldId, ModerationFanOut, ModerationPayload, Moderator, Outcome, Verdict, moderate,
};
use provider_bridge::{Error, Result};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Answers by keyword and records how many checks overlap.
#[derive(Debug, Default)]
struct ScriptedModerator {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait]
impl Moderator for ScriptedModerator {
    async fn check(&self, text: &str) -> Result<Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = if text == "slow" { 10_000 } else { 50 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match text {
            "bad" => Ok(Verdict {
                flagged: true,
                categories: vec!["harassment".to_string()],
            }),
            "error" => Err(Error::Provider {
                status: 503,
                message: "unavailable".to_string(),
            }),
            "panic" => panic!("moderator blew up"),
            _ => Ok(Verdict::default()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "Scripted"
    }
}

fn texts(items: &[&str]) -> ModerationPayload {
    ModerationPayload {
        texts: items.iter().map(ToString::to_string).collect(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_checks_run_concurrently() {
    let moderator = Arc::new(ScriptedModerator::default());
    let fan_out = ModerationFanOut::new(Arc::clone(&moderator) as Arc<dyn Moderator>);

    let started = Instant::now();
    let report = fan_out
        .run(&texts(&["a", "b", "c", "d", "e"]), &CancellationToken::new())
        .await;

    assert!(report.is_clean());
    assert_eq!(report.outcomes.len(), 5);
    assert_eq!(moderator.calls.load(Ordering::SeqCst), 5);
    assert!(moderator.max_in_flight.load(Ordering::SeqCst) > 1);
    assert!(started.elapsed() < Duration::from_millis(250));
}

#[tokio::test]
async fn test_failures_are_isolated_per_field() {
    let fan_out = ModerationFanOut::new(Arc::new(ScriptedModerator::default()));
    let report = fan_out
        .run(
            &texts(&["fine", "bad", "error", "panic"]),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.get(FieldId::Texts(0)), Some(&Outcome::Clean));
    assert_eq!(
        report.get(FieldId::Texts(1)),
        Some(&Outcome::Flagged {
            categories: vec!["harassment".to_string()]
        })
    );
    assert!(matches!(
        report.get(FieldId::Texts(2)),
        Some(Outcome::Failed { error }) if error.contains("503")
    ));
    assert!(matches!(
        report.get(FieldId::Texts(3)),
        Some(Outcome::Failed { error }) if error.contains("panicked")
    ));
    assert!(report.into_result().is_err());
}

#[tokio::test]
async fn test_slow_check_times_out() {
    let fan_out = ModerationFanOut::new(Arc::new(ScriptedModerator::default()))
        .with_timeout(Duration::from_millis(100));
    let report = fan_out
        .run(&texts(&["fine", "slow"]), &CancellationToken::new())
        .await;

    assert_eq!(report.get(FieldId::Texts(0)), Some(&Outcome::Clean));
    assert!(matches!(
        report.get(FieldId::Texts(1)),
        Some(Outcome::Failed { error }) if error.contains("timed out")
    ));
}

#[tokio::test]
async fn test_cancellation_stops_in_flight_checks() {
    let fan_out = ModerationFanOut::new(Arc::new(ScriptedModerator::default()));
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = Instant::now();
    let report = fan_out.run(&texts(&["fine", "slow"]), &cancel).await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.get(FieldId::Texts(0)), Some(&Outcome::Clean));
    assert_eq!(
        report.get(FieldId::Texts(1)),
        Some(&Outcome::Failed {
            error: "cancelled".to_string()
        })
    );
}

#[tokio::test]
async fn test_every_field_kind_is_checked() {
    let moderator = Arc::new(ScriptedModerator::default());
    let payload: ModerationPayload = serde_json::from_value(json!({
        "text": "a",
        "chatbot_global_action": "b",
        "instruction": "c",
        "previous_history": [{"role": "user", "message": "d"}],
        "texts": ["e"],
        "messages": [{"role": "user", "content": [{"type": "text", "content": {"text": "f"}}]}]
    }))
    .unwrap();

    let report = moderate(
        Arc::clone(&moderator) as Arc<dyn Moderator>,
        &payload,
        &CancellationToken::new(),
    )
    .await;

    let fields: Vec<String> = report.outcomes.keys().map(ToString::to_string).collect();
    assert_eq!(
        fields,
        vec![
            "text",
            "chatbot_global_action",
            "instruction",
            "previous_history[0]",
            "texts[0]",
            "messages[0].content[0]",
        ]
    );
    assert_eq!(moderator.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_empty_payload_makes_no_calls() {
    let moderator = Arc::new(ScriptedModerator::default());
    let report = ModerationFanOut::new(Arc::clone(&moderator) as Arc<dyn Moderator>)
        .run(&ModerationPayload::default(), &CancellationToken::new())
        .await;

    assert!(report.outcomes.is_empty());
    assert!(report.is_clean());
    assert_eq!(moderator.calls.load(Ordering::SeqCst), 0);
}
