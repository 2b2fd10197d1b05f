//! Dispatch routing through a configured hub.

mod common;

use std::sync::atomic::Ordering;

use igor_channels::Channel;
use igor_core::{Hub, HubState};
use igor_reactors::Reactor;
use igor_types::config::Config;
use igor_types::{DispatchOutcome, Event, EventType};

use common::{MockChannel, MockReactor, Reply, config_toml, registry_with};

fn message(content: &str, channel: &str) -> Event {
    Event::new(EventType::Message, content, channel)
}

fn configured(
    channels: &[std::sync::Arc<MockChannel>],
    reactors: &[std::sync::Arc<MockReactor>],
) -> Hub {
    let channel_names: Vec<&str> = channels.iter().map(|c| c.name()).collect();
    let reactor_names: Vec<&str> = reactors.iter().map(|r| r.name()).collect();
    let config = Config::from_toml_str(&config_toml(&channel_names, &reactor_names)).unwrap();
    let hub = Hub::new();
    hub.configure(&config, &registry_with(channels, reactors)).unwrap();
    hub
}

#[tokio::test]
async fn first_matching_reactor_wins() {
    let console = MockChannel::new("console");
    let first = MockReactor::new("first", "igor", Reply::Text("from first".into()));
    let second = MockReactor::new("second", "igor", Reply::Text("from second".into()));
    let hub = configured(&[console.clone()], &[first.clone(), second.clone()]);

    let outcome = hub.dispatch(message("igor hi", "console")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Delivered {
            reactor: "first".into(),
            channel: "console".into()
        }
    );
    assert_eq!(console.sent_contents(), vec!["from first"]);
    assert_eq!(first.handled(), 1);
    assert_eq!(second.handled(), 0);
    assert_eq!(second.matched.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn registration_order_is_config_order() {
    let console = MockChannel::new("console");
    let a = MockReactor::new("a", "igor", Reply::Text("a".into()));
    let b = MockReactor::new("b", "igor", Reply::Text("b".into()));

    let config = Config::from_toml_str(&config_toml(&["console"], &["b", "a"])).unwrap();
    let hub = Hub::new();
    hub.configure(&config, &registry_with(&[console.clone()], &[a.clone(), b.clone()]))
        .unwrap();

    assert_eq!(hub.reactor_names(), vec!["b", "a"]);
    hub.dispatch(message("igor go", "console")).await;
    assert_eq!(console.sent_contents(), vec!["b"]);
}

#[tokio::test]
async fn later_reactor_matches_when_earlier_declines_to_match() {
    let console = MockChannel::new("console");
    let echo = MockReactor::new("echo", "igor echo", Reply::Text("echoed".into()));
    let fortune = MockReactor::new("fortune", "igor fortune", Reply::Text("lucky".into()));
    let hub = configured(&[console.clone()], &[echo.clone(), fortune.clone()]);

    hub.dispatch(message("igor fortune", "console")).await;

    assert_eq!(console.sent_contents(), vec!["lucky"]);
    assert_eq!(echo.matched.load(Ordering::SeqCst), 1);
    assert_eq!(echo.handled(), 0);
}

#[tokio::test]
async fn no_match_is_unhandled() {
    let console = MockChannel::new("console");
    let echo = MockReactor::new("echo", "igor echo", Reply::Text("x".into()));
    let hub = configured(&[console.clone()], &[echo]);

    let outcome = hub.dispatch(message("igor dance", "console")).await;

    assert_eq!(outcome, DispatchOutcome::Unhandled);
    assert!(console.sent_contents().is_empty());
}

#[tokio::test]
async fn declined_response_falls_through_to_next_reactor() {
    let console = MockChannel::new("console");
    let quiet = MockReactor::new("quiet", "igor", Reply::Nothing);
    let echo = MockReactor::new("echo", "igor echo", Reply::Text("hello world".into()));
    let hub = configured(&[console.clone()], &[quiet.clone(), echo.clone()]);

    let outcome = hub.dispatch(message("igor echo hello world", "console")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Delivered {
            reactor: "echo".into(),
            channel: "console".into(),
        }
    );
    assert_eq!(quiet.handled(), 1);
    assert_eq!(echo.handled(), 1);
    assert_eq!(console.sent_contents(), vec!["hello world"]);
}

#[tokio::test]
async fn every_reactor_declining_is_unhandled() {
    let console = MockChannel::new("console");
    let first = MockReactor::new("first", "igor", Reply::Nothing);
    let second = MockReactor::new("second", "igor", Reply::Nothing);
    let hub = configured(&[console.clone()], &[first.clone(), second.clone()]);

    let outcome = hub.dispatch(message("igor hi", "console")).await;

    assert_eq!(outcome, DispatchOutcome::Unhandled);
    assert_eq!(first.handled(), 1);
    assert_eq!(second.handled(), 1);
    assert!(console.sent_contents().is_empty());
}

#[tokio::test]
async fn empty_response_is_still_delivered() {
    let console = MockChannel::new("console");
    let blank = MockReactor::new("blank", "igor", Reply::Text(String::new()));
    let other = MockReactor::new("other", "igor", Reply::Text("other".into()));
    let hub = configured(&[console.clone()], &[blank, other.clone()]);

    let outcome = hub.dispatch(message("igor hi", "console")).await;

    assert!(outcome.is_delivered());
    assert_eq!(console.sent_contents(), vec![""]);
    assert_eq!(other.handled(), 0);
}

#[tokio::test]
async fn response_goes_to_event_channel_even_if_tagged_otherwise() {
    let alpha = MockChannel::new("alpha");
    let beta = MockChannel::new("beta");
    let sneaky = MockReactor::new("sneaky", "igor", Reply::TaggedFor("hi".into(), "beta".into()));
    let hub = configured(&[alpha.clone(), beta.clone()], &[sneaky]);

    let outcome = hub.dispatch(message("igor hi", "alpha")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Delivered {
            reactor: "sneaky".into(),
            channel: "alpha".into()
        }
    );
    assert_eq!(alpha.sent_contents(), vec!["hi"]);
    assert_eq!(alpha.sent.lock().unwrap()[0].channel, "alpha");
    assert!(beta.sent_contents().is_empty());
}

#[tokio::test]
async fn unknown_channel_is_dropped_without_error() {
    let console = MockChannel::new("console");
    let echo = MockReactor::new("echo", "igor", Reply::Text("x".into()));
    let hub = configured(&[console.clone()], &[echo.clone()]);

    let outcome = hub.dispatch(message("igor hi", "irc")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::UnknownChannel {
            channel: "irc".into()
        }
    );
    assert_eq!(echo.handled(), 1);
    assert!(console.sent_contents().is_empty());
}

#[tokio::test]
async fn reactor_error_is_contained() {
    let console = MockChannel::new("console");
    let broken = MockReactor::new("broken", "igor", Reply::Fail);
    let hub = configured(&[console.clone()], &[broken]);

    let outcome = hub.dispatch(message("igor hi", "console")).await;

    match outcome {
        DispatchOutcome::ReactorFailed { reactor, reason } => {
            assert_eq!(reactor, "broken");
            assert!(reason.contains("upstream unavailable"));
        }
        other => panic!("expected ReactorFailed, got {other:?}"),
    }
    assert!(console.sent_contents().is_empty());
}

#[tokio::test]
async fn reactor_panic_is_contained() {
    let console = MockChannel::new("console");
    let bomb = MockReactor::new("bomb", "igor", Reply::Panic);
    let echo = MockReactor::new("echo", "igor", Reply::Text("later".into()));
    let hub = configured(&[console.clone()], &[bomb, echo]);

    let outcome = hub.dispatch(message("igor hi", "console")).await;
    assert!(matches!(
        outcome,
        DispatchOutcome::ReactorFailed { ref reason, .. } if reason.contains("handler exploded")
    ));

    // The hub keeps working afterwards.
    let outcome = hub.dispatch(message("igor again", "console")).await;
    assert!(matches!(outcome, DispatchOutcome::ReactorFailed { .. }));
    assert!(console.sent_contents().is_empty());
}

#[tokio::test]
async fn panicking_matcher_is_skipped() {
    let console = MockChannel::new("console");
    let bad = MockReactor::panicking_matcher("bad");
    let echo = MockReactor::new("echo", "igor", Reply::Text("ok".into()));
    let hub = configured(&[console.clone()], &[bad, echo]);

    let outcome = hub.dispatch(message("igor hi", "console")).await;

    assert!(outcome.is_delivered());
    assert_eq!(console.sent_contents(), vec!["ok"]);
}

#[tokio::test]
async fn delivery_failure_is_reported() {
    let flaky = MockChannel::failing("flaky");
    let echo = MockReactor::new("echo", "igor", Reply::Text("x".into()));
    let hub = configured(&[flaky], &[echo]);

    let outcome = hub.dispatch(message("igor hi", "flaky")).await;

    match outcome {
        DispatchOutcome::DeliveryFailed { channel, reason } => {
            assert_eq!(channel, "flaky");
            assert!(reason.contains("wire unplugged"));
        }
        other => panic!("expected DeliveryFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_dispatches_from_two_channels() {
    let alpha = MockChannel::new("alpha");
    let beta = MockChannel::new("beta");
    let echo = MockReactor::new("echo", "igor", Reply::Text("pong".into()));
    let hub = std::sync::Arc::new(configured(&[alpha.clone(), beta.clone()], &[echo.clone()]));

    let mut handles = Vec::new();
    for i in 0..10 {
        let hub = hub.clone();
        let channel = if i % 2 == 0 { "alpha" } else { "beta" };
        handles.push(tokio::spawn(async move {
            hub.dispatch(message("igor ping", channel)).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_delivered());
    }

    assert_eq!(alpha.sent_contents().len(), 5);
    assert_eq!(beta.sent_contents().len(), 5);
    assert_eq!(echo.handled(), 10);
}

#[tokio::test]
async fn configure_skips_unknown_and_disabled_plugins() {
    let console = MockChannel::new("console");
    let echo = MockReactor::new("echo", "igor", Reply::Text("x".into()));
    let raw = r#"
        [channels.console]
        [channels.irc]
        server = "irc.example.org"

        [reactors.weather]
        [reactors.echo]
        [reactors.echo_off]
        enabled = false
    "#;
    let config = Config::from_toml_str(raw).unwrap();
    let hub = Hub::new();

    let report = hub
        .configure(&config, &registry_with(&[console], &[echo]))
        .unwrap();

    assert_eq!(hub.state(), HubState::Configured);
    assert_eq!(report.channels, vec!["console"]);
    assert_eq!(report.reactors, vec!["echo"]);
    assert_eq!(report.disabled, vec!["echo_off"]);
    let skipped: Vec<(&str, &str)> = report
        .skipped
        .iter()
        .map(|s| (s.kind, s.name.as_str()))
        .collect();
    assert_eq!(skipped, vec![("channel", "irc"), ("reactor", "weather")]);
    assert!(!report.is_clean());
}
