// API error path tests
// A failing expression or remote reference aborts the whole parse.

use futures::future::{BoxFuture, FutureExt};
use xtjson::{
    EvaluationError, Evaluator, Fetcher, MemoryFetcher, ParseOptions, RemoteFetchError, Value,
    XtJson, XtJsonError,
};

struct FailingFetcher;

impl Fetcher for FailingFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, Result<String, RemoteFetchError>> {
        async move { Err(RemoteFetchError::new(uri, "connection refused")) }.boxed()
    }
}

struct RejectingEvaluator;

impl Evaluator for RejectingEvaluator {
    fn evaluate(&self, source: &str) -> Result<Value, EvaluationError> {
        Err(EvaluationError::new(source, "rejected"))
    }
}

#[tokio::test]
async fn test_api_fetch_failure_aborts_parse() {
    let session = XtJson::new().with_fetcher(FailingFetcher);
    let result = session.parse(r#"{"a": 1, "b": ~"https://example.com/b.json"}"#).await;
    match result {
        Err(XtJsonError::Fetch(err)) => {
            assert_eq!(err.uri, "https://example.com/b.json");
            assert_eq!(err.source.to_string(), "connection refused");
        }
        other => panic!("Expected fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_missing_document_in_memory_fetcher() {
    let session = XtJson::new().with_fetcher(MemoryFetcher::new());
    let err = session.parse(r#"[~"nowhere"]"#).await.unwrap_err();
    assert!(matches!(err, XtJsonError::Fetch(ref e) if e.uri == "nowhere"));
    assert_eq!(err.to_string(), "Failed to fetch remote document `nowhere`");
}

#[tokio::test]
async fn test_api_nested_fetch_failure_propagates() {
    let session = XtJson::new().with_fetcher(
        MemoryFetcher::new().with_document("outer", r#"{"inner": ~"missing"}"#),
    );
    let source = r#"{"outer": ~"outer"}"#;

    // The default entry point does not fetch inside fetched documents.
    let value = session.parse(source).await.unwrap();
    assert_eq!(
        value.get("outer").and_then(|v| v.get("inner")),
        Some(&Value::String("missing".into()))
    );

    let err = session.parse_remote_unsafe(source).await.unwrap_err();
    assert!(matches!(err, XtJsonError::Fetch(ref e) if e.uri == "missing"));
}

#[tokio::test]
async fn test_api_evaluation_failure_aborts_parse() {
    let err = xtjson::parse(r#"{"ok": `1 + 1`, "bad": `1 +`}"#).await.unwrap_err();
    match err {
        XtJsonError::Evaluation(e) => {
            assert_eq!(e.expression, "1 +");
            assert_eq!(e.message, "unexpected end of expression");
        }
        other => panic!("Expected evaluation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_api_deeply_nested_expression_is_an_evaluation_error() {
    let source = format!("[`{}1{}`]", "(".repeat(2_000), ")".repeat(2_000));
    match xtjson::parse(&source).await {
        Err(XtJsonError::Evaluation(e)) => assert_eq!(e.message, "expression nested too deeply"),
        other => panic!("Expected evaluation error, got {other:?}"),
    }

    // Safe mode keeps it as text without evaluating.
    assert!(xtjson::parse_safe(&source).await.is_ok());
}

#[tokio::test]
async fn test_api_custom_evaluator_errors() {
    let session = XtJson::new().with_evaluator(RejectingEvaluator);
    let err = session.parse("[`anything`]").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to evaluate `anything`: rejected"
    );

    // Safe mode never calls the evaluator.
    assert_eq!(
        session.parse_safe("[`anything`]").await.unwrap(),
        Value::Array(vec![Value::String("anything".into())])
    );
}

#[tokio::test]
async fn test_api_circular_reference() {
    let session = XtJson::new().with_fetcher(
        MemoryFetcher::new()
            .with_document("a", r#"{"next": ~"b"}"#)
            .with_document("b", r#"{"next": ~"a"}"#),
    );
    match session.parse_remote_unsafe(r#"{"start": ~"a"}"#).await {
        Err(XtJsonError::CircularReference { cycle }) => assert_eq!(cycle, "a -> b -> a"),
        other => panic!("Expected circular reference, got {other:?}"),
    }

    // Without remote trust the chain stops after the first hop.
    let value = session.parse(r#"{"start": ~"a"}"#).await.unwrap();
    assert_eq!(
        value.get("start").and_then(|v| v.get("next")),
        Some(&Value::String("b".into()))
    );
}

#[tokio::test]
async fn test_api_remote_depth_limit() {
    let mut fetcher = MemoryFetcher::new();
    for level in 0..5 {
        fetcher.insert(format!("doc{level}"), format!(r#"[~"doc{}"]"#, level + 1));
    }
    fetcher.insert("doc5", "[\"bottom\"]");

    let session = XtJson::new().with_fetcher(fetcher).with_options(ParseOptions {
        max_remote_depth: 3,
        ..ParseOptions::default()
    });
    match session.parse_remote_unsafe(r#"~"doc0""#).await {
        Err(XtJsonError::RemoteDepthExceeded { uri, limit }) => {
            assert_eq!(uri, "doc3");
            assert_eq!(limit, 3);
        }
        other => panic!("Expected depth error, got {other:?}"),
    }

    let deep_enough = session.clone().with_options(ParseOptions::default());
    let value = deep_enough.parse_remote_unsafe(r#"~"doc0""#).await.unwrap();
    let mut cursor = &value;
    for _ in 0..5 {
        cursor = &cursor.as_array().unwrap()[0];
    }
    assert_eq!(cursor, &Value::Array(vec![Value::String("bottom".into())]));
}

#[test]
fn test_api_strict_session_has_no_capabilities() {
    let session = XtJson::strict();
    assert!(session.evaluator().evaluate("1").is_err());
    assert!(futures::executor::block_on(session.fetcher().fetch("x")).is_err());
}

#[test]
fn test_api_errors_carry_diagnostic_codes() {
    use miette::Diagnostic;

    let err = futures::executor::block_on(xtjson::parse("`1 - 'a'`")).unwrap_err();
    assert_eq!(
        err.code().map(|code| code.to_string()),
        Some("interpreter::evaluation_failed".to_string())
    );
    assert!(err.help().is_some());
}
