//! Integration tests using a mock provider
//!
//! Tests the full flow: HTTP documents → normalize/derive → sink

use football_etl::sink::ParquetSink;
use football_etl::{
    CompetitionOutcome, ErrorCategory, FailurePolicy, HttpSourceClient, LoadMode, MemorySink,
    Phase, Pipeline, PipelineOptions, RunState, SourceConfig, Table,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "integration-key";

// ============================================================================
// Fixtures
// ============================================================================

fn teams_doc() -> serde_json::Value {
    json!({
        "count": 2,
        "teams": [
            {
                "id": 57, "name": "Arsenal FC", "shortName": "Arsenal", "tla": "ARS",
                "area": {"name": "England"}, "founded": 1886, "venue": "Emirates Stadium",
                "clubColors": "Red / White", "website": "http://www.arsenal.com"
            },
            {"id": 61, "name": "Chelsea FC"}
        ]
    })
}

fn matches_doc() -> serde_json::Value {
    json!({
        "competition": {"id": 2021, "name": "Premier League"},
        "matches": [
            {
                "id": 1, "season": {"id": 2287}, "utcDate": "2024-08-17T11:30:00Z",
                "status": "FINISHED", "matchday": 1, "stage": "REGULAR_SEASON",
                "homeTeam": {"id": 57, "name": "Arsenal FC"},
                "awayTeam": {"id": 61, "name": "Chelsea FC"},
                "score": {"winner": "HOME_TEAM", "duration": "REGULAR",
                          "fullTime": {"home": 2, "away": 0}, "halfTime": {"home": 1, "away": 0}},
                "referees": [{"name": "Anthony Taylor"}]
            },
            {
                "id": 2, "utcDate": "2024-08-17T14:00:00Z", "status": "FINISHED", "matchday": 1,
                "homeTeam": {"id": 61}, "awayTeam": {"id": 57}
            },
            {
                "id": 3, "utcDate": "2024-08-18T15:30:00Z", "status": "SCHEDULED", "matchday": 1
            }
        ]
    })
}

fn standings_doc() -> serde_json::Value {
    let rows = json!([
        {"position": 1, "team": {"id": 57, "name": "Arsenal FC"}, "points": 3},
        {"position": 2, "team": {"id": 61, "name": "Chelsea FC"}, "points": 0}
    ]);
    json!({
        "competition": {"id": 2021, "name": "Premier League"},
        "season": {"id": 2287, "startDate": "2024-08-16", "endDate": "2025-05-25"},
        "standings": [
            {"type": "TOTAL", "table": rows},
            {"type": "HOME", "table": rows},
            {"type": "AWAY", "table": rows}
        ]
    })
}

fn scorers_doc() -> serde_json::Value {
    json!({
        "competition": {"id": 2021, "name": "Premier League"},
        "season": {"id": 2287},
        "scorers": [
            {"player": {"id": 9, "name": "Striker", "nationality": "England"},
             "team": {"id": 57, "name": "Arsenal FC"}, "goals": 2, "assists": 1}
        ]
    })
}

async fn mount_competition(server: &MockServer, code: &str) {
    let docs = [
        ("teams", teams_doc()),
        ("matches", matches_doc()),
        ("standings", standings_doc()),
        ("scorers", scorers_doc()),
    ];
    for (resource, doc) in docs {
        Mock::given(method("GET"))
            .and(path(format!("/competitions/{code}/{resource}")))
            .and(header("X-Auth-Token", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(doc))
            .expect(1)
            .mount(server)
            .await;
    }
}

fn source_for(server: &MockServer) -> HttpSourceClient {
    HttpSourceClient::new(&SourceConfig::new(API_KEY).with_base_url(server.uri())).unwrap()
}

fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

// ============================================================================
// End-to-end runs
// ============================================================================

#[tokio::test]
async fn test_full_run_into_memory() {
    let server = MockServer::start().await;
    mount_competition(&server, "PL").await;
    mount_competition(&server, "PD").await;

    let mut pipeline = Pipeline::new(
        source_for(&server),
        MemorySink::new(),
        PipelineOptions::new(codes(&["PL", "PD"])),
    )
    .unwrap();
    let report = pipeline.run().await;

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.loaded(), 2);

    let sink = pipeline.into_sink();
    assert_eq!(sink.row_count(Table::DimTeams), 4);
    assert_eq!(sink.row_count(Table::DimDates), 4);
    assert_eq!(sink.row_count(Table::FactMatches), 6);
    assert_eq!(sink.row_count(Table::StandingsSnapshot), 12);
    assert_eq!(sink.row_count(Table::DimScorers), 2);

    let dates = sink
        .batches()
        .iter()
        .find(|b| b.table() == Table::DimDates)
        .unwrap();
    let rows = dates.to_json_rows();
    assert_eq!(rows[0]["date_id"], 20_240_817);
    assert_eq!(rows[0]["day_of_week"], 7);
    assert_eq!(rows[1]["date_id"], 20_240_818);
    assert_eq!(rows[1]["day_of_week"], 1);
}

#[tokio::test]
async fn test_fail_fast_on_provider_error() {
    let server = MockServer::start().await;
    mount_competition(&server, "PL").await;

    Mock::given(method("GET"))
        .and(path("/competitions/PD/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(teams_doc()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/competitions/PD/matches"))
        .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/competitions/BL1/teams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(teams_doc()))
        .expect(0)
        .mount(&server)
        .await;

    let mut pipeline = Pipeline::new(
        source_for(&server),
        MemorySink::new(),
        PipelineOptions::new(codes(&["PL", "PD", "BL1"])),
    )
    .unwrap();
    let report = pipeline.run().await;

    assert_eq!(report.state, RunState::Failed);
    assert_eq!(report.exit_code(), 1);
    assert!(report.competitions[0].outcome.is_loaded());
    assert!(matches!(
        report.competitions[1].outcome,
        CompetitionOutcome::Failed {
            phase: Phase::Extract,
            ..
        }
    ));
    assert!(matches!(
        report.competitions[2].outcome,
        CompetitionOutcome::NotAttempted
    ));

    let err = report.first_error().unwrap();
    assert_eq!(err.category(), ErrorCategory::SourceUnavailable);
    assert!(err.to_string().contains("HTTP 429"));

    let sink = pipeline.into_sink();
    assert!(sink.batches().iter().all(|b| b.competition() == "PL"));
    assert_eq!(sink.batches().len(), 5);
}

#[tokio::test]
async fn test_continue_on_error_with_bad_credentials() {
    let server = MockServer::start().await;
    mount_competition(&server, "BL1").await;

    Mock::given(method("GET"))
        .and(path("/competitions/XYZ/teams"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "message": "The resource you are looking for is restricted.",
            "errorCode": 403
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = PipelineOptions::new(codes(&["XYZ", "BL1"]))
        .with_failure_policy(FailurePolicy::ContinueOnError);
    let mut pipeline = Pipeline::new(source_for(&server), MemorySink::new(), options).unwrap();
    let report = pipeline.run().await;

    assert_eq!(report.state, RunState::Failed);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.loaded(), 1);
    assert_eq!(pipeline.sink().for_competition("BL1").count(), 5);
}

#[tokio::test]
async fn test_full_run_into_parquet() {
    let server = MockServer::start().await;
    mount_competition(&server, "PL").await;

    let dir = tempfile::tempdir().unwrap();
    let sink = ParquetSink::new(dir.path()).unwrap();
    let mut pipeline =
        Pipeline::new(source_for(&server), sink, PipelineOptions::new(codes(&["PL"]))).unwrap();
    let report = pipeline.run().await;

    assert!(report.is_success());
    let sink = pipeline.into_sink();
    assert_eq!(sink.written().len(), 5);
    for table in Table::LOAD_ORDER {
        let table_dir = dir.path().join(table.name());
        let files: Vec<_> = std::fs::read_dir(&table_dir).unwrap().collect();
        assert_eq!(files.len(), 1, "expected one file in {}", table_dir.display());
    }
}

#[tokio::test]
async fn test_parquet_sink_refuses_upsert() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let options = PipelineOptions::new(codes(&["PL"])).with_load_mode(LoadMode::Upsert);
    let err = Pipeline::new(
        source_for(&server),
        ParquetSink::new(dir.path()).unwrap(),
        options,
    )
    .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Configuration);
}
