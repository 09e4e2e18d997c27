use httpmock::prelude::*;
use std::time::Duration;
use where2meet::adapters::OsrmMatrixSource;
use where2meet::domain::ports::DurationMatrixSource;
use where2meet::Coordinate;

fn sources() -> Vec<Coordinate> {
    vec![
        Coordinate::new(40.7589, -73.9851).unwrap(),
        Coordinate::new(40.7614, -73.9776).unwrap(),
    ]
}

fn destinations() -> Vec<Coordinate> {
    vec![
        Coordinate::new(40.7612, -73.9814).unwrap(),
        Coordinate::new(40.7622, -73.9814).unwrap(),
    ]
}

#[tokio::test]
async fn test_null_cells_become_unreachable() {
    let server = MockServer::start();
    let table_mock = server.mock(|when, then| {
        when.method(GET)
            .path_contains("/table/v1/walking/")
            .query_param("sources", "0,1")
            .query_param("destinations", "2,3");
        then.status(200).json_body(serde_json::json!({
            "code": "Ok",
            "durations": [[null, 120.5], [300.0, null]]
        }));
    });

    let source = OsrmMatrixSource::new(server.base_url(), Duration::from_secs(2)).unwrap();
    let matrix = source
        .fetch_duration_matrix("walking", &sources(), &destinations())
        .await
        .unwrap();

    table_mock.assert();
    assert_eq!(matrix.len(), 2);
    assert!(matrix[0][0].is_infinite());
    assert_eq!(matrix[0][1], 120.5);
    assert_eq!(matrix[1][0], 300.0);
    assert!(matrix[1][1].is_infinite());
}

#[tokio::test]
async fn test_non_ok_code_gives_no_matrix() {
    let server = MockServer::start();
    let table_mock = server.mock(|when, then| {
        when.method(GET).path_contains("/table/v1/");
        then.status(200).json_body(serde_json::json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        }));
    });

    let source = OsrmMatrixSource::new(server.base_url(), Duration::from_secs(2)).unwrap();
    let matrix = source
        .fetch_duration_matrix("driving", &sources(), &destinations())
        .await;

    table_mock.assert();
    assert!(matrix.is_none());
}

#[tokio::test]
async fn test_slow_router_times_out_to_no_matrix() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path_contains("/table/v1/");
        then.status(200)
            .delay(Duration::from_millis(1500))
            .json_body(serde_json::json!({
                "code": "Ok",
                "durations": [[1.0, 2.0], [3.0, 4.0]]
            }));
    });

    let source = OsrmMatrixSource::new(server.base_url(), Duration::from_millis(300)).unwrap();
    let matrix = source
        .fetch_duration_matrix("driving", &sources(), &destinations())
        .await;

    assert!(matrix.is_none());
}
