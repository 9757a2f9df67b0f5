use std::sync::Arc;

use serde_json::json;
use sheets_wizard::ToolDispatcher;
use sheets_wizard::auth::AuthClient;
use sheets_wizard::sheets::model::ValueInputOption;
use sheets_wizard::sheets::{
    HttpSheetsFactory, SheetsApi, SheetsClientFactory, SheetsConnector, SheetsError,
};
use sheets_wizard::tools::chart::{ChartWindow, add_chart_request};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;

fn factory(server: &MockServer) -> HttpSheetsFactory {
    HttpSheetsFactory::new(&format!("{}/v4", server.uri()), None).expect("factory")
}

fn client(server: &MockServer, credentials: &str) -> Arc<dyn SheetsApi> {
    let auth = AuthClient::from_json(credentials).expect("credentials");
    factory(server).connect(auth).expect("client")
}

#[tokio::test]
async fn base_url_gains_trailing_slash() {
    let server = MockServer::start().await;
    assert!(factory(&server).base_url().path().ends_with("/v4/"));
}

#[tokio::test]
async fn create_spreadsheet_posts_title_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets"))
        .and(header("authorization", "Bearer ya29.token"))
        .and(body_json(json!({"properties": {"title": "Budget"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "abc",
            "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/abc/edit",
            "properties": {"title": "Budget", "locale": "en_US"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let created = client(&server, &support::creds())
        .create_spreadsheet("Budget")
        .await
        .expect("create");

    assert_eq!(created.spreadsheet_id.as_deref(), Some("abc"));
    assert_eq!(
        created.spreadsheet_url.as_deref(),
        Some("https://docs.google.com/spreadsheets/d/abc/edit")
    );
}

#[tokio::test]
async fn unauthenticated_client_sends_no_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/abc"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {
                "code": 401,
                "message": "Request is missing required authentication credential.",
                "status": "UNAUTHENTICATED"
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server, &support::creds_without_token())
        .get_spreadsheet("abc")
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Request is missing required authentication credential."
    );
    assert_eq!(err.status(), Some(401));

    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn range_segment_is_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/abc/values/My%20Sheet!A1:B2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "'My Sheet'!A1:B2",
            "majorDimension": "ROWS",
            "values": [["a", "b"]]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let values = client(&server, &support::creds())
        .get_values("abc", "My Sheet!A1:B2")
        .await
        .expect("values");

    assert_eq!(values.range.as_deref(), Some("'My Sheet'!A1:B2"));
    assert_eq!(values.values, Some(vec![vec![json!("a"), json!("b")]]));
}

#[tokio::test]
async fn update_values_sends_input_option_query() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v4/spreadsheets/abc/values/Sheet1!A1"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(body_json(json!({"values": [["=SUM(B1:B3)"]]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "abc",
            "updatedRange": "Sheet1!A1",
            "updatedRows": 1,
            "updatedColumns": 1,
            "updatedCells": 1
        })))
        .expect(1)
        .mount(&server)
        .await;

    let updated = client(&server, &support::creds())
        .update_values(
            "abc",
            "Sheet1!A1",
            vec![vec!["=SUM(B1:B3)".into()]],
            ValueInputOption::UserEntered,
        )
        .await
        .expect("update");

    assert_eq!(updated.updated_range.as_deref(), Some("Sheet1!A1"));
    assert_eq!(updated.updated_cells, Some(1));
}

#[tokio::test]
async fn batch_update_posts_to_colon_action() {
    let server = MockServer::start().await;
    let request = add_chart_request(0, "COLUMN", ChartWindow::FIXED);
    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/abc:batchUpdate"))
        .and(body_json(json!({"requests": [request.clone()]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "abc",
            "replies": [{"addChart": {"chart": {"chartId": 1}}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, &support::creds())
        .batch_update("abc", vec![request])
        .await
        .expect("batch update");

    assert_eq!(response.replies.len(), 1);
}

#[tokio::test]
async fn plain_text_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = client(&server, &support::creds())
        .get_spreadsheet("abc")
        .await
        .unwrap_err();

    assert!(matches!(err, SheetsError::Api { status: 502, .. }));
    assert_eq!(err.to_string(), "upstream unavailable");
}

#[tokio::test]
async fn export_csv_end_to_end_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "spreadsheetId": "abc",
            "sheets": [
                {"properties": {"sheetId": 0, "title": "Sheet1", "index": 0}},
                {"properties": {"sheetId": 314, "title": "Q3 Sales", "index": 1}}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/abc/values/Q3%20Sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "range": "'Q3 Sales'!A1:Z1000",
            "values": [["region", "total"], ["north", "12"]]
        })))
        .mount(&server)
        .await;

    let connector = SheetsConnector::new(Arc::new(factory(&server)), 0);
    let dispatcher = ToolDispatcher::new(connector);
    let result = dispatcher
        .call(
            "export_csv",
            support::args(json!({"spreadsheetId": "abc", "sheetId": 314, "credentials": support::creds()})),
        )
        .await;
    let body: serde_json::Value =
        serde_json::from_str(&support::envelope_text(&result)).expect("json body");

    assert_eq!(
        body,
        json!({"csv": "region,total\nnorth,12", "rowCount": 2, "sheetTitle": "Q3 Sales"})
    );
}

#[tokio::test]
async fn remote_error_reaches_envelope_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let dispatcher = ToolDispatcher::new(SheetsConnector::new(Arc::new(factory(&server)), 0));
    let result = dispatcher
        .call(
            "get_data",
            support::args(json!({"spreadsheetId": "missing", "range": "A1", "credentials": support::creds()})),
        )
        .await;

    assert_eq!(
        support::envelope_text(&result),
        "Error: Requested entity was not found."
    );
}
