mod common;

use common::{listing, logged_in_source, StubServer};
use kavita_source::host::MangaStatus;
use kavita_source::requests::Error;

use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn manga_details_from_series() {
    let server = StubServer::new();
    server.route(
        "/api/series/12/",
        &[],
        json!({
            "id": 12,
            "name": "Planetes",
            "lastModified": "2023-11-05T09:15:00Z",
            "metadata": {
                "title": "Planetes",
                "alternateTitles": ["プラネテス"],
                "summary": "Debris collectors in orbit.",
                "status": "ENDED",
                "language": "ja"
            }
        }),
    );
    let source = logged_in_source(&server).await;

    let details = source.get_manga_details("12").await.unwrap();

    assert_eq!(details.id, "12");
    assert_eq!(details.titles, vec!["Planetes", "プラネテス"]);
    assert_eq!(details.status, MangaStatus::Completed);
    assert_eq!(details.lang_code, "ja");
    assert_eq!(details.description, "Debris collectors in orbit.");
    assert_eq!(
        details.image,
        "http://kavita.test/api/Image/series-cover?seriesId=12"
    );
    assert!(details.last_update.is_some());
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn description_falls_back_to_chapter_summary() {
    let server = StubServer::new();
    server.route(
        "/api/series/3/",
        &[],
        json!({
            "id": 3,
            "name": "Blame!",
            "metadata": { "summary": "", "status": "SOMETHING_NEW" }
        }),
    );
    server.route(
        "/api/Series/series-detail",
        &[("seriesId", "3")],
        listing(vec![
            json!({"id": 30, "number": 1, "summary": ""}),
            json!({"id": 31, "number": 2, "summary": "Killy wanders the City."}),
        ]),
    );
    let source = logged_in_source(&server).await;

    let details = source.get_manga_details("3").await.unwrap();

    assert_eq!(details.description, "Killy wanders the City.");
    assert_eq!(details.status, MangaStatus::Ongoing);
    assert_eq!(details.lang_code, "en");
    assert_eq!(server.request_count(), 2);
}

#[tokio::test]
async fn chapters_keep_server_order() {
    let server = StubServer::new();
    server.route(
        "/api/Series/series-detail",
        &[("seriesId", "8")],
        listing(vec![
            json!({
                "id": 81,
                "number": "1",
                "title": "Departure",
                "lastModified": "2024-02-01T10:00:00",
                "sortOrder": 1
            }),
            json!({
                "id": 82,
                "number": 1.5,
                "title": "",
                "sortOrder": 1.5
            }),
        ]),
    );
    let source = logged_in_source(&server).await;

    let chapters = source.get_chapters("8").await.unwrap();

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].id, "81");
    assert_eq!(chapters[0].manga_id, "8");
    assert_eq!(chapters[0].chap_num, 1.0);
    assert_eq!(chapters[0].name, "Departure");
    assert_eq!(chapters[0].sort_index, 1.0);
    assert!(chapters[0].time.is_some());
    assert_eq!(chapters[1].name, "Chapter 1.5");
    assert_eq!(chapters[1].sort_index, 1.5);
    assert_eq!(chapters[1].time, None);
}

#[tokio::test]
async fn pages_with_unsupported_media_types_are_dropped() {
    let server = StubServer::new();
    server.route(
        "/api/Series/chapter",
        &[("chapterID", "55")],
        listing(vec![
            json!({"number": 0, "mediaType": "jpeg"}),
            json!({"number": 1, "mediaType": "png"}),
            json!({"number": 2, "mediaType": "application/x-unknown"}),
            json!({"number": 3, "mediaType": "webp"}),
        ]),
    );
    let source = logged_in_source(&server).await;

    let details = source.get_chapter_details("8", "55").await.unwrap();

    assert_eq!(
        details.pages,
        vec![
            "http://kavita.test/api/Reader/image?chapterId=55&page=0",
            "http://kavita.test/api/Reader/image?chapterId=55&page=1",
            "http://kavita.test/api/Reader/image?chapterId=55&page=3",
        ]
    );
    assert_eq!(details.manga_id, "8");
    assert_eq!(details.id, "55");
}

#[tokio::test]
async fn detail_errors_propagate() {
    let server = StubServer::new();
    server.route_with_status(
        "/api/series/404/",
        &[],
        StatusCode::NOT_FOUND,
        json!({}),
    );
    server.route_with_status(
        "/api/Series/series-detail",
        &[],
        StatusCode::UNAUTHORIZED,
        json!({}),
    );
    let source = logged_in_source(&server).await;

    let err = source.get_manga_details("404").await.unwrap_err();
    assert!(matches!(err, Error::StatusError(StatusCode::NOT_FOUND)));

    let err = source.get_chapters("1").await.unwrap_err();
    assert!(matches!(err, Error::UnauthorizedError));

    server.go_offline();
    let err = source.get_chapter_details("1", "2").await.unwrap_err();
    assert!(matches!(err, Error::RequestWithMiddleWareError(_)));
}

#[tokio::test]
async fn malformed_listing_is_a_parse_error() {
    let server = StubServer::new();
    server.route(
        "/api/Series/chapter",
        &[],
        json!({"content": [{"mediaType": "png"}]}),
    );
    let source = logged_in_source(&server).await;

    let err = source.get_chapter_details("1", "2").await.unwrap_err();
    assert!(matches!(err, Error::JsonError(_)));
}
