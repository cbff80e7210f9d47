//! HttpCatalog wire tests against a throwaway local server

use axum::extract::Query;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use wcrs_pull::catalog::{Catalog, HttpCatalog};

#[derive(Deserialize)]
struct ShowIdParam {
    show_id: i64,
}

async fn spawn_stub() -> String {
    let app = Router::new()
        .route(
            "/shows",
            get(|| async {
                Json(json!({
                    "shows": [
                        { "id": 7, "title": "Static", "file_path": "/air/static.mp3" }
                    ]
                }))
            }),
        )
        .route(
            "/episodes",
            get(|Query(params): Query<ShowIdParam>| async move {
                if params.show_id == 7 {
                    Json(json!({
                        "show_id": 7,
                        "episodes": [
                            { "id": 70, "title": "Pilot", "air_date": 1767225600, "file_id": "b2-70" }
                        ]
                    }))
                    .into_response()
                } else {
                    (
                        axum::http::StatusCode::NOT_FOUND,
                        Json(json!({ "code": "not_found", "error": "no such show" })),
                    )
                        .into_response()
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn parses_shows_and_episodes() {
    let base = spawn_stub().await;
    let catalog = HttpCatalog::new(&base);

    let shows = catalog.shows().await.unwrap();
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].id, 7);
    assert_eq!(shows[0].file_path, "/air/static.mp3");

    let episodes = catalog.upcoming_episodes(7).await.unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].file_id, "b2-70");
    assert_eq!(episodes[0].air_date, 1767225600);
}

#[tokio::test]
async fn error_payload_surfaces_in_message() {
    let base = spawn_stub().await;
    let catalog = HttpCatalog::new(&base);

    let err = catalog.upcoming_episodes(99).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("404"));
    assert!(message.contains("no such show"));
}
