use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use cinescope::{MovieCategory, TmdbApi, TmdbClient, TmdbConfig, TmdbError};
use serde_json::json;
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<String>>>;

async fn fake_tmdb(State(seen): State<Seen>, uri: Uri) -> Response {
    seen.lock().unwrap().push(uri.to_string());
    let page: u32 = uri
        .query()
        .and_then(|q| q.split('&').find_map(|kv| kv.strip_prefix("page=")))
        .and_then(|p| p.parse().ok())
        .unwrap_or(1);

    match uri.path() {
        "/3/movie/popular" | "/3/search/movie" => Json(json!({
            "page": page,
            "results": [{ "id": 438631, "title": "Dune", "release_date": "2021-09-15" }],
            "total_pages": 10,
            "total_results": 200
        }))
        .into_response(),
        "/3/movie/550/credits" => Json(json!({
            "id": 550,
            "cast": [{ "id": 819, "name": "Edward Norton", "character": "The Narrator" }],
            "crew": [
                { "id": 1, "name": "Art Linson", "job": "Producer" },
                { "id": 7467, "name": "David Fincher", "job": "Director" }
            ]
        }))
        .into_response(),
        "/3/movie/404" => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status_code": 34,
                "status_message": "The resource you requested could not be found.",
                "success": false
            })),
        )
            .into_response(),
        "/3/movie/500" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "/3/movie/7" => Json(json!({ "id": "seven" })).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_fake() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(fake_tmdb).with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/3/"), seen)
}

fn client_for(base: &str, api_key: Option<&str>) -> TmdbClient {
    let config = TmdbConfig::from_lookup(|var| match var {
        "TMDB_BASE_URL" => Some(base.to_string()),
        "TMDB_API_KEY" => api_key.map(str::to_string),
        _ => None,
    });
    TmdbClient::new(config).unwrap()
}

#[tokio::test]
async fn category_request_carries_key_and_page() {
    let (base, seen) = spawn_fake().await;
    let client = client_for(&base, Some("test-key"));
    let page = client
        .movies_by_category(MovieCategory::Popular, 2)
        .await
        .unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.results[0].title, "Dune");
    assert_eq!(page.total_pages, 10);
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        ["/3/movie/popular?api_key=test-key&page=2".to_string()]
    );
}

#[tokio::test]
async fn search_query_is_percent_encoded() {
    let (base, seen) = spawn_fake().await;
    let client = client_for(&base, Some("test-key"));
    client.search_movies("amélie & co", 1).await.unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[0],
        "/3/search/movie?api_key=test-key&query=am%C3%A9lie%20%26%20co&page=1"
    );
}

#[tokio::test]
async fn credits_resolve_director_and_producers() {
    let (base, _seen) = spawn_fake().await;
    let client = client_for(&base, Some("test-key"));
    let credits = client.movie_credits(550).await.unwrap();
    assert_eq!(credits.director().map(|c| c.name.as_str()), Some("David Fincher"));
    assert_eq!(credits.producers().len(), 1);
    assert_eq!(credits.cast[0].profile_path, None);
}

#[tokio::test]
async fn error_status_uses_tmdb_message() {
    let (base, _seen) = spawn_fake().await;
    let client = client_for(&base, Some("test-key"));
    let err = client.movie_details(404).await.unwrap_err();
    assert_eq!(
        err,
        TmdbError::Api {
            status: 404,
            message: "The resource you requested could not be found.".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "TMDB API Error: The resource you requested could not be found."
    );
}

#[tokio::test]
async fn unreadable_error_body_is_unknown_error() {
    let (base, _seen) = spawn_fake().await;
    let client = client_for(&base, Some("test-key"));
    let err = client.movie_details(500).await.unwrap_err();
    assert_eq!(
        err,
        TmdbError::Api {
            status: 500,
            message: "Unknown error".to_string()
        }
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unexpected_shape_is_a_decode_error() {
    let (base, _seen) = spawn_fake().await;
    let client = client_for(&base, Some("test-key"));
    let err = client.movie_details(7).await.unwrap_err();
    assert!(matches!(err, TmdbError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let (base, seen) = spawn_fake().await;
    let client = client_for(&base, None);
    assert_eq!(
        client.popular_movies(1).await.unwrap_err(),
        TmdbError::MissingCredential
    );
    assert_eq!(
        client.search_movies("dune", 1).await.unwrap_err(),
        TmdbError::MissingCredential
    );
    assert!(seen.lock().unwrap().is_empty());
}
