//! Router assembly

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::{limit::ConcurrencyLimitLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::handlers::{
    accounts, articles, authors, books, health, home, issues, journals, places, posts, search,
};
use crate::middleware::metrics::track_requests;
use crate::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        // Browse and search
        .route("/home", get(home::home))
        .route("/search", get(search::search))
        // Journals
        .route(
            "/journals",
            get(journals::list_journals).post(journals::create_journal),
        )
        .route(
            "/journals/{key}",
            get(journals::get_journal)
                .put(journals::update_journal)
                .delete(journals::delete_journal),
        )
        // Issues
        .route("/issues", get(issues::list_issues).post(issues::create_issue))
        .route(
            "/issues/{key}",
            get(issues::get_issue)
                .put(issues::update_issue)
                .delete(issues::delete_issue),
        )
        .route("/issues/{key}/articles", post(issues::create_article))
        // Articles
        .route("/articles", get(articles::list_articles))
        .route(
            "/articles/{key}",
            get(articles::get_article)
                .put(articles::update_article)
                .delete(articles::delete_article),
        )
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/{key}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Authors
        .route(
            "/authors",
            get(authors::list_authors).post(authors::create_author),
        )
        .route(
            "/authors/{key}",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // News posts
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        // Places
        .route(
            "/organizations",
            get(places::list_organizations).post(places::create_organization),
        )
        .route("/organizations/{id}", delete(places::delete_organization))
        .route("/cities", get(places::list_cities).post(places::create_city))
        .route("/cities/{id}", delete(places::delete_city))
        .route(
            "/counties",
            get(places::list_counties).post(places::create_county),
        )
        .route("/counties/{id}", delete(places::delete_county))
        // Accounts
        .route("/users", post(accounts::register))
        .route(
            "/profiles/{user_id}",
            get(accounts::get_profile).put(accounts::update_profile),
        )
        .route_layer(middleware::from_fn(track_requests));

    let timeout = state.config.request_timeout();
    let max_concurrent = state.config.server.max_concurrent_requests.max(1);

    Router::new()
        .nest("/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(timeout))
                .layer(ConcurrencyLimitLayer::new(max_concurrent)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use fuglelitt_common::{auth::USER_ID_HEADER, config::AppConfig, MemoryStore};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio_test::assert_ok;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::new(AppConfig::default(), Arc::new(MemoryStore::new()));
        create_router(state)
    }

    async fn send(app: &Router, method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = assert_ok!(app.clone().oneshot(request).await);
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Registers an editor and files one journal, issue and article
    async fn seed(app: &Router) -> (String, Value, Value, Value) {
        let (status, registered) = send(
            app,
            "POST",
            "/v1/users",
            None,
            Some(json!({"username": "redaktor", "first_name": "Kari", "last_name": "Berg"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let user_id = registered["user"]["id"].as_str().unwrap().to_string();

        let (status, journal) = send(
            app,
            "POST",
            "/v1/journals",
            None,
            Some(json!({"name": "Vår Fuglefauna", "editors": [user_id]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, issue) = send(
            app,
            "POST",
            "/v1/issues",
            Some(&user_id),
            Some(json!({"name": "Nr. 2", "date": "1998-05-01", "journal_id": journal["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, article) = send(
            app,
            "POST",
            &format!("/v1/issues/{}/articles", issue["slug"].as_str().unwrap()),
            Some(&user_id),
            Some(json!({
                "name": "Jaktfalk i Troms",
                "abstract": "Hekkefunn 1996-1997",
                "tags": ["Falco", "Rovfugl"],
                "images": [{"name": "Reir", "img": "files/articles/reir.jpg"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        (user_id, journal, issue, article)
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let app = app();
        let (status, body) = send(&app, "GET", "/v1/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, "GET", "/v1/ready", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"]["store"]["status"], "up");
    }

    #[tokio::test]
    async fn test_registration_creates_profile() {
        let app = app();
        let (user_id, _, _, _) = seed(&app).await;

        let (status, profile) = send(&app, "GET", &format!("/v1/profiles/{}", user_id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["first_name"], "Kari");

        let (status, update) = send(
            &app,
            "PUT",
            &format!("/v1/profiles/{}", user_id),
            None,
            Some(json!({"first_name": "Kari", "last_name": "Bergersen"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(update["names_changed"], true);
    }

    #[tokio::test]
    async fn test_lookup_by_slug_and_id() {
        let app = app();
        let (_, journal, _, article) = seed(&app).await;

        let slug = journal["slug"].as_str().unwrap();
        assert!(slug.starts_with("var-fuglefauna-"));

        let (status, by_slug) = send(&app, "GET", &format!("/v1/journals/{}", slug), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_slug["issues"].as_array().unwrap().len(), 1);
        assert_eq!(by_slug["articles"].as_array().unwrap().len(), 1);

        let id = article["id"].as_str().unwrap();
        let (status, by_id) = send(&app, "GET", &format!("/v1/articles/{}", id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_id["images"].as_array().unwrap().len(), 1);
        assert_eq!(by_id["issue"]["journal"]["name"], "Vår Fuglefauna");
    }

    #[tokio::test]
    async fn test_issue_requires_acting_editor() {
        let app = app();
        let (_, journal, _, _) = seed(&app).await;
        let form = json!({"name": "Nr. 3", "journal_id": journal["id"]});

        let (status, _) = send(&app, "POST", "/v1/issues", None, Some(form.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (_, outsider) = send(&app, "POST", "/v1/users", None, Some(json!({"username": "gjest"}))).await;
        let outsider = outsider["user"]["id"].as_str().unwrap().to_string();
        let (status, body) = send(&app, "POST", "/v1/issues", Some(&outsider), Some(form)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["details"]["journal_id"].is_array());
    }

    #[tokio::test]
    async fn test_invalid_form_returns_field_errors() {
        let app = app();
        let (status, body) = send(&app, "POST", "/v1/books", None, Some(json!({"name": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["details"]["name"].is_array());

        let (_, books) = send(&app, "GET", "/v1/books", None, None).await;
        assert_eq!(books["total"], 0);
        assert_eq!(books["num_pages"], 1);
    }

    #[tokio::test]
    async fn test_search_with_facets_and_links() {
        let app = app();
        seed(&app).await;
        for name in ["Rovfuglboka", "Fuglekassen"] {
            let (status, _) = send(
                &app,
                "POST",
                "/v1/books",
                None,
                Some(json!({"name": name, "date": "1998-01-01", "tags": ["Rovfugl"]})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, "GET", "/v1/search?q=falco", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["counts"]["articles"], 1);
        assert_eq!(body["counts"]["books"], 0);
        assert_eq!(body["links"]["remove"]["q"], "/v1/search");

        let (_, body) = send(&app, "GET", "/v1/search?years=1998&tags=Rovfugl", None, None).await;
        assert_eq!(body["counts"]["articles"], 1);
        assert_eq!(body["counts"]["books"], 2);
        assert_eq!(body["vocabulary"]["years"], json!([1998]));
        assert_eq!(body["links"]["remove"]["years"], "/v1/search?tags=Rovfugl");
        assert_eq!(
            body["links"]["add"]["tags"]["Falco"],
            "/v1/search?years=1998&tags=Rovfugl&tags=Falco"
        );

        let (_, body) = send(&app, "GET", "/v1/search?years=abc", None, None).await;
        assert_eq!(body["counts"]["articles"], 0);
        assert_eq!(body["counts"]["books"], 0);
    }

    #[tokio::test]
    async fn test_article_list_filter_is_case_sensitive() {
        let app = app();
        seed(&app).await;

        let (_, hits) = send(&app, "GET", "/v1/articles?name=Jaktfalk", None, None).await;
        assert_eq!(hits.as_array().unwrap().len(), 1);

        let (_, misses) = send(&app, "GET", "/v1/articles?name=jaktfalk", None, None).await;
        assert!(misses.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_journal_delete_cascades() {
        let app = app();
        let (_, journal, issue, article) = seed(&app).await;

        let (status, _) = send(&app, "DELETE", &format!("/v1/journals/{}", journal["id"].as_str().unwrap()), None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", &format!("/v1/issues/{}", issue["slug"].as_str().unwrap()), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "GET", &format!("/v1/articles/{}", article["slug"].as_str().unwrap()), None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_places_and_posts() {
        let app = app();
        let (status, county) = send(&app, "POST", "/v1/counties", None, Some(json!({"name": "Troms"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(
            &app,
            "POST",
            "/v1/organizations",
            None,
            Some(json!({"name": "Norsk Ornitologisk Forening", "county_id": county["id"]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, post) = send(
            &app,
            "POST",
            "/v1/posts",
            None,
            Some(json!({
                "name": "Ny utgave",
                "text": "Vår Fuglefauna 2/1998 er ute.",
                "author": "Redaksjonen"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, home) = send(&app, "GET", "/v1/home", None, None).await;
        assert_eq!(home["posts"][0]["id"], post["id"]);

        let (status, _) = send(&app, "DELETE", &format!("/v1/counties/{}", county["id"].as_str().unwrap()), None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, organizations) = send(&app, "GET", "/v1/organizations", None, None).await;
        assert_eq!(organizations[0]["county_id"], Value::Null);
    }

    #[tokio::test]
    async fn test_acting_user_header_must_be_uuid() {
        let app = app();
        let (status, _) = send(&app, "POST", "/v1/books", Some("admin"), Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/v1/journals?editable=true", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
