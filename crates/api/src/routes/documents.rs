use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, Utc};
use doclab_core::access;
use doclab_core::auth::{User, Viewer};
use doclab_core::document::id::DocumentRef;
use doclab_core::document::model::DocumentSummary;
use doclab_core::document::section::Content;
use doclab_core::document::sections::ensure_unique_ids;
use doclab_core::editor::DEFAULT_SECTION_TITLE;
use doclab_core::ports::{ListFilter, OrderBy};
use doclab_core::reader::{Navigator, SectionView};
use doclab_core::uploads::{UploadKind, UploadedImage};
use doclab_core::views::PageLoad;
use doclab_core::{Document, DocumentKind, Section, Status, Visibility};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{CurrentViewer, RequireUser};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/documents", get(list_documents).post(create_document))
        .route(
            "/v1/documents/{id}",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/v1/documents/{id}/cover", post(upload_cover))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    kind: Option<DocumentKind>,
    creator: Option<Uuid>,
    #[serde(default)]
    mine: bool,
    order: Option<OrderBy>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    section: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    id: Option<String>,
    title: String,
    #[serde(default)]
    content: String,
}

/// Create/update body. Sections are taken in the order given.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    kind: Option<DocumentKind>,
    title: String,
    authors: Option<Vec<String>>,
    #[serde(default)]
    sections: Vec<SectionInput>,
    status: Option<Status>,
    visibility: Option<Visibility>,
    image_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionOutline {
    id: String,
    order: u32,
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadResponse {
    id: Option<Uuid>,
    kind: DocumentKind,
    slug: Option<String>,
    title: String,
    authors: Vec<String>,
    status: Status,
    visibility: Visibility,
    image_url: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    view_count: i64,
    can_edit: bool,
    sections: Vec<SectionOutline>,
    view: SectionView,
}

impl ReadResponse {
    fn new(doc: &Document, viewer: &Viewer, view: SectionView) -> Self {
        Self {
            id: doc.id,
            kind: doc.kind,
            slug: doc.slug.clone(),
            title: doc.title.clone(),
            authors: doc.authors.clone(),
            status: doc.status,
            visibility: doc.visibility,
            image_url: doc.image_url.clone(),
            last_updated: doc.last_updated,
            view_count: doc.view_count,
            can_edit: access::can_edit(doc, viewer),
            sections: doc
                .sections
                .iter()
                .map(|s| SectionOutline {
                    id: s.id.clone(),
                    order: s.order,
                    title: s.title.clone(),
                })
                .collect(),
            view,
        }
    }
}

/// Sections in request order. Blank or repeated ids get a fresh one.
fn sections_from_input(kind: DocumentKind, input: Vec<SectionInput>) -> Vec<Section> {
    let mut sections: Vec<Section> = input
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let content = if s.content.trim().is_empty() {
                Content::placeholder(kind)
            } else {
                Content::for_kind(kind, s.content)
            };
            let mut section = Section::create(s.title, content, i as u32 + 1);
            if let Some(id) = s.id {
                section.id = id;
            }
            section
        })
        .collect();
    ensure_unique_ids(&mut sections);
    sections
}

/// Overwrite `doc` with the submitted fields. Omitted optionals keep their value.
fn apply_input(doc: &mut Document, input: DocumentInput) {
    doc.set_title(input.title);
    if let Some(authors) = input.authors {
        doc.set_authors(authors);
    }
    doc.sections = sections_from_input(doc.kind, input.sections);
    if doc.sections.is_empty() {
        doc.add_section(DEFAULT_SECTION_TITLE);
    }
    if let Some(status) = input.status {
        doc.set_status(status);
    }
    if let Some(visibility) = input.visibility {
        doc.set_visibility(visibility);
    }
    if input.image_url.is_some() {
        doc.set_image_url(input.image_url);
    }
}

pub(crate) fn content_type(headers: &HeaderMap) -> ApiResult<&str> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Content-Type header is required".to_string()))
}

/// Browse listed documents, or the caller's own with `mine=true`.
async fn list_documents(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<DocumentSummary>>> {
    let filter = if query.mine {
        let user = viewer.user().ok_or(ApiError::Unauthorized)?;
        ListFilter::owned_by(user.id, query.kind)
    } else {
        ListFilter {
            creator_id: query.creator,
            ..ListFilter::browse(query.kind)
        }
    };
    let documents = state
        .repository()
        .list(&filter, query.order.unwrap_or_default())
        .await?;
    Ok(Json(documents))
}

/// Read one document at the selected section, counting the view.
async fn get_document(
    State(state): State<AppState>,
    CurrentViewer(viewer): CurrentViewer,
    Path(id_or_slug): Path<String>,
    Query(query): Query<ReadQuery>,
) -> ApiResult<Json<ReadResponse>> {
    let reference = DocumentRef::parse(&id_or_slug);
    let mut doc = state.repository().load(&reference, &viewer).await?;

    let load = PageLoad::new();
    match state.views().record(&load, &doc).await {
        Ok(Some(count)) => doc.view_count = count,
        Ok(None) => {}
        Err(err) => tracing::warn!(document_id = ?doc.id, "view count failed: {err}"),
    }

    let view = Navigator::open(&doc, query.section.as_deref()).render();
    Ok(Json(ReadResponse::new(&doc, &viewer, view)))
}

async fn create_document(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    WithRejection(Json(input), _): WithRejection<Json<DocumentInput>, ApiError>,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let kind = input
        .kind
        .ok_or_else(|| ApiError::BadRequest("kind is required".to_string()))?;
    let authors = default_authors(&user);
    let mut doc = Document::new(kind, "", authors);
    apply_input(&mut doc, input);

    state.repository().save(&mut doc, &user).await?;
    Ok((StatusCode::CREATED, Json(doc)))
}

fn default_authors(user: &User) -> Vec<String> {
    user.default_author().into_iter().collect()
}

async fn update_document(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
    WithRejection(Json(input), _): WithRejection<Json<DocumentInput>, ApiError>,
) -> ApiResult<Json<Document>> {
    let mut doc = state
        .repository()
        .load_for_edit(&DocumentRef::Id(id), &user)
        .await?;
    if input.kind.is_some_and(|kind| kind != doc.kind) {
        return Err(ApiError::BadRequest("document kind cannot change".to_string()));
    }
    apply_input(&mut doc, input);

    state.repository().save(&mut doc, &user).await?;
    Ok(Json(doc))
}

async fn delete_document(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.repository().delete(id, &user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a cover image and store its URL on the document.
async fn upload_cover(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<UploadedImage>> {
    let content_type = content_type(&headers)?;
    let mut doc = state
        .repository()
        .load_for_edit(&DocumentRef::Id(id), &user)
        .await?;
    let image = state
        .uploader()
        .upload(UploadKind::Cover, &user, body.to_vec(), content_type)
        .await?;
    doc.set_image_url(Some(image.url.clone()));
    state.repository().save(&mut doc, &user).await?;
    Ok(Json(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::token_for;
    use crate::routes::build_router;
    use crate::state::testing::memory_state;
    use axum::body::Body;
    use axum::http::{header::AUTHORIZATION, Method, Request};
    use doclab_core::ports::DocumentStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct Client {
        app: Router,
    }

    impl Client {
        fn new(state: AppState) -> Self {
            Self {
                app: build_router(state),
            }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let body = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, body)
        }

        async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
            let mut builder = Request::builder()
                .method(method)
                .uri(uri)
                .header(CONTENT_TYPE, "application/json");
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            self.send(builder.body(Body::from(body.to_string())).unwrap())
                .await
        }

        async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
            let mut builder = Request::builder().uri(uri);
            if let Some(token) = token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
            self.send(builder.body(Body::empty()).unwrap()).await
        }
    }

    fn signed_in() -> (User, String) {
        let user = User::new(Uuid::new_v4(), Some("ada@example.com".into()));
        let token = token_for(&user, "test-secret");
        (user, token)
    }

    fn codelab_body(status: &str) -> Value {
        json!({
            "kind": "codelab",
            "title": "Rust 101",
            "authors": ["Ada"],
            "status": status,
            "sections": [
                { "title": "Overview", "content": "<p>Hello</p>" },
                { "title": "Setup", "content": "<p>cargo new</p>" },
                { "title": "Done", "content": "<p>Bye</p>" }
            ]
        })
    }

    #[tokio::test]
    async fn create_requires_auth() {
        let (state, store, _) = memory_state();
        let client = Client::new(state);
        let (status, body) = client
            .json(Method::POST, "/v1/documents", None, codelab_body("draft"))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "unauthorized");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn create_then_read_by_slug_with_section_selector() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();

        let (status, created) = client
            .json(Method::POST, "/v1/documents", Some(&token), codelab_body("published"))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let slug = created["slug"].as_str().unwrap().to_string();
        let second = created["sections"][1]["id"].as_str().unwrap().to_string();
        assert_eq!(created["sections"][2]["order"], 3);

        let (status, read) = client
            .get(&format!("/v1/documents/{slug}?section={second}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(read["view"]["state"], "section");
        assert_eq!(read["view"]["title"], "Setup");
        assert_eq!(read["view"]["position"], 2);
        assert!(read["view"]["header"].is_null());
        assert_eq!(read["viewCount"], 1);
        assert_eq!(read["canEdit"], false);

        let (_, first) = client.get(&format!("/v1/documents/{slug}"), None).await;
        assert_eq!(first["view"]["header"]["title"], "Rust 101");
        assert_eq!(first["viewCount"], 2);
    }

    #[tokio::test]
    async fn drafts_are_not_counted() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();
        let (_, created) = client
            .json(Method::POST, "/v1/documents", Some(&token), codelab_body("draft"))
            .await;
        let id = created["id"].as_str().unwrap();

        let (_, read) = client.get(&format!("/v1/documents/{id}"), Some(&token)).await;
        assert_eq!(read["viewCount"], 0);
        assert_eq!(read["canEdit"], true);
    }

    #[tokio::test]
    async fn validation_failure_is_reported_by_field() {
        let (state, store, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();
        let mut body = codelab_body("draft");
        body["sections"][1]["title"] = json!("  ");

        let (status, err) = client
            .json(Method::POST, "/v1/documents", Some(&token), body)
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err["error"]["field"], "sections");
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn repeated_section_ids_stay_selectable() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();
        let body = json!({
            "kind": "codelab",
            "title": "Twins",
            "authors": ["Ada"],
            "status": "published",
            "sections": [
                { "id": "dup", "title": "One" },
                { "id": "dup", "title": "Two" }
            ]
        });

        let (status, created) = client
            .json(Method::POST, "/v1/documents", Some(&token), body)
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["sections"][0]["id"], "dup");
        let second = created["sections"][1]["id"].as_str().unwrap().to_string();
        assert_ne!(second, "dup");

        let id = created["id"].as_str().unwrap();
        let (_, read) = client
            .get(&format!("/v1/documents/{id}?section={second}"), None)
            .await;
        assert_eq!(read["view"]["title"], "Two");
    }

    #[tokio::test]
    async fn malformed_body_uses_error_envelope() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();

        let request = Request::builder()
            .method(Method::POST)
            .uri("/v1/documents")
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from("{\"kind\": \"blog\","))
            .unwrap();
        let (status, err) = client.send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"]["type"], "badRequest");
        assert_eq!(err["error"]["statusCode"], 400);

        let (status, err) = client
            .json(Method::POST, "/v1/documents", Some(&token), json!({ "kind": "blog" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["error"]["type"], "badRequest");
    }

    #[tokio::test]
    async fn authors_default_to_caller_name() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();
        let (status, created) = client
            .json(
                Method::POST,
                "/v1/documents",
                Some(&token),
                json!({ "kind": "blog", "title": "Notes" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["authors"], json!(["ada"]));
        assert_eq!(created["sections"].as_array().unwrap().len(), 1);
        assert_eq!(created["sections"][0]["content"]["body"], "[]");
    }

    #[tokio::test]
    async fn only_owner_updates_and_others_see_not_found() {
        let (state, store, _) = memory_state();
        let client = Client::new(state);
        let (_, owner) = signed_in();
        let (_, stranger) = signed_in();
        let (_, created) = client
            .json(Method::POST, "/v1/documents", Some(&owner), codelab_body("published"))
            .await;
        let id = created["id"].as_str().unwrap().to_string();
        let uri = format!("/v1/documents/{id}");

        let mut edit = codelab_body("published");
        edit["title"] = json!("Hijacked");
        let (status, err) = client.json(Method::PUT, &uri, Some(&stranger), edit.clone()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["error"]["type"], "notFound");

        edit["title"] = json!("Rust 102");
        let (status, updated) = client.json(Method::PUT, &uri, Some(&owner), edit).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Rust 102");

        let record = store
            .get(&DocumentRef::parse(&id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.title, "Rust 102");
    }

    #[tokio::test]
    async fn private_document_is_not_found_for_strangers() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, owner) = signed_in();
        let mut body = codelab_body("published");
        body["visibility"] = json!("private");
        let (_, created) = client
            .json(Method::POST, "/v1/documents", Some(&owner), body)
            .await;
        let uri = format!("/v1/documents/{}", created["id"].as_str().unwrap());

        assert_eq!(client.get(&uri, None).await.0, StatusCode::NOT_FOUND);
        assert_eq!(client.get(&uri, Some(&owner)).await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn listing_browse_and_mine() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();
        client
            .json(Method::POST, "/v1/documents", Some(&token), codelab_body("published"))
            .await;
        client
            .json(Method::POST, "/v1/documents", Some(&token), codelab_body("draft"))
            .await;

        let (_, browse) = client.get("/v1/documents?kind=codelab", None).await;
        assert_eq!(browse.as_array().unwrap().len(), 1);
        assert_eq!(browse[0]["sectionCount"], 3);

        let (_, blogs) = client.get("/v1/documents?kind=blog", None).await;
        assert!(blogs.as_array().unwrap().is_empty());

        let (_, mine) = client
            .get("/v1/documents?mine=true&order=title_asc", Some(&token))
            .await;
        assert_eq!(mine.as_array().unwrap().len(), 2);

        let (status, _) = client.get("/v1/documents?mine=true", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn delete_hides_document() {
        let (state, _, _) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();
        let (_, created) = client
            .json(Method::POST, "/v1/documents", Some(&token), codelab_body("published"))
            .await;
        let uri = format!("/v1/documents/{}", created["id"].as_str().unwrap());

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(&uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();
        assert_eq!(client.send(request).await.0, StatusCode::NO_CONTENT);

        assert_eq!(client.get(&uri, None).await.0, StatusCode::NOT_FOUND);
        let (_, browse) = client.get("/v1/documents", None).await;
        assert!(browse.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cover_upload_sets_image_url() {
        let (state, _, storage) = memory_state();
        let client = Client::new(state);
        let (_, token) = signed_in();
        let (_, created) = client
            .json(Method::POST, "/v1/documents", Some(&token), codelab_body("draft"))
            .await;
        let id = created["id"].as_str().unwrap().to_string();

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!("/v1/documents/{id}/cover"))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "image/png")
            .body(Body::from(vec![1u8, 2, 3]))
            .unwrap();
        let (status, image) = client.send(request).await;
        assert_eq!(status, StatusCode::OK);
        let path = image["path"].as_str().unwrap();
        assert!(path.starts_with("covers/"));
        assert!(storage.object(path).await.is_some());

        let (_, read) = client.get(&format!("/v1/documents/{id}"), Some(&token)).await;
        assert_eq!(read["imageUrl"], image["url"]);
    }
}
