use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use super::{create_app, AppState};
use crate::collections::file_repository::FileCollectionRepository;
use crate::prompts::file_repository::FilePromptRepository;

fn test_app() -> (TempDir, Router) {
    let tmp = tempfile::tempdir().unwrap();
    let state = AppState {
        prompt_repo: Arc::new(FilePromptRepository::new(tmp.path())),
        collection_repo: Arc::new(FileCollectionRepository::new(tmp.path())),
    };
    (tmp, create_app(state, &[]))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_prompt(app: &Router, body: Value) -> Value {
    let (status, prompt) = send(app, "POST", "/prompts", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{prompt}");
    prompt
}

fn titles(list: &Value) -> Vec<&str> {
    list["prompts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (_tmp, app) = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_tag_lifecycle_scenario() {
    let (_tmp, app) = test_app();

    let prompt = create_prompt(
        &app,
        json!({"title": "T", "body": "B", "tags": ["Demo"]}),
    )
    .await;
    assert_eq!(prompt["tags"], json!(["demo"]));
    assert_eq!(prompt["content"], "B");
    let id = prompt["id"].as_str().unwrap();

    let (status, tags) = send(&app, "GET", "/tags", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tags, json!({"tags": ["demo"]}));

    let (status, updated) = send(&app, "DELETE", &format!("/prompts/{id}/tags/demo"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tags"], json!([]));

    let (_, tags) = send(&app, "GET", "/tags", None).await;
    assert_eq!(tags, json!({"tags": []}));
}

#[tokio::test]
async fn test_create_dedupes_tags() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(
        &app,
        json!({"title": "T", "content": "C", "tags": ["x", "x", " X "]}),
    )
    .await;
    assert_eq!(prompt["tags"], json!(["x"]));
}

#[tokio::test]
async fn test_create_rejects_blank_tag() {
    let (_tmp, app) = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/prompts",
        Some(json!({"title": "T", "content": "C", "tags": ["ok", "   "]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "tag");
}

#[tokio::test]
async fn test_create_missing_title_is_422() {
    let (_tmp, app) = test_app();
    let (status, body) = send(&app, "POST", "/prompts", Some(json!({"content": "C"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_create_blank_title_is_422() {
    let (_tmp, app) = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/prompts",
        Some(json!({"title": "  ", "content": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["field"], "title");
}

#[tokio::test]
async fn test_get_update_delete_prompt() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(&app, json!({"title": "Draft", "content": "Hello"})).await;
    let id = prompt["id"].as_str().unwrap();
    let uri = format!("/prompts/{id}");

    let (status, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, prompt);

    tokio::time::sleep(Duration::from_millis(5)).await;
    let (status, replaced) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({"title": "Final", "content": "Hello again", "tags": ["Greeting"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"], prompt["id"]);
    assert_eq!(replaced["created_at"], prompt["created_at"]);
    assert_ne!(replaced["updated_at"], prompt["updated_at"]);
    assert_eq!(replaced["title"], "Final");
    assert_eq!(replaced["tags"], json!(["greeting"]));

    tokio::time::sleep(Duration::from_millis(5)).await;
    let (status, patched) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({"description": "short"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["title"], "Final");
    assert_eq!(patched["description"], "short");
    assert_ne!(patched["updated_at"], replaced["updated_at"]);

    let (status, cleared) = send(&app, "PATCH", &uri, Some(json!({"description": null}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cleared.get("description").is_none_or(Value::is_null));

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_missing_prompt_is_404_everywhere() {
    let (_tmp, app) = test_app();
    let cases = [
        ("GET", "/prompts/nope", None),
        ("PUT", "/prompts/nope", Some(json!({"title": "T", "content": "C"}))),
        ("PATCH", "/prompts/nope", Some(json!({"title": "T"}))),
        ("DELETE", "/prompts/nope", None),
        ("GET", "/prompts/nope/variables", None),
        ("POST", "/prompts/nope/tags", Some(json!({"tag": "x"}))),
        ("DELETE", "/prompts/nope/tags/x", None),
    ];
    for (method, uri, body) in cases {
        let (status, error) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(error["error"], "not_found");
    }
}

#[tokio::test]
async fn test_add_tags_single_and_many() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(&app, json!({"title": "T", "content": "C"})).await;
    let uri = format!("/prompts/{}/tags", prompt["id"].as_str().unwrap());

    let (status, tagged) = send(&app, "POST", &uri, Some(json!({"tag": " Foo "}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tagged["tags"], json!(["foo"]));

    // Adding the same tag again changes nothing.
    let (status, again) = send(&app, "POST", &uri, Some(json!({"tag": "FOO"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["tags"], json!(["foo"]));
    assert_eq!(again["updated_at"], tagged["updated_at"]);

    let body = json!({"tags": ["bar", "foo", "Baz"]});
    let (status, many) = send(&app, "POST", &uri, Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(many["tags"], json!(["foo", "bar", "baz"]));
}

#[tokio::test]
async fn test_add_tag_validation() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(&app, json!({"title": "T", "content": "C"})).await;
    let uri = format!("/prompts/{}/tags", prompt["id"].as_str().unwrap());

    for body in [json!({"tag": ""}), json!({"tag": "   "}), json!({}), json!({"tags": []})] {
        let (status, error) = send(&app, "POST", &uri, Some(body.clone())).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        assert_eq!(error["error"], "validation_error");
        assert_eq!(error["field"], "tag");
    }
}

#[tokio::test]
async fn test_remove_absent_tag_is_404() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(&app, json!({"title": "T", "content": "C", "tags": ["a"]})).await;
    let id = prompt["id"].as_str().unwrap();

    let (status, error) = send(&app, "DELETE", &format!("/prompts/{id}/tags/b"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");

    let (status, updated) = send(&app, "DELETE", &format!("/prompts/{id}/tags/A"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tags"], json!([]));
}

#[tokio::test]
async fn test_list_tags_union() {
    let (_tmp, app) = test_app();
    create_prompt(&app, json!({"title": "One", "content": "C", "tags": ["a", "b"]})).await;
    create_prompt(&app, json!({"title": "Two", "content": "C", "tags": ["b", "c"]})).await;

    let (_, tags) = send(&app, "GET", "/tags", None).await;
    assert_eq!(tags, json!({"tags": ["a", "b", "c"]}));
}

#[tokio::test]
async fn test_filter_by_tag() {
    let (_tmp, app) = test_app();
    create_prompt(&app, json!({"title": "Tagged", "content": "C", "tags": ["foo"]})).await;
    create_prompt(&app, json!({"title": "Plain", "content": "C"})).await;

    let (status, list) = send(&app, "GET", "/prompts?tag=FOO", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&list), vec!["Tagged"]);
    assert_eq!(list["total"], 1);

    let (status, list) = send(&app, "GET", "/tags/Foo/prompts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&list), vec!["Tagged"]);

    let (status, list) = send(&app, "GET", "/prompts?tag=missing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 0);

    let (status, error) = send(&app, "GET", "/prompts?tag=%20%20", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["field"], "tag");
}

#[tokio::test]
async fn test_deleted_prompt_leaves_filters() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(&app, json!({"title": "Gone", "content": "C", "tags": ["t"]})).await;
    let id = prompt["id"].as_str().unwrap();

    send(&app, "DELETE", &format!("/prompts/{id}"), None).await;

    let (_, list) = send(&app, "GET", "/prompts", None).await;
    assert_eq!(list["total"], 0);
    let (_, list) = send(&app, "GET", "/tags/t/prompts", None).await;
    assert_eq!(list["total"], 0);
    let (_, tags) = send(&app, "GET", "/tags", None).await;
    assert_eq!(tags, json!({"tags": []}));
}

#[tokio::test]
async fn test_list_sorted_newest_first_by_default() {
    let (_tmp, app) = test_app();
    for title in ["first", "second", "third"] {
        create_prompt(&app, json!({"title": title, "content": "C"})).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let (_, list) = send(&app, "GET", "/prompts", None).await;
    assert_eq!(titles(&list), vec!["third", "second", "first"]);

    let (_, list) = send(&app, "GET", "/prompts?order=asc", None).await;
    assert_eq!(titles(&list), vec!["first", "second", "third"]);

    let (_, list) = send(&app, "GET", "/prompts?sort=title", None).await;
    assert_eq!(titles(&list), vec!["first", "second", "third"]);

    let (status, error) = send(&app, "GET", "/prompts?sort=popularity", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["field"], "sort");
}

#[tokio::test]
async fn test_search_prompts() {
    let (_tmp, app) = test_app();
    create_prompt(&app, json!({"title": "Code Review", "content": "Review this"})).await;
    create_prompt(&app, json!({"title": "Summary", "content": "Summarize the CODE"})).await;
    create_prompt(
        &app,
        json!({"title": "Other", "content": "Nothing", "description": "about code"}),
    )
    .await;
    create_prompt(&app, json!({"title": "Unrelated", "content": "Nothing"})).await;

    let (status, list) = send(&app, "GET", "/prompts?search=code", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 3);
}

#[tokio::test]
async fn test_search_is_literal_substring() {
    let (_tmp, app) = test_app();
    create_prompt(&app, json!({"title": "Review checklist", "content": "Nothing"})).await;
    create_prompt(&app, json!({"title": "Code Review", "content": "Nothing"})).await;

    let (status, list) = send(&app, "GET", "/prompts?search=%20review", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&list), vec!["Code Review"]);

    // An empty query is no filter at all.
    let (_, list) = send(&app, "GET", "/prompts?search=", None).await;
    assert_eq!(list["total"], 2);
}

#[tokio::test]
async fn test_overlong_tag_queries() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(&app, json!({"title": "T", "content": "C", "tags": ["a"]})).await;
    let id = prompt["id"].as_str().unwrap();
    let long = "x".repeat(crate::tags::MAX_TAG_LEN + 1);

    let (status, error) = send(&app, "DELETE", &format!("/prompts/{id}/tags/{long}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");

    let (status, list) = send(&app, "GET", &format!("/prompts?tag={long}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 0);

    let (status, list) = send(&app, "GET", &format!("/tags/{long}/prompts"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 0);

    let uri = format!("/prompts/{id}/tags");
    let (status, error) = send(&app, "POST", &uri, Some(json!({"tag": long}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["field"], "tag");
}

#[tokio::test]
async fn test_variables_endpoint() {
    let (_tmp, app) = test_app();
    let prompt = create_prompt(
        &app,
        json!({"title": "T", "content": "Hi {{name}}, see {{topic}} and {{name}}"}),
    )
    .await;
    let uri = format!("/prompts/{}/variables", prompt["id"].as_str().unwrap());

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"variables": ["name", "topic", "name"]}));
}

#[tokio::test]
async fn test_collections_crud_and_membership() {
    let (_tmp, app) = test_app();
    let (status, collection) = send(
        &app,
        "POST",
        "/collections",
        Some(json!({"name": "Work", "description": "Job prompts"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(collection["prompt_ids"], json!([]));
    let cid = collection["id"].as_str().unwrap();

    let member = create_prompt(
        &app,
        json!({"title": "In", "content": "C", "collection_id": cid}),
    )
    .await;
    create_prompt(&app, json!({"title": "Out", "content": "C"})).await;

    let (status, fetched) = send(&app, "GET", &format!("/collections/{cid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Work");
    assert_eq!(fetched["prompt_ids"], json!([member["id"]]));

    let (_, list) = send(&app, "GET", &format!("/prompts?collection_id={cid}"), None).await;
    assert_eq!(titles(&list), vec!["In"]);

    let (status, all) = send(&app, "GET", "/collections", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["total"], 1);
}

#[tokio::test]
async fn test_deleting_prompt_drops_it_from_collection() {
    let (_tmp, app) = test_app();
    let (_, collection) = send(&app, "POST", "/collections", Some(json!({"name": "C"}))).await;
    let cid = collection["id"].as_str().unwrap();
    let body = json!({"title": "T", "content": "C", "collection_id": cid});
    let prompt = create_prompt(&app, body).await;

    send(&app, "DELETE", &format!("/prompts/{}", prompt["id"].as_str().unwrap()), None).await;

    let (status, fetched) = send(&app, "GET", &format!("/collections/{cid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["prompt_ids"], json!([]));
}

#[tokio::test]
async fn test_deleting_collection_orphans_prompts() {
    let (_tmp, app) = test_app();
    let (_, collection) = send(&app, "POST", "/collections", Some(json!({"name": "C"}))).await;
    let cid = collection["id"].as_str().unwrap();
    let body = json!({"title": "T", "content": "C", "collection_id": cid});
    let prompt = create_prompt(&app, body).await;
    let pid = prompt["id"].as_str().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/collections/{cid}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/collections/{cid}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, orphan) = send(&app, "GET", &format!("/prompts/{pid}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(orphan.get("collection_id").is_none_or(Value::is_null));

    let (status, _) = send(&app, "DELETE", &format!("/collections/{cid}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_collection_is_422() {
    let (_tmp, app) = test_app();
    let (status, error) = send(
        &app,
        "POST",
        "/prompts",
        Some(json!({"title": "T", "content": "C", "collection_id": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["field"], "collection_id");

    let prompt = create_prompt(&app, json!({"title": "T", "content": "C"})).await;
    let (status, error) = send(
        &app,
        "PATCH",
        &format!("/prompts/{}", prompt["id"].as_str().unwrap()),
        Some(json!({"collection_id": "missing"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["field"], "collection_id");
}

#[tokio::test]
async fn test_collection_name_required() {
    let (_tmp, app) = test_app();
    let (status, error) = send(&app, "POST", "/collections", Some(json!({"name": " "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["field"], "name");
}

#[tokio::test]
async fn test_unknown_route_is_404_json() {
    let (_tmp, app) = test_app();
    let (status, error) = send(&app, "GET", "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["error"], "not_found");
    assert!(error["message"].as_str().unwrap().contains("/nowhere"));
}

#[tokio::test]
async fn test_trailing_slash_redirects() {
    let (_tmp, app) = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/prompts/?tag=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
    assert_eq!(response.headers()["location"], "/prompts?tag=x");
}

#[tokio::test]
async fn test_prompts_survive_reload() {
    let (tmp, app) = test_app();
    let prompt = create_prompt(&app, json!({"title": "Kept", "content": "C", "tags": ["a"]})).await;

    let repo = FilePromptRepository::new(tmp.path());
    crate::prompts::repository::PromptRepository::load_all(&repo)
        .await
        .unwrap();
    let reloaded = crate::prompts::repository::PromptRepository::get(
        &repo,
        prompt["id"].as_str().unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(reloaded.title, "Kept");
    assert_eq!(reloaded.tags, vec!["a"]);
}
