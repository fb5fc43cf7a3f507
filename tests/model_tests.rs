use chrono::Utc;
use pulseboard::models::{Comment, Group, Post, TokenResponse, UpdatePostRequest};
use serde_json::Value;

// --- Wire Format Tests ---

#[test]
fn post_serializes_with_exact_wire_fields() {
    let post = Post {
        id: 1,
        author_id: 42,
        author: "alice".to_string(),
        text: "hello".to_string(),
        pub_date: Utc::now(),
        image: None,
        group: Some(3),
    };

    let value: Value = serde_json::to_value(&post).unwrap();
    let obj = value.as_object().unwrap();

    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["author", "group", "id", "image", "pub_date", "text"]);

    // The raw FK never crosses the wire; clients see the username.
    assert!(!obj.contains_key("author_id"));
    assert_eq!(value["author"], "alice");
    assert_eq!(value["group"], 3);
}

#[test]
fn comment_serializes_with_exact_wire_fields() {
    let comment = Comment {
        id: 7,
        author_id: 42,
        author: "alice".to_string(),
        text: "nice".to_string(),
        post: 1,
        created: Utc::now(),
    };

    let value: Value = serde_json::to_value(&comment).unwrap();
    let obj = value.as_object().unwrap();

    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["author", "created", "id", "post", "text"]);
    assert_eq!(value["post"], 1);
}

#[test]
fn group_serializes_with_exact_wire_fields() {
    let group = Group {
        id: 1,
        title: "Rustaceans".to_string(),
        slug: "rustaceans".to_string(),
        description: "ferris fan club".to_string(),
    };

    let value: Value = serde_json::to_value(&group).unwrap();
    let mut keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["description", "id", "slug", "title"]);
}

#[test]
fn update_post_request_omits_unset_fields() {
    let partial_update = UpdatePostRequest {
        text: Some("New text only".to_string()),
        image: None,
        group: None,
    };

    let json_output = serde_json::to_string(&partial_update).unwrap();
    assert!(json_output.contains(r#""text":"New text only""#));
    // None fields are omitted entirely, so COALESCE-style updates see NULLs.
    assert!(!json_output.contains("image"));
    assert!(!json_output.contains("group"));
}

#[test]
fn post_deserializes_ignoring_unknown_author_field() {
    // Clients cannot smuggle authorship through the body: the field is
    // skipped on the way in and `author` is overwritten by the join anyway.
    let incoming = r#"{
        "id": 1,
        "text": "hello",
        "author": "mallory",
        "pub_date": "2024-01-01T00:00:00Z",
        "image": null,
        "group": null,
        "author_id": 999
    }"#;

    let post: Post = serde_json::from_str(incoming).unwrap();
    assert_eq!(post.author_id, 0); // serde skip -> Default
}

#[test]
fn token_response_shape() {
    let issued = TokenResponse {
        token: "cafebabe".to_string(),
    };
    assert_eq!(
        serde_json::to_string(&issued).unwrap(),
        r#"{"token":"cafebabe"}"#
    );
}
