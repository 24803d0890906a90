//! HAL response builders and sample documents.

use serde_json::{Value, json};

use crate::constants::HAL_JSON;
use crate::http::HttpResponse;

/// `200 OK` with `value` as an `application/hal+json` body.
pub fn hal(value: Value) -> HttpResponse {
    HttpResponse::new(200, value.to_string()).with_header("Content-Type", HAL_JSON)
}

/// `200 OK` with a plain text body.
pub fn text(body: &str) -> HttpResponse {
    HttpResponse::new(200, body).with_header("Content-Type", "text/plain")
}

/// A small API index modelled on a microblogging service.
///
/// Relations: `ht:users` (list), `ht:me` (templated), `ht:signup` (POST),
/// `ht:latest-posts` (same URI as `ht:posts`), and an embedded `ht:post`
/// array whose first entry has a `self` link.
pub fn hal_document() -> Value {
    json!({
        "_links": {
            "self": {"href": "/", "title": "Index"},
            "curies": [{"name": "ht", "href": "http://docs.example.com/rels/{rel}", "templated": true}],
            "ht:users": {"href": "/users"},
            "ht:posts": {"href": "/posts"},
            "ht:latest-posts": {"href": "/posts"},
            "ht:me": {"href": "/users/{name}", "templated": true},
            "ht:signup": {"href": "/signup", "method": "POST"},
        },
        "_embedded": {
            "ht:post": [
                {"_links": {"self": {"href": "/posts/1"}}, "content": "first"},
                {"content": "draft"},
            ],
        },
        "welcome": "Welcome to the example API",
        "hint_1": "Sign up first",
    })
}
