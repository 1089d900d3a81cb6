//! Basic example demonstrating a staged GET and POST call.
//!
//! This example shows how to:
//! - Register a base URL and mark it as the process default
//! - Walk the builder stages from verb to terminal `send()`
//! - Parse success and error bodies independently
//!
//! Run with: `cargo run --example basic_call`

use basecall::Outcome;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("basecall=debug,basic_call=info")
        .init();

    // Register the JSONPlaceholder API once, at startup.
    basecall::register("placeholder", "https://jsonplaceholder.typicode.com");
    basecall::set_default("placeholder");

    println!("=== GET Request Example ===");
    let result = basecall::get()
        .use_default()
        .path("/posts/1")
        .json::<Post>()
        .error_text()
        .timeout(Duration::from_secs(10))
        .send()
        .await;

    match result {
        Ok(response) => match response.outcome {
            Outcome::Success(post) => {
                println!("Post ID: {}", post.id);
                println!("Title: {}", post.title);
                println!("Latency: {:?}", response.latency);
            }
            Outcome::Failure(body) => {
                println!("Server said {}: {}", response.status, body);
            }
        },
        Err(e) => println!("Request failed: {e}"),
    }
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let result = basecall::post()
        .use_default()
        .path("/posts")
        .body_json(&new_post)
        .json::<Post>()
        .error_text()
        .timeout(Duration::from_secs(10))
        .send()
        .await;

    match result {
        Ok(response) => {
            println!("Status: {}", response.status);
            if let Some(post) = response.data() {
                println!("Created post with ID: {}", post.id);
            }
        }
        Err(e) => println!("Request failed: {e}"),
    }
}
