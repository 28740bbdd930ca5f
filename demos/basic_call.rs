//! Basic example demonstrating calls against a JSON REST service.
//!
//! This example shows how to:
//! - Configure a client once and reuse it
//! - Make GET requests and decode typed bodies
//! - Make POST requests with a JSON body
//! - Enable the response cache and route logs through `tracing`
//!
//! Run with: `cargo run --example basic_call`

use blackbeard::logger::TracingLogger;
use blackbeard::{Client, Error, Query};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
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
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("blackbeard=debug,basic_call=info")
        .init();

    let client = Client::builder()
        .base_path("https://jsonplaceholder.typicode.com")
        .timeout(Duration::from_secs(10))
        .cache()
        .logger(Arc::new(TracingLogger::new()))
        .build()?;

    println!("=== GET Request Example ===");
    let response = client.get("/posts/1", None).await?;
    let post: Post = response.json()?;

    println!("Post ID: {}", post.id);
    println!("Title: {}", post.title);
    println!("Request latency: {:?}", response.latency());
    println!("Status code: {}", response.status());
    println!();

    println!("=== Cached GET ===");
    let again = client.get("/posts/1", None).await?;
    println!("Served from cache: {}", again.from_cache());
    println!();

    println!("=== GET With Query ===");
    let response = client.get("/posts", Some(&Query::from([("userId", "1")]))).await?;
    let posts: Vec<Post> = response.json()?;
    println!("User 1 wrote {} posts", posts.len());
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let response = client.post("/posts", &new_post).await?;
    let created: Post = response.json()?;

    println!("Created post ID: {}", created.id);
    println!("Title: {}", created.title);
    println!("Content-Type: {:?}", response.header("content-type"));

    Ok(())
}
