//! Form input demonstration.
//!
//! This example walks a signup request through the accessor:
//! 1. Build an `http::Request` with a query string, cookies and a form body
//! 2. Extract a `RequestInput` at the web boundary
//! 3. Read fields with type suffixes and filter chains
//! 4. Watch rejected values fall back to defaults
//!
//! Run with: `cargo run --example form_input`

use request_input::web::{ExtractRequestInput, RequestAdapter};
use request_input::{FilterRegistry, InputConfig, Resolver, Source};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_target(false)
        .init();

    println!("=== Form Input Example ===\n");

    let request = http::Request::post("/signup?ref=newsletter&page=2")
        .header("content-type", "application/x-www-form-urlencoded")
        .header("cookie", "theme=dark; remember=yes")
        .header("user-agent", "demo-client/0.1")
        .body(
            "email=+Ann%40Example.com+&age=29years&site=not+a+url\
             &roles[]=editor&roles[]=OR&profile[city]=Oslo"
                .as_bytes()
                .to_vec(),
        );
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            eprintln!("could not build request: {}", err);
            return;
        }
    };

    let input = RequestAdapter::from_http_request(&request).extract_request_input();
    let config = InputConfig::from_env();
    let resolver = Resolver::new(config, FilterRegistry::with_defaults());
    let access = resolver.input(&input);

    // Scenario 1: Typed reads
    println!("--- Scenario 1: Type Suffixes ---");
    println!("get(\"page/d\")          = {}", access.get("page/d", 1, ""));
    println!("post(\"age/d\")          = {}", access.post("age/d", 0, ""));
    println!("cookie(\"remember/b\")   = {}", access.cookie("remember/b", false, "boolean"));

    // Scenario 2: Filter chains
    println!("\n--- Scenario 2: Filter Chains ---");
    println!(
        "param(\"email\", trim,strtolower,validate_email) = {}",
        access.param("email", "", "trim,strtolower,validate_email")
    );
    println!(
        "server(\"http_user_agent\", #^[a-z-]+/#)         = {}",
        access.server("http_user_agent", "unknown", "#^[a-z-]+/#")
    );

    // Scenario 3: Rejections fall back to defaults
    println!("\n--- Scenario 3: Defaults ---");
    println!("post(\"site\", validate_url) = {}", access.post("site", "-", "validate_url"));
    println!("post(\"age\", int)           = {}", access.post("age", "-", "int"));
    println!("get(\"missing\")             = {}", access.get("missing", "-", ""));
    if let Err(err) = access.try_from_source(Source::Body, "site", "validate_url") {
        println!("reason: {}", err);
    }

    // Scenario 4: Lists and maps
    println!("\n--- Scenario 4: Nested Values ---");
    println!("post(\"roles\")   = {}", access.post("roles", "", ""));
    println!("post(\"profile\") = {}", access.post("profile", "", "strtoupper"));
    println!("get(\"\")         = {}", access.get("", "", ""));

    println!("\n=== Example Complete ===");
}
