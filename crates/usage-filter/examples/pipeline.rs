use serde_json::json;
use usage_filter::{FilterRegistry, Message, Payload, Settings, UsageFilter};

// ============================================================================
// Pipeline demo - register the filter and run one inlet/outlet pair
// ============================================================================

fn main() {
    let api_endpoint = std::env::var("API_ENDPOINT").unwrap_or_default();
    if api_endpoint.is_empty() {
        eprintln!("Set API_ENDPOINT to your accounting service, e.g. http://localhost:2811");
        std::process::exit(1);
    }

    let mut registry = FilterRegistry::new();
    registry.register(Box::new(UsageFilter::new(Settings::with_endpoint(
        api_endpoint,
    ))));
    eprintln!("Registered filters: {:?}", registry.names());

    let user = json!({"id": "demo-user", "name": "demo"});
    let payload = Payload::new("gpt-4o", vec![Message::user("Say hello in three languages.")]);

    let payload = match registry.run_inlet(payload, &user) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("inlet failed: {}", err);
            std::process::exit(1);
        }
    };
    eprintln!("input tokens: {:?}", payload.input_tokens);

    // Stand-in for the chat backend's reply.
    let mut payload = payload;
    payload
        .messages
        .push(Message::assistant("Hello! Bonjour! Hallo!"));

    match registry.run_outlet(payload, &user) {
        Ok(payload) => {
            let last = payload.messages.last().unwrap();
            println!("{}", serde_json::to_string_pretty(&last).unwrap());
        }
        Err(err) => {
            eprintln!("outlet failed: {}", err);
            std::process::exit(1);
        }
    }
}
