//! Standalone utility that sends a local file to the vision model
//! This bypasses the HTTP server entirely and is meant for quick manual runs:
//! `cargo run --bin describe-image -- path/to/image.png "What is in this picture?"`

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gemini_gateway::config::Config;
use gemini_gateway::gemini::safety::default_safety_settings;
use gemini_gateway::gemini::types::Part;
use gemini_gateway::gemini::GenerativeModel;
use std::env;
use std::path::Path;

/// Map a file extension to the MIME types the gateway accepts
fn mime_type_for(path: &Path) -> Result<&'static str, String> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => Ok("image/png"),
        Some("jpg") | Some("jpeg") => Ok("image/jpeg"),
        Some("txt") => Ok("text/plain"),
        other => Err(format!(
            "Unsupported file extension {:?}; expected png, jpg, jpeg, or txt",
            other
        )),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut args = env::args().skip(1);
    let path = args
        .next()
        .ok_or("Usage: describe-image <file> [prompt]")?;
    let prompt = args
        .next()
        .unwrap_or_else(|| "What is going on in this picture?".to_string());

    let path = Path::new(&path);
    let mime_type = mime_type_for(path)?;
    let bytes = std::fs::read(path)?;

    let config = Config::from_env()?;
    let model = GenerativeModel::new(
        reqwest::Client::new(),
        &config.gemini.api_key,
        &config.gemini.vision_model,
        &config.gemini.api_base_url,
        default_safety_settings(),
    );

    eprintln!(
        "Sending {} ({} bytes, {}) to {}...",
        path.display(),
        bytes.len(),
        mime_type,
        model.model_name()
    );

    let text = model
        .generate_content(vec![
            Part::text(prompt),
            Part::inline_data(BASE64.encode(&bytes), mime_type),
        ])
        .await?;

    println!("{}", text);
    Ok(())
}
