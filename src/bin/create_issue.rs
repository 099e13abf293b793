use std::env;

use labhook::config::Config;
use labhook::gitlab::client::{GitLabClient, PlatformClient};
use labhook::handlers::formatters::project_path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut args = env::args().skip(1);
    let (Some(project), Some(title)) = (args.next(), args.next()) else {
        eprintln!("usage: create_issue <project id or group/name> <title> [description]");
        std::process::exit(2);
    };
    let description = args.next().unwrap_or_default();

    let config = Config::from_env()?;
    if config.access_token.is_none() {
        eprintln!("GL_ACCESS_TOKEN is required to create issues");
        std::process::exit(2);
    }
    let gl = GitLabClient::from_config(&config)?;

    let issue = gl
        .post(
            &format!("/projects/{}/issues", project_path(&project)),
            &serde_json::json!({
                "title": title,
                "description": description,
            }),
        )
        .await?;

    println!(
        "✅ Created issue #{} {}",
        issue["iid"],
        issue["web_url"].as_str().unwrap_or("")
    );

    Ok(())
}
