use reddit_client::{RedditClient, RedditClientConfig};
use wsb_core::{ContentSource, RedditCredentials};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Reddit API Manual Test ===\n");
    println!("📋 Setup Instructions:");
    println!("1. Go to https://www.reddit.com/prefs/apps");
    println!("2. Create a new app (type: 'script')");
    println!("3. Export REDDIT_CLIENT_ID, REDDIT_SECRET, REDDIT_USERNAME,");
    println!("   REDDIT_PASSWORD and USER_AGENT\n");

    let credentials = match RedditCredentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            println!("❌ {}", e);
            return Ok(());
        }
    };

    let subreddit = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "wallstreetbets".to_string());
    let config = RedditClientConfig::new(credentials)?.with_subreddit(subreddit.clone());
    let mut client = RedditClient::new(config)?;

    client.authenticate().await?;
    println!("✅ Authenticated\n");

    let posts = client.fetch_submissions(5).await?;
    println!("📰 {} newest posts from r/{}:", posts.len(), subreddit);
    for post in &posts {
        println!("   [{:>5}] {} ({} comments)", post.score, post.title, post.num_comments);
    }

    if let Some(first) = posts.first() {
        let comments = client.fetch_comments(first).await?;
        println!("\n💬 {} comments on \"{}\"", comments.len(), first.title);
        for comment in comments.iter().take(5) {
            println!("   - {}", comment.body.lines().next().unwrap_or_default());
        }
    }

    let status = client.get_rate_limit_status().await;
    println!(
        "\n📊 Requests this window: {} (server remaining: {:?})",
        status.current_window_requests, status.server_remaining
    );

    Ok(())
}
