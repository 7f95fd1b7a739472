//! Blog commands.

use sofahub_storefront::api::ContentType;
use tracing::info;

use super::{CommandError, Shop};

/// List blog posts.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn list(
    shop: &Shop,
    search: Option<&str>,
    featured: bool,
    tags: Option<&str>,
) -> Result<(), CommandError> {
    let posts = shop
        .client
        .list_blog_posts(search, featured.then_some(true), tags)
        .await?;

    for post in &posts {
        let date = post
            .published_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let star = if post.is_featured { "*" } else { " " };
        info!("{star} {date:<10} {:<40} {}", post.slug, post.title);
    }
    Ok(())
}

/// Show a blog post.
///
/// # Errors
///
/// Returns an error for an unknown slug or a failed API request.
pub async fn show(shop: &Shop, slug: &str) -> Result<(), CommandError> {
    let post = shop.client.get_blog_post(slug).await?;

    info!("{}", post.title);
    info!("by {}", post.author.name);
    if !post.excerpt.is_empty() {
        info!("{}", post.excerpt);
    }
    match post.content_type {
        ContentType::Html => info!("(HTML content, {} bytes)", post.content.len()),
        ContentType::Text => info!("{}", post.content),
    }
    Ok(())
}

/// List blog tags.
///
/// # Errors
///
/// Returns an error if the API request fails.
pub async fn tags(shop: &Shop) -> Result<(), CommandError> {
    for tag in shop.client.list_blog_tags().await? {
        info!("  {:<24} {}", tag.slug, tag.name);
    }
    Ok(())
}
