use askama::Template;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::{Post, PostType};
use crate::presentation::utils::AuthenticatedUser;

/// One rendered card per post. All fields are precomputed so the template
/// stays free of logic beyond conditionals.
#[derive(Template)]
#[template(path = "post_card.html")]
struct PostCardTemplate {
    post_id: Uuid,
    badge: &'static str,
    badge_class: &'static str,
    title: String,
    description: String,
    location: Option<String>,
    price_label: Option<String>,
    author_name: String,
    author_initial: String,
    date_label: String,
    can_favorite: bool,
    can_edit: bool,
}

#[derive(Template)]
#[template(path = "posts_empty.html")]
struct EmptyStateTemplate;

impl PostCardTemplate {
    fn from_post(post: &Post, viewer: Option<&AuthenticatedUser>) -> Self {
        let badge_class = match post.post_type {
            PostType::Job => "job",
            PostType::Deal => "deal",
        };
        let author_initial = post
            .posted_by_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_else(|| "?".to_string());
        let date_label = post
            .created_at
            .map(|ts| ts.format("%b %-d, %Y").to_string())
            .unwrap_or_default();

        Self {
            post_id: post.id,
            badge: post.post_type.label(),
            badge_class,
            title: post.title.clone(),
            description: post.description.clone(),
            location: post.location.clone().filter(|l| !l.is_empty()),
            price_label: post.price_label(),
            author_name: post.posted_by_name.clone(),
            author_initial,
            date_label,
            can_favorite: viewer.is_some(),
            can_edit: viewer.is_some_and(|v| v.id == post.posted_by),
        }
    }
}

/// Renders one HTML fragment per post, or a single empty-state fragment
/// when there is nothing to show. Post text is escaped by the template
/// engine, so user content never reaches the page as markup.
pub fn render_post_cards(
    posts: &[Post],
    viewer: Option<&AuthenticatedUser>,
) -> Result<Vec<String>, DomainError> {
    if posts.is_empty() {
        return Ok(vec![EmptyStateTemplate.render().map_err(render_error)?]);
    }
    posts
        .iter()
        .map(|post| {
            PostCardTemplate::from_post(post, viewer)
                .render()
                .map_err(render_error)
        })
        .collect()
}

fn render_error(err: askama::Error) -> DomainError {
    DomainError::Internal(format!("template rendering failed: {err}"))
}
