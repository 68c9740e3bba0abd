use crate::domain::error::DomainError;
use crate::domain::user::User;
use crate::domain::{FilterCriteria, Post, PostType, PriceUnit, SortKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

// ======================= POSTS =======================

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub post_type: PostType,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub price_unit: Option<PriceUnit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub price: Option<f64>,
    pub price_unit: Option<PriceUnit>,
}

/// Raw search controls as they arrive on the query string. Empty strings
/// mean "no selection", the way browser filter dropdowns submit them.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: Option<String>,
}

impl TryFrom<ListPostsQuery> for FilterCriteria {
    type Error = DomainError;

    fn try_from(params: ListPostsQuery) -> Result<Self, Self::Error> {
        let category = match params.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some("job") => Some(PostType::Job),
            Some("deal") => Some(PostType::Deal),
            Some(other) => {
                return Err(DomainError::Validation(format!(
                    "unknown category: {other}"
                )));
            }
        };
        let sort = match params.sort.as_deref().map(str::trim) {
            None | Some("") => SortKey::default(),
            Some("newest") => SortKey::Newest,
            Some("oldest") => SortKey::Oldest,
            Some("price-low") => SortKey::PriceLow,
            Some("price-high") => SortKey::PriceHigh,
            Some(other) => {
                return Err(DomainError::Validation(format!("unknown sort key: {other}")));
            }
        };

        Ok(FilterCriteria {
            query: params.query.unwrap_or_default(),
            category,
            location: params.location.unwrap_or_default(),
            max_price: params.max_price,
            sort,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct PostsResponse {
    pub posts: Vec<Post>,
    pub total: usize,
}

// ======================= FAVORITES =======================

#[derive(Debug, Deserialize)]
pub struct SetFavoriteRequest {
    pub favorited: bool,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub post_id: Uuid,
    pub favorited: bool,
}

// ======================= INBOX =======================

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub recipient_email: String,
    pub subject: String,
    pub body: String,
}

// ======================= FEEDBACK =======================

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub subject: Option<String>,
    pub body: String,
    pub rating: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selections_produce_default_criteria() {
        let params = ListPostsQuery {
            query: Some(String::new()),
            category: Some(String::new()),
            location: None,
            max_price: None,
            sort: Some(String::new()),
        };
        let criteria = FilterCriteria::try_from(params).unwrap();
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn category_and_sort_parse_from_control_values() {
        let params = ListPostsQuery {
            category: Some("deal".into()),
            sort: Some("price-high".into()),
            ..ListPostsQuery::default()
        };
        let criteria = FilterCriteria::try_from(params).unwrap();
        assert_eq!(criteria.category, Some(PostType::Deal));
        assert_eq!(criteria.sort, SortKey::PriceHigh);
    }

    #[test]
    fn unknown_category_is_a_validation_error() {
        let params = ListPostsQuery {
            category: Some("car".into()),
            ..ListPostsQuery::default()
        };
        assert!(matches!(
            FilterCriteria::try_from(params),
            Err(DomainError::Validation(_))
        ));
    }
}
