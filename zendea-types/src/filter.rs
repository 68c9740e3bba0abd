//! Pure search/filter/sort over an already-loaded post collection.
//!
//! `apply` is the single entry point: it never mutates its input, and two
//! calls with identical inputs produce identical output. Ties under every
//! sort key keep the original relative order (stable sort).

use serde::{Deserialize, Serialize};

use crate::post::{Post, PostStatus, PostType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
}

/// The search/filter/sort selections active for one request. Rebuilt from
/// the incoming parameters on every call and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: Option<PostType>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub max_price: Option<f64>,
    #[serde(default)]
    pub sort: SortKey,
}

impl FilterCriteria {
    pub fn for_category(category: PostType) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }
}

/// Produce the ordered subset of `posts` selected by `criteria`.
///
/// Posts whose status is not `Active` are always excluded. An empty query,
/// location, or price bound is a no-op for that dimension; all-empty
/// criteria return the full active set sorted newest-first.
pub fn apply(posts: &[Post], criteria: &FilterCriteria) -> Vec<Post> {
    let query = criteria.query.trim().to_lowercase();
    let location = criteria.location.trim().to_lowercase();

    let mut selected: Vec<Post> = posts
        .iter()
        .filter(|post| post.status == PostStatus::Active)
        .filter(|post| matches_category(post, criteria.category))
        .filter(|post| matches_query(post, &query))
        .filter(|post| matches_location(post, &location))
        .filter(|post| matches_price_bound(post, criteria.max_price))
        .cloned()
        .collect();

    sort_posts(&mut selected, criteria.sort);
    selected
}

fn matches_category(post: &Post, category: Option<PostType>) -> bool {
    match category {
        Some(wanted) => post.post_type == wanted,
        None => true,
    }
}

fn matches_query(post: &Post, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(query)
        || post.description.to_lowercase().contains(query)
        || post
            .location
            .as_deref()
            .is_some_and(|loc| loc.to_lowercase().contains(query))
}

fn matches_location(post: &Post, location: &str) -> bool {
    if location.is_empty() {
        return true;
    }
    post.location
        .as_deref()
        .is_some_and(|loc| loc.to_lowercase().contains(location))
}

fn matches_price_bound(post: &Post, max_price: Option<f64>) -> bool {
    match max_price {
        Some(bound) => effective_price(post) <= bound,
        None => true,
    }
}

fn sort_posts(posts: &mut [Post], sort: SortKey) {
    match sort {
        SortKey::Newest => posts.sort_by(|a, b| timestamp(b).cmp(&timestamp(a))),
        SortKey::Oldest => posts.sort_by(|a, b| timestamp(a).cmp(&timestamp(b))),
        SortKey::PriceLow => {
            posts.sort_by(|a, b| effective_price(a).total_cmp(&effective_price(b)))
        }
        SortKey::PriceHigh => {
            posts.sort_by(|a, b| effective_price(b).total_cmp(&effective_price(a)))
        }
    }
}

// Posts without a timestamp sort as oldest under either date key.
fn timestamp(post: &Post) -> i64 {
    post.created_at
        .map(|at| at.timestamp_millis())
        .unwrap_or(i64::MIN)
}

// Posts without a price sort (and bound-check) as zero.
fn effective_price(post: &Post) -> f64 {
    post.price.unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn at(seconds: i64) -> Option<DateTime<Utc>> {
        Some(Utc.timestamp_opt(seconds, 0).unwrap())
    }

    fn post(title: &str, post_type: PostType, price: Option<f64>, seconds: i64) -> Post {
        Post {
            id: Uuid::new_v4(),
            post_type,
            title: title.into(),
            description: format!("{title} description"),
            location: Some("Springfield".into()),
            price,
            price_unit: None,
            posted_by: Uuid::new_v4(),
            posted_by_name: "someone".into(),
            status: PostStatus::Active,
            created_at: at(seconds),
            updated_at: None,
        }
    }

    fn sample() -> Vec<Post> {
        vec![
            post("Dev A", PostType::Job, Some(100.0), 1),
            post("Sale B", PostType::Deal, Some(50.0), 2),
        ]
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(apply(&[], &FilterCriteria::default()).is_empty());
    }

    #[test]
    fn empty_criteria_is_a_permutation_sorted_newest_first() {
        let posts = sample();
        let result = apply(&posts, &FilterCriteria::default());

        assert_eq!(result.len(), posts.len());
        for original in &posts {
            assert!(result.iter().any(|p| p.id == original.id));
        }
        assert_eq!(result[0].title, "Sale B");
        assert_eq!(result[1].title, "Dev A");
    }

    #[test]
    fn category_filter_keeps_only_that_type() {
        let posts = sample();
        let result = apply(&posts, &FilterCriteria::for_category(PostType::Job));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Dev A");
        assert!(result.iter().all(|p| p.post_type == PostType::Job));
    }

    #[test]
    fn query_matches_case_insensitively() {
        let posts = sample();
        let criteria = FilterCriteria {
            query: "dev".into(),
            ..FilterCriteria::default()
        };
        let result = apply(&posts, &criteria);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Dev A");
    }

    #[test]
    fn query_matches_description_and_location() {
        let mut posts = sample();
        posts[1].location = Some("Remote Lisbon".into());

        let by_location = FilterCriteria {
            query: "lisbon".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&posts, &by_location).len(), 1);

        let by_description = FilterCriteria {
            query: "sale b descr".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(apply(&posts, &by_description)[0].title, "Sale B");
    }

    #[test]
    fn price_low_sorts_ascending() {
        let posts = sample();
        let criteria = FilterCriteria {
            sort: SortKey::PriceLow,
            ..FilterCriteria::default()
        };
        let result = apply(&posts, &criteria);

        assert_eq!(result[0].title, "Sale B");
        assert_eq!(result[1].title, "Dev A");
    }

    #[test]
    fn price_high_sorts_descending_and_missing_price_counts_as_zero() {
        let posts = vec![
            post("Free thing", PostType::Deal, None, 1),
            post("Pricey", PostType::Deal, Some(900.0), 2),
        ];
        let criteria = FilterCriteria {
            sort: SortKey::PriceHigh,
            ..FilterCriteria::default()
        };
        let result = apply(&posts, &criteria);

        assert_eq!(result[0].title, "Pricey");
        assert_eq!(result[1].title, "Free thing");
    }

    #[test]
    fn missing_timestamp_sorts_as_oldest() {
        let mut posts = sample();
        posts.push(post("Undated", PostType::Job, None, 0));
        posts[2].created_at = None;

        let newest = apply(&posts, &FilterCriteria::default());
        assert_eq!(newest.last().unwrap().title, "Undated");

        let criteria = FilterCriteria {
            sort: SortKey::Oldest,
            ..FilterCriteria::default()
        };
        let oldest = apply(&posts, &criteria);
        assert_eq!(oldest[0].title, "Undated");
    }

    #[test]
    fn ties_preserve_original_relative_order() {
        let mut posts = vec![
            post("First", PostType::Deal, Some(10.0), 5),
            post("Second", PostType::Deal, Some(10.0), 5),
            post("Third", PostType::Deal, Some(10.0), 5),
        ];
        posts[1].description = "unrelated".into();

        for sort in [
            SortKey::Newest,
            SortKey::Oldest,
            SortKey::PriceLow,
            SortKey::PriceHigh,
        ] {
            let criteria = FilterCriteria {
                sort,
                ..FilterCriteria::default()
            };
            let result = apply(&posts, &criteria);
            let titles: Vec<&str> = result.iter().map(|p| p.title.as_str()).collect();
            assert_eq!(titles, vec!["First", "Second", "Third"], "{sort:?}");
        }
    }

    #[test]
    fn reapplying_identical_criteria_reproduces_the_same_order() {
        let posts = sample();
        let criteria = FilterCriteria {
            sort: SortKey::PriceLow,
            ..FilterCriteria::default()
        };
        let once = apply(&posts, &criteria);
        let twice = apply(&once, &criteria);
        assert_eq!(once, twice);
    }

    #[test]
    fn input_is_not_mutated() {
        let posts = sample();
        let snapshot = posts.clone();
        let criteria = FilterCriteria {
            query: "dev".into(),
            sort: SortKey::PriceHigh,
            ..FilterCriteria::default()
        };
        let _ = apply(&posts, &criteria);
        assert_eq!(posts, snapshot);
    }

    #[test]
    fn removed_posts_never_surface() {
        let mut posts = sample();
        posts[0].status = PostStatus::Removed;

        let result = apply(&posts, &FilterCriteria::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Sale B");

        let by_category = apply(&posts, &FilterCriteria::for_category(PostType::Job));
        assert!(by_category.is_empty());
    }

    #[test]
    fn max_price_bound_includes_posts_without_a_price() {
        let posts = vec![
            post("Cheap", PostType::Deal, Some(20.0), 1),
            post("Expensive", PostType::Deal, Some(500.0), 2),
            post("Unpriced", PostType::Deal, None, 3),
        ];
        let criteria = FilterCriteria {
            max_price: Some(100.0),
            ..FilterCriteria::default()
        };
        let result = apply(&posts, &criteria);
        let titles: Vec<&str> = result.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Unpriced", "Cheap"]);
    }

    #[test]
    fn location_criterion_drops_posts_without_a_location() {
        let mut posts = sample();
        posts[0].location = None;

        let criteria = FilterCriteria {
            location: "spring".into(),
            ..FilterCriteria::default()
        };
        let result = apply(&posts, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Sale B");
    }

    #[test]
    fn sort_key_deserializes_kebab_case() {
        let key: SortKey = serde_json::from_str("\"price-low\"").unwrap();
        assert_eq!(key, SortKey::PriceLow);
        let key: SortKey = serde_json::from_str("\"newest\"").unwrap();
        assert_eq!(key, SortKey::Newest);
    }
}
