//! Server-rendered HTML. Every user-supplied string goes through `escape`.

use std::fmt::Write as _;

use crate::db::{DbReview, ReviewPage};
use crate::error::ValidationError;
use crate::review::{ListCriteria, Rating, ReviewForm, SortOrder};
use crate::server::flash::Flash;

/// Which form is being rendered, and where it posts.
#[derive(Debug, Clone, Copy)]
pub enum FormMode {
    Add,
    Edit(i64),
}

impl FormMode {
    fn action(self) -> String {
        match self {
            FormMode::Add => "/add".to_string(),
            FormMode::Edit(id) => format!("/edit/{id}"),
        }
    }

    fn title(self) -> &'static str {
        match self {
            FormMode::Add => "Add a review",
            FormMode::Edit(_) => "Edit review",
        }
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(Rating::MAX));
    let empty = usize::from(Rating::MAX) - filled;
    format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
}

fn selected(cond: bool) -> &'static str {
    if cond { " selected" } else { "" }
}

pub fn index_page(listing: &ReviewPage, criteria: &ListCriteria, flash: Option<&Flash>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Movie reviews</h1>");
    let _ = writeln!(body, r#"<p><a href="/add">Add a review</a></p>"#);

    if let Some(flash) = flash {
        let _ = writeln!(
            body,
            r#"<div class="flash flash-{}">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message)
        );
    }

    push_filters(&mut body, criteria);
    push_stats(&mut body, listing);

    if listing.reviews.is_empty() {
        let _ = writeln!(body, r#"<p class="empty">No reviews found.</p>"#);
    } else {
        let _ = writeln!(body, r#"<ul class="reviews">"#);
        for review in &listing.reviews {
            push_review(&mut body, review);
        }
        let _ = writeln!(body, "</ul>");
    }

    push_pagination(&mut body, listing, criteria);
    layout("Movie reviews", &body)
}

fn push_filters(body: &mut String, criteria: &ListCriteria) {
    let filter = criteria.filter();
    let search = filter.search.as_deref().map(escape).unwrap_or_default();
    let min = filter.min_rating.map(|v| v.to_string()).unwrap_or_default();
    let max = filter.max_rating.map(|v| v.to_string()).unwrap_or_default();

    let _ = writeln!(
        body,
        r#"<form method="get" action="/" class="filters">
<input type="search" name="search" placeholder="Search by name" value="{search}">
<select name="sort">
<option value=""{newest}>Newest first</option>
<option value="high"{high}>Highest rating</option>
<option value="low"{low}>Lowest rating</option>
</select>
<input type="number" name="min_rating" min="1" max="5" placeholder="Min" value="{min}">
<input type="number" name="max_rating" min="1" max="5" placeholder="Max" value="{max}">
<button type="submit">Apply</button>
</form>"#,
        newest = selected(criteria.sort == SortOrder::Newest),
        high = selected(criteria.sort == SortOrder::RatingHigh),
        low = selected(criteria.sort == SortOrder::RatingLow),
    );
}

fn push_stats(body: &mut String, listing: &ReviewPage) {
    let stats = &listing.stats;
    let highest = match &stats.highest_rated {
        Some(r) => format!("{} ({}/5)", escape(&r.name), r.rating),
        None => "-".to_string(),
    };
    let _ = writeln!(
        body,
        r#"<section class="stats">
<p>Total reviews: <span class="total">{}</span></p>
<p>Average rating: <span class="average">{:.2}</span></p>
<p>Highest rated: <span class="highest">{}</span></p>
</section>"#,
        stats.total, stats.average_rating, highest
    );
}

fn push_review(body: &mut String, review: &DbReview) {
    let _ = writeln!(
        body,
        r#"<li class="review">
<h2>{name}</h2>
<p class="rating" title="{rating}/5">{stars}</p>
<p>{text}</p>
<p class="meta">Added {created}</p>
<a href="/edit/{id}">Edit</a>
<form method="post" action="/delete/{id}"><button type="submit">Delete</button></form>
</li>"#,
        id = review.id,
        name = escape(&review.name),
        rating = review.rating,
        stars = stars(review.rating),
        text = escape(&review.review),
        created = review.created_at.format("%Y-%m-%d %H:%M"),
    );
}

fn push_pagination(body: &mut String, listing: &ReviewPage, criteria: &ListCriteria) {
    let total_pages = listing.stats.total_pages;
    if total_pages <= 1 {
        return;
    }
    let page = listing.page;
    let _ = write!(body, r#"<nav class="pagination">"#);
    if page > 1 {
        let _ = write!(
            body,
            r#"<a href="/{}">Previous</a> "#,
            escape(&criteria.to_query_string(page - 1))
        );
    }
    let _ = write!(body, "Page {page} of {total_pages}");
    if u64::from(page) < total_pages {
        let _ = write!(
            body,
            r#" <a href="/{}">Next</a>"#,
            escape(&criteria.to_query_string(page + 1))
        );
    }
    let _ = writeln!(body, "</nav>");
}

pub fn review_form_page(
    mode: FormMode,
    form: &ReviewForm,
    error: Option<&ValidationError>,
) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{}</h1>", mode.title());
    if let Some(err) = error {
        let _ = writeln!(
            body,
            r#"<p class="error" data-code="{}">{}</p>"#,
            err.code(),
            escape(&err.to_string())
        );
    }

    let rating = form.rating.trim();
    let mut options = String::new();
    for value in Rating::MIN..=Rating::MAX {
        let v = value.to_string();
        let _ = write!(
            options,
            r#"<option value="{v}"{}>{v}</option>"#,
            selected(rating == v)
        );
    }

    let _ = writeln!(
        body,
        r#"<form method="post" action="{action}">
<label>Movie name <input type="text" name="name" value="{name}"></label>
<label>Review <textarea name="review">{review}</textarea></label>
<label>Rating <select name="rating"><option value="">-</option>{options}</select></label>
<button type="submit">Save</button>
</form>
<p><a href="/">Back to list</a></p>"#,
        action = mode.action(),
        name = escape(&form.name),
        review = escape(&form.review),
    );

    layout(mode.title(), &body)
}
