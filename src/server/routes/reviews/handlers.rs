use crate::error::CinelogError;
use crate::review::{ListCriteria, ListQuery, ReviewForm};
use crate::server::flash::{self, Flash};
use crate::server::router::CinelogState;
use crate::server::views::{self, FormMode};
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::PrivateCookieJar;
use tracing::{debug, info};

/// GET /
pub async fn list_reviews_handler(
    State(state): State<CinelogState>,
    Query(query): Query<ListQuery>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, CinelogError> {
    let criteria = ListCriteria::from(query);
    let listing = state.db.list(criteria.clone()).await?;
    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        Html(views::index_page(&listing, &criteria, flash.as_ref())),
    ))
}

/// GET /add
pub async fn add_form_handler() -> Html<String> {
    Html(views::review_form_page(
        FormMode::Add,
        &ReviewForm::default(),
        None,
    ))
}

/// POST /add
pub async fn add_review_handler(
    State(state): State<CinelogState>,
    jar: PrivateCookieJar,
    Form(form): Form<ReviewForm>,
) -> Result<Response, CinelogError> {
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(err) => {
            debug!(code = err.code(), "add form rejected");
            return Ok(form_rejected(FormMode::Add, &form, &err));
        }
    };

    let review = state.db.create(draft).await?;
    info!(id = review.id, "review added via form");
    let jar = flash::push(jar, &Flash::success("Review added."), state.secure_cookie);
    Ok((jar, Redirect::to("/")).into_response())
}

/// GET /edit/{id}
///
/// Unknown ids go back to the listing without an error.
pub async fn edit_form_handler(
    State(state): State<CinelogState>,
    Path(id): Path<i64>,
) -> Result<Response, CinelogError> {
    let Some(review) = state.db.get(id).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let form = ReviewForm {
        name: review.name,
        review: review.review,
        rating: review.rating.to_string(),
    };
    Ok(Html(views::review_form_page(FormMode::Edit(id), &form, None)).into_response())
}

/// POST /edit/{id}
pub async fn edit_review_handler(
    State(state): State<CinelogState>,
    Path(id): Path<i64>,
    jar: PrivateCookieJar,
    Form(form): Form<ReviewForm>,
) -> Result<Response, CinelogError> {
    if state.db.get(id).await?.is_none() {
        return Ok(Redirect::to("/").into_response());
    }

    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(err) => {
            debug!(id, code = err.code(), "edit form rejected");
            return Ok(form_rejected(FormMode::Edit(id), &form, &err));
        }
    };

    match state.db.update(id, draft).await {
        Ok(review) => {
            info!(id = review.id, "review updated via form");
            let jar = flash::push(jar, &Flash::success("Review updated."), state.secure_cookie);
            Ok((jar, Redirect::to("/")).into_response())
        }
        // Deleted between the lookup and the update.
        Err(CinelogError::NotFound(_)) => Ok(Redirect::to("/").into_response()),
        Err(err) => Err(err),
    }
}

/// POST /delete/{id}
pub async fn delete_review_handler(
    State(state): State<CinelogState>,
    Path(id): Path<i64>,
    jar: PrivateCookieJar,
) -> Result<Response, CinelogError> {
    let removed = state.db.delete(id).await?;
    let flash = if removed {
        info!(id, "review deleted via form");
        Flash::success("Review deleted.")
    } else {
        Flash::info("Review was already deleted.")
    };
    let jar = flash::push(jar, &flash, state.secure_cookie);
    Ok((jar, Redirect::to("/")).into_response())
}

fn form_rejected(mode: FormMode, form: &ReviewForm, err: &crate::error::ValidationError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Html(views::review_form_page(mode, form, Some(err))),
    )
        .into_response()
}
