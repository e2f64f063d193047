//! Landing page.
//!
//! Anonymous visitors get the login view. Signed-in users without a stored
//! token get the welcome view; everyone else sees their first project page.

use actix_web::{get, web};
use tracing::warn;

use crate::inbound::http::error::PageResult;
use crate::inbound::http::projects::{PAGE_SIZE, next_cursor, stored_token};
use crate::inbound::http::session::CurrentUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::views;

#[get("/")]
pub async fn home(state: web::Data<HttpState>, current: CurrentUser) -> PageResult {
    let Some(user) = current.into_user() else {
        return views::respond(views::login(None));
    };
    let Some(token) = stored_token(&state, &user).await else {
        return views::respond(views::welcome(&user));
    };
    match state.catalogue.list_projects(&token, PAGE_SIZE, None).await {
        Ok(page) => views::respond(views::projects(&user, &page, next_cursor(&page), None)),
        Err(err) => {
            warn!(user_id = %user.id(), error = %err, "project listing failed on landing page");
            views::respond(views::login(Some(&user)))
        }
    }
}
