//! Async synchronization effects.
//!
//! Every mutation is followed by a full reload instead of an optimistic
//! local patch: the server mints marker ids, so re-deriving the canonical
//! collection sidesteps identity races entirely. State changes only on
//! confirmed success — a failed call leaves the collections untouched and
//! surfaces a notice.
//!
//! Each effect carries the [`FetchTag`] captured at dispatch and re-checks
//! it against the active user at resolution; stale results are dropped.

use dioxus::prelude::{Signal, WritableExt};
use shared_types::AddMarkerRequest;

use crate::api;
use crate::map::notify::{NoticeFeed, NoticeLevel};
use crate::map::state::{self, Composer, FetchTag, RemoteData};

pub async fn load_heat_points(
    tag: FetchTag,
    active_user: Signal<String>,
    mut data: Signal<RemoteData>,
    mut notices: Signal<NoticeFeed>,
) {
    match api::fetch_heat_points(tag.user()).await {
        Ok(points) => {
            let current = active_user();
            if !state::accept_heat_points(&tag, &current, &mut data.write(), points) {
                dioxus_logger::tracing::debug!("dropping stale heat points for {:?}", tag.user());
            }
        }
        Err(e) => {
            if !tag.still_current(&active_user()) {
                return;
            }
            dioxus_logger::tracing::warn!("heat point fetch failed: {}", e);
            notices
                .write()
                .push(NoticeLevel::Error, format!("Could not load heat points: {e}"));
        }
    }
}

pub async fn load_markers(
    tag: FetchTag,
    active_user: Signal<String>,
    mut data: Signal<RemoteData>,
    mut composer: Signal<Composer>,
    mut notices: Signal<NoticeFeed>,
) {
    match api::fetch_markers(tag.user()).await {
        Ok(markers) => {
            let current = active_user();
            if !state::accept_markers(
                &tag,
                &current,
                &mut data.write(),
                markers,
                &mut composer.write(),
            ) {
                dioxus_logger::tracing::debug!("dropping stale markers for {:?}", tag.user());
            }
        }
        Err(e) => {
            if !tag.still_current(&active_user()) {
                return;
            }
            dioxus_logger::tracing::warn!("marker fetch failed: {}", e);
            notices
                .write()
                .push(NoticeLevel::Error, format!("Could not load markers: {e}"));
        }
    }
}

/// Post the composed marker. On success the canonical collection is reloaded,
/// which also closes the composer; on failure the composer stays open so the
/// user can retry.
pub async fn submit_marker(
    tag: FetchTag,
    active_user: Signal<String>,
    lat: f64,
    lng: f64,
    label: String,
    data: Signal<RemoteData>,
    composer: Signal<Composer>,
    mut notices: Signal<NoticeFeed>,
) {
    let request = AddMarkerRequest {
        lat,
        lng,
        name: label.clone(),
        user_id: tag.user().to_string(),
    };

    match api::add_marker(&request).await {
        Ok(()) => {
            if !tag.still_current(&active_user()) {
                return;
            }
            notices.write().push(
                NoticeLevel::Info,
                format!("Added marker \"{label}\" for user \"{}\"", tag.user()),
            );
            load_markers(tag, active_user, data, composer, notices).await;
        }
        Err(e) => {
            if !tag.still_current(&active_user()) {
                return;
            }
            dioxus_logger::tracing::warn!("add marker failed: {}", e);
            notices
                .write()
                .push(NoticeLevel::Error, format!("Could not add marker: {e}"));
        }
    }
}

/// Delete by server-assigned id, then reload. On failure the marker stays
/// visible and the collections are untouched.
pub async fn delete_marker(
    tag: FetchTag,
    active_user: Signal<String>,
    id: String,
    data: Signal<RemoteData>,
    composer: Signal<Composer>,
    mut notices: Signal<NoticeFeed>,
) {
    match api::remove_marker(&id).await {
        Ok(()) => {
            if !tag.still_current(&active_user()) {
                return;
            }
            notices
                .write()
                .push(NoticeLevel::Info, "Removed marker".to_string());
            load_markers(tag, active_user, data, composer, notices).await;
        }
        Err(e) => {
            if !tag.still_current(&active_user()) {
                return;
            }
            dioxus_logger::tracing::warn!("remove marker failed: {}", e);
            notices
                .write()
                .push(NoticeLevel::Error, format!("Could not remove marker: {e}"));
        }
    }
}
