//! Synchronization state: pure data and transitions, no RSX, no signals.
//!
//! `RemoteData` is always a full snapshot of the last successful fetch for
//! the active user — a fetch result replaces the prior collection wholesale,
//! there is no incremental merge. `Composer` is the pending-marker state
//! machine. `FetchTag` fences overlapping requests so a slow fetch dispatched
//! for one user can never overwrite another user's data.

use shared_types::{HeatPoint, MarkerPoint};

/// The two server-owned collections plus nothing else. Heat points and
/// markers are independent resources that happen to share a fetch trigger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RemoteData {
    pub heat_points: Vec<HeatPoint>,
    pub markers: Vec<MarkerPoint>,
}

/// Pending-marker composition.
///
/// `Idle` -> (map click) -> `Composing { label: "" }` -> (label edits) ->
/// `Composing` -> (submit ok / close) -> `Idle`. A submit failure stays in
/// `Composing` so the user can retry. Only one composition exists at a time:
/// a new click replaces the previous one without confirmation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Composer {
    #[default]
    Idle,
    Composing { lat: f64, lng: f64, label: String },
}

impl Composer {
    /// Start composing at the clicked location. Last click wins.
    pub fn begin(&mut self, lat: f64, lng: f64) {
        *self = Composer::Composing {
            lat,
            lng,
            label: String::new(),
        };
    }

    pub fn set_label(&mut self, value: impl Into<String>) {
        if let Composer::Composing { label, .. } = self {
            *label = value.into();
        }
    }

    /// Discard the pending marker, label included.
    pub fn close(&mut self) {
        *self = Composer::Idle;
    }

    pub fn is_composing(&self) -> bool {
        matches!(self, Composer::Composing { .. })
    }

    pub fn pending(&self) -> Option<(f64, f64, &str)> {
        match self {
            Composer::Idle => None,
            Composer::Composing { lat, lng, label } => Some((*lat, *lng, label.as_str())),
        }
    }
}

/// The active user id captured when a request is dispatched.
///
/// There is no cancellation: requests run to completion and their results are
/// checked against the active user at resolution time. A tag that no longer
/// matches means the result is stale and must be dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTag(String);

impl FetchTag {
    pub fn capture(active_user: &str) -> Self {
        Self(active_user.to_string())
    }

    pub fn user(&self) -> &str {
        &self.0
    }

    pub fn still_current(&self, active_user: &str) -> bool {
        self.0 == active_user
    }
}

/// Replace the heat-point collection with a fresh snapshot.
pub fn apply_heat_points(data: &mut RemoteData, points: Vec<HeatPoint>) {
    data.heat_points = points;
}

/// Replace the marker collection and cancel any in-flight composition —
/// a reload means either a mutation confirmed or the user switched scope,
/// and the pending popup is meaningless in both cases.
pub fn apply_markers(data: &mut RemoteData, markers: Vec<MarkerPoint>, composer: &mut Composer) {
    data.markers = markers;
    composer.close();
}

/// Apply a heat-point result only if its tag still matches the active user.
/// Returns false when the result is stale and was dropped without touching
/// state.
pub fn accept_heat_points(
    tag: &FetchTag,
    active_user: &str,
    data: &mut RemoteData,
    points: Vec<HeatPoint>,
) -> bool {
    if !tag.still_current(active_user) {
        return false;
    }
    apply_heat_points(data, points);
    true
}

/// Fenced counterpart of [`apply_markers`]: a stale result leaves both the
/// collection and the composer untouched.
pub fn accept_markers(
    tag: &FetchTag,
    active_user: &str,
    data: &mut RemoteData,
    markers: Vec<MarkerPoint>,
    composer: &mut Composer,
) -> bool {
    if !tag.still_current(active_user) {
        return false;
    }
    apply_markers(data, markers, composer);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str, lat: f64, lng: f64, name: &str) -> MarkerPoint {
        MarkerPoint {
            id: id.to_string(),
            lat,
            lng,
            name: name.to_string(),
        }
    }

    #[test]
    fn heat_points_are_replaced_wholesale() {
        let mut data = RemoteData {
            heat_points: vec![HeatPoint(9.0, 9.0, 9.0)],
            markers: vec![],
        };
        let snapshot = vec![HeatPoint(1.0, 2.0, 3.0), HeatPoint(4.0, 5.0, 6.0)];

        apply_heat_points(&mut data, snapshot.clone());

        // Exactly the payload, order preserved, nothing merged in.
        assert_eq!(data.heat_points, snapshot);
    }

    #[test]
    fn marker_reload_is_idempotent() {
        let mut data = RemoteData::default();
        let mut composer = Composer::default();
        let snapshot = vec![marker("m1", 1.0, 2.0, "Home")];

        apply_markers(&mut data, snapshot.clone(), &mut composer);
        let first = data.markers.clone();
        apply_markers(&mut data, snapshot, &mut composer);

        assert_eq!(data.markers, first);
    }

    #[test]
    fn marker_reload_cancels_pending_composition() {
        let mut data = RemoteData::default();
        let mut composer = Composer::default();
        composer.begin(1.0, 2.0);
        composer.set_label("Cafe");

        apply_markers(&mut data, vec![], &mut composer);

        assert_eq!(composer, Composer::Idle);
    }

    #[test]
    fn reload_returning_empty_leaves_zero_markers() {
        let mut data = RemoteData::default();
        let mut composer = Composer::default();
        apply_markers(
            &mut data,
            vec![marker("m1", 1.0, 2.0, "Home")],
            &mut composer,
        );
        assert_eq!(data.markers.len(), 1);
        assert_eq!(data.markers[0].name, "Home");
        assert_eq!((data.markers[0].lat, data.markers[0].lng), (1.0, 2.0));

        apply_markers(&mut data, vec![], &mut composer);

        assert!(data.markers.is_empty());
    }

    #[test]
    fn last_click_wins_while_composing() {
        let mut composer = Composer::default();
        composer.begin(1.0, 1.0);
        composer.set_label("first");

        composer.begin(2.0, 3.0);

        // The earlier pending marker is discarded, label included.
        assert_eq!(composer.pending(), Some((2.0, 3.0, "")));
    }

    #[test]
    fn label_edits_only_apply_while_composing() {
        let mut composer = Composer::default();
        composer.set_label("ignored");
        assert_eq!(composer, Composer::Idle);

        composer.begin(1.0, 2.0);
        composer.set_label("Office");
        assert_eq!(composer.pending(), Some((1.0, 2.0, "Office")));
    }

    #[test]
    fn closing_discards_the_pending_marker() {
        let mut composer = Composer::default();
        composer.begin(1.0, 2.0);
        composer.set_label("draft");

        composer.close();

        assert!(!composer.is_composing());
        assert_eq!(composer.pending(), None);
    }

    #[test]
    fn heat_points_arriving_for_a_stale_user_are_discarded() {
        let before = vec![HeatPoint(1.0, 1.0, 1.0)];
        let mut data = RemoteData {
            heat_points: before.clone(),
            markers: vec![],
        };
        let tag = FetchTag::capture("u1");

        // The user switched to u2 while the u1 request was in flight.
        let accepted = accept_heat_points(&tag, "u2", &mut data, vec![HeatPoint(9.0, 9.0, 9.0)]);

        assert!(!accepted);
        assert_eq!(data.heat_points, before);

        let accepted = accept_heat_points(&tag, "u1", &mut data, vec![HeatPoint(9.0, 9.0, 9.0)]);
        assert!(accepted);
        assert_eq!(data.heat_points, vec![HeatPoint(9.0, 9.0, 9.0)]);
    }

    #[test]
    fn markers_arriving_for_a_stale_user_leave_state_and_composer_alone() {
        let mut data = RemoteData::default();
        let mut composer = Composer::default();
        composer.begin(1.0, 2.0);
        composer.set_label("draft");
        let tag = FetchTag::capture("u1");

        let accepted = accept_markers(
            &tag,
            "u2",
            &mut data,
            vec![marker("m1", 1.0, 2.0, "Home")],
            &mut composer,
        );

        assert!(!accepted);
        assert!(data.markers.is_empty());
        // The stale reload must not cancel the in-progress composition either.
        assert_eq!(composer.pending(), Some((1.0, 2.0, "draft")));
    }

    #[test]
    fn stale_fetch_tags_are_detected() {
        let tag = FetchTag::capture("u1");
        assert!(tag.still_current("u1"));
        assert!(!tag.still_current("u2"));
    }

    #[test]
    fn empty_user_is_a_legal_scope() {
        let tag = FetchTag::capture("");
        assert_eq!(tag.user(), "");
        assert!(tag.still_current(""));
        assert!(!tag.still_current("alice"));
    }
}
