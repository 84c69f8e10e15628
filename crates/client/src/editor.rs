//! Spot editor page state.
//!
//! The editor keeps the plain form fields (`SpotForm`) apart from the marker
//! list (`MarkerManager`) and only merges them into one payload at submit
//! time. Map clicks arrive through a channel whose sender stays valid for
//! the editor's whole lifetime, so the map widget never needs rebinding.

use std::future::Future;
use std::time::Instant;

use catchlog_core::click_router::{ClickOutcome, MapClick, MapClickRouter};
use catchlog_core::error::CoreError;
use catchlog_core::focus::PanCommand;
use catchlog_core::marker::{LatLng, MarkerIndex};
use catchlog_core::marker_manager::MarkerManager;
use catchlog_core::spot::{validate_coordinates, validate_notes, validate_spot_name, SpotForm};
use catchlog_core::types::DbId;
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::models::{Spot, SpotPayload};
use crate::store::SpotApi;

/// Where the page goes after a successful save or delete.
pub const SPOTS_ROUTE: &str = "/spots";

/// Map widget seen from the editor.
pub trait MapWidget {
    /// Centre the viewport on `position`, keeping the zoom level.
    fn pan_to(&mut self, position: LatLng);
}

/// Takes a picture of the current map view.
pub trait ScreenshotCapture {
    /// Returns the image as a `data:image/...` URL.
    fn capture(&self) -> impl Future<Output = Result<String, ClientError>> + Send;
}

/// Blocking yes/no prompt shown to the user.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// What the page should do after submit or delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Leave the editor for the given route.
    Navigate(&'static str),
    /// Remain on the form; `error` may hold a message to show.
    Stay,
}

/// Cloneable sender handed to the map widget's click callback.
///
/// Each click is stamped when it is queued so that debouncing measures the
/// gap between clicks, not the moment the queue happens to be drained.
#[derive(Debug, Clone)]
pub struct ClickHandle {
    tx: mpsc::UnboundedSender<(MapClick, Instant)>,
}

impl ClickHandle {
    /// Queue a raw click. Missing components are allowed; the router drops
    /// them.
    pub fn click(&self, lat: Option<f64>, lng: Option<f64>) {
        self.click_at(lat, lng, Instant::now());
    }

    /// Queue a click that happened at `at`.
    pub fn click_at(&self, lat: Option<f64>, lng: Option<f64>, at: Instant) {
        if self.tx.send((MapClick { lat, lng }, at)).is_err() {
            tracing::debug!("Map click after editor was dropped");
        }
    }
}

/// State of the create/edit spot page.
pub struct SpotEditor {
    spot_id: Option<DbId>,
    form: SpotForm,
    markers: MarkerManager,
    router: MapClickRouter,
    clicks: ClickHandle,
    click_rx: mpsc::UnboundedReceiver<(MapClick, Instant)>,
    is_submitting: bool,
    error: Option<String>,
}

impl SpotEditor {
    fn build(spot_id: Option<DbId>, form: SpotForm, markers: MarkerManager) -> Self {
        let (tx, click_rx) = mpsc::unbounded_channel();
        Self {
            spot_id,
            form,
            markers,
            router: MapClickRouter::default(),
            clicks: ClickHandle { tx },
            click_rx,
            is_submitting: false,
            error: None,
        }
    }

    /// Empty editor for a new spot. The primary marker has no position
    /// until the first click or until both coordinates are typed.
    pub fn new_spot() -> Self {
        Self::build(None, SpotForm::default(), MarkerManager::for_new_spot())
    }

    /// Editor pre-filled from a persisted spot.
    pub fn edit_spot(spot: &Spot) -> Self {
        let mut form = SpotForm {
            name: spot.name.clone(),
            notes: spot.notes.clone(),
            ..SpotForm::default()
        };
        form.set_position(spot.primary());
        let markers = MarkerManager::new(spot.primary(), spot.coordinates.clone());
        Self::build(Some(spot.id), form, markers)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn spot_id(&self) -> Option<DbId> {
        self.spot_id
    }

    pub fn form(&self) -> &SpotForm {
        &self.form
    }

    pub fn markers(&self) -> &MarkerManager {
        &self.markers
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Inline error banner text, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Stable click sender for the map widget.
    pub fn click_handle(&self) -> ClickHandle {
        self.clicks.clone()
    }

    // -----------------------------------------------------------------------
    // Form fields
    // -----------------------------------------------------------------------

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.form.notes = notes.into();
    }

    /// Typed latitude. The primary marker follows once both fields parse.
    pub fn set_latitude(&mut self, text: impl Into<String>) {
        self.form.latitude = text.into();
        self.sync_primary_from_form();
    }

    pub fn set_longitude(&mut self, text: impl Into<String>) {
        self.form.longitude = text.into();
        self.sync_primary_from_form();
    }

    fn sync_primary_from_form(&mut self) {
        if let Ok(position) = self.form.parse_position() {
            self.markers.move_primary(position);
        }
    }

    // -----------------------------------------------------------------------
    // Markers
    // -----------------------------------------------------------------------

    /// Process every queued click in arrival order, each at the instant it
    /// was queued.
    pub fn drain_clicks(&mut self) -> Vec<ClickOutcome> {
        let mut outcomes = Vec::new();
        while let Ok((click, at)) = self.click_rx.try_recv() {
            outcomes.push(self.route_click(click, at));
        }
        outcomes
    }

    /// Route one click directly, bypassing the queue.
    pub fn handle_map_click(&mut self, now: Instant, lat: Option<f64>, lng: Option<f64>) -> ClickOutcome {
        self.route_click(MapClick { lat, lng }, now)
    }

    fn route_click(&mut self, click: MapClick, now: Instant) -> ClickOutcome {
        let outcome = self.router.route(&mut self.markers, click, now);
        if outcome == ClickOutcome::MovedPrimary {
            self.form.set_position(self.markers.primary());
        }
        outcome
    }

    pub fn toggle_adding_mode(&mut self) -> bool {
        self.markers.toggle_adding_mode()
    }

    pub fn select_marker(&mut self, index: MarkerIndex, now: Instant) -> Result<(), CoreError> {
        self.markers.select_marker(index, now)
    }

    pub fn remove_marker(&mut self, index: usize) -> Result<(), CoreError> {
        self.markers.remove_marker(index).map(|_| ())
    }

    pub fn rename_marker(&mut self, index: usize, name: impl Into<String>) -> Result<(), CoreError> {
        self.markers.update_marker_name(index, name)
    }

    /// Apply a due focus request to the map.
    pub fn poll_focus(&mut self, now: Instant, map: &mut impl MapWidget) -> Option<PanCommand> {
        let command = self.markers.poll_focus(now)?;
        map.pan_to(command.position);
        Some(command)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    fn build_payload(&self) -> Result<SpotPayload, CoreError> {
        validate_spot_name(&self.form.name)?;
        let position = self.form.parse_position()?;
        validate_coordinates(self.markers.coordinates())?;
        validate_notes(&self.form.notes)?;

        Ok(SpotPayload {
            name: self.form.name.trim().to_string(),
            latitude: position.lat,
            longitude: position.lng,
            coordinates: self.markers.coordinates().to_vec(),
            notes: self.form.notes.clone(),
            map_image: None,
        })
    }

    /// Validate, attach a screenshot, and create or update the spot.
    ///
    /// Validation failures never reach the network. On any failure the
    /// editor stays open with `error` set and all local state intact.
    pub async fn submit(
        &mut self,
        store: &mut impl SpotApi,
        screenshot: &impl ScreenshotCapture,
    ) -> SubmitOutcome {
        if self.is_submitting {
            tracing::debug!("Ignoring submit while a save is in flight");
            return SubmitOutcome::Stay;
        }
        self.error = None;

        let mut payload = match self.build_payload() {
            Ok(payload) => payload,
            Err(e) => {
                self.error = Some(ClientError::from(e).display_message());
                return SubmitOutcome::Stay;
            }
        };

        self.is_submitting = true;

        match screenshot.capture().await {
            Ok(image) => payload.map_image = Some(image),
            Err(e) => tracing::warn!(error = %e, "Map screenshot failed, saving without it"),
        }

        let result = match self.spot_id {
            Some(id) => store.update(id, &payload).await,
            None => store.create(&payload).await,
        };
        self.is_submitting = false;

        match result {
            Ok(spot) => {
                self.spot_id = Some(spot.id);
                SubmitOutcome::Navigate(SPOTS_ROUTE)
            }
            Err(e) => {
                tracing::warn!(spot_id = ?self.spot_id, error = %e, "Saving spot failed");
                self.error = Some(e.display_message());
                SubmitOutcome::Stay
            }
        }
    }

    /// Delete the spot after the user confirms.
    pub async fn delete(&mut self, store: &mut impl SpotApi, confirm: &impl Confirm) -> SubmitOutcome {
        let Some(id) = self.spot_id else {
            return SubmitOutcome::Stay;
        };
        if self.is_submitting {
            return SubmitOutcome::Stay;
        }
        if !confirm.confirm("Delete this spot? This cannot be undone.") {
            return SubmitOutcome::Stay;
        }

        self.error = None;
        self.is_submitting = true;
        let result = store.delete(id).await;
        self.is_submitting = false;

        match result {
            Ok(()) => SubmitOutcome::Navigate(SPOTS_ROUTE),
            Err(e) => {
                tracing::warn!(spot_id = id, error = %e, "Deleting spot failed");
                self.error = Some(e.display_message());
                SubmitOutcome::Stay
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use catchlog_core::marker::Marker;

    use super::*;
    use crate::store::upsert;

    // ---- fakes ----

    #[derive(Default)]
    struct FakeStore {
        spots: Vec<Spot>,
        next_id: DbId,
        calls: usize,
        fail_with: Option<(u16, String)>,
        last_payload: Option<SpotPayload>,
    }

    impl FakeStore {
        fn check(&mut self) -> Result<(), ClientError> {
            self.calls += 1;
            match &self.fail_with {
                Some((status, message)) => Err(ClientError::Api {
                    status: *status,
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }

        fn persist(&mut self, id: DbId, payload: &SpotPayload) -> Spot {
            self.last_payload = Some(payload.clone());
            let spot = Spot {
                id,
                name: payload.name.clone(),
                latitude: payload.latitude,
                longitude: payload.longitude,
                coordinates: payload.coordinates.clone(),
                notes: payload.notes.clone(),
                map_image_url: payload.map_image.clone(),
                is_favorite: false,
                created_at: None,
                updated_at: None,
            };
            upsert(&mut self.spots, spot.clone());
            spot
        }
    }

    impl SpotApi for FakeStore {
        async fn list(&mut self) -> Result<Vec<Spot>, ClientError> {
            self.check()?;
            Ok(self.spots.clone())
        }

        async fn get(&mut self, id: DbId) -> Result<Spot, ClientError> {
            self.check()?;
            self.spots
                .iter()
                .find(|s| s.id == id)
                .cloned()
                .ok_or_else(|| ClientError::Api {
                    status: 404,
                    message: format!("Spot with id {id} not found"),
                })
        }

        async fn create(&mut self, payload: &SpotPayload) -> Result<Spot, ClientError> {
            self.check()?;
            self.next_id += 1;
            Ok(self.persist(self.next_id, payload))
        }

        async fn update(&mut self, id: DbId, payload: &SpotPayload) -> Result<Spot, ClientError> {
            self.check()?;
            Ok(self.persist(id, payload))
        }

        async fn delete(&mut self, id: DbId) -> Result<(), ClientError> {
            self.check()?;
            self.spots.retain(|s| s.id != id);
            Ok(())
        }

        fn spots(&self) -> &[Spot] {
            &self.spots
        }
    }

    struct Camera(Option<&'static str>);

    impl ScreenshotCapture for Camera {
        async fn capture(&self) -> Result<String, ClientError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| ClientError::Validation("map not rendered".into()))
        }
    }

    struct Answer {
        yes: bool,
        asked: Cell<bool>,
    }

    impl Answer {
        fn new(yes: bool) -> Self {
            Self {
                yes,
                asked: Cell::new(false),
            }
        }
    }

    impl Confirm for Answer {
        fn confirm(&self, _message: &str) -> bool {
            self.asked.set(true);
            self.yes
        }
    }

    #[derive(Default)]
    struct Map {
        centre: Option<LatLng>,
    }

    impl MapWidget for Map {
        fn pan_to(&mut self, position: LatLng) {
            self.centre = Some(position);
        }
    }

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn saved_spot() -> Spot {
        Spot {
            id: 9,
            name: "Old pier".into(),
            latitude: 10.0,
            longitude: 20.0,
            coordinates: vec![
                Marker::new(10.1, 20.1, "Marker 2"),
                Marker::new(10.2, 20.2, "Reeds"),
            ],
            notes: "Slack water".into(),
            map_image_url: None,
            is_favorite: false,
            created_at: None,
            updated_at: None,
        }
    }

    // ---- tests ----

    #[tokio::test]
    async fn test_new_spot_click_then_submit() {
        let t0 = Instant::now();
        let mut editor = SpotEditor::new_spot();
        let mut store = FakeStore::default();
        editor.set_name("North lake");

        editor.click_handle().click(Some(54.5), Some(26.0));
        let outcomes = editor.drain_clicks();
        assert_eq!(outcomes, [ClickOutcome::MovedPrimary]);
        assert_eq!(editor.form().latitude, "54.5");

        let outcome = editor.submit(&mut store, &Camera(Some(PNG))).await;

        assert_eq!(outcome, SubmitOutcome::Navigate(SPOTS_ROUTE));
        let payload = store.last_payload.clone().unwrap();
        assert_eq!((payload.latitude, payload.longitude), (54.5, 26.0));
        assert!(payload.coordinates.is_empty());
        assert_eq!(payload.map_image.as_deref(), Some(PNG));
        assert_eq!(store.spots().len(), 1);
        assert_eq!(editor.spot_id(), Some(1));
    }

    #[tokio::test]
    async fn test_submit_without_position_makes_no_network_call() {
        let mut editor = SpotEditor::new_spot();
        let mut store = FakeStore::default();
        editor.set_name("Somewhere");
        editor.set_latitude("54.5");

        let outcome = editor.submit(&mut store, &Camera(Some(PNG))).await;

        assert_eq!(outcome, SubmitOutcome::Stay);
        assert_eq!(store.calls, 0);
        assert_eq!(editor.error(), Some("Longitude is required"));
        assert!(!editor.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_rejects_non_numeric_latitude() {
        let mut editor = SpotEditor::new_spot();
        let mut store = FakeStore::default();
        editor.set_name("Somewhere");
        editor.set_latitude("north");
        editor.set_longitude("26");

        assert_eq!(editor.submit(&mut store, &Camera(None)).await, SubmitOutcome::Stay);
        assert_eq!(store.calls, 0);
        assert!(editor.error().unwrap().contains("Latitude must be a number"));
    }

    #[tokio::test]
    async fn test_api_failure_shows_error_and_keeps_state() {
        let t0 = Instant::now();
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        let mut store = FakeStore {
            fail_with: Some((500, "An internal error occurred".into())),
            ..Default::default()
        };
        editor.toggle_adding_mode();
        editor.handle_map_click(t0, Some(10.3), Some(20.3));

        let outcome = editor.submit(&mut store, &Camera(Some(PNG))).await;

        assert_eq!(outcome, SubmitOutcome::Stay);
        assert_eq!(editor.error(), Some("An internal error occurred"));
        assert_eq!(editor.markers().coordinates().len(), 3);
        assert!(!editor.is_submitting());

        store.fail_with = None;
        assert_eq!(
            editor.submit(&mut store, &Camera(Some(PNG))).await,
            SubmitOutcome::Navigate(SPOTS_ROUTE)
        );
        assert_eq!(editor.error(), None);
    }

    #[tokio::test]
    async fn test_edit_updates_existing_spot_without_screenshot() {
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        let mut store = FakeStore::default();
        editor.rename_marker(0, "Drop-off").unwrap();

        let outcome = editor.submit(&mut store, &Camera(None)).await;

        assert_eq!(outcome, SubmitOutcome::Navigate(SPOTS_ROUTE));
        let saved = store.spots()[0].clone();
        assert_eq!(saved.id, 9);
        assert_eq!(saved.coordinates[0].name.as_deref(), Some("Drop-off"));
        assert_eq!(saved.map_image_url, None);
    }

    /// Scenario: select the second marker, delete the first; the selection
    /// follows the marker and the next click moves it.
    #[tokio::test]
    async fn test_removal_keeps_selection_on_same_marker() {
        let t0 = Instant::now();
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        editor.select_marker(MarkerIndex::Additional(1), t0).unwrap();

        editor.remove_marker(0).unwrap();
        assert_eq!(editor.markers().selected_index(), Some(MarkerIndex::Additional(0)));

        let outcome = editor.handle_map_click(t0 + ms(200), Some(11.0), Some(21.0));
        assert_eq!(outcome, ClickOutcome::MovedMarker(0));
        assert_eq!(editor.markers().coordinates(), &[Marker::new(11.0, 21.0, "Reeds")]);
        assert_eq!(editor.form().latitude, "10");
    }

    #[tokio::test]
    async fn test_duplicate_queued_clicks_add_one_marker() {
        let t0 = Instant::now();
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        editor.toggle_adding_mode();
        let handle = editor.click_handle();
        handle.click_at(Some(10.5), Some(20.5), t0);
        handle.click_at(Some(10.5), Some(20.5), t0 + ms(40));
        handle.click_at(None, Some(20.5), t0 + ms(50));

        let outcomes = editor.drain_clicks();

        assert_matches!(
            outcomes.as_slice(),
            [ClickOutcome::AddedMarker(2), ClickOutcome::Debounced, ClickOutcome::Rejected]
        );
        assert_eq!(editor.markers().coordinates().len(), 3);
    }

    /// Clicks queued far apart are both handled even when drained together.
    #[tokio::test]
    async fn test_spaced_queued_clicks_are_not_debounced() {
        let t0 = Instant::now();
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        editor.toggle_adding_mode();
        let handle = editor.click_handle();
        handle.click_at(Some(10.5), Some(20.5), t0);
        handle.click_at(Some(10.7), Some(20.7), t0 + ms(300));

        let outcomes = editor.drain_clicks();

        assert_eq!(outcomes, [ClickOutcome::AddedMarker(2), ClickOutcome::MovedMarker(2)]);
        assert_eq!(editor.markers().coordinates()[2].position(), LatLng::new(10.7, 20.7));
    }

    #[test]
    fn test_typed_coordinates_move_primary() {
        let mut editor = SpotEditor::new_spot();
        editor.set_latitude("45.25");
        assert!(!editor.markers().primary().is_finite());

        editor.set_longitude("-3.5");
        assert_eq!(editor.markers().primary(), LatLng::new(45.25, -3.5));
    }

    #[test]
    fn test_selection_pans_map_after_delay() {
        let t0 = Instant::now();
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        let mut map = Map::default();
        editor.select_marker(MarkerIndex::Additional(1), t0).unwrap();

        assert_eq!(editor.poll_focus(t0, &mut map), None);
        let command = editor.poll_focus(t0 + ms(60), &mut map).unwrap();

        assert_eq!(command.target, MarkerIndex::Additional(1));
        assert_eq!(map.centre, Some(LatLng::new(10.2, 20.2)));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        let mut store = FakeStore {
            spots: vec![saved_spot()],
            ..Default::default()
        };

        let declined = Answer::new(false);
        assert_eq!(editor.delete(&mut store, &declined).await, SubmitOutcome::Stay);
        assert!(declined.asked.get());
        assert_eq!(store.calls, 0);

        let accepted = Answer::new(true);
        assert_eq!(
            editor.delete(&mut store, &accepted).await,
            SubmitOutcome::Navigate(SPOTS_ROUTE)
        );
        assert!(store.spots().is_empty());
    }

    #[tokio::test]
    async fn test_delete_failure_stays_with_error() {
        let mut editor = SpotEditor::edit_spot(&saved_spot());
        let mut store = FakeStore {
            fail_with: Some((404, "Spot with id 9 not found".into())),
            ..Default::default()
        };

        let outcome = editor.delete(&mut store, &Answer::new(true)).await;

        assert_eq!(outcome, SubmitOutcome::Stay);
        assert_eq!(editor.error(), Some("Spot with id 9 not found"));
    }

    #[tokio::test]
    async fn test_new_spot_cannot_be_deleted() {
        let mut editor = SpotEditor::new_spot();
        let mut store = FakeStore::default();
        let answer = Answer::new(true);

        assert_eq!(editor.delete(&mut store, &answer).await, SubmitOutcome::Stay);
        assert!(!answer.asked.get());
    }
}
