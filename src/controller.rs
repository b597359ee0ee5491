//! Controller: owns all session state and handles every user action.
//!
//! After each mutation the controller recomputes the derived display state
//! in full (ingredient list, cart lines, count and total) and pushes it to
//! the [`View`](crate::ports::View).

use std::future::Future;
use std::sync::Arc;

use crate::chat::{build_chat_request, ChatReply, Mode};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::{BackendError, LedgerError, StartError};
use crate::ledger::{CartLedger, CartSummary};
use crate::ports::backend::{LookupResponse, Product, ShoppingListRequest, ShoppingListResponse};
use crate::register::{AddOutcome, IngredientRegister};
use crate::session::{ScanOutcome, ScanSession, ScanSettings, ScanState};

/// Barcode injected by test mode in place of a camera detection.
pub const TEST_BARCODE: &str = "049000028911";

const READY: &str = "Ready to scan ingredients.";
const BACKEND_DOWN: &str = "Error: Could not connect to the backend. Is it running?";

/// Resolves the display name for `code` from a lookup answer. Never fails.
#[must_use]
pub fn product_name(code: &str, lookup: Result<LookupResponse, BackendError>) -> String {
    let response = match lookup {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(%code, error = %e, "barcode lookup failed");
            return format!("Product {code}");
        }
    };
    let named = response
        .product_name
        .filter(|name| response.success && !name.trim().is_empty() && name != "N/A");
    named
        .or(response.fallback_name.filter(|name| !name.trim().is_empty()))
        .unwrap_or_else(|| format!("Unknown Product ({code})"))
}

/// Application state and the actions on it.
pub struct Controller {
    ctx: ServiceContext,
    model: String,
    register: IngredientRegister,
    ledger: CartLedger,
    session: ScanSession,
    mode: Mode,
    shopping_list: Option<ShoppingListResponse>,
}

impl Controller {
    /// Creates a controller with empty lists in light mode.
    #[must_use]
    pub fn new(ctx: ServiceContext, config: &Config) -> Self {
        Self {
            ctx,
            model: config.model.clone(),
            register: IngredientRegister::new(),
            ledger: CartLedger::new(),
            session: ScanSession::new(ScanSettings::from(config)),
            mode: Mode::default(),
            shopping_list: None,
        }
    }

    /// Stops any scan and returns every piece of state to its initial value.
    pub fn reset(&mut self) {
        self.session.stop();
        self.register.clear();
        self.ledger.clear();
        self.mode = Mode::default();
        self.shopping_list = None;
        self.refresh();
        self.ctx.view.status(READY);
    }

    /// Scanned ingredients.
    #[must_use]
    pub fn register(&self) -> &IngredientRegister {
        &self.register
    }

    /// The shopping cart.
    #[must_use]
    pub fn ledger(&self) -> &CartLedger {
        &self.ledger
    }

    /// Current display mode.
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Held state of the scan session.
    #[must_use]
    pub fn scan_state(&self) -> ScanState {
        self.session.state()
    }

    /// The most recently generated shopping list.
    #[must_use]
    pub fn shopping_list(&self) -> Option<&ShoppingListResponse> {
        self.shopping_list.as_ref()
    }

    /// Cart lines, count and total as displayed.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        self.ledger.summary()
    }

    // --- scanning ---

    /// Runs one scan session until a barcode is detected, the session
    /// fails, or `cancel` resolves. A detected barcode is looked up and
    /// added to the register before this returns.
    pub async fn scan<F>(&mut self, cancel: F) -> ScanOutcome
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        self.ctx.view.status("Starting camera...");

        let id = self.ctx.id_gen.generate_id();
        let engine = Arc::clone(&self.ctx.decoder);
        let started = tokio::select! {
            // Start is polled first, so a cancel that is already resolved
            // still tears down whatever acquisition began.
            biased;
            started = self.session.start(id, self.ctx.camera.as_ref(), engine) => started,
            () = &mut cancel => {
                self.stop_scan();
                return ScanOutcome::Stopped;
            }
        };
        match started {
            Ok(()) => {}
            Err(StartError::Busy) => {
                return ScanOutcome::Failed("a scan is already running".to_string());
            }
            Err(e @ StartError::Camera(_)) => {
                self.ctx.view.status("Failed to start camera. Please check permissions.");
                return ScanOutcome::Failed(e.to_string());
            }
            Err(e @ StartError::Decoder(_)) => {
                self.ctx.view.status(&format!("Failed to start barcode decoder: {e}"));
                return ScanOutcome::Failed(e.to_string());
            }
        }

        self.ctx.view.status("Scanning... Position barcode in the viewfinder.");
        let outcome = tokio::select! {
            outcome = self.session.run() => outcome,
            () = &mut cancel => {
                self.session.stop();
                ScanOutcome::Stopped
            }
        };

        match &outcome {
            ScanOutcome::Detected(code) => {
                self.ctx.view.status("Barcode detected! Looking up product...");
                self.on_barcode_detected(code).await;
            }
            ScanOutcome::Stopped => self.ctx.view.status(READY),
            ScanOutcome::Failed(reason) => {
                self.ctx.view.status(&format!("Scanning stopped: {reason}"));
            }
        }
        outcome
    }

    /// Stops a running scan. Returns `false` if none was running.
    pub fn stop_scan(&mut self) -> bool {
        let stopped = self.session.stop();
        if stopped {
            self.ctx.view.status(READY);
        }
        stopped
    }

    /// Skips the camera and feeds [`TEST_BARCODE`] through the detection path.
    pub async fn test_scan(&mut self) -> AddOutcome {
        self.ctx.view.status("Test mode: Looking up sample product...");
        self.on_barcode_detected(TEST_BARCODE).await
    }

    /// Looks up `code` and records it as a scanned ingredient.
    pub async fn on_barcode_detected(&mut self, code: &str) -> AddOutcome {
        let lookup = self.ctx.backend.lookup_barcode(code).await;
        let name = product_name(code, lookup);
        let outcome = self.register.add(&name, code, self.ctx.clock.now());
        match outcome {
            AddOutcome::Added => {
                tracing::info!(%code, %name, "ingredient added");
                self.ctx.view.status("Ingredient added to your list!");
            }
            AddOutcome::AlreadyScanned => self.ctx.view.status("Ingredient already scanned!"),
        }
        self.ctx.view.ingredients(self.register.list());
        outcome
    }

    // --- ingredients ---

    /// Removes a scanned ingredient by barcode.
    pub fn remove_ingredient(&mut self, barcode: &str) -> bool {
        let removed = self.register.remove(barcode);
        self.ctx.view.ingredients(self.register.list());
        removed
    }

    /// Forgets every scanned ingredient.
    pub fn clear_ingredients(&mut self) {
        self.register.clear();
        self.ctx.view.ingredients(self.register.list());
        self.ctx.view.status("All ingredients cleared. Ready to scan new ones.");
    }

    // --- chat & shopping list ---

    /// Switches mode. Leaving dark mode stops any running scan.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == Mode::Light {
            self.session.stop();
        }
        self.mode = mode;
        tracing::debug!(?mode, "mode changed");
        if mode == Mode::Dark {
            self.ctx.view.ingredients(self.register.list());
        }
    }

    /// Flips between light and dark mode and returns the new mode.
    pub fn toggle_mode(&mut self) -> Mode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Sends `prompt` to the assistant. In dark mode the scanned ingredient
    /// names go along and the reply is a recipe.
    ///
    /// # Errors
    ///
    /// Returns the backend error after showing a connection error status.
    pub async fn ask(&mut self, prompt: &str) -> Result<ChatReply, BackendError> {
        let request = build_chat_request(prompt, &self.model, self.mode, self.register.names());
        match self.ctx.backend.chat(&request).await {
            Ok(response) => {
                Ok(ChatReply::from_response(response, self.mode, self.register.names()))
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                self.ctx.view.status(BACKEND_DOWN);
                Err(e)
            }
        }
    }

    /// Asks the backend for store products matching `ingredients`.
    ///
    /// On success the list becomes the current shopping list and is shown,
    /// unless the backend answered with a clarifying question; the list is
    /// still made current but only the question is shown. On failure the
    /// previous list is kept.
    ///
    /// # Errors
    ///
    /// Returns the backend error after showing a connection error status.
    pub async fn generate_shopping_list(
        &mut self,
        ingredients: &str,
        dish_name: Option<&str>,
    ) -> Result<(), BackendError> {
        let request = ShoppingListRequest {
            ingredients: ingredients.to_string(),
            dish_name: dish_name.map(str::to_string),
        };
        let list = match self.ctx.backend.shopping_list(&request).await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "shopping list request failed");
                self.ctx.view.status(BACKEND_DOWN);
                return Err(e);
            }
        };
        if let Some(question) = &list.question {
            self.ctx.view.status(question);
            self.shopping_list = Some(list);
            return Ok(());
        }
        self.ctx.view.status(&format!(
            "Cart ready: {} items found for \"{}\"",
            list.matched_ingredients, list.dish_name
        ));
        self.ctx.view.shopping_list(&list);
        self.shopping_list = Some(list);
        Ok(())
    }

    // --- cart ---

    /// Adds one unit of `product` to the cart. Returns the new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidPrice`] if the price cannot be read;
    /// the cart is left unchanged.
    pub fn add_to_cart(&mut self, product: Product) -> Result<u32, LedgerError> {
        let name = product.name.clone();
        match self.ledger.add(product, self.ctx.clock.now()) {
            Ok(quantity) => {
                self.ctx.view.status(&format!("Added {name} to your cart."));
                self.ctx.view.cart(&self.ledger.summary());
                Ok(quantity)
            }
            Err(e) => {
                self.ctx.view.status(&format!("Could not add {name}: {e}"));
                Err(e)
            }
        }
    }

    /// Adds the product with `id` from the current shopping list.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownProduct`] if no listed product has that
    /// id, or any error from [`Controller::add_to_cart`]. Either way the
    /// failure is shown as the status.
    pub fn add_listed_product(&mut self, id: &str) -> Result<u32, LedgerError> {
        let listed = self.shopping_list.as_ref().and_then(|list| list.find_product(id)).cloned();
        let Some(product) = listed else {
            let err = LedgerError::UnknownProduct(id.to_string());
            self.ctx.view.status(&format!("Could not add {id}: {err}"));
            return Err(err);
        };
        self.add_to_cart(product)
    }

    /// Adjusts a cart line's quantity; a line that drops to zero is removed.
    /// Returns the remaining quantity.
    pub fn change_quantity(&mut self, id: &str, delta: i32) -> Option<u32> {
        let quantity = self.ledger.change_quantity(id, delta);
        self.ctx.view.cart(&self.ledger.summary());
        quantity
    }

    /// Removes a cart line.
    pub fn remove_from_cart(&mut self, id: &str) -> bool {
        let removed = self.ledger.remove(id);
        self.ctx.view.cart(&self.ledger.summary());
        removed
    }

    /// Empties the cart, but only when `confirmed`. Returns whether it was
    /// cleared.
    pub fn clear_cart(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        self.ledger.clear();
        self.ctx.view.cart(&self.ledger.summary());
        true
    }

    /// Pushes the full ingredient list and cart to the view.
    pub fn refresh(&self) {
        self.ctx.view.ingredients(self.register.list());
        self.ctx.view.cart(&self.ledger.summary());
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::adapters::scripted::{
        FixedClock, RecordingView, ScriptedBackend, ScriptedCamera, ScriptedDecoder,
        SequentialIdGenerator,
    };

    fn controller(backend: ScriptedBackend, view: RecordingView) -> Controller {
        let ctx = ServiceContext {
            clock: Box::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())),
            id_gen: Box::new(SequentialIdGenerator::new()),
            backend: Box::new(backend),
            camera: Box::new(ScriptedCamera::new()),
            decoder: Arc::new(ScriptedDecoder::new(vec![])),
            view: Box::new(view),
        };
        Controller::new(ctx, &Config::default())
    }

    fn product(id: &str, price: &str) -> Product {
        serde_json::from_value(json!({"id": id, "name": format!("Item {id}"), "price": price}))
            .unwrap()
    }

    #[test]
    fn names_prefer_product_then_fallback_then_code() {
        let found = LookupResponse {
            success: true,
            product_name: Some("Coca-Cola 12oz".into()),
            fallback_name: Some("Soda".into()),
        };
        assert_eq!(product_name("1", Ok(found)), "Coca-Cola 12oz");

        let not_available = LookupResponse {
            success: true,
            product_name: Some("N/A".into()),
            fallback_name: Some("Soda".into()),
        };
        assert_eq!(product_name("1", Ok(not_available)), "Soda");

        assert_eq!(product_name("42", Ok(LookupResponse::default())), "Unknown Product (42)");

        let err = BackendError::Status { endpoint: "/x".into(), status: 500, body: String::new() };
        assert_eq!(product_name("42", Err(err)), "Product 42");
    }

    #[tokio::test]
    async fn failed_lookup_still_registers_the_barcode() {
        let err = BackendError::Status {
            endpoint: "/api/barcode-lookup".into(),
            status: 502,
            body: String::new(),
        };
        let view = RecordingView::new();
        let mut controller = controller(ScriptedBackend::new().with_lookup(Err(err)), view.clone());

        assert_eq!(controller.on_barcode_detected("12345").await, AddOutcome::Added);

        let entry = &controller.register().list()[0];
        assert_eq!(entry.barcode, "12345");
        assert!(!entry.name.is_empty());
        assert_eq!(view.last_status().as_deref(), Some("Ingredient added to your list!"));
    }

    #[tokio::test]
    async fn test_scan_injects_the_sample_barcode_once() {
        let backend = ScriptedBackend::new();
        let view = RecordingView::new();
        let mut controller = controller(backend.clone(), view.clone());

        assert_eq!(controller.test_scan().await, AddOutcome::Added);
        assert_eq!(controller.test_scan().await, AddOutcome::AlreadyScanned);

        assert_eq!(backend.lookup_requests(), vec![TEST_BARCODE; 2]);
        assert_eq!(controller.register().len(), 1);
        assert_eq!(view.last_status().as_deref(), Some("Ingredient already scanned!"));
    }

    #[test]
    fn cart_changes_push_fresh_totals() {
        let view = RecordingView::new();
        let mut controller = controller(ScriptedBackend::new(), view.clone());

        controller.add_to_cart(product("p1", "$3.50")).unwrap();
        controller.add_to_cart(product("p1", "$3.50")).unwrap();
        assert_eq!(view.last_cart().unwrap().total.to_string(), "$7.00");

        controller.change_quantity("p1", -2);
        let cart = view.last_cart().unwrap();
        assert!(cart.lines.is_empty());
        assert_eq!(cart.item_count, 0);
    }

    #[test]
    fn unpriced_products_are_refused_with_a_status() {
        let view = RecordingView::new();
        let mut controller = controller(ScriptedBackend::new(), view.clone());

        let err = controller.add_to_cart(product("p2", "call for price")).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPrice { .. }));
        assert!(controller.ledger().is_empty());
        assert!(view.last_status().unwrap().starts_with("Could not add"));
    }

    #[test]
    fn clearing_the_cart_needs_confirmation() {
        let mut controller = controller(ScriptedBackend::new(), RecordingView::new());
        controller.add_to_cart(product("p1", "$1.00")).unwrap();

        assert!(!controller.clear_cart(false));
        assert!(!controller.ledger().is_empty());
        assert!(controller.clear_cart(true));
        assert!(controller.ledger().is_empty());
    }

    #[tokio::test]
    async fn listed_products_can_be_added_by_id() {
        let list: ShoppingListResponse = serde_json::from_value(json!({
            "matched_ingredients": 1,
            "total_ingredients": 1,
            "dish_name": "Toast",
            "shopping_list": [{"ingredient": "bread", "products": [
                {"id": "b1", "name": "Bread", "price": "$2.25", "availability": "In stock"}
            ]}]
        }))
        .unwrap();
        let backend = ScriptedBackend::new().with_shopping_list(Ok(list));
        let mut controller = controller(backend.clone(), RecordingView::new());

        assert!(matches!(
            controller.add_listed_product("b1"),
            Err(LedgerError::UnknownProduct(ref id)) if id == "b1"
        ));

        controller.generate_shopping_list("bread", Some("Toast")).await.unwrap();
        assert_eq!(controller.add_listed_product("b1"), Ok(1));
        assert_eq!(controller.cart_summary().total.to_string(), "$2.25");
        assert_eq!(backend.shopping_list_requests()[0].dish_name.as_deref(), Some("Toast"));
    }

    #[test]
    fn unknown_listed_product_is_reported_on_the_status_line() {
        let view = RecordingView::new();
        let mut controller = controller(ScriptedBackend::new(), view.clone());

        let err = controller.add_listed_product("nope").unwrap_err();

        assert_eq!(err, LedgerError::UnknownProduct("nope".into()));
        assert_eq!(
            view.last_status().as_deref(),
            Some("Could not add nope: no listed product with id nope")
        );
        assert!(controller.ledger().is_empty());
    }

    #[tokio::test]
    async fn clarifying_question_replaces_the_current_list() {
        let first: ShoppingListResponse = serde_json::from_value(json!({
            "dish_name": "Toast",
            "shopping_list": [{"ingredient": "bread", "products": [
                {"id": "b1", "name": "Bread", "price": "$2.25", "availability": "In stock"}
            ]}]
        }))
        .unwrap();
        let question: ShoppingListResponse = serde_json::from_value(json!({
            "dish_name": "Pancakes",
            "question": "Sweet or savory pancakes?"
        }))
        .unwrap();
        let backend =
            ScriptedBackend::new().with_shopping_list(Ok(first)).with_shopping_list(Ok(question));
        let view = RecordingView::new();
        let mut controller = controller(backend, view.clone());

        controller.generate_shopping_list("bread", Some("Toast")).await.unwrap();
        controller.generate_shopping_list("pancakes", Some("Pancakes")).await.unwrap();

        assert_eq!(view.last_status().as_deref(), Some("Sweet or savory pancakes?"));
        assert_eq!(controller.shopping_list().map(|l| l.dish_name.as_str()), Some("Pancakes"));
        assert!(controller.add_listed_product("b1").is_err());
        assert!(controller.ledger().is_empty());
    }

    #[tokio::test]
    async fn decoder_startup_failure_has_its_own_status() {
        let view = RecordingView::new();
        let camera = ScriptedCamera::new();
        let ctx = ServiceContext {
            clock: Box::new(FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())),
            id_gen: Box::new(SequentialIdGenerator::new()),
            backend: Box::new(ScriptedBackend::new()),
            camera: Box::new(camera.clone()),
            decoder: Arc::new(ScriptedDecoder::new(vec![]).failing_warm_up("zbarimg not found")),
            view: Box::new(view.clone()),
        };
        let mut controller = Controller::new(ctx, &Config::default());

        let outcome = controller.scan(std::future::pending()).await;

        assert!(matches!(outcome, ScanOutcome::Failed(ref reason) if reason.contains("zbarimg")));
        assert!(!camera.is_live());
        let status = view.last_status().unwrap();
        assert!(status.starts_with("Failed to start barcode decoder"), "{status}");
    }

    #[tokio::test]
    async fn failed_shopping_list_keeps_the_previous_one() {
        let first: ShoppingListResponse =
            serde_json::from_value(json!({"dish_name": "Soup"})).unwrap();
        let backend = ScriptedBackend::new().with_shopping_list(Ok(first));
        let view = RecordingView::new();
        let mut controller = controller(backend, view.clone());

        controller.generate_shopping_list("water", None).await.unwrap();
        assert!(controller.generate_shopping_list("salt", None).await.is_err());

        assert_eq!(controller.shopping_list().map(|l| l.dish_name.as_str()), Some("Soup"));
        assert_eq!(view.last_status().as_deref(), Some(BACKEND_DOWN));
    }

    #[tokio::test]
    async fn dark_mode_chat_sends_scanned_names() {
        let backend = ScriptedBackend::new().with_chat(Ok(crate::ports::ChatResponse {
            response: "Cola braised beef.".into(),
            dish_name: Some("Beef".into()),
        }));
        let mut controller = controller(backend.clone(), RecordingView::new());
        controller.test_scan().await;

        assert_eq!(controller.toggle_mode(), Mode::Dark);
        let reply = controller.ask("dinner").await.unwrap();

        assert_eq!(reply.used_ingredients, vec![format!("Product {TEST_BARCODE}")]);
        let sent = &backend.chat_requests()[0];
        assert_eq!(sent.model, "gemma:2b");
        assert_eq!(sent.scanned_ingredients.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn reset_returns_to_a_blank_slate() {
        let view = RecordingView::new();
        let mut controller = controller(ScriptedBackend::new(), view.clone());
        controller.test_scan().await;
        controller.add_to_cart(product("p1", "$1.00")).unwrap();
        controller.set_mode(Mode::Dark);

        controller.reset();

        assert!(controller.register().is_empty());
        assert!(controller.ledger().is_empty());
        assert_eq!(controller.mode(), Mode::Light);
        assert_eq!(view.last_status().as_deref(), Some(READY));
        assert_eq!(view.last_ingredients(), Some(vec![]));
    }
}
