//! Application state management for the stockroom console.
//!
//! This module contains the core `App` struct that manages UI state, the
//! inventory client and the navigation guard. API calls run as spawned
//! tasks that report back over an mpsc channel drained by the UI loop;
//! results belonging to a superseded navigation are dropped.

use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use stockroom_core::api::TransportError;
use stockroom_core::models::{NewProduct, Product, ProductUpdate, Statistics, StockDirection};
use stockroom_core::{ApiError, Config, GuardDecision, InventoryClient, Route, RouteGuard};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a product form field.
const MAX_FIELD_LENGTH: usize = 64;

/// Maximum digits accepted for a stock amount
const MAX_AMOUNT_DIGITS: usize = 9;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

pub const USERNAME_ENV: &str = "STOCKROOM_USERNAME";
pub const PASSWORD_ENV: &str = "STOCKROOM_PASSWORD";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    LoggingIn,
    EditingProduct,
    AdjustingStock,
    ConfirmingDelete,
    ShowingStatistics,
    ShowingLowStock,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

// ============================================================================
// Forms
// ============================================================================

pub const PRODUCT_FIELDS: [&str; 5] = ["ID", "Name", "Price", "Quantity", "Category"];

const FIELD_ID: usize = 0;
const FIELD_NAME: usize = 1;
const FIELD_PRICE: usize = 2;
const FIELD_QUANTITY: usize = 3;
const FIELD_CATEGORY: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Add/edit product dialog
#[derive(Debug, Clone)]
pub struct ProductForm {
    pub mode: FormMode,
    pub values: [String; 5],
    pub focus: usize,
    pub error: Option<String>,
}

impl ProductForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            values: Default::default(),
            focus: FIELD_ID,
            error: None,
        }
    }

    pub fn edit(product: &Product) -> Self {
        Self {
            mode: FormMode::Edit {
                id: product.id.clone(),
            },
            values: [
                product.id.clone(),
                product.name.clone(),
                product.price.to_string(),
                product.quantity.to_string(),
                product.category.clone(),
            ],
            focus: FIELD_NAME,
            error: None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add Product",
            FormMode::Edit { .. } => "Edit Product",
        }
    }

    /// ID and quantity are fixed once a product exists; quantity only
    /// moves through stock in/out.
    pub fn is_editable(&self, field: usize) -> bool {
        match self.mode {
            FormMode::Create => true,
            FormMode::Edit { .. } => !matches!(field, FIELD_ID | FIELD_QUANTITY),
        }
    }

    fn step_focus(&mut self, forward: bool) {
        let count = PRODUCT_FIELDS.len();
        let mut next = self.focus;
        for _ in 0..count {
            next = if forward {
                (next + 1) % count
            } else {
                (next + count - 1) % count
            };
            if self.is_editable(next) {
                self.focus = next;
                return;
            }
        }
    }

    pub fn focus_next(&mut self) {
        self.step_focus(true);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(false);
    }

    pub fn push_char(&mut self, c: char) {
        let value = &mut self.values[self.focus];
        if can_add_field_char(value.chars().count(), c) {
            value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.values[self.focus].pop();
    }

    fn parse_price(&self) -> Result<f64, String> {
        self.values[FIELD_PRICE]
            .trim()
            .parse::<f64>()
            .map_err(|_| "Price must be a number".to_string())
    }

    fn parse_quantity(&self) -> Result<u32, String> {
        let raw = self.values[FIELD_QUANTITY].trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse::<u32>()
            .map_err(|_| "Quantity must be a whole number".to_string())
    }

    pub fn to_new_product(&self) -> Result<NewProduct, String> {
        let product = NewProduct {
            id: self.values[FIELD_ID].trim().to_string(),
            name: self.values[FIELD_NAME].trim().to_string(),
            price: self.parse_price()?,
            quantity: self.parse_quantity()?,
            category: self.values[FIELD_CATEGORY].trim().to_string(),
        };
        product.validate()?;
        Ok(product)
    }

    pub fn to_update(&self) -> Result<ProductUpdate, String> {
        let update = ProductUpdate {
            name: self.values[FIELD_NAME].trim().to_string(),
            price: self.parse_price()?,
            category: self.values[FIELD_CATEGORY].trim().to_string(),
        };
        update.validate()?;
        Ok(update)
    }
}

/// Stock in/out dialog for one product
#[derive(Debug, Clone)]
pub struct StockForm {
    pub direction: StockDirection,
    pub product: Product,
    pub amount: String,
    pub error: Option<String>,
}

impl StockForm {
    pub fn new(direction: StockDirection, product: Product) -> Self {
        Self {
            direction,
            product,
            amount: String::new(),
            error: None,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_ascii_digit() && self.amount.len() < MAX_AMOUNT_DIGITS {
            self.amount.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.amount.pop();
    }

    /// Parse and check the amount against the quantity on hand
    pub fn parse_amount(&self) -> Result<u32, String> {
        let amount = self
            .amount
            .trim()
            .parse::<u32>()
            .map_err(|_| "Enter a whole number".to_string())?;
        self.direction.validate(amount, self.product.quantity)?;
        Ok(amount)
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned API tasks back to the UI loop.
enum TaskResult {
    /// Guard finished verifying the navigation it was spawned for
    Guarded(RouteGuard),
    Products(Vec<Product>),
    /// Fresh copy of a product, fetched before editing
    ProductLoaded(Product),
    /// Fresh copy of a product, fetched before a stock adjustment
    StockProductLoaded(StockDirection, Product),
    Statistics(Statistics),
    LowStock { threshold: u32, products: Vec<Product> },
    /// A command succeeded; carries the confirmation message
    ActionCompleted(String),
    /// A command was rejected or could not be sent
    ActionFailed { context: &'static str, error: ApiError },
    Failed { context: &'static str, error: ApiError },
}

impl TaskResult {
    /// Command outcomes are reported even after the user navigated away
    fn is_action(&self) -> bool {
        matches!(self, TaskResult::ActionCompleted(_) | TaskResult::ActionFailed { .. })
    }
}

struct TaskMessage {
    generation: u64,
    result: TaskResult,
}

enum Submission {
    Create(NewProduct),
    Update(String, ProductUpdate),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub config: Config,
    client: InventoryClient,

    // UI State
    pub state: AppState,
    pub current_route: Route,
    pub guard: RouteGuard,
    pub search_query: String,
    pub status_message: Option<String>,

    // Navigation bookkeeping
    pending_route: Option<Route>,
    nav_generation: u64,
    nav_cancel: CancellationToken,

    /// Display name of the signed-in user
    pub username: Option<String>,

    // Login form state
    pub login_username: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Products
    pub products: Vec<Product>,
    pub product_selection: usize,
    pub loading: bool,
    pub last_refreshed: Option<DateTime<Local>>,
    pub statistics: Option<Statistics>,
    pub low_stock: Option<Vec<Product>>,
    pub low_stock_threshold: u32,

    // Dialogs
    pub product_form: Option<ProductForm>,
    pub stock_form: Option<StockForm>,
    pub pending_delete: Option<Product>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskMessage>,
    task_tx: mpsc::Sender<TaskMessage>,
}

impl App {
    /// Create a new application instance from the loaded config
    pub fn new(config: Config) -> Result<Self> {
        let client = InventoryClient::from_config(&config)?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: Config, client: InventoryClient) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        // Get credentials from env vars or config
        let login_username = std::env::var(USERNAME_ENV)
            .ok()
            .or_else(|| config.last_username.clone())
            .unwrap_or_default();
        let login_password = std::env::var(PASSWORD_ENV).unwrap_or_default();

        let low_stock_threshold = config.low_stock_threshold.max(1);

        Self {
            config,
            client,

            state: AppState::Normal,
            current_route: Route::Products,
            guard: RouteGuard::new(Route::Products),
            search_query: String::new(),
            status_message: None,

            pending_route: None,
            nav_generation: 0,
            nav_cancel: CancellationToken::new(),

            username: None,

            login_username,
            login_password,
            login_focus: LoginFocus::Username,
            login_error: None,

            products: Vec::new(),
            product_selection: 0,
            loading: false,
            last_refreshed: None,
            statistics: None,
            low_stock: None,
            low_stock_threshold,

            product_form: None,
            stock_form: None,
            pending_delete: None,

            task_rx: rx,
            task_tx: tx,
        }
    }

    /// Whether the view for the current route may be shown and acted on
    pub fn view_ready(&self) -> bool {
        matches!(self.guard.decision(), GuardDecision::Render(_))
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Open a route from a path, e.g. one given on the command line
    pub fn open(&mut self, route: Route) {
        if route.is_protected() {
            self.navigate(route);
        } else {
            self.redirect_to_login(Route::Products, None);
        }
    }

    /// Switch to a route and verify the session for it in the background.
    ///
    /// Any verification still running for the previous route is
    /// cancelled, and its result will be ignored.
    pub fn navigate(&mut self, route: Route) {
        self.nav_cancel.cancel();
        self.nav_cancel = CancellationToken::new();
        self.nav_generation += 1;
        self.current_route = route;
        self.guard = RouteGuard::new(route);
        debug!(%route, generation = self.nav_generation, "Navigating");

        let client = self.client.clone();
        let cancel = self.nav_cancel.clone();
        let mut guard = self.guard.clone();
        self.spawn_task(async move {
            match guard.check(&client, &cancel).await {
                Some(_) => vec![TaskResult::Guarded(guard)],
                None => Vec::new(),
            }
        });
    }

    /// Show the login overlay, remembering where to go afterwards.
    pub fn redirect_to_login(&mut self, return_to: Route, reason: Option<String>) {
        self.nav_cancel.cancel();
        self.nav_generation += 1;
        self.pending_route = Some(return_to);
        self.username = None;
        self.clear_data();
        self.start_login();
        self.login_error = reason;
        info!(%return_to, "Redirecting to login");
    }

    pub fn pending_route(&self) -> Option<Route> {
        self.pending_route
    }

    fn clear_data(&mut self) {
        self.products.clear();
        self.product_selection = 0;
        self.loading = false;
        self.last_refreshed = None;
        self.statistics = None;
        self.low_stock = None;
        self.product_form = None;
        self.stock_form = None;
        self.pending_delete = None;
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    /// Attempt login with the credentials from the login form
    pub async fn attempt_login(&mut self) -> Result<()> {
        let username = self.login_username.trim().to_string();
        if username.is_empty() || self.login_password.is_empty() {
            self.login_error = Some("Username and password required".to_string());
            return Err(anyhow::anyhow!("Username and password required"));
        }

        self.login_error = None;

        match self.client.login(&username, &self.login_password).await {
            Ok(session) => {
                self.config.last_username = Some(session.username.clone());
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }

                self.login_password.clear();
                self.username = Some(session.username);
                self.state = AppState::Normal;
                info!("Login successful");

                let route = self.pending_route.take().unwrap_or(Route::Products);
                self.navigate(route);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Login failed");
                self.login_error = Some(login_error_message(&e));
                Err(e.into())
            }
        }
    }

    /// Log out on the server (best effort) and return to login.
    pub async fn logout(&mut self) {
        if let Err(e) = self.client.logout().await {
            error!(error = %e, "Failed to clear session on logout");
            self.status_message = Some(format!("Logout failed: {}", e));
        }
        self.redirect_to_login(Route::Products, None);
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Spawn an API task tagged with the current navigation generation
    fn spawn_task<F>(&self, task: F)
    where
        F: Future<Output = Vec<TaskResult>> + Send + 'static,
    {
        let tx = self.task_tx.clone();
        let generation = self.nav_generation;
        tokio::spawn(async move {
            for result in task.await {
                if let Err(e) = tx.send(TaskMessage { generation, result }).await {
                    error!(error = %e, "Failed to send task result - channel closed");
                    return;
                }
            }
        });
    }

    fn action_result(context: &'static str, outcome: Result<String, ApiError>, fallback: &str) -> TaskResult {
        match outcome {
            Ok(message) if message.trim().is_empty() => TaskResult::ActionCompleted(fallback.to_string()),
            Ok(message) => TaskResult::ActionCompleted(message),
            Err(error) => TaskResult::ActionFailed { context, error },
        }
    }

    /// Check for completed background tasks and process results
    pub async fn check_background_tasks(&mut self) {
        let mut messages = Vec::new();
        while let Ok(message) = self.task_rx.try_recv() {
            messages.push(message);
        }

        for message in messages {
            self.process_task_message(message);
        }
    }

    fn process_task_message(&mut self, message: TaskMessage) {
        let current = message.generation == self.nav_generation;
        if !current && !message.result.is_action() {
            debug!(
                stale = message.generation,
                current = self.nav_generation,
                "Dropping result from superseded navigation"
            );
            return;
        }

        match message.result {
            TaskResult::Guarded(guard) => self.apply_guard(guard),
            TaskResult::Products(products) => {
                self.products = products;
                self.product_selection = self
                    .product_selection
                    .min(self.products.len().saturating_sub(1));
                self.loading = false;
                self.last_refreshed = Some(Local::now());
            }
            TaskResult::ProductLoaded(product) => {
                if self.state == AppState::Normal {
                    self.status_message = None;
                    self.product_form = Some(ProductForm::edit(&product));
                    self.state = AppState::EditingProduct;
                }
            }
            TaskResult::Statistics(statistics) => {
                self.statistics = Some(statistics);
            }
            TaskResult::LowStock { threshold, products } => {
                // A newer threshold may have been requested meanwhile
                if threshold == self.low_stock_threshold {
                    self.low_stock = Some(products);
                }
            }
            TaskResult::StockProductLoaded(direction, product) => {
                if self.state == AppState::Normal {
                    self.status_message = None;
                    self.stock_form = Some(StockForm::new(direction, product));
                    self.state = AppState::AdjustingStock;
                }
            }
            TaskResult::ActionCompleted(message) => {
                info!(message = %message, "Action completed");
                self.status_message = Some(message);
                if current && self.current_route == Route::Products {
                    self.refresh_products();
                }
            }
            TaskResult::ActionFailed { context, error } | TaskResult::Failed { context, error } => {
                self.handle_failure(context, error)
            }
        }
    }

    fn apply_guard(&mut self, guard: RouteGuard) {
        let decision = guard.decision();
        self.guard = guard;
        match decision {
            GuardDecision::Loading => {}
            GuardDecision::Render(route) => {
                self.username = self.client.username();
                if route == Route::Products {
                    self.refresh_products();
                }
            }
            GuardDecision::Redirect { from, .. } => self.redirect_to_login(from, None),
        }
    }

    fn handle_failure(&mut self, context: &'static str, error: ApiError) {
        self.loading = false;
        if error.requires_login() {
            warn!(context, "Session expired during request");
            self.redirect_to_login(self.current_route, Some(error.to_string()));
            return;
        }
        warn!(context, error = %error, "Background request failed");
        self.status_message = Some(format!("{} failed: {}", context, error));
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Reload the product list using the current search query
    pub fn refresh_products(&mut self) {
        let client = self.client.clone();
        let query = Some(self.search_query.trim().to_string()).filter(|q| !q.is_empty());
        self.loading = true;
        self.spawn_task(async move {
            let result = match client.list_products(query.as_deref()).await {
                Ok(products) => TaskResult::Products(products),
                Err(error) => TaskResult::Failed {
                    context: "Loading products",
                    error,
                },
            };
            vec![result]
        });
    }

    pub fn selected_product(&self) -> Option<&Product> {
        self.products.get(self.product_selection)
    }

    pub fn select_next(&mut self, step: usize) {
        let max = self.products.len().saturating_sub(1);
        self.product_selection = (self.product_selection + step).min(max);
    }

    pub fn select_prev(&mut self, step: usize) {
        self.product_selection = self.product_selection.saturating_sub(step);
    }

    pub fn open_add_form(&mut self) {
        self.product_form = Some(ProductForm::create());
        self.state = AppState::EditingProduct;
    }

    /// Fetch the selected product, then open the edit form with fresh data
    pub fn open_edit_form(&mut self) {
        let Some(id) = self.selected_product().map(|p| p.id.clone()) else {
            return;
        };
        let client = self.client.clone();
        self.status_message = Some(format!("Loading {}...", id));
        self.spawn_task(async move {
            let result = match client.get_product(&id).await {
                Ok(product) => TaskResult::ProductLoaded(product),
                Err(error) => TaskResult::Failed {
                    context: "Loading product",
                    error,
                },
            };
            vec![result]
        });
    }

    pub fn close_dialog(&mut self) {
        self.product_form = None;
        self.stock_form = None;
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    /// Validate the form locally; on success send it and close the dialog
    pub fn submit_product_form(&mut self) {
        let Some(form) = self.product_form.as_mut() else {
            return;
        };
        let submission = match &form.mode {
            FormMode::Create => form.to_new_product().map(Submission::Create),
            FormMode::Edit { id } => form.to_update().map(|u| Submission::Update(id.clone(), u)),
        };
        let submission = match submission {
            Ok(submission) => submission,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };

        self.close_dialog();
        self.status_message = Some("Saving...".to_string());
        let client = self.client.clone();
        self.spawn_task(async move {
            let result = match &submission {
                Submission::Create(product) => Self::action_result(
                    "Adding product",
                    client.create_product(product).await,
                    "Product added",
                ),
                Submission::Update(id, update) => Self::action_result(
                    "Updating product",
                    client.update_product(id, update).await,
                    "Product updated",
                ),
            };
            vec![result]
        });
    }

    /// Fetch the selected product so stock-out is bounded by the current
    /// quantity, then open the stock dialog
    pub fn open_stock_form(&mut self, direction: StockDirection) {
        let Some(id) = self.selected_product().map(|p| p.id.clone()) else {
            return;
        };
        let client = self.client.clone();
        self.status_message = Some(format!("Loading {}...", id));
        self.spawn_task(async move {
            let result = match client.get_product(&id).await {
                Ok(product) => TaskResult::StockProductLoaded(direction, product),
                Err(error) => TaskResult::Failed {
                    context: "Loading product",
                    error,
                },
            };
            vec![result]
        });
    }

    pub fn submit_stock_form(&mut self) {
        let Some(form) = self.stock_form.as_mut() else {
            return;
        };
        let amount = match form.parse_amount() {
            Ok(amount) => amount,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };
        let direction = form.direction;
        let id = form.product.id.clone();
        let on_hand = form.product.quantity;

        self.close_dialog();
        let client = self.client.clone();
        self.spawn_task(async move {
            let outcome = client.adjust_stock(direction, &id, amount, on_hand).await;
            vec![Self::action_result(direction.label(), outcome, "Stock updated")]
        });
    }

    pub fn request_delete(&mut self) {
        if let Some(product) = self.selected_product().cloned() {
            self.pending_delete = Some(product);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(product) = self.pending_delete.take() else {
            self.state = AppState::Normal;
            return;
        };
        self.state = AppState::Normal;
        let client = self.client.clone();
        self.spawn_task(async move {
            let outcome = client.delete_product(&product.id).await;
            vec![Self::action_result("Deleting product", outcome, "Product deleted")]
        });
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Open the statistics overlay, loading totals and the low-stock
    /// count together.
    pub fn show_statistics(&mut self) {
        self.state = AppState::ShowingStatistics;
        self.statistics = None;
        self.low_stock = None;

        let client = self.client.clone();
        let threshold = self.low_stock_threshold;
        self.spawn_task(async move {
            let (statistics, low_stock) =
                futures::join!(client.statistics(), client.low_stock(threshold));
            let mut results = Vec::with_capacity(2);
            results.push(match statistics {
                Ok(statistics) => TaskResult::Statistics(statistics),
                Err(error) => TaskResult::Failed {
                    context: "Loading statistics",
                    error,
                },
            });
            results.push(match low_stock {
                Ok(products) => TaskResult::LowStock { threshold, products },
                Err(error) => TaskResult::Failed {
                    context: "Loading low stock",
                    error,
                },
            });
            results
        });
    }

    pub fn show_low_stock(&mut self) {
        self.state = AppState::ShowingLowStock;
        self.load_low_stock();
    }

    fn load_low_stock(&mut self) {
        self.low_stock = None;
        let client = self.client.clone();
        let threshold = self.low_stock_threshold;
        self.spawn_task(async move {
            let result = match client.low_stock(threshold).await {
                Ok(products) => TaskResult::LowStock { threshold, products },
                Err(error) => TaskResult::Failed {
                    context: "Loading low stock",
                    error,
                },
            };
            vec![result]
        });
    }

    /// Move the low-stock threshold by `delta` (never below 1) and reload
    pub fn adjust_threshold(&mut self, delta: i64) {
        let next = (i64::from(self.low_stock_threshold) + delta).clamp(1, i64::from(u32::MAX)) as u32;
        if next == self.low_stock_threshold {
            return;
        }
        self.low_stock_threshold = next;
        self.config.low_stock_threshold = next;
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
        self.load_low_stock();
    }
}

/// User-facing text for a failed login
pub fn login_error_message(error: &ApiError) -> String {
    match error {
        ApiError::Validation(message) => message.clone(),
        ApiError::Network(TransportError::Timeout) => {
            "Connection timed out. Please try again.".to_string()
        }
        ApiError::Network(_) => "Unable to connect to server. Check the API URL.".to_string(),
        other => format!("Login failed: {}", other),
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;
    use stockroom_core::api::{HttpRequest, HttpResponse, Transport};
    use stockroom_core::auth::MemoryCredentialStore;
    use stockroom_core::config::CredentialBackend;
    use stockroom_core::{CredentialStore, Gateway, GuardState};

    use super::*;

    /// Replays canned JSON responses in order
    #[derive(Default)]
    struct CannedTransport {
        responses: Mutex<VecDeque<(u16, serde_json::Value)>>,
        paths: Mutex<Vec<String>>,
    }

    impl CannedTransport {
        fn push(&self, status: u16, body: serde_json::Value) {
            self.responses.lock().unwrap().push_back((status, body));
        }

        fn paths(&self) -> Vec<String> {
            self.paths.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.paths.lock().unwrap().push(request.url.clone());
            let (status, body) = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| TransportError::Other("no canned response".to_string()))?;
            Ok(HttpResponse::new(
                status.try_into().unwrap(),
                Default::default(),
                serde_json::to_vec(&body).unwrap(),
            ))
        }
    }

    fn test_config() -> Config {
        Config {
            credential_backend: CredentialBackend::Memory,
            last_username: Some("admin".to_string()),
            ..Config::default()
        }
    }

    fn app_with(store: MemoryCredentialStore) -> (App, Arc<CannedTransport>, Arc<MemoryCredentialStore>) {
        let transport = Arc::new(CannedTransport::default());
        let store = Arc::new(store);
        let gateway = Gateway::new(transport.clone(), store.clone(), "http://localhost:8080/api");
        let app = App::with_client(test_config(), InventoryClient::new(gateway));
        (app, transport, store)
    }

    /// Wait for the next task message and apply it
    async fn pump(app: &mut App) {
        let message = app.task_rx.recv().await.unwrap();
        app.process_task_message(message);
    }

    fn product_json(id: &str, quantity: u32) -> serde_json::Value {
        json!({
            "id": id,
            "name": "Laptop",
            "price": 12.5,
            "quantity": quantity,
            "category": "Electronics"
        })
    }

    fn product(id: &str, quantity: u32) -> Product {
        Product {
            id: id.to_string(),
            name: "Laptop".to_string(),
            price: 12.5,
            quantity,
            category: "Electronics".to_string(),
            reported_total: None,
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_navigate_without_session_redirects_to_login() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::new());

        app.navigate(Route::Roles);
        assert!(!app.view_ready());
        pump(&mut app).await;

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.pending_route(), Some(Route::Roles));
        assert_eq!(app.login_focus, LoginFocus::Password);
        assert!(transport.paths().is_empty());
    }

    #[tokio::test]
    async fn test_valid_session_renders_and_loads_products() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, json!({"valid": true}));
        transport.push(200, json!([{"id": "P001", "name": "Laptop", "price": 12.5, "quantity": 3, "category": "Electronics"}]));

        app.navigate(Route::Products);
        pump(&mut app).await;
        assert_eq!(app.guard.state(), GuardState::Valid);
        assert!(app.view_ready());
        assert!(app.loading);
        assert_eq!(app.username.as_deref(), Some("admin"));

        pump(&mut app).await;
        assert_eq!(app.products.len(), 1);
        assert!(!app.loading);
        assert!(app.last_refreshed.is_some());
        assert!(transport.paths()[1].ends_with("/api/products"));
    }

    #[tokio::test]
    async fn test_superseded_navigation_result_is_dropped() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, json!({"valid": true}));
        transport.push(200, json!({"valid": true}));

        app.navigate(Route::Accounts);
        let first = app.task_rx.recv().await.unwrap();
        app.navigate(Route::Users);
        app.process_task_message(first);

        // Still waiting on the second verification
        assert_eq!(app.current_route, Route::Users);
        assert_eq!(app.guard.state(), GuardState::Unknown);

        pump(&mut app).await;
        assert_eq!(app.guard.decision(), GuardDecision::Render(Route::Users));
    }

    #[tokio::test]
    async fn test_expired_session_during_fetch_redirects() {
        let (mut app, transport, store) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, json!({"valid": true}));
        transport.push(401, json!({"success": false, "message": "Token expired"}));

        app.navigate(Route::Products);
        pump(&mut app).await;
        pump(&mut app).await;

        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.pending_route(), Some(Route::Products));
        assert!(app.login_error.is_some());
        assert!(!store.is_authenticated());
        assert!(app.products.is_empty());
    }

    #[tokio::test]
    async fn test_open_login_path_shows_login() {
        let (mut app, _, _) = app_with(MemoryCredentialStore::new());
        app.open(Route::from_path("/login"));
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.pending_route(), Some(Route::Products));
    }

    #[tokio::test]
    async fn test_logout_clears_session_and_data() {
        let (mut app, transport, store) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, json!({"success": true}));
        app.products = vec![product("P001", 3)];

        app.logout().await;

        assert!(!store.is_authenticated());
        assert!(app.products.is_empty());
        assert_eq!(app.state, AppState::LoggingIn);
        assert!(transport.paths()[0].ends_with("/logout"));
    }

    // -------------------------------------------------------------------------
    // Actions
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_invalid_stock_out_stays_in_dialog() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, product_json("P001", 2));
        app.products = vec![product("P001", 2)];

        app.open_stock_form(StockDirection::Out);
        pump(&mut app).await;
        for c in "5".chars() {
            app.stock_form.as_mut().unwrap().push_char(c);
        }
        app.submit_stock_form();

        assert_eq!(app.state, AppState::AdjustingStock);
        let form = app.stock_form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("Stock-out amount cannot exceed current stock (2)"));
        // Only the product fetch went out
        assert_eq!(transport.paths().len(), 1);
    }

    #[tokio::test]
    async fn test_stock_form_bounded_by_fetched_quantity() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        // The list is stale: the server now holds only 3
        app.products = vec![product("P001", 50)];
        transport.push(200, product_json("P001", 3));

        app.open_stock_form(StockDirection::Out);
        assert_eq!(app.state, AppState::Normal);
        pump(&mut app).await;

        assert_eq!(app.state, AppState::AdjustingStock);
        assert!(transport.paths()[0].ends_with("/api/product?id=P001"));
        let form = app.stock_form.as_mut().unwrap();
        assert_eq!(form.product.quantity, 3);
        form.push_char('5');
        app.submit_stock_form();

        let form = app.stock_form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("Stock-out amount cannot exceed current stock (3)"));
        assert_eq!(transport.paths().len(), 1);
    }

    #[tokio::test]
    async fn test_action_failure_reported_after_navigation() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, product_json("P001", 10));
        transport.push(400, json!({"success": false, "message": "Insufficient stock"}));
        transport.push(200, json!({"valid": true}));
        app.products = vec![product("P001", 10)];

        app.open_stock_form(StockDirection::Out);
        pump(&mut app).await;
        app.stock_form.as_mut().unwrap().push_char('5');
        app.submit_stock_form();
        assert_eq!(app.state, AppState::Normal);

        let outcome = app.task_rx.recv().await.unwrap();
        app.navigate(Route::Accounts);
        app.process_task_message(outcome);

        assert_eq!(
            app.status_message.as_deref(),
            Some("Stock out failed: Insufficient stock")
        );

        // The new page still verifies normally
        pump(&mut app).await;
        assert_eq!(app.guard.decision(), GuardDecision::Render(Route::Accounts));
    }

    #[tokio::test]
    async fn test_completed_action_after_navigation_skips_refresh() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, json!({"success": true, "message": "Product deleted"}));
        transport.push(200, json!({"valid": true}));
        app.products = vec![product("P001", 2)];

        app.request_delete();
        app.confirm_delete();
        let outcome = app.task_rx.recv().await.unwrap();
        app.navigate(Route::Users);
        app.process_task_message(outcome);

        assert_eq!(app.status_message.as_deref(), Some("Product deleted"));
        pump(&mut app).await;
        assert_eq!(app.guard.decision(), GuardDecision::Render(Route::Users));
        assert_eq!(transport.paths().len(), 2);
    }

    #[tokio::test]
    async fn test_completed_action_reports_and_refreshes() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, json!({"success": true, "message": "Product deleted"}));
        transport.push(200, json!([]));
        app.products = vec![product("P001", 2)];

        app.request_delete();
        assert_eq!(app.state, AppState::ConfirmingDelete);
        app.confirm_delete();
        pump(&mut app).await;

        assert_eq!(app.status_message.as_deref(), Some("Product deleted"));
        assert!(app.loading);
        pump(&mut app).await;
        assert!(app.products.is_empty());
        assert!(transport.paths()[0].ends_with("/api/product?id=P001"));
    }

    #[tokio::test]
    async fn test_server_rejection_sets_status() {
        let (mut app, transport, store) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(400, json!({"success": false, "message": "Product ID already exists"}));

        app.open_add_form();
        let form = app.product_form.as_mut().unwrap();
        form.values = [
            "P001".to_string(),
            "Laptop".to_string(),
            "10".to_string(),
            "1".to_string(),
            "Electronics".to_string(),
        ];
        app.submit_product_form();
        assert_eq!(app.state, AppState::Normal);
        pump(&mut app).await;

        assert_eq!(
            app.status_message.as_deref(),
            Some("Adding product failed: Product ID already exists")
        );
        assert!(store.is_authenticated());
    }

    #[tokio::test]
    async fn test_statistics_loads_both_reports() {
        let (mut app, transport, _) = app_with(MemoryCredentialStore::with_session("tok", "admin"));
        transport.push(200, json!({"productCount": 4, "totalValue": 99.0, "categories": ["A"]}));
        transport.push(200, json!([]));

        app.show_statistics();
        pump(&mut app).await;
        pump(&mut app).await;

        assert_eq!(app.statistics.as_ref().map(|s| s.product_count), Some(4));
        assert_eq!(app.low_stock.as_ref().map(Vec::len), Some(0));
    }

    // -------------------------------------------------------------------------
    // Forms
    // -------------------------------------------------------------------------

    #[test]
    fn test_product_form_parses_values() {
        let mut form = ProductForm::create();
        form.values = [
            " P009 ".to_string(),
            "Drill".to_string(),
            "45.5".to_string(),
            "".to_string(),
            "Tools".to_string(),
        ];
        let product = form.to_new_product().unwrap();
        assert_eq!(product.id, "P009");
        assert_eq!(product.price, 45.5);
        assert_eq!(product.quantity, 0);

        form.values[FIELD_PRICE] = "abc".to_string();
        assert_eq!(form.to_new_product().unwrap_err(), "Price must be a number");

        form.values[FIELD_PRICE] = "-1".to_string();
        assert!(form.to_new_product().is_err());
    }

    #[test]
    fn test_edit_form_skips_fixed_fields() {
        let mut form = ProductForm::edit(&product("P001", 3));
        assert_eq!(form.focus, FIELD_NAME);
        form.focus_next();
        assert_eq!(form.focus, FIELD_PRICE);
        form.focus_next();
        assert_eq!(form.focus, FIELD_CATEGORY);
        form.focus_next();
        assert_eq!(form.focus, FIELD_NAME);
        form.focus_prev();
        assert_eq!(form.focus, FIELD_CATEGORY);

        let update = form.to_update().unwrap();
        assert_eq!(update.name, "Laptop");
        assert_eq!(update.price, 12.5);
    }

    #[test]
    fn test_stock_form_amount() {
        let mut form = StockForm::new(StockDirection::In, product("P001", 0));
        form.push_char('x');
        assert!(form.amount.is_empty());
        assert!(form.parse_amount().is_err());

        form.push_char('0');
        assert_eq!(form.parse_amount().unwrap_err(), "Amount must be greater than 0");

        form.pop_char();
        form.push_char('7');
        assert_eq!(form.parse_amount(), Ok(7));
    }

    #[test]
    fn test_login_error_message() {
        assert_eq!(
            login_error_message(&ApiError::Validation("Invalid username or password".into())),
            "Invalid username or password"
        );
        assert_eq!(
            login_error_message(&ApiError::Network(TransportError::Timeout)),
            "Connection timed out. Please try again."
        );
        assert!(login_error_message(&ApiError::Server("down".into())).starts_with("Login failed"));
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(49, 'z'));
        assert!(!can_add_username_char(50, 'a'));
        // Control characters rejected
        assert!(!can_add_username_char(0, '\x00'));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }
}
