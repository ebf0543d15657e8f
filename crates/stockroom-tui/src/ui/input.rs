//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use stockroom_core::models::StockDirection;
use stockroom_core::Route;

use crate::app::{can_add_password_char, can_add_username_char, App, AppState, LoginFocus, PAGE_SCROLL_SIZE};

/// Threshold step for `+`/`-` in the low-stock report
const THRESHOLD_STEP: i64 = 1;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::EditingProduct => {
            handle_product_form_input(app, key);
            return Ok(false);
        }
        AppState::AdjustingStock => {
            handle_stock_form_input(app, key);
            return Ok(false);
        }
        AppState::ShowingStatistics => {
            match key.code {
                KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => app.state = AppState::Normal,
                KeyCode::Char('u') => app.show_statistics(),
                KeyCode::Char('l') => app.show_low_stock(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::ShowingLowStock => {
            match key.code {
                KeyCode::Esc | KeyCode::Char('l') | KeyCode::Char('q') => app.state = AppState::Normal,
                KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_threshold(THRESHOLD_STEP),
                KeyCode::Char('-') => app.adjust_threshold(-THRESHOLD_STEP),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('L') => {
            app.logout().await;
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            if let Some(route) = Route::PROTECTED.get(index) {
                app.navigate(*route);
            }
        }
        KeyCode::Left => {
            app.navigate(app.current_route.prev());
        }
        KeyCode::Right => {
            app.navigate(app.current_route.next());
        }
        _ => {
            if app.current_route == Route::Products && app.view_ready() {
                handle_products_input(app, key);
            }
        }
    }

    Ok(false)
}

fn handle_products_input(app: &mut App, key: KeyEvent) {
    app.status_message = None;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.select_next(1),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(1),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        KeyCode::Home => app.product_selection = 0,
        KeyCode::End => app.product_selection = app.products.len().saturating_sub(1),
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Esc => {
            if !app.search_query.is_empty() {
                app.search_query.clear();
                app.refresh_products();
            }
        }
        KeyCode::Char('u') => app.refresh_products(),
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('i') => app.open_stock_form(StockDirection::In),
        KeyCode::Char('o') => app.open_stock_form(StockDirection::Out),
        KeyCode::Char('s') => app.show_statistics(),
        KeyCode::Char('l') => app.show_low_stock(),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
            app.refresh_products();
        }
        KeyCode::Enter => {
            // Keep search query active
            app.state = AppState::Normal;
            app.product_selection = 0;
            app.refresh_products();
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            if crate::app::can_add_field_char(app.search_query.chars().count(), c) {
                app.search_query.push(c);
            }
        }
        _ => {}
    }
}

fn handle_product_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.submit_product_form(),
        _ => {
            let Some(form) = app.product_form.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Tab | KeyCode::Down => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Backspace => form.pop_char(),
                KeyCode::Char(c) => form.push_char(c),
                _ => {}
            }
        }
    }
}

fn handle_stock_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.submit_stock_form(),
        _ => {
            let Some(form) = app.stock_form.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Backspace => form.pop_char(),
                KeyCode::Char(c) => form.push_char(c),
                _ => {}
            }
        }
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Username => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                // On failure login_error is set and the overlay stays up
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Username => {
                app.login_username.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Username => {
                if can_add_username_char(app.login_username.chars().count(), c) {
                    app.login_username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
