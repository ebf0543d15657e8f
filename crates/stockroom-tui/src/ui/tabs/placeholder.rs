use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use stockroom_core::Route;

use crate::app::App;
use crate::ui::styles;

/// Pages that exist behind the guard but have no content yet
pub fn render(frame: &mut Frame, app: &App, route: Route, area: Rect) {
    let user = app.username.as_deref().unwrap_or("-");

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("{} management", route.title()), styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            format!("Signed in as {} · {}", user, route.path()),
            styles::muted_style(),
        )),
        Line::from(Span::styled("Nothing to manage here yet", styles::muted_style())),
    ];

    let block = Block::default()
        .title(format!(" {} ", route.title()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(block);
    frame.render_widget(paragraph, area);
}
