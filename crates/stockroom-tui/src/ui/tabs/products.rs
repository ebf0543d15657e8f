use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use stockroom_core::models::Product;

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_price, truncate_string};

/// Render the Products page - table on the left, selected product on the right
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(chunks[0]);

    let summary = Paragraph::new(Line::from(Span::styled(
        inventory_summary(&app.products, app.low_stock_threshold),
        styles::muted_style(),
    )));
    frame.render_widget(summary, left[0]);
    render_product_table(frame, app, left[1]);
    render_product_detail(frame, app, chunks[1]);
}

/// One-line totals for the listed products
fn inventory_summary(products: &[Product], threshold: u32) -> String {
    let total: f64 = products.iter().map(Product::total_value).sum();
    let low = products.iter().filter(|p| p.is_low_stock(threshold)).count();
    format!(
        " {} products  |  stock value {}  |  {} below {}",
        products.len(),
        format_price(total),
        low,
        threshold
    )
}

fn render_product_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new([
        Cell::from("ID"),
        Cell::from("Name"),
        Cell::from("Category"),
        Cell::from("Price"),
        Cell::from("Qty"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .products
        .iter()
        .enumerate()
        .map(|(i, product)| {
            let style = if i == app.product_selection {
                styles::selected_style()
            } else if product.is_low_stock(app.low_stock_threshold) {
                styles::low_stock_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(product.id.clone()),
                Cell::from(truncate_string(&product.name, 28)),
                Cell::from(truncate_string(&product.category, 16)),
                Cell::from(format!("{:>10}", format_price(product.price))),
                Cell::from(format!("{:>5}", product.quantity)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(11),
        Constraint::Length(6),
    ];

    let title = if app.search_query.trim().is_empty() {
        format!(" Products ({}) - [a]dd [e]dit [d]elete [i]n [o]ut ", app.products.len())
    } else {
        format!(" Products matching \"{}\" ({}) ", app.search_query.trim(), app.products.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !app.products.is_empty() {
        state.select(Some(app.product_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn detail_line(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:>10}: ", label), styles::muted_style()),
        Span::raw(value),
    ])
}

fn product_lines(product: &Product, threshold: u32) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(""),
        detail_line("ID", product.id.clone()),
        detail_line("Name", product.name.clone()),
        detail_line("Category", product.category.clone()),
        detail_line("Price", format_price(product.price)),
        detail_line("Quantity", product.quantity.to_string()),
        detail_line("Value", format_price(product.total_value())),
        Line::from(""),
    ];
    if product.is_low_stock(threshold) {
        lines.push(Line::from(Span::styled(
            format!("  Low stock (below {})", threshold),
            styles::error_style(),
        )));
    }
    lines
}

fn render_product_detail(frame: &mut Frame, app: &App, area: Rect) {
    let content = match app.selected_product() {
        Some(product) => product_lines(product, app.low_stock_threshold),
        None if app.loading => vec![Line::from(Span::styled(" Loading...", styles::muted_style()))],
        None => vec![Line::from(Span::styled(" No products", styles::muted_style()))],
    };

    let block = Block::default()
        .title(" Details ")
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}
