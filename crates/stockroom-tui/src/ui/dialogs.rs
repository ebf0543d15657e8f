//! Product dialogs and report overlays.

use ratatui::{
    layout::Constraint,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, PRODUCT_FIELDS};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;
use crate::utils::{format_price, truncate_string};

fn dialog_block(title: String) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

fn key_hint(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("  ")];
    for (i, (key, desc)) in pairs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("  ", styles::muted_style()));
        }
        spans.push(Span::styled(*key, styles::help_key_style()));
        spans.push(Span::styled(format!(" {}", desc), styles::muted_style()));
    }
    Line::from(spans)
}

pub fn render_product_form(frame: &mut Frame, app: &App) {
    let Some(form) = app.product_form.as_ref() else {
        return;
    };
    let height = if form.error.is_some() { 13 } else { 11 };
    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (i, label) in PRODUCT_FIELDS.iter().enumerate() {
        let focused = i == form.focus;
        let value = truncate_string(&form.values[i], 30);
        let (value_style, cursor) = if focused {
            (styles::selected_style(), "▌")
        } else if form.is_editable(i) {
            (styles::list_item_style(), "")
        } else {
            (styles::muted_style(), "")
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:>9}: [", label), styles::muted_style()),
            Span::styled(format!("{:<30}{}", value, cursor), value_style),
            Span::styled("]", styles::muted_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(key_hint(&[("Enter", "save"), ("Tab", "next field"), ("Esc", "cancel")]));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let paragraph = Paragraph::new(lines).block(dialog_block(form.title().to_string()));
    frame.render_widget(paragraph, area);
}

pub fn render_stock_form(frame: &mut Frame, app: &App) {
    let Some(form) = app.stock_form.as_ref() else {
        return;
    };
    let height = if form.error.is_some() { 10 } else { 8 };
    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Product: ", styles::muted_style()),
            Span::raw(truncate_string(
                &format!("{} ({})", form.product.name, form.product.id),
                36,
            )),
        ]),
        Line::from(vec![
            Span::styled("  On hand: ", styles::muted_style()),
            Span::raw(form.product.quantity.to_string()),
        ]),
        Line::from(vec![
            Span::styled("   Amount: [", styles::muted_style()),
            Span::styled(format!("{:<10}▌", form.amount), styles::selected_style()),
            Span::styled("]", styles::muted_style()),
        ]),
        Line::from(""),
        key_hint(&[("Enter", "confirm"), ("Esc", "cancel")]),
    ];

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let paragraph = Paragraph::new(lines).block(dialog_block(form.direction.label().to_string()));
    frame.render_widget(paragraph, area);
}

pub fn render_delete_confirm(frame: &mut Frame, app: &App) {
    let Some(product) = app.pending_delete.as_ref() else {
        return;
    };
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  Delete {}?", truncate_string(&product.name, 30)),
            styles::highlight_style(),
        )),
        Line::from(Span::styled(format!("  ID {}", product.id), styles::muted_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let paragraph = Paragraph::new(lines).block(dialog_block("Confirm Delete".to_string()));
    frame.render_widget(paragraph, area);
}

pub fn render_statistics(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(50, 12, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    match app.statistics.as_ref() {
        Some(stats) => {
            lines.push(Line::from(vec![
                Span::styled("      Products: ", styles::muted_style()),
                Span::styled(stats.product_count.to_string(), styles::highlight_style()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("   Total value: ", styles::muted_style()),
                Span::styled(format_price(stats.total_value), styles::highlight_style()),
            ]));
            let categories = if stats.categories.is_empty() {
                "-".to_string()
            } else {
                stats.categories.join(", ")
            };
            lines.push(Line::from(vec![
                Span::styled("    Categories: ", styles::muted_style()),
                Span::raw(truncate_string(&categories, 30)),
            ]));
            let low = match app.low_stock.as_ref() {
                Some(products) if products.is_empty() => {
                    Span::styled("none".to_string(), styles::success_style())
                }
                Some(products) => Span::styled(products.len().to_string(), styles::error_style()),
                None => Span::styled("...".to_string(), styles::muted_style()),
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  Below {:>5}: ", app.low_stock_threshold),
                    styles::muted_style(),
                ),
                low,
            ]));
        }
        None => lines.push(Line::from(Span::styled("  Loading...", styles::muted_style()))),
    }
    lines.push(Line::from(""));
    lines.push(key_hint(&[("u", "reload"), ("l", "low stock"), ("Esc", "close")]));

    let paragraph = Paragraph::new(lines).block(dialog_block("Statistics".to_string()));
    frame.render_widget(paragraph, area);
}

pub fn render_low_stock(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(64, 18, frame.area());
    frame.render_widget(Clear, area);

    let title = format!("Low Stock (quantity < {})", app.low_stock_threshold);
    let block = dialog_block(title);

    let Some(products) = app.low_stock.as_ref() else {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Loading...", styles::muted_style())),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    if products.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Every product is above the threshold", styles::success_style())),
            Line::from(""),
            key_hint(&[("+/-", "threshold"), ("Esc", "close")]),
        ])
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([
        Cell::from("ID"),
        Cell::from("Name"),
        Cell::from("Category"),
        Cell::from("Qty"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = products
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.id.clone()),
                Cell::from(truncate_string(&p.name, 24)),
                Cell::from(truncate_string(&p.category, 14)),
                Cell::from(format!("{:>5}", p.quantity)),
            ])
            .style(styles::low_stock_style())
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Fill(2),
        Constraint::Fill(1),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title_bottom(key_hint(&[("+/-", "threshold"), ("Esc", "close")])));

    frame.render_widget(table, area);
}
