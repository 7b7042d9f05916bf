//! TUI layout and widget rendering.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Wrap};

use super::runtime::App;
use super::style;
use crate::sim::trade::FormField;
use crate::view::AgentCardView;

/// Renders the full TUI frame.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),  // header
            Constraint::Length(4),  // stat tiles
            Constraint::Min(10),    // chart + transactions
            Constraint::Length(13), // agent cards
            Constraint::Length(1),  // footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_tiles(frame, app, chunks[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[2]);
    render_chart(frame, app, middle[0]);
    render_transactions(frame, app, middle[1]);

    render_cards(frame, app, chunks[3]);
    render_footer(frame, app, chunks[4]);

    if app.flow.is_open() {
        render_trade_modal(frame, app);
    }
}

/// Header bar: preset name, tick count, speed, run state.
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let (icon, label) = if app.paused {
        ("‖", "PAUSED")
    } else {
        ("▶", "RUNNING")
    };

    let header = Line::from(vec![
        Span::styled(
            " P2P ENERGY ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            &app.preset_name,
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            " │ tick {} │ {}x ({}ms) │ {icon} {label} ",
            app.elapsed_ticks(),
            app.speed_multiplier(),
            app.tick_interval_ms(),
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

/// The five market summary tiles.
fn render_tiles(frame: &mut Frame, app: &App, area: Rect) {
    let tiles = app.tiles();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);

    for (tile, col) in tiles.iter().zip(cols.iter()) {
        let body = vec![
            Line::from(Span::styled(
                tile.value.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                tile.caption,
                Style::default().fg(style::FOOTER_FG),
            )),
        ];
        let widget = Paragraph::new(body).block(
            Block::default()
                .title(format!(" {} ", tile.title))
                .borders(Borders::ALL),
        );
        frame.render_widget(widget, *col);
    }
}

/// Price history line chart over the 24-point window.
fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let chart = app.chart();
    let data: Vec<(f64, f64)> = chart
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.price))
        .collect();

    let y_bounds = style::auto_bounds_y(&data);
    let x_hi = (data.len().max(2) - 1) as f64;

    let x_labels: Vec<String> = chart.hour_labels().into_iter().map(|l| l.text).collect();

    let datasets = vec![
        Dataset::default()
            .name("Price")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(style::PRICE_COLOR))
            .data(&data),
    ];

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Price History (24h) ")
                .borders(Borders::ALL),
        )
        .x_axis(Axis::default().bounds([0.0, x_hi]).labels(x_labels))
        .y_axis(
            Axis::default()
                .title("$/kWh")
                .bounds(y_bounds)
                .labels(vec![chart.min_label(), chart.max_label()]),
        );

    frame.render_widget(widget, area);
}

/// Newest-first transaction list.
fn render_transactions(frame: &mut Frame, app: &App, area: Rect) {
    let rows = app.transaction_rows();
    let lines: Vec<Line> = if rows.is_empty() {
        vec![Line::from("  No transactions yet")]
    } else {
        rows.iter()
            .map(|r| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<5}", r.origin.to_string().chars().take(5).collect::<String>()),
                        Style::default().fg(style::origin_color(r.origin)),
                    ),
                    Span::raw(format!(
                        " {} {} → {}  {:.0} kWh  ${:.2} @ ${:.3}  {:.2} kg",
                        r.timestamp.format("%H:%M:%S"),
                        r.seller_name,
                        r.buyer_name,
                        r.amount_kwh,
                        r.cost,
                        r.price_per_kwh,
                        r.carbon_saved_kg,
                    )),
                ])
            })
            .collect()
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .title(" Recent Transactions ")
            .borders(Borders::ALL),
    );
    frame.render_widget(widget, area);
}

/// One card per agent; the selected card gets a highlighted border.
fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let cards = app.cards();
    if cards.is_empty() {
        return;
    }
    let n = cards.len() as u32;
    let constraints: Vec<Constraint> = (0..n).map(|_| Constraint::Ratio(1, n)).collect();
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (i, (card, col)) in cards.iter().zip(cols.iter()).enumerate() {
        let border = if i == app.selected {
            Style::default().fg(style::SELECTED_BORDER)
        } else {
            Style::default()
        };
        let widget = Paragraph::new(card_lines(card, col.width.saturating_sub(14) as usize))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!(" {} ", card.name))
                    .borders(Borders::ALL)
                    .border_style(border),
            );
        frame.render_widget(widget, *col);
    }
}

fn card_lines(card: &AgentCardView, bar_width: usize) -> Vec<Line<'static>> {
    let bar_width = bar_width.clamp(4, 20);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                card.status.label(),
                Style::default()
                    .fg(style::status_color(card.status))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" · {}", card.kind)),
        ]),
        Line::from(vec![
            Span::raw("Energy "),
            Span::styled(
                style::meter(card.energy_ratio(), bar_width),
                Style::default().fg(style::ENERGY_COLOR),
            ),
            Span::raw(format!(" {:.0}%", card.energy_pct)),
        ]),
        Line::from(format!("Capacity {} kWh", card.capacity_kwh)),
        Line::from(format!("Price ${}/kWh", card.price_per_kwh)),
    ];

    if let Some(d) = &card.details {
        lines.push(Line::from(format!("Location {}", d.location)));
        lines.push(Line::from(format!("Efficiency {:.1}%", d.efficiency_pct)));
        lines.push(Line::from(format!("Carbon {} kg/kWh", d.carbon_footprint)));
        for row in &d.forecast {
            lines.push(Line::from(vec![
                Span::raw(format!("{} {:>5.0} kWh ", row.label, row.amount_kwh)),
                Span::styled(
                    style::meter(row.confidence_pct / 100.0, 6),
                    Style::default().fg(style::CONFIDENCE_COLOR),
                ),
            ]));
        }
    }
    lines
}

/// Footer with keybinding hints, or the last trade notice.
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.notice {
        Some(notice) if notice.starts_with("Trade rejected") => Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(style::ERROR_FG),
        )),
        Some(notice) => Line::from(format!(" {notice}")),
        None => Line::from(Span::styled(
            " q:Quit  Space:Pause  +/-:Speed  ←/→:Select  d:Details  t:Trade  1/2/3:Preset  r:Restart",
            Style::default().fg(style::FOOTER_FG),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Trade modal drawn over the dashboard.
fn render_trade_modal(frame: &mut Frame, app: &App) {
    let Some(form) = app.flow.form() else {
        return;
    };
    let area = centered(frame.area(), 56, 11);
    frame.render_widget(Clear, area);

    let field = |f: FormField, label: &str, value: String| {
        let focused = form.focus == f;
        let field_style = if focused {
            Style::default()
                .fg(style::FOCUS_FG)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let marker = if focused { "›" } else { " " };
        Line::from(Span::styled(
            format!("{marker} {label:<13}{value}"),
            field_style,
        ))
    };

    let partner = form
        .counterparty
        .as_ref()
        .map_or_else(|| "(none, use ↑/↓)".to_string(), |id| app.agent_name(id).to_string());

    let mut lines = vec![
        Line::from(format!(" Trading with {}", app.agent_name(&form.target))),
        Line::from(""),
        field(FormField::Counterparty, "Counterparty", partner),
        field(
            FormField::Amount,
            "Amount",
            format!("{:.0} kWh (max {:.0})", form.amount_kwh, form.max_amount_kwh),
        ),
        field(FormField::Price, "Price", format!("${:.3}/kWh", form.price_per_kwh)),
        Line::from(""),
        Line::from(Span::styled(
            " Tab:Field  ↑/↓:Adjust  Enter:Submit  Esc:Cancel",
            Style::default().fg(style::FOOTER_FG),
        )),
    ];
    if let Some(notice) = &app.notice {
        lines.push(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(style::ERROR_FG),
        )));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" Trade Energy ").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

/// A `width` x `height` rectangle centred in `outer`, shrunk to fit.
fn centered(outer: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(outer.width);
    let h = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - w) / 2,
        y: outer.y + (outer.height - h) / 2,
        width: w,
        height: h,
    }
}
