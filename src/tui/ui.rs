use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, List,
        ListItem, Paragraph, Row, Table, Wrap,
    },
    Frame,
};

use crate::chart::{ChartData, ChartError, ChartKind};
use crate::table::ResultTable;

use super::app::{App, Focus};

const PIE_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::Red,
    Color::LightCyan,
    Color::LightGreen,
];

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_body(frame, app, chunks[1]);
    draw_status_bar(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled("  ", Style::default()),
        Span::styled("◩", Style::default().fg(Color::Yellow)),
        Span::styled(
            " Orderlens",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled("Retail Order Reports", Style::default().fg(Color::DarkGray)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(&app.backend_label, Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

fn draw_body(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(40)])
        .split(area);

    draw_sidebar(frame, app, columns[0]);
    draw_content(frame, app, columns[1]);
}

fn draw_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let page_block_height = app.catalog.pages.len() as u16 + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(page_block_height), Constraint::Min(5)])
        .split(area);

    draw_page_list(frame, app, rows[0]);
    draw_section_list(frame, app, rows[1]);
}

fn draw_page_list(frame: &mut Frame, app: &App, area: Rect) {
    let border_color = if app.focus == Focus::Pages {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let items: Vec<ListItem> = app
        .catalog
        .pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let marker = if i == app.active_page { "▸ " } else { "  " };
            let mut style = Style::default();
            if i == app.page_cursor {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Yellow)),
                Span::styled(page.title.clone(), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Pages ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    frame.render_widget(list, area);
}

fn draw_section_list(frame: &mut Frame, app: &App, area: Rect) {
    let border_color = if app.focus == Focus::Sections {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = app
        .sections
        .iter()
        .enumerate()
        .map(|(i, section)| {
            let (marker, marker_color) = if section.is_err() {
                ("✗ ", Color::Red)
            } else {
                ("• ", Color::Green)
            };
            let mut style = Style::default();
            if i == app.selected_section {
                style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(marker_color)),
                Span::styled(truncate_string(&section.description, width), style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Sections ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color)),
    );
    frame.render_widget(list, area);
}

fn draw_content(frame: &mut Frame, app: &App, area: Rect) {
    let Some(section) = app.sections.get(app.selected_section) else {
        let empty = Paragraph::new("No sections on this page")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let sql_lines = section.sql.lines().count() as u16;
    let sql_height = (sql_lines + 2).min(12);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(sql_height), Constraint::Min(5)])
        .split(area);

    draw_sql(frame, section, rows[0]);

    if app.chart.is_some() {
        draw_chart_panel(frame, app, rows[1]);
    } else {
        draw_result(frame, app, rows[1]);
    }
}

fn draw_sql(frame: &mut Frame, section: &crate::report::SectionResult, area: Rect) {
    let block = Block::default()
        .title(format!(" {} ", section.description))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let highlighted = highlight_sql_multiline(&section.sql);
    let paragraph = Paragraph::new(highlighted).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner);
}

fn draw_result(frame: &mut Frame, app: &App, area: Rect) {
    let is_focused = app.focus == Focus::Results;
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let section = &app.sections[app.selected_section];

    let title = match &section.outcome {
        Ok(table) => format!(" Result ({} rows) ", table.row_count()),
        Err(_) => " Result ".to_string(),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match &section.outcome {
        Err(error) => {
            let error_text = Paragraph::new(error.to_string())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(error_text, inner);
        }
        Ok(table) if table.is_empty() => {
            let empty = Paragraph::new("No results").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, inner);
        }
        Ok(table) => draw_result_table(frame, app, table, inner),
    }
}

fn draw_result_table(frame: &mut Frame, app: &App, table: &ResultTable, area: Rect) {
    let widths = column_widths(table);

    let header_cells: Vec<Cell> = table
        .schema
        .columns
        .iter()
        .enumerate()
        .skip(app.result_horizontal_scroll)
        .map(|(i, col)| {
            let width = widths.get(i).copied().unwrap_or(10);
            Cell::from(truncate_string(&col.name, width)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    let visible_height = area.height.saturating_sub(2) as usize;
    let rows: Vec<Row> = table
        .rows
        .iter()
        .skip(app.result_scroll)
        .take(visible_height)
        .map(|row| {
            let cells: Vec<Cell> = row
                .values
                .iter()
                .enumerate()
                .skip(app.result_horizontal_scroll)
                .map(|(i, val)| {
                    let width = widths.get(i).copied().unwrap_or(10);
                    Cell::from(truncate_string(&val.to_string(), width))
                })
                .collect();
            Row::new(cells)
        })
        .collect();

    let constraints: Vec<Constraint> = widths
        .iter()
        .skip(app.result_horizontal_scroll)
        .map(|&w| Constraint::Length(w as u16 + 2))
        .collect();

    let table_widget = Table::new(rows, &constraints)
        .header(header)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    frame.render_widget(table_widget, area);
}

fn column_widths(table: &ResultTable) -> Vec<usize> {
    table
        .schema
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let header_width = col.name.len();
            let max_value_width = table
                .rows
                .iter()
                .map(|row| row.get(i).map(|v| v.to_string().len()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            header_width.max(max_value_width).max(4)
        })
        .collect()
}

fn draw_chart_panel(frame: &mut Frame, app: &App, area: Rect) {
    let Some(chart_state) = app.chart.as_ref() else {
        return;
    };

    let title = format!(" {} (t: kind, x/y: bindings, Esc: close) ", chart_state.kind.label());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.chart_data() {
        Some(Ok(data)) => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(5), Constraint::Length(1)])
                .split(inner);

            match data.kind {
                ChartKind::Bar => draw_bar_chart(frame, &data, rows[0]),
                ChartKind::Line => draw_line_chart(frame, &data, rows[0]),
                ChartKind::Pie => draw_pie_chart(frame, &data, rows[0]),
            }
            draw_chart_bindings(frame, &data, rows[1]);
        }
        Some(Err(ChartError::EmptyTable)) => {
            let msg = Paragraph::new("No rows to chart")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(msg, inner);
        }
        Some(Err(e)) => {
            let msg = Paragraph::new(e.to_string()).style(Style::default().fg(Color::Red));
            frame.render_widget(msg, inner);
        }
        None => {}
    }
}

fn draw_chart_bindings(frame: &mut Frame, data: &ChartData, area: Rect) {
    let bindings = Line::from(vec![
        Span::styled("X: ", Style::default().fg(Color::DarkGray)),
        Span::styled(&data.x_label, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled("Y: ", Style::default().fg(Color::DarkGray)),
        Span::styled(&data.y_label, Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(Paragraph::new(bindings), area);
}

fn draw_bar_chart(frame: &mut Frame, data: &ChartData, area: Rect) {
    let max = data.max_value().max(1e-9);

    let bars: Vec<Bar> = data
        .points
        .iter()
        .map(|(label, value)| {
            let scaled = ((value.max(0.0) / max) * 100.0).round() as u64;
            Bar::default()
                .label(Line::from(truncate_string(label, 10)))
                .value(scaled)
                .text_value(format_value(*value))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();

    let bar_width = bar_width_for(area.width, data.points.len());
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);

    frame.render_widget(chart, area);
}

fn bar_width_for(available: u16, bars: usize) -> u16 {
    if bars == 0 {
        return 1;
    }
    let width = available.saturating_sub(bars as u16) / bars as u16;
    width.clamp(1, 12)
}

fn draw_line_chart(frame: &mut Frame, data: &ChartData, area: Rect) {
    let points: Vec<(f64, f64)> = data
        .points
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();

    let x_max = (points.len().saturating_sub(1)) as f64;
    let y_min = data.min_value().min(0.0);
    let y_max = data.max_value().max(y_min + 1.0);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let first_label = data
        .points
        .first()
        .map(|(l, _)| truncate_string(l, 12))
        .unwrap_or_default();
    let last_label = data
        .points
        .last()
        .map(|(l, _)| truncate_string(l, 12))
        .unwrap_or_default();

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title(Span::styled(
                    data.x_label.clone(),
                    Style::default().fg(Color::DarkGray),
                ))
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![Span::raw(first_label), Span::raw(last_label)]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(
                    data.y_label.clone(),
                    Style::default().fg(Color::DarkGray),
                ))
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format_value(y_min)),
                    Span::raw(format_value((y_min + y_max) / 2.0)),
                    Span::raw(format_value(y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

fn draw_pie_chart(frame: &mut Frame, data: &ChartData, area: Rect) {
    let fractions = data.pie_fractions();
    if fractions.is_empty() {
        let msg = Paragraph::new("No positive values to chart")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, area);
        return;
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(28)])
        .split(area);

    let slices: Vec<(f64, f64, Color)> = {
        let mut start = 0.0f64;
        fractions
            .iter()
            .enumerate()
            .map(|(i, (_, fraction))| {
                let end = start + fraction * std::f64::consts::TAU;
                let slice = (start, end, PIE_COLORS[i % PIE_COLORS.len()]);
                start = end;
                slice
            })
            .collect()
    };

    let canvas = Canvas::default()
        .x_bounds([-1.6, 1.6])
        .y_bounds([-1.2, 1.2])
        .marker(symbols::Marker::Braille)
        .paint(move |ctx| {
            for (start, end, color) in &slices {
                // Fill the sector with radial lines
                let steps = (((end - start) / 0.02).ceil() as usize).max(2);
                for step in 0..=steps {
                    let angle = start + (end - start) * (step as f64 / steps as f64);
                    ctx.draw(&CanvasLine {
                        x1: 0.0,
                        y1: 0.0,
                        x2: angle.cos(),
                        y2: angle.sin(),
                        color: *color,
                    });
                }
            }
        });

    frame.render_widget(canvas, columns[0]);
    draw_pie_legend(frame, &fractions, columns[1]);
}

fn draw_pie_legend(frame: &mut Frame, fractions: &[(String, f64)], area: Rect) {
    let items: Vec<ListItem> = fractions
        .iter()
        .enumerate()
        .map(|(i, (label, fraction))| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    "■ ",
                    Style::default().fg(PIE_COLORS[i % PIE_COLORS.len()]),
                ),
                Span::raw(format!(
                    "{} {:.1}%",
                    truncate_string(label, 16),
                    fraction * 100.0
                )),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Legend ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(list, area);
}

fn format_value(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn highlight_sql_multiline(query: &str) -> Vec<Line<'static>> {
    query.split('\n').map(highlight_sql_line).collect()
}

fn highlight_sql_line(query: &str) -> Line<'static> {
    let keywords = [
        "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "JOIN", "INNER", "LEFT", "RIGHT", "OUTER",
        "ON", "GROUP", "BY", "HAVING", "ORDER", "ASC", "DESC", "LIMIT", "OFFSET", "AS", "DISTINCT",
        "COUNT", "SUM", "AVG", "MIN", "MAX", "ROUND", "NULL", "IS", "IN", "LIKE", "BETWEEN",
        "CASE", "WHEN", "THEN", "ELSE", "END", "WITH", "UNION", "ALL", "OVER", "PARTITION",
        "RANK", "DENSE_RANK", "ROW_NUMBER",
    ];

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let mut string_char = ' ';

    for c in query.chars() {
        if in_string {
            current.push(c);
            if c == string_char {
                spans.push(Span::styled(
                    current.clone(),
                    Style::default().fg(Color::Green),
                ));
                current.clear();
                in_string = false;
            }
        } else if c == '\'' || c == '"' {
            if !current.is_empty() {
                spans.push(colorize_word(&current, &keywords));
                current.clear();
            }
            current.push(c);
            in_string = true;
            string_char = c;
        } else if c.is_alphanumeric() || c == '_' {
            current.push(c);
        } else {
            if !current.is_empty() {
                spans.push(colorize_word(&current, &keywords));
                current.clear();
            }
            let style = match c {
                '(' | ')' | ',' => Style::default().fg(Color::Yellow),
                '=' | '<' | '>' | '!' => Style::default().fg(Color::Magenta),
                '+' | '-' | '*' | '/' | '%' => Style::default().fg(Color::Magenta),
                _ => Style::default(),
            };
            spans.push(Span::styled(c.to_string(), style));
        }
    }

    if !current.is_empty() {
        if in_string {
            spans.push(Span::styled(current, Style::default().fg(Color::Green)));
        } else {
            spans.push(colorize_word(&current, &keywords));
        }
    }

    Line::from(spans)
}

fn colorize_word(word: &str, keywords: &[&str]) -> Span<'static> {
    let upper = word.to_uppercase();
    if keywords.contains(&upper.as_str()) {
        Span::styled(
            word.to_string(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )
    } else if word.chars().all(|c| c.is_ascii_digit() || c == '.') {
        Span::styled(word.to_string(), Style::default().fg(Color::Cyan))
    } else {
        Span::styled(word.to_string(), Style::default())
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        s.chars().take(max_len).collect()
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let focus_str = match app.focus {
        Focus::Pages => "Pages",
        Focus::Sections => "Sections",
        Focus::Results => "Results",
    };

    let help = "Tab:focus  j/k:move  Enter:load page  c:chart  s:export  q:quit";

    let mut spans = vec![
        Span::styled(
            format!(" {} ", focus_str),
            Style::default().fg(Color::Black).bg(Color::Blue),
        ),
        Span::raw(" "),
    ];

    if let Some(status) = &app.status {
        spans.push(Span::styled(
            status.clone(),
            Style::default().fg(Color::Green),
        ));
        spans.push(Span::raw("  "));
    }

    spans.push(Span::styled(help, Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
